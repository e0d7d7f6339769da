/// A loaded model: triangulated geometry plus its material
use std::path::Path;

use log::info;
use nalgebra::Vector3;

use crate::error::Result;
use crate::mesh::{Mesh, MeshBuilder, MeshOptions};
use crate::mtl::Material;
use crate::obj::{ObjData, ObjParser};

/// Read-only result of loading an OBJ file. The raw parse arrays are dropped
/// once the mesh is built.
#[derive(Debug, Clone)]
pub struct Model {
    name: Option<String>,
    mesh: Mesh,
    material: Material,
}

impl Model {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_with(path, MeshOptions::default())
    }

    pub fn load_with(path: impl AsRef<Path>, options: MeshOptions) -> Result<Self> {
        let data = ObjParser::parse_file(path.as_ref())?;
        let model = Self::from_obj(data, options);
        info!(
            "Model {:?} ready: {} triangles",
            model.name.as_deref().unwrap_or("<unnamed>"),
            model.triangle_count()
        );
        Ok(model)
    }

    pub fn from_obj_str(source: &str, options: MeshOptions) -> Result<Self> {
        Ok(Self::from_obj(ObjParser::parse_str(source)?, options))
    }

    pub fn from_obj(data: ObjData, options: MeshOptions) -> Self {
        let mesh = MeshBuilder::new(&data).with_options(options).build();
        Self {
            name: data.name,
            mesh,
            material: data.material,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn triangles(&self) -> &[f32] {
        self.mesh.triangles()
    }

    pub fn normals(&self) -> &[f32] {
        self.mesh.normals()
    }

    pub fn vertex_count(&self) -> usize {
        self.mesh.vertex_count()
    }

    pub fn triangle_count(&self) -> usize {
        self.mesh.triangle_count()
    }

    pub fn center(&self) -> Vector3<f32> {
        self.mesh.center()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ModelError;
    use crate::mtl::{Illumination, Rgb};
    use std::fs;

    const CUBE: &str = "\
o cube
v -1 -1  1
v  1 -1  1
v  1  1  1
v -1  1  1
v -1 -1 -1
v  1 -1 -1
v  1  1 -1
v -1  1 -1
f 1 2 3 4
f 8 7 6 5
f 4 3 7 8
f 5 6 2 1
f 2 6 7 3
f 5 1 4 8
";

    #[test]
    fn test_cube_from_str() {
        let model = Model::from_obj_str(CUBE, MeshOptions::default()).unwrap();
        assert_eq!(model.name(), Some("cube"));
        assert_eq!(model.triangle_count(), 12);
        assert_eq!(model.triangles().len(), 12 * 15);
        assert_eq!(model.normals().len(), 12 * 9);
        assert!(model.center().norm() < 1e-6);
    }

    #[test]
    fn test_parse_error_builds_nothing() {
        let err = Model::from_obj_str("v 0 0 0\nv 1 0 0\nf 1 2\n", MeshOptions::default()).unwrap_err();
        assert!(err.parse_kind().is_some());
    }

    #[test]
    fn test_load_with_missing_material() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cube.obj");
        fs::write(&path, format!("mtllib cube.mtl\n{CUBE}")).unwrap();

        let model = Model::load(&path).unwrap();
        let material = model.material();
        assert_eq!(material.ambient, Rgb::default());
        assert_eq!(material.diffuse, Rgb::default());
        assert_eq!(material.specular, Rgb::default());
        assert_eq!(material.specular_exponent, 0.0);
        assert_eq!(material.optical_density, 0.0);
        assert_eq!(material.dissolve, None);
        assert_eq!(material.transparency, None);
        assert_eq!(material.illumination, Illumination::ColorOnAmbientOff);
        assert_eq!(model.triangle_count(), 12);
    }

    #[test]
    fn test_load_with_material() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("cube.mtl"), "Ka 0.1 0.2 0.3\nNs 10\nd 0.5\nillum 2\n").unwrap();
        let path = dir.path().join("cube.obj");
        fs::write(&path, format!("mtllib cube.mtl\n{CUBE}")).unwrap();

        let model = Model::load(&path).unwrap();
        assert_eq!(model.material().ambient, Rgb::from([0.1, 0.2, 0.3]));
        assert_eq!(model.material().specular_exponent, 10.0);
        assert_eq!(model.material().opacity(), 0.5);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Model::load(dir.path().join("missing.obj")).unwrap_err();
        assert!(matches!(err, ModelError::FileNotFound { .. }));
        assert!(err.to_string().contains("missing.obj"));
    }
}
