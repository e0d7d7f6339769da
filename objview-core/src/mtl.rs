/// MTL material files
///
/// Only one material is kept per model: every line of every referenced file is
/// merged into the same record, so later definitions win.
use std::fs;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::{MaterialError, ParseErrorKind};
use crate::tokens::{lines, parse_integer, parse_scalar, parse_vector3, split_directive};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl From<[f32; 3]> for Rgb {
    fn from([r, g, b]: [f32; 3]) -> Self {
        Self { r, g, b }
    }
}

/// `illum` values defined by the MTL format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Illumination {
    #[default]
    ColorOnAmbientOff,
    ColorOnAmbientOn,
    Highlight,
    ReflectionRayTrace,
    GlassRayTrace,
    FresnelRayTrace,
    RefractionRayTrace,
    RefractionFresnelRayTrace,
    Reflection,
    Glass,
    ShadowsOnInvisible,
    Other(i64),
}

impl From<i64> for Illumination {
    fn from(id: i64) -> Self {
        match id {
            0 => Illumination::ColorOnAmbientOff,
            1 => Illumination::ColorOnAmbientOn,
            2 => Illumination::Highlight,
            3 => Illumination::ReflectionRayTrace,
            4 => Illumination::GlassRayTrace,
            5 => Illumination::FresnelRayTrace,
            6 => Illumination::RefractionRayTrace,
            7 => Illumination::RefractionFresnelRayTrace,
            8 => Illumination::Reflection,
            9 => Illumination::Glass,
            10 => Illumination::ShadowsOnInvisible,
            other => Illumination::Other(other),
        }
    }
}

impl Illumination {
    pub fn id(&self) -> i64 {
        match self {
            Illumination::ColorOnAmbientOff => 0,
            Illumination::ColorOnAmbientOn => 1,
            Illumination::Highlight => 2,
            Illumination::ReflectionRayTrace => 3,
            Illumination::GlassRayTrace => 4,
            Illumination::FresnelRayTrace => 5,
            Illumination::RefractionRayTrace => 6,
            Illumination::RefractionFresnelRayTrace => 7,
            Illumination::Reflection => 8,
            Illumination::Glass => 9,
            Illumination::ShadowsOnInvisible => 10,
            Illumination::Other(id) => *id,
        }
    }
}

/// Material properties. `Default` is the zeroed material used when no MTL
/// file could be read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Material {
    /// Last `newmtl` name seen
    pub name: Option<String>,
    /// `Ka`
    pub ambient: Rgb,
    /// `Kd`
    pub diffuse: Rgb,
    /// `Ks`
    pub specular: Rgb,
    /// `Ns`
    pub specular_exponent: f32,
    /// `Ni`
    pub optical_density: f32,
    /// `d`, 1.0 is fully opaque
    pub dissolve: Option<f32>,
    /// `Tr`, 1.0 is fully transparent
    pub transparency: Option<f32>,
    /// `illum`
    pub illumination: Illumination,
}

impl Material {
    /// Canonical opacity: `d` when given, otherwise `1 - Tr`, otherwise opaque.
    pub fn opacity(&self) -> f32 {
        match (self.dissolve, self.transparency) {
            (Some(d), _) => d,
            (None, Some(tr)) => 1.0 - tr,
            (None, None) => 1.0,
        }
    }

    /// Merge the material file at `path` into this record
    pub fn merge_file(&mut self, path: &Path) -> Result<(), MaterialError> {
        let file = fs::File::open(path).map_err(|e| MaterialError::from_io(path.to_path_buf(), e))?;
        self.merge_reader(BufReader::new(file), path)
    }

    /// Merge MTL lines from any reader; `path` is only used in diagnostics
    pub fn merge_reader<R: BufRead>(&mut self, reader: R, path: &Path) -> Result<(), MaterialError> {
        for (number, line) in lines(reader).enumerate() {
            let line = line.map_err(|e| MaterialError::from_io(path.to_path_buf(), e))?;
            self.merge_line(&line).map_err(|kind| MaterialError::Parse {
                path: path.to_path_buf(),
                line: number + 1,
                kind,
            })?;
        }
        Ok(())
    }

    fn merge_line(&mut self, line: &str) -> Result<(), ParseErrorKind> {
        let Some((keyword, value)) = split_directive(line) else {
            return Ok(());
        };

        match keyword {
            "newmtl" => self.name = Some(value.to_string()),
            "Ka" => self.ambient = parse_vector3(value)?.into(),
            "Kd" => self.diffuse = parse_vector3(value)?.into(),
            "Ks" => self.specular = parse_vector3(value)?.into(),
            "d" => self.dissolve = Some(parse_scalar(value)?),
            "Tr" => self.transparency = Some(parse_scalar(value)?),
            "Ns" => self.specular_exponent = parse_scalar(value)?,
            "Ni" => self.optical_density = parse_scalar(value)?,
            "illum" => self.illumination = parse_integer(value)?.into(),
            other => debug!("Ignoring material directive {:?}", other),
        }
        Ok(())
    }
}

/// Where to look for a `mtllib` target: the path as written, then the same
/// path next to the OBJ file.
pub(crate) fn candidate_paths(reference: &str, obj_dir: Option<&Path>) -> Vec<PathBuf> {
    let given = PathBuf::from(reference);
    let mut candidates = vec![given.clone()];
    if let Some(dir) = obj_dir.filter(|_| given.is_relative()) {
        let sibling = dir.join(&given);
        if sibling != given {
            candidates.push(sibling);
        }
    }
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const SAMPLE: &str = "\
# Blender MTL File
newmtl Material
Ns 96.078431
Ka 0.000000 0.000000 0.000000
Kd 0.640000 0.640000 0.640000
Ks 0.500000 0.500000 0.500000
Ni 1.000000
d 1.000000
illum 2
";

    fn parse(source: &str) -> Result<Material, MaterialError> {
        let mut material = Material::default();
        material.merge_reader(Cursor::new(source), Path::new("test.mtl"))?;
        Ok(material)
    }

    #[test]
    fn test_parse_sample() {
        let material = parse(SAMPLE).unwrap();
        assert_eq!(material.name.as_deref(), Some("Material"));
        assert!((material.specular_exponent - 96.078431).abs() < 1e-4);
        assert_eq!(material.ambient, Rgb::default());
        assert_eq!(material.diffuse, Rgb::from([0.64, 0.64, 0.64]));
        assert_eq!(material.specular, Rgb::from([0.5, 0.5, 0.5]));
        assert_eq!(material.optical_density, 1.0);
        assert_eq!(material.dissolve, Some(1.0));
        assert_eq!(material.transparency, None);
        assert_eq!(material.illumination, Illumination::Highlight);
    }

    #[test]
    fn test_last_definition_wins() {
        let material = parse("newmtl a\nKd 1 0 0\nnewmtl b\nKd 0 1 0\n").unwrap();
        assert_eq!(material.name.as_deref(), Some("b"));
        assert_eq!(material.diffuse, Rgb::from([0.0, 1.0, 0.0]));
    }

    #[test]
    fn test_non_utf8_name_is_kept_as_text() {
        let mut material = Material::default();
        let source: &[u8] = b"# \xe9bauche\nnewmtl mat\xe9riau\nNs 12\n";
        material.merge_reader(Cursor::new(source), Path::new("latin1.mtl")).unwrap();
        assert_eq!(material.name.as_deref(), Some("mat\u{FFFD}riau"));
        assert_eq!(material.specular_exponent, 12.0);
    }

    #[test]
    fn test_opacity_precedence() {
        let mut material = Material::default();
        assert_eq!(material.opacity(), 1.0);

        material.transparency = Some(0.25);
        assert_eq!(material.opacity(), 0.75);

        material.dissolve = Some(0.5);
        assert_eq!(material.opacity(), 0.5);
    }

    #[test]
    fn test_illumination_ids() {
        assert_eq!(Illumination::from(0), Illumination::ColorOnAmbientOff);
        assert_eq!(Illumination::from(10), Illumination::ShadowsOnInvisible);
        assert_eq!(Illumination::from(42), Illumination::Other(42));
        assert_eq!(Illumination::from(7).id(), 7);
    }

    #[test]
    fn test_malformed_value() {
        let err = parse("Kd 1 x 0\n").unwrap_err();
        match err {
            MaterialError::Parse { line, kind, .. } => {
                assert_eq!(line, 1);
                assert_eq!(kind, ParseErrorKind::InvalidNumber("x".into()));
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert!(!parse("illum\n").unwrap_err().is_recoverable());
    }

    #[test]
    fn test_missing_file_is_recoverable() {
        let dir = tempfile::tempdir().unwrap();
        let mut material = Material::default();
        let err = material.merge_file(&dir.path().join("missing.mtl")).unwrap_err();
        assert!(err.is_recoverable());
        assert_eq!(material, Material::default());
    }

    #[test]
    fn test_candidate_paths() {
        let dir = Path::new("models");
        assert_eq!(
            candidate_paths("cube.mtl", Some(dir)),
            vec![PathBuf::from("cube.mtl"), PathBuf::from("models/cube.mtl")]
        );
        assert_eq!(candidate_paths("cube.mtl", None), vec![PathBuf::from("cube.mtl")]);
        assert_eq!(candidate_paths("cube.mtl", Some(Path::new(""))).len(), 1);
    }
}
