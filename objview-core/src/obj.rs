/// Wavefront OBJ reader
///
/// Supports the `o`, `mtllib`, `v`, `vn`, `vt` and `f` directives; anything
/// else is skipped. Faces are validated as they are read: every index must
/// point at an element defined earlier in the file.
use std::fs;
use std::io::{BufRead, BufReader, Cursor};
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::error::{IndexKind, MaterialError, ModelError, ParseErrorKind, Result};
use crate::geometry::{Face, FaceFormat, FaceIndex, RawVertex, TexCoord};
use crate::mtl::{candidate_paths, Material};
use crate::tokens::{lines, parse_face_token, parse_floats, parse_vector3, split_directive};

/// Everything read from an OBJ file, before triangulation
#[derive(Debug, Clone, Default)]
pub struct ObjData {
    pub name: Option<String>,
    pub vertices: Vec<RawVertex>,
    pub tex_coords: Vec<TexCoord>,
    pub normals: Vec<[f32; 3]>,
    pub faces: Vec<Face>,
    pub material: Material,
    /// Material file that was actually read, if any
    pub material_path: Option<PathBuf>,
    /// Format of the first face in the file
    pub face_format: Option<FaceFormat>,
    /// Set when a later face does not use the first face's format
    pub mixed_face_formats: bool,
}

/// Line-by-line OBJ parser. Owns the data until the whole input has been
/// read, so a failed parse never hands out partial geometry.
#[derive(Debug)]
pub struct ObjParser {
    data: ObjData,
    path: PathBuf,
    base_dir: Option<PathBuf>,
    line: usize,
}

impl ObjParser {
    fn new(path: &Path, base_dir: Option<PathBuf>) -> Self {
        Self {
            data: ObjData::default(),
            path: path.to_path_buf(),
            base_dir,
            line: 0,
        }
    }

    /// Parse the OBJ file at `path`. `mtllib` references are resolved as
    /// written and then relative to the file's directory.
    pub fn parse_file(path: &Path) -> Result<ObjData> {
        let file = fs::File::open(path).map_err(|e| ModelError::from_io(path.to_path_buf(), e))?;
        info!("Loading model: {}", path.display());

        let base_dir = path.parent().map(Path::to_path_buf);
        Self::new(path, base_dir).run(BufReader::new(file))
    }

    /// Parse OBJ text held in memory. `mtllib` paths are taken as written.
    pub fn parse_str(source: &str) -> Result<ObjData> {
        Self::new(Path::new("<memory>"), None).run(Cursor::new(source))
    }

    /// Parse from any reader; `path` names the source in errors and anchors
    /// relative `mtllib` paths
    pub fn parse_reader<R: BufRead>(reader: R, path: &Path) -> Result<ObjData> {
        let base_dir = path.parent().map(Path::to_path_buf);
        Self::new(path, base_dir).run(reader)
    }

    fn run<R: BufRead>(mut self, reader: R) -> Result<ObjData> {
        for line in lines(reader) {
            let line = line.map_err(|e| ModelError::from_io(self.path.clone(), e))?;
            self.line += 1;
            self.parse_line(&line)?;
        }

        info!(
            "Parsed {}: {} vertices, {} texture coordinates, {} normals, {} faces",
            self.path.display(),
            self.data.vertices.len(),
            self.data.tex_coords.len(),
            self.data.normals.len(),
            self.data.faces.len()
        );
        Ok(self.data)
    }

    fn error(&self, kind: ParseErrorKind) -> ModelError {
        ModelError::Parse {
            path: self.path.clone(),
            line: self.line,
            kind,
        }
    }

    fn parse_line(&mut self, line: &str) -> Result<()> {
        let Some((keyword, value)) = split_directive(line) else {
            return Ok(());
        };

        match keyword {
            "o" => {
                self.data.name = if value.is_empty() {
                    None
                } else {
                    Some(value.to_string())
                };
            }
            "mtllib" => self.load_material(value)?,
            "v" => {
                let [x, y, z] = parse_vector3(value).map_err(|kind| self.error(kind))?;
                self.data.vertices.push(RawVertex::new(x, y, z));
            }
            "vn" => {
                let normal = parse_vector3(value).map_err(|kind| self.error(kind))?;
                self.data.normals.push(normal);
            }
            "vt" => {
                let tex_coord = self.parse_tex_coord(value).map_err(|kind| self.error(kind))?;
                self.data.tex_coords.push(tex_coord);
            }
            "f" => {
                let face = self.parse_face(value).map_err(|kind| self.error(kind))?;
                self.push_face(face);
            }
            other => debug!("Ignoring directive {:?} on line {}", other, self.line),
        }
        Ok(())
    }

    fn parse_tex_coord(&self, value: &str) -> std::result::Result<TexCoord, ParseErrorKind> {
        let numbers = parse_floats(value)?;
        match numbers[..] {
            [u, v] => Ok(TexCoord { u, v, w: 0.0 }),
            [u, v, w, ..] => Ok(TexCoord { u, v, w }),
            _ => Err(ParseErrorKind::MissingComponent {
                expected: 2,
                found: numbers.len(),
            }),
        }
    }

    fn parse_face(&self, value: &str) -> std::result::Result<Face, ParseErrorKind> {
        let tokens: Vec<&str> = value.split_whitespace().collect();
        if tokens.len() < 3 {
            return Err(ParseErrorKind::TooFewFaceIndices(tokens.len()));
        }

        let mut format = FaceFormat::Plain;
        let mut indices = Vec::with_capacity(tokens.len());
        for token in tokens {
            let token = parse_face_token(token)?;
            if token.slashed {
                format = FaceFormat::Slashed;
            }

            let vertex = resolve(token.vertex, IndexKind::Vertex, self.data.vertices.len())?;
            let tex_coord = token
                .tex_coord
                .map(|index| resolve(index, IndexKind::TexCoord, self.data.tex_coords.len()))
                .transpose()?;
            let normal = token
                .normal
                .map(|index| resolve(index, IndexKind::Normal, self.data.normals.len()))
                .transpose()?;

            indices.push(FaceIndex {
                vertex,
                tex_coord,
                normal,
            });
        }

        Ok(Face { indices, format })
    }

    fn push_face(&mut self, face: Face) {
        match self.data.face_format {
            None => self.data.face_format = Some(face.format),
            Some(first) if first != face.format && !self.data.mixed_face_formats => {
                warn!(
                    "{}:{}: face format {:?} differs from the first face ({:?}); each face keeps its own references",
                    self.path.display(),
                    self.line,
                    face.format,
                    first
                );
                self.data.mixed_face_formats = true;
            }
            Some(_) => {}
        }
        self.data.faces.push(face);
    }

    /// A missing material file only costs the material; malformed contents
    /// abort the load.
    fn load_material(&mut self, reference: &str) -> Result<()> {
        if reference.is_empty() {
            warn!("{}:{}: mtllib without a file name", self.path.display(), self.line);
            return Ok(());
        }

        for candidate in candidate_paths(reference, self.base_dir.as_deref()) {
            match self.data.material.merge_file(&candidate) {
                Ok(()) => {
                    debug!("Loaded material file {}", candidate.display());
                    self.data.material_path = Some(candidate);
                    return Ok(());
                }
                Err(MaterialError::NotFound { .. }) => continue,
                Err(e) => return Err(e.into()),
            }
        }

        warn!(
            "Error opening the material file {}, using the default material",
            reference
        );
        Ok(())
    }
}

/// Turn a 1-based file index into a 0-based one, checking it against the
/// number of elements defined so far
fn resolve(index: i64, kind: IndexKind, len: usize) -> std::result::Result<usize, ParseErrorKind> {
    if index == 0 {
        return Err(ParseErrorKind::ZeroIndex(kind));
    }
    if index < 0 {
        return Err(ParseErrorKind::NegativeIndex { kind, index });
    }

    let index = index as usize;
    if index > len {
        return Err(ParseErrorKind::IndexOutOfRange { kind, index, len });
    }
    Ok(index - 1)
}
