/// Error types for model and material loading
use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ModelError>;

/// Which attribute array a face index refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKind {
    Vertex,
    TexCoord,
    Normal,
}

impl std::fmt::Display for IndexKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            IndexKind::Vertex => "vertex",
            IndexKind::TexCoord => "texture coordinate",
            IndexKind::Normal => "normal",
        };
        f.write_str(name)
    }
}

/// What was wrong with a single line of an OBJ file
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseErrorKind {
    #[error("invalid number {0:?}")]
    InvalidNumber(String),
    #[error("expected {expected} values, found {found}")]
    MissingComponent { expected: usize, found: usize },
    #[error("face needs at least 3 indices, found {0}")]
    TooFewFaceIndices(usize),
    #[error("{0} index 0 is not valid, indices start at 1")]
    ZeroIndex(IndexKind),
    #[error("negative {kind} index {index} is not supported")]
    NegativeIndex { kind: IndexKind, index: i64 },
    #[error("{kind} index {index} is out of range, only {len} defined so far")]
    IndexOutOfRange {
        kind: IndexKind,
        index: usize,
        len: usize,
    },
    #[error("malformed face token {0:?}")]
    MalformedFaceToken(String),
}

/// Fatal conditions that abort a model load
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("File {} could not be opened", path.display())]
    FileNotFound { path: PathBuf },
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{}:{line}: {kind}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        kind: ParseErrorKind,
    },
    #[error("Invalid material: {0}")]
    Material(#[from] MaterialError),
}

impl ModelError {
    pub(crate) fn from_io(path: PathBuf, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            ModelError::FileNotFound { path }
        } else {
            ModelError::Io { path, source }
        }
    }

    /// The line-level cause, if this is a parse error
    pub fn parse_kind(&self) -> Option<&ParseErrorKind> {
        match self {
            ModelError::Parse { kind, .. } => Some(kind),
            _ => None,
        }
    }
}

/// Errors raised while reading an MTL file.
///
/// `NotFound` is recoverable: the OBJ loader logs it and keeps a zeroed material.
#[derive(Error, Debug)]
pub enum MaterialError {
    #[error("Material file {} could not be opened", path.display())]
    NotFound { path: PathBuf },
    #[error("Failed to read material file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{}:{line}: {kind}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        kind: ParseErrorKind,
    },
}

impl MaterialError {
    pub(crate) fn from_io(path: PathBuf, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            MaterialError::NotFound { path }
        } else {
            MaterialError::Io { path, source }
        }
    }

    pub fn is_recoverable(&self) -> bool {
        matches!(self, MaterialError::NotFound { .. })
    }
}
