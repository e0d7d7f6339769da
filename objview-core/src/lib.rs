/// objview core library - OBJ/MTL loading, mesh flattening and view math
///
/// Nothing here touches a window or a GPU: the renderer consumes the flat
/// vertex streams from [`Model`] and the matrices from [`Transform`] and
/// [`Camera`].

pub mod camera;
pub mod error;
pub mod geometry;
pub mod mesh;
pub mod model;
pub mod mtl;
pub mod obj;
pub mod projection;
pub mod transform;

mod tokens;

// Re-export commonly used types
pub use camera::{Camera, Movement};
pub use error::{MaterialError, ModelError, ParseErrorKind};
pub use mesh::{Mesh, MeshBuilder, MeshOptions, UvMode, VERTEX_LAYOUT};
pub use model::Model;
pub use mtl::Material;
pub use obj::{ObjData, ObjParser};
pub use projection::Projection;
pub use transform::{RotationState, Transform};
