//! WF3D Core Library - Wavefront OBJ geometry pipeline
//!
//! This library provides the stateless core of the viewer: OBJ parsing and
//! writing, mesh editing, affine transforms, camera projection, screen-space
//! picking and the wireframe render pass. Everything runs synchronously on
//! the calling thread; file I/O belongs to the caller.

pub mod error;
pub mod geometry;
pub mod math;
pub mod obj;
pub mod picking;
pub mod projection;
pub mod render;
pub mod scene;
pub mod transform;

// Re-export commonly used types
pub use error::{Error, IndexError, ParseError, ProjectionError, Result, SingularMatrixError, WriteError};
pub use geometry::{Corner, Mesh, Polygon};
pub use obj::{parse_obj, write_obj, write_obj_with_comment};
pub use picking::{pick_model, pick_polygon, pick_vertex};
pub use projection::{Camera, Ray, ScreenPoint, Viewport};
pub use render::{render_scene, LineStyle, LineSurface};
pub use scene::{EditMode, Scene, SceneObject, Selection};
pub use transform::ModelTransform;
