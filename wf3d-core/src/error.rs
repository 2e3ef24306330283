//! Error types surfaced by the geometry pipeline.
//!
//! Every failure is synchronous and local: the pipeline never retries and
//! never substitutes default geometry. Callers match on the concrete type or
//! collect everything into [`Error`].

use thiserror::Error;

/// Crate-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Malformed OBJ input. `line` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("OBJ parse error at line {line}: {message}")]
pub struct ParseError {
    pub line: usize,
    pub message: String,
}

impl ParseError {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

/// Which per-mesh collection a non-finite component was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Vertex,
    TextureVertex,
    Normal,
}

impl std::fmt::Display for ElementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ElementKind::Vertex => write!(f, "Vertex"),
            ElementKind::TextureVertex => write!(f, "Texture coord"),
            ElementKind::Normal => write!(f, "Normal"),
        }
    }
}

/// Geometry that cannot be exported. Element and polygon numbers are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WriteError {
    #[error("{kind} #{number} contains NaN")]
    NotANumber { kind: ElementKind, number: usize },

    #[error("{kind} #{number} contains infinity")]
    Infinite { kind: ElementKind, number: usize },

    #[error("Polygon #{polygon} has {count} vertices, at least 3 are required")]
    TooFewVertices { polygon: usize, count: usize },

    #[error("Polygon #{polygon} has invalid vertex index: {index}")]
    VertexIndexOutOfRange { polygon: usize, index: usize },

    #[error("Polygon #{polygon}: texture indices count mismatch ({textures} for {vertices} vertices)")]
    TextureCountMismatch {
        polygon: usize,
        textures: usize,
        vertices: usize,
    },

    #[error("Polygon #{polygon} has invalid texture index: {index}")]
    TextureIndexOutOfRange { polygon: usize, index: usize },

    #[error("Polygon #{polygon}: normal indices count mismatch ({normals} for {vertices} vertices)")]
    NormalCountMismatch {
        polygon: usize,
        normals: usize,
        vertices: usize,
    },

    #[error("Polygon #{polygon} has invalid normal index: {index}")]
    NormalIndexOutOfRange { polygon: usize, index: usize },
}

/// Out-of-range index passed to a mutation or accessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IndexError {
    #[error("invalid vertex index {index} (mesh has {len} vertices)")]
    Vertex { index: usize, len: usize },

    #[error("invalid polygon index {index} (mesh has {len} polygons)")]
    Polygon { index: usize, len: usize },

    #[error("invalid scene object index {index} (scene has {len} objects)")]
    SceneObject { index: usize, len: usize },

    #[error("matrix entry ({row}, {col}) is out of bounds for a {dim}x{dim} matrix")]
    MatrixEntry { row: usize, col: usize, dim: usize },
}

/// Attempted inversion of a matrix whose determinant is too close to zero.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("matrix is singular and cannot be inverted (determinant {determinant})")]
pub struct SingularMatrixError {
    pub determinant: f32,
}

/// Perspective parameters that would produce a degenerate projection.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ProjectionError {
    #[error("aspect ratio must be positive and finite, got {0}")]
    InvalidAspect(f32),

    #[error("near and far planes must differ (both are {0})")]
    DegenerateDepthRange(f32),

    #[error("field of view must lie in (0, pi) radians, got {0}")]
    InvalidFov(f32),

    #[error("camera must look away from its position, along a direction not parallel to up")]
    DegenerateView,
}

/// Any pipeline failure.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Write(#[from] WriteError),

    #[error(transparent)]
    Index(#[from] IndexError),

    #[error(transparent)]
    SingularMatrix(#[from] SingularMatrixError),

    #[error(transparent)]
    Projection(#[from] ProjectionError),
}
