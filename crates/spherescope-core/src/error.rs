//! Error types for spherescope.

use thiserror::Error;

/// The main error type for spherescope operations.
#[derive(Error, Debug)]
pub enum SpherescopeError {
    /// Spherescope has not been initialized.
    #[error("spherescope not initialized - call spherescope::init() first")]
    NotInitialized,

    /// Spherescope has already been initialized.
    #[error("spherescope already initialized")]
    AlreadyInitialized,

    /// A structure with the given name already exists.
    #[error("structure '{0}' already exists")]
    StructureExists(String),

    /// A structure with the given name was not found.
    #[error("structure '{0}' not found")]
    StructureNotFound(String),

    /// A projection was requested against a mesh with no primitives.
    #[error("cannot project onto an empty sphere mesh")]
    EmptyMeshQuery,

    /// Every primitive of the mesh is geometrically degenerate.
    #[error("sphere mesh has {0} primitive(s), all of them degenerate")]
    DegenerateMesh(usize),

    /// A primitive referenced a vertex the mesh does not own.
    #[error("vertex {index} does not exist (mesh has {count} vertices)")]
    InvalidVertex { index: usize, count: usize },

    /// A primitive referenced the same vertex more than once.
    #[error("primitive repeats vertex {0}")]
    DuplicateVertex(usize),

    /// A vertex carries a sphere that is not finite or has a negative radius.
    #[error("vertex {index} has an invalid sphere: {reason}")]
    InvalidSphere {
        index: usize,
        #[source]
        reason: GeometryError,
    },

    /// Primitive geometry could not be evaluated.
    #[error("geometry error: {0}")]
    Geometry(#[from] GeometryError),

    /// Rendering error.
    #[error("render error: {0}")]
    RenderError(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Failure modes of the weighted-sphere primitive math.
///
/// These are local and recoverable: callers scanning a whole mesh skip the
/// offending primitive.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryError {
    /// Two sphere centers are closer than the geometric tolerance.
    #[error("sphere centers coincide")]
    CoincidentCenters,

    /// One sphere of a pill contains the other, so no tangent cone exists.
    #[error("one sphere is nested inside the other")]
    NestedSpheres,

    /// The skeleton triangle (or its tangent triangle) has no area.
    #[error("sphere centers are collinear")]
    CollinearCenters,

    /// A sphere radius is below zero.
    #[error("sphere radius is negative")]
    NegativeRadius,

    /// A non-finite value reached a result.
    #[error("non-finite value in primitive geometry")]
    NonFinite,
}

/// A specialized Result type for spherescope operations.
pub type Result<T> = std::result::Result<T, SpherescopeError>;

/// Result of a primitive geometry evaluation.
pub type GeometryResult<T> = std::result::Result<T, GeometryError>;
