//! Error types for PLY decoding and XYZ conversion.

use thiserror::Error;

/// Errors that can occur while converting a PLY file.
#[derive(Debug, Error)]
pub enum PlyError {
    #[error("Malformed PLY header: {0}")]
    HeaderMalformed(String),

    #[error("No vertex element found in PLY file")]
    MissingVertexElement,

    #[error("Expected {expected} bytes of vertex data, got {actual}")]
    PayloadSizeMismatch { expected: usize, actual: usize },

    #[error("Unrecognized property type: {0}")]
    UnrecognizedPropertyType(String),

    #[error("List property '{name}' in element '{element}' is not supported")]
    UnsupportedListProperty { element: String, name: String },

    #[error("Vertex property '{name}' is missing and index {index} is out of range")]
    MissingProperty { name: &'static str, index: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to move output into place: {0}")]
    Persist(#[from] tempfile::PersistError),
}

pub type Result<T> = std::result::Result<T, PlyError>;
