use fieldmap_document::DocumentError;
use fieldmap_path::PathError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, EngineError>;

/// Failures that abort a pass. Field-level problems are reported as
/// diagnostics instead.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    MalformedPath(#[from] PathError),

    #[error(transparent)]
    Document(#[from] DocumentError),
}
