//! Error types for path parsing

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, PathError>;

/// Path parsing errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("Malformed path '{path}' at position {position}: {reason}")]
    Malformed {
        path: String,
        position: usize,
        reason: String,
    },
}

impl PathError {
    pub(crate) fn malformed(path: &str, position: usize, reason: impl Into<String>) -> Self {
        Self::Malformed {
            path: path.to_string(),
            position,
            reason: reason.into(),
        }
    }

    /// Character offset of the offending character in the source path.
    pub fn position(&self) -> usize {
        match self {
            Self::Malformed { position, .. } => *position,
        }
    }
}
