use fieldmap_model::FieldType;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConversionError>;

/// Why a registered converter refused a value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConversionError {
    #[error("No converter from {from} to {to}")]
    Unsupported { from: FieldType, to: FieldType },

    #[error("Cannot parse '{value}' as {target}")]
    Parse { value: String, target: FieldType },

    #[error("Value {value} is out of range for {target}")]
    OutOfRange { value: String, target: FieldType },
}

impl ConversionError {
    pub(crate) fn parse(value: impl ToString, target: FieldType) -> Self {
        Self::Parse {
            value: value.to_string(),
            target,
        }
    }

    pub(crate) fn range(value: impl ToString, target: FieldType) -> Self {
        Self::OutOfRange {
            value: value.to_string(),
            target,
        }
    }
}
