//! Conversion concern classification

use serde::{Deserialize, Serialize};
use std::fmt;

/// Safety classification of an automatic type conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConversionConcern {
    /// Always safe
    #[default]
    None,
    /// Value may not fit the target range
    Range,
    /// Value may not be parseable in the target format
    Format,
    /// No conversion exists, or the value was refused
    Unsupported,
}

impl ConversionConcern {
    /// `true` for concerns that still produce a value but deserve a warning.
    pub fn is_warning(self) -> bool {
        matches!(self, Self::Range | Self::Format)
    }
}

impl fmt::Display for ConversionConcern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::None => "none",
            Self::Range => "range",
            Self::Format => "format",
            Self::Unsupported => "unsupported",
        };
        f.write_str(s)
    }
}
