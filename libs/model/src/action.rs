//! Field action vocabulary
//!
//! Actions are declared on fields and executed in order by the action
//! pipeline. This module only describes them; the transforms live in the
//! conversion crate.

use crate::value::FieldType;
use serde::{Deserialize, Serialize};

/// A single field action, tagged by `name` when serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all_fields = "camelCase")]
pub enum Action {
    // String -> String
    Trim,
    TrimLeft,
    TrimRight,
    Uppercase,
    Lowercase,
    Capitalize,
    /// Collapse runs of whitespace into a single space and trim
    Normalize,
    Prepend {
        string: String,
    },
    Append {
        string: String,
    },
    SubString {
        start_index: usize,
        #[serde(default)]
        end_index: Option<usize>,
    },
    SubStringBefore {
        start_index: usize,
        #[serde(default)]
        end_index: Option<usize>,
        #[serde(rename = "match")]
        match_string: String,
    },
    SubStringAfter {
        start_index: usize,
        #[serde(default)]
        end_index: Option<usize>,
        #[serde(rename = "match")]
        match_string: String,
    },
    ReplaceFirst {
        #[serde(rename = "match")]
        match_string: String,
        new_string: String,
    },
    /// `match` is a regular expression
    ReplaceAll {
        #[serde(rename = "match")]
        match_string: String,
        new_string: String,
    },
    PadStringLeft {
        pad_character: char,
        pad_count: usize,
    },
    PadStringRight {
        pad_character: char,
        pad_count: usize,
    },

    // String -> Integer
    Length,

    // Numeric
    AbsoluteValue,
    Ceiling,
    Floor,
    Round,
    ConvertMassUnit {
        from_unit: MassUnit,
        to_unit: MassUnit,
    },
    ConvertDistanceUnit {
        from_unit: DistanceUnit,
        to_unit: DistanceUnit,
    },
    ConvertAreaUnit {
        from_unit: AreaUnit,
        to_unit: AreaUnit,
    },
    ConvertVolumeUnit {
        from_unit: VolumeUnit,
        to_unit: VolumeUnit,
    },

    // Date / DateTime -> Integer
    DayOfWeek,
    DayOfYear,

    // Any -> String
    ToString,
    GenerateUuid,
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::Trim => "Trim",
            Action::TrimLeft => "TrimLeft",
            Action::TrimRight => "TrimRight",
            Action::Uppercase => "Uppercase",
            Action::Lowercase => "Lowercase",
            Action::Capitalize => "Capitalize",
            Action::Normalize => "Normalize",
            Action::Prepend { .. } => "Prepend",
            Action::Append { .. } => "Append",
            Action::SubString { .. } => "SubString",
            Action::SubStringBefore { .. } => "SubStringBefore",
            Action::SubStringAfter { .. } => "SubStringAfter",
            Action::ReplaceFirst { .. } => "ReplaceFirst",
            Action::ReplaceAll { .. } => "ReplaceAll",
            Action::PadStringLeft { .. } => "PadStringLeft",
            Action::PadStringRight { .. } => "PadStringRight",
            Action::Length => "Length",
            Action::AbsoluteValue => "AbsoluteValue",
            Action::Ceiling => "Ceiling",
            Action::Floor => "Floor",
            Action::Round => "Round",
            Action::ConvertMassUnit { .. } => "ConvertMassUnit",
            Action::ConvertDistanceUnit { .. } => "ConvertDistanceUnit",
            Action::ConvertAreaUnit { .. } => "ConvertAreaUnit",
            Action::ConvertVolumeUnit { .. } => "ConvertVolumeUnit",
            Action::DayOfWeek => "DayOfWeek",
            Action::DayOfYear => "DayOfYear",
            Action::ToString => "ToString",
            Action::GenerateUuid => "GenerateUuid",
        }
    }

    /// Output type given the accepted input type.
    pub fn output_type(&self, input: FieldType) -> FieldType {
        match self {
            Action::Length | Action::DayOfWeek | Action::DayOfYear => FieldType::Integer,
            Action::AbsoluteValue => input,
            Action::Ceiling | Action::Floor | Action::Round => {
                if input.is_integral() {
                    input
                } else {
                    FieldType::Long
                }
            }
            Action::ConvertMassUnit { .. }
            | Action::ConvertDistanceUnit { .. }
            | Action::ConvertAreaUnit { .. }
            | Action::ConvertVolumeUnit { .. } => FieldType::Decimal,
            _ => FieldType::String,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MassUnit {
    Kilogram,
    Gram,
    Pound,
    Ounce,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DistanceUnit {
    Meter,
    Kilometer,
    Centimeter,
    Foot,
    Yard,
    Mile,
    Inch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AreaUnit {
    SquareMeter,
    SquareFoot,
    SquareMile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VolumeUnit {
    CubicMeter,
    Liter,
    CubicFoot,
    GallonUs,
}
