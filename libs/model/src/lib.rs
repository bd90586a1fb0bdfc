//! Shared model for field mapping.
//!
//! - [`FieldType`] / [`Value`]: format-independent types and tagged scalar values
//! - [`Field`] / [`FieldValue`]: declared fields and their per-pass values
//! - [`Mapping`] / [`MappingSpec`] / [`LookupTable`]: the declarative mapping spec
//! - [`Action`]: the fixed field-action vocabulary
//! - [`Diagnostic`]: non-fatal, field-level issues reported by a pass
//! - [`SchemaProvider`]: schema discovery capability implemented outside the engine

pub mod action;
pub mod concern;
pub mod diagnostic;
pub mod field;
pub mod mapping;
pub mod schema;
pub mod value;

pub use action::{Action, AreaUnit, DistanceUnit, MassUnit, VolumeUnit};
pub use concern::ConversionConcern;
pub use diagnostic::{Diagnostic, DiagnosticCode, Severity};
pub use field::{Field, FieldValue};
pub use mapping::{CollectionType, LookupEntry, LookupTable, Mapping, MappingSpec, MappingType};
pub use schema::{Cardinality, FieldDescriptor, SchemaProvider};
pub use value::{FieldType, UnknownFieldType, Value};
