//! Field mapping engine.
//!
//! Compiles a [`MappingSpec`](fieldmap_model::MappingSpec) into a
//! [`MappingPlan`] and executes it against one or more source documents,
//! producing a target document plus field-level diagnostics.
//!
//! ```no_run
//! use std::sync::Arc;
//! use fieldmap_conversion::TypeConversionRegistry;
//! use fieldmap_document::{Document, DocumentFormat};
//! use fieldmap_engine::{MappingEngine, SourceDocument};
//! use fieldmap_model::{Field, Mapping, MappingSpec};
//!
//! let engine = MappingEngine::new(Arc::new(TypeConversionRegistry::new()));
//! let spec = MappingSpec::new(vec![Mapping::map(Field::new("/name"), Field::new("/person/name"))]);
//! let source = Document::parse(DocumentFormat::Json, r#"{"name": "Ozzie"}"#).unwrap();
//!
//! let outcome = engine
//!     .process(&spec, &[SourceDocument::new("source", source)], DocumentFormat::Xml)
//!     .unwrap();
//! assert!(!outcome.has_errors());
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod outcome;
pub mod plan;
mod run;

pub use config::EngineConfig;
pub use engine::{MappingEngine, SourceDocument, Target};
pub use error::{EngineError, Result};
pub use outcome::MappingOutcome;
pub use plan::{MappingPlan, PlannedField, PlannedMapping};
