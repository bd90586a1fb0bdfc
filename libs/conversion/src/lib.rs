//! Type conversion and field actions
//!
//! - [`TypeConversionRegistry`]: `(source, target)` converters with a
//!   [`ConversionConcern`](fieldmap_model::ConversionConcern) per pair
//! - [`actions`]: the ordered field action pipeline
//!
//! Both are immutable once built and safe to share between threads.

pub mod actions;
pub mod converters;
pub mod error;
pub mod registry;

pub use error::{ConversionError, Result};
pub use registry::{Conversion, ConvertFn, Converter, TypeConversionRegistry};
