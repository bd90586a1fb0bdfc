//! Path expressions for addressing values inside JSON and XML documents.
//!
//! A path is a `/`-separated list of segments. Each segment names a child
//! element (or JSON property), optionally qualified with a namespace prefix,
//! optionally marked as a collection, and optionally flagged as an attribute.
//!
//! ```text
//! /ns:orders/order<2>/items[]/@ns:sku
//!  |          |        |      |
//!  |          |        |      +-- attribute, namespace prefix `ns`
//!  |          |        +--------- array collection, unindexed
//!  |          +------------------ list collection, index 2
//!  +----------------------------- element with namespace prefix `ns`
//! ```
//!
//! Paths are parsed once and reused for reading, writing and counting.

pub mod error;
pub mod expression;
pub mod parser;
pub mod segment;

pub use error::{PathError, Result};
pub use expression::{PathExpression, Segments};
pub use parser::Parser;
pub use segment::{CollectionKind, PathSegment};
