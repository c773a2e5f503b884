//! Dialect-independent mock synthesis engine

pub mod document;
pub mod error;
pub mod reference;
pub mod schema;
pub mod status;
pub mod synthesizer;

pub use document::{ApiDocument, Dialect};
pub use error::{DocumentError, MockError};
pub use reference::{ReferencePath, ReferenceTrail};
pub use schema::{SchemaNode, SchemaReader};
pub use status::StatusPattern;
pub use synthesizer::Synthesizer;
