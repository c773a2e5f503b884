//! Dialect seam between loaded documents and the synthesis engine
//!
//! Version 2 and version 3 descriptions keep the base URL, response schemas
//! and offered media types in different places. Each dialect implements
//! [`DocumentAdapter`] once; the route binder and the synthesizer only ever
//! talk to the trait.

use serde_json::Value;
use std::sync::Arc;

use crate::adapters::{openapi_v2::OpenApiV2, openapi_v3::OpenApiV3};
use crate::config::Settings;
use crate::domain::reference::{lookup, ReferencePath};
use crate::domain::{ApiDocument, Dialect, ReferenceTrail, SchemaNode, SchemaReader, Synthesizer};

/// HTTP methods that may appear as keys of a path item.
pub const HTTP_METHODS: [&str; 8] = ["get", "put", "post", "delete", "options", "head", "patch", "trace"];

/// Media type meaning "anything the document offers".
pub const ANY_CONTENT_TYPE: &str = "*/*";

/// One declared (path template, method) pair.
#[derive(Debug, Clone)]
pub struct OperationRef<'a> {
    pub template: &'a str,
    pub method: &'a str,
    pub operation: &'a Value,
}

/// Why a response produced no body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentError {
    /// No schema and no example for the selected content type
    Missing,
    /// Top-level schema reference points nowhere
    Dangling(String),
}

pub trait DocumentAdapter: SchemaReader + Send + Sync {
    fn document(&self) -> &ApiDocument;

    /// Cycle bound applied to every reference hop.
    fn max_loops(&self) -> usize;

    /// Configured preferred media type.
    fn preferred_content_type(&self) -> &str;

    /// Server URL declared by the document, or an empty string.
    fn base_url(&self) -> String;

    /// Media types offered for a response, in declaration order.
    fn offered_content_types(&self, operation: &Value, response: &Value) -> Vec<String>;

    /// Body schema of `response` for `content_type`.
    fn response_schema<'a>(&self, response: &'a Value, content_type: &str) -> Option<&'a Value>;

    /// Literal example of `response` for `content_type`.
    fn response_example<'a>(&self, response: &'a Value, content_type: &str) -> Option<&'a Value>;

    /// Looks up an internal reference without cycle accounting.
    fn object_from_ref(&self, reference: &str) -> Option<&Value> {
        let path = ReferencePath::parse(reference)?;
        lookup(&self.document().root, path.keys())
    }

    /// Synthesizes `schema` with this dialect's reading rules.
    fn output_schema(&self, schema: &Value, trail: ReferenceTrail) -> Value {
        Synthesizer::new(&self.document().root, self, self.max_loops()).synthesize(Some(schema), trail)
    }

    /// The preferred media type if the response offers it.
    fn content_type_response(&self, operation: &Value, response: &Value) -> Option<String> {
        let offered = self.offered_content_types(operation, response);
        negotiate(self.preferred_content_type(), &offered)
    }

    /// Follows one reference hop when the response entry is a reference.
    fn response_object<'a>(&'a self, entry: &'a Value) -> Option<&'a Value> {
        match SchemaNode::reference(entry) {
            Some(reference) => self.object_from_ref(reference),
            None => Some(entry),
        }
    }

    /// Synthesizes the body of `response` for `content_type`.
    ///
    /// A declared schema wins; without one, a literal example is returned
    /// as is.
    fn content_response(&self, response: &Value, content_type: &str) -> Result<Value, ContentError> {
        let response = self
            .response_object(response)
            .ok_or_else(|| ContentError::Dangling(SchemaNode::reference(response).unwrap_or_default().to_string()))?;

        match self.response_schema(response, content_type) {
            Some(schema) => Synthesizer::new(&self.document().root, self, self.max_loops())
                .synthesize_root(schema)
                .ok_or_else(|| ContentError::Dangling(SchemaNode::reference(schema).unwrap_or_default().to_string())),
            None => self
                .response_example(response, content_type)
                .cloned()
                .ok_or(ContentError::Missing),
        }
    }

    /// Every declared operation under `paths`, in document order.
    fn operations(&self) -> Vec<OperationRef<'_>> {
        let Some(paths) = self.document().root.get("paths").and_then(Value::as_object) else {
            return Vec::new();
        };

        paths
            .iter()
            .filter_map(|(template, item)| item.as_object().map(|methods| (template, methods)))
            .flat_map(|(template, methods)| {
                methods
                    .iter()
                    .filter(|(method, _)| HTTP_METHODS.contains(&method.as_str()))
                    .map(move |(method, operation)| OperationRef {
                        template: template.as_str(),
                        method: method.as_str(),
                        operation,
                    })
            })
            .collect()
    }
}

/// Picks `preferred` when offered; `*/*` accepts the first offered type.
pub fn negotiate(preferred: &str, offered: &[String]) -> Option<String> {
    if offered.iter().any(|t| t == preferred) {
        Some(preferred.to_string())
    } else if preferred == ANY_CONTENT_TYPE {
        offered.first().cloned()
    } else {
        None
    }
}

/// Wraps a loaded document in the adapter for its dialect.
pub fn adapter_for(document: ApiDocument, settings: &Settings) -> Arc<dyn DocumentAdapter> {
    match document.dialect {
        Dialect::V2 => Arc::new(OpenApiV2::new(document, settings)),
        Dialect::V3 => Arc::new(OpenApiV3::new(document, settings)),
    }
}
