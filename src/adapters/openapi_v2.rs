//! Adapter for `swagger: "2.0"` documents

use serde_json::Value;

use crate::adapters::document_adapter::DocumentAdapter;
use crate::config::Settings;
use crate::domain::schema::ArrayItems;
use crate::domain::{ApiDocument, SchemaNode, SchemaReader};

pub struct OpenApiV2 {
    document: ApiDocument,
    max_loops: usize,
    content_type: String,
}

impl OpenApiV2 {
    pub fn new(document: ApiDocument, settings: &Settings) -> Self {
        Self {
            document,
            max_loops: settings.max_loops,
            content_type: settings.content_type.clone(),
        }
    }

    fn string_list(value: Option<&Value>) -> Option<Vec<String>> {
        let list: Vec<String> = value?
            .as_array()?
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect();
        (!list.is_empty()).then_some(list)
    }
}

impl SchemaReader for OpenApiV2 {
    fn read<'a>(&self, raw: &'a Value) -> SchemaNode<'a> {
        if let Some(reference) = SchemaNode::reference(raw) {
            return SchemaNode::Reference(reference);
        }

        let items = raw.get("items").map(|items| match items {
            Value::Array(tuple) => ArrayItems::Tuple(tuple.iter().collect()),
            Value::Object(_) => ArrayItems::Single(Some(items)),
            _ => ArrayItems::Single(None),
        });

        SchemaNode::classify(
            raw,
            raw.get("type").and_then(Value::as_str),
            items,
            raw.get("example"),
        )
    }
}

impl DocumentAdapter for OpenApiV2 {
    fn document(&self) -> &ApiDocument {
        &self.document
    }

    fn max_loops(&self) -> usize {
        self.max_loops
    }

    fn preferred_content_type(&self) -> &str {
        &self.content_type
    }

    fn base_url(&self) -> String {
        let root = &self.document.root;
        let host = root.get("host").and_then(Value::as_str).unwrap_or_default();
        let base_path = root.get("basePath").and_then(Value::as_str).unwrap_or_default();
        format!("{}{}", host, base_path)
    }

    /// `produces` of the operation, else of the document.
    fn offered_content_types(&self, operation: &Value, _response: &Value) -> Vec<String> {
        Self::string_list(operation.get("produces"))
            .or_else(|| Self::string_list(self.document.root.get("produces")))
            .unwrap_or_default()
    }

    fn response_schema<'a>(&self, response: &'a Value, _content_type: &str) -> Option<&'a Value> {
        response.get("schema")
    }

    fn response_example<'a>(&self, response: &'a Value, content_type: &str) -> Option<&'a Value> {
        response.get("examples")?.get(content_type)
    }
}
