use serde_json::Value;
use std::fmt;

use super::error::DocumentError;

/// Description dialect of a loaded document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// `swagger: "2.0"`
    V2,
    /// `openapi: "3.x"`
    V3,
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::V2 => write!(f, "v2"),
            Self::V3 => write!(f, "v3"),
        }
    }
}

impl Dialect {
    /// Detects the dialect from the root marker field.
    pub fn detect(root: &Value) -> Option<Self> {
        let marker = |field: &str| match root.get(field) {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };

        if marker("swagger").is_some_and(|v| v.starts_with('2')) {
            Some(Self::V2)
        } else if marker("openapi").is_some_and(|v| v.starts_with('3')) {
            Some(Self::V3)
        } else {
            None
        }
    }
}

/// A parsed description document tagged with its dialect.
///
/// Immutable once loaded.
#[derive(Debug, Clone)]
pub struct ApiDocument {
    pub source: String,
    pub dialect: Dialect,
    pub root: Value,
}

impl ApiDocument {
    /// Classifies `root`; `source` names the document in diagnostics.
    pub fn new(source: impl Into<String>, root: Value) -> Result<Self, DocumentError> {
        let source = source.into();
        let dialect = Dialect::detect(&root)
            .ok_or_else(|| DocumentError::UnrecognizedDialect(source.clone()))?;
        Ok(Self {
            source,
            dialect,
            root,
        })
    }

    /// `info.title`, or the source name when the document has none.
    pub fn title(&self) -> &str {
        self.root
            .get("info")
            .and_then(|info| info.get("title"))
            .and_then(Value::as_str)
            .unwrap_or(&self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_detect_dialects() {
        assert_eq!(Dialect::detect(&json!({"swagger": "2.0"})), Some(Dialect::V2));
        assert_eq!(Dialect::detect(&json!({"openapi": "3.0.3"})), Some(Dialect::V3));
        assert_eq!(Dialect::detect(&json!({"openapi": "3.1.0"})), Some(Dialect::V3));
        assert_eq!(Dialect::detect(&json!({"swagger": 2.0})), Some(Dialect::V2));
        assert_eq!(Dialect::detect(&json!({"openapi": "4.0"})), None);
        assert_eq!(Dialect::detect(&json!({"asyncapi": "2.6.0"})), None);
    }

    #[test]
    fn test_unrecognized_document_is_rejected() {
        let err = ApiDocument::new("events.yaml", json!({"asyncapi": "2.6.0"})).unwrap_err();
        assert!(matches!(err, DocumentError::UnrecognizedDialect(ref s) if s == "events.yaml"));
    }

    #[test]
    fn test_title_falls_back_to_source() {
        let doc = ApiDocument::new("pets.yaml", json!({"openapi": "3.0.0"})).unwrap();
        assert_eq!(doc.title(), "pets.yaml");

        let doc = ApiDocument::new("pets.yaml", json!({"openapi": "3.0.0", "info": {"title": "Pets"}})).unwrap();
        assert_eq!(doc.title(), "Pets");
    }
}
