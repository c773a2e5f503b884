//! Reads description documents from the configured folder

use serde_json::{Map, Number, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::domain::{ApiDocument, DocumentError};

const EXTENSIONS: [&str; 3] = ["yaml", "yml", "json"];

pub struct DocumentLoader {
    folder: PathBuf,
}

impl DocumentLoader {
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
        }
    }

    /// Loads every `.yaml`, `.yml` and `.json` file, sorted by file name.
    pub fn load(&self) -> Result<Vec<ApiDocument>, DocumentError> {
        let folder = self.folder.to_string_lossy().to_string();
        if !self.folder.is_dir() {
            return Err(DocumentError::FolderNotFound(folder));
        }

        let pattern = format!("{}/*", glob::Pattern::escape(&folder));
        let mut paths: Vec<PathBuf> = Vec::new();
        for entry in glob::glob(&pattern)? {
            match entry {
                Ok(path) => {
                    let supported = path
                        .extension()
                        .and_then(|e| e.to_str())
                        .is_some_and(|ext| EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()));
                    if supported && path.is_file() {
                        paths.push(path);
                    } else {
                        debug!("Skipping {}", path.display());
                    }
                }
                Err(e) => warn!("Failed to read glob entry: {}", e),
            }
        }
        paths.sort();

        if paths.is_empty() {
            return Err(DocumentError::NoDocuments(folder));
        }

        let documents = paths
            .iter()
            .map(|path| Self::load_file(path))
            .collect::<Result<Vec<_>, _>>()?;

        info!("Loaded {} mock documents from {}", documents.len(), folder);
        Ok(documents)
    }

    /// Parses one file and classifies its dialect.
    pub fn load_file(path: &Path) -> Result<ApiDocument, DocumentError> {
        let content = std::fs::read_to_string(path)?;
        let source = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let root = if is_json {
            serde_json::from_str(&content).map_err(|e| DocumentError::Parse {
                path: source.clone(),
                reason: e.to_string(),
            })?
        } else {
            parse_yaml(&content).map_err(|e| DocumentError::Parse {
                path: source.clone(),
                reason: e.to_string(),
            })?
        };

        let document = ApiDocument::new(source, root)?;
        debug!("Parsed {} ({})", document.source, document.dialect);
        Ok(document)
    }
}

/// Parses YAML into JSON values, keeping mapping order.
///
/// Non-string keys such as unquoted `200:` status codes become strings.
pub fn parse_yaml(content: &str) -> Result<Value, serde_yaml::Error> {
    let yaml: serde_yaml::Value = serde_yaml::from_str(content)?;
    Ok(yaml_to_json(yaml))
}

fn yaml_to_json(yaml: serde_yaml::Value) -> Value {
    match yaml {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::Bool(b) => Value::Bool(b),
        serde_yaml::Value::Number(n) => yaml_number(&n),
        serde_yaml::Value::String(s) => Value::String(s),
        serde_yaml::Value::Sequence(items) => Value::Array(items.into_iter().map(yaml_to_json).collect()),
        serde_yaml::Value::Mapping(mapping) => {
            let mut map = Map::with_capacity(mapping.len());
            for (key, value) in mapping {
                map.insert(yaml_key(key), yaml_to_json(value));
            }
            Value::Object(map)
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json(tagged.value),
    }
}

fn yaml_number(n: &serde_yaml::Number) -> Value {
    if let Some(i) = n.as_i64() {
        Value::from(i)
    } else if let Some(u) = n.as_u64() {
        Value::from(u)
    } else {
        n.as_f64()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}

fn yaml_key(key: serde_yaml::Value) -> String {
    match key {
        serde_yaml::Value::String(s) => s,
        serde_yaml::Value::Number(n) => n.to_string(),
        serde_yaml::Value::Bool(b) => b.to_string(),
        serde_yaml::Value::Null => "null".to_string(),
        other => yaml_to_json(other).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_yaml_stringifies_status_keys() {
        let value = parse_yaml(
            r#"
responses:
  200:
    description: ok
  "404":
    description: missing
  default:
    description: other
"#,
        )
        .unwrap();

        let keys: Vec<&String> = value["responses"].as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["200", "404", "default"]);
    }

    #[test]
    fn test_parse_yaml_keeps_property_order() {
        let value = parse_yaml(
            r#"
properties:
  zebra: {type: string}
  apple: {type: integer}
  mango: {type: boolean}
"#,
        )
        .unwrap();

        let keys: Vec<&String> = value["properties"].as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["zebra", "apple", "mango"]);
        assert_eq!(value["properties"]["apple"], json!({"type": "integer"}));
    }

    #[test]
    fn test_missing_folder() {
        let loader = DocumentLoader::new("/definitely/not/here");
        assert!(matches!(loader.load(), Err(DocumentError::FolderNotFound(_))));
    }
}
