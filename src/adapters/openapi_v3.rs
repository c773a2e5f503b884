//! Adapter for `openapi: 3.x` documents

use serde_json::Value;

use crate::adapters::document_adapter::DocumentAdapter;
use crate::config::Settings;
use crate::domain::schema::ArrayItems;
use crate::domain::{ApiDocument, SchemaNode, SchemaReader};

pub struct OpenApiV3 {
    document: ApiDocument,
    max_loops: usize,
    content_type: String,
}

impl OpenApiV3 {
    pub fn new(document: ApiDocument, settings: &Settings) -> Self {
        Self {
            document,
            max_loops: settings.max_loops,
            content_type: settings.content_type.clone(),
        }
    }

    /// First server URL with `{variable}` placeholders replaced by defaults.
    fn server_url(servers: Option<&Value>) -> Option<String> {
        let server = servers?.as_array()?.first()?;
        let mut url = server.get("url")?.as_str()?.to_string();

        if let Some(variables) = server.get("variables").and_then(Value::as_object) {
            for (name, variable) in variables {
                if let Some(default) = variable.get("default").and_then(Value::as_str) {
                    url = url.replace(&format!("{{{}}}", name), default);
                }
            }
        }
        Some(url)
    }

    fn media_type<'a>(response: &'a Value, content_type: &str) -> Option<&'a Value> {
        response.get("content")?.get(content_type)
    }
}

impl SchemaReader for OpenApiV3 {
    fn read<'a>(&self, raw: &'a Value) -> SchemaNode<'a> {
        if let Some(reference) = SchemaNode::reference(raw) {
            return SchemaNode::Reference(reference);
        }

        // 3.1 allows `type: [string, "null"]`
        let type_keyword = match raw.get("type") {
            Some(Value::String(t)) => Some(t.as_str()),
            Some(Value::Array(types)) => {
                let declared: Vec<&str> = types.iter().filter_map(Value::as_str).collect();
                // Only `null` declared: keep it so the node synthesizes null
                declared
                    .iter()
                    .copied()
                    .find(|t| *t != "null")
                    .or_else(|| declared.first().copied())
            }
            _ => None,
        };

        let items = match (raw.get("prefixItems"), raw.get("items")) {
            (Some(Value::Array(tuple)), _) => Some(ArrayItems::Tuple(tuple.iter().collect())),
            (_, Some(item @ Value::Object(_))) => Some(ArrayItems::Single(Some(item))),
            (_, Some(_)) => Some(ArrayItems::Single(None)),
            (_, None) => None,
        };

        let example = raw
            .get("example")
            .or_else(|| raw.get("examples").and_then(Value::as_array).and_then(|e| e.first()));

        SchemaNode::classify(raw, type_keyword, items, example)
    }
}

impl DocumentAdapter for OpenApiV3 {
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
        Self::server_url(root.get("servers"))
            .or_else(|| {
                Self::server_url(
                    root.get("x-ibm-configuration")
                        .and_then(|c| c.get("servers")),
                )
            })
            .unwrap_or_default()
    }

    fn offered_content_types(&self, _operation: &Value, response: &Value) -> Vec<String> {
        response
            .get("content")
            .and_then(Value::as_object)
            .map(|content| content.keys().cloned().collect())
            .unwrap_or_default()
    }

    fn response_schema<'a>(&self, response: &'a Value, content_type: &str) -> Option<&'a Value> {
        Self::media_type(response, content_type)?.get("schema")
    }

    fn response_example<'a>(&self, response: &'a Value, content_type: &str) -> Option<&'a Value> {
        let media = Self::media_type(response, content_type)?;
        media.get("example").or_else(|| {
            media
                .get("examples")?
                .as_object()?
                .values()
                .find_map(|example| example.get("value"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::document_adapter::ContentError;
    use crate::domain::ReferenceTrail;
    use serde_json::json;

    fn adapter(root: Value) -> OpenApiV3 {
        let settings = Settings {
            content_type: "application/json".to_string(),
            ..Settings::default()
        };
        OpenApiV3::new(ApiDocument::new("test.yaml", root).unwrap(), &settings)
    }

    #[test]
    fn test_base_url_from_servers() {
        let v3 = adapter(json!({"openapi": "3.0.0", "servers": [{"url": "http://x/api"}, {"url": "http://y"}]}));
        assert_eq!(v3.base_url(), "http://x/api");
    }

    #[test]
    fn test_base_url_substitutes_variables() {
        let v3 = adapter(json!({
            "openapi": "3.0.0",
            "servers": [{"url": "http://x/{basePath}", "variables": {"basePath": {"default": "v1"}}}]
        }));
        assert_eq!(v3.base_url(), "http://x/v1");
    }

    #[test]
    fn test_base_url_vendor_extension_and_missing() {
        let v3 = adapter(json!({
            "openapi": "3.0.0",
            "x-ibm-configuration": {"servers": [{"url": "http://ibm/api"}]}
        }));
        assert_eq!(v3.base_url(), "http://ibm/api");

        assert_eq!(adapter(json!({"openapi": "3.0.0"})).base_url(), "");
    }

    #[test]
    fn test_content_type_negotiation_uses_response_content() {
        let v3 = adapter(json!({"openapi": "3.0.0"}));
        let response = json!({"content": {"application/xml": {}, "application/json": {}}});
        assert_eq!(
            v3.content_type_response(&json!({}), &response),
            Some("application/json".to_string())
        );

        let xml_only = json!({"content": {"application/xml": {}}});
        assert_eq!(v3.content_type_response(&json!({}), &xml_only), None);
    }

    #[test]
    fn test_content_response_with_component_reference() {
        let v3 = adapter(json!({
            "openapi": "3.0.0",
            "components": {
                "schemas": {"Pet": {"type": "object", "properties": {"id": {"type": "integer"}, "tag": {"type": "string"}}}},
                "responses": {"PetResponse": {"content": {"application/json": {"schema": {"$ref": "#/components/schemas/Pet"}}}}}
            }
        }));

        let response = json!({"$ref": "#/components/responses/PetResponse"});
        assert_eq!(v3.content_response(&response, "application/json"), Ok(json!({"id": 0, "tag": ""})));
    }

    #[test]
    fn test_content_response_falls_back_to_media_example() {
        let v3 = adapter(json!({"openapi": "3.0.0"}));
        let response = json!({"content": {"application/json": {"examples": {"one": {"value": {"ok": true}}}}}});
        assert_eq!(v3.content_response(&response, "application/json"), Ok(json!({"ok": true})));

        let empty = json!({"description": "nothing"});
        assert_eq!(v3.content_response(&empty, "application/json"), Err(ContentError::Missing));
    }

    #[test]
    fn test_content_response_dangling_schema() {
        let v3 = adapter(json!({"openapi": "3.0.0"}));
        let response = json!({"content": {"application/json": {"schema": {"$ref": "#/components/schemas/Gone"}}}});
        assert_eq!(
            v3.content_response(&response, "application/json"),
            Err(ContentError::Dangling("#/components/schemas/Gone".to_string()))
        );
    }

    #[test]
    fn test_reads_openapi_31_forms() {
        let v3 = adapter(json!({"openapi": "3.1.0"}));
        let schema = json!({
            "type": "object",
            "properties": {
                "nickname": {"type": ["null", "string"]},
                "nothing": {"type": ["null"]},
                "pair": {"type": "array", "prefixItems": [{"type": "integer"}, {"type": "boolean"}]},
                "color": {"type": "string", "examples": ["red", "green"]}
            }
        });
        assert_eq!(
            v3.output_schema(&schema, ReferenceTrail::new()),
            json!({"nickname": "", "nothing": null, "pair": [0, false], "color": "red"})
        );
    }
}
