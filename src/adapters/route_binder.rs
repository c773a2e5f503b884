//! Route table construction and per-request mock responses
//!
//! Every document is mounted under a prefix computed from its declared base
//! URL. Each declared (path, method) pair becomes one route whose handler
//! picks a status code, negotiates the content type and synthesizes the body
//! through the document's [`DocumentAdapter`]. Request bodies, query strings
//! and path parameters are never consulted.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{MethodFilter, MethodRouter},
    Json, Router,
};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use crate::adapters::document_adapter::{ContentError, DocumentAdapter, ANY_CONTENT_TYPE};
use crate::config::Settings;
use crate::domain::status::declared_status_code;
use crate::domain::{MockError, StatusPattern};

const FALLBACK_CONTENT_TYPE: &str = "application/json";

/// One mounted (method, path) pair bound to its document.
#[derive(Clone)]
pub struct RouteTableEntry {
    /// Lower-case HTTP method as declared
    pub method: String,
    /// Declared path template, e.g. `/pets/{id}`
    pub template: String,
    /// Mounted router path, e.g. `/api/pets/:p1`
    pub path: String,
    pub adapter: Arc<dyn DocumentAdapter>,
}

impl RouteTableEntry {
    /// The operation object this entry was built from.
    pub fn operation(&self) -> Option<&Value> {
        self.adapter
            .document()
            .root
            .get("paths")?
            .get(&self.template)?
            .get(&self.method)
    }

    /// `operationId`, or `METHOD template` when the operation has none.
    pub fn label(&self) -> String {
        self.operation()
            .and_then(|op| op.get("operationId"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("{} {}", self.method.to_uppercase(), self.template))
    }
}

impl std::fmt::Debug for RouteTableEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteTableEntry")
            .field("method", &self.method)
            .field("template", &self.template)
            .field("path", &self.path)
            .field("document", &self.adapter.document().source)
            .finish()
    }
}

/// A synthesized response ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct MockResponse {
    pub status: StatusCode,
    pub content_type: String,
    pub body: Value,
}

impl IntoResponse for MockResponse {
    fn into_response(self) -> Response {
        let body = match &self.body {
            Value::String(text) if self.content_type.starts_with("text/") => text.clone(),
            other => other.to_string(),
        };

        let content_type = HeaderValue::from_str(&self.content_type)
            .unwrap_or_else(|_| HeaderValue::from_static(FALLBACK_CONTENT_TYPE));

        (
            self.status,
            [
                (header::CONTENT_TYPE, content_type),
                (header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*")),
            ],
            body,
        )
            .into_response()
    }
}

/// Per-request status/content selection for one route.
pub struct MockHandler {
    entry: RouteTableEntry,
    default_status: StatusPattern,
}

impl MockHandler {
    pub fn new(entry: RouteTableEntry, default_status: StatusPattern) -> Self {
        Self {
            entry,
            default_status,
        }
    }

    pub fn respond(&self) -> Result<MockResponse, MockError> {
        let adapter = &self.entry.adapter;
        let label = self.entry.label();
        let no_responses = || MockError::NoResponses(label.clone());

        let operation = self.entry.operation().ok_or_else(no_responses)?;
        let responses = operation
            .get("responses")
            .and_then(Value::as_object)
            .filter(|r| !r.is_empty())
            .ok_or_else(no_responses)?;

        // Status selection
        let status_key = match self.default_status.first_match(responses.keys().map(String::as_str)) {
            Some(key) => key,
            None => {
                let first = responses.keys().next().ok_or_else(no_responses)?;
                warn!(
                    "No status code matching {} for operation {}. Returning {} as first status found.",
                    self.default_status, label, first
                );
                first.as_str()
            }
        };

        let status = StatusCode::from_u16(declared_status_code(status_key, &self.default_status))
            .map_err(|_| MockError::InvalidStatus(status_key.to_string()))?;

        let response = responses
            .get(status_key)
            .and_then(|entry| adapter.response_object(entry))
            .ok_or_else(|| MockError::UnresolvedResponse {
                operation: label.clone(),
                status: status_key.to_string(),
            })?;

        // Content-type selection
        let content_type = match adapter.content_type_response(operation, response) {
            Some(content_type) => content_type,
            None => {
                let fallback = adapter
                    .offered_content_types(operation, response)
                    .into_iter()
                    .next()
                    .unwrap_or_else(|| match adapter.preferred_content_type() {
                        ANY_CONTENT_TYPE => FALLBACK_CONTENT_TYPE.to_string(),
                        preferred => preferred.to_string(),
                    });
                warn!(
                    "No Content-Type matching {} for operation {}. Returning {}.",
                    adapter.preferred_content_type(),
                    label,
                    fallback
                );
                fallback
            }
        };

        debug!("{} -> {} {}", label, status_key, content_type);

        let body = adapter
            .content_response(response, &content_type)
            .map_err(|e| match e {
                ContentError::Missing => MockError::MissingContent {
                    operation: label.clone(),
                    status: status_key.to_string(),
                },
                ContentError::Dangling(reference) => MockError::DanglingReference {
                    operation: label.clone(),
                    reference,
                },
            })?;

        Ok(MockResponse {
            status,
            content_type,
            body,
        })
    }
}

pub struct RouteBinder {
    url: String,
    local_url: String,
    default_status: StatusPattern,
    error_status: StatusPattern,
}

impl RouteBinder {
    /// Fails when a configured status pattern is invalid.
    pub fn new(settings: &Settings) -> Result<Self, anyhow::Error> {
        let (default_status, error_status) = settings.status_patterns()?;
        Ok(Self {
            url: settings.url.clone(),
            local_url: settings.local_url.clone(),
            default_status,
            error_status,
        })
    }

    /// Mount prefix for a document declaring `base_url`.
    pub fn mount_for(&self, adapter: &dyn DocumentAdapter) -> String {
        let base_url = adapter.base_url();
        match mount_path(&base_url, &self.url, &self.local_url) {
            Some(mount) => mount,
            None => {
                warn!(
                    "No server URL matching {} in mock {}. Mounting at '{}'.",
                    self.url,
                    adapter.document().title(),
                    join_mount(&self.local_url, "")
                );
                join_mount(&self.local_url, "")
            }
        }
    }

    /// One entry per declared operation, first registration wins.
    pub fn route_table(&self, adapters: &[Arc<dyn DocumentAdapter>]) -> Vec<RouteTableEntry> {
        let mut table: Vec<RouteTableEntry> = Vec::new();

        for adapter in adapters {
            let mount = self.mount_for(adapter.as_ref());
            let operations = adapter.operations();
            if operations.is_empty() {
                warn!("No paths found in document {}.", adapter.document().title());
            }

            for op in operations {
                if op.template.split('/').any(|segment| !is_expressible(segment)) {
                    warn!(
                        "Path {} has segments the router cannot express; each is matched as a single parameter",
                        op.template
                    );
                }
                let path = format!("{}{}", mount, router_path(op.template));
                if table.iter().any(|e| e.path == path && e.method == op.method) {
                    warn!(
                        "Skipping duplicate route {} {} from {}",
                        op.method.to_uppercase(),
                        path,
                        adapter.document().source
                    );
                    continue;
                }
                table.push(RouteTableEntry {
                    method: op.method.to_string(),
                    template: op.template.to_string(),
                    path,
                    adapter: adapter.clone(),
                });
            }

            info!(
                "Mounted {} ({}) at '{}'",
                adapter.document().title(),
                adapter.document().dialect,
                if mount.is_empty() { "/" } else { mount.as_str() }
            );
        }

        table
    }

    /// Builds the axum router for a route table.
    pub fn into_router(self, table: Vec<RouteTableEntry>) -> Router {
        let mut grouped: Vec<(String, Vec<RouteTableEntry>)> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        for entry in table {
            match index.get(&entry.path) {
                Some(&i) => grouped[i].1.push(entry),
                None => {
                    index.insert(entry.path.clone(), grouped.len());
                    grouped.push((entry.path.clone(), vec![entry]));
                }
            }
        }

        let mut router = Router::new();
        for (path, entries) in grouped {
            let mut methods: Vec<String> = Vec::new();
            let mut method_router: MethodRouter = MethodRouter::new();

            for entry in entries {
                let Some(filter) = method_filter(&entry.method) else {
                    continue;
                };
                methods.push(entry.method.to_uppercase());
                let handler = Arc::new(MockHandler::new(entry, self.default_status));
                method_router = method_router.on(filter, move || {
                    let handler = handler.clone();
                    async move { handler.respond() }
                });
            }

            if !methods.iter().any(|m| m == "OPTIONS") {
                methods.push("OPTIONS".to_string());
                let allow = methods.join(", ");
                method_router = method_router.options(move || {
                    let allow = allow.clone();
                    async move { preflight(&allow) }
                });
            }

            router = router.route(&path, method_router);
        }

        let error_status = self.error_status;
        router
            .fallback(move || async move { unmatched(error_status) })
            .layer(TraceLayer::new_for_http())
    }
}

/// Computes the mount prefix for a document.
///
/// `None` when `base_url` does not start with `configured_url`. With an empty
/// `configured_url`, scheme and host are dropped from `base_url`.
pub fn mount_path(base_url: &str, configured_url: &str, local_url: &str) -> Option<String> {
    let remainder = base_url.strip_prefix(configured_url)?;

    let path = if configured_url.is_empty() {
        strip_authority(remainder)
    } else if remainder.is_empty() || remainder.starts_with('/') || configured_url.ends_with('/') {
        remainder
    } else {
        // `http://x` must not claim `http://xy/api`
        return None;
    };

    Some(join_mount(local_url, path))
}

fn strip_authority(url: &str) -> &str {
    if url.is_empty() || url.starts_with('/') {
        return url;
    }
    let without_scheme = url.find("://").map_or(url, |i| &url[i + 3..]);
    without_scheme.find('/').map_or("", |i| &without_scheme[i..])
}

/// Joins prefix and path into `/a/b` form; the root is the empty string.
pub fn join_mount(prefix: &str, path: &str) -> String {
    let segments: Vec<&str> = prefix
        .split('/')
        .chain(path.split('/'))
        .filter(|s| !s.is_empty())
        .collect();
    if segments.is_empty() {
        String::new()
    } else {
        format!("/{}", segments.join("/"))
    }
}

/// Rewrites a path template into router syntax.
///
/// Parameters are renamed by position (`/pets/{id}` becomes `/pets/:p1`) so
/// templates that differ only in parameter names land on the same route.
/// A segment mixing literals and parameters, or holding several parameters,
/// becomes one parameter covering the whole segment.
pub fn router_path(template: &str) -> String {
    let mut position = 0;
    let segments: Vec<String> = template
        .trim_start_matches('/')
        .split('/')
        .map(|segment| {
            if is_parameter(segment) || !is_expressible(segment) {
                position += 1;
                format!(":p{}", position)
            } else {
                segment.to_string()
            }
        })
        .collect();
    format!("/{}", segments.join("/"))
}

/// `{name}` spanning the whole segment.
fn is_parameter(segment: &str) -> bool {
    segment
        .strip_prefix('{')
        .and_then(|s| s.strip_suffix('}'))
        .is_some_and(|name| !name.contains(['{', '}']))
}

/// Literal segments and single whole-segment parameters.
fn is_expressible(segment: &str) -> bool {
    is_parameter(segment) || !segment.contains(['{', '}', ':', '*'])
}

fn method_filter(method: &str) -> Option<MethodFilter> {
    match method {
        "get" => Some(MethodFilter::GET),
        "put" => Some(MethodFilter::PUT),
        "post" => Some(MethodFilter::POST),
        "delete" => Some(MethodFilter::DELETE),
        "options" => Some(MethodFilter::OPTIONS),
        "head" => Some(MethodFilter::HEAD),
        "patch" => Some(MethodFilter::PATCH),
        "trace" => Some(MethodFilter::TRACE),
        _ => None,
    }
}

fn preflight(allow_methods: &str) -> Response {
    let allow_methods = HeaderValue::from_str(allow_methods)
        .unwrap_or_else(|_| HeaderValue::from_static("GET, POST, PUT, PATCH, DELETE, OPTIONS"));
    (
        StatusCode::NO_CONTENT,
        [
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*")),
            (header::ACCESS_CONTROL_ALLOW_METHODS, allow_methods),
            (header::ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static("*")),
        ],
    )
        .into_response()
}

fn unmatched(error_status: StatusPattern) -> Response {
    let status = StatusCode::from_u16(error_status.concrete_code()).unwrap_or(StatusCode::NOT_FOUND);
    (
        status,
        Json(serde_json::json!({ "error": "No mock route matches this request" })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mount_path_strips_configured_url() {
        assert_eq!(mount_path("http://x/api", "http://x", ""), Some("/api".to_string()));
        assert_eq!(mount_path("http://x/api", "http://x", "/mock"), Some("/mock/api".to_string()));
        assert_eq!(mount_path("http://x", "http://x", ""), Some(String::new()));
        assert_eq!(mount_path("http://x/api/", "http://x/", ""), Some("/api".to_string()));
    }

    #[test]
    fn test_mount_path_mismatch() {
        assert_eq!(mount_path("http://other/api", "http://x", ""), None);
        assert_eq!(mount_path("http://xy/api", "http://x", ""), None);
        assert_eq!(mount_path("", "http://x", "/mock"), None);
    }

    #[test]
    fn test_mount_path_without_configured_url() {
        assert_eq!(mount_path("http://x/api/v1", "", ""), Some("/api/v1".to_string()));
        assert_eq!(mount_path("petstore.io/v2", "", ""), Some("/v2".to_string()));
        assert_eq!(mount_path("/v2", "", "/mock"), Some("/mock/v2".to_string()));
        assert_eq!(mount_path("", "", ""), Some(String::new()));
    }

    #[test]
    fn test_router_path() {
        assert_eq!(router_path("/pets/{id}"), "/pets/:p1");
        assert_eq!(router_path("/owners/{ownerId}/pets/{petId}"), "/owners/:p1/pets/:p2");
        assert_eq!(router_path("pets"), "/pets");
        assert_eq!(router_path("/"), "/");
    }

    #[test]
    fn test_router_path_ignores_parameter_names() {
        assert_eq!(router_path("/pets/{id}"), router_path("/pets/{petId}"));
    }

    #[test]
    fn test_router_path_collapses_compound_segments() {
        assert_eq!(router_path("/v1/{name}:{verb}"), "/v1/:p1");
        assert_eq!(router_path("/files/{id}.json/raw"), "/files/:p1/raw");
        assert_eq!(router_path("/v1/operations:cancel"), "/v1/:p1");
        assert_eq!(router_path("/a/{x}/b/{y}{z}"), "/a/:p1/b/:p2");
    }

    #[test]
    fn test_expressible_segments() {
        assert!(is_expressible("pets"));
        assert!(is_expressible("{id}"));
        assert!(is_expressible(""));
        assert!(!is_expressible("{name}:{verb}"));
        assert!(!is_expressible("{a}{b}"));
        assert!(!is_expressible("*rest"));
    }

    #[test]
    fn test_join_mount() {
        assert_eq!(join_mount("", ""), "");
        assert_eq!(join_mount("/mock/", "/api"), "/mock/api");
        assert_eq!(join_mount("/", "//api//v1/"), "/api/v1");
    }
}
