//! Internal reference resolution with a bounded cycle guard

use serde_json::Value;
use tracing::{debug, warn};

/// A reference split into the keys walked from the document root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferencePath {
    keys: Vec<String>,
}

impl ReferencePath {
    /// Parses an internal reference such as `#/components/schemas/Pet`.
    ///
    /// Returns `None` for references into other documents.
    pub fn parse(reference: &str) -> Option<Self> {
        let Some(pointer) = reference.strip_prefix('#') else {
            debug!("Ignoring external reference: {}", reference);
            return None;
        };
        let keys = pointer
            .split('/')
            .filter(|key| !key.is_empty())
            .map(|key| key.replace("~1", "/").replace("~0", "~"))
            .collect();
        Some(Self { keys })
    }

    pub fn from_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Canonical form recorded in a [`ReferenceTrail`].
    pub fn normalized(&self) -> String {
        self.keys.join("/")
    }
}

/// Reference paths already followed during one top-level synthesis.
///
/// Passed by value: every branch of an object or array gets its own copy so
/// sibling branches never see each other's visits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceTrail {
    visited: Vec<String>,
}

impl ReferenceTrail {
    pub fn new() -> Self {
        Self::default()
    }

    /// A trail that already counts one visit to `path`.
    pub fn seeded(path: &ReferencePath) -> Self {
        Self {
            visited: vec![path.normalized()],
        }
    }

    /// Number of times `normalized` was followed on this branch.
    pub fn visits(&self, normalized: &str) -> usize {
        self.visited.iter().filter(|v| v.as_str() == normalized).count()
    }

    pub fn push(&mut self, normalized: String) {
        self.visited.push(normalized);
    }
}

/// Walks `document` along `keys`; array segments are read as indices.
pub fn lookup<'d>(document: &'d Value, keys: &[String]) -> Option<&'d Value> {
    keys.iter().try_fold(document, |node, key| match node {
        Value::Object(map) => map.get(key),
        Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// Resolves `path` inside `document`, guarding against cycles.
///
/// Returns `None` when the path already appears in `trail` more than
/// `max_loops` times, or when any key along the path is missing. On success
/// the normalized path is appended to `trail`.
pub fn resolve<'d>(
    document: &'d Value,
    path: &ReferencePath,
    trail: &mut ReferenceTrail,
    max_loops: usize,
) -> Option<&'d Value> {
    let normalized = path.normalized();
    if trail.visits(&normalized) > max_loops {
        warn!("Loop detected in ref: {}", normalized);
        return None;
    }

    let Some(node) = lookup(document, path.keys()) else {
        debug!("Dangling ref: {}", normalized);
        return None;
    };

    trail.push(normalized);
    Some(node)
}
