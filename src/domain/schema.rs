//! Schema nodes and primitive value synthesis
//!
//! A [`SchemaNode`] is a one-level view over a raw schema value from a loaded
//! description. Children stay borrowed as raw values and are read again when
//! the synthesizer descends into them, so reading a node never copies the
//! document.

use serde_json::{Map, Value};

/// Primitive type tag of a schema node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveType {
    Boolean,
    Integer,
    Number,
    String,
    /// Any other declared type (`file`, `null`, vendor types).
    Other,
}

impl PrimitiveType {
    /// Maps a declared `type` keyword to its tag.
    pub fn from_keyword(keyword: &str) -> Self {
        match keyword {
            "boolean" => Self::Boolean,
            "integer" => Self::Integer,
            "number" => Self::Number,
            "string" => Self::String,
            _ => Self::Other,
        }
    }

    /// Value synthesized when the node carries neither `default` nor `example`.
    pub fn fallback(self) -> Value {
        match self {
            Self::Boolean => Value::Bool(false),
            Self::Integer | Self::Number => Value::from(0),
            Self::String => Value::String(String::new()),
            Self::Other => Value::Null,
        }
    }
}

/// A primitive schema node.
#[derive(Debug, Clone, PartialEq)]
pub struct Primitive<'a> {
    pub kind: PrimitiveType,
    pub default: Option<&'a Value>,
    pub example: Option<&'a Value>,
}

impl Primitive<'_> {
    /// Representative scalar: `default`, then `example`, then the type fallback.
    pub fn value(&self) -> Value {
        self.default
            .or(self.example)
            .cloned()
            .unwrap_or_else(|| self.kind.fallback())
    }
}

/// Item declaration of an array node.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayItems<'a> {
    /// One item schema; absent `items` is carried as `None`.
    Single(Option<&'a Value>),
    /// Fixed sequence of alternatives, synthesized element by element.
    Tuple(Vec<&'a Value>),
}

/// One level of a schema graph.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode<'a> {
    /// Internal pointer, e.g. `#/components/schemas/Pet`.
    Reference(&'a str),
    /// Properties in declaration order.
    Object(Vec<(&'a str, &'a Value)>),
    Array(ArrayItems<'a>),
    Primitive(Primitive<'a>),
}

impl<'a> SchemaNode<'a> {
    /// An object node without properties, used for absent or null schemas.
    pub fn empty_object() -> Self {
        Self::Object(Vec::new())
    }

    /// Reads the `$ref` keyword, if present.
    pub fn reference(raw: &'a Value) -> Option<&'a str> {
        raw.get("$ref").and_then(Value::as_str)
    }

    /// Reads the declared properties in declaration order.
    pub fn properties(raw: &'a Value) -> Vec<(&'a str, &'a Value)> {
        raw.get("properties")
            .and_then(Value::as_object)
            .map(|props| props.iter().map(|(k, v)| (k.as_str(), v)).collect())
            .unwrap_or_default()
    }

    /// Builds a node from an already decided type keyword.
    ///
    /// `None` means the schema declares no type: it is an array when it has
    /// `items`, otherwise an object.
    pub fn classify(
        raw: &'a Value,
        type_keyword: Option<&str>,
        items: Option<ArrayItems<'a>>,
        example: Option<&'a Value>,
    ) -> Self {
        match type_keyword {
            Some("object") => Self::Object(Self::properties(raw)),
            Some("array") => Self::Array(items.unwrap_or(ArrayItems::Single(None))),
            Some(other) => Self::Primitive(Primitive {
                kind: PrimitiveType::from_keyword(other),
                default: raw.get("default"),
                example,
            }),
            None => match items {
                Some(items) => Self::Array(items),
                None => Self::Object(Self::properties(raw)),
            },
        }
    }
}

/// Reads raw schema values into [`SchemaNode`]s.
///
/// Each description dialect places tuple items, type lists and examples
/// differently; implementations encode those rules and nothing else.
pub trait SchemaReader {
    fn read<'a>(&self, raw: &'a Value) -> SchemaNode<'a>;
}

/// Returns an empty JSON object.
pub fn empty_object() -> Value {
    Value::Object(Map::new())
}
