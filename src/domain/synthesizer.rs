//! Schema-to-value synthesis
//!
//! Converts a schema node into a representative JSON value. Objects keep
//! their declaration order, arrays get exactly one representative element
//! (or one element per alternative for tuple-style items), primitives take
//! their `default`/`example` or a type fallback.
//!
//! Every reference hop goes through [`resolve`], so self- and mutually
//! referential schemas stop once a path was followed more than `max_loops`
//! times on the current branch.

use serde_json::{Map, Value};

use super::reference::{lookup, resolve, ReferencePath, ReferenceTrail};
use super::schema::{empty_object, ArrayItems, SchemaNode, SchemaReader};

pub struct Synthesizer<'d, R: ?Sized> {
    document: &'d Value,
    reader: &'d R,
    max_loops: usize,
}

impl<'d, R: SchemaReader + ?Sized> Synthesizer<'d, R> {
    pub fn new(document: &'d Value, reader: &'d R, max_loops: usize) -> Self {
        Self {
            document,
            reader,
            max_loops,
        }
    }

    /// Synthesizes `schema` with the given trail.
    ///
    /// An absent schema, a dangling reference or a reference stopped by the
    /// cycle guard all produce an empty object.
    pub fn synthesize(&self, schema: Option<&Value>, trail: ReferenceTrail) -> Value {
        schema
            .and_then(|raw| self.value_of(raw, trail))
            .unwrap_or_else(empty_object)
    }

    /// Synthesizes a response body schema.
    ///
    /// A top-level reference is looked up directly and the trail is seeded
    /// with its path, so the first recursive hop back into the same type is
    /// already counted. Returns `None` only when that top-level reference
    /// does not resolve.
    pub fn synthesize_root(&self, schema: &Value) -> Option<Value> {
        match self.reader.read(schema) {
            SchemaNode::Reference(reference) => {
                let path = ReferencePath::parse(reference)?;
                let target = lookup(self.document, path.keys())?;
                Some(self.synthesize(Some(target), ReferenceTrail::seeded(&path)))
            }
            _ => Some(self.synthesize(Some(schema), ReferenceTrail::new())),
        }
    }

    /// `None` only comes out of a reference that could not be followed.
    fn value_of(&self, raw: &Value, trail: ReferenceTrail) -> Option<Value> {
        match self.reader.read(raw) {
            SchemaNode::Reference(reference) => self.follow(reference, trail),
            SchemaNode::Object(properties) => Some(self.object(&properties, &trail)),
            SchemaNode::Array(items) => Some(self.array(items, &trail)),
            SchemaNode::Primitive(primitive) => Some(primitive.value()),
        }
    }

    fn follow(&self, reference: &str, mut trail: ReferenceTrail) -> Option<Value> {
        let path = ReferencePath::parse(reference)?;
        let target = resolve(self.document, &path, &mut trail, self.max_loops)?;
        self.value_of(target, trail)
    }

    fn object(&self, properties: &[(&str, &Value)], trail: &ReferenceTrail) -> Value {
        let mut map = Map::with_capacity(properties.len());
        for (name, property) in properties {
            if let Some(value) = self.value_of(property, trail.clone()) {
                map.insert((*name).to_string(), value);
            }
        }
        Value::Object(map)
    }

    fn array(&self, items: ArrayItems<'_>, trail: &ReferenceTrail) -> Value {
        match items {
            ArrayItems::Single(None) => Value::Array(vec![empty_object()]),
            ArrayItems::Single(Some(item)) => match self.value_of(item, trail.clone()) {
                Some(value) => Value::Array(vec![value]),
                None => empty_object(),
            },
            ArrayItems::Tuple(alternatives) => Value::Array(
                alternatives
                    .into_iter()
                    .map(|alt| self.synthesize(Some(alt), trail.clone()))
                    .collect(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Minimal dialect: `type` string, `items` object or list.
    struct PlainReader;

    impl SchemaReader for PlainReader {
        fn read<'a>(&self, raw: &'a Value) -> SchemaNode<'a> {
            if let Some(reference) = SchemaNode::reference(raw) {
                return SchemaNode::Reference(reference);
            }
            let items = raw.get("items").map(|items| match items {
                Value::Array(list) => ArrayItems::Tuple(list.iter().collect()),
                other => ArrayItems::Single(Some(other)),
            });
            let type_keyword = raw.get("type").and_then(Value::as_str);
            SchemaNode::classify(raw, type_keyword, items, raw.get("example"))
        }
    }

    fn tree_document() -> Value {
        json!({
            "TreeNode": {
                "type": "object",
                "properties": {
                    "value": {"type": "integer"},
                    "children": {"type": "array", "items": {"$ref": "#/TreeNode"}}
                }
            }
        })
    }

    #[test]
    fn test_object_with_primitives() {
        let doc = json!({});
        let schema = json!({
            "type": "object",
            "properties": {
                "name": {"type": "string"},
                "age": {"type": "integer"},
                "alive": {"type": "boolean"},
                "weight": {"type": "number", "example": 4.5},
                "nickname": {"type": "string", "default": "rex"}
            }
        });
        let synth = Synthesizer::new(&doc, &PlainReader, 2);

        let value = synth.synthesize(Some(&schema), ReferenceTrail::new());
        assert_eq!(
            value,
            json!({"name": "", "age": 0, "alive": false, "weight": 4.5, "nickname": "rex"})
        );
    }

    #[test]
    fn test_absent_schema_is_empty_object() {
        let doc = json!({});
        let synth = Synthesizer::new(&doc, &PlainReader, 2);
        assert_eq!(synth.synthesize(None, ReferenceTrail::new()), json!({}));
        assert_eq!(synth.synthesize(Some(&Value::Null), ReferenceTrail::new()), json!({}));
    }

    #[test]
    fn test_cyclic_tree_is_truncated() {
        let doc = tree_document();
        let synth = Synthesizer::new(&doc, &PlainReader, 2);

        let value = synth.synthesize_root(&json!({"$ref": "#/TreeNode"})).unwrap();
        assert_eq!(
            value,
            json!({
                "value": 0,
                "children": [{
                    "value": 0,
                    "children": [{
                        "value": 0,
                        "children": {}
                    }]
                }]
            })
        );
    }

    #[test]
    fn test_mutual_recursion_terminates() {
        let doc = json!({
            "A": {"type": "object", "properties": {"b": {"$ref": "#/B"}}},
            "B": {"type": "object", "properties": {"a": {"$ref": "#/A"}}}
        });
        let synth = Synthesizer::new(&doc, &PlainReader, 1);

        let value = synth.synthesize(Some(&json!({"$ref": "#/A"})), ReferenceTrail::new());
        assert_eq!(value, json!({"b": {"a": {"b": {}}}}));
    }

    #[test]
    fn test_siblings_do_not_share_cycle_counts() {
        let doc = json!({
            "Pet": {"type": "object", "properties": {"name": {"type": "string"}}}
        });
        let schema = json!({
            "type": "object",
            "properties": {
                "first": {"$ref": "#/Pet"},
                "second": {"$ref": "#/Pet"}
            }
        });
        let synth = Synthesizer::new(&doc, &PlainReader, 0);

        let value = synth.synthesize(Some(&schema), ReferenceTrail::new());
        assert_eq!(value, json!({"first": {"name": ""}, "second": {"name": ""}}));
    }

    #[test]
    fn test_dangling_property_reference_is_skipped() {
        let doc = json!({});
        let schema = json!({
            "type": "object",
            "properties": {
                "missing": {"$ref": "#/Nope"},
                "present": {"type": "boolean"}
            }
        });
        let synth = Synthesizer::new(&doc, &PlainReader, 2);

        let value = synth.synthesize(Some(&schema), ReferenceTrail::new());
        assert_eq!(value, json!({"present": false}));
    }

    #[test]
    fn test_array_has_single_representative_element() {
        let doc = json!({"Tag": {"type": "string", "example": "blue"}});
        let synth = Synthesizer::new(&doc, &PlainReader, 2);

        let by_ref = json!({"type": "array", "items": {"$ref": "#/Tag"}});
        assert_eq!(synth.synthesize(Some(&by_ref), ReferenceTrail::new()), json!(["blue"]));

        let inline = json!({"type": "array", "items": {"type": "object", "properties": {"id": {"type": "integer"}}}});
        assert_eq!(synth.synthesize(Some(&inline), ReferenceTrail::new()), json!([{"id": 0}]));

        let untyped = json!({"type": "array"});
        assert_eq!(synth.synthesize(Some(&untyped), ReferenceTrail::new()), json!([{}]));
    }

    #[test]
    fn test_tuple_items() {
        let doc = json!({});
        let schema = json!({"type": "array", "items": [{"type": "string"}, {"type": "integer"}, {"type": "boolean"}]});
        let synth = Synthesizer::new(&doc, &PlainReader, 2);

        assert_eq!(synth.synthesize(Some(&schema), ReferenceTrail::new()), json!(["", 0, false]));
    }

    #[test]
    fn test_synthesis_is_deterministic() {
        let doc = tree_document();
        let synth = Synthesizer::new(&doc, &PlainReader, 3);
        let schema = json!({"$ref": "#/TreeNode"});

        let first = synth.synthesize(Some(&schema), ReferenceTrail::new());
        let second = synth.synthesize(Some(&schema), ReferenceTrail::new());
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_root_reference_must_resolve() {
        let doc = json!({});
        let synth = Synthesizer::new(&doc, &PlainReader, 2);
        assert!(synth.synthesize_root(&json!({"$ref": "#/Missing"})).is_none());
    }
}
