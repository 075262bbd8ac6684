//! Field descriptors and the declared-value ↔ wire-value transformer.
//!
//! A resource's attributes are described by a static slice of [`Field`]s.
//! [`encode`] and [`decode`] walk one descriptor against a value;
//! [`encode_fields`] and [`decode_fields`] walk a whole slice.
//!
//! Nested objects are declared as a list holding exactly one block, but the
//! API sends and expects a bare object. `encode` unwraps the single block and
//! `decode` wraps the object back into a one-element list.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::error::ApiError;

/// Shape of a declared attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Bool,
    Int,
    /// Exactly one nested object with its own child fields.
    Block(&'static [Field]),
}

impl FieldKind {
    fn describe(self) -> &'static str {
        match self {
            FieldKind::String => "a string",
            FieldKind::Bool => "a boolean",
            FieldKind::Int => "an integer",
            FieldKind::Block(_) => "a single object",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Required,
    Optional,
    /// Set by the service, never sent.
    Computed,
}

/// Descriptor for one declared attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    /// JSON key used on the wire.
    pub wire_name: &'static str,
    pub kind: FieldKind,
    pub presence: Presence,
    /// Changing the value requires replacing the resource.
    pub force_new: bool,
    /// Sent but never read back; state keeps only a hash.
    pub write_only: bool,
}

impl Field {
    pub const fn required(name: &'static str, kind: FieldKind) -> Self {
        Self::new(name, kind, Presence::Required)
    }

    pub const fn optional(name: &'static str, kind: FieldKind) -> Self {
        Self::new(name, kind, Presence::Optional)
    }

    pub const fn computed(name: &'static str, kind: FieldKind) -> Self {
        Self::new(name, kind, Presence::Computed)
    }

    const fn new(name: &'static str, kind: FieldKind, presence: Presence) -> Self {
        Self {
            name,
            wire_name: name,
            kind,
            presence,
            force_new: false,
            write_only: false,
        }
    }

    pub const fn wire(self, wire_name: &'static str) -> Self {
        Self { wire_name, ..self }
    }

    pub const fn force_new(self) -> Self {
        Self {
            force_new: true,
            ..self
        }
    }

    pub const fn write_only(self) -> Self {
        Self {
            write_only: true,
            ..self
        }
    }
}

/// A declared attribute value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    String(String),
    Bool(bool),
    Int(i64),
    Block(Vec<Attrs>),
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::String(value.to_owned())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::String(value)
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        AttrValue::Bool(value)
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        AttrValue::Int(value)
    }
}

impl From<Attrs> for AttrValue {
    fn from(value: Attrs) -> Self {
        AttrValue::Block(vec![value])
    }
}

/// Attribute name → declared value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attrs(BTreeMap<String, AttrValue>);

impl Attrs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: &str, value: impl Into<AttrValue>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: &str, value: impl Into<AttrValue>) {
        self.0.insert(name.to_owned(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.0.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn string(&self, name: &str) -> Result<String, ApiError> {
        match self.get(name) {
            Some(AttrValue::String(s)) => Ok(s.clone()),
            _ => Err(invalid(name, FieldKind::String)),
        }
    }

    pub fn bool(&self, name: &str) -> Result<bool, ApiError> {
        match self.get(name) {
            Some(AttrValue::Bool(b)) => Ok(*b),
            _ => Err(invalid(name, FieldKind::Bool)),
        }
    }

    /// Boolean attribute, `false` when absent.
    pub fn flag(&self, name: &str) -> Result<bool, ApiError> {
        match self.get(name) {
            None => Ok(false),
            Some(_) => self.bool(name),
        }
    }

    pub fn int(&self, name: &str) -> Result<i64, ApiError> {
        match self.get(name) {
            Some(AttrValue::Int(i)) => Ok(*i),
            _ => Err(invalid(name, FieldKind::Int)),
        }
    }

    /// The single block stored under `name`.
    pub fn block(&self, name: &str) -> Result<&Attrs, ApiError> {
        match self.get(name) {
            Some(AttrValue::Block(items)) if items.len() == 1 => Ok(&items[0]),
            _ => Err(ApiError::InvalidAttribute {
                name: name.to_owned(),
                expected: "a single block",
            }),
        }
    }
}

impl FromIterator<(String, AttrValue)> for Attrs {
    fn from_iter<I: IntoIterator<Item = (String, AttrValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

fn invalid(name: &str, kind: FieldKind) -> ApiError {
    ApiError::InvalidAttribute {
        name: name.to_owned(),
        expected: kind.describe(),
    }
}

/// Convert one declared value to its wire form.
///
/// # Panics
/// When `value` does not match `field.kind`, or a block attribute does not
/// hold exactly one block. Both are descriptor/record mismatches in the
/// calling code.
pub fn encode(field: &Field, value: &AttrValue) -> Value {
    match (field.kind, value) {
        (FieldKind::String, AttrValue::String(s)) => Value::String(s.clone()),
        (FieldKind::Bool, AttrValue::Bool(b)) => Value::Bool(*b),
        (FieldKind::Int, AttrValue::Int(i)) => Value::from(*i),
        (FieldKind::Block(children), AttrValue::Block(items)) => match items.as_slice() {
            [only] => Value::Object(encode_fields(children, only)),
            _ => panic!(
                "attribute `{}` holds {} blocks; only single-block attributes are supported",
                field.name,
                items.len()
            ),
        },
        (kind, value) => panic!(
            "attribute `{}` is declared as {} but holds {value:?}",
            field.name,
            kind.describe()
        ),
    }
}

/// Encode every non-computed attribute present in `attrs`, keyed by wire name.
pub fn encode_fields(fields: &[Field], attrs: &Attrs) -> Map<String, Value> {
    fields
        .iter()
        .filter(|f| f.presence != Presence::Computed)
        .filter_map(|f| attrs.get(f.name).map(|v| (f.wire_name.to_owned(), encode(f, v))))
        .collect()
}

/// Convert one wire value back to its declared form.
pub fn decode(field: &Field, wire: &Value) -> Result<AttrValue, ApiError> {
    let decoded = match field.kind {
        FieldKind::String => wire.as_str().map(|s| AttrValue::String(s.to_owned())),
        FieldKind::Bool => wire.as_bool().map(AttrValue::Bool),
        FieldKind::Int => wire.as_i64().map(AttrValue::Int),
        FieldKind::Block(children) => match wire.as_object() {
            Some(object) => Some(AttrValue::Block(vec![decode_fields(children, object)?])),
            None => None,
        },
    };
    decoded.ok_or_else(|| {
        ApiError::MalformedPayload(format!(
            "field `{}` should be {}, got {wire}",
            field.wire_name,
            field.kind.describe()
        ))
    })
}

/// Decode every field present (and non-null) in `wire`.
pub fn decode_fields(fields: &[Field], wire: &Map<String, Value>) -> Result<Attrs, ApiError> {
    let mut attrs = Attrs::new();
    for field in fields {
        match wire.get(field.wire_name) {
            None | Some(Value::Null) => continue,
            Some(value) => attrs.set(field.name, decode(field, value)?),
        }
    }
    Ok(attrs)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    const CHILDREN: &[Field] = &[
        Field::optional("commit", FieldKind::Bool),
        Field::optional("create_branch", FieldKind::Bool).wire("branch_created"),
        Field::optional("label", FieldKind::String),
    ];

    const FIELDS: &[Field] = &[
        Field::required("name", FieldKind::String),
        Field::optional("count", FieldKind::Int),
        Field::optional("enabled", FieldKind::Bool),
        Field::required("triggers", FieldKind::Block(CHILDREN)),
        Field::computed("url", FieldKind::String),
    ];

    fn field(name: &str) -> &'static Field {
        FIELDS.iter().find(|f| f.name == name).unwrap()
    }

    fn triggers() -> Attrs {
        Attrs::new()
            .with("commit", true)
            .with("create_branch", false)
            .with("label", "ci")
    }

    #[test]
    fn primitives_round_trip() {
        for (name, value) in [
            ("name", AttrValue::from("demo")),
            ("count", AttrValue::from(7_i64)),
            ("enabled", AttrValue::from(true)),
        ] {
            let f = field(name);
            assert_eq!(decode(f, &encode(f, &value)).unwrap(), value, "{name}");
        }
    }

    #[test]
    fn block_encodes_to_bare_object() {
        let f = field("triggers");
        let wire = encode(f, &AttrValue::from(triggers()));
        assert_eq!(
            wire,
            json!({"commit": true, "branch_created": false, "label": "ci"})
        );
    }

    #[test]
    fn block_decodes_to_single_element_list() {
        let f = field("triggers");
        let decoded = decode(f, &json!({"label": "ci", "branch_created": false, "commit": true})).unwrap();
        assert_eq!(decoded, AttrValue::Block(vec![triggers()]));
    }

    #[test]
    fn block_round_trip_ignores_child_order() {
        let f = field("triggers");
        let value = AttrValue::from(
            Attrs::new()
                .with("label", "x")
                .with("commit", false),
        );
        assert_eq!(decode(f, &encode(f, &value)).unwrap(), value);
    }

    #[test]
    fn encode_fields_uses_wire_names_and_skips_computed() {
        let attrs = Attrs::new()
            .with("name", "demo")
            .with("triggers", triggers())
            .with("url", "https://example");
        let wire = encode_fields(FIELDS, &attrs);
        assert_eq!(
            Value::Object(wire),
            json!({
                "name": "demo",
                "triggers": {"commit": true, "branch_created": false, "label": "ci"}
            })
        );
    }

    #[test]
    fn decode_fields_skips_absent_and_null() {
        let wire = json!({"name": "demo", "count": null, "unknown": 1, "url": "u"});
        let attrs = decode_fields(FIELDS, wire.as_object().unwrap()).unwrap();
        assert_eq!(attrs, Attrs::new().with("name", "demo").with("url", "u"));
    }

    #[test]
    fn wrong_wire_type_is_malformed_payload() {
        let err = decode(field("enabled"), &json!("yes")).unwrap_err();
        assert!(matches!(err, ApiError::MalformedPayload(msg) if msg.contains("enabled")));

        let err = decode(field("triggers"), &json!([{"commit": true}])).unwrap_err();
        assert!(matches!(err, ApiError::MalformedPayload(_)));
    }

    #[test]
    #[should_panic(expected = "declared as a boolean")]
    fn encoding_mismatched_value_panics() {
        encode(field("enabled"), &AttrValue::from("true"));
    }

    #[test]
    #[should_panic(expected = "only single-block attributes are supported")]
    fn encoding_multiple_blocks_panics() {
        encode(field("triggers"), &AttrValue::Block(vec![triggers(), triggers()]));
    }

    #[test]
    fn accessors_report_shape_errors() {
        let attrs = Attrs::new().with("name", "demo").with("triggers", triggers());
        assert_eq!(attrs.string("name").unwrap(), "demo");
        assert!(!attrs.flag("enabled").unwrap());
        assert_eq!(attrs.block("triggers").unwrap(), &triggers());
        assert!(matches!(
            attrs.int("name"),
            Err(ApiError::InvalidAttribute { expected: "an integer", .. })
        ));
        assert!(attrs.block("name").is_err());
    }

    #[test]
    fn descriptor_builders_set_flags() {
        let f = Field::required("password", FieldKind::String).write_only().force_new();
        assert!(f.write_only && f.force_new);
        assert_eq!(f.wire_name, "password");
        assert_eq!(f.presence, Presence::Required);
    }
}
