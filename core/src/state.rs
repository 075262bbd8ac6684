//! What gets recorded for a resource, and how a desired value compares to it.
//!
//! Write-only attributes are never stored in clear form. The recorded value is
//! [`hash_for_state`] of what was sent, and comparisons hash the desired value
//! before looking at the record.

use sha2::{Digest, Sha256};

use crate::schema::{AttrValue, Attrs, Field, FieldKind, Presence};

/// Lowercase hex SHA-256 of `value`.
pub fn hash_for_state(value: &str) -> String {
    hex::encode(Sha256::digest(value.as_bytes()))
}

/// Copy of `attrs` with every write-only string replaced by its hash.
pub fn redact_write_only(fields: &[Field], attrs: &Attrs) -> Attrs {
    attrs
        .iter()
        .map(|(name, value)| {
            let recorded = match find(fields, name) {
                Some(field) => recorded_value(field, value),
                None => value.clone(),
            };
            (name.to_owned(), recorded)
        })
        .collect()
}

/// Names of declared attributes whose desired value differs from `recorded`.
///
/// Computed attributes are ignored. Write-only values are compared by hash.
pub fn changed_attributes(fields: &[Field], recorded: &Attrs, desired: &Attrs) -> Vec<&'static str> {
    fields
        .iter()
        .filter(|f| f.presence != Presence::Computed)
        .filter(|f| {
            let want = desired.get(f.name).map(|v| recorded_value(f, v));
            want.as_ref() != recorded.get(f.name)
        })
        .map(|f| f.name)
        .collect()
}

/// Whether any changed attribute forces the resource to be replaced.
pub fn requires_replacement(fields: &[Field], recorded: &Attrs, desired: &Attrs) -> bool {
    let changed = changed_attributes(fields, recorded, desired);
    fields
        .iter()
        .any(|f| f.force_new && changed.contains(&f.name))
}

fn find<'a>(fields: &'a [Field], name: &str) -> Option<&'a Field> {
    fields.iter().find(|f| f.name == name)
}

fn recorded_value(field: &Field, value: &AttrValue) -> AttrValue {
    match (field.kind, value) {
        (FieldKind::String, AttrValue::String(s)) if field.write_only => {
            AttrValue::String(hash_for_state(s))
        }
        (FieldKind::Block(children), AttrValue::Block(items)) => AttrValue::Block(
            items
                .iter()
                .map(|item| redact_write_only(children, item))
                .collect(),
        ),
        _ => value.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIELDS: &[Field] = &[
        Field::required("service_url", FieldKind::String).force_new(),
        Field::required("service_password", FieldKind::String).write_only(),
        Field::required("project", FieldKind::String),
        Field::computed("id", FieldKind::String),
    ];

    fn desired() -> Attrs {
        Attrs::new()
            .with("service_url", "https://jira.example")
            .with("service_password", "hunter2")
            .with("project", "OPS")
    }

    #[test]
    fn hash_is_hex_sha256() {
        assert_eq!(
            hash_for_state("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn write_only_values_are_hashed() {
        let recorded = redact_write_only(FIELDS, &desired());
        assert_eq!(recorded.string("service_password").unwrap(), hash_for_state("hunter2"));
        assert_eq!(recorded.string("project").unwrap(), "OPS");
    }

    #[test]
    fn unchanged_desired_state_has_no_changes() {
        let recorded = redact_write_only(FIELDS, &desired()).with("id", "7");
        assert!(changed_attributes(FIELDS, &recorded, &desired()).is_empty());
        assert!(!requires_replacement(FIELDS, &recorded, &desired()));
    }

    #[test]
    fn changed_secret_is_detected_through_hash() {
        let recorded = redact_write_only(FIELDS, &desired());
        let next = desired().with("service_password", "correct horse");
        assert_eq!(changed_attributes(FIELDS, &recorded, &next), vec!["service_password"]);
        assert!(!requires_replacement(FIELDS, &recorded, &next));
    }

    #[test]
    fn force_new_change_requires_replacement() {
        let recorded = redact_write_only(FIELDS, &desired());
        let next = desired().with("service_url", "https://other.example");
        assert_eq!(changed_attributes(FIELDS, &recorded, &next), vec!["service_url"]);
        assert!(requires_replacement(FIELDS, &recorded, &next));
    }

    #[test]
    fn nested_write_only_values_are_hashed() {
        const INNER: &[Field] = &[Field::optional("token", FieldKind::String).write_only()];
        const OUTER: &[Field] = &[Field::required("auth", FieldKind::Block(INNER))];
        let attrs = Attrs::new().with("auth", Attrs::new().with("token", "t0k"));
        let recorded = redact_write_only(OUTER, &attrs);
        assert_eq!(
            recorded.block("auth").unwrap().string("token").unwrap(),
            hash_for_state("t0k")
        );
    }
}
