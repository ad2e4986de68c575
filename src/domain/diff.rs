//! Generic change-set construction for partial updates.
//!
//! The admin forms send only the fields that actually differ from the loaded
//! record. Instead of an ad hoc key list per form, both records are serialized
//! to JSON objects and compared field by field; the resulting [`ChangeSet`]
//! becomes the PATCH body. The same structure repairs data-less mutation
//! responses by merging the submitted fields back over a locally-known copy.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::domain::error::DomainError;

/// An ordered set of changed fields, ready to serialize as a PATCH body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeSet {
    fields: Map<String, Value>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Pin a field into the set regardless of whether it differs. Used for
    /// fields whose stored form never equals the submitted form (passwords)
    /// and for no-op-safety fields a caller wants sent anyway.
    pub fn pin(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(field.into(), value.into());
    }

    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.fields.remove(field)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// The PATCH body.
    pub fn to_value(&self) -> Value {
        Value::Object(self.fields.clone())
    }
}

/// Build a change set by comparing two same-shaped records field by field.
///
/// Both records must serialize to JSON objects. Fields present in `submitted`
/// whose value differs from `current` are included; everything else is left
/// out so the server only sees what actually changed.
pub fn diff_records<T: Serialize>(current: &T, submitted: &T) -> Result<ChangeSet, DomainError> {
    let current = to_object(current)?;
    let submitted = to_object(submitted)?;

    let mut changes = ChangeSet::new();
    for (field, value) in submitted {
        if current.get(&field) != Some(&value) {
            changes.pin(field, value);
        }
    }
    Ok(changes)
}

/// Reconstruct an updated record from a change set and the best locally-known
/// copy, stamping a fresh `updated_at`. This is the repair path for mutation
/// responses that carry no entity payload.
pub fn merge_changes<T>(
    base: &T,
    changes: &ChangeSet,
    updated_at: OffsetDateTime,
) -> Result<T, DomainError>
where
    T: Serialize + DeserializeOwned,
{
    let mut merged = to_object(base)?;
    for (field, value) in changes.as_map() {
        merged.insert(field.clone(), value.clone());
    }

    let stamp = updated_at
        .format(&Rfc3339)
        .map_err(|err| DomainError::invariant(format!("unformattable timestamp: {err}")))?;
    merged.insert("updated_at".to_string(), Value::String(stamp));

    serde_json::from_value(Value::Object(merged))
        .map_err(|err| DomainError::validation(format!("merged record does not decode: {err}")))
}

fn to_object<T: Serialize>(record: &T) -> Result<Map<String, Value>, DomainError> {
    match serde_json::to_value(record) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(DomainError::validation(format!(
            "change sets require object-shaped records, got {}",
            kind_of(&other)
        ))),
        Err(err) => Err(DomainError::validation(format!(
            "record does not serialize: {err}"
        ))),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use crate::domain::entities::fixtures::{actor_id, sample_category, sample_user};

    use super::*;

    #[test]
    fn identical_records_produce_an_empty_set() {
        let category = sample_category(1, 1, actor_id());
        let changes = diff_records(&category, &category).expect("diff");
        assert!(changes.is_empty());
    }

    #[test]
    fn only_differing_fields_are_included() {
        let current = sample_category(1, 1, actor_id());
        let mut submitted = current.clone();
        submitted.name_vi = "Thời sự".into();
        submitted.name_en = None;

        let changes = diff_records(&current, &submitted).expect("diff");
        assert_eq!(changes.len(), 2);
        assert_eq!(changes.as_map()["name_vi"], "Thời sự");
        assert_eq!(changes.as_map()["name_en"], Value::Null);
        assert!(!changes.contains("slug"));
    }

    #[test]
    fn pinned_fields_survive_even_when_equal() {
        let user = sample_user(actor_id());
        let mut changes = diff_records(&user, &user).expect("diff");
        changes.pin("password", "mật-khẩu-mới");

        assert_eq!(changes.len(), 1);
        assert_eq!(changes.as_map()["password"], "mật-khẩu-mới");
    }

    #[test]
    fn merge_applies_changes_and_stamps_updated_at() {
        let base = sample_category(1, 1, actor_id());
        let mut changes = ChangeSet::new();
        changes.pin("name_vi", "Thời sự");

        let stamp = datetime!(2025-06-01 12:00:00 UTC);
        let merged = merge_changes(&base, &changes, stamp).expect("merge");

        assert_eq!(merged.name_vi, "Thời sự");
        assert_eq!(merged.slug, base.slug);
        assert_eq!(merged.updated_at, stamp);
    }

    #[test]
    fn non_object_records_are_rejected() {
        let err = diff_records(&1, &2).expect_err("numbers are not records");
        assert!(matches!(err, DomainError::Validation { .. }));
    }
}
