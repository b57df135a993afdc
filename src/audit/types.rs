//! Audit record types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::redact::Redactor;

/// Entity id recorded when the affected entity cannot be identified.
pub const UNKNOWN_ENTITY_ID: &str = "unknown";

/// A stored audit record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditRecord {
    /// Unique record ID, assigned by the store.
    pub id: Uuid,
    /// What happened, e.g. `POST /api/variants` or `patient_created`.
    pub action: String,
    /// ID of the affected entity, or [`UNKNOWN_ENTITY_ID`].
    pub entity_id: String,
    /// Singular, capitalized entity type such as `Variant`.
    pub entity_type: String,
    /// Redacted snapshot before the mutation.
    pub old_values: Option<Value>,
    /// Redacted snapshot after the mutation.
    pub new_values: Option<Value>,
    /// Acting user, if known.
    pub user_id: Option<String>,
    /// When the store accepted the record.
    pub created_at: DateTime<Utc>,
}

/// A normalized, redacted record ready to be appended to an audit store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAuditRecord {
    pub action: String,
    pub entity_id: String,
    pub entity_type: String,
    pub old_values: Option<Value>,
    pub new_values: Option<Value>,
    pub user_id: Option<String>,
}

/// An audited action as reported by a caller, before normalization.
#[derive(Debug, Clone)]
pub struct AuditAction {
    action: String,
    entity_id: String,
    entity_type: String,
    old_values: Option<Value>,
    new_values: Option<Value>,
    user_id: Option<String>,
}

impl AuditAction {
    /// Create an action with the required fields.
    ///
    /// `entity_type` may be a plural collection name; it is normalized when
    /// the record is built.
    pub fn new(
        action: impl Into<String>,
        entity_id: impl Into<String>,
        entity_type: impl Into<String>,
    ) -> Self {
        Self {
            action: action.into(),
            entity_id: entity_id.into(),
            entity_type: entity_type.into(),
            old_values: None,
            new_values: None,
            user_id: None,
        }
    }

    /// Set the snapshot before the mutation. `None` leaves it absent.
    #[must_use]
    pub fn old_values(mut self, values: impl Into<Option<Value>>) -> Self {
        self.old_values = values.into();
        self
    }

    /// Set the snapshot after the mutation. `None` leaves it absent.
    #[must_use]
    pub fn new_values(mut self, values: impl Into<Option<Value>>) -> Self {
        self.new_values = values.into();
        self
    }

    /// Set the acting user.
    #[must_use]
    pub fn user_id(mut self, user_id: Option<String>) -> Self {
        self.user_id = user_id;
        self
    }

    /// The action name.
    #[must_use]
    pub fn action(&self) -> &str {
        &self.action
    }

    /// Normalize the entity type and redact both snapshots.
    #[must_use]
    pub fn into_record(self, redactor: &Redactor) -> NewAuditRecord {
        NewAuditRecord {
            entity_type: normalize_entity_type(&self.entity_type),
            old_values: self.old_values.map(|v| redactor.redact_owned(&v)),
            new_values: self.new_values.map(|v| redactor.redact_owned(&v)),
            action: self.action,
            entity_id: self.entity_id,
            user_id: self.user_id,
        }
    }
}

/// Turn a collection name into an entity type name.
///
/// Capitalizes the first letter and strips one trailing `s`. This is a plain
/// suffix rule: irregular plurals come out wrong and singular names ending in
/// `s` lose their last letter (`status` becomes `Statu`). Existing audit rows
/// depend on these names, so the rule is kept as is.
#[must_use]
pub fn normalize_entity_type(raw: &str) -> String {
    let singular = raw.strip_suffix('s').unwrap_or(raw);
    let mut chars = singular.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_plural() {
        assert_eq!(normalize_entity_type("variants"), "Variant");
        assert_eq!(normalize_entity_type("patients"), "Patient");
        assert_eq!(normalize_entity_type("comments"), "Comment");
    }

    #[test]
    fn test_normalize_singular_idempotent() {
        assert_eq!(normalize_entity_type("patient"), "Patient");
        assert_eq!(normalize_entity_type("Variant"), "Variant");
    }

    #[test]
    fn test_normalize_known_limitations() {
        assert_eq!(normalize_entity_type("status"), "Statu");
        assert_eq!(normalize_entity_type("risk-assessments"), "Risk-assessment");
        assert_eq!(normalize_entity_type("analyses"), "Analyse");
        // Only one trailing `s` is removed.
        assert_eq!(normalize_entity_type("glass"), "Glas");
    }

    #[test]
    fn test_normalize_empty() {
        assert_eq!(normalize_entity_type(""), "");
        assert_eq!(normalize_entity_type("s"), "");
    }

    #[test]
    fn test_into_record_redacts_both_snapshots() {
        let record = AuditAction::new("patient_updated", "p1", "patients")
            .old_values(json!({"name": "Old Name", "patientId": "MRN-100200"}))
            .new_values(json!({"name": "New Name", "sex": "F"}))
            .user_id(Some("u1".to_string()))
            .into_record(&Redactor::default());

        assert_eq!(record.entity_type, "Patient");
        assert_eq!(
            record.old_values,
            Some(json!({"name": "[REDACTED]", "patientId": "MRN-****"}))
        );
        assert_eq!(
            record.new_values,
            Some(json!({"name": "[REDACTED]", "sex": "F"}))
        );
        assert_eq!(record.user_id.as_deref(), Some("u1"));
    }

    #[test]
    fn test_into_record_absent_values_stay_none() {
        let record =
            AuditAction::new("variant_deleted", "v1", "variants").into_record(&Redactor::default());
        assert!(record.old_values.is_none());
        assert!(record.new_values.is_none());
        assert!(record.user_id.is_none());
    }

    #[test]
    fn test_missing_snapshot_is_absent_not_null() {
        let record = AuditAction::new("structure_uploaded", "P38398", "structures")
            .old_values(None)
            .new_values(None)
            .into_record(&Redactor::default());
        assert!(record.old_values.is_none());
        assert!(record.new_values.is_none());
    }

    #[test]
    fn test_audit_record_serialize_camel_case() {
        let record = AuditRecord {
            id: Uuid::new_v4(),
            action: "variant_updated".to_string(),
            entity_id: "v1".to_string(),
            entity_type: "Variant".to_string(),
            old_values: None,
            new_values: Some(json!({"gene": "BRCA1"})),
            user_id: None,
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["entityType"], "Variant");
        assert_eq!(json["newValues"]["gene"], "BRCA1");
        assert!(json["oldValues"].is_null());
        assert!(json["userId"].is_null());
    }
}
