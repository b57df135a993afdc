//! Field-name based masking of JSON payloads.

use std::borrow::Cow;

use serde_json::{Map, Value};

use crate::config::RedactionConfig;

/// Field replaced wholesale with the redaction marker.
pub const NAME_FIELD: &str = "name";
/// Field replaced wholesale with the redaction marker.
pub const EMAIL_FIELD: &str = "email";
/// Field replaced with the masked IP pattern.
pub const IP_ADDRESS_FIELD: &str = "ipAddress";
/// Field partially masked when it carries a medical record number.
pub const PATIENT_ID_FIELD: &str = "patientId";

/// Masks sensitive fields in arbitrary JSON trees.
///
/// Matching is on exact, case-sensitive field names. Only string values are
/// masked; anything else under a sensitive key is walked like any other value.
#[derive(Debug, Clone)]
pub struct Redactor {
    marker: String,
    ip_mask: String,
    mrn_prefix: String,
    mrn_visible: usize,
    mrn_mask: String,
    max_depth: usize,
}

impl Redactor {
    /// Create a redactor from configuration.
    #[must_use]
    pub fn new(config: &RedactionConfig) -> Self {
        Self {
            marker: config.marker.clone(),
            ip_mask: config.ip_mask.clone(),
            mrn_prefix: config.mrn_prefix.clone(),
            mrn_visible: config.mrn_visible,
            mrn_mask: config.mrn_mask.clone(),
            max_depth: config.max_depth,
        }
    }

    /// The marker written over fully redacted fields.
    #[must_use]
    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Return a redacted copy of `value`.
    ///
    /// Scalars come back borrowed. Objects and arrays are rebuilt, so the
    /// input is never touched.
    #[must_use]
    pub fn redact<'a>(&self, value: &'a Value) -> Cow<'a, Value> {
        match value {
            Value::Object(_) | Value::Array(_) => Cow::Owned(self.redact_value(value, 0)),
            _ => Cow::Borrowed(value),
        }
    }

    /// Convenience wrapper returning an owned tree.
    #[must_use]
    pub fn redact_owned(&self, value: &Value) -> Value {
        self.redact(value).into_owned()
    }

    fn redact_value(&self, value: &Value, depth: usize) -> Value {
        match value {
            Value::Object(_) | Value::Array(_) if depth >= self.max_depth => {
                tracing::debug!(depth, "Redaction depth limit reached, masking subtree");
                Value::String(self.marker.clone())
            }
            Value::Object(map) => Value::Object(self.redact_object(map, depth)),
            Value::Array(items) => Value::Array(
                items
                    .iter()
                    .map(|item| self.redact_value(item, depth + 1))
                    .collect(),
            ),
            _ => value.clone(),
        }
    }

    fn redact_object(&self, map: &Map<String, Value>, depth: usize) -> Map<String, Value> {
        let mut redacted = Map::with_capacity(map.len());
        for (key, val) in map {
            let masked = match (key.as_str(), val) {
                (NAME_FIELD | EMAIL_FIELD, Value::String(_)) => Value::String(self.marker.clone()),
                (IP_ADDRESS_FIELD, Value::String(_)) => Value::String(self.ip_mask.clone()),
                (PATIENT_ID_FIELD, Value::String(id)) if id.starts_with(&self.mrn_prefix) => {
                    Value::String(self.mask_mrn(id))
                }
                _ => self.redact_value(val, depth + 1),
            };
            redacted.insert(key.clone(), masked);
        }
        redacted
    }

    /// Keep the first `mrn_visible` characters and mask the rest.
    fn mask_mrn(&self, mrn: &str) -> String {
        let visible: String = mrn.chars().take(self.mrn_visible).collect();
        format!("{visible}{}", self.mrn_mask)
    }
}

impl Default for Redactor {
    fn default() -> Self {
        Self::new(&RedactionConfig::default())
    }
}

/// Redact `value` with the default rules.
#[must_use]
pub fn redact(value: &Value) -> Value {
    Redactor::default().redact_owned(value)
}
