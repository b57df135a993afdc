//! Best-effort writes to the audit trail.

use async_trait::async_trait;

use super::error::AuditError;
use super::types::{AuditAction, AuditRecord, NewAuditRecord};
use crate::redact::Redactor;

/// Anything that can append audit records.
#[async_trait]
pub trait AuditStore: Send + Sync {
    /// Append one record. Implementations assign `id` and `created_at`.
    async fn append(&self, record: NewAuditRecord) -> Result<AuditRecord, AuditError>;
}

/// Record an audited action.
///
/// The entity type is normalized and both snapshots are redacted before the
/// record reaches `store`. A failed write is logged and dropped: the caller's
/// own operation must not depend on the audit trail. No retry is attempted.
pub async fn audit_action<S>(store: &S, redactor: &Redactor, action: AuditAction)
where
    S: AuditStore + ?Sized,
{
    let record = action.into_record(redactor);
    let action = record.action.clone();
    let entity_type = record.entity_type.clone();
    let entity_id = record.entity_id.clone();

    match store.append(record).await {
        Ok(stored) => {
            tracing::debug!(
                id = %stored.id,
                action = %action,
                entity_type = %entity_type,
                entity_id = %entity_id,
                "Audit record written"
            );
        }
        Err(e) => {
            tracing::warn!(
                error = %e,
                action = %action,
                entity_type = %entity_type,
                entity_id = %entity_id,
                "Failed to write audit record"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use chrono::Utc;
    use serde_json::json;
    use uuid::Uuid;

    #[derive(Default)]
    struct RecordingStore {
        records: Mutex<Vec<NewAuditRecord>>,
    }

    #[async_trait]
    impl AuditStore for RecordingStore {
        async fn append(&self, record: NewAuditRecord) -> Result<AuditRecord, AuditError> {
            self.records.lock().unwrap().push(record.clone());
            Ok(AuditRecord {
                id: Uuid::new_v4(),
                action: record.action,
                entity_id: record.entity_id,
                entity_type: record.entity_type,
                old_values: record.old_values,
                new_values: record.new_values,
                user_id: record.user_id,
                created_at: Utc::now(),
            })
        }
    }

    #[derive(Default)]
    struct FailingStore {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl AuditStore for FailingStore {
        async fn append(&self, _record: NewAuditRecord) -> Result<AuditRecord, AuditError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(AuditError::Unavailable("database offline".to_string()))
        }
    }

    #[tokio::test]
    async fn test_variant_updated_scenario() {
        let store = RecordingStore::default();
        let action = AuditAction::new("variant_updated", "v1", "variants")
            .new_values(json!({"gene": "BRCA1"}))
            .user_id(Some("u1".to_string()));

        audit_action(&store, &Redactor::default(), action).await;

        let records = store.records.lock().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].action, "variant_updated");
        assert_eq!(records[0].entity_id, "v1");
        assert_eq!(records[0].entity_type, "Variant");
        assert_eq!(records[0].new_values.as_ref().unwrap()["gene"], "BRCA1");
        assert!(records[0].old_values.is_none());
        assert_eq!(records[0].user_id.as_deref(), Some("u1"));
    }

    #[tokio::test]
    async fn test_singular_entity_type() {
        let store = RecordingStore::default();
        audit_action(
            &store,
            &Redactor::default(),
            AuditAction::new("patient_created", "p1", "patient"),
        )
        .await;

        assert_eq!(store.records.lock().unwrap()[0].entity_type, "Patient");
    }

    #[tokio::test]
    async fn test_snapshots_redacted_before_store() {
        let store = RecordingStore::default();
        let action = AuditAction::new("patient_created", "p1", "patients").new_values(json!({
            "name": "Jane Doe",
            "patientId": "MRN-999888",
            "contact": {"email": "j@x.com", "ipAddress": "10.1.2.3"}
        }));

        audit_action(&store, &Redactor::default(), action).await;

        let records = store.records.lock().unwrap();
        assert_eq!(
            records[0].new_values,
            Some(json!({
                "name": "[REDACTED]",
                "patientId": "MRN-****",
                "contact": {"email": "[REDACTED]", "ipAddress": "xxx.xxx.xxx.xxx"}
            }))
        );
    }

    #[tokio::test]
    async fn test_failing_store_is_swallowed_without_retry() {
        let store = FailingStore::default();
        audit_action(
            &store,
            &Redactor::default(),
            AuditAction::new("variant_updated", "v1", "variants").new_values(json!({})),
        )
        .await;

        assert_eq!(store.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_accepts_trait_object() {
        let store: Box<dyn AuditStore> = Box::new(RecordingStore::default());
        audit_action(
            store.as_ref(),
            &Redactor::default(),
            AuditAction::new("comment_created", "c1", "comments"),
        )
        .await;
    }
}
