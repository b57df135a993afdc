//! Append-only audit log table.

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Row};
use uuid::Uuid;

use super::database::{json_column, json_param, sql_count, uuid_column, Database};
use super::error::StoreError;
use crate::audit::{AuditError, AuditRecord, AuditStore, NewAuditRecord};

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<AuditRecord> {
    Ok(AuditRecord {
        id: uuid_column(row, 0)?,
        action: row.get(1)?,
        entity_id: row.get(2)?,
        entity_type: row.get(3)?,
        old_values: json_column(row, 4)?,
        new_values: json_column(row, 5)?,
        user_id: row.get(6)?,
        created_at: row.get(7)?,
    })
}

impl Database {
    /// Insert an audit record.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshots cannot be serialized or the insert fails.
    pub async fn insert_audit_record(
        &self,
        record: NewAuditRecord,
    ) -> Result<AuditRecord, StoreError> {
        let old_values = json_param(record.old_values.as_ref())?;
        let new_values = json_param(record.new_values.as_ref())?;
        let stored = AuditRecord {
            id: Uuid::new_v4(),
            action: record.action,
            entity_id: record.entity_id,
            entity_type: record.entity_type,
            old_values: record.old_values,
            new_values: record.new_values,
            user_id: record.user_id,
            created_at: Utc::now(),
        };

        let row = stored.clone();
        self.call(move |conn| {
            conn.execute(
                "INSERT INTO audit_logs (id, action, entity_id, entity_type, old_values, new_values, user_id, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    row.id.to_string(),
                    row.action,
                    row.entity_id,
                    row.entity_type,
                    old_values,
                    new_values,
                    row.user_id,
                    row.created_at
                ],
            )?;
            Ok(())
        })
        .await?;

        Ok(stored)
    }

    /// List audit records, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_audit_records(
        &self,
        limit: usize,
        offset: usize,
        entity_type: Option<String>,
    ) -> Result<Vec<AuditRecord>, StoreError> {
        self.call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, action, entity_id, entity_type, old_values, new_values, user_id, created_at
                 FROM audit_logs
                 WHERE ?1 IS NULL OR entity_type = ?1
                 ORDER BY created_at DESC, rowid DESC
                 LIMIT ?2 OFFSET ?3",
            )?;
            let rows = stmt
                .query_map(
                    params![entity_type, sql_count(limit), sql_count(offset)],
                    record_from_row,
                )?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
        .await
    }

    /// Count all audit records.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn count_audit_records(&self) -> Result<u64, StoreError> {
        self.call(|conn| {
            let count: i64 =
                conn.query_row("SELECT COUNT(*) FROM audit_logs", [], |row| row.get(0))?;
            Ok(count.unsigned_abs())
        })
        .await
    }
}

#[async_trait]
impl AuditStore for Database {
    async fn append(&self, record: NewAuditRecord) -> Result<AuditRecord, AuditError> {
        Ok(self.insert_audit_record(record).await?)
    }
}
