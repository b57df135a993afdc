//! Comments and shares attached to variants.

use chrono::Utc;
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

use super::database::{uuid_column, Database};
use super::error::StoreError;
use super::models::{Comment, NewComment, NewShare, Share, DEFAULT_SHARE_PERMISSION};

fn comment_from_row(row: &Row<'_>) -> rusqlite::Result<Comment> {
    Ok(Comment {
        id: uuid_column(row, 0)?,
        variant_id: uuid_column(row, 1)?,
        author: row.get(2)?,
        body: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn share_from_row(row: &Row<'_>) -> rusqlite::Result<Share> {
    Ok(Share {
        id: uuid_column(row, 0)?,
        variant_id: uuid_column(row, 1)?,
        shared_by: row.get(2)?,
        shared_with: row.get(3)?,
        permission: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn ensure_variant(conn: &Connection, variant_id: Uuid) -> Result<(), StoreError> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM variants WHERE id = ?1)",
        params![variant_id.to_string()],
        |row| row.get(0),
    )?;
    if exists {
        Ok(())
    } else {
        Err(StoreError::not_found("Variant", variant_id))
    }
}

impl Database {
    /// Post a comment on a variant.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the variant does not exist.
    pub async fn create_comment(
        &self,
        variant_id: Uuid,
        input: NewComment,
    ) -> Result<Comment, StoreError> {
        let comment = Comment {
            id: Uuid::new_v4(),
            variant_id,
            author: input.author,
            body: input.body,
            created_at: Utc::now(),
        };

        let row = comment.clone();
        self.call(move |conn| {
            ensure_variant(conn, row.variant_id)?;
            conn.execute(
                "INSERT INTO comments (id, variant_id, author, body, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    row.id.to_string(),
                    row.variant_id.to_string(),
                    row.author,
                    row.body,
                    row.created_at
                ],
            )?;
            Ok(())
        })
        .await?;

        Ok(comment)
    }

    /// List comments on a variant, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_comments(&self, variant_id: Uuid) -> Result<Vec<Comment>, StoreError> {
        self.call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, variant_id, author, body, created_at
                 FROM comments WHERE variant_id = ?1 ORDER BY created_at ASC",
            )?;
            let rows = stmt
                .query_map(params![variant_id.to_string()], comment_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
        .await
    }

    /// Share a variant with another user.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the variant does not exist.
    pub async fn create_share(&self, variant_id: Uuid, input: NewShare) -> Result<Share, StoreError> {
        let share = Share {
            id: Uuid::new_v4(),
            variant_id,
            shared_by: input.shared_by,
            shared_with: input.shared_with,
            permission: input
                .permission
                .unwrap_or_else(|| DEFAULT_SHARE_PERMISSION.to_string()),
            created_at: Utc::now(),
        };

        let row = share.clone();
        self.call(move |conn| {
            ensure_variant(conn, row.variant_id)?;
            conn.execute(
                "INSERT INTO shares (id, variant_id, shared_by, shared_with, permission, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    row.id.to_string(),
                    row.variant_id.to_string(),
                    row.shared_by,
                    row.shared_with,
                    row.permission,
                    row.created_at
                ],
            )?;
            Ok(())
        })
        .await?;

        Ok(share)
    }

    /// List shares of a variant.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_shares(&self, variant_id: Uuid) -> Result<Vec<Share>, StoreError> {
        self.call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, variant_id, shared_by, shared_with, permission, created_at
                 FROM shares WHERE variant_id = ?1 ORDER BY created_at DESC",
            )?;
            let rows = stmt
                .query_map(params![variant_id.to_string()], share_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::models::{NewPatient, NewVariant};

    async fn db_with_variant() -> (Database, Uuid) {
        let db = Database::open_in_memory().await.unwrap();
        let patient = db
            .create_patient(NewPatient {
                patient_id: "MRN-42".to_string(),
                name: "John Roe".to_string(),
                date_of_birth: None,
                sex: None,
            })
            .await
            .unwrap();
        let variant = db
            .upsert_variant(NewVariant {
                patient_id: patient.id,
                gene: "TP53".to_string(),
                hgvs: "c.743G>A".to_string(),
                chromosome: None,
                position: None,
                reference: None,
                alternate: None,
                classification: None,
                uniprot_id: None,
            })
            .await
            .unwrap()
            .variant;
        (db, variant.id)
    }

    #[tokio::test]
    async fn test_comments() {
        let (db, variant_id) = db_with_variant().await;
        for body in ["Seen in two relatives", "Segregates with disease"] {
            db.create_comment(
                variant_id,
                NewComment {
                    author: "geneticist".to_string(),
                    body: body.to_string(),
                },
            )
            .await
            .unwrap();
        }

        let comments = db.list_comments(variant_id).await.unwrap();
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].body, "Seen in two relatives");
    }

    #[tokio::test]
    async fn test_share_default_permission() {
        let (db, variant_id) = db_with_variant().await;
        let share = db
            .create_share(
                variant_id,
                NewShare {
                    shared_by: "u1".to_string(),
                    shared_with: "u2".to_string(),
                    permission: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(share.permission, "view");
        assert_eq!(db.list_shares(variant_id).await.unwrap(), vec![share]);
    }

    #[tokio::test]
    async fn test_comment_missing_variant() {
        let db = Database::open_in_memory().await.unwrap();
        let err = db
            .create_comment(
                Uuid::new_v4(),
                NewComment {
                    author: "a".to_string(),
                    body: "b".to_string(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { entity: "Variant", .. }));
    }
}
