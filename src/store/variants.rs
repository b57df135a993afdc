//! Variant and prediction queries.

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::database::{json_column, json_param, uuid_column, Database};
use super::error::StoreError;
use super::models::{
    NewPrediction, NewVariant, Prediction, Variant, VariantUpsert, DEFAULT_CLASSIFICATION,
};

const VARIANT_COLUMNS: &str = "id, patient_id, gene, hgvs, chromosome, position, reference, \
                               alternate, classification, uniprot_id, created_at, updated_at";

fn variant_from_row(row: &Row<'_>) -> rusqlite::Result<Variant> {
    Ok(Variant {
        id: uuid_column(row, 0)?,
        patient_id: uuid_column(row, 1)?,
        gene: row.get(2)?,
        hgvs: row.get(3)?,
        chromosome: row.get(4)?,
        position: row.get(5)?,
        reference: row.get(6)?,
        alternate: row.get(7)?,
        classification: row.get(8)?,
        uniprot_id: row.get(9)?,
        created_at: row.get(10)?,
        updated_at: row.get(11)?,
    })
}

fn prediction_from_row(row: &Row<'_>) -> rusqlite::Result<Prediction> {
    Ok(Prediction {
        id: uuid_column(row, 0)?,
        variant_id: uuid_column(row, 1)?,
        model_name: row.get(2)?,
        model_version: row.get(3)?,
        score: row.get(4)?,
        label: row.get(5)?,
        details: json_column(row, 6)?,
        created_at: row.get(7)?,
    })
}

fn find_variant(conn: &Connection, id: &str) -> rusqlite::Result<Option<Variant>> {
    let sql = format!("SELECT {VARIANT_COLUMNS} FROM variants WHERE id = ?1");
    conn.query_row(&sql, params![id], variant_from_row).optional()
}

fn patient_exists(conn: &Connection, id: &str) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM patients WHERE id = ?1)",
        params![id],
        |row| row.get(0),
    )
}

impl Database {
    /// Insert a variant, or update the existing one with the same
    /// `(patient_id, gene, hgvs)` key.
    ///
    /// Fields absent from `input` keep their stored value on update.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the patient does not exist.
    pub async fn upsert_variant(&self, input: NewVariant) -> Result<VariantUpsert, StoreError> {
        self.call(move |conn| {
            let tx = conn.transaction()?;
            let patient_id = input.patient_id.to_string();
            if !patient_exists(&tx, &patient_id)? {
                return Err(StoreError::not_found("Patient", &patient_id));
            }

            let existing_id: Option<String> = tx
                .query_row(
                    "SELECT id FROM variants WHERE patient_id = ?1 AND gene = ?2 AND hgvs = ?3",
                    params![patient_id, input.gene, input.hgvs],
                    |row| row.get(0),
                )
                .optional()?;
            let now = Utc::now();

            let (id, previous) = if let Some(id) = existing_id {
                let previous = find_variant(&tx, &id)?;
                tx.execute(
                    "UPDATE variants SET
                        chromosome = COALESCE(?2, chromosome),
                        position = COALESCE(?3, position),
                        reference = COALESCE(?4, reference),
                        alternate = COALESCE(?5, alternate),
                        classification = COALESCE(?6, classification),
                        uniprot_id = COALESCE(?7, uniprot_id),
                        updated_at = ?8
                     WHERE id = ?1",
                    params![
                        id,
                        input.chromosome,
                        input.position,
                        input.reference,
                        input.alternate,
                        input.classification,
                        input.uniprot_id,
                        now
                    ],
                )?;
                (id, previous)
            } else {
                let id = Uuid::new_v4().to_string();
                tx.execute(
                    "INSERT INTO variants (id, patient_id, gene, hgvs, chromosome, position, reference,
                                           alternate, classification, uniprot_id, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?11)",
                    params![
                        id,
                        patient_id,
                        input.gene,
                        input.hgvs,
                        input.chromosome,
                        input.position,
                        input.reference,
                        input.alternate,
                        input
                            .classification
                            .as_deref()
                            .unwrap_or(DEFAULT_CLASSIFICATION),
                        input.uniprot_id,
                        now
                    ],
                )?;
                (id, None)
            };

            let variant =
                find_variant(&tx, &id)?.ok_or_else(|| StoreError::not_found("Variant", &id))?;
            tx.commit()?;
            Ok(VariantUpsert { variant, previous })
        })
        .await
    }

    /// Get a variant by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn get_variant(&self, id: Uuid) -> Result<Option<Variant>, StoreError> {
        self.call(move |conn| Ok(find_variant(conn, &id.to_string())?))
            .await
    }

    /// List variants, optionally restricted to one patient.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_variants(&self, patient_id: Option<Uuid>) -> Result<Vec<Variant>, StoreError> {
        self.call(move |conn| {
            let variants = if let Some(patient_id) = patient_id {
                let sql = format!(
                    "SELECT {VARIANT_COLUMNS} FROM variants WHERE patient_id = ?1 ORDER BY updated_at DESC"
                );
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt
                    .query_map(params![patient_id.to_string()], variant_from_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            } else {
                let sql = format!("SELECT {VARIANT_COLUMNS} FROM variants ORDER BY updated_at DESC");
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt
                    .query_map([], variant_from_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            };
            Ok(variants)
        })
        .await
    }

    /// Record a model prediction for a variant.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the variant does not exist.
    pub async fn create_prediction(
        &self,
        variant_id: Uuid,
        input: NewPrediction,
    ) -> Result<Prediction, StoreError> {
        let details = json_param(input.details.as_ref())?;
        let prediction = Prediction {
            id: Uuid::new_v4(),
            variant_id,
            model_name: input.model_name,
            model_version: input.model_version,
            score: input.score,
            label: input.label,
            details: input.details,
            created_at: Utc::now(),
        };

        let row = prediction.clone();
        self.call(move |conn| {
            if find_variant(conn, &row.variant_id.to_string())?.is_none() {
                return Err(StoreError::not_found("Variant", row.variant_id));
            }
            conn.execute(
                "INSERT INTO predictions (id, variant_id, model_name, model_version, score, label, details, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    row.id.to_string(),
                    row.variant_id.to_string(),
                    row.model_name,
                    row.model_version,
                    row.score,
                    row.label,
                    details,
                    row.created_at
                ],
            )?;
            Ok(())
        })
        .await?;

        Ok(prediction)
    }

    /// List predictions for a variant, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_predictions(&self, variant_id: Uuid) -> Result<Vec<Prediction>, StoreError> {
        self.call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, variant_id, model_name, model_version, score, label, details, created_at
                 FROM predictions WHERE variant_id = ?1 ORDER BY created_at DESC",
            )?;
            let rows = stmt
                .query_map(params![variant_id.to_string()], prediction_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::models::NewPatient;

    async fn db_with_patient() -> (Database, Uuid) {
        let db = Database::open_in_memory().await.unwrap();
        let patient = db
            .create_patient(NewPatient {
                patient_id: "MRN-226856".to_string(),
                name: "Jane Doe".to_string(),
                date_of_birth: None,
                sex: None,
            })
            .await
            .unwrap();
        (db, patient.id)
    }

    fn brca1(patient_id: Uuid) -> NewVariant {
        NewVariant {
            patient_id,
            gene: "BRCA1".to_string(),
            hgvs: "c.68_69delAG".to_string(),
            chromosome: Some("17".to_string()),
            position: Some(43_124_027),
            reference: Some("AG".to_string()),
            alternate: Some(String::new()),
            classification: None,
            uniprot_id: Some("P38398".to_string()),
        }
    }

    #[tokio::test]
    async fn test_upsert_inserts_then_updates() {
        let (db, patient_id) = db_with_patient().await;

        let first = db.upsert_variant(brca1(patient_id)).await.unwrap();
        assert!(first.previous.is_none());
        assert_eq!(first.variant.classification, "VUS");

        let mut update = brca1(patient_id);
        update.classification = Some("Pathogenic".to_string());
        update.chromosome = None;
        let second = db.upsert_variant(update).await.unwrap();

        assert_eq!(second.variant.id, first.variant.id);
        assert_eq!(second.variant.classification, "Pathogenic");
        // Absent fields keep their stored value.
        assert_eq!(second.variant.chromosome.as_deref(), Some("17"));
        assert_eq!(
            second.previous.map(|v| v.classification).as_deref(),
            Some("VUS")
        );
        assert_eq!(db.list_variants(None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_upsert_missing_patient() {
        let db = Database::open_in_memory().await.unwrap();
        let err = db.upsert_variant(brca1(Uuid::new_v4())).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { entity: "Patient", .. }));
    }

    #[tokio::test]
    async fn test_list_variants_by_patient() {
        let (db, patient_id) = db_with_patient().await;
        db.upsert_variant(brca1(patient_id)).await.unwrap();

        let mut other = brca1(patient_id);
        other.gene = "TP53".to_string();
        other.hgvs = "c.743G>A".to_string();
        db.upsert_variant(other).await.unwrap();

        assert_eq!(db.list_variants(Some(patient_id)).await.unwrap().len(), 2);
        assert!(db
            .list_variants(Some(Uuid::new_v4()))
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_predictions() {
        let (db, patient_id) = db_with_patient().await;
        let variant = db.upsert_variant(brca1(patient_id)).await.unwrap().variant;

        db.create_prediction(
            variant.id,
            NewPrediction {
                model_name: "alphamissense".to_string(),
                model_version: Some("1.0".to_string()),
                score: 0.93,
                label: Some("likely_pathogenic".to_string()),
                details: Some(serde_json::json!({"features": ["conservation", "structure"]})),
            },
        )
        .await
        .unwrap();

        let predictions = db.list_predictions(variant.id).await.unwrap();
        assert_eq!(predictions.len(), 1);
        assert!((predictions[0].score - 0.93).abs() < f64::EPSILON);
        assert_eq!(
            predictions[0].details.as_ref().unwrap()["features"][0],
            "conservation"
        );
    }

    #[tokio::test]
    async fn test_prediction_missing_variant() {
        let db = Database::open_in_memory().await.unwrap();
        let err = db
            .create_prediction(
                Uuid::new_v4(),
                NewPrediction {
                    model_name: "m".to_string(),
                    model_version: None,
                    score: 0.1,
                    label: None,
                    details: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { entity: "Variant", .. }));
    }
}
