//! Cached protein structure metadata.

use rusqlite::types::Type;
use rusqlite::{params, OptionalExtension, Row};

use super::database::Database;
use super::error::StoreError;
use super::models::{ProteinStructure, StructureSource};

fn structure_from_row(row: &Row<'_>) -> rusqlite::Result<ProteinStructure> {
    let source: String = row.get(1)?;
    let source = StructureSource::parse(&source).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            1,
            Type::Text,
            format!("unknown structure source {source}").into(),
        )
    })?;

    Ok(ProteinStructure {
        uniprot_id: row.get(0)?,
        source,
        file_path: row.get(2)?,
        model_url: row.get(3)?,
        fetched_at: row.get(4)?,
    })
}

impl Database {
    /// Get cached structure metadata by `UniProt` accession.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn get_structure(
        &self,
        uniprot_id: &str,
    ) -> Result<Option<ProteinStructure>, StoreError> {
        let uniprot_id = uniprot_id.to_string();
        self.call(move |conn| {
            Ok(conn
                .query_row(
                    "SELECT uniprot_id, source, file_path, model_url, fetched_at
                     FROM protein_structures WHERE uniprot_id = ?1",
                    params![uniprot_id],
                    structure_from_row,
                )
                .optional()?)
        })
        .await
    }

    /// Save structure metadata, replacing any previous entry for the accession.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn save_structure(&self, structure: &ProteinStructure) -> Result<(), StoreError> {
        let row = structure.clone();
        self.call(move |conn| {
            conn.execute(
                "INSERT OR REPLACE INTO protein_structures (uniprot_id, source, file_path, model_url, fetched_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    row.uniprot_id,
                    row.source.as_str(),
                    row.file_path,
                    row.model_url,
                    row.fetched_at
                ],
            )?;
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn structure(source: StructureSource) -> ProteinStructure {
        ProteinStructure {
            uniprot_id: "P38398".to_string(),
            source,
            file_path: "/data/structures/P38398.pdb".to_string(),
            model_url: None,
            fetched_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_save_and_get_structure() {
        let db = Database::open_in_memory().await.unwrap();
        assert!(db.get_structure("P38398").await.unwrap().is_none());

        let saved = structure(StructureSource::Alphafold);
        db.save_structure(&saved).await.unwrap();

        let fetched = db.get_structure("P38398").await.unwrap().unwrap();
        assert_eq!(fetched, saved);
    }

    #[tokio::test]
    async fn test_save_replaces_existing() {
        let db = Database::open_in_memory().await.unwrap();
        db.save_structure(&structure(StructureSource::Alphafold))
            .await
            .unwrap();
        db.save_structure(&structure(StructureSource::Upload))
            .await
            .unwrap();

        let fetched = db.get_structure("P38398").await.unwrap().unwrap();
        assert_eq!(fetched.source, StructureSource::Upload);
    }
}
