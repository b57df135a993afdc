//! On-disk cache of protein structure files.

use std::path::{Path, PathBuf};

use chrono::Utc;
use uuid::Uuid;

use super::client::StructureClient;
use super::error::StructureError;
use crate::store::{Database, ProteinStructure, StructureSource};

/// Longest accepted `UniProt` accession.
const MAX_ACCESSION_LEN: usize = 16;

/// Outcome of a fetch-and-cache call.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    /// The cached structure.
    pub structure: ProteinStructure,
    /// Whether the structure was already cached before this call.
    pub cached: bool,
}

/// Check that `uniprot_id` is a plausible accession and safe as a file name.
///
/// # Errors
///
/// Returns [`StructureError::InvalidId`] for empty, overlong or non-alphanumeric ids.
pub fn validate_uniprot_id(uniprot_id: &str) -> Result<(), StructureError> {
    let valid = !uniprot_id.is_empty()
        && uniprot_id.len() <= MAX_ACCESSION_LEN
        && uniprot_id.chars().all(|c| c.is_ascii_alphanumeric());
    if valid {
        Ok(())
    } else {
        Err(StructureError::InvalidId(uniprot_id.to_string()))
    }
}

/// Path of the structure file for an accession.
#[must_use]
pub fn structure_path(storage_dir: &Path, uniprot_id: &str) -> PathBuf {
    storage_dir.join(format!("{uniprot_id}.pdb"))
}

async fn write_structure_file(
    storage_dir: &Path,
    uniprot_id: &str,
    contents: &[u8],
) -> Result<PathBuf, StructureError> {
    tokio::fs::create_dir_all(storage_dir)
        .await
        .map_err(|source| StructureError::Io {
            path: storage_dir.to_path_buf(),
            source,
        })?;

    // Per-writer temp file, renamed into place.
    let path = structure_path(storage_dir, uniprot_id);
    let temp_path = storage_dir.join(format!("{uniprot_id}.{}.tmp", Uuid::new_v4()));
    if let Err(source) = tokio::fs::write(&temp_path, contents).await {
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(StructureError::Io {
            path: temp_path,
            source,
        });
    }
    if let Err(source) = tokio::fs::rename(&temp_path, &path).await {
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(StructureError::Io { path, source });
    }
    Ok(path)
}

/// Return the cached structure for `uniprot_id`, downloading it first if needed.
///
/// # Errors
///
/// Returns an error if the id is invalid, the service lookup or download
/// fails, or the file or metadata cannot be written.
pub async fn fetch_and_cache(
    db: &Database,
    client: &StructureClient,
    storage_dir: &Path,
    uniprot_id: &str,
) -> Result<FetchOutcome, StructureError> {
    validate_uniprot_id(uniprot_id)?;

    if let Some(structure) = db.get_structure(uniprot_id).await? {
        tracing::debug!(uniprot_id, "Structure served from cache");
        return Ok(FetchOutcome {
            structure,
            cached: true,
        });
    }

    let model_url = client.model_url(uniprot_id).await?;
    let contents = client.download(&model_url).await?;
    let path = write_structure_file(storage_dir, uniprot_id, &contents).await?;

    let structure = ProteinStructure {
        uniprot_id: uniprot_id.to_string(),
        source: StructureSource::Alphafold,
        file_path: path.display().to_string(),
        model_url: Some(model_url),
        fetched_at: Utc::now(),
    };
    db.save_structure(&structure).await?;

    tracing::info!(uniprot_id, bytes = contents.len(), "Cached protein structure");
    Ok(FetchOutcome {
        structure,
        cached: false,
    })
}

/// Store an uploaded structure file, replacing any cached one.
///
/// # Errors
///
/// Returns an error if the id is invalid, the file is empty, or the file or
/// metadata cannot be written.
pub async fn save_upload(
    db: &Database,
    storage_dir: &Path,
    uniprot_id: &str,
    contents: &[u8],
) -> Result<ProteinStructure, StructureError> {
    validate_uniprot_id(uniprot_id)?;
    if contents.is_empty() {
        return Err(StructureError::EmptyFile);
    }

    let path = write_structure_file(storage_dir, uniprot_id, contents).await?;
    let structure = ProteinStructure {
        uniprot_id: uniprot_id.to_string(),
        source: StructureSource::Upload,
        file_path: path.display().to_string(),
        model_url: None,
        fetched_at: Utc::now(),
    };
    db.save_structure(&structure).await?;

    tracing::info!(uniprot_id, bytes = contents.len(), "Stored uploaded structure");
    Ok(structure)
}
