//! Domain entities persisted by the tracker.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A patient whose variants are tracked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: Uuid,
    /// Medical record number, e.g. `MRN-226856`.
    pub patient_id: String,
    pub name: String,
    pub date_of_birth: Option<String>,
    pub sex: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a patient.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPatient {
    pub patient_id: String,
    pub name: String,
    #[serde(default)]
    pub date_of_birth: Option<String>,
    #[serde(default)]
    pub sex: Option<String>,
}

/// Classification assigned to variants that arrive without one.
pub const DEFAULT_CLASSIFICATION: &str = "VUS";

/// A genetic variant observed in a patient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub gene: String,
    /// HGVS notation, e.g. `c.68_69delAG`.
    pub hgvs: String,
    pub chromosome: Option<String>,
    pub position: Option<i64>,
    pub reference: Option<String>,
    pub alternate: Option<String>,
    pub classification: String,
    pub uniprot_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for inserting or updating a variant.
///
/// Variants are keyed on `(patient_id, gene, hgvs)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewVariant {
    pub patient_id: Uuid,
    pub gene: String,
    pub hgvs: String,
    #[serde(default)]
    pub chromosome: Option<String>,
    #[serde(default)]
    pub position: Option<i64>,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub alternate: Option<String>,
    #[serde(default)]
    pub classification: Option<String>,
    #[serde(default)]
    pub uniprot_id: Option<String>,
}

/// Result of a variant upsert.
#[derive(Debug, Clone)]
pub struct VariantUpsert {
    /// The row as stored after the upsert.
    pub variant: Variant,
    /// The row before the upsert, when it already existed.
    pub previous: Option<Variant>,
}

/// A pathogenicity prediction produced by an ML model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    pub id: Uuid,
    pub variant_id: Uuid,
    pub model_name: String,
    pub model_version: Option<String>,
    pub score: f64,
    pub label: Option<String>,
    pub details: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

/// Input for recording a prediction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPrediction {
    pub model_name: String,
    #[serde(default)]
    pub model_version: Option<String>,
    pub score: f64,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub details: Option<serde_json::Value>,
}

/// A clinician's risk assessment for a patient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub risk_level: String,
    pub score: Option<f64>,
    pub notes: Option<String>,
    pub assessed_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for recording a risk assessment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRiskAssessment {
    pub risk_level: String,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub assessed_by: Option<String>,
}

/// A discussion comment attached to a variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Uuid,
    pub variant_id: Uuid,
    pub author: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// Input for posting a comment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComment {
    pub author: String,
    pub body: String,
}

/// Permission granted by a share when none is given.
pub const DEFAULT_SHARE_PERMISSION: &str = "view";

/// A variant shared with another user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Share {
    pub id: Uuid,
    pub variant_id: Uuid,
    pub shared_by: String,
    pub shared_with: String,
    pub permission: String,
    pub created_at: DateTime<Utc>,
}

/// Input for sharing a variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewShare {
    pub shared_by: String,
    pub shared_with: String,
    #[serde(default)]
    pub permission: Option<String>,
}

/// Where a cached protein structure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructureSource {
    /// Downloaded from the structure prediction service.
    Alphafold,
    /// Uploaded by a user.
    Upload,
}

impl StructureSource {
    /// Returns the string representation for database storage.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Alphafold => "alphafold",
            Self::Upload => "upload",
        }
    }

    /// Parse the database representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "alphafold" => Some(Self::Alphafold),
            "upload" => Some(Self::Upload),
            _ => None,
        }
    }
}

/// Metadata for a protein structure file cached on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProteinStructure {
    pub uniprot_id: String,
    pub source: StructureSource,
    pub file_path: String,
    pub model_url: Option<String>,
    pub fetched_at: DateTime<Utc>,
}
