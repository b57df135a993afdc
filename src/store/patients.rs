//! Patient and risk assessment queries.

use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};
use uuid::Uuid;

use super::database::{uuid_column, Database};
use super::error::StoreError;
use super::models::{NewPatient, NewRiskAssessment, Patient, RiskAssessment};

const PATIENT_COLUMNS: &str = "id, patient_id, name, date_of_birth, sex, created_at";

fn patient_from_row(row: &Row<'_>) -> rusqlite::Result<Patient> {
    Ok(Patient {
        id: uuid_column(row, 0)?,
        patient_id: row.get(1)?,
        name: row.get(2)?,
        date_of_birth: row.get(3)?,
        sex: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn risk_from_row(row: &Row<'_>) -> rusqlite::Result<RiskAssessment> {
    Ok(RiskAssessment {
        id: uuid_column(row, 0)?,
        patient_id: uuid_column(row, 1)?,
        risk_level: row.get(2)?,
        score: row.get(3)?,
        notes: row.get(4)?,
        assessed_by: row.get(5)?,
        created_at: row.get(6)?,
    })
}

impl Database {
    /// Insert a new patient.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails, including a duplicate record number.
    pub async fn create_patient(&self, input: NewPatient) -> Result<Patient, StoreError> {
        let patient = Patient {
            id: Uuid::new_v4(),
            patient_id: input.patient_id,
            name: input.name,
            date_of_birth: input.date_of_birth,
            sex: input.sex,
            created_at: Utc::now(),
        };

        let row = patient.clone();
        self.call(move |conn| {
            conn.execute(
                "INSERT INTO patients (id, patient_id, name, date_of_birth, sex, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    row.id.to_string(),
                    row.patient_id,
                    row.name,
                    row.date_of_birth,
                    row.sex,
                    row.created_at
                ],
            )?;
            Ok(())
        })
        .await?;

        tracing::debug!(id = %patient.id, "Created patient");
        Ok(patient)
    }

    /// Get a patient by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn get_patient(&self, id: Uuid) -> Result<Option<Patient>, StoreError> {
        self.call(move |conn| {
            let sql = format!("SELECT {PATIENT_COLUMNS} FROM patients WHERE id = ?1");
            Ok(conn
                .query_row(&sql, params![id.to_string()], patient_from_row)
                .optional()?)
        })
        .await
    }

    /// List all patients, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_patients(&self) -> Result<Vec<Patient>, StoreError> {
        self.call(|conn| {
            let sql = format!("SELECT {PATIENT_COLUMNS} FROM patients ORDER BY created_at DESC");
            let mut stmt = conn.prepare(&sql)?;
            let patients = stmt
                .query_map([], patient_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(patients)
        })
        .await
    }

    /// Record a risk assessment for a patient.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the patient does not exist.
    pub async fn create_risk_assessment(
        &self,
        patient_id: Uuid,
        input: NewRiskAssessment,
    ) -> Result<RiskAssessment, StoreError> {
        if self.get_patient(patient_id).await?.is_none() {
            return Err(StoreError::not_found("Patient", patient_id));
        }

        let assessment = RiskAssessment {
            id: Uuid::new_v4(),
            patient_id,
            risk_level: input.risk_level,
            score: input.score,
            notes: input.notes,
            assessed_by: input.assessed_by,
            created_at: Utc::now(),
        };

        let row = assessment.clone();
        self.call(move |conn| {
            conn.execute(
                "INSERT INTO risk_assessments (id, patient_id, risk_level, score, notes, assessed_by, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    row.id.to_string(),
                    row.patient_id.to_string(),
                    row.risk_level,
                    row.score,
                    row.notes,
                    row.assessed_by,
                    row.created_at
                ],
            )?;
            Ok(())
        })
        .await?;

        Ok(assessment)
    }

    /// List risk assessments for a patient, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_risk_assessments(
        &self,
        patient_id: Uuid,
    ) -> Result<Vec<RiskAssessment>, StoreError> {
        self.call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, patient_id, risk_level, score, notes, assessed_by, created_at
                 FROM risk_assessments WHERE patient_id = ?1 ORDER BY created_at DESC",
            )?;
            let rows = stmt
                .query_map(params![patient_id.to_string()], risk_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
        .await
    }
}
