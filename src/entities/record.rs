// 📋 Diagnosis Record - one row of diagnosis history
//
// Supplied by the history store and read-only to the filter engine.

use super::diagnosis::DiagnosisResult;
use super::severity::RecordSeverity;
use crate::error::ValidationError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawDiagnosisRecord")]
pub struct DiagnosisRecord {
    pub id: String,

    /// Calendar date of the diagnosis (YYYY-MM-DD)
    pub date: NaiveDate,

    pub crop: String,
    pub disease: String,
    pub severity: RecordSeverity,

    /// Integer percentage 0-100
    pub confidence: u8,

    pub location: String,
}

/// Row shape as read from CSV or JSON; confidence checked in `TryFrom`
#[derive(Deserialize)]
struct RawDiagnosisRecord {
    id: String,
    date: NaiveDate,
    crop: String,
    disease: String,
    severity: RecordSeverity,
    confidence: u32,
    location: String,
}

impl TryFrom<RawDiagnosisRecord> for DiagnosisRecord {
    type Error = ValidationError;

    fn try_from(raw: RawDiagnosisRecord) -> Result<Self, Self::Error> {
        let confidence = u8::try_from(raw.confidence)
            .ok()
            .filter(|c| *c <= 100)
            .ok_or(ValidationError::ConfidenceOutOfRange(raw.confidence))?;

        Ok(DiagnosisRecord {
            id: raw.id,
            date: raw.date,
            crop: raw.crop,
            disease: raw.disease,
            severity: raw.severity,
            confidence,
            location: raw.location,
        })
    }
}

impl DiagnosisRecord {
    pub fn new(
        id: impl Into<String>,
        date: NaiveDate,
        crop: impl Into<String>,
        disease: impl Into<String>,
        severity: RecordSeverity,
        confidence: u8,
        location: impl Into<String>,
    ) -> Self {
        DiagnosisRecord {
            id: id.into(),
            date,
            crop: crop.into(),
            disease: disease.into(),
            severity,
            confidence: confidence.min(100),
            location: location.into(),
        }
    }

    /// Turn a completed analysis into a history entry with a fresh UUID.
    /// Healthy results are stored with disease "Healthy" and severity `Healthy`.
    pub fn from_result(
        result: &DiagnosisResult,
        crop: impl Into<String>,
        location: impl Into<String>,
        date: NaiveDate,
    ) -> Self {
        let (disease, severity) = if result.is_healthy() {
            ("Healthy".to_string(), RecordSeverity::Healthy)
        } else {
            (result.disease_label().to_string(), result.severity().into())
        };

        DiagnosisRecord {
            id: uuid::Uuid::new_v4().to_string(),
            date,
            crop: crop.into(),
            disease,
            severity,
            confidence: result.confidence(),
            location: location.into(),
        }
    }

    /// Hash used to skip re-imports of the same record
    pub fn compute_idempotency_hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(format!(
            "{}|{}|{}|{}",
            self.id, self.date, self.crop, self.disease
        ));
        format!("{:x}", hasher.finalize())
    }
}
