// 🔬 Diagnosis Result - the structured outcome of one completed analysis
//
// Immutable once built. Constructors enforce:
// - confidence is an integer percentage in 0..=100
// - a healthy result always carries severity Low

use super::severity::Severity;
use crate::error::ValidationError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawDiagnosisResult")]
pub struct DiagnosisResult {
    pub(crate) disease_label: String,
    pub(crate) confidence: u8,
    pub(crate) severity: Severity,
    pub(crate) affected_area: String,
    pub(crate) recommendations: Vec<String>,
    pub(crate) is_healthy: bool,
}

/// Unchecked wire shape, validated through `TryFrom`
#[derive(Deserialize)]
struct RawDiagnosisResult {
    disease_label: String,
    confidence: u32,
    severity: Severity,
    affected_area: String,
    #[serde(default)]
    recommendations: Vec<String>,
    is_healthy: bool,
}

impl TryFrom<RawDiagnosisResult> for DiagnosisResult {
    type Error = ValidationError;

    fn try_from(raw: RawDiagnosisResult) -> Result<Self, Self::Error> {
        DiagnosisResult::new(
            raw.disease_label,
            raw.confidence,
            raw.severity,
            raw.affected_area,
            raw.recommendations,
            raw.is_healthy,
        )
    }
}

impl DiagnosisResult {
    pub fn new(
        disease_label: impl Into<String>,
        confidence: u32,
        severity: Severity,
        affected_area: impl Into<String>,
        recommendations: Vec<String>,
        is_healthy: bool,
    ) -> Result<Self, ValidationError> {
        let confidence = checked_confidence(confidence)?;

        if is_healthy && severity != Severity::Low {
            return Err(ValidationError::HealthyWithSeverity(
                severity.as_str().to_string(),
            ));
        }

        Ok(DiagnosisResult {
            disease_label: disease_label.into(),
            confidence,
            severity,
            affected_area: affected_area.into(),
            recommendations,
            is_healthy,
        })
    }

    /// Healthy outcome: severity Low, affected area "None"
    pub fn healthy(
        label: impl Into<String>,
        confidence: u32,
        recommendations: Vec<String>,
    ) -> Result<Self, ValidationError> {
        DiagnosisResult::new(label, confidence, Severity::Low, "None", recommendations, true)
    }

    pub fn disease_label(&self) -> &str {
        &self.disease_label
    }

    pub fn confidence(&self) -> u8 {
        self.confidence
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn affected_area(&self) -> &str {
        &self.affected_area
    }

    pub fn recommendations(&self) -> &[String] {
        &self.recommendations
    }

    pub fn is_healthy(&self) -> bool {
        self.is_healthy
    }

    /// Catalog key for the result headline
    pub fn headline_key(&self) -> &'static str {
        if self.is_healthy {
            "healthy_crop"
        } else {
            "disease_detected"
        }
    }
}

fn checked_confidence(confidence: u32) -> Result<u8, ValidationError> {
    u8::try_from(confidence)
        .ok()
        .filter(|c| *c <= 100)
        .ok_or(ValidationError::ConfidenceOutOfRange(confidence))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_disease_result() {
        let result = DiagnosisResult::new(
            "Late Blight",
            94,
            Severity::High,
            "Leaves and stems",
            vec!["Apply copper-based fungicide immediately".to_string()],
            false,
        )
        .unwrap();

        assert_eq!(result.disease_label(), "Late Blight");
        assert_eq!(result.confidence(), 94);
        assert_eq!(result.headline_key(), "disease_detected");
    }

    #[test]
    fn test_confidence_bounds() {
        assert!(DiagnosisResult::healthy("Healthy Plant", 0, vec![]).is_ok());
        assert!(DiagnosisResult::healthy("Healthy Plant", 100, vec![]).is_ok());
        assert_eq!(
            DiagnosisResult::healthy("Healthy Plant", 101, vec![]),
            Err(ValidationError::ConfidenceOutOfRange(101))
        );
        assert_eq!(
            DiagnosisResult::healthy("Healthy Plant", 70_000, vec![]),
            Err(ValidationError::ConfidenceOutOfRange(70_000))
        );
    }

    #[test]
    fn test_healthy_result_cannot_be_critical() {
        let err = DiagnosisResult::new("Healthy Plant", 98, Severity::Critical, "None", vec![], true)
            .unwrap_err();
        assert_eq!(err, ValidationError::HealthyWithSeverity("Critical".to_string()));

        let healthy = DiagnosisResult::healthy("Healthy Plant", 98, vec![]).unwrap();
        assert_eq!(healthy.severity(), Severity::Low);
        assert_eq!(healthy.affected_area(), "None");
        assert_eq!(healthy.headline_key(), "healthy_crop");
    }

    #[test]
    fn test_deserialize_validates() {
        let ok = r#"{"disease_label":"Rust","confidence":76,"severity":"Low",
                     "affected_area":"Leaves","recommendations":[],"is_healthy":false}"#;
        let result: DiagnosisResult = serde_json::from_str(ok).unwrap();
        assert_eq!(result.severity(), Severity::Low);

        let bad = r#"{"disease_label":"Rust","confidence":176,"severity":"Low",
                      "affected_area":"Leaves","is_healthy":false}"#;
        assert!(serde_json::from_str::<DiagnosisResult>(bad).is_err());
    }
}
