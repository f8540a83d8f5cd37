// Sample data shipped with the app: the demo diagnosis history and the two
// canned analysis outcomes used by the simulated inference backend.

use crate::entities::{DiagnosisRecord, DiagnosisResult, RecordSeverity, Severity};
use chrono::NaiveDate;

fn day(year: i32, month: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, d).unwrap_or_default()
}

/// The five-record demo history, newest first
pub fn sample_history() -> Vec<DiagnosisRecord> {
    vec![
        DiagnosisRecord::new("1", day(2024, 1, 10), "Tomato", "Late Blight", RecordSeverity::High, 94, "Field A - North"),
        DiagnosisRecord::new("2", day(2024, 1, 9), "Corn", "Healthy", RecordSeverity::Healthy, 98, "Field B - East"),
        DiagnosisRecord::new("3", day(2024, 1, 8), "Potato", "Early Blight", RecordSeverity::Medium, 87, "Field C - South"),
        DiagnosisRecord::new("4", day(2024, 1, 7), "Wheat", "Rust", RecordSeverity::Low, 76, "Field D - West"),
        DiagnosisRecord::new("5", day(2024, 1, 6), "Rice", "Blast", RecordSeverity::Critical, 92, "Field E - Center"),
    ]
}

pub fn late_blight_result() -> DiagnosisResult {
    DiagnosisResult {
        disease_label: "Late Blight".to_string(),
        confidence: 94,
        severity: Severity::High,
        affected_area: "Leaves and stems".to_string(),
        recommendations: vec![
            "Apply copper-based fungicide immediately".to_string(),
            "Remove affected plant parts".to_string(),
            "Improve air circulation".to_string(),
            "Avoid overhead watering".to_string(),
        ],
        is_healthy: false,
    }
}

pub fn healthy_result() -> DiagnosisResult {
    DiagnosisResult {
        disease_label: "Healthy Plant".to_string(),
        confidence: 98,
        severity: Severity::Low,
        affected_area: "None".to_string(),
        recommendations: vec![
            "Continue current care routine".to_string(),
            "Monitor for early signs of disease".to_string(),
            "Maintain proper spacing between plants".to_string(),
        ],
        is_healthy: true,
    }
}
