// Severity levels for diagnosis outcomes and history records

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// RESULT SEVERITY
// ============================================================================

/// Disease-impact level attached to a completed analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::Low,
        Severity::Medium,
        Severity::High,
        Severity::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "Low",
            Severity::Medium => "Medium",
            Severity::High => "High",
            Severity::Critical => "Critical",
        }
    }

    /// Catalog key for the localized label
    pub fn translation_key(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

impl FromStr for Severity {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            "critical" => Ok(Severity::Critical),
            _ => Err(ValidationError::UnknownSeverity(s.to_string())),
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

// ============================================================================
// RECORD SEVERITY
// ============================================================================

/// Severity as stored in diagnosis history (adds `Healthy`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordSeverity {
    Low,
    Medium,
    High,
    Critical,
    Healthy,
}

impl RecordSeverity {
    pub const ALL: [RecordSeverity; 5] = [
        RecordSeverity::Healthy,
        RecordSeverity::Low,
        RecordSeverity::Medium,
        RecordSeverity::High,
        RecordSeverity::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RecordSeverity::Low => "Low",
            RecordSeverity::Medium => "Medium",
            RecordSeverity::High => "High",
            RecordSeverity::Critical => "Critical",
            RecordSeverity::Healthy => "Healthy",
        }
    }

    pub fn is_healthy(&self) -> bool {
        matches!(self, RecordSeverity::Healthy)
    }
}

impl From<Severity> for RecordSeverity {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Low => RecordSeverity::Low,
            Severity::Medium => RecordSeverity::Medium,
            Severity::High => RecordSeverity::High,
            Severity::Critical => RecordSeverity::Critical,
        }
    }
}

impl FromStr for RecordSeverity {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("healthy") {
            return Ok(RecordSeverity::Healthy);
        }
        s.parse::<Severity>().map(RecordSeverity::from)
    }
}

impl fmt::Display for RecordSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}
