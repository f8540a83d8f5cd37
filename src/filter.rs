// 🔎 Record Filter Engine - multi-criteria search over diagnosis history
//
// Three predicates, combined with AND:
// - search term: case-insensitive substring of crop, disease or location
// - crop: exact, case-sensitive
// - severity: exact
// Empty criteria match everything. Output keeps input order.

use crate::entities::{DiagnosisRecord, RecordSeverity};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// ============================================================================
// CRITERIA
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    #[serde(default)]
    pub search_term: String,

    #[serde(default)]
    pub crop_equals: Option<String>,

    #[serde(default)]
    pub severity_equals: Option<RecordSeverity>,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search_term = term.into();
        self
    }

    /// Empty string means "any crop"
    pub fn with_crop(mut self, crop: impl Into<String>) -> Self {
        let crop = crop.into();
        self.crop_equals = if crop.is_empty() { None } else { Some(crop) };
        self
    }

    pub fn with_severity(mut self, severity: Option<RecordSeverity>) -> Self {
        self.severity_equals = severity;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.search_term.is_empty() && self.crop_equals.is_none() && self.severity_equals.is_none()
    }
}

// ============================================================================
// ENGINE
// ============================================================================

pub struct RecordFilterEngine {
    criteria: FilterCriteria,
    search_lower: String,
}

impl RecordFilterEngine {
    pub fn new(criteria: FilterCriteria) -> Self {
        let search_lower = criteria.search_term.to_lowercase();
        RecordFilterEngine {
            criteria,
            search_lower,
        }
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn matches(&self, record: &DiagnosisRecord) -> bool {
        self.matches_search(record) && self.matches_crop(record) && self.matches_severity(record)
    }

    fn matches_search(&self, record: &DiagnosisRecord) -> bool {
        if self.search_lower.is_empty() {
            return true;
        }

        [&record.crop, &record.disease, &record.location]
            .iter()
            .any(|field| field.to_lowercase().contains(&self.search_lower))
    }

    fn matches_crop(&self, record: &DiagnosisRecord) -> bool {
        match &self.criteria.crop_equals {
            Some(crop) => &record.crop == crop,
            None => true,
        }
    }

    fn matches_severity(&self, record: &DiagnosisRecord) -> bool {
        match self.criteria.severity_equals {
            Some(severity) => record.severity == severity,
            None => true,
        }
    }

    /// Matching records, cloned, in input order
    pub fn filter(&self, records: &[DiagnosisRecord]) -> Vec<DiagnosisRecord> {
        records.iter().filter(|r| self.matches(r)).cloned().collect()
    }

    /// Matching records, borrowed, in input order
    pub fn filter_refs<'a>(&self, records: &'a [DiagnosisRecord]) -> Vec<&'a DiagnosisRecord> {
        records.iter().filter(|r| self.matches(r)).collect()
    }
}

/// One-shot form of `RecordFilterEngine::filter`
pub fn filter_records(records: &[DiagnosisRecord], criteria: &FilterCriteria) -> Vec<DiagnosisRecord> {
    RecordFilterEngine::new(criteria.clone()).filter(records)
}

/// Crops in first-seen order, without duplicates (options for the crop filter)
pub fn distinct_crops(records: &[DiagnosisRecord]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut crops = Vec::new();

    for record in records {
        if seen.insert(record.crop.as_str()) {
            crops.push(record.crop.clone());
        }
    }

    crops
}

// ============================================================================
// SUMMARY
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HistorySummary {
    pub total: usize,
    pub healthy: usize,
    pub low: usize,
    pub medium: usize,
    pub high: usize,
    pub critical: usize,
    pub average_confidence: f64,
}

impl HistorySummary {
    pub fn from_records(records: &[DiagnosisRecord]) -> Self {
        let mut summary = HistorySummary {
            total: records.len(),
            ..Default::default()
        };

        let mut confidence_sum: u64 = 0;
        for record in records {
            confidence_sum += u64::from(record.confidence);
            match record.severity {
                RecordSeverity::Healthy => summary.healthy += 1,
                RecordSeverity::Low => summary.low += 1,
                RecordSeverity::Medium => summary.medium += 1,
                RecordSeverity::High => summary.high += 1,
                RecordSeverity::Critical => summary.critical += 1,
            }
        }

        if !records.is_empty() {
            summary.average_confidence = confidence_sum as f64 / records.len() as f64;
        }

        summary
    }

    /// Records that found a disease
    pub fn diseased(&self) -> usize {
        self.total - self.healthy
    }
}

// ============================================================================
// TESTS
// ============================================================================
