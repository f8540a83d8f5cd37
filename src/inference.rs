// Inference contract and the simulated backend used for demos
//
// A backend takes one image and eventually yields exactly one outcome.
// Correlating outcomes to requests is the workflow's job, not the backend's.

use crate::entities::{CropImage, DiagnosisResult};
use crate::error::AnalysisError;
use crate::sample::late_blight_result;
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

#[async_trait]
pub trait InferenceBackend: Send + Sync {
    async fn submit_for_analysis(&self, image: CropImage) -> Result<DiagnosisResult, AnalysisError>;
}

/// Fixed-outcome backend that answers after a delay.
/// Deterministic: the same configuration always yields the same outcome.
#[derive(Debug, Clone)]
pub struct SimulatedInference {
    delay: Duration,
    outcome: Result<DiagnosisResult, AnalysisError>,
}

impl SimulatedInference {
    /// Answers with the canned late blight diagnosis
    pub fn new(delay: Duration) -> Self {
        SimulatedInference {
            delay,
            outcome: Ok(late_blight_result()),
        }
    }

    pub fn with_result(mut self, result: DiagnosisResult) -> Self {
        self.outcome = Ok(result);
        self
    }

    pub fn failing(delay: Duration, error: AnalysisError) -> Self {
        SimulatedInference {
            delay,
            outcome: Err(error),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

#[async_trait]
impl InferenceBackend for SimulatedInference {
    async fn submit_for_analysis(&self, image: CropImage) -> Result<DiagnosisResult, AnalysisError> {
        debug!(image = %image.short_digest(), delay_ms = self.delay.as_millis() as u64, "simulated inference started");

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        self.outcome.clone()
    }
}
