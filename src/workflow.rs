// 🩺 Diagnosis Workflow - image → analysis → result state machine
//
// States: Idle, ImageSelected, Analyzing, Complete, Failed.
//
// `analyze()` issues a fresh RequestToken and runs the inference call on the
// tokio runtime. The outcome comes back as an AnalysisEvent on the workflow's
// own channel and is applied only if its token is still the live one.
// `reset()` and every new `analyze()` retire the previous token, so late
// outcomes from superseded requests are dropped without touching state.

use crate::entities::{CropImage, DiagnosisResult};
use crate::error::{AnalysisError, WorkflowError};
use crate::inference::InferenceBackend;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

// ============================================================================
// REQUEST TOKEN
// ============================================================================

/// Opaque id correlating one `analyze()` call with its outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestToken(Uuid);

impl RequestToken {
    fn issue() -> Self {
        RequestToken(Uuid::new_v4())
    }
}

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// STATES AND EVENTS
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowState {
    Idle,
    ImageSelected(CropImage),
    Analyzing {
        image: CropImage,
        token: RequestToken,
    },
    Complete(DiagnosisResult),
    Failed(AnalysisError),
}

impl WorkflowState {
    pub fn name(&self) -> &'static str {
        match self {
            WorkflowState::Idle => "Idle",
            WorkflowState::ImageSelected(_) => "ImageSelected",
            WorkflowState::Analyzing { .. } => "Analyzing",
            WorkflowState::Complete(_) => "Complete",
            WorkflowState::Failed(_) => "Failed",
        }
    }
}

/// Outcome of one inference call, tagged with the token it was issued under
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisEvent {
    Resolved {
        token: RequestToken,
        result: DiagnosisResult,
    },
    Failed {
        token: RequestToken,
        error: AnalysisError,
    },
}

impl AnalysisEvent {
    pub fn token(&self) -> RequestToken {
        match self {
            AnalysisEvent::Resolved { token, .. } | AnalysisEvent::Failed { token, .. } => *token,
        }
    }
}

/// What happened to a delivered event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    /// Token was live; state moved to Complete or Failed
    Applied,
    /// Token was retired or unknown; state untouched
    Stale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkflowSettings {
    pub analysis_timeout: Duration,
    pub max_image_bytes: usize,
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        WorkflowSettings {
            analysis_timeout: Duration::from_secs(30),
            max_image_bytes: 10 * 1024 * 1024,
        }
    }
}

// ============================================================================
// WORKFLOW
// ============================================================================

/// One diagnosis session. Not shared: the owner drives every transition.
pub struct DiagnosisWorkflow {
    state: WorkflowState,
    backend: Arc<dyn InferenceBackend>,
    settings: WorkflowSettings,
    events_tx: mpsc::UnboundedSender<AnalysisEvent>,
    events_rx: mpsc::UnboundedReceiver<AnalysisEvent>,
    /// Spawned calls whose event has not been received yet
    pending: usize,
}

impl DiagnosisWorkflow {
    pub fn new(backend: Arc<dyn InferenceBackend>, settings: WorkflowSettings) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        DiagnosisWorkflow {
            state: WorkflowState::Idle,
            backend,
            settings,
            events_tx,
            events_rx,
            pending: 0,
        }
    }

    // ------------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------------

    /// Select (or replace) the image to analyze. Any previous result or
    /// error is discarded. Rejected while an analysis is running.
    pub fn select_image(&mut self, image: CropImage) -> Result<(), WorkflowError> {
        if self.is_analyzing() {
            return Err(self.invalid("select an image"));
        }

        let format = image.validate(self.settings.max_image_bytes)?;
        info!(
            from = self.state.name(),
            image = %image.short_digest(),
            bytes = image.len(),
            media_type = format.media_type(),
            "image selected"
        );

        self.state = WorkflowState::ImageSelected(image);
        Ok(())
    }

    /// Start analyzing the selected image. Returns immediately with the
    /// token of the new request; the outcome arrives as an event.
    pub fn analyze(&mut self) -> Result<RequestToken, WorkflowError> {
        let image = match &self.state {
            WorkflowState::ImageSelected(image) => image.clone(),
            _ => return Err(self.invalid("analyze")),
        };

        let runtime = Handle::try_current().map_err(|_| WorkflowError::NoRuntime)?;
        let token = RequestToken::issue();

        let backend = Arc::clone(&self.backend);
        let events = self.events_tx.clone();
        let timeout = self.settings.analysis_timeout;
        let request_image = image.clone();

        runtime.spawn(async move {
            let mut call = tokio::spawn(async move { backend.submit_for_analysis(request_image).await });

            let outcome = match tokio::time::timeout(timeout, &mut call).await {
                Ok(Ok(outcome)) => outcome,
                Ok(Err(_)) => Err(AnalysisError::Aborted),
                Err(_) => {
                    // Stop the backend call; dropping the handle only detaches it
                    call.abort();
                    Err(AnalysisError::Timeout(timeout.as_millis() as u64))
                }
            };

            let event = match outcome {
                Ok(result) => AnalysisEvent::Resolved { token, result },
                Err(error) => AnalysisEvent::Failed { token, error },
            };

            // Receiver is gone only if the workflow itself was dropped
            let _ = events.send(event);
        });

        info!(token = %token, image = %image.short_digest(), "analysis started");
        self.pending += 1;
        self.state = WorkflowState::Analyzing { image, token };
        Ok(token)
    }

    /// Apply a successful outcome if `token` is the live request
    pub fn on_analysis_resolved(&mut self, token: RequestToken, result: DiagnosisResult) -> EventOutcome {
        if !self.is_live(token) {
            debug!(token = %token, state = self.state.name(), "discarding stale analysis result");
            return EventOutcome::Stale;
        }

        info!(
            token = %token,
            disease = result.disease_label(),
            confidence = result.confidence(),
            severity = %result.severity(),
            "analysis complete"
        );
        self.state = WorkflowState::Complete(result);
        EventOutcome::Applied
    }

    /// Apply a failure if `token` is the live request
    pub fn on_analysis_failed(&mut self, token: RequestToken, error: AnalysisError) -> EventOutcome {
        if !self.is_live(token) {
            debug!(token = %token, state = self.state.name(), "discarding stale analysis failure");
            return EventOutcome::Stale;
        }

        warn!(token = %token, error = %error, "analysis failed");
        self.state = WorkflowState::Failed(error);
        EventOutcome::Applied
    }

    /// Back to Idle from any state. An in-flight request keeps running
    /// but its outcome will be discarded.
    pub fn reset(&mut self) {
        if let WorkflowState::Analyzing { token, .. } = &self.state {
            info!(token = %token, "analysis superseded by reset");
        }
        debug!(from = self.state.name(), "workflow reset");
        self.state = WorkflowState::Idle;
    }

    // ------------------------------------------------------------------------
    // Event delivery
    // ------------------------------------------------------------------------

    pub fn apply_event(&mut self, event: AnalysisEvent) -> EventOutcome {
        match event {
            AnalysisEvent::Resolved { token, result } => self.on_analysis_resolved(token, result),
            AnalysisEvent::Failed { token, error } => self.on_analysis_failed(token, error),
        }
    }

    /// Wait for the next outcome of any spawned request and apply it.
    /// Returns None when no request is outstanding.
    pub async fn next_event(&mut self) -> Option<EventOutcome> {
        if self.pending == 0 {
            return None;
        }

        let event = self.events_rx.recv().await?;
        self.pending = self.pending.saturating_sub(1);
        Some(self.apply_event(event))
    }

    /// Apply every outcome already queued, without waiting
    pub fn drain_events(&mut self) -> Vec<EventOutcome> {
        let mut outcomes = Vec::new();

        while let Ok(event) = self.events_rx.try_recv() {
            self.pending = self.pending.saturating_sub(1);
            outcomes.push(self.apply_event(event));
        }

        outcomes
    }

    /// Deliver events until the workflow leaves Analyzing
    pub async fn wait_for_outcome(&mut self) -> &WorkflowState {
        while self.is_analyzing() {
            if self.next_event().await.is_none() {
                break;
            }
        }
        &self.state
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    pub fn is_analyzing(&self) -> bool {
        matches!(self.state, WorkflowState::Analyzing { .. })
    }

    pub fn current_token(&self) -> Option<RequestToken> {
        match &self.state {
            WorkflowState::Analyzing { token, .. } => Some(*token),
            _ => None,
        }
    }

    pub fn selected_image(&self) -> Option<&CropImage> {
        match &self.state {
            WorkflowState::ImageSelected(image) | WorkflowState::Analyzing { image, .. } => Some(image),
            _ => None,
        }
    }

    pub fn result(&self) -> Option<&DiagnosisResult> {
        match &self.state {
            WorkflowState::Complete(result) => Some(result),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&AnalysisError> {
        match &self.state {
            WorkflowState::Failed(error) => Some(error),
            _ => None,
        }
    }

    pub fn pending_requests(&self) -> usize {
        self.pending
    }

    fn is_live(&self, token: RequestToken) -> bool {
        self.current_token() == Some(token)
    }

    fn invalid(&self, operation: &'static str) -> WorkflowError {
        WorkflowError::InvalidTransition {
            operation,
            state: self.state.name(),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::inference::SimulatedInference;
    use crate::sample::{healthy_result, late_blight_result};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Backend that never answers in time; records whether its call was
    /// dropped or ran to the end
    struct HangingInference {
        delay: Duration,
        dropped: Arc<AtomicBool>,
        finished: Arc<AtomicBool>,
    }

    struct DropFlag(Arc<AtomicBool>);

    impl Drop for DropFlag {
        fn drop(&mut self) {
            self.0.store(true, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl InferenceBackend for HangingInference {
        async fn submit_for_analysis(&self, _image: CropImage) -> Result<DiagnosisResult, AnalysisError> {
            let _guard = DropFlag(Arc::clone(&self.dropped));
            tokio::time::sleep(self.delay).await;
            self.finished.store(true, Ordering::SeqCst);
            Ok(late_blight_result())
        }
    }

    fn jpeg(tag: u8) -> CropImage {
        CropImage::new(format!("leaf-{}.jpg", tag), vec![0xFF, 0xD8, 0xFF, 0xE0, tag])
    }

    fn workflow_with(backend: SimulatedInference) -> DiagnosisWorkflow {
        DiagnosisWorkflow::new(Arc::new(backend), WorkflowSettings::default())
    }

    fn workflow() -> DiagnosisWorkflow {
        workflow_with(SimulatedInference::new(Duration::ZERO))
    }

    #[test]
    fn test_starts_idle() {
        let wf = workflow();
        assert_eq!(wf.state(), &WorkflowState::Idle);
        assert_eq!(wf.current_token(), None);
    }

    #[test]
    fn test_select_image_validates() {
        let mut wf = workflow();

        let err = wf.select_image(CropImage::new("empty.jpg", vec![])).unwrap_err();
        assert_eq!(err, WorkflowError::Validation(ValidationError::EmptyImage));
        assert_eq!(wf.state(), &WorkflowState::Idle);

        wf.select_image(jpeg(1)).unwrap();
        assert_eq!(wf.state().name(), "ImageSelected");
        assert_eq!(wf.selected_image().unwrap().file_name(), "leaf-1.jpg");
    }

    #[test]
    fn test_analyze_requires_selected_image() {
        let mut wf = workflow();
        assert_eq!(
            wf.analyze(),
            Err(WorkflowError::InvalidTransition {
                operation: "analyze",
                state: "Idle",
            })
        );
    }

    #[test]
    fn test_analyze_without_runtime() {
        let mut wf = workflow();
        wf.select_image(jpeg(1)).unwrap();

        assert_eq!(wf.analyze(), Err(WorkflowError::NoRuntime));
        assert_eq!(wf.state().name(), "ImageSelected");
    }

    #[tokio::test]
    async fn test_full_analysis_cycle() {
        let mut wf = workflow();
        wf.select_image(jpeg(1)).unwrap();

        let token = wf.analyze().unwrap();
        assert!(wf.is_analyzing());
        assert_eq!(wf.current_token(), Some(token));

        let state = wf.wait_for_outcome().await;
        assert_eq!(state, &WorkflowState::Complete(late_blight_result()));
        assert_eq!(wf.pending_requests(), 0);
        assert_eq!(wf.next_event().await, None);
    }

    #[tokio::test]
    async fn test_backend_failure_moves_to_failed() {
        let error = AnalysisError::BackendUnavailable("model offline".to_string());
        let mut wf = workflow_with(SimulatedInference::failing(Duration::ZERO, error.clone()));

        wf.select_image(jpeg(1)).unwrap();
        wf.analyze().unwrap();
        wf.wait_for_outcome().await;

        assert_eq!(wf.error(), Some(&error));

        // Failed is recoverable through select_image
        wf.select_image(jpeg(2)).unwrap();
        assert_eq!(wf.state().name(), "ImageSelected");
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_fails_analysis() {
        let backend = SimulatedInference::new(Duration::from_secs(60));
        let settings = WorkflowSettings {
            analysis_timeout: Duration::from_millis(500),
            ..WorkflowSettings::default()
        };
        let mut wf = DiagnosisWorkflow::new(Arc::new(backend), settings);

        wf.select_image(jpeg(1)).unwrap();
        wf.analyze().unwrap();
        wf.wait_for_outcome().await;

        assert_eq!(wf.error(), Some(&AnalysisError::Timeout(500)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_stops_backend_call() {
        let dropped = Arc::new(AtomicBool::new(false));
        let finished = Arc::new(AtomicBool::new(false));
        let backend = HangingInference {
            delay: Duration::from_secs(60),
            dropped: Arc::clone(&dropped),
            finished: Arc::clone(&finished),
        };
        let settings = WorkflowSettings {
            analysis_timeout: Duration::from_millis(500),
            ..WorkflowSettings::default()
        };
        let mut wf = DiagnosisWorkflow::new(Arc::new(backend), settings);

        wf.select_image(jpeg(1)).unwrap();
        wf.analyze().unwrap();
        wf.wait_for_outcome().await;
        assert_eq!(wf.error(), Some(&AnalysisError::Timeout(500)));

        // Well past the backend's own delay
        tokio::time::sleep(Duration::from_secs(120)).await;

        assert!(dropped.load(Ordering::SeqCst), "backend call should be dropped");
        assert!(!finished.load(Ordering::SeqCst), "backend call should not complete");
    }

    #[tokio::test]
    async fn test_select_image_from_complete_discards_result() {
        let mut wf = workflow();
        wf.select_image(jpeg(1)).unwrap();
        wf.analyze().unwrap();
        wf.wait_for_outcome().await;
        assert_eq!(wf.result(), Some(&late_blight_result()));

        wf.select_image(jpeg(2)).unwrap();
        assert_eq!(wf.state().name(), "ImageSelected");
        assert_eq!(wf.result(), None);
        assert_eq!(wf.selected_image().unwrap().file_name(), "leaf-2.jpg");
    }

    #[tokio::test]
    async fn test_operations_rejected_while_analyzing() {
        let mut wf = workflow_with(SimulatedInference::new(Duration::from_secs(5)));
        wf.select_image(jpeg(1)).unwrap();
        let token = wf.analyze().unwrap();

        assert_eq!(
            wf.analyze(),
            Err(WorkflowError::InvalidTransition {
                operation: "analyze",
                state: "Analyzing",
            })
        );
        assert_eq!(
            wf.select_image(jpeg(2)),
            Err(WorkflowError::InvalidTransition {
                operation: "select an image",
                state: "Analyzing",
            })
        );
        assert_eq!(wf.current_token(), Some(token));
    }

    #[tokio::test]
    async fn test_reset_from_every_state_yields_idle() {
        let mut wf = workflow_with(SimulatedInference::new(Duration::from_secs(5)));

        // Idle
        wf.reset();
        assert_eq!(wf.state(), &WorkflowState::Idle);

        // ImageSelected
        wf.select_image(jpeg(1)).unwrap();
        wf.reset();
        assert_eq!(wf.state(), &WorkflowState::Idle);

        // Analyzing
        wf.select_image(jpeg(1)).unwrap();
        let token = wf.analyze().unwrap();
        wf.reset();
        assert_eq!(wf.state(), &WorkflowState::Idle);

        // Complete (driven directly through a fresh token)
        wf.select_image(jpeg(2)).unwrap();
        let token2 = wf.analyze().unwrap();
        assert_eq!(wf.on_analysis_resolved(token2, healthy_result()), EventOutcome::Applied);
        wf.reset();
        assert_eq!(wf.state(), &WorkflowState::Idle);

        // Failed
        wf.select_image(jpeg(3)).unwrap();
        let token3 = wf.analyze().unwrap();
        assert_eq!(wf.on_analysis_failed(token3, AnalysisError::Aborted), EventOutcome::Applied);
        wf.reset();
        assert_eq!(wf.state(), &WorkflowState::Idle);

        // Retired token from the Analyzing step has no effect
        assert_eq!(wf.on_analysis_resolved(token, late_blight_result()), EventOutcome::Stale);
        assert_eq!(wf.state(), &WorkflowState::Idle);
    }

    #[tokio::test]
    async fn test_stale_result_after_reset_is_discarded() {
        let mut wf = workflow_with(SimulatedInference::new(Duration::from_secs(5)));

        wf.select_image(jpeg(1)).unwrap();
        let t1 = wf.analyze().unwrap();
        wf.reset();

        wf.select_image(jpeg(2)).unwrap();
        let t2 = wf.analyze().unwrap();
        assert_ne!(t1, t2);

        // T1's result arrives late
        assert_eq!(wf.on_analysis_resolved(t1, late_blight_result()), EventOutcome::Stale);
        assert!(wf.is_analyzing());
        assert_eq!(wf.current_token(), Some(t2));
        assert_eq!(wf.selected_image().unwrap().file_name(), "leaf-2.jpg");

        // T1's failure is discarded the same way
        assert_eq!(wf.on_analysis_failed(t1, AnalysisError::Aborted), EventOutcome::Stale);
        assert!(wf.is_analyzing());

        // T2 still governs the session
        assert_eq!(wf.on_analysis_resolved(t2, healthy_result()), EventOutcome::Applied);
        assert_eq!(wf.result(), Some(&healthy_result()));
    }

    #[tokio::test]
    async fn test_late_event_from_channel_is_stale() {
        let mut wf = workflow();

        wf.select_image(jpeg(1)).unwrap();
        wf.analyze().unwrap();
        wf.reset();

        // The retired call still reports back, and is ignored
        assert_eq!(wf.next_event().await, Some(EventOutcome::Stale));
        assert_eq!(wf.state(), &WorkflowState::Idle);
        assert_eq!(wf.pending_requests(), 0);
    }

    #[tokio::test]
    async fn test_drain_events_applies_queued_outcomes() {
        let mut wf = workflow();
        assert!(wf.drain_events().is_empty());

        wf.select_image(jpeg(1)).unwrap();
        wf.analyze().unwrap();
        wf.reset();

        wf.select_image(jpeg(2)).unwrap();
        let live = wf.analyze().unwrap();
        assert_eq!(wf.pending_requests(), 2);

        // Let both spawned calls report back
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(wf.drain_events(), vec![EventOutcome::Stale, EventOutcome::Applied]);
        assert_eq!(wf.state(), &WorkflowState::Complete(late_blight_result()));
        assert_ne!(wf.current_token(), Some(live));
        assert_eq!(wf.pending_requests(), 0);
        assert!(wf.drain_events().is_empty());
    }

    #[tokio::test]
    async fn test_event_outcome_for_completed_state() {
        let mut wf = workflow_with(SimulatedInference::new(Duration::from_secs(5)));
        wf.select_image(jpeg(1)).unwrap();
        let token = wf.analyze().unwrap();

        assert_eq!(wf.on_analysis_resolved(token, late_blight_result()), EventOutcome::Applied);
        // A duplicate delivery for the same token is no longer live
        assert_eq!(wf.on_analysis_failed(token, AnalysisError::Aborted), EventOutcome::Stale);
        assert_eq!(wf.result(), Some(&late_blight_result()));
    }

    #[test]
    fn test_event_token_accessor() {
        let token = RequestToken::issue();
        let event = AnalysisEvent::Failed {
            token,
            error: AnalysisError::Aborted,
        };
        assert_eq!(event.token(), token);
    }
}
