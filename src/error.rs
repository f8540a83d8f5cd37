// Error taxonomy for the diagnosis core
// Every variant is recovered at the component that raises it; none is fatal.

use thiserror::Error;

/// Credential verification failed. The login form stays retryable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Invalid credentials. Please try again.")]
    InvalidCredentials,

    #[error("Email address is required")]
    MissingEmail,

    #[error("Password is required")]
    MissingPassword,

    #[error("Malformed email address: {0}")]
    MalformedEmail(String),
}

/// Inference backend failure, surfaced through the `Failed` workflow state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    #[error("analysis timed out after {0} ms")]
    Timeout(u64),

    #[error("inference backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("inference backend rejected the image: {0}")]
    Rejected(String),

    #[error("inference task aborted before producing a result")]
    Aborted,

    #[error("inference returned an invalid result: {0}")]
    InvalidResult(String),
}

/// Malformed input: bad images or results that break the data-model invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("image is empty")]
    EmptyImage,

    #[error("image is {size} bytes, limit is {limit} bytes")]
    ImageTooLarge { size: usize, limit: usize },

    #[error("unsupported image format")]
    UnsupportedFormat,

    #[error("confidence {0} is outside 0..=100")]
    ConfidenceOutOfRange(u32),

    #[error("healthy result must carry severity Low, got {0}")]
    HealthyWithSeverity(String),

    #[error("unknown severity: {0}")]
    UnknownSeverity(String),
}

/// Errors returned by `DiagnosisWorkflow` operations.
///
/// `InvalidTransition` leaves the workflow state untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    #[error("cannot {operation} while {state}")]
    InvalidTransition {
        operation: &'static str,
        state: &'static str,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("no async runtime available to run the analysis")]
    NoRuntime,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported locale: {0} (expected en, es, hi or sw)")]
pub struct LocaleError(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown role: {0} (expected farmer, agronomist, extension or admin)")]
pub struct RoleError(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_transition_message() {
        let err = WorkflowError::InvalidTransition {
            operation: "analyze",
            state: "Analyzing",
        };
        assert_eq!(err.to_string(), "cannot analyze while Analyzing");
    }

    #[test]
    fn test_validation_converts_into_workflow_error() {
        let err: WorkflowError = ValidationError::EmptyImage.into();
        assert_eq!(err, WorkflowError::Validation(ValidationError::EmptyImage));
        assert_eq!(err.to_string(), "image is empty");
    }
}
