// Crop Diagnosis System - Core Library
// Exposes all modules for use in the CLI and tests

pub mod app;
pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod filter;
pub mod inference;
pub mod locale;
pub mod logging;
pub mod navigation;
pub mod sample;
pub mod session;
pub mod workflow;

// Re-export commonly used types
pub use app::AppContext;
pub use config::AppConfig;
pub use db::{
    HistoryStore, InMemoryHistoryStore, SqliteHistoryStore,
    load_csv, export_csv, setup_database, insert_records, get_all_records, verify_count,
};
pub use entities::{
    Role, User, Severity, RecordSeverity, DiagnosisResult, DiagnosisRecord, CropImage, ImageFormat,
};
pub use error::{AnalysisError, AuthError, LocaleError, RoleError, ValidationError, WorkflowError};
pub use filter::{
    FilterCriteria, RecordFilterEngine, HistorySummary, filter_records, distinct_crops,
};
pub use inference::{InferenceBackend, SimulatedInference};
pub use locale::{Locale, LocaleCatalog};
pub use navigation::{
    NavSection, NavigationItem, NavGroup, NavEntry,
    default_navigation, filter_visible, visible_sections,
};
pub use session::{AuthBackend, DemoAuthenticator, Session, SessionState};
pub use workflow::{
    AnalysisEvent, DiagnosisWorkflow, EventOutcome, RequestToken, WorkflowSettings, WorkflowState,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
