// Entity Models
//
// Plain data shared by every component:
// - Role and User (owned by SessionState)
// - DiagnosisResult (owned by the workflow that produced it)
// - DiagnosisRecord (read-only history rows)
// - CropImage (input to the inference backend)

pub mod role;
pub mod user;
pub mod severity;
pub mod diagnosis;
pub mod record;
pub mod image;

pub use role::Role;
pub use user::User;
pub use severity::{Severity, RecordSeverity};
pub use diagnosis::DiagnosisResult;
pub use record::DiagnosisRecord;
pub use image::{CropImage, ImageFormat};
