// Formflow - catalog-driven multi-step form engine
// This exposes the core components for testing and integration

pub mod catalog;
pub mod config;
pub mod session;
pub mod telemetry;
pub mod validation;

// Re-export key types for easy access
pub use catalog::{FieldDescriptor, FieldKind, FormCatalog, SectionDefinition};
pub use config::FormflowConfig;
pub use session::{
    AdvanceTarget, FormOrder, FormSession, PendingAdvance, SessionError, SessionPhase,
    SessionSnapshot, SubmissionStore, SubmitOutcome, SubmittedRecord,
};
pub use telemetry::{generate_session_id, init_telemetry};
pub use validation::{compute_errors, compute_progress, is_valid, ValidationErrors};
