pub mod sequencer;
pub mod state_machine;
pub mod store;

pub use sequencer::FormOrder;
pub use state_machine::{
    AdvanceTarget, FormSession, PendingAdvance, SessionError, SessionIntent, SessionPhase,
    SessionSnapshot, SubmitOutcome, TransitionRecord, DEFAULT_ADVANCE_DELAY,
};
pub use store::{SubmissionStore, SubmittedRecord};
