use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::catalog::FormCatalog;
use crate::session::sequencer::FormOrder;
use crate::session::store::{SubmissionStore, SubmittedRecord};
use crate::telemetry::generate_session_id;
use crate::validation::{compute_errors, compute_progress, is_valid, ValidationErrors};

/// Default pause between an accepted submission and the auto-advance, so a
/// presentation layer can show a success indication before context switches.
pub const DEFAULT_ADVANCE_DELAY: Duration = Duration::from_millis(2000);

/// Recoverable failures of session intents. The session mutates nothing
/// when returning one of these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("unknown section: {name}")]
    UnknownSection { name: String },
    #[error("no active section")]
    NoActiveSection,
    #[error("unknown field in active section: {name}")]
    UnknownField { name: String },
    #[error("no submission for section: {name}")]
    NoSuchSubmission { name: String },
}

/// Where the session sits between intents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    /// No section selected.
    Idle,
    /// A section is active and a draft is in progress.
    Editing,
    /// A submission was accepted and the auto-advance is pending.
    Submitted,
}

/// The intent that caused a recorded transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionIntent {
    SelectSection { section: String },
    EditField { field: String },
    Submit,
    EditEntry { section: String },
    DeleteEntry { section: String },
    Advance,
}

/// Result of a `submit` intent. Rejection is a normal outcome, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubmitOutcome {
    Accepted {
        /// True when the section was entered via `edit_entry`, so the
        /// adapter can say "updated" instead of "submitted".
        was_edit: bool,
        /// The section the pending advance will activate, if any.
        next: Option<String>,
    },
    Rejected {
        errors: ValidationErrors,
    },
}

/// Where an applied auto-advance landed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdvanceTarget {
    Section(String),
    Idle,
}

/// Deferred post-submit transition. Cancelled by any intervening intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingAdvance {
    /// `None` means the traversal order is exhausted and the session
    /// returns to idle.
    pub to: Option<String>,
    pub fires_at: Instant,
}

/// Audit trail entry for one applied transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionRecord {
    pub from_phase: SessionPhase,
    pub to_phase: SessionPhase,
    pub intent: SessionIntent,
    pub timestamp: DateTime<Utc>,
}

/// Read-only view of the session handed to the presentation adapter after
/// every transition.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    pub active_section: Option<String>,
    pub draft: HashMap<String, String>,
    pub errors: ValidationErrors,
    pub progress: u8,
    pub editing_section: Option<String>,
    pub submissions: SubmissionStore,
}

/// The form-session state machine. Owns all mutable session state; the
/// catalog and traversal order are immutable construction inputs.
pub struct FormSession {
    catalog: Arc<FormCatalog>,
    order: FormOrder,
    advance_delay: Duration,
    session_id: String,

    active_section: Option<String>,
    draft: HashMap<String, String>,
    errors: ValidationErrors,
    progress: u8,
    editing_section: Option<String>,
    submissions: SubmissionStore,
    pending_advance: Option<PendingAdvance>,
    history: Vec<TransitionRecord>,
}

impl FormSession {
    /// Fails with `UnknownSection` if the order references a section the
    /// catalog does not define.
    pub fn new(catalog: Arc<FormCatalog>, order: FormOrder) -> Result<Self, SessionError> {
        order.validate(&catalog)?;
        let session_id = generate_session_id();
        info!(
            session_id = %session_id,
            sections = %catalog.len(),
            order_len = %order.names().len(),
            "form session created"
        );
        Ok(Self {
            catalog,
            order,
            advance_delay: DEFAULT_ADVANCE_DELAY,
            session_id,
            active_section: None,
            draft: HashMap::new(),
            errors: ValidationErrors::new(),
            progress: 0,
            editing_section: None,
            submissions: SubmissionStore::new(),
            pending_advance: None,
            history: Vec::new(),
        })
    }

    pub fn with_advance_delay(mut self, delay: Duration) -> Self {
        self.advance_delay = delay;
        self
    }

    // --- intents -----------------------------------------------------------

    /// Activate a section for fresh input. Never pre-populates, even when a
    /// submission for that section already exists (`edit_entry` does that).
    pub fn select_section(&mut self, name: &str) -> Result<(), SessionError> {
        if !self.catalog.contains(name) {
            return Err(SessionError::UnknownSection {
                name: name.to_string(),
            });
        }
        let from = self.phase();
        self.cancel_pending_advance("select_section");
        self.activate_fresh(name);
        self.record_transition(
            from,
            SessionIntent::SelectSection {
                section: name.to_string(),
            },
        );
        Ok(())
    }

    /// Update one draft value. Progress is recomputed eagerly; the field's
    /// error entry is cleared without re-validating, so a still-invalid
    /// value shows no error until the next submit attempt.
    pub fn edit_field(&mut self, name: &str, value: &str) -> Result<u8, SessionError> {
        let active = self
            .active_section
            .clone()
            .ok_or(SessionError::NoActiveSection)?;
        let catalog = Arc::clone(&self.catalog);
        let section = catalog
            .get(&active)
            .ok_or_else(|| SessionError::UnknownSection { name: active.clone() })?;
        if !section.has_field(name) {
            return Err(SessionError::UnknownField {
                name: name.to_string(),
            });
        }
        let from = self.phase();
        self.cancel_pending_advance("edit_field");
        self.draft.insert(name.to_string(), value.to_string());
        self.progress = compute_progress(&section.fields, &self.draft);
        self.errors.remove(name);
        self.record_transition(
            from,
            SessionIntent::EditField {
                field: name.to_string(),
            },
        );
        Ok(self.progress)
    }

    /// Validate the full draft and, when clean, store the record and
    /// schedule the auto-advance. A rejected submit changes nothing but the
    /// error map.
    pub fn submit(&mut self) -> Result<SubmitOutcome, SessionError> {
        let active = self
            .active_section
            .clone()
            .ok_or(SessionError::NoActiveSection)?;
        let catalog = Arc::clone(&self.catalog);
        let section = catalog
            .get(&active)
            .ok_or_else(|| SessionError::UnknownSection { name: active.clone() })?;
        let from = self.phase();
        self.cancel_pending_advance("submit");

        let errors = compute_errors(&section.fields, &self.draft);
        if !is_valid(&errors) {
            self.errors = errors.clone();
            info!(
                session_id = %self.session_id,
                section = %active,
                error_count = %errors.len(),
                "submission rejected"
            );
            self.record_transition(from, SessionIntent::Submit);
            return Ok(SubmitOutcome::Rejected { errors });
        }

        let was_edit = self.editing_section.as_deref() == Some(active.as_str());
        self.submissions
            .upsert(&active, SubmittedRecord::new(self.draft.clone()));
        self.errors.clear();

        let next = self.order.next_after(&active).map(str::to_string);
        self.pending_advance = Some(PendingAdvance {
            to: next.clone(),
            fires_at: Instant::now() + self.advance_delay,
        });
        info!(
            session_id = %self.session_id,
            section = %active,
            was_edit = %was_edit,
            next = ?next,
            "submission accepted"
        );
        self.record_transition(from, SessionIntent::Submit);
        Ok(SubmitOutcome::Accepted { was_edit, next })
    }

    /// Re-open a stored submission for editing: the draft is pre-populated
    /// from the record and a later accepted submit reports "updated".
    pub fn edit_entry(&mut self, name: &str) -> Result<(), SessionError> {
        let record = self
            .submissions
            .get(name)
            .ok_or_else(|| SessionError::NoSuchSubmission {
                name: name.to_string(),
            })?;
        let values = record.values.clone();
        let catalog = Arc::clone(&self.catalog);
        // Store keys always come from the catalog, so this lookup holds.
        let section = catalog
            .get(name)
            .ok_or_else(|| SessionError::UnknownSection {
                name: name.to_string(),
            })?;
        let from = self.phase();
        self.cancel_pending_advance("edit_entry");
        self.active_section = Some(name.to_string());
        self.draft = values;
        self.errors.clear();
        self.progress = compute_progress(&section.fields, &self.draft);
        self.editing_section = Some(name.to_string());
        self.record_transition(
            from,
            SessionIntent::EditEntry {
                section: name.to_string(),
            },
        );
        Ok(())
    }

    /// Remove a stored submission. If that section is currently in edit
    /// mode the session drops the edit flag but keeps the active section
    /// and draft, so in-progress input survives and a later submit counts
    /// as a fresh submission.
    pub fn delete_entry(&mut self, name: &str) -> Result<(), SessionError> {
        if !self.submissions.contains(name) {
            return Err(SessionError::NoSuchSubmission {
                name: name.to_string(),
            });
        }
        let from = self.phase();
        self.cancel_pending_advance("delete_entry");
        self.submissions.delete(name);
        if self.editing_section.as_deref() == Some(name) {
            self.editing_section = None;
        }
        info!(session_id = %self.session_id, section = %name, "submission deleted");
        self.record_transition(
            from,
            SessionIntent::DeleteEntry {
                section: name.to_string(),
            },
        );
        Ok(())
    }

    // --- deferred auto-advance --------------------------------------------

    /// Deadline of the pending advance, for driving a `select!` loop.
    pub fn advance_deadline(&self) -> Option<Instant> {
        self.pending_advance.as_ref().map(|p| p.fires_at)
    }

    pub fn pending_advance(&self) -> Option<&PendingAdvance> {
        self.pending_advance.as_ref()
    }

    /// Apply the pending advance immediately. The caller is responsible for
    /// honoring `fires_at`; `wait_for_advance` does both.
    pub fn apply_pending_advance(&mut self) -> Option<AdvanceTarget> {
        let from = self.phase();
        let pending = self.pending_advance.take()?;
        let target = match pending.to {
            Some(name) => {
                // Validated against the catalog when the order was built.
                self.activate_fresh(&name);
                AdvanceTarget::Section(name)
            }
            None => {
                self.reset_to_idle();
                AdvanceTarget::Idle
            }
        };
        info!(session_id = %self.session_id, target = ?target, "auto-advance applied");
        self.record_transition(from, SessionIntent::Advance);
        Some(target)
    }

    /// Sleep until the pending advance is due, then apply it. Returns
    /// immediately with `None` when nothing is scheduled.
    pub async fn wait_for_advance(&mut self) -> Option<AdvanceTarget> {
        let fires_at = self.pending_advance.as_ref()?.fires_at;
        tokio::time::sleep_until(fires_at).await;
        self.apply_pending_advance()
    }

    fn cancel_pending_advance(&mut self, intent: &str) {
        if let Some(pending) = self.pending_advance.take() {
            debug!(
                session_id = %self.session_id,
                cancelled_target = ?pending.to,
                intent = %intent,
                "pending auto-advance cancelled by newer intent"
            );
        }
    }

    // --- observation -------------------------------------------------------

    pub fn phase(&self) -> SessionPhase {
        if self.pending_advance.is_some() {
            SessionPhase::Submitted
        } else if self.active_section.is_some() {
            SessionPhase::Editing
        } else {
            SessionPhase::Idle
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase(),
            active_section: self.active_section.clone(),
            draft: self.draft.clone(),
            errors: self.errors.clone(),
            progress: self.progress,
            editing_section: self.editing_section.clone(),
            submissions: self.submissions.clone(),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn catalog(&self) -> &FormCatalog {
        &self.catalog
    }

    pub fn order(&self) -> &FormOrder {
        &self.order
    }

    pub fn active_section(&self) -> Option<&str> {
        self.active_section.as_deref()
    }

    pub fn draft(&self) -> &HashMap<String, String> {
        &self.draft
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn is_editing_entry(&self) -> bool {
        self.editing_section.is_some()
    }

    pub fn editing_section(&self) -> Option<&str> {
        self.editing_section.as_deref()
    }

    pub fn submissions(&self) -> &SubmissionStore {
        &self.submissions
    }

    pub fn history(&self) -> &[TransitionRecord] {
        &self.history
    }

    // --- internals ---------------------------------------------------------

    fn activate_fresh(&mut self, name: &str) {
        self.active_section = Some(name.to_string());
        self.draft.clear();
        self.errors.clear();
        self.progress = 0;
        self.editing_section = None;
    }

    fn reset_to_idle(&mut self) {
        self.active_section = None;
        self.draft.clear();
        self.errors.clear();
        self.progress = 0;
        self.editing_section = None;
    }

    fn record_transition(&mut self, from: SessionPhase, intent: SessionIntent) {
        let record = TransitionRecord {
            from_phase: from,
            to_phase: self.phase(),
            intent,
            timestamp: Utc::now(),
        };
        debug!(
            session_id = %self.session_id,
            from = ?record.from_phase,
            to = ?record.to_phase,
            intent = ?record.intent,
            "form session transition"
        );
        self.history.push(record);
    }
}

impl std::fmt::Debug for FormSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormSession")
            .field("session_id", &self.session_id)
            .field("phase", &self.phase())
            .field("active_section", &self.active_section)
            .field("progress", &self.progress)
            .field("editing_section", &self.editing_section)
            .field("submission_count", &self.submissions.len())
            .field("pending_advance", &self.pending_advance)
            .finish()
    }
}
