//! Recovery state machine.
//!
//! ```text
//!            link_parsed              session_resolved
//!  (start) ──────────────▶ Checking ──┬──────────────▶ SessionValid ──update ok──▶ PasswordUpdated
//!     │                               ├──────────────▶ SessionAbsent
//!     │ config_missing                └──────────────▶ Failed
//!     └───────────────────────────────────────────────▶ Failed
//! ```
//!
//! Transitions are driven by discrete events and carry no I/O; the driver in
//! [`flow`](crate::flow) performs the provider calls and feeds the results
//! back. Events that do not apply to the current phase are ignored.

use serde::Serialize;

use crate::form::PasswordForm;
use crate::status::FlowStatus;
use crate::types::RecoveryCredential;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Checking,
    SessionValid,
    SessionAbsent,
    Failed,
    PasswordUpdated,
}

impl Phase {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Checking)
    }
}

/// Result of trying to establish a recovery session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The provider confirmed an active session.
    Established,
    /// No credential, or the provider holds no session after the exchange.
    Absent,
    /// The provider (or transport) failed; carries the reason for logs.
    Rejected(String),
}

/// What the new-password form should look like.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum FormView {
    /// Still checking the link.
    Hidden,
    /// Session valid; `can_submit` reflects validation and the submit guard.
    Editable { can_submit: bool },
    /// No usable session: only a way back to the site.
    DeadEnd,
    /// Password changed and session closed.
    Completed,
}

#[derive(Debug, Clone)]
pub struct RecoveryState {
    phase: Phase,
    form: PasswordForm,
    submitting: bool,
    status: Option<FlowStatus>,
}

impl Default for RecoveryState {
    fn default() -> Self {
        Self::new()
    }
}

impl RecoveryState {
    #[must_use]
    pub fn new() -> Self {
        Self {
            phase: Phase::Checking,
            form: PasswordForm::default(),
            submitting: false,
            status: None,
        }
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn status(&self) -> Option<&FlowStatus> {
        self.status.as_ref()
    }

    #[must_use]
    pub fn form(&self) -> &PasswordForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut PasswordForm {
        &mut self.form
    }

    #[must_use]
    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    #[must_use]
    pub fn session_present(&self) -> bool {
        self.phase == Phase::SessionValid
    }

    /// Submission invariant: valid input, live session, nothing in flight.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        self.session_present() && !self.submitting && self.form.is_valid()
    }

    #[must_use]
    pub fn view(&self) -> FormView {
        match self.phase {
            Phase::Checking => FormView::Hidden,
            Phase::SessionValid => FormView::Editable {
                can_submit: self.can_submit(),
            },
            Phase::SessionAbsent | Phase::Failed => FormView::DeadEnd,
            Phase::PasswordUpdated => FormView::Completed,
        }
    }

    // ── Events ─────────────────────────────────────────────────────

    /// Provider configuration is unavailable. Terminal.
    pub fn config_missing(&mut self) {
        self.phase = Phase::Failed;
        self.status = Some(FlowStatus::config_missing());
    }

    /// A credential was read from the page URL; session check begins.
    pub fn link_parsed(&mut self, credential: &RecoveryCredential) {
        if self.phase != Phase::Checking {
            tracing::debug!(phase = ?self.phase, "link_parsed ignored");
            return;
        }
        tracing::debug!(credential = credential.kind(), "recovery link parsed");
        self.status = Some(FlowStatus::checking_link());
    }

    pub fn session_resolved(&mut self, outcome: SessionOutcome) {
        if self.phase != Phase::Checking {
            tracing::debug!(phase = ?self.phase, "session_resolved ignored");
            return;
        }
        match outcome {
            SessionOutcome::Established => {
                self.phase = Phase::SessionValid;
                self.status = Some(FlowStatus::choose_password());
            }
            SessionOutcome::Absent => {
                self.phase = Phase::SessionAbsent;
                self.status = Some(FlowStatus::link_invalid());
            }
            SessionOutcome::Rejected(reason) => {
                tracing::warn!(reason = %reason, "recovery link rejected");
                self.phase = Phase::Failed;
                self.status = Some(FlowStatus::link_invalid());
            }
        }
        tracing::debug!(phase = ?self.phase, "session check resolved");
    }

    /// User asked to submit.
    ///
    /// Returns the password to send, or `None` when the submission invariant
    /// does not hold (including a submission already in flight).
    pub fn submit_clicked(&mut self) -> Option<String> {
        if !self.can_submit() {
            tracing::debug!(
                phase = ?self.phase,
                submitting = self.submitting,
                "submit ignored"
            );
            return None;
        }
        self.submitting = true;
        Some(self.form.password().to_owned())
    }

    /// The provider answered the password update.
    ///
    /// `Err` carries the message to show the user.
    pub fn update_resolved(&mut self, result: Result<(), String>) {
        if !self.submitting {
            tracing::debug!("update_resolved ignored, nothing in flight");
            return;
        }
        self.submitting = false;
        match result {
            Ok(()) => {
                self.phase = Phase::PasswordUpdated;
                self.form = PasswordForm::default();
                self.status = Some(FlowStatus::password_updated());
            }
            Err(message) => {
                self.status = Some(FlowStatus::update_failed(message));
            }
        }
    }
}
