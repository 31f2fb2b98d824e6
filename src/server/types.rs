use serde::{Deserialize, Serialize};

use crate::flow::RecoveryFlow;
use crate::form::FormError;
use crate::provider::IdentityProvider;
use crate::state::{FormView, Phase};
use crate::status::FlowStatus;

/// Body of `POST {base}/reset-password/session`.
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyLinkRequest {
    /// Full page URL, fragment included.
    pub url: String,
}

/// Body of `POST {base}/reset-password`.
#[derive(Clone, Deserialize)]
pub struct UpdatePasswordRequest {
    pub password: String,
    pub confirmation: String,
}

/// Snapshot of the flow returned by both flow endpoints.
#[derive(Debug, Clone, Serialize)]
#[non_exhaustive]
pub struct FlowResponse {
    pub phase: Phase,
    pub view: FormView,
    pub status: Option<FlowStatus>,
    /// URL to put in the address bar in place of the recovery link.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clean_url: Option<String>,
    /// Why the submitted password was not sent, when it was not.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form_error: Option<String>,
}

impl FlowResponse {
    pub(super) fn new<P: IdentityProvider>(
        flow: &RecoveryFlow<P>,
        clean_url: Option<String>,
    ) -> Self {
        Self {
            phase: flow.phase(),
            view: flow.view(),
            status: flow.status().cloned(),
            clean_url,
            form_error: None,
        }
    }

    /// The submitted form failed local validation; the recovery session
    /// from the link check is kept and nothing was sent.
    pub(super) fn form_rejected(error: FormError) -> Self {
        Self {
            phase: Phase::SessionValid,
            view: FormView::Editable { can_submit: false },
            status: Some(FlowStatus::choose_password()),
            clean_url: None,
            form_error: Some(error.to_string()),
        }
    }

    /// Another request is already updating this recovery session's password.
    pub(super) fn update_in_progress() -> Self {
        Self {
            phase: Phase::SessionValid,
            view: FormView::Editable { can_submit: false },
            status: Some(FlowStatus::update_in_progress()),
            clean_url: None,
            form_error: None,
        }
    }
}
