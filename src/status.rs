use std::fmt;

use serde::Serialize;

/// Visual treatment of a status banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusKind {
    Info,
    Success,
    Error,
}

impl StatusKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

/// User-facing outcome of the recovery flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlowStatus {
    pub kind: StatusKind,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl FlowStatus {
    #[must_use]
    pub fn info(title: impl Into<String>, detail: Option<String>) -> Self {
        Self::with_kind(StatusKind::Info, title, detail)
    }

    #[must_use]
    pub fn success(title: impl Into<String>, detail: Option<String>) -> Self {
        Self::with_kind(StatusKind::Success, title, detail)
    }

    #[must_use]
    pub fn error(title: impl Into<String>, detail: Option<String>) -> Self {
        Self::with_kind(StatusKind::Error, title, detail)
    }

    fn with_kind(kind: StatusKind, title: impl Into<String>, detail: Option<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            detail,
        }
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.kind == StatusKind::Error
    }

    // ── Fixed copy ─────────────────────────────────────────────────

    pub(crate) fn checking_link() -> Self {
        Self::info(
            messages::CHECKING_TITLE,
            Some(messages::CHECKING_DETAIL.into()),
        )
    }

    pub(crate) fn choose_password() -> Self {
        Self::info(
            messages::CHOOSE_PASSWORD_TITLE,
            Some(messages::CHOOSE_PASSWORD_DETAIL.into()),
        )
    }

    pub(crate) fn link_invalid() -> Self {
        Self::error(
            messages::LINK_INVALID_TITLE,
            Some(messages::LINK_INVALID_DETAIL.into()),
        )
    }

    pub(crate) fn config_missing() -> Self {
        Self::error(
            messages::CONFIG_MISSING_TITLE,
            Some(messages::CONFIG_MISSING_DETAIL.into()),
        )
    }

    pub(crate) fn password_updated() -> Self {
        Self::success(
            messages::UPDATED_TITLE,
            Some(messages::UPDATED_DETAIL.into()),
        )
    }

    pub(crate) fn update_in_progress() -> Self {
        Self::info(
            messages::UPDATING_TITLE,
            Some(messages::UPDATING_DETAIL.into()),
        )
    }

    pub(crate) fn update_failed(detail: String) -> Self {
        let detail = if detail.trim().is_empty() {
            messages::UPDATE_FAILED_FALLBACK.to_string()
        } else {
            detail
        };
        Self::error(messages::UPDATE_FAILED_TITLE, Some(detail))
    }
}

impl fmt::Display for FlowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind.as_str(), self.title)?;
        if let Some(detail) = &self.detail {
            write!(f, ": {detail}")?;
        }
        Ok(())
    }
}

/// Copy shown by the reset page.
pub mod messages {
    pub const CHECKING_TITLE: &str = "Vérification du lien…";
    pub const CHECKING_DETAIL: &str = "On prépare la page de réinitialisation.";

    pub const CHOOSE_PASSWORD_TITLE: &str = "Choisis ton nouveau mot de passe";
    pub const CHOOSE_PASSWORD_DETAIL: &str = "Entre un mot de passe solide, puis confirme-le.";

    pub const LINK_INVALID_TITLE: &str = "Lien invalide ou expiré";
    pub const LINK_INVALID_DETAIL: &str =
        "Demande un nouvel email de réinitialisation depuis l’app Tempo, puis réessaie.";

    pub const CONFIG_MISSING_TITLE: &str = "Configuration manquante";
    pub const CONFIG_MISSING_DETAIL: &str =
        "Ajoute SUPABASE_URL et SUPABASE_ANON_KEY à l’environnement, puis redéploie.";

    pub const UPDATING_TITLE: &str = "Mise à jour en cours…";
    pub const UPDATING_DETAIL: &str = "Ton nouveau mot de passe est en train d’être enregistré.";

    pub const UPDATED_TITLE: &str = "Mot de passe mis à jour ✅";
    pub const UPDATED_DETAIL: &str =
        "Tu peux retourner dans l’app Tempo et te connecter avec ton nouveau mot de passe.";

    pub const UPDATE_FAILED_TITLE: &str = "Échec de la réinitialisation";
    pub const UPDATE_FAILED_FALLBACK: &str = "Impossible de mettre à jour le mot de passe.";
}
