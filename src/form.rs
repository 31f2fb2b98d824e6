use std::fmt;

/// Minimum accepted password length, in characters.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Why the new-password form cannot be submitted yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("Le mot de passe doit contenir au moins {min} caractères ({actual} saisis).")]
    TooShort { min: usize, actual: usize },
    #[error("Les deux mots de passe ne correspondent pas.")]
    Mismatch,
}

/// Advisory strength hints shown next to the form.
///
/// These are suggestions only; [`PasswordForm::validate`] never checks them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordHint {
    Lowercase,
    Uppercase,
    Digit,
    SpecialCharacter,
}

impl PasswordHint {
    pub const ALL: [Self; 4] = [
        Self::Lowercase,
        Self::Uppercase,
        Self::Digit,
        Self::SpecialCharacter,
    ];

    fn is_met_by(self, password: &str) -> bool {
        match self {
            Self::Lowercase => password.chars().any(char::is_lowercase),
            Self::Uppercase => password.chars().any(char::is_uppercase),
            Self::Digit => password.chars().any(|c| c.is_ascii_digit()),
            Self::SpecialCharacter => password
                .chars()
                .any(|c| !c.is_alphanumeric() && !c.is_whitespace()),
        }
    }
}

/// New password and its confirmation, as typed.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct PasswordForm {
    password: String,
    confirmation: String,
}

impl PasswordForm {
    #[must_use]
    pub fn new(password: impl Into<String>, confirmation: impl Into<String>) -> Self {
        Self {
            password: password.into(),
            confirmation: confirmation.into(),
        }
    }

    pub fn set_password(&mut self, password: impl Into<String>) {
        self.password = password.into();
    }

    pub fn set_confirmation(&mut self, confirmation: impl Into<String>) {
        self.confirmation = confirmation.into();
    }

    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }

    /// Checks the only enforced rules: minimum length, then equality.
    ///
    /// # Errors
    ///
    /// Returns the first rule the current input breaks.
    pub fn validate(&self) -> Result<(), FormError> {
        let actual = self.password.chars().count();
        if actual < MIN_PASSWORD_LENGTH {
            return Err(FormError::TooShort {
                min: MIN_PASSWORD_LENGTH,
                actual,
            });
        }
        if self.password != self.confirmation {
            return Err(FormError::Mismatch);
        }
        Ok(())
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Strength hints the current password does not satisfy yet.
    #[must_use]
    pub fn unmet_hints(&self) -> Vec<PasswordHint> {
        PasswordHint::ALL
            .into_iter()
            .filter(|hint| !hint.is_met_by(&self.password))
            .collect()
    }
}

impl fmt::Debug for PasswordForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordForm")
            .field("password_len", &self.password.chars().count())
            .field("matches", &(self.password == self.confirmation))
            .finish()
    }
}
