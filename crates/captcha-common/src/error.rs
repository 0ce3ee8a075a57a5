//! Validation error taxonomy for the Custom Captcha field.

use thiserror::Error;

/// Why a submitted captcha value was rejected.
///
/// Both variants surface to the end user as the same localized per-field
/// message; the distinction exists for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required sub-value was absent at submission time
    #[error("This field is required.")]
    RequiredFieldMissing,

    /// All sub-values were present but the answer failed comparison
    #[error("Incorrect answer.")]
    IncorrectAnswer,
}

impl ValidationError {
    /// Returns true when the failure is about missing input rather than a
    /// wrong answer
    pub fn is_missing_input(&self) -> bool {
        matches!(self, Self::RequiredFieldMissing)
    }
}
