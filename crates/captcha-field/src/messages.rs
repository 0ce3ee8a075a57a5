//! User-facing strings for the Custom Captcha field.
//!
//! English defaults; hosts supply translations through the configuration
//! layer or by constructing [`Messages`] directly.

use serde::Deserialize;

/// Localizable string table
#[derive(Debug, Clone, Deserialize)]
pub struct Messages {
    /// Shown when a required sub-value is absent at submission time
    #[serde(default = "default_required")]
    pub required: String,

    /// Shown when the submitted answer fails comparison
    #[serde(default = "default_incorrect_answer")]
    pub incorrect_answer: String,

    /// Shown by the builder when an edit would leave zero usable questions
    #[serde(default = "default_not_empty_question")]
    pub not_empty_question: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            required: default_required(),
            incorrect_answer: default_incorrect_answer(),
            not_empty_question: default_not_empty_question(),
        }
    }
}

impl Messages {
    /// Message for one validation failure, as surfaced to the end user
    pub fn for_error(&self, error: captcha_common::ValidationError) -> &str {
        use captcha_common::ValidationError;

        match error {
            ValidationError::RequiredFieldMissing => &self.required,
            ValidationError::IncorrectAnswer => &self.incorrect_answer,
        }
    }
}

fn default_required() -> String {
    "This field is required.".to_string()
}

fn default_incorrect_answer() -> String {
    "Incorrect answer.".to_string()
}

fn default_not_empty_question() -> String {
    "Custom Captcha field should contain at least one not empty question.".to_string()
}
