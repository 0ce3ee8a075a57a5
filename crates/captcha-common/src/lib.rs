//! # Captcha Common
//!
//! Shared types, errors, and constants for the Custom Captcha field.
//!
//! ## Modules
//! - `types` - Core data structures (FieldConfiguration, QuestionList, etc.)
//! - `error` - Validation error taxonomy
//! - `constants` - Defaults and wire key names

pub mod constants;
pub mod error;
pub mod types;

pub use error::ValidationError;
pub use types::*;
