//! # Captcha Field
//!
//! The Custom Captcha field handler: everything a host form-building
//! framework needs to offer the field type.
//!
//! ## Architecture
//! ```text
//! Builder UI → QuestionEditor → FieldConfiguration (persisted by host)
//!                                      ↓
//!              ChallengeGenerator → FieldRenderer → submitted values
//!                                      ↓
//!                              AnswerValidator → ProcessErrors
//! ```
//!
//! The host drives the [`field::FormField`] contract; the services here hold
//! no ambient state and are constructed explicitly.

pub mod challenge;
pub mod config;
pub mod editor;
pub mod field;
pub mod messages;
pub mod render;
pub mod validator;

pub use challenge::ChallengeGenerator;
pub use config::CaptchaConfig;
pub use editor::QuestionEditor;
pub use field::{CaptchaField, FieldOptions, FieldRegistration, FormConfiguration, FormField, OptionRow};
pub use messages::Messages;
pub use render::{FieldRenderer, RenderContext, RenderedField};
pub use validator::{AnswerValidator, ProcessErrors};
