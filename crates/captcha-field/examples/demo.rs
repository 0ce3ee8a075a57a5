//! Walks the full field lifecycle once: builder editing session, public
//! render, and submission validation.
//!
//! Run with: `cargo run --example demo`

use anyhow::{Context, Result};
use captcha_common::{Challenge, ChallengeFormat, FieldConfiguration, SubmittedValues};
use captcha_field::render::RenderContext;
use captcha_field::{CaptchaConfig, CaptchaField, FormField, ProcessErrors};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> Result<()> {
    init_logging();

    let config = CaptchaConfig::load("config/captcha.toml")?;
    let handler = CaptchaField::new(config);

    // Builder session: extend the seeded list with a second question.
    let mut editor = handler.editor(captcha_common::QuestionList::seeded());
    let key = editor.add_after(1);
    editor.edit_question(key, "What color is the sky?");
    editor.edit_answer(key, "blue");
    let outcome = editor.pre_save();
    info!(?outcome, "Builder session finished");

    let field = FieldConfiguration {
        format: ChallengeFormat::Qa,
        questions: editor.into_list(),
        ..FieldConfiguration::default()
    };

    // Public render: one challenge per render.
    let rendered = handler
        .field_display(1, 1, &field, RenderContext::Frontend)
        .context("qa field had no usable question")?;
    info!(html = %rendered.html, "Rendered field");

    let Challenge::Qa { key } = rendered.challenge else {
        anyhow::bail!("expected a qa challenge");
    };
    let stored_answer = field
        .questions
        .get(key)
        .context("challenge key vanished from the configuration")?
        .answer
        .clone();

    // Submission: echo the challenge key back with the right answer.
    let submitted = SubmittedValues {
        answer: Some(stored_answer.to_uppercase()),
        question_key: Some(key.to_string()),
        ..SubmittedValues::default()
    };

    let mut errors = ProcessErrors::new();
    handler.validate(1, 1, &submitted, &field, &mut errors);
    info!(passed = errors.is_empty(), "Validation finished");

    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .init();
}
