//! Field markup rendering.
//!
//! Markup is assembled as plain strings, one fragment per concern. The
//! challenge travels to the server through hidden inputs under the field's
//! namespace; the stored qa answer is never part of the page.

use captcha_common::constants::wire_keys;
use captcha_common::{Challenge, ChallengeFormat, FieldConfiguration, MathOperator};
use rand::Rng;
use tracing::debug;

use crate::challenge::ChallengeGenerator;

/// Where the markup will be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderContext {
    /// Public form with client-side scripting: equation spans are left
    /// blank for the frontend script to fill from the hidden inputs
    Frontend,
    /// Server-rendered preview (page builders, REST previews): equation
    /// spans are prefilled so the field looks right without any script
    ServerPreview,
}

/// One rendered field: the generated challenge plus its markup
#[derive(Debug, Clone)]
pub struct RenderedField {
    pub challenge: Challenge,
    pub html: String,
}

/// Field renderer service
#[derive(Debug, Clone)]
pub struct FieldRenderer {
    generator: ChallengeGenerator,
}

impl FieldRenderer {
    pub fn new(generator: ChallengeGenerator) -> Self {
        Self { generator }
    }

    /// Render the field for the public form.
    ///
    /// Returns `None` when a qa field has no complete question/answer pair
    /// left; such a field contributes no challenge and is excluded from
    /// validation.
    pub fn field_display(
        &self,
        form_id: u64,
        field_id: u64,
        field: &FieldConfiguration,
        context: RenderContext,
    ) -> Option<RenderedField> {
        let desc_id = format!("captcha-{form_id}-field-{field_id}-question");

        match field.format {
            ChallengeFormat::Math => {
                let challenge = self.generator.math_challenge();
                let html = match challenge {
                    Challenge::Math {
                        operand1,
                        operator,
                        operand2,
                    } => self.math_markup(
                        field_id, &desc_id, field, operand1, operator, operand2, context,
                    ),
                    Challenge::Qa { .. } => return None,
                };
                Some(RenderedField { challenge, html })
            }
            ChallengeFormat::Qa => {
                let key = self.generator.pick_question(&field.questions)?;
                let question = field.questions.get(key)?;
                let challenge = Challenge::Qa { key };
                Some(RenderedField {
                    html: self.qa_markup(field_id, &desc_id, field, key, &question.question),
                    challenge,
                })
            }
        }
    }

    /// Render the builder's field preview: a sample equation, the first
    /// question, and a readonly input
    pub fn field_preview(&self, field: &FieldConfiguration) -> String {
        let mut rng = rand::rng();
        let math = &self.generator.math;

        let num1 = rng.random_range(math.min..=math.max);
        let num2 = rng.random_range(math.min..=math.max);
        let operator = if math.operators.is_empty() {
            MathOperator::Add
        } else {
            math.operators[rng.random_range(0..math.operators.len())]
        };

        let first_question = field
            .questions
            .first()
            .map(|(_, pair)| pair.question.as_str())
            .unwrap_or(captcha_common::constants::DEFAULT_SEED_QUESTION);

        let format_class = match field.format {
            ChallengeFormat::Math => "math",
            ChallengeFormat::Qa => "qa",
        };
        let placeholder = field.placeholder.as_deref().unwrap_or_default();

        let mut html = String::new();
        if let Some(label) = &field.label {
            html.push_str(&format!(
                r#"<label class="label-title">{}</label>"#,
                escape_html(label)
            ));
        }
        html.push_str(&format!(
            r#"<div class="format-selected-{format_class} format-selected">"#
        ));
        html.push_str(&format!(
            r#"<span class="captcha-equation">{num1} {} {num2} = </span>"#,
            operator.symbol()
        ));
        html.push_str(&format!(
            r#"<p class="captcha-question">{}</p>"#,
            escape_html(first_question)
        ));
        html.push_str(&format!(
            r#"<input type="text" placeholder="{}" class="primary-input" readonly>"#,
            escape_html(placeholder)
        ));
        html.push_str("</div>");
        if let Some(description) = &field.description {
            html.push_str(&format!(
                r#"<div class="description">{}</div>"#,
                escape_html(description)
            ));
        }

        html
    }

    #[allow(clippy::too_many_arguments)]
    fn math_markup(
        &self,
        field_id: u64,
        desc_id: &str,
        field: &FieldConfiguration,
        operand1: i64,
        operator: MathOperator,
        operand2: i64,
        context: RenderContext,
    ) -> String {
        // Prefilled spans keep the field legible without the frontend
        // script; the script overwrites them from the hidden inputs.
        let (n1, cal, n2) = match context {
            RenderContext::Frontend => (String::new(), String::new(), String::new()),
            RenderContext::ServerPreview => (
                operand1.to_string(),
                operator.symbol().to_string(),
                operand2.to_string(),
            ),
        };

        debug!(field_id, ?context, "Rendering math captcha");

        let mut html = String::from(r#"<div class="captcha-math">"#);
        html.push_str(&format!(
            r#"<span id="{desc_id}" class="captcha-equation"><span class="n1">{n1}</span> <span class="cal">{cal}</span> <span class="n2">{n2}</span> <span class="e">=</span></span>"#
        ));
        html.push_str(&self.answer_input(field_id, desc_id, field));
        for (key, value) in [
            (wire_keys::OPERATOR, operator.symbol().to_string()),
            (wire_keys::OPERAND2, operand2.to_string()),
            (wire_keys::OPERAND1, operand1.to_string()),
        ] {
            html.push_str(&format!(
                r#"<input type="hidden" name="fields[{field_id}][{key}]" class="{key}" value="{value}">"#
            ));
        }
        html.push_str("</div>");
        html
    }

    fn qa_markup(
        &self,
        field_id: u64,
        desc_id: &str,
        field: &FieldConfiguration,
        key: u32,
        question: &str,
    ) -> String {
        debug!(field_id, key, "Rendering qa captcha");

        let mut html = format!(
            r#"<p id="{desc_id}" class="captcha-question">{}</p>"#,
            escape_html(question)
        );
        html.push_str(&self.answer_input(field_id, desc_id, field));
        html.push_str(&format!(
            r#"<input type="hidden" name="fields[{field_id}][{}]" value="{key}">"#,
            wire_keys::QUESTION_KEY
        ));
        html
    }

    fn answer_input(&self, field_id: u64, desc_id: &str, field: &FieldConfiguration) -> String {
        let placeholder = field.placeholder.as_deref().unwrap_or_default();
        format!(
            r#"<input type="text" name="fields[{field_id}][{}]" class="a" placeholder="{}" aria-describedby="{desc_id}" required>"#,
            wire_keys::ANSWER,
            escape_html(placeholder)
        )
    }
}

/// Minimal HTML escaping for text and attribute values
fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
