//! The field handler the host form-building framework drives.
//!
//! [`CaptchaField`] bundles the generator, renderer, and validator behind
//! the [`FormField`] contract, plus the form-level hooks the host invokes
//! around persistence and entry processing. It is constructed explicitly
//! from a [`CaptchaConfig`]; there is no process-wide instance.

use std::collections::BTreeMap;

use captcha_common::constants;
use captcha_common::{ChallengeFormat, FieldConfiguration, QaPair, QuestionList, SubmittedValues};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::challenge::ChallengeGenerator;
use crate::config::CaptchaConfig;
use crate::editor::QuestionEditor;
use crate::messages::Messages;
use crate::render::{FieldRenderer, RenderContext, RenderedField};
use crate::validator::{AnswerValidator, ProcessErrors};

/// Metadata the host uses to list the field type in its builder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRegistration {
    /// Field type slug
    pub field_type: String,
    /// Display name in the field picker
    pub name: String,
    /// Search keywords
    pub keywords: String,
    /// Icon slug
    pub icon: String,
    /// Sort order within the group
    pub order: u32,
    /// Field picker group
    pub group: String,
}

impl Default for FieldRegistration {
    fn default() -> Self {
        Self {
            field_type: constants::FIELD_TYPE.to_string(),
            name: constants::FIELD_NAME.to_string(),
            keywords: constants::FIELD_KEYWORDS.to_string(),
            icon: constants::FIELD_ICON.to_string(),
            order: constants::FIELD_ORDER,
            group: constants::FIELD_GROUP.to_string(),
        }
    }
}

/// Declarative schema for the builder's field options panel.
///
/// The builder renders it; the rows mirror the panel's basic and advanced
/// groups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldOptions {
    pub basic: Vec<OptionRow>,
    pub advanced: Vec<OptionRow>,
}

/// One row of the options panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionRow {
    /// The field is always required; the builder persists this silently
    HiddenRequired,
    Label {
        value: String,
    },
    /// Challenge type selector (math / question-and-answer)
    Format {
        selected: ChallengeFormat,
    },
    /// Editable question list; hidden while math format is selected
    Questions {
        next_id: u32,
        entries: Vec<(u32, QaPair)>,
        hidden: bool,
    },
    Description {
        value: String,
    },
    /// Input size; hidden while math format is selected
    Size {
        hidden: bool,
    },
    CssClasses {
        value: String,
    },
    Placeholder {
        value: String,
    },
    HideLabel {
        value: bool,
    },
}

/// The captcha-relevant slice of one form's configuration: the captcha
/// fields keyed by field id. Other field types stay with the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormConfiguration {
    pub id: u64,
    #[serde(default)]
    pub fields: BTreeMap<u64, FieldConfiguration>,
}

/// Contract a field type exposes to the host framework
pub trait FormField {
    /// Registration metadata for the builder's field picker
    fn registration(&self) -> FieldRegistration;

    /// Whether new fields of this type start out required
    fn default_required(&self) -> bool {
        false
    }

    /// Whether the host may populate the field from URL/query data
    fn is_dynamic_population_allowed(&self) -> bool {
        true
    }

    /// Whether the host may populate the field from fallback data
    fn is_fallback_population_allowed(&self) -> bool {
        true
    }

    /// Configuration schema for the builder's options panel
    fn field_options(&self, field: &FieldConfiguration) -> FieldOptions;

    /// Markup for the builder's field preview
    fn field_preview(&self, field: &FieldConfiguration) -> String;

    /// Markup and challenge for the public form; `None` suppresses the
    /// field for this render
    fn field_display(
        &self,
        form_id: u64,
        field_id: u64,
        field: &FieldConfiguration,
        context: RenderContext,
    ) -> Option<RenderedField>;

    /// Validate one submitted value, recording failures per (form, field)
    fn validate(
        &self,
        form_id: u64,
        field_id: u64,
        submitted: &SubmittedValues,
        field: &FieldConfiguration,
        errors: &mut ProcessErrors,
    );
}

/// The Custom Captcha field handler
#[derive(Debug, Clone)]
pub struct CaptchaField {
    registration: FieldRegistration,
    generator: ChallengeGenerator,
    renderer: FieldRenderer,
    validator: AnswerValidator,
    messages: Messages,
}

impl CaptchaField {
    pub fn new(config: CaptchaConfig) -> Self {
        let generator = ChallengeGenerator::new(config.math.to_range());
        Self {
            registration: FieldRegistration::default(),
            renderer: FieldRenderer::new(generator.clone()),
            validator: AnswerValidator::new(config.messages.clone()),
            messages: config.messages,
            generator,
        }
    }

    pub fn messages(&self) -> &Messages {
        &self.messages
    }

    pub fn generator(&self) -> &ChallengeGenerator {
        &self.generator
    }

    /// Start a builder editing session over a field's question list
    pub fn editor(&self, questions: QuestionList) -> QuestionEditor {
        QuestionEditor::new(questions, self.messages.clone())
    }

    /// Pre-persist hook: drop incomplete pairs from every qa-format captcha
    /// field before the form configuration is written
    pub fn prepare_form_for_save(&self, form: &mut FormConfiguration) {
        for (field_id, field) in &mut form.fields {
            if field.format != ChallengeFormat::Qa {
                continue;
            }

            let dropped = field.questions.retain_complete();
            if dropped > 0 {
                debug!(
                    form_id = form.id,
                    field_id, dropped, "Dropped incomplete questions before save"
                );
            }
        }
    }

    /// Entry hook: strip captcha values from the processed submission.
    ///
    /// The field exists for validation only and must not reach storage.
    pub fn scrub_entry(&self, form: &FormConfiguration, entry: &mut BTreeMap<u64, String>) {
        entry.retain(|field_id, _| !form.fields.contains_key(field_id));
    }
}

impl FormField for CaptchaField {
    fn registration(&self) -> FieldRegistration {
        self.registration.clone()
    }

    fn default_required(&self) -> bool {
        true
    }

    fn is_dynamic_population_allowed(&self) -> bool {
        false
    }

    fn is_fallback_population_allowed(&self) -> bool {
        false
    }

    fn field_options(&self, field: &FieldConfiguration) -> FieldOptions {
        let questions = if field.questions.is_empty() {
            QuestionList::seeded()
        } else {
            field.questions.clone()
        };
        let math_selected = field.format == ChallengeFormat::Math;

        FieldOptions {
            basic: vec![
                OptionRow::HiddenRequired,
                OptionRow::Label {
                    value: field.label.clone().unwrap_or_default(),
                },
                OptionRow::Format {
                    selected: field.format,
                },
                OptionRow::Questions {
                    next_id: questions.next_id(),
                    entries: questions.iter().map(|(k, pair)| (k, pair.clone())).collect(),
                    hidden: math_selected,
                },
                OptionRow::Description {
                    value: field.description.clone().unwrap_or_default(),
                },
            ],
            advanced: vec![
                OptionRow::Size {
                    hidden: math_selected,
                },
                OptionRow::CssClasses {
                    value: field.css_classes.clone().unwrap_or_default(),
                },
                OptionRow::Placeholder {
                    value: field.placeholder.clone().unwrap_or_default(),
                },
                OptionRow::HideLabel {
                    value: field.label_hide,
                },
            ],
        }
    }

    fn field_preview(&self, field: &FieldConfiguration) -> String {
        self.renderer.field_preview(field)
    }

    fn field_display(
        &self,
        form_id: u64,
        field_id: u64,
        field: &FieldConfiguration,
        context: RenderContext,
    ) -> Option<RenderedField> {
        self.renderer.field_display(form_id, field_id, field, context)
    }

    fn validate(
        &self,
        form_id: u64,
        field_id: u64,
        submitted: &SubmittedValues,
        field: &FieldConfiguration,
        errors: &mut ProcessErrors,
    ) {
        self.validator
            .validate(form_id, field_id, submitted, field, errors);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handler() -> CaptchaField {
        CaptchaField::new(CaptchaConfig::default())
    }

    #[test]
    fn registration_metadata_matches_the_field_picker_entry() {
        let registration = handler().registration();
        assert_eq!(registration.field_type, "captcha");
        assert_eq!(registration.name, "Custom Captcha");
        assert_eq!(registration.icon, "fa-question-circle");
        assert_eq!(registration.order, 300);
        assert_eq!(registration.group, "fancy");
    }

    #[test]
    fn captcha_fields_are_required_and_never_populated() {
        let handler = handler();
        assert!(handler.default_required());
        assert!(!handler.is_dynamic_population_allowed());
        assert!(!handler.is_fallback_population_allowed());
    }

    #[test]
    fn options_panel_defaults_to_the_seed_question() {
        let handler = handler();
        let options = handler.field_options(&FieldConfiguration::default());

        let questions = options.basic.iter().find_map(|row| match row {
            OptionRow::Questions {
                entries,
                hidden,
                next_id,
            } => Some((entries.clone(), *hidden, *next_id)),
            _ => None,
        });

        let (entries, hidden, next_id) = questions.expect("questions row missing");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].1.question, "What is 7+4?");
        assert_eq!(next_id, 2);
        // Math is the default format, so the list starts hidden.
        assert!(hidden);
    }

    #[test]
    fn qa_format_reveals_the_question_and_size_rows() {
        let handler = handler();
        let field = FieldConfiguration::seeded(ChallengeFormat::Qa);
        let options = handler.field_options(&field);

        assert!(options.basic.iter().any(|row| matches!(
            row,
            OptionRow::Questions { hidden: false, .. }
        )));
        assert!(options
            .advanced
            .iter()
            .any(|row| matches!(row, OptionRow::Size { hidden: false })));
    }

    #[test]
    fn prepare_form_for_save_filters_qa_fields_only() {
        let handler = handler();

        let mut qa_field = FieldConfiguration::seeded(ChallengeFormat::Qa);
        qa_field.questions.push(QaPair::new("incomplete", ""));

        let mut math_field = FieldConfiguration::default();
        math_field.questions.push(QaPair::new("incomplete", ""));

        let mut form = FormConfiguration {
            id: 9,
            fields: BTreeMap::from([(1, qa_field), (2, math_field)]),
        };

        handler.prepare_form_for_save(&mut form);

        assert_eq!(form.fields[&1].questions.len(), 1);
        // Math fields keep their (unused) list untouched.
        assert_eq!(form.fields[&2].questions.len(), 2);
    }

    #[test]
    fn scrub_entry_removes_captcha_values_only() {
        let handler = handler();
        let form = FormConfiguration {
            id: 9,
            fields: BTreeMap::from([(3, FieldConfiguration::default())]),
        };

        let mut entry = BTreeMap::from([
            (2, "a name".to_string()),
            (3, "8".to_string()),
            (4, "a comment".to_string()),
        ]);

        handler.scrub_entry(&form, &mut entry);

        assert_eq!(entry.len(), 2);
        assert!(!entry.contains_key(&3));
    }

    #[test]
    fn form_configuration_persists_in_the_host_json_shape() {
        let form = FormConfiguration {
            id: 9,
            fields: BTreeMap::from([(3, FieldConfiguration::seeded(ChallengeFormat::Qa))]),
        };

        let json = serde_json::to_value(&form).unwrap();
        assert_eq!(json["id"], 9);
        assert_eq!(json["fields"]["3"]["format"], "qa");
        assert_eq!(json["fields"]["3"]["questions"]["1"]["answer"], "11");

        let back: FormConfiguration = serde_json::from_value(json).unwrap();
        assert_eq!(back, form);
    }

    #[test]
    fn validate_goes_through_the_shared_error_map() {
        let handler = handler();
        let field = FieldConfiguration::default();
        let mut errors = ProcessErrors::new();

        handler.validate(9, 3, &SubmittedValues::default(), &field, &mut errors);

        assert_eq!(errors.get(9, 3), Some("This field is required."));
    }
}
