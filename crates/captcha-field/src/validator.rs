//! Server-side answer validation.
//!
//! One stateless pass per submission. A failure records a single localized
//! message keyed by (form id, field id); the absence of an entry is the
//! success signal. Nothing here is fatal to the host process.

use std::collections::HashMap;

use captcha_common::{
    ChallengeFormat, FieldConfiguration, MathOperator, SubmittedValues, ValidationError,
};
use tracing::debug;

use crate::messages::Messages;

/// Per-field validation errors collected during one submission pass,
/// keyed by (form id, field id)
#[derive(Debug, Clone, Default)]
pub struct ProcessErrors {
    errors: HashMap<(u64, u64), String>,
}

impl ProcessErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, form_id: u64, field_id: u64, message: impl Into<String>) {
        self.errors.insert((form_id, field_id), message.into());
    }

    pub fn get(&self, form_id: u64, field_id: u64) -> Option<&str> {
        self.errors.get(&(form_id, field_id)).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = ((u64, u64), &str)> {
        self.errors.iter().map(|(key, msg)| (*key, msg.as_str()))
    }
}

/// Answer validator service
#[derive(Debug, Clone, Default)]
pub struct AnswerValidator {
    messages: Messages,
}

impl AnswerValidator {
    pub fn new(messages: Messages) -> Self {
        Self { messages }
    }

    /// Validate one submitted field value, recording at most one error
    pub fn validate(
        &self,
        form_id: u64,
        field_id: u64,
        submitted: &SubmittedValues,
        field: &FieldConfiguration,
        errors: &mut ProcessErrors,
    ) {
        if let Err(error) = self.check(submitted, field) {
            debug!(form_id, field_id, %error, "Captcha validation failed");
            errors.record(form_id, field_id, self.messages.for_error(error));
        }
    }

    /// Decide pass/fail without touching the error map
    pub fn check(
        &self,
        submitted: &SubmittedValues,
        field: &FieldConfiguration,
    ) -> Result<(), ValidationError> {
        match field.format {
            ChallengeFormat::Math => self.check_math(submitted),
            ChallengeFormat::Qa => self.check_qa(submitted, field),
        }
    }

    /// Math branch: recompute the expected result from the echoed operands
    /// and operator, then compare against the submitted integer.
    fn check_math(&self, submitted: &SubmittedValues) -> Result<(), ValidationError> {
        if !SubmittedValues::is_present(&submitted.answer)
            || !SubmittedValues::is_present(&submitted.operand1)
            || !SubmittedValues::is_present(&submitted.operator)
            || !SubmittedValues::is_present(&submitted.operand2)
        {
            return Err(ValidationError::RequiredFieldMissing);
        }

        // Presence was checked above; parse the echoed challenge.
        let operand1 = parse_int(submitted.operand1.as_deref().unwrap_or_default());
        let operand2 = parse_int(submitted.operand2.as_deref().unwrap_or_default());
        let operator = submitted
            .operator
            .as_deref()
            .and_then(MathOperator::from_symbol);

        // Overflowing echoes are forged challenges, not valid submissions.
        let expected = match (operand1, operand2, operator) {
            (Some(a), Some(b), Some(op)) => {
                op.apply(a, b).ok_or(ValidationError::IncorrectAnswer)?
            }
            _ => return Err(ValidationError::IncorrectAnswer),
        };

        let answer = submitted
            .answer
            .as_deref()
            .and_then(parse_int)
            .ok_or(ValidationError::IncorrectAnswer)?;

        if answer != expected {
            return Err(ValidationError::IncorrectAnswer);
        }

        Ok(())
    }

    /// Qa branch: resolve the echoed question key and compare the trimmed,
    /// case-folded answer against the stored one.
    fn check_qa(
        &self,
        submitted: &SubmittedValues,
        field: &FieldConfiguration,
    ) -> Result<(), ValidationError> {
        if !SubmittedValues::is_present(&submitted.question_key)
            || !SubmittedValues::is_present(&submitted.answer)
        {
            return Err(ValidationError::RequiredFieldMissing);
        }

        let pair = submitted
            .question_key
            .as_deref()
            .and_then(|key| key.trim().parse::<u32>().ok())
            .and_then(|key| field.questions.get(key))
            .ok_or(ValidationError::IncorrectAnswer)?;

        let answer = submitted.answer.as_deref().unwrap_or_default();
        if !pair.answer_matches(answer) {
            return Err(ValidationError::IncorrectAnswer);
        }

        Ok(())
    }
}

fn parse_int(value: &str) -> Option<i64> {
    value.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use captcha_common::{QaPair, QuestionList};

    fn math_field() -> FieldConfiguration {
        FieldConfiguration::default()
    }

    fn qa_field(pairs: &[(&str, &str)]) -> FieldConfiguration {
        let mut questions = QuestionList::new();
        for (question, answer) in pairs {
            questions.push(QaPair::new(*question, *answer));
        }
        FieldConfiguration {
            format: ChallengeFormat::Qa,
            questions,
            ..FieldConfiguration::default()
        }
    }

    fn math_submission(n1: &str, op: &str, n2: &str, answer: &str) -> SubmittedValues {
        SubmittedValues {
            answer: Some(answer.to_string()),
            operand1: Some(n1.to_string()),
            operand2: Some(n2.to_string()),
            operator: Some(op.to_string()),
            question_key: None,
        }
    }

    fn qa_submission(key: &str, answer: &str) -> SubmittedValues {
        SubmittedValues {
            answer: Some(answer.to_string()),
            question_key: Some(key.to_string()),
            ..SubmittedValues::default()
        }
    }

    #[test]
    fn math_accepts_the_exact_result_and_nothing_else() {
        let validator = AnswerValidator::default();
        let field = math_field();

        for (op, expected) in [("+", 8), ("-", -2), ("*", 15)] {
            let good = math_submission("3", op, "5", &expected.to_string());
            assert_eq!(validator.check(&good, &field), Ok(()));

            for wrong in [expected - 1, expected + 1, 0, 999] {
                if wrong == expected {
                    continue;
                }
                let bad = math_submission("3", op, "5", &wrong.to_string());
                assert_eq!(
                    validator.check(&bad, &field),
                    Err(ValidationError::IncorrectAnswer)
                );
            }
        }
    }

    #[test]
    fn math_scenario_three_plus_five() {
        let validator = AnswerValidator::default();
        let field = math_field();

        assert_eq!(
            validator.check(&math_submission("3", "+", "5", "8"), &field),
            Ok(())
        );
        assert_eq!(
            validator.check(&math_submission("3", "+", "5", "7"), &field),
            Err(ValidationError::IncorrectAnswer)
        );
    }

    #[test]
    fn math_answer_zero_is_present_not_missing() {
        let validator = AnswerValidator::default();
        let field = math_field();

        assert_eq!(
            validator.check(&math_submission("1", "-", "1", "0"), &field),
            Ok(())
        );
    }

    #[test]
    fn math_missing_pieces_are_required_errors() {
        let validator = AnswerValidator::default();
        let field = math_field();

        let mut missing_answer = math_submission("3", "+", "5", "8");
        missing_answer.answer = None;
        assert_eq!(
            validator.check(&missing_answer, &field),
            Err(ValidationError::RequiredFieldMissing)
        );

        let mut empty_operand = math_submission("3", "+", "5", "8");
        empty_operand.operand2 = Some(String::new());
        assert_eq!(
            validator.check(&empty_operand, &field),
            Err(ValidationError::RequiredFieldMissing)
        );
    }

    #[test]
    fn math_garbage_challenge_echo_fails_as_incorrect() {
        let validator = AnswerValidator::default();
        let field = math_field();

        assert_eq!(
            validator.check(&math_submission("three", "+", "5", "8"), &field),
            Err(ValidationError::IncorrectAnswer)
        );
        assert_eq!(
            validator.check(&math_submission("3", "/", "5", "8"), &field),
            Err(ValidationError::IncorrectAnswer)
        );
        assert_eq!(
            validator.check(&math_submission("3", "+", "5", "eight"), &field),
            Err(ValidationError::IncorrectAnswer)
        );
    }

    #[test]
    fn math_overflowing_operand_echo_fails_as_incorrect() {
        let validator = AnswerValidator::default();
        let field = math_field();
        let max = i64::MAX.to_string();

        assert_eq!(
            validator.check(&math_submission(&max, "*", &max, "1"), &field),
            Err(ValidationError::IncorrectAnswer)
        );
        assert_eq!(
            validator.check(&math_submission(&max, "+", "1", "0"), &field),
            Err(ValidationError::IncorrectAnswer)
        );
        assert_eq!(
            validator.check(&math_submission(&i64::MIN.to_string(), "-", "1", "0"), &field),
            Err(ValidationError::IncorrectAnswer)
        );
    }

    #[test]
    fn qa_scenario_two_plus_two() {
        let validator = AnswerValidator::default();
        let field = qa_field(&[("2+2?", "4")]);

        assert_eq!(validator.check(&qa_submission("1", "4"), &field), Ok(()));
        assert_eq!(
            validator.check(&qa_submission("1", "five"), &field),
            Err(ValidationError::IncorrectAnswer)
        );
    }

    #[test]
    fn qa_comparison_is_trimmed_and_case_insensitive() {
        let validator = AnswerValidator::default();
        let field = qa_field(&[("Capital of France?", "Paris")]);

        assert_eq!(
            validator.check(&qa_submission("1", " paris "), &field),
            Ok(())
        );
    }

    #[test]
    fn qa_answer_zero_is_present_not_missing() {
        let validator = AnswerValidator::default();
        let field = qa_field(&[("How many moons does Venus have?", "0")]);

        assert_eq!(validator.check(&qa_submission("1", "0"), &field), Ok(()));
    }

    #[test]
    fn qa_missing_key_or_answer_is_a_required_error() {
        let validator = AnswerValidator::default();
        let field = qa_field(&[("2+2?", "4")]);

        let mut no_key = qa_submission("1", "4");
        no_key.question_key = None;
        assert_eq!(
            validator.check(&no_key, &field),
            Err(ValidationError::RequiredFieldMissing)
        );

        let mut empty_answer = qa_submission("1", "4");
        empty_answer.answer = Some(String::new());
        assert_eq!(
            validator.check(&empty_answer, &field),
            Err(ValidationError::RequiredFieldMissing)
        );
    }

    #[test]
    fn qa_unknown_key_fails_as_incorrect() {
        let validator = AnswerValidator::default();
        let field = qa_field(&[("2+2?", "4")]);

        assert_eq!(
            validator.check(&qa_submission("42", "4"), &field),
            Err(ValidationError::IncorrectAnswer)
        );
    }

    #[test]
    fn validate_records_one_localized_error_per_field() {
        let validator = AnswerValidator::default();
        let field = qa_field(&[("2+2?", "4")]);
        let mut errors = ProcessErrors::new();

        validator.validate(7, 3, &qa_submission("1", "4"), &field, &mut errors);
        assert!(errors.is_empty());

        validator.validate(7, 3, &qa_submission("1", "five"), &field, &mut errors);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get(7, 3), Some("Incorrect answer."));
        assert_eq!(errors.get(7, 4), None);
    }

    #[test]
    fn missing_and_incorrect_surface_as_their_own_messages() {
        let validator = AnswerValidator::default();
        let field = math_field();
        let mut errors = ProcessErrors::new();

        validator.validate(1, 1, &SubmittedValues::default(), &field, &mut errors);
        assert_eq!(errors.get(1, 1), Some("This field is required."));
    }
}
