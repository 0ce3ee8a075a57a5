//! Challenge generation.
//!
//! One challenge is produced per form render and lives only for that
//! render/submit round trip. Math operands and operator are drawn uniformly
//! from the configured range; qa questions are drawn uniformly from the
//! pairs that survive the completeness filter, so a selected key is always
//! valid and no retry is ever needed.

use captcha_common::{Challenge, ChallengeFormat, FieldConfiguration, MathOperator, MathRange, QuestionList};
use rand::Rng;
use tracing::debug;

/// Challenge generator service
#[derive(Debug, Clone)]
pub struct ChallengeGenerator {
    /// Equation bounds and operator set
    pub math: MathRange,
}

impl ChallengeGenerator {
    pub fn new(math: MathRange) -> Self {
        Self { math }
    }

    /// Generate the challenge for one render of the field.
    ///
    /// Returns `None` only in qa mode when no complete question/answer pair
    /// exists; the field is then suppressed entirely.
    pub fn generate(&self, field: &FieldConfiguration) -> Option<Challenge> {
        match field.format {
            ChallengeFormat::Math => Some(self.math_challenge()),
            ChallengeFormat::Qa => self
                .pick_question(&field.questions)
                .map(|key| Challenge::Qa { key }),
        }
    }

    /// Draw two operands and an operator uniformly from the configured range
    pub fn math_challenge(&self) -> Challenge {
        let mut rng = rand::rng();

        let operand1 = rng.random_range(self.math.min..=self.math.max);
        let operand2 = rng.random_range(self.math.min..=self.math.max);
        let operator = if self.math.operators.is_empty() {
            MathOperator::Add
        } else {
            self.math.operators[rng.random_range(0..self.math.operators.len())]
        };

        debug!(
            operand1,
            operand2,
            operator = operator.symbol(),
            "Generated math challenge"
        );

        Challenge::Math {
            operand1,
            operator,
            operand2,
        }
    }

    /// Choose one question uniformly from the complete pairs.
    ///
    /// The completeness filter runs against the persisted list first, so
    /// stale configurations with half-filled pairs cannot be selected.
    pub fn pick_question(&self, questions: &QuestionList) -> Option<u32> {
        let candidates = questions.complete_keys();
        if candidates.is_empty() {
            return None;
        }

        let mut rng = rand::rng();
        let key = candidates[rng.random_range(0..candidates.len())];

        debug!(key, candidates = candidates.len(), "Selected qa challenge");

        Some(key)
    }
}
