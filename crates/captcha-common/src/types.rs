//! Core types for the Custom Captcha field.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::constants;

/// Challenge generation strategy for one field instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChallengeFormat {
    /// Randomly generated arithmetic equation
    Math,
    /// Randomly selected question from the configured list
    Qa,
}

impl Default for ChallengeFormat {
    fn default() -> Self {
        Self::Math
    }
}

/// Arithmetic operator participating in a math challenge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MathOperator {
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Sub,
    #[serde(rename = "*")]
    Mul,
}

impl MathOperator {
    /// Apply the operator to two operands.
    ///
    /// Operands arrive echoed from the client, so they can be arbitrary
    /// `i64` values; `None` on overflow keeps a forged equation from
    /// panicking the validator.
    pub fn apply(&self, a: i64, b: i64) -> Option<i64> {
        match self {
            Self::Add => a.checked_add(b),
            Self::Sub => a.checked_sub(b),
            Self::Mul => a.checked_mul(b),
        }
    }

    /// Symbol as it travels over the wire and appears in the equation
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
        }
    }

    /// Parse a wire symbol back into an operator
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "+" => Some(Self::Add),
            "-" => Some(Self::Sub),
            "*" => Some(Self::Mul),
            _ => None,
        }
    }
}

/// Bounds and operator set for generated equations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MathRange {
    /// Inclusive lower bound for operands
    pub min: i64,

    /// Inclusive upper bound for operands
    pub max: i64,

    /// Operators eligible for selection
    pub operators: Vec<MathOperator>,
}

impl Default for MathRange {
    fn default() -> Self {
        Self {
            min: constants::DEFAULT_MATH_MIN,
            max: constants::DEFAULT_MATH_MAX,
            operators: vec![MathOperator::Add, MathOperator::Mul],
        }
    }
}

/// One question/answer pair in a field's question list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaPair {
    #[serde(default)]
    pub question: String,

    #[serde(default)]
    pub answer: String,
}

impl QaPair {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }

    /// True when both question and answer are non-empty after trimming.
    ///
    /// Only complete pairs survive persistence and are eligible as
    /// challenges.
    pub fn is_complete(&self) -> bool {
        !self.question.trim().is_empty() && !self.answer.trim().is_empty()
    }

    /// True when the submitted text matches the stored answer.
    ///
    /// Comparison is whitespace-trimmed and case-insensitive.
    pub fn answer_matches(&self, submitted: &str) -> bool {
        submitted.trim().to_lowercase() == self.answer.trim().to_lowercase()
    }
}

/// Ordered collection of question/answer pairs with stable integer keys.
///
/// Keys are monotonically increasing and never reused within an editing
/// session. Persisted as a JSON object keyed by the stringified integer,
/// matching the host framework's form-encoded storage; the next-key counter
/// is recomputed from the largest key on load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<String, QaPair>",
    into = "BTreeMap<String, QaPair>"
)]
pub struct QuestionList {
    entries: Vec<(u32, QaPair)>,
    next_id: u32,
}

impl QuestionList {
    /// Empty list; the first allocated key is 1
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: constants::DEFAULT_SEED_KEY,
        }
    }

    /// List holding the default seed question
    pub fn seeded() -> Self {
        let mut list = Self::new();
        list.push(QaPair::new(
            constants::DEFAULT_SEED_QUESTION,
            constants::DEFAULT_SEED_ANSWER,
        ));
        list
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Next key that will be handed out
    pub fn next_id(&self) -> u32 {
        self.next_id
    }

    /// Entries in display order
    pub fn iter(&self) -> impl Iterator<Item = (u32, &QaPair)> {
        self.entries.iter().map(|(k, pair)| (*k, pair))
    }

    /// First entry in display order
    pub fn first(&self) -> Option<(u32, &QaPair)> {
        self.entries.first().map(|(k, pair)| (*k, pair))
    }

    pub fn get(&self, key: u32) -> Option<&QaPair> {
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, pair)| pair)
    }

    pub fn get_mut(&mut self, key: u32) -> Option<&mut QaPair> {
        self.entries
            .iter_mut()
            .find(|(k, _)| *k == key)
            .map(|(_, pair)| pair)
    }

    pub fn contains(&self, key: u32) -> bool {
        self.entries.iter().any(|(k, _)| *k == key)
    }

    /// Append a pair at the end of the list, returning its key
    pub fn push(&mut self, pair: QaPair) -> u32 {
        let key = self.allocate_key();
        self.entries.push((key, pair));
        key
    }

    /// Insert a pair immediately after the reference entry, returning its
    /// key. Falls back to appending when the reference key is unknown.
    pub fn insert_after(&mut self, reference: u32, pair: QaPair) -> u32 {
        let key = self.allocate_key();
        match self.entries.iter().position(|(k, _)| *k == reference) {
            Some(pos) => self.entries.insert(pos + 1, (key, pair)),
            None => self.entries.push((key, pair)),
        }
        key
    }

    /// Remove an entry by key
    pub fn remove(&mut self, key: u32) -> Option<QaPair> {
        let pos = self.entries.iter().position(|(k, _)| *k == key)?;
        Some(self.entries.remove(pos).1)
    }

    /// Count of entries whose trimmed question is non-empty.
    ///
    /// Answers do not participate in this count; it gates interactive
    /// removal only.
    pub fn non_empty_question_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|(_, pair)| !pair.question.trim().is_empty())
            .count()
    }

    /// Keys of entries where both question and answer are non-empty
    pub fn complete_keys(&self) -> Vec<u32> {
        self.entries
            .iter()
            .filter(|(_, pair)| pair.is_complete())
            .map(|(k, _)| *k)
            .collect()
    }

    /// Drop every incomplete entry, returning how many were removed.
    ///
    /// Idempotent; this is the authoritative pre-persistence filter.
    pub fn retain_complete(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|(_, pair)| pair.is_complete());
        before - self.entries.len()
    }

    fn allocate_key(&mut self) -> u32 {
        let floor = self
            .entries
            .iter()
            .map(|(k, _)| k + 1)
            .max()
            .unwrap_or(constants::DEFAULT_SEED_KEY);
        let key = self.next_id.max(floor);
        self.next_id = key + 1;
        key
    }
}

impl From<BTreeMap<String, QaPair>> for QuestionList {
    fn from(map: BTreeMap<String, QaPair>) -> Self {
        let mut entries: Vec<(u32, QaPair)> = map
            .into_iter()
            .filter_map(|(key, pair)| key.trim().parse().ok().map(|key| (key, pair)))
            .collect();
        entries.sort_by_key(|(key, _)| *key);

        let next_id = entries
            .last()
            .map_or(constants::DEFAULT_SEED_KEY, |(key, _)| key + 1);

        Self { entries, next_id }
    }
}

impl From<QuestionList> for BTreeMap<String, QaPair> {
    fn from(list: QuestionList) -> Self {
        list.entries
            .into_iter()
            .map(|(key, pair)| (key.to_string(), pair))
            .collect()
    }
}

/// Persisted configuration for one field instance.
///
/// Created when the field is added to a form, mutated only through the
/// builder, destroyed when the field is removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldConfiguration {
    #[serde(default)]
    pub format: ChallengeFormat,

    #[serde(default)]
    pub questions: QuestionList,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub css_classes: Option<String>,

    #[serde(default)]
    pub label_hide: bool,
}

impl FieldConfiguration {
    /// Fresh configuration with the default seed question
    pub fn seeded(format: ChallengeFormat) -> Self {
        Self {
            format,
            questions: QuestionList::seeded(),
            ..Self::default()
        }
    }
}

/// One challenge presented to a submitter.
///
/// Ephemeral: generated per render, carried through hidden fields, and
/// discarded after one validation attempt. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Challenge {
    Math {
        operand1: i64,
        operator: MathOperator,
        operand2: i64,
    },
    Qa {
        /// Key of the chosen question in the field's list
        key: u32,
    },
}

impl Challenge {
    /// Expected integer result for a math challenge
    pub fn expected_answer(&self) -> Option<i64> {
        match self {
            Self::Math {
                operand1,
                operator,
                operand2,
            } => operator.apply(*operand1, *operand2),
            Self::Qa { .. } => None,
        }
    }
}

/// Submitted values for one field, decoded from the host's form-encoded
/// namespace.
///
/// Absence is distinguished from the literal string `"0"`: a submitter whose
/// answer is zero must not be treated as having left the field blank.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmittedValues {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operand1: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operand2: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_key: Option<String>,
}

impl SubmittedValues {
    /// Decode from the field's key/value pairs as the host hands them over
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut values = Self::default();

        for (key, value) in pairs {
            let value = Some(value.to_string());
            match key {
                constants::wire_keys::ANSWER => values.answer = value,
                constants::wire_keys::OPERAND1 => values.operand1 = value,
                constants::wire_keys::OPERAND2 => values.operand2 = value,
                constants::wire_keys::OPERATOR => values.operator = value,
                constants::wire_keys::QUESTION_KEY => values.question_key = value,
                _ => {}
            }
        }

        values
    }

    /// Whether a sub-value is present. The literal `"0"` is present; an
    /// empty string is not.
    pub fn is_present(value: &Option<String>) -> bool {
        matches!(value.as_deref(), Some(s) if s == "0" || !s.is_empty())
    }
}
