//! Defaults and wire key names for the Custom Captcha field.

/// Smallest operand that may appear in a generated equation
pub const DEFAULT_MATH_MIN: i64 = 1;

/// Largest operand that may appear in a generated equation
pub const DEFAULT_MATH_MAX: i64 = 15;

/// Question seeded into a freshly added field
pub const DEFAULT_SEED_QUESTION: &str = "What is 7+4?";

/// Answer to the seeded question
pub const DEFAULT_SEED_ANSWER: &str = "11";

/// Key assigned to the seeded question
pub const DEFAULT_SEED_KEY: u32 = 1;

/// Field type slug registered with the host framework
pub const FIELD_TYPE: &str = "captcha";

/// Display name shown in the builder's field picker
pub const FIELD_NAME: &str = "Custom Captcha";

/// Search keywords for the builder's field picker
pub const FIELD_KEYWORDS: &str = "spam, math, maths, question";

/// Icon slug shown in the builder's field picker
pub const FIELD_ICON: &str = "fa-question-circle";

/// Sort order within the field group
pub const FIELD_ORDER: u32 = 300;

/// Field group in the builder's field picker
pub const FIELD_GROUP: &str = "fancy";

/// Submitted value key names, namespaced per field by the host
pub mod wire_keys {
    /// The submitter's answer: fields[{id}][answer]
    pub const ANSWER: &str = "answer";

    /// First math operand: fields[{id}][operand1]
    pub const OPERAND1: &str = "operand1";

    /// Second math operand: fields[{id}][operand2]
    pub const OPERAND2: &str = "operand2";

    /// Math operator symbol: fields[{id}][operator]
    pub const OPERATOR: &str = "operator";

    /// Key of the question shown to the submitter: fields[{id}][question_key]
    pub const QUESTION_KEY: &str = "question_key";
}
