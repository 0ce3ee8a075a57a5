//! Configuration for the Custom Captcha field.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use captcha_common::constants::{DEFAULT_MATH_MAX, DEFAULT_MATH_MIN};
use captcha_common::{MathOperator, MathRange};

use crate::messages::Messages;

/// Process-wide field configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CaptchaConfig {
    /// Equation bounds and operator set
    #[serde(default)]
    pub math: MathSettings,

    /// User-facing strings (translation override point)
    #[serde(default)]
    pub messages: Messages,
}

/// Math challenge settings
#[derive(Debug, Clone, Deserialize)]
pub struct MathSettings {
    /// Inclusive lower bound for operands
    #[serde(default = "default_math_min")]
    pub min: i64,

    /// Inclusive upper bound for operands
    #[serde(default = "default_math_max")]
    pub max: i64,

    /// Operator symbols eligible for selection
    #[serde(default = "default_math_operators")]
    pub operators: Vec<MathOperator>,
}

impl Default for MathSettings {
    fn default() -> Self {
        Self {
            min: default_math_min(),
            max: default_math_max(),
            operators: default_math_operators(),
        }
    }
}

impl MathSettings {
    /// Range handed to the challenge generator
    pub fn to_range(&self) -> MathRange {
        MathRange {
            min: self.min,
            max: self.max,
            operators: self.operators.clone(),
        }
    }
}

// Default value functions
fn default_math_min() -> i64 {
    DEFAULT_MATH_MIN
}

fn default_math_max() -> i64 {
    DEFAULT_MATH_MAX
}

fn default_math_operators() -> Vec<MathOperator> {
    vec![MathOperator::Add, MathOperator::Mul]
}

impl CaptchaConfig {
    /// Load configuration from a TOML file, falling back to defaults when
    /// the file does not exist
    pub fn load(config_path: &str) -> Result<Self> {
        if !Path::new(config_path).exists() {
            tracing::warn!(path = %config_path, "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path))
            .build()
            .context("Failed to load config file")?;

        settings.try_deserialize().context("Failed to parse config")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_stock_math_captcha() {
        let config = CaptchaConfig::default();
        assert_eq!(config.math.min, 1);
        assert_eq!(config.math.max, 15);
        assert_eq!(
            config.math.operators,
            vec![MathOperator::Add, MathOperator::Mul]
        );
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = CaptchaConfig::load("does/not/exist.toml").unwrap();
        assert_eq!(config.math.max, 15);
        assert_eq!(config.messages.incorrect_answer, "Incorrect answer.");
    }

    #[test]
    fn toml_override_is_honored() {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(
                r#"
                [math]
                min = 2
                max = 9
                operators = ["+", "-"]

                [messages]
                incorrect_answer = "Nope."
                "#,
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap();

        let config: CaptchaConfig = settings.try_deserialize().unwrap();
        assert_eq!(config.math.min, 2);
        assert_eq!(config.math.max, 9);
        assert_eq!(
            config.math.operators,
            vec![MathOperator::Add, MathOperator::Sub]
        );
        assert_eq!(config.messages.incorrect_answer, "Nope.");
        assert_eq!(config.messages.required, "This field is required.");
    }
}
