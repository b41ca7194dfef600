//! Configuration constants and validation functions for the validator.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::article::SummaryField;
use crate::error::{Result, ValidatorError};

/// Width of the order key.
pub const ORDER_WIDTH: usize = 5;

/// Order assigned when a document has neither a sequence id nor a first page.
pub const DEFAULT_ORDER: &str = "00000";

/// Minimum normalized Levenshtein similarity for two texts to count as the same.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.8;

/// XLink namespace URI.
pub const XLINK_NS: &str = "http://www.w3.org/1999/xlink";

/// Default log filter when `RUST_LOG` is not set.
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Wrap width for messages printed by the command line.
pub const TEXT_WRAP_WIDTH: usize = 100;

/// Environment variable selecting the validation mode.
pub const MODE_ENV_VAR: &str = "SPS_VALIDATOR_MODE";

/// Environment variable overriding the similarity threshold.
pub const THRESHOLD_ENV_VAR: &str = "SPS_SIMILARITY_THRESHOLD";

/// Publication types whose references feed bibliometric indicators.
pub const BIBLIOMETRICS_USE: &[&str] = &[
    "journal",
    "book",
    "thesis",
    "conf-proc",
    "confproc",
    "report",
    "patent",
    "database",
    "webpage",
    "software",
    "data",
    "newspaper",
    "legal-doc",
    "preprint",
];

/// Related-article types whose `id` is kept as written.
pub const RELATED_ARTICLE_TYPES: &[&str] = &[
    "corrected-article",
    "press-release",
    "commentary-article",
    "article-reference",
    "retracted-article",
    "partial-retraction",
    "addended-article",
    "reviewed-article",
    "letter",
    "reply",
];

/// Fields every document of a package must share.
pub const COMMON_FIELDS: &[SummaryField] = &[
    SummaryField::JournalTitle,
    SummaryField::JournalIdPublisherId,
    SummaryField::JournalIdNlmTa,
    SummaryField::EIssn,
    SummaryField::PrintIssn,
    SummaryField::PublisherName,
    SummaryField::IssueLabel,
    SummaryField::IssuePubDate,
    SummaryField::License,
];

/// Fields every document must carry.
pub const REQUIRED_FIELDS: &[SummaryField] = &[
    SummaryField::JournalTitle,
    SummaryField::JournalIssn,
    SummaryField::PublisherName,
    SummaryField::IssueLabel,
    SummaryField::IssuePubDate,
];

/// Fields no two documents may share. Order is checked on the resulting
/// order table instead.
pub const UNIQUE_FIELDS: &[SummaryField] = &[
    SummaryField::Doi,
    SummaryField::ElocationId,
    SummaryField::PageKey,
];

/// Order pattern: exactly five digits.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static ORDER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{5}$").expect("valid regex"));

/// Whether the pass targets final registration or only produces a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationMode {
    /// Results are written to the publication database.
    Registration,

    /// Report-only pass.
    #[default]
    Preview,
}

impl ValidationMode {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Registration => "registration",
            Self::Preview => "preview",
        }
    }

    #[must_use]
    pub fn is_registration(&self) -> bool {
        matches!(self, Self::Registration)
    }
}

impl fmt::Display for ValidationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValidationMode {
    type Err = ValidatorError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "registration" | "db" => Ok(Self::Registration),
            "preview" | "report" => Ok(Self::Preview),
            _ => Err(ValidatorError::InvalidMode(s.to_string())),
        }
    }
}

/// Validate a similarity threshold.
///
/// # Examples
/// ```
/// use sps_validator::config::validate_similarity_threshold;
///
/// assert!(validate_similarity_threshold(0.8).is_ok());
/// assert!(validate_similarity_threshold(1.5).is_err());
/// ```
pub fn validate_similarity_threshold(threshold: f64) -> Result<()> {
    if (0.0..=1.0).contains(&threshold) {
        Ok(())
    } else {
        Err(ValidatorError::InvalidThreshold(threshold))
    }
}

/// Validate order format (five digits).
///
/// # Examples
/// ```
/// use sps_validator::config::validate_order;
///
/// assert!(validate_order("00012").is_ok());
/// assert!(validate_order("12").is_err());
/// ```
pub fn validate_order(order: &str) -> Result<()> {
    if ORDER_PATTERN.is_match(order) {
        Ok(())
    } else {
        Err(ValidatorError::InvalidOrder(order.to_string()))
    }
}

/// Settings for one reconciliation pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatorConfig {
    pub mode: ValidationMode,
    pub similarity_threshold: f64,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            mode: ValidationMode::default(),
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
        }
    }
}

impl ValidatorConfig {
    /// Load configuration from environment variables.
    ///
    /// Unset variables fall back to the defaults; set but invalid values are
    /// an error.
    pub fn from_env() -> Result<Self> {
        let mode = match std::env::var(MODE_ENV_VAR) {
            Ok(value) => value.parse()?,
            Err(_) => ValidationMode::default(),
        };

        let similarity_threshold = match std::env::var(THRESHOLD_ENV_VAR) {
            Ok(value) => {
                let threshold = value
                    .trim()
                    .parse::<f64>()
                    .map_err(|_| {
                        ValidatorError::Config(format!("{THRESHOLD_ENV_VAR}={value} is not a number"))
                    })?;
                validate_similarity_threshold(threshold)?;
                threshold
            }
            Err(_) => DEFAULT_SIMILARITY_THRESHOLD,
        };

        Ok(Self {
            mode,
            similarity_threshold,
        })
    }

    /// Create a config builder.
    pub fn builder() -> ValidatorConfigBuilder {
        ValidatorConfigBuilder {
            mode: ValidationMode::default(),
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
        }
    }
}

/// Builder for constructing `ValidatorConfig`.
pub struct ValidatorConfigBuilder {
    mode: ValidationMode,
    similarity_threshold: f64,
}

impl ValidatorConfigBuilder {
    pub fn mode(mut self, mode: ValidationMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn similarity_threshold(mut self, threshold: f64) -> Self {
        self.similarity_threshold = threshold;
        self
    }

    /// Build the config, rejecting an out-of-range threshold.
    pub fn build(self) -> Result<ValidatorConfig> {
        validate_similarity_threshold(self.similarity_threshold)?;
        Ok(ValidatorConfig {
            mode: self.mode,
            similarity_threshold: self.similarity_threshold,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_order() {
        assert!(validate_order("00000").is_ok());
        assert!(validate_order("12345").is_ok());
        assert!(validate_order("1234").is_err());
        assert!(validate_order("1234a").is_err());
        assert!(validate_order("123456").is_err());
    }

    #[test]
    fn test_validate_similarity_threshold() {
        assert!(validate_similarity_threshold(0.0).is_ok());
        assert!(validate_similarity_threshold(1.0).is_ok());
        assert!(validate_similarity_threshold(-0.1).is_err());
        assert!(validate_similarity_threshold(f64::NAN).is_err());
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!(
            "registration".parse::<ValidationMode>().unwrap(),
            ValidationMode::Registration
        );
        assert_eq!(
            " Preview ".parse::<ValidationMode>().unwrap(),
            ValidationMode::Preview
        );
        assert!("final".parse::<ValidationMode>().is_err());
    }

    #[test]
    fn test_mode_display() {
        assert_eq!(ValidationMode::Registration.to_string(), "registration");
        assert!(ValidationMode::Registration.is_registration());
        assert!(!ValidationMode::Preview.is_registration());
    }

    #[test]
    fn test_builder() {
        let config = ValidatorConfig::builder()
            .mode(ValidationMode::Registration)
            .similarity_threshold(0.9)
            .build()
            .unwrap();
        assert_eq!(config.mode, ValidationMode::Registration);
        assert!((config.similarity_threshold - 0.9).abs() < f64::EPSILON);
    }

    #[test]
    fn test_builder_rejects_threshold() {
        let result = ValidatorConfig::builder().similarity_threshold(2.0).build();
        assert!(matches!(result, Err(ValidatorError::InvalidThreshold(_))));
    }

    #[test]
    fn test_default_config() {
        let config = ValidatorConfig::default();
        assert_eq!(config.mode, ValidationMode::Preview);
        assert!((config.similarity_threshold - DEFAULT_SIMILARITY_THRESHOLD).abs() < f64::EPSILON);
    }
}
