//! Core data types shared by extraction and reconciliation.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Severity of a validation finding, in ascending order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// No action needed, kept for auditing.
    Info,

    /// Acceptable but flagged.
    Warning,

    /// Quality issue that does not block the package.
    Error,

    /// Affects downstream indicators but not package acceptance.
    Fatal,

    /// The package must not be accepted as-is.
    Blocking,
}

impl Severity {
    /// Get the string value used in serialized reports.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Fatal => "fatal",
            Self::Blocking => "blocking",
        }
    }

    /// Human readable label.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Fatal => "FATAL ERROR",
            Self::Blocking => "BLOCKING ERROR",
        }
    }

    /// Whether the finding counts towards the accept/reject roll-up.
    #[must_use]
    pub fn is_gating(&self) -> bool {
        matches!(self, Self::Error | Self::Fatal | Self::Blocking)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A text tagged with the language it is written in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LangText {
    pub language: Option<String>,
    pub text: String,
}

impl LangText {
    pub fn new(language: Option<String>, text: impl Into<String>) -> Self {
        Self {
            language,
            text: text.into(),
        }
    }
}

/// A calendar date where month and day may be missing.
///
/// A missing component is `None`; a component written as `0` is kept as
/// `Some(0)`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialDate {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub day: Option<u32>,
    pub season: Option<String>,
}

impl PartialDate {
    /// Create a date from its components.
    pub fn new(year: Option<i32>, month: Option<u32>, day: Option<u32>) -> Self {
        Self {
            year,
            month,
            day,
            season: None,
        }
    }

    /// Compact `YYYYMMDD` form, missing components written as zeros.
    ///
    /// # Examples
    /// ```
    /// use sps_validator::types::PartialDate;
    ///
    /// let date = PartialDate::new(Some(2024), Some(3), None);
    /// assert_eq!(date.dateiso(), "20240300");
    /// ```
    #[must_use]
    pub fn dateiso(&self) -> String {
        format!(
            "{:04}{:02}{:02}",
            self.year.unwrap_or(0),
            self.month.unwrap_or(0),
            self.day.unwrap_or(0)
        )
    }

    /// Whether a non-zero day is present.
    #[must_use]
    pub fn has_day(&self) -> bool {
        matches!(self.day, Some(day) if day != 0)
    }

    /// Convert to a full date when every component is present and valid.
    #[must_use]
    pub fn to_naive_date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year?, self.month?, self.day?)
    }
}

impl fmt::Display for PartialDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let iso = self.dateiso();
        write!(f, "{}-{}-{}", &iso[0..4], &iso[4..6], &iso[6..8])
    }
}

/// Number of days between two dates, when both are complete.
pub fn days_between(from: &PartialDate, to: &PartialDate) -> Option<i64> {
    Some((to.to_naive_date()? - from.to_naive_date()?).num_days())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Info < Severity::Warning);
        assert!(Severity::Warning < Severity::Error);
        assert!(Severity::Error < Severity::Fatal);
        assert!(Severity::Fatal < Severity::Blocking);
    }

    #[test]
    fn test_severity_serialization() {
        let json = serde_json::to_string(&Severity::Blocking).unwrap();
        assert_eq!(json, "\"blocking\"");
        assert_eq!(Severity::Fatal.to_string(), "FATAL ERROR");
    }

    #[test]
    fn test_severity_gating() {
        assert!(!Severity::Info.is_gating());
        assert!(!Severity::Warning.is_gating());
        assert!(Severity::Error.is_gating());
        assert!(Severity::Blocking.is_gating());
    }

    #[test]
    fn test_partial_date_absent_vs_zero() {
        let absent = PartialDate::new(Some(2023), Some(5), None);
        let zero = PartialDate::new(Some(2023), Some(5), Some(0));
        assert_ne!(absent, zero);
        assert_eq!(absent.dateiso(), zero.dateiso());
        assert!(!absent.has_day());
        assert!(!zero.has_day());
    }

    #[test]
    fn test_partial_date_display() {
        let date = PartialDate::new(Some(2023), Some(5), Some(9));
        assert_eq!(date.to_string(), "2023-05-09");
    }

    #[test]
    fn test_days_between() {
        let received = PartialDate::new(Some(2023), Some(1), Some(10));
        let accepted = PartialDate::new(Some(2023), Some(2), Some(9));
        assert_eq!(days_between(&received, &accepted), Some(30));

        let incomplete = PartialDate::new(Some(2023), Some(2), None);
        assert_eq!(days_between(&received, &incomplete), None);
    }
}
