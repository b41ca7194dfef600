//! Volume and issue number parsing.
//!
//! The `issue` element mixes the number with supplement and special-issue
//! markers: `3`, `3 suppl 1`, `suppl`, `2 spe`, `ahead`.

use serde::Serialize;

/// Number used for ahead-of-print documents.
pub const AHEAD: &str = "ahead";

/// Normalize a numeric bibliographic value.
///
/// Blank values become `None`; digit-only values lose their leading zeros.
///
/// # Examples
/// ```
/// use sps_validator::article::normalize_number;
///
/// assert_eq!(normalize_number(Some(" 007 ")), Some("7".to_string()));
/// assert_eq!(normalize_number(Some("000")), Some("0".to_string()));
/// assert_eq!(normalize_number(Some("e12")), Some("e12".to_string()));
/// assert_eq!(normalize_number(Some("  ")), None);
/// ```
pub fn normalize_number(value: Option<&str>) -> Option<String> {
    let value = value?.trim();
    if value.is_empty() {
        return None;
    }
    if value.chars().all(|c| c.is_ascii_digit()) {
        let stripped = value.trim_start_matches('0');
        return Some(if stripped.is_empty() { "0" } else { stripped }.to_string());
    }
    Some(value.to_string())
}

/// Raw parts of an `issue` element: number, supplement and complement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawIssue {
    pub number: Option<String>,
    pub suppl: Option<String>,
    pub compl: Option<String>,
}

fn is_suppl_marker(token: &str) -> bool {
    token.to_lowercase().starts_with("sup")
}

fn is_compl_marker(token: &str) -> bool {
    let token = token.to_lowercase();
    token.starts_with("spe") || token == "pr"
}

/// Split the text of an `issue` element.
///
/// A supplement marker without a value means supplement `0`.
pub fn split_issue(issue: &str) -> RawIssue {
    let mut parts = RawIssue::default();
    let mut tokens = issue.split_whitespace().peekable();

    while let Some(token) = tokens.next() {
        if is_suppl_marker(token) {
            let value = tokens
                .next_if(|next| !is_suppl_marker(next) && !is_compl_marker(next))
                .unwrap_or("0");
            parts.suppl = Some(value.to_string());
        } else if is_compl_marker(token) {
            parts.compl = Some(token.to_lowercase());
        } else if parts.number.is_none() {
            parts.number = Some(token.to_string());
        }
    }

    parts
}

/// Issue identification derived from `volume` and `issue`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IssueParts {
    pub number: Option<String>,
    pub number_suppl: Option<String>,
    pub volume_suppl: Option<String>,
    pub compl: Option<String>,
}

impl IssueParts {
    /// Resolve the issue parts.
    ///
    /// `volume` must already be normalized. Without volume and number the
    /// document is ahead of print. A supplement belongs to the number when
    /// there is one, otherwise to the volume.
    pub fn resolve(issue: Option<&str>, volume: Option<&str>) -> Self {
        let raw = issue.map(split_issue).unwrap_or_default();

        let mut number = normalize_number(raw.number.as_deref()).filter(|n| n != "0");
        if number.is_none() && volume.is_none() {
            number = Some(AHEAD.to_string());
        }

        let suppl = normalize_number(raw.suppl.as_deref());
        let (number_suppl, volume_suppl) = match (&number, suppl) {
            (_, None) => (None, None),
            (None, Some(s)) => (None, Some(s)),
            (Some(_), Some(s)) => (Some(s), None),
        };

        Self {
            number,
            number_suppl,
            volume_suppl,
            compl: raw.compl,
        }
    }

    pub fn is_ahead_number(&self) -> bool {
        self.number.as_deref() == Some(AHEAD)
    }

    /// Issue label such as `v12n3s1`, `v12s0` or `2024nahead`.
    ///
    /// # Examples
    /// ```
    /// use sps_validator::article::IssueParts;
    ///
    /// let parts = IssueParts::resolve(Some("3 suppl 1"), Some("12"));
    /// assert_eq!(parts.label(Some(2024), Some("12")), "v12n3s1");
    ///
    /// let ahead = IssueParts::resolve(None, None);
    /// assert_eq!(ahead.label(Some(2024), None), "2024nahead");
    /// ```
    pub fn label(&self, year: Option<i32>, volume: Option<&str>) -> String {
        if self.is_ahead_number() {
            let year = year.map(|y| format!("{y:04}")).unwrap_or_default();
            return format!("{year}n{AHEAD}");
        }

        let mut label = String::new();
        if let Some(v) = volume {
            label.push_str(&format!("v{v}"));
        }
        if let Some(s) = &self.volume_suppl {
            label.push_str(&format!("s{s}"));
        }
        if let Some(n) = &self.number {
            label.push_str(&format!("n{n}"));
        }
        if let Some(s) = &self.number_suppl {
            label.push_str(&format!("s{s}"));
        }
        if let Some(c) = &self.compl {
            label.push_str(c);
        }
        label
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_split_issue() {
        assert_eq!(
            split_issue("3"),
            RawIssue {
                number: Some("3".to_string()),
                ..RawIssue::default()
            }
        );
        assert_eq!(
            split_issue("3 suppl 1"),
            RawIssue {
                number: Some("3".to_string()),
                suppl: Some("1".to_string()),
                compl: None,
            }
        );
        assert_eq!(
            split_issue("suppl"),
            RawIssue {
                suppl: Some("0".to_string()),
                ..RawIssue::default()
            }
        );
        assert_eq!(
            split_issue("2 spe"),
            RawIssue {
                number: Some("2".to_string()),
                compl: Some("spe".to_string()),
                ..RawIssue::default()
            }
        );
    }

    #[test]
    fn test_resolve_regular_issue() {
        let parts = IssueParts::resolve(Some("04"), Some("12"));
        assert_eq!(parts.number.as_deref(), Some("4"));
        assert!(!parts.is_ahead_number());
        assert_eq!(parts.label(Some(2023), Some("12")), "v12n4");
    }

    #[test]
    fn test_resolve_ahead() {
        let parts = IssueParts::resolve(None, None);
        assert!(parts.is_ahead_number());

        let parts = IssueParts::resolve(Some("00"), None);
        assert!(parts.is_ahead_number());
    }

    #[test]
    fn test_volume_supplement() {
        let parts = IssueParts::resolve(Some("suppl 2"), Some("30"));
        assert_eq!(parts.number, None);
        assert_eq!(parts.volume_suppl.as_deref(), Some("2"));
        assert_eq!(parts.label(Some(2020), Some("30")), "v30s2");
    }

    #[test]
    fn test_special_issue_label() {
        let parts = IssueParts::resolve(Some("5 spe"), Some("8"));
        assert_eq!(parts.label(Some(2021), Some("8")), "v8n5spe");
    }

    #[test]
    fn test_press_release_compl() {
        let parts = IssueParts::resolve(Some("1 pr"), Some("33"));
        assert_eq!(parts.compl.as_deref(), Some("pr"));
    }
}
