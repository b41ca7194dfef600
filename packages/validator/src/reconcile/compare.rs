//! Exact and approximate comparison of a registered and an incoming document.

use serde::Serialize;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::article::Article;
use crate::types::Severity;

/// Fold a text for approximate comparison.
///
/// Accents are dropped, letters lower-cased, punctuation turned into
/// spaces and whitespace collapsed.
///
/// # Examples
/// ```
/// use sps_validator::reconcile::normalize_text;
///
/// assert_eq!(normalize_text("Conceição,  J."), "conceicao j");
/// ```
pub fn normalize_text(text: &str) -> String {
    let folded: String = text
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whether two texts are the same once folded, or close enough.
pub fn is_similar(a: &str, b: &str, threshold: f64) -> bool {
    let (a, b) = (normalize_text(a), normalize_text(b));
    if a == b {
        return true;
    }
    if a.is_empty() || b.is_empty() {
        return false;
    }
    strsim::normalized_levenshtein(&a, &b) >= threshold
}

/// A compared field whose values differ.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDifference {
    pub field: String,
    pub registered: String,
    pub incoming: String,
}

/// Whether an incoming document may take the place of a registered one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComparisonOutcome {
    pub approved: bool,
    pub severity: Severity,
    /// Fields that are not exactly equal, with both values.
    pub differences: Vec<FieldDifference>,
}

/// Compare titles and author surnames.
///
/// Identical values are approved as info, similar ones as a warning; any
/// field beyond the similarity threshold rejects the change.
pub fn compare_articles(registered: &Article, incoming: &Article, threshold: f64) -> ComparisonOutcome {
    let fields = [
        (
            "titles",
            registered.textual_titles(),
            incoming.textual_titles(),
        ),
        (
            "authors",
            registered.textual_contrib_surnames(),
            incoming.textual_contrib_surnames(),
        ),
    ];

    let differences: Vec<FieldDifference> = fields
        .iter()
        .filter(|(_, before, after)| before != after)
        .map(|(field, before, after)| FieldDifference {
            field: (*field).to_string(),
            registered: before.clone(),
            incoming: after.clone(),
        })
        .collect();

    let (approved, severity) = if differences.is_empty() {
        (true, Severity::Info)
    } else if differences
        .iter()
        .all(|d| is_similar(&d.registered, &d.incoming, threshold))
    {
        (true, Severity::Warning)
    } else {
        (false, Severity::Blocking)
    };

    ComparisonOutcome {
        approved,
        severity,
        differences,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_SIMILARITY_THRESHOLD;
    use crate::entities::{Contributor, PersonName, Title};
    use pretty_assertions::assert_eq;

    fn article(title: &str, surnames: &[&str]) -> Article {
        Article {
            titles: vec![Title {
                title: Some(title.to_string()),
                subtitle: None,
                language: Some("en".to_string()),
            }],
            contributors: surnames
                .iter()
                .map(|s| {
                    Contributor::Person(PersonName {
                        surname: (*s).to_string(),
                        ..PersonName::default()
                    })
                })
                .collect(),
            ..Article::default()
        }
    }

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text("  Árvore—de   Natal! "), "arvore de natal");
        assert_eq!(normalize_text(""), "");
    }

    #[test]
    fn test_is_similar() {
        assert!(is_similar("Müller", "Muller", DEFAULT_SIMILARITY_THRESHOLD));
        assert!(is_similar(
            "Soil carbon stocks in the Cerrado",
            "Soil carbon stock in the Cerrado",
            DEFAULT_SIMILARITY_THRESHOLD
        ));
        assert!(!is_similar("", "Title", DEFAULT_SIMILARITY_THRESHOLD));
        assert!(!is_similar(
            "Soil carbon stocks",
            "Malaria vectors in Amazonia",
            DEFAULT_SIMILARITY_THRESHOLD
        ));
    }

    #[test]
    fn test_identical_is_approved_as_info() {
        let a = article("Fish diversity", &["Silva", "Souza"]);
        let outcome = compare_articles(&a, &a.clone(), DEFAULT_SIMILARITY_THRESHOLD);
        assert!(outcome.approved);
        assert_eq!(outcome.severity, Severity::Info);
        assert!(outcome.differences.is_empty());
    }

    #[test]
    fn test_accent_only_change_is_a_warning() {
        let registered = article("Fish diversity", &["Conceicao", "Souza"]);
        let incoming = article("Fish diversity", &["Conceição", "Souza"]);
        let outcome = compare_articles(&registered, &incoming, DEFAULT_SIMILARITY_THRESHOLD);

        assert!(outcome.approved);
        assert_eq!(outcome.severity, Severity::Warning);
        assert_eq!(
            outcome.differences,
            vec![FieldDifference {
                field: "authors".to_string(),
                registered: "Conceicao | Souza".to_string(),
                incoming: "Conceição | Souza".to_string(),
            }]
        );
    }

    #[test]
    fn test_different_title_is_rejected() {
        let registered = article("Fish diversity in Amazonian rivers", &["Silva"]);
        let incoming = article("Vaccination coverage in children", &["Silva"]);
        let outcome = compare_articles(&registered, &incoming, DEFAULT_SIMILARITY_THRESHOLD);

        assert!(!outcome.approved);
        assert_eq!(outcome.severity, Severity::Blocking);
        assert_eq!(outcome.differences.len(), 1);
        assert_eq!(
            outcome.differences[0].registered,
            "Fish diversity in Amazonian rivers"
        );
        assert_eq!(
            outcome.differences[0].incoming,
            "Vaccination coverage in children"
        );
    }
}
