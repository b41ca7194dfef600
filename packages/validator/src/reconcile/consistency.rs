//! Package-wide value checks: flags, unique, common and required values.

use std::collections::{BTreeMap, BTreeSet};

use crate::article::{Article, SummaryField};
use crate::config::{ValidationMode, COMMON_FIELDS, REQUIRED_FIELDS, UNIQUE_FIELDS};
use crate::types::Severity;

use super::report::{ConflictGroup, DuplicateGroup, MissingValue, PackageFlags, ValueGroup};

/// Documents grouped by their value of `field`, absent values included.
pub fn value_groups(articles: &[&Article], field: SummaryField) -> Vec<ValueGroup> {
    let mut groups: BTreeMap<Option<String>, Vec<String>> = BTreeMap::new();
    for article in articles {
        groups
            .entry(article.summary(field))
            .or_default()
            .push(article.name.clone());
    }
    groups
        .into_iter()
        .map(|(value, documents)| ValueGroup { value, documents })
        .collect()
}

/// Publication flags of the package.
///
/// A rolling pass publishes documents of a regular issue one by one: some
/// carry an epub date while the issue dates are missing, disagree, or are
/// absent from some document.
pub fn package_flags(articles: &[&Article]) -> PackageFlags {
    let is_aop_issue = articles.iter().any(|a| a.is_ahead());

    let is_rolling_pass = !is_aop_issue && {
        let epub_dates: BTreeSet<String> = articles
            .iter()
            .filter_map(|a| a.dates.epub.as_ref())
            .map(|d| d.dateiso())
            .collect();
        let other_dates: BTreeSet<String> = articles
            .iter()
            .flat_map(|a| [a.dates.epub_ppub.as_ref(), a.dates.collection.as_ref()])
            .flatten()
            .map(|d| d.dateiso())
            .collect();
        let missing_collection = articles.iter().any(|a| a.dates.collection.is_none());

        !epub_dates.is_empty()
            && (other_dates.is_empty() || other_dates.len() > 1 || missing_collection)
    };

    PackageFlags {
        is_aop_issue,
        is_rolling_pass,
        is_processed_in_batches: is_aop_issue || is_rolling_pass,
    }
}

/// Severity of a shared value in a field that must be unique.
pub fn unique_value_severity(field: SummaryField, mode: ValidationMode) -> Severity {
    match field {
        SummaryField::Order if !mode.is_registration() => Severity::Warning,
        SummaryField::Order | SummaryField::Doi | SummaryField::ElocationId => Severity::Blocking,
        _ => Severity::Error,
    }
}

/// Values shared by more than one document. Absent values never count.
pub fn duplicated_values(articles: &[&Article], mode: ValidationMode) -> Vec<DuplicateGroup> {
    UNIQUE_FIELDS
        .iter()
        .filter_map(|&field| {
            let groups: Vec<ValueGroup> = value_groups(articles, field)
                .into_iter()
                .filter(|g| g.value.is_some() && g.documents.len() > 1)
                .collect();
            (!groups.is_empty()).then(|| DuplicateGroup {
                field: field.label().to_string(),
                severity: unique_value_severity(field, mode),
                groups,
            })
        })
        .collect()
}

/// Fields that differ between documents.
///
/// Issue dates only warn during a rolling pass; license differences always
/// warn.
pub fn conflicting_values(articles: &[&Article], flags: &PackageFlags) -> Vec<ConflictGroup> {
    COMMON_FIELDS
        .iter()
        .filter_map(|&field| {
            let groups = value_groups(articles, field);
            if groups.len() < 2 {
                return None;
            }
            let severity = match field {
                SummaryField::IssuePubDate if flags.is_rolling_pass => Severity::Warning,
                SummaryField::License => Severity::Warning,
                _ => Severity::Blocking,
            };
            Some(ConflictGroup {
                field: field.label().to_string(),
                severity,
                groups,
            })
        })
        .collect()
}

/// Required fields and the documents lacking them.
pub fn missing_values(articles: &[&Article]) -> Vec<MissingValue> {
    REQUIRED_FIELDS
        .iter()
        .filter_map(|&field| {
            let documents: Vec<String> = articles
                .iter()
                .filter(|a| a.summary(field).is_none())
                .map(|a| a.name.clone())
                .collect();
            (!documents.is_empty()).then(|| MissingValue {
                field: field.label().to_string(),
                documents,
            })
        })
        .collect()
}
