//! Overview of the references cited across a package.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::article::Article;
use crate::config::BIBLIOMETRICS_USE;
use crate::types::Severity;

use super::report::Finding;

/// Where a reference was found, with the value being reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferenceLocation {
    pub document: String,
    pub reference_id: Option<String>,
    pub value: Option<String>,
}

impl ReferenceLocation {
    fn describe(&self) -> String {
        let mut parts = vec![
            self.document.clone(),
            self.reference_id.clone().unwrap_or_else(|| "None".to_string()),
        ];
        parts.extend(self.value.clone());
        parts.join(" - ")
    }
}

/// Publication type used when a reference declares none.
const UNTYPED: &str = "None";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReferenceOverview {
    /// Number of references per publication type.
    pub by_type: BTreeMap<String, usize>,
    /// Sources cited under more than one publication type, with `document: id` per type.
    pub sources_with_multiple_types: BTreeMap<String, BTreeMap<String, Vec<String>>>,
    pub missing_source: Vec<ReferenceLocation>,
    pub missing_year: Vec<ReferenceLocation>,
    pub unusual_sources: Vec<ReferenceLocation>,
    pub unusual_years: Vec<ReferenceLocation>,
}

impl ReferenceOverview {
    /// Compile the references of `articles`.
    ///
    /// Source and year are only required from publication types that feed
    /// bibliometric indicators.
    pub fn compile<'a>(articles: impl IntoIterator<Item = &'a Article>) -> Self {
        let mut overview = Self::default();
        let mut source_types: BTreeMap<String, BTreeMap<String, Vec<String>>> = BTreeMap::new();

        for article in articles {
            for reference in &article.references {
                let pub_type = reference
                    .publication_type
                    .clone()
                    .unwrap_or_else(|| UNTYPED.to_string());
                let cited_at = format!(
                    "{}: {}",
                    article.name,
                    reference.id.as_deref().unwrap_or("None")
                );
                *overview.by_type.entry(pub_type.clone()).or_insert(0) += 1;

                if let Some(source) = &reference.source {
                    source_types
                        .entry(source.clone())
                        .or_default()
                        .entry(pub_type.clone())
                        .or_default()
                        .push(cited_at);
                }

                if !BIBLIOMETRICS_USE.contains(&pub_type.as_str()) {
                    continue;
                }
                let location = |value: Option<&String>| ReferenceLocation {
                    document: article.name.clone(),
                    reference_id: reference.id.clone(),
                    value: value.cloned(),
                };

                match &reference.year {
                    None => overview.missing_year.push(location(None)),
                    Some(year) if !is_digits(year) => {
                        overview.unusual_years.push(location(Some(year)));
                    }
                    Some(_) => {}
                }
                match &reference.source {
                    None => overview.missing_source.push(location(None)),
                    Some(source) if is_digits(source) => {
                        overview.unusual_sources.push(location(Some(source)));
                    }
                    Some(_) => {}
                }
            }
        }

        overview.sources_with_multiple_types = source_types
            .into_iter()
            .filter(|(_, types)| types.len() > 1)
            .collect();
        overview
    }

    pub fn total(&self) -> usize {
        self.by_type.values().sum()
    }

    pub(crate) fn findings(&self) -> Vec<Finding> {
        let mut findings = Vec::new();
        if !self.by_type.is_empty() {
            findings.push(Finding::references(
                Severity::Info,
                "references by type",
                self.by_type
                    .iter()
                    .map(|(pub_type, count)| format!("{pub_type}: {count}")),
            ));
        }
        if !self.sources_with_multiple_types.is_empty() {
            findings.push(Finding::references(
                Severity::Error,
                "same sources as different types references",
                self.sources_with_multiple_types.iter().map(|(source, types)| {
                    let types: Vec<&str> = types.keys().map(String::as_str).collect();
                    format!("{source}: {}", types.join(", "))
                }),
            ));
        }

        let located = [
            ("references missing source", &self.missing_source),
            ("references missing year", &self.missing_year),
            ("references with unusual value for source", &self.unusual_sources),
            ("references with unusual value for year", &self.unusual_years),
        ];
        for (label, locations) in located {
            if !locations.is_empty() {
                findings.push(Finding::references(
                    Severity::Error,
                    label,
                    locations.iter().map(ReferenceLocation::describe),
                ));
            }
        }
        findings
    }
}

fn is_digits(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c.is_ascii_digit())
}
