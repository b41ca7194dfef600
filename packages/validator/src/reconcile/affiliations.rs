//! Affiliation cross-reference tallies.

use std::collections::{BTreeSet, HashSet};

use serde::Serialize;

use crate::article::Article;
use crate::types::Severity;

use super::report::Finding;

const WITHOUT_AFF: &str = "authors without aff";
const MORE_THAN_ONE: &str = "authors with more than 1 affs";
const INVALID_XREF: &str = "authors with invalid xref[@ref-type=aff]";
const INCOMPLETE: &str = "incomplete affiliations";

/// Documents per affiliation problem, one entry per occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AffiliationTally {
    pub without_aff: Vec<String>,
    pub more_than_one: Vec<String>,
    pub invalid_xref: Vec<String>,
    pub incomplete: Vec<String>,
}

impl AffiliationTally {
    /// Tally every personal contributor and affiliation of `articles`.
    pub fn compile<'a>(articles: impl IntoIterator<Item = &'a Article>) -> Self {
        let mut tally = Self::default();

        for article in articles {
            let aff_ids: HashSet<&str> = article
                .affiliations
                .iter()
                .filter_map(|aff| aff.id.as_deref())
                .collect();

            for person in article.contrib_names() {
                if person.aff_xrefs.is_empty() {
                    tally.without_aff.push(article.name.clone());
                    continue;
                }
                if person
                    .aff_xrefs
                    .iter()
                    .any(|rid| !aff_ids.contains(rid.as_str()))
                {
                    tally.invalid_xref.push(article.name.clone());
                    continue;
                }
                let distinct: HashSet<&str> =
                    person.aff_xrefs.iter().map(String::as_str).collect();
                if distinct.len() > 1 {
                    tally.more_than_one.push(article.name.clone());
                }
            }

            for aff in &article.affiliations {
                if !aff.is_complete() {
                    tally.incomplete.push(article.name.clone());
                }
            }
        }
        tally
    }

    pub(crate) fn findings(&self) -> Vec<Finding> {
        [
            (WITHOUT_AFF, Severity::Warning, &self.without_aff),
            (INVALID_XREF, Severity::Error, &self.invalid_xref),
            (MORE_THAN_ONE, Severity::Info, &self.more_than_one),
            (INCOMPLETE, Severity::Warning, &self.incomplete),
        ]
        .into_iter()
        .filter(|(_, _, documents)| !documents.is_empty())
        .map(|(label, severity, documents)| {
            let unique: BTreeSet<String> = documents.iter().cloned().collect();
            Finding::affiliations(severity, &format!("{label} ({})", documents.len()), unique)
        })
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Affiliation, Contributor, PersonName};
    use pretty_assertions::assert_eq;

    fn person(xrefs: &[&str]) -> Contributor {
        Contributor::Person(PersonName {
            surname: "Silva".to_string(),
            aff_xrefs: xrefs.iter().map(|x| (*x).to_string()).collect(),
            ..PersonName::default()
        })
    }

    fn complete_aff(id: &str) -> Affiliation {
        Affiliation {
            id: Some(id.to_string()),
            orgname: Some("Universidade de São Paulo".to_string()),
            normalized_orgname: Some("Universidade de São Paulo".to_string()),
            city: Some("São Paulo".to_string()),
            state: Some("SP".to_string()),
            country_code: Some("BR".to_string()),
            country: Some("Brasil".to_string()),
            ..Affiliation::default()
        }
    }

    fn article(contributors: Vec<Contributor>, affiliations: Vec<Affiliation>) -> Article {
        Article {
            name: "a01".to_string(),
            contributors,
            affiliations,
            ..Article::default()
        }
    }

    #[test]
    fn test_two_valid_affiliations() {
        let doc = article(
            vec![person(&["aff1", "aff2"])],
            vec![complete_aff("aff1"), complete_aff("aff2")],
        );
        let tally = AffiliationTally::compile([&doc]);

        assert_eq!(tally.more_than_one, vec!["a01"]);
        assert!(tally.without_aff.is_empty());
        assert!(tally.invalid_xref.is_empty());
        assert!(tally.incomplete.is_empty());
    }

    #[test]
    fn test_without_and_invalid_xrefs() {
        let doc = article(
            vec![person(&[]), person(&["aff1", "aff9"]), person(&["aff1"])],
            vec![complete_aff("aff1")],
        );
        let tally = AffiliationTally::compile([&doc]);

        assert_eq!(tally.without_aff, vec!["a01"]);
        assert_eq!(tally.invalid_xref, vec!["a01"]);
        assert!(tally.more_than_one.is_empty());
    }

    #[test]
    fn test_incomplete_affiliation() {
        let mut aff = complete_aff("aff1");
        aff.city = None;
        let doc = article(vec![person(&["aff1"])], vec![aff]);
        let tally = AffiliationTally::compile([&doc]);

        assert_eq!(tally.incomplete, vec!["a01"]);
        let findings = tally.findings();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Warning);
    }
}
