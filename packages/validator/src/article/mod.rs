//! The article model: one document's metadata plus derived values.
//!
//! An [`Article`] is built once from a parsed tree and owns everything it
//! holds; the tree can be dropped right after construction.

mod dates;
mod extract;
mod issue;
mod metadata;
mod order;

use std::collections::BTreeMap;

use serde::Serialize;

use crate::citation::CitationRange;
use crate::entities::{Affiliation, Contributor, PersonName, Reference, TableParent, Title};
use crate::types::{days_between, LangText, PartialDate};

pub use dates::{read_date, ArticleDates};
pub use issue::{normalize_number, split_issue, IssueParts, RawIssue, AHEAD};
pub use metadata::{
    license_code_and_version, sub_article_scope, DeclaredCounts, Footnote, JournalMeta, License,
    RelatedArticle, Section, SectionGroup, SubDocument,
};
pub use order::Order;

/// One scholarly document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Article {
    /// File name without the `.xml` extension.
    pub name: String,
    /// Assigned by the registry, never read from the markup.
    pub pid: Option<String>,

    pub doi: Option<String>,
    pub publisher_id: Option<String>,
    pub article_id_other: Option<String>,
    pub order: Order,
    pub previous_pid: Option<String>,
    pub marked_to_delete: bool,

    pub article_type: Option<String>,
    pub language: Option<String>,
    pub dtd_version: Option<String>,
    pub sps_version: Option<String>,

    pub journal: JournalMeta,

    pub volume: Option<String>,
    pub issue: Option<String>,
    pub issue_parts: IssueParts,
    pub supplement: Option<String>,
    pub fpage: Option<String>,
    pub fpage_seq: Option<String>,
    pub lpage: Option<String>,
    pub elocation_id: Option<String>,
    pub toc_section: Option<String>,

    pub titles: Vec<Title>,
    pub abstracts: Vec<LangText>,
    pub keywords: Vec<LangText>,

    /// Contributors of the article and of its non-translation sub-articles.
    pub contributors: Vec<Contributor>,
    pub affiliations: Vec<Affiliation>,
    pub references: Vec<Reference>,
    pub translations: Vec<SubDocument>,
    pub responses: Vec<SubDocument>,

    pub sections: Vec<SectionGroup>,
    pub licenses: Vec<License>,
    pub related_articles: Vec<RelatedArticle>,
    pub tables: Vec<TableParent>,
    pub footnotes: Vec<Footnote>,
    pub financial_disclosure: Vec<String>,

    pub dates: ArticleDates,
    pub counts: DeclaredCounts,
    pub citation_ranges: BTreeMap<String, Vec<CitationRange>>,
}

/// Values compared across every document of a package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SummaryField {
    JournalTitle,
    JournalIdPublisherId,
    JournalIdNlmTa,
    JournalIssn,
    PrintIssn,
    EIssn,
    PublisherName,
    IssueLabel,
    IssuePubDate,
    Order,
    Doi,
    PageKey,
    Fpage,
    Lpage,
    ElocationId,
    License,
}

impl SummaryField {
    pub fn label(&self) -> &'static str {
        match self {
            Self::JournalTitle => "journal-title",
            Self::JournalIdPublisherId => "journal-id (publisher-id)",
            Self::JournalIdNlmTa => "journal-id (nlm-ta)",
            Self::JournalIssn => "journal ISSN",
            Self::PrintIssn => "print ISSN",
            Self::EIssn => "e-ISSN",
            Self::PublisherName => "publisher name",
            Self::IssueLabel => "issue label",
            Self::IssuePubDate => "issue pub date",
            Self::Order => "order",
            Self::Doi => "doi",
            Self::PageKey => "fpage-lpage-seq-elocation-id",
            Self::Fpage => "fpage",
            Self::Lpage => "lpage",
            Self::ElocationId => "elocation id",
            Self::License => "license",
        }
    }
}

fn group_by_lang<T>(
    items: impl IntoIterator<Item = T>,
    lang: impl Fn(&T) -> Option<String>,
) -> BTreeMap<Option<String>, Vec<T>> {
    let mut grouped: BTreeMap<Option<String>, Vec<T>> = BTreeMap::new();
    for item in items {
        grouped.entry(lang(&item)).or_default().push(item);
    }
    grouped
}

impl Article {
    /// No volume and no usable issue number.
    pub fn is_ahead(&self) -> bool {
        self.volume.is_none() && self.issue_parts.is_ahead_number()
    }

    /// Published online only: an epub date and no issue date.
    pub fn is_epub_only(&self) -> bool {
        self.dates.epub.is_some()
            && !self.is_ahead()
            && self.dates.epub_ppub.is_none()
            && self.dates.collection.is_none()
    }

    pub fn is_issue_press_release(&self) -> bool {
        self.issue_parts.compl.as_deref() == Some("pr")
    }

    pub fn is_article_press_release(&self) -> bool {
        self.article_type.as_deref() == Some("in-brief") && !self.related_articles.is_empty()
    }

    pub fn issue_pub_date(&self) -> Option<&PartialDate> {
        self.dates.issue_pub_date()
    }

    pub fn article_pub_date(&self) -> Option<&PartialDate> {
        self.dates.article_pub_date()
    }

    pub fn pub_date(&self) -> Option<&PartialDate> {
        self.dates.pub_date()
    }

    /// `v12n3s1`, or `2024nahead` for ahead-of-print documents.
    pub fn issue_label(&self) -> String {
        let year = self.issue_pub_date().and_then(|d| d.year);
        self.issue_parts.label(year, self.volume.as_deref())
    }

    /// `fpage-lpage` with whichever parts are present.
    pub fn page_range(&self) -> Option<String> {
        let parts: Vec<&str> = [self.fpage.as_deref(), self.lpage.as_deref()]
            .into_iter()
            .flatten()
            .collect();
        (!parts.is_empty()).then(|| parts.join("-"))
    }

    /// Page range and e-location joined by `; `.
    pub fn pages(&self) -> String {
        [self.page_range(), self.elocation_id.clone()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join("; ")
    }

    pub fn fpage_number(&self) -> Option<u32> {
        digits_number(self.fpage.as_deref())
    }

    pub fn lpage_number(&self) -> Option<u32> {
        digits_number(self.lpage.as_deref())
    }

    /// Number of pages, `1` when the range is not numeric.
    pub fn total_of_pages(&self) -> i64 {
        match (self.fpage_number(), self.lpage_number()) {
            (Some(f), Some(l)) => i64::from(l) - i64::from(f) + 1,
            _ => 1,
        }
    }

    /// Main title per language, later titles replacing earlier ones.
    pub fn article_titles(&self) -> BTreeMap<Option<String>, String> {
        self.titles
            .iter()
            .filter_map(|t| Some((t.language.clone(), t.title.clone()?)))
            .collect()
    }

    /// Titles ordered by language and joined by ` | `.
    pub fn textual_titles(&self) -> String {
        self.article_titles()
            .into_values()
            .collect::<Vec<_>>()
            .join(" | ")
    }

    /// Personal contributors.
    pub fn contrib_names(&self) -> impl Iterator<Item = &PersonName> {
        self.contributors.iter().filter_map(Contributor::as_person)
    }

    pub fn textual_contrib_surnames(&self) -> String {
        self.contrib_names()
            .map(|p| p.surname.as_str())
            .collect::<Vec<_>>()
            .join(" | ")
    }

    /// Surname of the first personal contributor, suffix included.
    pub fn first_author_surname(&self) -> Option<String> {
        self.contrib_names().next().map(|p| match &p.suffix {
            Some(suffix) => format!("{} {suffix}", p.surname),
            None => p.surname.clone(),
        })
    }

    /// Days from received to accepted.
    pub fn history_days(&self) -> Option<i64> {
        days_between(self.dates.received.as_ref()?, self.dates.accepted.as_ref()?)
    }

    /// Days from acceptance to the article date, else to the issue date.
    pub fn publication_days(&self) -> Option<i64> {
        let accepted = self.dates.accepted.as_ref()?;
        let published = self.article_pub_date().or(self.issue_pub_date())?;
        days_between(accepted, published)
    }

    pub fn titles_by_lang(&self) -> BTreeMap<Option<String>, Vec<&Title>> {
        group_by_lang(&self.titles, |t| t.language.clone())
    }

    pub fn abstracts_by_lang(&self) -> BTreeMap<Option<String>, Vec<&LangText>> {
        group_by_lang(&self.abstracts, |t| t.language.clone())
    }

    pub fn keywords_by_lang(&self) -> BTreeMap<Option<String>, Vec<&LangText>> {
        group_by_lang(&self.keywords, |t| t.language.clone())
    }

    /// Languages of translation sub-articles.
    pub fn trans_languages(&self) -> Vec<Option<&str>> {
        self.translations
            .iter()
            .map(|t| t.language.as_deref())
            .collect()
    }

    /// Href of the first license.
    pub fn license_href(&self) -> Option<&str> {
        self.licenses.first().and_then(|l| l.href.as_deref())
    }

    /// The value of `field` compared across the package.
    pub fn summary(&self, field: SummaryField) -> Option<String> {
        match field {
            SummaryField::JournalTitle => self.journal.title.clone(),
            SummaryField::JournalIdPublisherId => self.journal.publisher_id.clone(),
            SummaryField::JournalIdNlmTa => self.journal.nlm_ta.clone(),
            SummaryField::JournalIssn => self.journal.issn_summary(),
            SummaryField::PrintIssn => self.journal.print_issn().map(str::to_string),
            SummaryField::EIssn => self.journal.e_issn().map(str::to_string),
            SummaryField::PublisherName => self.journal.publisher_name.clone(),
            SummaryField::IssueLabel => Some(self.issue_label()),
            SummaryField::IssuePubDate => self
                .issue_pub_date()
                .map(|d| d.dateiso()[..4].to_string()),
            SummaryField::Order => Some(self.order.to_string()),
            SummaryField::Doi => self.doi.clone(),
            SummaryField::PageKey => self.page_key(),
            SummaryField::Fpage => self.fpage.clone(),
            SummaryField::Lpage => self.lpage.clone(),
            SummaryField::ElocationId => self.elocation_id.clone(),
            SummaryField::License => self.license_href().map(str::to_string),
        }
    }

    /// `fpage-lpage-seq-elocation-id`, missing parts written as `None`.
    fn page_key(&self) -> Option<String> {
        let parts = [
            self.fpage.as_deref(),
            self.lpage.as_deref(),
            self.fpage_seq.as_deref(),
            self.elocation_id.as_deref(),
        ];
        if parts.iter().all(Option::is_none) {
            return None;
        }
        Some(
            parts
                .iter()
                .map(|p| p.unwrap_or("None"))
                .collect::<Vec<_>>()
                .join("-"),
        )
    }
}

fn digits_number(value: Option<&str>) -> Option<u32> {
    value
        .filter(|v| !v.is_empty() && v.chars().all(|c| c.is_ascii_digit()))
        .and_then(|v| v.parse().ok())
}
