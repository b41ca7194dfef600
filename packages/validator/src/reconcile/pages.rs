//! Page continuity across the documents of an issue.

use std::fmt;

use serde::Serialize;

use crate::article::Article;
use crate::types::Severity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PageIssueKind {
    NoPagination,
    NonNumericPagination,
    Overlap,
    SamePage,
    Gap,
    InvalidPageRange,
}

impl fmt::Display for PageIssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::NoPagination => "no pagination was found",
            Self::NonNumericPagination => "pagination is not numeric",
            Self::Overlap => "Invalid pages",
            Self::SamePage => "lpage and fpage are the same",
            Self::Gap => "there is a gap between lpage and fpage",
            Self::InvalidPageRange => "Invalid page range",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageIssue {
    pub kind: PageIssueKind,
    pub severity: Severity,
    pub documents: Vec<String>,
    pub values: Vec<String>,
}

/// Pagination of one document and what is wrong with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageCheck {
    pub name: String,
    pub pages: String,
    pub issues: Vec<PageIssue>,
}

impl PageCheck {
    /// The worst issue, if any.
    pub fn severity(&self) -> Option<Severity> {
        self.issues.iter().map(|i| i.severity).max()
    }
}

/// Last numeric page range seen.
struct Previous<'a> {
    article: &'a Article,
    lpage: u32,
}

/// Check pagination of `articles`, which must be sorted by order and name.
///
/// Only documents whose first and last pages are both numeric take part
/// in the continuity comparison.
pub fn check_pages(articles: &[&Article]) -> Vec<PageCheck> {
    let mut previous: Option<Previous<'_>> = None;
    let mut checks = Vec::with_capacity(articles.len());

    for &article in articles {
        let mut issues = Vec::new();
        let pages = article.pages();

        if pages.is_empty() {
            issues.push(PageIssue {
                kind: PageIssueKind::NoPagination,
                severity: if article.is_ahead() {
                    Severity::Info
                } else {
                    Severity::Error
                },
                documents: vec![article.name.clone()],
                values: Vec::new(),
            });
        }

        let has_text_pages = [article.fpage.as_deref(), article.lpage.as_deref()]
            .into_iter()
            .flatten()
            .any(|p| p.is_empty() || !p.chars().all(|c| c.is_ascii_digit()));
        if has_text_pages {
            issues.push(PageIssue {
                kind: PageIssueKind::NonNumericPagination,
                severity: Severity::Info,
                documents: vec![article.name.clone()],
                values: vec![pages.clone()],
            });
        }

        if let (Some(fpage), Some(lpage)) = (article.fpage_number(), article.lpage_number()) {
            if let Some(prev) = &previous {
                let pair = || {
                    (
                        vec![prev.article.name.clone(), article.name.clone()],
                        vec![format!("lpage={}", prev.lpage), format!("fpage={fpage}")],
                    )
                };
                let found = if prev.lpage > fpage {
                    let severity = if prev.article.is_epub_only() || article.is_epub_only() {
                        Severity::Warning
                    } else {
                        Severity::Blocking
                    };
                    Some((PageIssueKind::Overlap, severity))
                } else if prev.lpage == fpage {
                    Some((PageIssueKind::SamePage, Severity::Warning))
                } else if prev.lpage.saturating_add(1) < fpage {
                    Some((PageIssueKind::Gap, Severity::Warning))
                } else {
                    None
                };
                if let Some((kind, severity)) = found {
                    let (documents, values) = pair();
                    issues.push(PageIssue {
                        kind,
                        severity,
                        documents,
                        values,
                    });
                }
            }

            if fpage > lpage {
                issues.push(PageIssue {
                    kind: PageIssueKind::InvalidPageRange,
                    severity: Severity::Blocking,
                    documents: vec![article.name.clone()],
                    values: vec![format!("fpage={fpage}"), format!("lpage={lpage}")],
                });
            }

            previous = Some(Previous { article, lpage });
        }

        checks.push(PageCheck {
            name: article.name.clone(),
            pages,
            issues,
        });
    }
    checks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::article::{ArticleDates, IssueParts};
    use crate::types::PartialDate;
    use pretty_assertions::assert_eq;

    fn paged(name: &str, fpage: &str, lpage: &str) -> Article {
        Article {
            name: name.to_string(),
            volume: Some("10".to_string()),
            issue_parts: IssueParts::resolve(Some("1"), Some("10")),
            fpage: Some(fpage.to_string()),
            lpage: Some(lpage.to_string()),
            ..Article::default()
        }
    }

    fn epub_only(mut article: Article) -> Article {
        article.dates = ArticleDates {
            epub: Some(PartialDate::new(Some(2024), Some(1), Some(5))),
            ..ArticleDates::default()
        };
        article
    }

    #[test]
    fn test_continuous_pages_have_no_issues() {
        let a = paged("a", "1", "10");
        let b = paged("b", "11", "20");
        let checks = check_pages(&[&a, &b]);
        assert!(checks.iter().all(|c| c.issues.is_empty()));
    }

    #[test]
    fn test_overlap_is_blocking() {
        let a = paged("a", "100", "110");
        let b = paged("b", "108", "120");
        let checks = check_pages(&[&a, &b]);

        assert_eq!(checks[1].severity(), Some(Severity::Blocking));
        let issue = &checks[1].issues[0];
        assert_eq!(issue.kind, PageIssueKind::Overlap);
        assert_eq!(issue.documents, vec!["a", "b"]);
        assert_eq!(issue.values, vec!["lpage=110", "fpage=108"]);
    }

    #[test]
    fn test_overlap_of_epub_only_document_is_a_warning() {
        let a = paged("a", "100", "110");
        let b = epub_only(paged("b", "108", "120"));
        let checks = check_pages(&[&a, &b]);
        assert_eq!(checks[1].severity(), Some(Severity::Warning));
    }

    #[test]
    fn test_same_page_and_gap() {
        let a = paged("a", "1", "10");
        let b = paged("b", "10", "15");
        let c = paged("c", "20", "25");
        let checks = check_pages(&[&a, &b, &c]);

        assert_eq!(checks[1].issues[0].kind, PageIssueKind::SamePage);
        assert_eq!(checks[2].issues[0].kind, PageIssueKind::Gap);
        assert_eq!(checks[2].severity(), Some(Severity::Warning));
    }

    #[test]
    fn test_invalid_page_range() {
        let a = paged("a", "30", "20");
        let checks = check_pages(&[&a]);
        assert_eq!(checks[0].issues[0].kind, PageIssueKind::InvalidPageRange);
        assert_eq!(checks[0].severity(), Some(Severity::Blocking));
    }

    #[test]
    fn test_no_pagination() {
        let regular = Article {
            name: "a".to_string(),
            volume: Some("10".to_string()),
            issue_parts: IssueParts::resolve(Some("1"), Some("10")),
            ..Article::default()
        };
        let ahead = Article {
            name: "b".to_string(),
            issue_parts: IssueParts::resolve(None, None),
            ..Article::default()
        };
        let checks = check_pages(&[&regular, &ahead]);

        assert_eq!(checks[0].severity(), Some(Severity::Error));
        assert_eq!(checks[1].severity(), Some(Severity::Info));
    }

    #[test]
    fn test_non_numeric_pages_are_not_compared() {
        let a = paged("a", "100", "110");
        let b = paged("b", "iv", "x");
        let c = paged("c", "111", "115");
        let checks = check_pages(&[&a, &b, &c]);

        assert_eq!(checks[1].issues[0].kind, PageIssueKind::NonNumericPagination);
        assert!(checks[2].issues.is_empty());
    }

    #[test]
    fn test_empty_page_element_is_not_numeric() {
        let a = paged("a", "1", "10");
        let b = paged("b", "", "20");
        let checks = check_pages(&[&a, &b]);

        assert_eq!(checks[1].issues.len(), 1);
        assert_eq!(checks[1].issues[0].kind, PageIssueKind::NonNumericPagination);
        assert_eq!(checks[1].issues[0].values, vec!["-20"]);
    }
}
