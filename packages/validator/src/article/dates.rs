//! History and publication dates.

use roxmltree::Node;
use serde::Serialize;

use crate::types::PartialDate;
use crate::xml::{child_element, node_text};

/// Read a `date` or `pub-date` element.
pub fn read_date(node: Node<'_, '_>) -> PartialDate {
    let number = |tag: &str| {
        child_element(node, tag).and_then(|child| node_text(child).parse::<u32>().ok())
    };

    PartialDate {
        year: child_element(node, "year").and_then(|child| node_text(child).parse().ok()),
        month: number("month"),
        day: number("day"),
        season: child_element(node, "season")
            .map(node_text)
            .filter(|s| !s.is_empty()),
    }
}

/// Dates of one article.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ArticleDates {
    pub received: Option<PartialDate>,
    pub accepted: Option<PartialDate>,
    pub epub: Option<PartialDate>,
    pub epub_ppub: Option<PartialDate>,
    pub collection: Option<PartialDate>,
}

impl ArticleDates {
    /// Issue date: epub-ppub, else collection, else epub.
    pub fn issue_pub_date(&self) -> Option<&PartialDate> {
        self.epub_ppub
            .as_ref()
            .or(self.collection.as_ref())
            .or(self.epub.as_ref())
    }

    /// Article date: the epub date when it carries a non-zero day.
    pub fn article_pub_date(&self) -> Option<&PartialDate> {
        self.epub.as_ref().filter(|d| d.has_day())
    }

    /// First publication date: epub, else epub-ppub, else collection.
    pub fn pub_date(&self) -> Option<&PartialDate> {
        self.epub
            .as_ref()
            .or(self.epub_ppub.as_ref())
            .or(self.collection.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roxmltree::Document;

    #[test]
    fn test_read_date() {
        let doc = Document::parse(
            "<pub-date><day>05</day><month>03</month><year>2024</year></pub-date>",
        )
        .unwrap();
        let date = read_date(doc.root_element());
        assert_eq!(date, PartialDate::new(Some(2024), Some(3), Some(5)));
    }

    #[test]
    fn test_read_date_with_season() {
        let doc =
            Document::parse("<pub-date><season>Jan-Mar</season><year>2024</year></pub-date>")
                .unwrap();
        let date = read_date(doc.root_element());
        assert_eq!(date.month, None);
        assert_eq!(date.season.as_deref(), Some("Jan-Mar"));
    }

    #[test]
    fn test_issue_date_precedence() {
        let epub = PartialDate::new(Some(2024), Some(2), Some(1));
        let collection = PartialDate::new(Some(2024), None, None);
        let mut dates = ArticleDates {
            epub: Some(epub.clone()),
            ..ArticleDates::default()
        };
        assert_eq!(dates.issue_pub_date(), Some(&epub));

        dates.collection = Some(collection.clone());
        assert_eq!(dates.issue_pub_date(), Some(&collection));
        assert_eq!(dates.pub_date(), Some(&epub));
    }

    #[test]
    fn test_article_date_requires_day() {
        let dates = ArticleDates {
            epub: Some(PartialDate::new(Some(2024), Some(2), Some(0))),
            ..ArticleDates::default()
        };
        assert!(dates.article_pub_date().is_none());
    }
}
