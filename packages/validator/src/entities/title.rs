//! Title group extraction.

use roxmltree::Node;
use serde::Serialize;

use crate::xml::{element_lang, node_text_excluding, XmlNode};

/// A title with its optional subtitle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Title {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub language: Option<String>,
}

/// Accessors over a `title-group` or `trans-title-group` element.
pub struct TitleXml<'a, 'input> {
    node: Node<'a, 'input>,
    view: XmlNode<'a, 'input>,
}

impl<'a, 'input> TitleXml<'a, 'input> {
    pub fn new(node: Node<'a, 'input>) -> Self {
        Self {
            node,
            view: XmlNode::new(node),
        }
    }

    /// Text of the first matching element with cross-reference markers removed.
    fn first_without_xref(&self, paths: &[&str]) -> Option<String> {
        self.view
            .first(paths)
            .map(|node| node_text_excluding(node, &["xref"]))
    }

    pub fn article_title(&self) -> Option<String> {
        self.first_without_xref(&["article-title", "trans-title"])
    }

    pub fn subtitle(&self) -> Option<String> {
        self.first_without_xref(&["subtitle", "trans-subtitle"])
    }

    pub fn language(&self) -> Option<String> {
        element_lang(self.node)
    }

    pub fn to_title(&self) -> Title {
        Title {
            title: self.article_title(),
            subtitle: self.subtitle(),
            language: self.language(),
        }
    }
}
