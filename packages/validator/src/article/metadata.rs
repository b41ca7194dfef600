//! Journal metadata, licenses, related articles and other article parts.

use std::collections::BTreeMap;

use roxmltree::Node;
use serde::Serialize;

use crate::config::RELATED_ARTICLE_TYPES;
use crate::entities::{Contributor, Title};
use crate::types::LangText;
use crate::xml::{element_lang, raw_xml, xlink_href, XmlNode};

const CC_LICENSES: &str = "creativecommons.org/licenses/";

/// The `journal-meta` block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct JournalMeta {
    pub title: Option<String>,
    pub abbrev_title: Option<String>,
    pub publisher_name: Option<String>,
    pub publisher_id: Option<String>,
    pub nlm_ta: Option<String>,
    /// ISSNs keyed by `pub-type`, `epub` when the attribute is missing.
    pub issns: BTreeMap<String, String>,
}

impl JournalMeta {
    pub fn from_node(node: Option<Node<'_, '_>>) -> Self {
        let Some(node) = node else {
            return Self::default();
        };
        let view = XmlNode::new(node);

        let issns = view
            .nodes_data(&["issn"])
            .into_iter()
            .map(|data| {
                let pub_type = data.attribute("pub-type").unwrap_or("epub").to_string();
                (pub_type, data.text)
            })
            .collect();

        Self {
            title: view.first_text(&[".//journal-title"]),
            abbrev_title: view.first_text(&[".//abbrev-journal-title"]),
            publisher_name: view.first_text(&[".//publisher-name"]),
            publisher_id: view.first_text(&["journal-id[@journal-id-type=\"publisher-id\"]"]),
            nlm_ta: view.first_text(&["journal-id[@journal-id-type=\"nlm-ta\"]"]),
            issns,
        }
    }

    pub fn print_issn(&self) -> Option<&str> {
        self.issns.get("ppub").map(String::as_str)
    }

    pub fn e_issn(&self) -> Option<&str> {
        self.issns.get("epub").map(String::as_str)
    }

    /// All ISSNs as `type:value` pairs joined by commas.
    pub fn issn_summary(&self) -> Option<String> {
        if self.issns.is_empty() {
            return None;
        }
        Some(
            self.issns
                .iter()
                .map(|(pub_type, issn)| format!("{pub_type}:{issn}"))
                .collect::<Vec<_>>()
                .join(","),
        )
    }
}

/// Creative Commons code and version, such as `by/4.0` or `by-nc/3.0/igo`.
///
/// # Examples
/// ```
/// use sps_validator::article::license_code_and_version;
///
/// assert_eq!(
///     license_code_and_version("http://creativecommons.org/licenses/by/4.0/"),
///     Some("by/4.0".to_string())
/// );
/// assert_eq!(
///     license_code_and_version("https://creativecommons.org/licenses/by-nc/3.0/igo/"),
///     Some("by-nc/3.0/igo".to_string())
/// );
/// assert_eq!(license_code_and_version("https://example.org/license"), None);
/// ```
pub fn license_code_and_version(href: &str) -> Option<String> {
    let start = href.find(CC_LICENSES)? + CC_LICENSES.len();
    let tail = href[start..].to_lowercase();

    if let Some(pos) = tail.find("igo") {
        return Some(tail[..pos + "igo".len()].to_string());
    }
    let mut parts = tail.split('/');
    match (parts.next(), parts.next()) {
        (Some(code), Some(version)) => Some(format!("{code}/{version}")),
        _ => None,
    }
}

/// One `license` element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct License {
    pub language: Option<String>,
    pub href: Option<String>,
    pub code_and_version: Option<String>,
    pub license_type: Option<String>,
    pub text: Option<String>,
    #[serde(skip)]
    pub xml: String,
}

impl License {
    pub fn from_node(node: Node<'_, '_>) -> Self {
        let href = xlink_href(node).map(str::to_string);
        Self {
            language: element_lang(node),
            code_and_version: href.as_deref().and_then(license_code_and_version),
            href,
            license_type: node.attribute("license-type").map(str::to_string),
            text: XmlNode::new(node).first_text(&[".//license-p"]),
            xml: raw_xml(node).to_string(),
        }
    }
}

/// One `related-article` element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RelatedArticle {
    pub href: Option<String>,
    pub related_article_type: Option<String>,
    pub ext_link_type: Option<String>,
    pub id: Option<String>,
    #[serde(skip)]
    pub xml: String,
}

impl RelatedArticle {
    /// Read the element.
    ///
    /// `scielo-pid` links are reported as `pid`. Outside the known
    /// related-article types only the digits of `id` are kept.
    pub fn from_node(node: Node<'_, '_>) -> Self {
        let related_article_type = node.attribute("related-article-type").map(str::to_string);
        let ext_link_type = node.attribute("ext-link-type").map(|t| match t {
            "scielo-pid" => "pid".to_string(),
            other => other.to_string(),
        });

        let known_type = related_article_type
            .as_deref()
            .is_some_and(|t| RELATED_ARTICLE_TYPES.contains(&t));
        let id = node.attribute("id").map(|id| {
            if known_type {
                id.to_string()
            } else {
                id.chars().filter(char::is_ascii_digit).collect()
            }
        });

        Self {
            href: xlink_href(node).map(str::to_string),
            related_article_type,
            ext_link_type,
            id,
            xml: raw_xml(node).to_string(),
        }
    }
}

/// A top-level body section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Section {
    pub sec_type: Option<String>,
    pub title: Option<String>,
}

/// Sections of one body, with the scope it belongs to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SectionGroup {
    /// `article`, or `sub-article/[@id="..."]` for translations.
    pub scope: String,
    pub sections: Vec<Section>,
}

impl SectionGroup {
    pub fn from_body(scope: String, body: Option<Node<'_, '_>>) -> Self {
        let sections = body
            .map(|body| {
                XmlNode::new(body)
                    .nodes(&["sec"])
                    .into_iter()
                    .map(|sec| Section {
                        sec_type: sec.attribute("sec-type").map(str::to_string),
                        title: XmlNode::new(sec).first_text(&["title"]),
                    })
                    .collect()
            })
            .unwrap_or_default();
        Self { scope, sections }
    }
}

/// A footnote with the scope it was found in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Footnote {
    pub scope: String,
    pub xml: String,
}

/// Scope label of a translation sub-article.
pub fn sub_article_scope(node: Node<'_, '_>) -> String {
    format!(
        "sub-article/[@id=\"{}\"]",
        node.attribute("id").unwrap_or("None")
    )
}

/// A translation sub-article or a response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SubDocument {
    pub id: Option<String>,
    /// `article-type` of a sub-article, `response-type` of a response.
    pub article_type: Option<String>,
    pub language: Option<String>,
    pub titles: Vec<Title>,
    pub abstracts: Vec<LangText>,
    pub keywords: Vec<LangText>,
    pub contributors: Vec<Contributor>,
}

/// Counts declared in `article-meta/counts`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeclaredCounts {
    pub pages: Option<String>,
    pub references: Option<String>,
    pub tables: Option<String>,
    pub figures: Option<String>,
    pub equations: Option<String>,
}

impl DeclaredCounts {
    pub fn from_node(article_meta: Option<Node<'_, '_>>) -> Self {
        let Some(node) = article_meta else {
            return Self::default();
        };
        let view = XmlNode::new(node);
        let count = |tag: &str| {
            let path = format!(".//{tag}");
            view.first(&[path.as_str()])
                .and_then(|n| n.attribute("count"))
                .map(str::to_string)
        };
        Self {
            pages: count("page-count"),
            references: count("ref-count"),
            tables: count("table-count"),
            figures: count("fig-count"),
            equations: count("equation-count"),
        }
    }
}
