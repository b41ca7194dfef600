//! Bibliographic reference (`ref`) extraction.

use std::collections::BTreeMap;

use roxmltree::Node;
use serde::Serialize;

use crate::xml::{element_lang, local_name, XmlNode};

use super::contributor::{ContribXml, Contributor};

/// Authors of a reference sharing one `person-group-type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorGroup {
    pub role: String,
    pub authors: Vec<Contributor>,
}

/// One `ref` of the reference list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Reference {
    pub id: Option<String>,
    pub language: Option<String>,
    pub publication_type: Option<String>,
    pub status: Option<String>,
    pub source: Option<String>,
    pub article_title: Option<String>,
    pub chapter_title: Option<String>,
    pub trans_title: Option<String>,
    pub trans_title_language: Option<String>,
    pub year: Option<String>,
    pub author_groups: Vec<AuthorGroup>,
    pub volume: Option<String>,
    pub issue: Option<String>,
    pub supplement: Option<String>,
    pub edition: Option<String>,
    pub version: Option<String>,
    pub publisher_name: Option<String>,
    pub publisher_loc: Option<String>,
    pub fpage: Option<String>,
    pub lpage: Option<String>,
    pub page_range: Option<String>,
    pub elocation_id: Option<String>,
    pub label: Option<String>,
    pub etal: bool,
    pub cited_date: Option<String>,
    pub ext_link: Option<String>,
    pub comments: Vec<String>,
    pub notes: Option<String>,
    pub contract_number: Option<String>,
    pub doi: Option<String>,
    pub pmid: Option<String>,
    pub pmcid: Option<String>,
    pub conference_name: Option<String>,
    pub conference_location: Option<String>,
    pub conference_date: Option<String>,
    pub mixed_citation: Option<String>,
}

impl Reference {
    pub fn fpage_number(&self) -> Option<u32> {
        self.fpage.as_deref().and_then(|p| p.parse().ok())
    }

    pub fn lpage_number(&self) -> Option<u32> {
        self.lpage.as_deref().and_then(|p| p.parse().ok())
    }

    /// All authors across person groups, in order.
    pub fn authors(&self) -> impl Iterator<Item = &Contributor> {
        self.author_groups.iter().flat_map(|g| g.authors.iter())
    }
}

/// Accessors over a `ref` element.
///
/// Structured fields are read from the `element-citation` children.
pub struct ReferenceXml<'a, 'input> {
    node: Node<'a, 'input>,
    view: XmlNode<'a, 'input>,
    citations: Vec<XmlNode<'a, 'input>>,
}

impl<'a, 'input> ReferenceXml<'a, 'input> {
    pub fn new(node: Node<'a, 'input>) -> Self {
        let view = XmlNode::new(node);
        let citations = view
            .nodes(&[".//element-citation"])
            .into_iter()
            .map(XmlNode::new)
            .collect();
        Self {
            node,
            view,
            citations,
        }
    }

    fn citation_nodes(&self, paths: &[&str]) -> Vec<Node<'a, 'input>> {
        self.citations.iter().flat_map(|c| c.nodes(paths)).collect()
    }

    fn citation_text(&self, paths: &[&str]) -> Option<String> {
        self.citations.iter().find_map(|c| c.first_text(paths))
    }

    fn citation_attribute(&self, name: &str) -> Option<String> {
        self.citations
            .iter()
            .find_map(|c| c.attribute(name))
            .map(str::to_string)
    }

    pub fn id(&self) -> Option<String> {
        self.node.attribute("id").map(str::to_string)
    }

    /// Language of the source or of the first title carrying one.
    pub fn language(&self) -> Option<String> {
        [".//source", ".//article-title", ".//chapter-title"]
            .into_iter()
            .filter_map(|path| self.view.first(&[path]))
            .find_map(|node| node.attribute((roxmltree::NS_XML_URI, "lang")))
            .map(str::to_string)
    }

    pub fn publication_type(&self) -> Option<String> {
        self.citation_attribute("publication-type")
    }

    pub fn source(&self) -> Option<String> {
        self.citation_text(&[".//source"])
    }

    pub fn year(&self) -> Option<String> {
        self.citation_text(&[".//year"])
    }

    pub fn author_groups(&self) -> Vec<AuthorGroup> {
        self.citation_nodes(&[".//person-group"])
            .into_iter()
            .map(|group| {
                let role = group
                    .attribute("person-group-type")
                    .unwrap_or("author")
                    .to_string();
                let authors = group
                    .children()
                    .filter(|child| child.is_element() && local_name(*child) != "etal")
                    .filter_map(|child| {
                        ContribXml::new(child).contributor_with_role(Some(role.clone()))
                    })
                    .collect();
                AuthorGroup { role, authors }
            })
            .collect()
    }

    fn pub_ids(&self) -> BTreeMap<String, String> {
        self.citations
            .iter()
            .flat_map(|c| c.nodes_data(&[".//pub-id"]))
            .filter_map(|data| {
                let id_type = data.attribute("pub-id-type")?.to_string();
                Some((id_type, data.text))
            })
            .collect()
    }

    pub fn comments(&self) -> Vec<String> {
        self.citations
            .iter()
            .flat_map(|c| c.nodes_text(&[".//comment"]))
            .collect()
    }

    /// `pub-id[@pub-id-type="doi"]`, falling back to a comment mentioning a DOI.
    pub fn doi(&self) -> Option<String> {
        self.pub_ids().remove("doi").or_else(|| {
            self.comments()
                .into_iter()
                .find(|c| c.to_lowercase().contains("doi"))
        })
    }

    pub fn to_reference(&self) -> Reference {
        let mut pub_ids = self.pub_ids();
        let trans_title_node = self.citation_nodes(&[".//trans-title"]).into_iter().next();

        Reference {
            id: self.id(),
            language: self.language(),
            publication_type: self.publication_type(),
            status: self.citation_attribute("specific-use"),
            source: self.source(),
            article_title: self.citation_text(&[".//article-title"]),
            chapter_title: self.citation_text(&[".//chapter-title"]),
            trans_title: self.citation_text(&[".//trans-title"]),
            trans_title_language: trans_title_node.and_then(element_lang),
            year: self.year(),
            author_groups: self.author_groups(),
            volume: self.citation_text(&[".//volume"]),
            issue: self.citation_text(&[".//issue"]),
            supplement: self.citation_text(&[".//supplement"]),
            edition: self.citation_text(&[".//edition"]),
            version: self.citation_text(&[".//version"]),
            publisher_name: self.citation_text(&[".//publisher-name"]),
            publisher_loc: self.citation_text(&[".//publisher-loc"]),
            fpage: self.citation_text(&[".//fpage"]),
            lpage: self.citation_text(&[".//lpage"]),
            page_range: self.citation_text(&[".//page-range"]),
            elocation_id: self.citation_text(&[".//elocation-id"]),
            label: self.view.first_text(&[".//label"]),
            etal: !self.citation_nodes(&[".//etal"]).is_empty(),
            cited_date: self.citation_text(&[
                r#".//date-in-citation[@content-type="access-date"]"#,
                r#".//date-in-citation[@content-type="update"]"#,
            ]),
            ext_link: self.citation_text(&[".//ext-link"]),
            comments: self.comments(),
            notes: self.citation_text(&[".//notes"]),
            contract_number: self.citation_text(&[r#".//comment[@content-type="award-id"]"#]),
            doi: self.doi(),
            pmid: pub_ids.remove("pmid"),
            pmcid: pub_ids.remove("pmcid"),
            conference_name: self.citation_text(&[".//conf-name"]),
            conference_location: self.citation_text(&[".//conf-loc"]),
            conference_date: self.citation_text(&[".//conf-date"]),
            mixed_citation: self.view.first_text(&[".//mixed-citation"]),
        }
    }
}
