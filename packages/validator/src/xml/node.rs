//! Read-only path-based view over one element.

use std::collections::BTreeMap;

use roxmltree::Node;
use serde::Serialize;
use tracing::warn;

use crate::config::XLINK_NS;

use super::path::XPath;
use super::utils::{node_text, raw_xml};

/// Text and attributes of a matched element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeData {
    pub text: String,
    pub attributes: BTreeMap<String, String>,
}

impl NodeData {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

/// Path lookups relative to one element.
///
/// Every lookup takes a list of paths; results of each path keep document
/// order and are concatenated in the order the paths are given. A path that
/// matches nothing, or that cannot be parsed, contributes nothing.
#[derive(Debug, Clone, Copy)]
pub struct XmlNode<'a, 'input> {
    node: Node<'a, 'input>,
}

impl<'a, 'input> XmlNode<'a, 'input> {
    pub fn new(node: Node<'a, 'input>) -> Self {
        Self { node }
    }

    pub fn node(&self) -> Node<'a, 'input> {
        self.node
    }

    /// Matching elements.
    pub fn nodes(&self, paths: &[&str]) -> Vec<Node<'a, 'input>> {
        let mut found = Vec::new();
        for path in paths {
            match XPath::parse(path) {
                Ok(xpath) => found.extend(xpath.select(self.node)),
                Err(e) => warn!("Skipping path lookup: {e}"),
            }
        }
        found
    }

    /// First matching element.
    pub fn first(&self, paths: &[&str]) -> Option<Node<'a, 'input>> {
        self.nodes(paths).into_iter().next()
    }

    /// Flattened, whitespace-collapsed text of the matching elements.
    pub fn nodes_text(&self, paths: &[&str]) -> Vec<String> {
        self.nodes(paths).into_iter().map(node_text).collect()
    }

    /// Text of the first matching element.
    ///
    /// `Some("")` means the element exists but is empty.
    pub fn first_text(&self, paths: &[&str]) -> Option<String> {
        self.first(paths).map(node_text)
    }

    /// Text plus attributes of the matching elements.
    pub fn nodes_data(&self, paths: &[&str]) -> Vec<NodeData> {
        self.nodes(paths)
            .into_iter()
            .map(|node| NodeData {
                text: node_text(node),
                attributes: attributes(node),
            })
            .collect()
    }

    /// Source markup of the matching elements.
    pub fn nodes_xml(&self, paths: &[&str]) -> Vec<String> {
        self.nodes(paths)
            .into_iter()
            .map(|node| raw_xml(node).to_string())
            .collect()
    }

    /// Source markup of the wrapped element.
    pub fn xml(&self) -> &'input str {
        raw_xml(self.node)
    }

    /// Attribute of the wrapped element.
    pub fn attribute(&self, name: &str) -> Option<&'a str> {
        self.node.attribute(name)
    }
}

/// Attributes keyed by name, namespaced ones with their usual prefix.
fn attributes(node: Node<'_, '_>) -> BTreeMap<String, String> {
    node.attributes()
        .map(|attr| {
            let key = match attr.namespace() {
                Some(roxmltree::NS_XML_URI) => format!("xml:{}", attr.name()),
                Some(XLINK_NS) => format!("xlink:{}", attr.name()),
                _ => attr.name().to_string(),
            };
            (key, attr.value().to_string())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use roxmltree::Document;

    const XML: &str = r#"<aff id="aff1" xmlns:xlink="http://www.w3.org/1999/xlink">
        <label>1</label>
        <institution content-type="orgname">Universidade  de
            São Paulo</institution>
        <institution content-type="normalized">Universidade de São Paulo</institution>
        <addr-line><named-content content-type="city">São Paulo</named-content></addr-line>
        <country country="BR">Brasil</country>
        <email/>
        <ext-link xlink:href="https://usp.br">site</ext-link>
    </aff>"#;

    #[test]
    fn test_nodes_text_collapses_whitespace() {
        let doc = Document::parse(XML).unwrap();
        let view = XmlNode::new(doc.root_element());
        assert_eq!(
            view.nodes_text(&[r#".//institution[@content-type="orgname"]"#]),
            vec!["Universidade de São Paulo".to_string()]
        );
    }

    #[test]
    fn test_paths_are_concatenated_in_order() {
        let doc = Document::parse(XML).unwrap();
        let view = XmlNode::new(doc.root_element());
        let texts = view.nodes_text(&[
            ".//city",
            r#".//named-content[@content-type="city"]"#,
            ".//label",
        ]);
        assert_eq!(texts, vec!["São Paulo".to_string(), "1".to_string()]);
    }

    #[test]
    fn test_nodes_data() {
        let doc = Document::parse(XML).unwrap();
        let view = XmlNode::new(doc.root_element());
        let data = view.nodes_data(&[".//country", ".//ext-link"]);
        assert_eq!(data.len(), 2);
        assert_eq!(data[0].text, "Brasil");
        assert_eq!(data[0].attribute("country"), Some("BR"));
        assert_eq!(data[1].attribute("xlink:href"), Some("https://usp.br"));
    }

    #[test]
    fn test_empty_versus_absent() {
        let doc = Document::parse(XML).unwrap();
        let view = XmlNode::new(doc.root_element());
        assert_eq!(view.first_text(&[".//email"]), Some(String::new()));
        assert_eq!(view.first_text(&[".//state"]), None);
    }

    #[test]
    fn test_nodes_xml() {
        let doc = Document::parse(XML).unwrap();
        let view = XmlNode::new(doc.root_element());
        assert_eq!(view.nodes_xml(&["label"]), vec!["<label>1</label>".to_string()]);
        assert!(view.xml().starts_with("<aff id=\"aff1\""));
    }

    #[test]
    fn test_invalid_path_yields_nothing() {
        let doc = Document::parse(XML).unwrap();
        let view = XmlNode::new(doc.root_element());
        assert!(view.nodes(&["/aff", "label["]).is_empty());
        assert_eq!(view.nodes(&["/aff", "label"]).len(), 1);
    }
}
