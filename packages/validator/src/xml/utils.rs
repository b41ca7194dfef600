//! Small helpers over `roxmltree` nodes: names, text, language and raw markup.

use roxmltree::Node;

use crate::config::XLINK_NS;

/// Tag name of an element without its namespace.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use sps_validator::xml::local_name;
///
/// let xml = r#"<mml:math xmlns:mml="http://www.w3.org/1998/Math/MathML"/>"#;
/// let doc = Document::parse(xml).unwrap();
/// assert_eq!(local_name(doc.root_element()), "math");
/// ```
pub fn local_name<'a>(node: Node<'a, '_>) -> &'a str {
    node.tag_name().name()
}

/// Whether `node` is an element called `tag`.
pub fn is_named(node: Node<'_, '_>, tag: &str) -> bool {
    node.is_element() && local_name(node) == tag
}

/// First child element called `tag`.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use sps_validator::xml::child_element;
///
/// let doc = Document::parse("<pub-date><day>3</day><year>2024</year></pub-date>").unwrap();
/// let year = child_element(doc.root_element(), "year");
/// assert_eq!(year.and_then(|n| n.text()), Some("2024"));
/// assert!(child_element(doc.root_element(), "month").is_none());
/// ```
pub fn child_element<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|child| is_named(*child, tag))
}

/// Flattened text of a node and all its descendants, whitespace collapsed.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use sps_validator::xml::node_text;
///
/// let xml = "<title>Coffee <italic>arabica</italic>\n   in Brazil</title>";
/// let doc = Document::parse(xml).unwrap();
/// assert_eq!(node_text(doc.root_element()), "Coffee arabica in Brazil");
/// ```
pub fn node_text(node: Node<'_, '_>) -> String {
    node_text_excluding(node, &[])
}

/// Like [`node_text`] but skips the sub-trees of the listed descendant tags.
pub fn node_text_excluding(node: Node<'_, '_>, skipped: &[&str]) -> String {
    let mut text = String::new();
    collect_text(node, skipped, &mut text);
    collapse_whitespace(&text)
}

fn collect_text(node: Node<'_, '_>, skipped: &[&str], text: &mut String) {
    for child in node.children() {
        if child.is_text() {
            if let Some(t) = child.text() {
                text.push_str(t);
            }
        } else if child.is_element() && !skipped.contains(&local_name(child)) {
            collect_text(child, skipped, text);
        }
    }
}

/// Collapse runs of whitespace into single spaces and trim the ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Language of an element, inherited from the nearest ancestor carrying `xml:lang`.
pub fn element_lang(node: Node<'_, '_>) -> Option<String> {
    node.ancestors()
        .filter(|n| n.is_element())
        .find_map(|n| n.attribute((roxmltree::NS_XML_URI, "lang")))
        .map(str::to_string)
}

/// The `xlink:href` attribute of an element.
pub fn xlink_href<'a>(node: Node<'a, '_>) -> Option<&'a str> {
    node.attribute((XLINK_NS, "href"))
}

/// The exact source markup of an element.
pub fn raw_xml<'input>(node: Node<'_, 'input>) -> &'input str {
    &node.document().input_text()[node.range()]
}
