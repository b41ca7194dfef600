//! Table container (`table-wrap` and other `table` parents) extraction.

use roxmltree::Node;
use serde::Serialize;

use crate::xml::{local_name, XmlNode};

/// An element wrapping a `table`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TableParent {
    pub name: String,
    pub id: Option<String>,
    pub label: Option<String>,
    pub caption: Option<String>,
    pub table: Option<String>,
    pub graphic_href: Option<String>,
}

pub struct TableParentXml<'a, 'input> {
    node: Node<'a, 'input>,
    view: XmlNode<'a, 'input>,
}

impl<'a, 'input> TableParentXml<'a, 'input> {
    pub fn new(node: Node<'a, 'input>) -> Self {
        Self {
            node,
            view: XmlNode::new(node),
        }
    }

    pub fn to_table_parent(&self) -> TableParent {
        TableParent {
            name: local_name(self.node).to_string(),
            id: self.node.attribute("id").map(str::to_string),
            label: self.view.first_text(&["label"]),
            caption: self.view.first_text(&["caption"]),
            table: self.view.nodes_xml(&["table"]).into_iter().next(),
            graphic_href: self
                .view
                .nodes_data(&["graphic"])
                .into_iter()
                .find_map(|data| data.attribute("xlink:href").map(str::to_string)),
        }
    }
}
