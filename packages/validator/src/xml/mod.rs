//! XML navigation: tree helpers, path expressions and the node view.

mod node;
mod path;
mod utils;

pub use node::{NodeData, XmlNode};
pub use path::XPath;
pub use utils::{
    child_element, collapse_whitespace, element_lang, is_named, local_name, node_text,
    node_text_excluding, raw_xml, xlink_href,
};
