//! Contributor (`contrib`, `name`, `collab`) extraction.

use std::collections::BTreeMap;

use roxmltree::Node;
use serde::Serialize;

use crate::xml::{local_name, node_text, XmlNode};

/// A personal author.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PersonName {
    pub given_names: Option<String>,
    pub surname: String,
    pub suffix: Option<String>,
    pub prefix: Option<String>,
    pub role: Option<String>,
    /// `contrib-id` values keyed by `contrib-id-type` (`orcid`, `lattes`, ...).
    pub contrib_ids: BTreeMap<String, String>,
    /// `rid` of each affiliation cross-reference.
    pub aff_xrefs: Vec<String>,
}

impl PersonName {
    pub fn fullname(&self) -> String {
        [self.given_names.as_deref(), Some(self.surname.as_str())]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// A group or institutional author.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CorporateAuthor {
    pub collab: String,
    pub role: Option<String>,
}

/// A contributor is either a person or a collaboration, never both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Contributor {
    Person(PersonName),
    Corporate(CorporateAuthor),
}

impl Contributor {
    pub fn role(&self) -> Option<&str> {
        match self {
            Self::Person(p) => p.role.as_deref(),
            Self::Corporate(c) => c.role.as_deref(),
        }
    }

    pub fn as_person(&self) -> Option<&PersonName> {
        match self {
            Self::Person(p) => Some(p),
            Self::Corporate(_) => None,
        }
    }
}

/// Accessors over a `contrib` element, or a `name`/`collab` inside a
/// `person-group`.
pub struct ContribXml<'a, 'input> {
    node: Node<'a, 'input>,
    view: XmlNode<'a, 'input>,
}

impl<'a, 'input> ContribXml<'a, 'input> {
    pub fn new(node: Node<'a, 'input>) -> Self {
        Self {
            node,
            view: XmlNode::new(node),
        }
    }

    pub fn given_names(&self) -> Option<String> {
        self.view.first_text(&[".//given-names"])
    }

    pub fn surname(&self) -> Option<String> {
        self.view.first_text(&[".//surname"])
    }

    pub fn suffix(&self) -> Option<String> {
        self.view.first_text(&[".//suffix"])
    }

    pub fn prefix(&self) -> Option<String> {
        self.view.first_text(&[".//prefix"])
    }

    pub fn contrib_ids(&self) -> BTreeMap<String, String> {
        self.view
            .nodes_data(&[".//contrib-id"])
            .into_iter()
            .filter_map(|data| {
                let id_type = data.attribute("contrib-id-type")?.to_string();
                Some((id_type, data.text))
            })
            .collect()
    }

    pub fn aff_xrefs(&self) -> Vec<String> {
        self.view
            .nodes_data(&[r#".//xref[@ref-type="aff"]"#])
            .into_iter()
            .filter_map(|data| data.attribute("rid").map(str::to_string))
            .collect()
    }

    pub fn collab(&self) -> Option<String> {
        if local_name(self.node) == "collab" {
            return Some(node_text(self.node));
        }
        self.view.first_text(&[".//collab"])
    }

    /// The contributor, using `contrib-type` as role.
    pub fn contributor(&self) -> Option<Contributor> {
        self.contributor_with_role(self.node.attribute("contrib-type").map(str::to_string))
    }

    /// The contributor with an explicit role, as in reference person groups.
    ///
    /// A person needs a `surname`; otherwise a `collab` makes a corporate
    /// author. `None` when neither is present.
    pub fn contributor_with_role(&self, role: Option<String>) -> Option<Contributor> {
        if let Some(surname) = self.surname() {
            return Some(Contributor::Person(PersonName {
                given_names: self.given_names(),
                surname,
                suffix: self.suffix(),
                prefix: self.prefix(),
                role,
                contrib_ids: self.contrib_ids(),
                aff_xrefs: self.aff_xrefs(),
            }));
        }

        self.collab()
            .map(|collab| Contributor::Corporate(CorporateAuthor { collab, role }))
    }
}
