//! Affiliation (`aff`) extraction.

use roxmltree::Node;
use serde::Serialize;

use crate::xml::XmlNode;

/// Institution identifier with its scheme (`ror`, `isni`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstitutionId {
    pub id: String,
    pub id_type: Option<String>,
}

/// One `aff` element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Affiliation {
    pub id: Option<String>,
    pub institution_ids: Vec<InstitutionId>,
    pub orgname: Option<String>,
    pub normalized_orgname: Option<String>,
    pub orgdiv1: Option<String>,
    pub orgdiv2: Option<String>,
    pub orgdiv3: Option<String>,
    pub original: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country_code: Option<String>,
    pub country: Option<String>,
    pub label: Option<String>,
    pub email: Option<String>,
    #[serde(skip)]
    pub xml: String,
}

impl Affiliation {
    /// Names of the required parts that are missing.
    pub fn missing_parts(&self) -> Vec<&'static str> {
        [
            ("id", self.id.is_none()),
            ("country code", self.country_code.is_none()),
            ("normalized orgname", self.normalized_orgname.is_none()),
            ("orgname", self.orgname.is_none()),
            ("city", self.city.is_none()),
            ("state", self.state.is_none()),
            ("country", self.country.is_none()),
        ]
        .into_iter()
        .filter_map(|(label, missing)| missing.then_some(label))
        .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing_parts().is_empty()
    }
}

/// Accessors over an `aff` element.
pub struct AffiliationXml<'a, 'input> {
    node: Node<'a, 'input>,
    view: XmlNode<'a, 'input>,
}

impl<'a, 'input> AffiliationXml<'a, 'input> {
    pub fn new(node: Node<'a, 'input>) -> Self {
        Self {
            node,
            view: XmlNode::new(node),
        }
    }

    pub fn id(&self) -> Option<String> {
        self.node.attribute("id").map(str::to_string)
    }

    pub fn institution_ids(&self) -> Vec<InstitutionId> {
        self.view
            .nodes_data(&[".//institution-id"])
            .into_iter()
            .map(|data| InstitutionId {
                id_type: data.attribute("institution-id-type").map(str::to_string),
                id: data.text,
            })
            .collect()
    }

    pub fn city(&self) -> Option<String> {
        self.view
            .first_text(&[".//city", r#".//named-content[@content-type="city"]"#])
    }

    pub fn state(&self) -> Option<String> {
        self.view
            .first_text(&[".//state", r#".//named-content[@content-type="state"]"#])
    }

    /// Country code attribute and country name.
    pub fn country(&self) -> (Option<String>, Option<String>) {
        match self.view.first(&[".//country"]) {
            Some(node) => (
                node.attribute("country").map(str::to_string),
                Some(crate::xml::node_text(node)),
            ),
            None => (None, None),
        }
    }

    fn institution(&self, content_type: &str) -> Option<String> {
        let path = format!(r#".//institution[@content-type="{content_type}"]"#);
        self.view.first_text(&[path.as_str()])
    }

    pub fn orgname(&self) -> Option<String> {
        self.institution("orgname")
    }

    pub fn normalized_orgname(&self) -> Option<String> {
        self.institution("normalized")
    }

    pub fn original(&self) -> Option<String> {
        self.institution("original")
    }

    pub fn label(&self) -> Option<String> {
        self.view.first_text(&[".//label"])
    }

    pub fn email(&self) -> Option<String> {
        self.view.first_text(&[".//email"])
    }

    /// Materialize the affiliation.
    pub fn to_affiliation(&self) -> Affiliation {
        let (country_code, country) = self.country();
        Affiliation {
            id: self.id(),
            institution_ids: self.institution_ids(),
            orgname: self.orgname(),
            normalized_orgname: self.normalized_orgname(),
            orgdiv1: self.institution("orgdiv1"),
            orgdiv2: self.institution("orgdiv2"),
            orgdiv3: self.institution("orgdiv3"),
            original: self.original(),
            city: self.city(),
            state: self.state(),
            country_code,
            country,
            label: self.label(),
            email: self.email(),
            xml: self.view.xml().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use roxmltree::Document;

    const COMPLETE: &str = r#"<aff id="aff1">
        <label>1</label>
        <institution content-type="original">Universidade Federal de Minas Gerais, Belo Horizonte, MG, Brasil</institution>
        <institution content-type="normalized">Universidade Federal de Minas Gerais</institution>
        <institution content-type="orgname">Universidade Federal de Minas Gerais</institution>
        <institution content-type="orgdiv1">Faculdade de Medicina</institution>
        <institution-id institution-id-type="ror">https://ror.org/0176yjw32</institution-id>
        <addr-line>
            <named-content content-type="city">Belo Horizonte</named-content>
            <named-content content-type="state">MG</named-content>
        </addr-line>
        <country country="BR">Brasil</country>
        <email>autor@ufmg.br</email>
    </aff>"#;

    #[test]
    fn test_complete_affiliation() {
        let doc = Document::parse(COMPLETE).unwrap();
        let aff = AffiliationXml::new(doc.root_element()).to_affiliation();

        assert_eq!(aff.id.as_deref(), Some("aff1"));
        assert_eq!(aff.city.as_deref(), Some("Belo Horizonte"));
        assert_eq!(aff.state.as_deref(), Some("MG"));
        assert_eq!(aff.country_code.as_deref(), Some("BR"));
        assert_eq!(aff.country.as_deref(), Some("Brasil"));
        assert_eq!(aff.orgdiv1.as_deref(), Some("Faculdade de Medicina"));
        assert_eq!(aff.orgdiv2, None);
        assert_eq!(aff.email.as_deref(), Some("autor@ufmg.br"));
        assert_eq!(
            aff.institution_ids,
            vec![InstitutionId {
                id: "https://ror.org/0176yjw32".to_string(),
                id_type: Some("ror".to_string()),
            }]
        );
        assert!(aff.is_complete());
    }

    #[test]
    fn test_incomplete_affiliation() {
        let xml = r#"<aff><institution content-type="orgname">USP</institution><country>Brasil</country></aff>"#;
        let doc = Document::parse(xml).unwrap();
        let aff = AffiliationXml::new(doc.root_element()).to_affiliation();

        assert_eq!(aff.country.as_deref(), Some("Brasil"));
        assert_eq!(
            aff.missing_parts(),
            vec!["id", "country code", "normalized orgname", "city", "state"]
        );
    }
}
