//! Construction of an [`Article`] from a parsed document.

use roxmltree::{Document, Node, ParsingOptions};
use tracing::debug;

use crate::citation::citation_ranges;
use crate::entities::{
    AffiliationXml, ContribXml, Contributor, ReferenceXml, TableParentXml, Title, TitleXml,
};
use crate::error::{Result, ValidatorError};
use crate::types::{LangText, PartialDate};
use crate::xml::{element_lang, node_text, XmlNode};

use super::dates::{read_date, ArticleDates};
use super::issue::{normalize_number, IssueParts};
use super::metadata::{
    sub_article_scope, DeclaredCounts, Footnote, JournalMeta, License, RelatedArticle,
    SectionGroup, SubDocument,
};
use super::order::Order;
use super::Article;

/// Top-level parts of an `article` element.
struct Parts<'a, 'input> {
    root: XmlNode<'a, 'input>,
    article_meta: Option<XmlNode<'a, 'input>>,
    back: Option<Node<'a, 'input>>,
    translations: Vec<Node<'a, 'input>>,
    sub_articles: Vec<Node<'a, 'input>>,
    responses: Vec<Node<'a, 'input>>,
}

impl<'a, 'input> Parts<'a, 'input> {
    fn new(root: Node<'a, 'input>) -> Self {
        let view = XmlNode::new(root);
        let sub_articles = view
            .nodes(&["./sub-article"])
            .into_iter()
            .filter(|n| n.attribute("article-type") != Some("translation"))
            .collect();

        Self {
            root: view,
            article_meta: view.first(&["./front/article-meta"]).map(XmlNode::new),
            back: view.first(&[".//back"]),
            translations: view.nodes(&["./sub-article[@article-type=\"translation\"]"]),
            sub_articles,
            responses: view.nodes(&["./response"]),
        }
    }

    fn meta_text(&self, path: &str) -> Option<String> {
        self.article_meta.and_then(|meta| meta.first_text(&[path]))
    }

    fn meta_nodes(&self, path: &str) -> Vec<Node<'a, 'input>> {
        self.article_meta
            .map(|meta| meta.nodes(&[path]))
            .unwrap_or_default()
    }

    fn meta_date(&self, paths: &[&str]) -> Option<PartialDate> {
        self.article_meta
            .and_then(|meta| meta.first(paths))
            .map(read_date)
    }
}

fn contributors_under(node: Node<'_, '_>) -> Vec<Contributor> {
    XmlNode::new(node)
        .nodes(&[".//contrib"])
        .into_iter()
        .filter_map(|contrib| ContribXml::new(contrib).contributor())
        .collect()
}

fn keywords_under(node: Node<'_, '_>, path: &str) -> Vec<LangText> {
    XmlNode::new(node)
        .nodes(&[path])
        .into_iter()
        .flat_map(|group| {
            let language = element_lang(group);
            XmlNode::new(group)
                .nodes_text(&["kwd"])
                .into_iter()
                .map(move |kwd| LangText::new(language.clone(), kwd))
        })
        .collect()
}

/// Sub-article or response as a sub-document.
fn sub_document(node: Node<'_, '_>, type_attr: &str) -> SubDocument {
    let view = XmlNode::new(node);
    let language = element_lang(node);

    let titles = view
        .nodes(&["*/title-group"])
        .into_iter()
        .map(|group| Title {
            language: language.clone(),
            ..TitleXml::new(group).to_title()
        })
        .collect();
    let abstracts = view
        .nodes_text(&[".//abstract"])
        .into_iter()
        .map(|text| LangText::new(language.clone(), text))
        .collect();

    SubDocument {
        id: node.attribute("id").map(str::to_string),
        article_type: node.attribute(type_attr).map(str::to_string),
        language,
        titles,
        abstracts,
        keywords: keywords_under(node, ".//kwd-group"),
        contributors: contributors_under(node),
    }
}

impl Article {
    /// Parse `xml` and build the article named `name`.
    ///
    /// Documents declaring a DTD are accepted; the DTD is not loaded.
    pub fn parse(name: &str, xml: &str) -> Result<Article> {
        let options = ParsingOptions {
            allow_dtd: true,
            ..ParsingOptions::default()
        };
        let doc = Document::parse_with_options(xml, options).map_err(|source| {
            ValidatorError::DocumentParse {
                name: name.to_string(),
                source,
            }
        })?;
        Ok(Self::from_document(name, &doc))
    }

    /// Build the article from an already parsed document.
    pub fn from_document(name: &str, doc: &Document<'_>) -> Article {
        let root = doc.root_element();
        let parts = Parts::new(root);
        let language = element_lang(root);

        let volume = normalize_number(parts.meta_text("volume").as_deref()).filter(|v| v != "0");
        let issue = parts.meta_text("issue");
        let issue_parts = IssueParts::resolve(issue.as_deref(), volume.as_deref());

        let article_id_other = parts.meta_text("article-id[@pub-id-type=\"other\"]");
        let fpage = normalize_number(parts.meta_text("fpage").as_deref());
        let order = Order::derive(article_id_other.as_deref(), fpage.as_deref());

        let translations: Vec<SubDocument> = parts
            .translations
            .iter()
            .map(|node| sub_document(*node, "article-type"))
            .collect();

        let article = Article {
            name: name.to_string(),
            pid: None,
            doi: parts
                .meta_text("article-id[@pub-id-type=\"doi\"]")
                .map(|doi| doi.to_lowercase()),
            publisher_id: parts
                .meta_text("article-id[@pub-id-type=\"publisher-id\"]")
                .map(|id| id.to_lowercase()),
            order,
            article_id_other,
            previous_pid: parts.meta_text("article-id[@specific-use=\"previous-pid\"]"),
            marked_to_delete: !parts
                .meta_nodes("article-id[@specific-use=\"delete\"]")
                .is_empty(),

            article_type: root.attribute("article-type").map(str::to_string),
            dtd_version: root.attribute("dtd-version").map(str::to_string),
            sps_version: root
                .attribute("specific-use")
                .map(|v| v.trim_start_matches("sps-").to_string()),

            journal: JournalMeta::from_node(parts.root.first(&["./front/journal-meta"])),

            supplement: parts.meta_text("supplement"),
            fpage_seq: parts
                .meta_nodes("fpage")
                .first()
                .and_then(|n| n.attribute("seq"))
                .map(str::to_string),
            lpage: normalize_number(parts.meta_text("lpage").as_deref()),
            elocation_id: parts.meta_text("elocation-id"),
            toc_section: parts
                .meta_nodes(".//subj-group[@subj-group-type=\"heading\"]")
                .first()
                .and_then(|group| XmlNode::new(*group).first_text(&["subject"])),
            fpage,
            volume,
            issue,
            issue_parts,

            titles: titles(&parts, &translations),
            abstracts: abstracts(&parts, language.as_deref(), &translations),
            keywords: keywords(&parts, &translations),

            contributors: parts
                .article_meta
                .map(|meta| contributors_under(meta.node()))
                .unwrap_or_default()
                .into_iter()
                .chain(parts.sub_articles.iter().flat_map(|s| contributors_under(*s)))
                .collect(),
            affiliations: parts
                .meta_nodes(".//aff")
                .into_iter()
                .chain(
                    parts
                        .sub_articles
                        .iter()
                        .flat_map(|s| XmlNode::new(*s).nodes(&[".//aff"])),
                )
                .map(|aff| AffiliationXml::new(aff).to_affiliation())
                .collect(),
            references: parts
                .back
                .map(|back| XmlNode::new(back).nodes(&[".//ref"]))
                .unwrap_or_default()
                .into_iter()
                .map(|r| ReferenceXml::new(r).to_reference())
                .collect(),
            responses: parts
                .responses
                .iter()
                .map(|node| sub_document(*node, "response-type"))
                .collect(),
            translations,

            sections: sections(&parts),
            licenses: parts
                .meta_nodes(".//license")
                .into_iter()
                .map(License::from_node)
                .collect(),
            related_articles: parts
                .meta_nodes("related-article")
                .into_iter()
                .map(RelatedArticle::from_node)
                .collect(),
            tables: parts
                .root
                .nodes(&[".//*[table]"])
                .into_iter()
                .map(|node| TableParentXml::new(node).to_table_parent())
                .collect(),
            footnotes: footnotes(&parts),
            financial_disclosure: parts
                .root
                .nodes_text(&[".//fn[@fn-type=\"financial-disclosure\"]"]),

            dates: ArticleDates {
                received: parts.meta_date(&["history/date[@date-type=\"received\"]"]),
                accepted: parts.meta_date(&["history/date[@date-type=\"accepted\"]"]),
                epub: parts.meta_date(&[
                    "pub-date[@pub-type=\"epub\"]",
                    "pub-date[@date-type=\"preprint\"]",
                ]),
                epub_ppub: parts.meta_date(&["pub-date[@pub-type=\"epub-ppub\"]"]),
                collection: parts.meta_date(&["pub-date[@pub-type=\"collection\"]"]),
            },
            counts: DeclaredCounts::from_node(parts.article_meta.map(|meta| meta.node())),
            citation_ranges: citation_ranges(root),
            language,
        };

        debug!(
            name,
            order = %article.order,
            doi = ?article.doi,
            contributors = article.contributors.len(),
            references = article.references.len(),
            "Extracted article"
        );
        article
    }
}

fn titles(parts: &Parts<'_, '_>, translations: &[SubDocument]) -> Vec<Title> {
    parts
        .meta_nodes(".//title-group")
        .into_iter()
        .chain(parts.meta_nodes(".//trans-title-group"))
        .map(|group| TitleXml::new(group).to_title())
        .chain(translations.iter().flat_map(|t| t.titles.iter().cloned()))
        .collect()
}

fn abstracts(
    parts: &Parts<'_, '_>,
    language: Option<&str>,
    translations: &[SubDocument],
) -> Vec<LangText> {
    let main = parts
        .meta_nodes(".//abstract")
        .into_iter()
        .map(|node| LangText::new(language.map(str::to_string), node_text(node)));
    let trans = parts
        .meta_nodes(".//trans-abstract")
        .into_iter()
        .map(|node| LangText::new(element_lang(node), node_text(node)));

    main.chain(trans)
        .chain(translations.iter().flat_map(|t| t.abstracts.iter().cloned()))
        .collect()
}

fn keywords(parts: &Parts<'_, '_>, translations: &[SubDocument]) -> Vec<LangText> {
    parts
        .article_meta
        .map(|meta| keywords_under(meta.node(), "kwd-group"))
        .unwrap_or_default()
        .into_iter()
        .chain(translations.iter().flat_map(|t| t.keywords.iter().cloned()))
        .collect()
}

fn sections(parts: &Parts<'_, '_>) -> Vec<SectionGroup> {
    let mut groups = vec![SectionGroup::from_body(
        "article".to_string(),
        parts.root.first(&[".//body"]),
    )];
    for translation in &parts.translations {
        groups.push(SectionGroup::from_body(
            sub_article_scope(*translation),
            XmlNode::new(*translation).first(&[".//body"]),
        ));
    }
    groups
}

fn scoped_footnotes(scope: &str, back: Option<Node<'_, '_>>) -> Vec<Footnote> {
    back.map(|back| XmlNode::new(back).nodes_xml(&[".//fn"]))
        .unwrap_or_default()
        .into_iter()
        .map(|xml| Footnote {
            scope: scope.to_string(),
            xml,
        })
        .collect()
}

fn footnotes(parts: &Parts<'_, '_>) -> Vec<Footnote> {
    let mut notes = scoped_footnotes("article", parts.back);
    for translation in &parts.translations {
        notes.extend(scoped_footnotes(
            &sub_article_scope(*translation),
            XmlNode::new(*translation).first(&[".//back"]),
        ));
    }
    notes
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const ARTICLE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<!DOCTYPE article PUBLIC "-//NLM//DTD JATS (Z39.96) Journal Publishing DTD v1.1 20151215//EN" "JATS-journalpublishing1.dtd">
<article xmlns:xlink="http://www.w3.org/1999/xlink" article-type="research-article" dtd-version="1.1" specific-use="sps-1.9" xml:lang="pt">
  <front>
    <journal-meta>
      <journal-id journal-id-type="publisher-id">bjb</journal-id>
      <journal-title-group><journal-title>Brazilian Journal of Biology</journal-title></journal-title-group>
      <issn pub-type="epub">1678-4375</issn>
      <publisher><publisher-name>Instituto Internacional de Ecologia</publisher-name></publisher>
    </journal-meta>
    <article-meta>
      <article-id pub-id-type="doi">10.1590/1519-6984.ABC</article-id>
      <article-id pub-id-type="other">7</article-id>
      <article-categories><subj-group subj-group-type="heading"><subject>Original Article</subject></subj-group></article-categories>
      <title-group>
        <article-title>Diversidade de peixes<xref ref-type="fn" rid="fn1">1</xref></article-title>
        <trans-title-group xml:lang="en"><trans-title>Fish diversity</trans-title></trans-title-group>
      </title-group>
      <contrib-group>
        <contrib contrib-type="author">
          <name><surname>Silva</surname><given-names>Ana</given-names></name>
          <xref ref-type="aff" rid="aff1">1</xref>
        </contrib>
        <contrib contrib-type="author"><collab>Grupo de Estudos</collab></contrib>
      </contrib-group>
      <aff id="aff1"><institution content-type="orgname">Universidade Federal</institution><country country="BR">Brasil</country></aff>
      <pub-date pub-type="epub"><day>10</day><month>02</month><year>2024</year></pub-date>
      <pub-date pub-type="collection"><year>2024</year></pub-date>
      <volume>084</volume>
      <issue>2 suppl 1</issue>
      <fpage>0101</fpage>
      <lpage>110</lpage>
      <history>
        <date date-type="received"><day>01</day><month>06</month><year>2023</year></date>
        <date date-type="accepted"><day>01</day><month>07</month><year>2023</year></date>
      </history>
      <permissions>
        <license license-type="open-access" xlink:href="https://creativecommons.org/licenses/by/4.0/" xml:lang="pt">
          <license-p>Licença aberta</license-p>
        </license>
      </permissions>
      <abstract><p>Resumo do estudo.</p></abstract>
      <trans-abstract xml:lang="en"><p>Study abstract.</p></trans-abstract>
      <kwd-group xml:lang="pt"><kwd>peixes</kwd><kwd>rios</kwd></kwd-group>
    </article-meta>
  </front>
  <body>
    <sec sec-type="intro"><title>Introdução</title><p>Texto<xref ref-type="bibr" rid="B1">1</xref>-<xref ref-type="bibr" rid="B3">3</xref></p></sec>
  </body>
  <back>
    <ref-list>
      <ref id="B1"><element-citation publication-type="journal"><source>Neotrop Ichthyol</source><year>2010</year></element-citation></ref>
    </ref-list>
    <fn-group><fn id="fn1"><p>Nota</p></fn></fn-group>
  </back>
  <sub-article article-type="translation" id="s1" xml:lang="en">
    <front-stub>
      <title-group><article-title>Fish diversity in rivers</article-title></title-group>
      <abstract><p>Translated abstract.</p></abstract>
      <kwd-group><kwd>fish</kwd></kwd-group>
    </front-stub>
    <body><sec><title>Introduction</title></sec></body>
  </sub-article>
</article>"#;

    #[test]
    fn test_identity() {
        let article = Article::parse("a01", ARTICLE).unwrap();

        assert_eq!(article.name, "a01");
        assert_eq!(article.doi.as_deref(), Some("10.1590/1519-6984.abc"));
        assert_eq!(article.order.as_str(), "00007");
        assert!(!article.marked_to_delete);
        assert_eq!(article.article_type.as_deref(), Some("research-article"));
        assert_eq!(article.language.as_deref(), Some("pt"));
        assert_eq!(article.sps_version.as_deref(), Some("1.9"));
        assert_eq!(article.toc_section.as_deref(), Some("Original Article"));
    }

    #[test]
    fn test_bibliographic_data() {
        let article = Article::parse("a01", ARTICLE).unwrap();

        assert_eq!(article.volume.as_deref(), Some("84"));
        assert_eq!(article.fpage.as_deref(), Some("101"));
        assert_eq!(article.lpage.as_deref(), Some("110"));
        assert_eq!(article.issue_label(), "v84n2s1");
        assert!(!article.is_ahead());
        assert!(!article.is_epub_only());
        assert_eq!(article.history_days(), Some(30));
        assert_eq!(article.journal.title.as_deref(), Some("Brazilian Journal of Biology"));
        assert_eq!(article.journal.e_issn(), Some("1678-4375"));
    }

    #[test]
    fn test_titles_abstracts_keywords() {
        let article = Article::parse("a01", ARTICLE).unwrap();

        assert_eq!(
            article.textual_titles(),
            "Fish diversity in rivers | Diversidade de peixes"
        );
        assert_eq!(article.abstracts.len(), 3);
        assert_eq!(article.abstracts[1].language.as_deref(), Some("en"));
        assert_eq!(
            article.keywords,
            vec![
                LangText::new(Some("pt".to_string()), "peixes"),
                LangText::new(Some("pt".to_string()), "rios"),
                LangText::new(Some("en".to_string()), "fish"),
            ]
        );
        assert_eq!(article.trans_languages(), vec![Some("en")]);
    }

    #[test]
    fn test_people_and_references() {
        let article = Article::parse("a01", ARTICLE).unwrap();

        assert_eq!(article.contributors.len(), 2);
        assert_eq!(article.textual_contrib_surnames(), "Silva");
        assert_eq!(article.affiliations.len(), 1);
        assert_eq!(article.affiliations[0].id.as_deref(), Some("aff1"));
        assert_eq!(article.references.len(), 1);
        assert_eq!(article.references[0].source.as_deref(), Some("Neotrop Ichthyol"));
    }

    #[test]
    fn test_structure() {
        let article = Article::parse("a01", ARTICLE).unwrap();

        assert_eq!(article.sections.len(), 2);
        assert_eq!(article.sections[1].scope, "sub-article/[@id=\"s1\"]");
        assert_eq!(article.footnotes.len(), 1);
        assert_eq!(article.licenses[0].code_and_version.as_deref(), Some("by/4.0"));
        assert_eq!(article.citation_ranges["bibr"][0].start, 1);
        assert_eq!(article.citation_ranges["bibr"][0].end, 3);
    }

    #[test]
    fn test_ahead_of_print() {
        let xml = r#"<article><front><article-meta>
            <pub-date pub-type="epub"><day>03</day><month>05</month><year>2024</year></pub-date>
            <elocation-id>e2024001</elocation-id>
        </article-meta></front></article>"#;
        let article = Article::parse("aop", xml).unwrap();

        assert!(article.is_ahead());
        assert!(!article.is_epub_only());
        assert_eq!(article.issue_label(), "2024nahead");
        assert_eq!(article.order.as_str(), "00000");
    }

    #[test]
    fn test_marked_to_delete() {
        let xml = r#"<article><front><article-meta>
            <article-id specific-use="delete">S0001</article-id>
            <article-id specific-use="previous-pid">S0102-311X2013000500014</article-id>
        </article-meta></front></article>"#;
        let article = Article::parse("del", xml).unwrap();
        assert!(article.marked_to_delete);
        assert_eq!(article.previous_pid.as_deref(), Some("S0102-311X2013000500014"));
    }

    #[test]
    fn test_missing_front() {
        let article = Article::parse("bare", "<article/>").unwrap();
        assert_eq!(article.order.as_str(), "00000");
        assert!(article.journal.title.is_none());
        assert!(article.contributors.is_empty());
    }

    #[test]
    fn test_malformed_markup() {
        let err = Article::parse("broken", "<article><front></article>").unwrap_err();
        assert!(matches!(err, ValidatorError::DocumentParse { ref name, .. } if name == "broken"));
    }
}
