//! Recovery of compressed citation ranges.
//!
//! Numeric citation styles write "refs 3 to 7" as two cross-references
//! separated by a dash: `<xref rid="B3">3</xref>-<xref rid="B7">7</xref>`.
//! The markup of each parent element is split at its `<xref` opening tags
//! and the text right after each closing tag is inspected for the dash.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use regex::Regex;
use roxmltree::Node;
use serde::Serialize;

use crate::xml::{is_named, raw_xml};

/// `ref-type` attribute inside an opening tag.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static REF_TYPE_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^<xref\b[^>]*?\sref-type\s*=\s*["']([^"']*)["']"#).expect("valid regex")
});

/// Cross-reference kind used for bibliographic citations.
pub const BIBR: &str = "bibr";

/// A range marker between two adjacent cross-references.
#[derive(Debug, Clone, Copy)]
pub struct XrefRange<'a, 'input> {
    pub start: u32,
    pub end: u32,
    pub first: Node<'a, 'input>,
    pub last: Node<'a, 'input>,
}

impl XrefRange<'_, '_> {
    pub fn to_citation_range(&self) -> CitationRange {
        CitationRange {
            start: self.start,
            end: self.end,
            start_rid: self.first.attribute("rid").unwrap_or_default().to_string(),
            end_rid: self.last.attribute("rid").unwrap_or_default().to_string(),
        }
    }
}

/// Owned form of [`XrefRange`] kept on the article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CitationRange {
    pub start: u32,
    pub end: u32,
    pub start_rid: String,
    pub end_rid: String,
}

fn is_xref_of_kind(node: Node<'_, '_>, kind: &str) -> bool {
    is_named(node, "xref") && node.attribute("ref-type") == Some(kind)
}

/// Whether the first labelled cross-reference of `kind` has a numeric label.
///
/// Only the first one is looked at; a list mixing styles is judged by it.
pub fn is_numeric_style(root: Node<'_, '_>, kind: &str) -> bool {
    root.descendants()
        .filter(|n| is_xref_of_kind(*n, kind))
        .find_map(|n| n.text())
        .map(|label| {
            label
                .replace('(', "")
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_digit())
        })
        .unwrap_or(false)
}

/// Elements holding a cross-reference child, with every cross-reference
/// of `kind` beneath them. Only elements with at least two are kept.
pub fn xref_parents<'a, 'input>(
    root: Node<'a, 'input>,
    kind: &str,
) -> Vec<(Node<'a, 'input>, Vec<Node<'a, 'input>>)> {
    root.descendants()
        .filter(|n| n.is_element() && n.children().any(|child| is_named(child, "xref")))
        .filter_map(|parent| {
            let xrefs: Vec<_> = parent
                .descendants()
                .skip(1)
                .filter(|n| is_xref_of_kind(*n, kind))
                .collect();
            (xrefs.len() > 1).then_some((parent, xrefs))
        })
        .collect()
}

/// Segments of `markup` each starting at an `<xref` opening tag.
fn xref_segments(markup: &str) -> Vec<&str> {
    let starts: Vec<usize> = markup
        .match_indices("<xref")
        .map(|(i, _)| i)
        .filter(|&i| {
            markup[i + "<xref".len()..]
                .chars()
                .next()
                .is_some_and(|c| c.is_whitespace() || c == '>' || c == '/')
        })
        .collect();

    starts
        .iter()
        .enumerate()
        .map(|(k, &start)| {
            let end = starts.get(k + 1).copied().unwrap_or(markup.len());
            &markup[start..end]
        })
        .collect()
}

fn segment_kind(segment: &str) -> Option<&str> {
    REF_TYPE_ATTR
        .captures(segment)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Whether the text right after the element closing in `segment` starts with `-`.
fn range_marker_follows(segment: &str) -> bool {
    let delimiter = if segment.contains("</xref>") {
        "</xref>"
    } else if segment.contains("/>") {
        "/>"
    } else {
        return false;
    };

    segment
        .find(delimiter)
        .map(|pos| &segment[pos + delimiter.len()..])
        .is_some_and(|tail| tail.replace("<sup>", "").replace("</sup>", "").starts_with('-'))
}

/// Numeric id of a `rid` such as `B12`: first character dropped, rest digits.
fn rid_number(rid: Option<&str>) -> Option<u32> {
    let mut chars = rid?.chars();
    chars.next()?;
    let rest = chars.as_str();
    if rest.is_empty() || !rest.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    rest.parse().ok()
}

/// Ranges recovered for one cross-reference kind, in document order.
///
/// Empty unless the kind uses a numeric style. A pair nested under
/// several parents is reported once.
pub fn xref_ranges<'a, 'input>(root: Node<'a, 'input>, kind: &str) -> Vec<XrefRange<'a, 'input>> {
    if !is_numeric_style(root, kind) {
        return Vec::new();
    }

    let mut ranges: Vec<XrefRange<'a, 'input>> = Vec::new();
    for (parent, xrefs) in xref_parents(root, kind) {
        let segments = xref_segments(raw_xml(parent))
            .into_iter()
            .filter(|segment| segment_kind(segment) == Some(kind));

        for (k, segment) in segments.enumerate() {
            let (Some(&first), Some(&last)) = (xrefs.get(k), xrefs.get(k + 1)) else {
                break;
            };
            // Nested parents see the same pair again
            if !range_marker_follows(segment) || ranges.iter().any(|r| r.first == first) {
                continue;
            }
            if let (Some(start), Some(end)) = (
                rid_number(first.attribute("rid")),
                rid_number(last.attribute("rid")),
            ) {
                ranges.push(XrefRange {
                    start,
                    end,
                    first,
                    last,
                });
            }
        }
    }
    ranges
}

/// Ranges for every cross-reference kind present under `root`.
pub fn citation_ranges(root: Node<'_, '_>) -> BTreeMap<String, Vec<CitationRange>> {
    let kinds: BTreeSet<&str> = root
        .descendants()
        .filter(|n| is_named(*n, "xref"))
        .filter_map(|n| n.attribute("ref-type"))
        .collect();

    kinds
        .into_iter()
        .map(|kind| {
            let ranges = xref_ranges(root, kind)
                .iter()
                .map(XrefRange::to_citation_range)
                .collect::<Vec<_>>();
            (kind.to_string(), ranges)
        })
        .filter(|(_, ranges)| !ranges.is_empty())
        .collect()
}
