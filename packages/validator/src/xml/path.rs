//! Relative path expressions over a `roxmltree` tree.
//!
//! Supports the subset of ElementTree paths the extractors use:
//!
//! - `.` (the context node), `./name`, `name/child`, `.//name` (any depth)
//! - `*` as a name wildcard
//! - predicates `[@attr]`, `[@attr="value"]` and `[child]`
//!
//! Attribute names may carry the `xml:` or `xlink:` prefix.

use roxmltree::Node;

use crate::config::XLINK_NS;
use crate::error::{Result, ValidatorError};

use super::utils::local_name;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Child,
    Descendant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum NameTest {
    Any,
    Name(String),
}

impl NameTest {
    fn matches(&self, node: Node<'_, '_>) -> bool {
        match self {
            Self::Any => true,
            Self::Name(name) => local_name(node) == name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Predicate {
    HasAttribute(String),
    AttributeEquals(String, String),
    HasChild(String),
}

impl Predicate {
    fn matches(&self, node: Node<'_, '_>) -> bool {
        match self {
            Self::HasAttribute(name) => attribute(node, name).is_some(),
            Self::AttributeEquals(name, value) => attribute(node, name) == Some(value.as_str()),
            Self::HasChild(name) => node
                .children()
                .any(|child| child.is_element() && local_name(child) == name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Step {
    axis: Axis,
    name: NameTest,
    predicates: Vec<Predicate>,
}

impl Step {
    fn matches(&self, node: Node<'_, '_>) -> bool {
        node.is_element() && self.name.matches(node) && self.predicates.iter().all(|p| p.matches(node))
    }
}

/// A compiled path expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XPath {
    steps: Vec<Step>,
}

impl XPath {
    /// Compile a path expression.
    ///
    /// # Examples
    /// ```
    /// use sps_validator::xml::XPath;
    ///
    /// assert!(XPath::parse(r#".//pub-date[@pub-type="epub"]"#).is_ok());
    /// assert!(XPath::parse("/article").is_err());
    /// ```
    pub fn parse(path: &str) -> Result<Self> {
        let invalid = || ValidatorError::InvalidPath(path.to_string());

        let path = path.trim();
        if path.is_empty() {
            return Err(invalid());
        }

        let segments = split_outside_brackets(path).ok_or_else(invalid)?;
        let mut steps = Vec::new();
        let mut axis = Axis::Child;

        for (index, segment) in segments.iter().enumerate() {
            if segment.is_empty() {
                // `//` selects any depth; a leading `/` would be absolute
                if index == 0 || axis == Axis::Descendant {
                    return Err(invalid());
                }
                axis = Axis::Descendant;
                continue;
            }
            if *segment == "." {
                if index != 0 {
                    return Err(invalid());
                }
                continue;
            }
            steps.push(parse_step(segment, axis).ok_or_else(invalid)?);
            axis = Axis::Child;
        }

        if axis == Axis::Descendant {
            return Err(invalid());
        }

        Ok(Self { steps })
    }

    /// Select the matching elements in document order.
    pub fn select<'a, 'input>(&self, context: Node<'a, 'input>) -> Vec<Node<'a, 'input>> {
        let mut current = vec![context];

        for step in &self.steps {
            let mut next: Vec<Node<'a, 'input>> = Vec::new();
            for node in &current {
                match step.axis {
                    Axis::Child => next.extend(node.children().filter(|n| step.matches(*n))),
                    Axis::Descendant => {
                        next.extend(node.descendants().skip(1).filter(|n| step.matches(*n)))
                    }
                }
            }
            next.sort_by_key(|n| n.range().start);
            next.dedup_by_key(|n| n.range().start);
            current = next;
        }

        current
    }
}

/// Split a path at `/` outside of predicate brackets and quotes.
fn split_outside_brackets(path: &str) -> Option<Vec<&str>> {
    let mut segments = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (i, c) in path.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '[') => depth += 1,
            (None, ']') => depth = depth.checked_sub(1)?,
            (None, '/') if depth == 0 => {
                segments.push(&path[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }

    if depth != 0 || quote.is_some() {
        return None;
    }
    segments.push(&path[start..]);
    Some(segments)
}

fn parse_step(segment: &str, axis: Axis) -> Option<Step> {
    let (name, mut rest) = match segment.find('[') {
        Some(pos) => (&segment[..pos], &segment[pos..]),
        None => (segment, ""),
    };

    let name = match name {
        "*" => NameTest::Any,
        n if is_name(n) => NameTest::Name(n.to_string()),
        _ => return None,
    };

    let mut predicates = Vec::new();
    while !rest.is_empty() {
        let inner_end = closing_bracket(rest)?;
        predicates.push(parse_predicate(&rest[1..inner_end])?);
        rest = &rest[inner_end + 1..];
    }

    Some(Step {
        axis,
        name,
        predicates,
    })
}

/// Position of the `]` closing the predicate that opens at `text[0]`.
fn closing_bracket(text: &str) -> Option<usize> {
    if !text.starts_with('[') {
        return None;
    }
    let mut quote: Option<char> = None;
    for (i, c) in text.char_indices().skip(1) {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, ']') => return Some(i),
            _ => {}
        }
    }
    None
}

fn parse_predicate(inner: &str) -> Option<Predicate> {
    let inner = inner.trim();
    let Some(attr) = inner.strip_prefix('@') else {
        return is_name(inner).then(|| Predicate::HasChild(inner.to_string()));
    };

    match attr.split_once('=') {
        None => is_name(attr).then(|| Predicate::HasAttribute(attr.to_string())),
        Some((name, value)) => {
            let name = name.trim();
            let value = value.trim();
            let unquoted = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))?;
            is_name(name)
                .then(|| Predicate::AttributeEquals(name.to_string(), unquoted.to_string()))
        }
    }
}

fn is_name(text: &str) -> bool {
    !text.is_empty()
        && text
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.' | ':'))
}

/// Attribute lookup that understands the `xml:` and `xlink:` prefixes.
fn attribute<'a>(node: Node<'a, '_>, name: &str) -> Option<&'a str> {
    match name.split_once(':') {
        Some(("xml", local)) => node.attribute((roxmltree::NS_XML_URI, local)),
        Some(("xlink", local)) => node.attribute((XLINK_NS, local)),
        Some((_, local)) => node
            .attributes()
            .find(|a| a.name() == local)
            .map(|a| a.value()),
        None => node.attribute(name),
    }
}
