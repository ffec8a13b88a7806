#![forbid(unsafe_code)]

//! Forgiving HTML fragment parser and serializer.
//!
//! Templates, titles and contents are author-supplied markup snippets. The
//! parser accepts what a browser's `innerHTML` would accept for those
//! snippets: nested elements, quoted/unquoted/bare attributes, void and
//! self-closing elements, comments, and stray `<` characters. Character
//! references are kept verbatim (`&#10006` survives a round trip).
//!
//! # Invariants
//!
//! 1. Parsing never fails. Malformed input degrades to text.
//! 2. Unclosed elements are closed at the end of input; unmatched end tags
//!    are dropped.
//! 3. Adjacent text runs are merged into one text node.
//! 4. Tag and attribute names are lowercased; the first occurrence of a
//!    duplicated attribute wins.

/// Elements that never have children or an end tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// A parsed markup node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupNode {
    /// An element with attributes and children.
    Element {
        /// Lowercased tag name.
        tag: String,
        /// Attributes in source order.
        attributes: Vec<(String, String)>,
        /// Child nodes.
        children: Vec<MarkupNode>,
    },
    /// Raw text (character references untouched).
    Text(String),
    /// Comment body without delimiters.
    Comment(String),
}

/// Whether `tag` is a void element.
#[must_use]
pub fn is_void_element(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

struct OpenElement {
    tag: String,
    attributes: Vec<(String, String)>,
    children: Vec<MarkupNode>,
}

impl OpenElement {
    fn finish(self) -> MarkupNode {
        MarkupNode::Element {
            tag: self.tag,
            attributes: self.attributes,
            children: self.children,
        }
    }
}

struct TreeBuilder {
    roots: Vec<MarkupNode>,
    stack: Vec<OpenElement>,
}

impl TreeBuilder {
    fn push(&mut self, node: MarkupNode) {
        let siblings = match self.stack.last_mut() {
            Some(open) => &mut open.children,
            None => &mut self.roots,
        };
        if let MarkupNode::Text(text) = &node
            && let Some(MarkupNode::Text(previous)) = siblings.last_mut()
        {
            previous.push_str(text);
            return;
        }
        siblings.push(node);
    }

    fn close(&mut self, tag: &str) {
        let Some(depth) = self.stack.iter().rposition(|open| open.tag == tag) else {
            return;
        };
        while self.stack.len() > depth {
            if let Some(open) = self.stack.pop() {
                let node = open.finish();
                self.push(node);
            }
        }
    }

    fn finish(mut self) -> Vec<MarkupNode> {
        while let Some(open) = self.stack.pop() {
            let node = open.finish();
            self.push(node);
        }
        self.roots
    }
}

/// Parse a markup fragment into a node list.
///
/// ```
/// use veil_dom::markup::{parse_fragment, MarkupNode};
///
/// let nodes = parse_fragment(r#"<header class="modal-title"><p></p></header>"#);
/// assert_eq!(nodes.len(), 1);
/// assert!(matches!(&nodes[0], MarkupNode::Element { tag, .. } if tag == "header"));
/// ```
#[must_use]
pub fn parse_fragment(input: &str) -> Vec<MarkupNode> {
    let mut builder = TreeBuilder {
        roots: Vec::new(),
        stack: Vec::new(),
    };
    let mut rest = input;

    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix("<!--") {
            let (body, tail) = match after.find("-->") {
                Some(end) => (&after[..end], &after[end + 3..]),
                None => (after, ""),
            };
            builder.push(MarkupNode::Comment(body.to_owned()));
            rest = tail;
            continue;
        }

        if let Some(after) = rest.strip_prefix("</")
            && let Some((tag, tail)) = parse_end_tag(after)
        {
            builder.close(&tag);
            rest = tail;
            continue;
        }

        if let Some(after) = rest.strip_prefix('<')
            && let Some((start, tail)) = parse_start_tag(after)
        {
            if start.self_closing || is_void_element(&start.tag) {
                builder.push(MarkupNode::Element {
                    tag: start.tag,
                    attributes: start.attributes,
                    children: Vec::new(),
                });
            } else {
                builder.stack.push(OpenElement {
                    tag: start.tag,
                    attributes: start.attributes,
                    children: Vec::new(),
                });
            }
            rest = tail;
            continue;
        }

        // Text up to the next '<' (a '<' that failed to parse is text too).
        let skip = rest.chars().next().map_or(0, char::len_utf8);
        let end = rest[skip..].find('<').map_or(rest.len(), |i| i + skip);
        builder.push(MarkupNode::Text(rest[..end].to_owned()));
        rest = &rest[end..];
    }

    builder.finish()
}

struct StartTag {
    tag: String,
    attributes: Vec<(String, String)>,
    self_closing: bool,
}

fn split_name(input: &str) -> (&str, &str) {
    let end = input
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == ':'))
        .unwrap_or(input.len());
    input.split_at(end)
}

fn parse_start_tag(input: &str) -> Option<(StartTag, &str)> {
    if !input.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return None;
    }
    let (name, mut rest) = split_name(input);
    let mut tag = StartTag {
        tag: name.to_ascii_lowercase(),
        attributes: Vec::new(),
        self_closing: false,
    };

    loop {
        rest = rest.trim_start();
        if let Some(tail) = rest.strip_prefix("/>") {
            tag.self_closing = true;
            return Some((tag, tail));
        }
        if let Some(tail) = rest.strip_prefix('>') {
            return Some((tag, tail));
        }
        if rest.is_empty() {
            return None;
        }
        if let Some(tail) = rest.strip_prefix('/') {
            rest = tail;
            continue;
        }

        let name_end = rest
            .find(|c: char| c.is_whitespace() || c == '=' || c == '>' || c == '/')
            .unwrap_or(rest.len());
        let attr_name = rest[..name_end].to_ascii_lowercase();
        rest = rest[name_end..].trim_start();

        let mut value = String::new();
        if let Some(tail) = rest.strip_prefix('=') {
            let tail = tail.trim_start();
            let (parsed, after) = parse_attribute_value(tail)?;
            value = parsed.to_owned();
            rest = after;
        }

        if !attr_name.is_empty() && !tag.attributes.iter().any(|(n, _)| *n == attr_name) {
            tag.attributes.push((attr_name, value));
        }
    }
}

fn parse_attribute_value(input: &str) -> Option<(&str, &str)> {
    for quote in ['"', '\''] {
        if let Some(body) = input.strip_prefix(quote) {
            let end = body.find(quote)?;
            return Some((&body[..end], &body[end + 1..]));
        }
    }
    let end = input
        .find(|c: char| c.is_whitespace() || c == '>')
        .unwrap_or(input.len());
    Some(input.split_at(end))
}

fn parse_end_tag(input: &str) -> Option<(String, &str)> {
    if !input.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return None;
    }
    let (name, rest) = split_name(input);
    let rest = rest.trim_start().strip_prefix('>')?;
    Some((name.to_ascii_lowercase(), rest))
}

/// Serialize a node list back to markup.
#[must_use]
pub fn serialize(nodes: &[MarkupNode]) -> String {
    let mut out = String::new();
    for node in nodes {
        write_node(&mut out, node);
    }
    out
}

fn write_node(out: &mut String, node: &MarkupNode) {
    match node {
        MarkupNode::Text(text) => out.push_str(text),
        MarkupNode::Comment(body) => {
            out.push_str("<!--");
            out.push_str(body);
            out.push_str("-->");
        }
        MarkupNode::Element {
            tag,
            attributes,
            children,
        } => {
            write_start_tag(out, tag, attributes.iter().map(|(n, v)| (n.as_str(), v.as_str())));
            if is_void_element(tag) {
                return;
            }
            for child in children {
                write_node(out, child);
            }
            write_end_tag(out, tag);
        }
    }
}

/// Write `<tag a="v" ...>` to `out`.
pub(crate) fn write_start_tag<'a>(
    out: &mut String,
    tag: &str,
    attributes: impl IntoIterator<Item = (&'a str, &'a str)>,
) {
    out.push('<');
    out.push_str(tag);
    for (name, value) in attributes {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(&value.replace('"', "&quot;"));
        out.push('"');
    }
    out.push('>');
}

/// Write `</tag>` to `out`.
pub(crate) fn write_end_tag(out: &mut String, tag: &str) {
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}
