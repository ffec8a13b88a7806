#![forbid(unsafe_code)]

//! Arena-backed in-memory document.
//!
//! [`MemoryDocument`] implements [`Document`] without a browser. Nodes live
//! in a flat arena and are never freed; detaching a node only unlinks it,
//! so stale handles held by delayed tasks stay harmless.
//!
//! Layout is not modelled. [`Document::offset_width`] reports the inline
//! `width` in pixels when present, otherwise a per-node natural width set by
//! [`MemoryDocument::set_natural_width`], otherwise the document default.
//!
//! Dispatched custom events are recorded in order and can be inspected with
//! [`MemoryDocument::dispatched`].

use crate::document::{CustomEvent, Document};
use crate::markup::{self, MarkupNode};
use crate::node::NodeId;
use crate::selector::Selector;

/// Default viewport width for a fresh document.
pub const DEFAULT_VIEWPORT_WIDTH: u32 = 1280;

#[derive(Debug, Clone)]
struct ElementData {
    tag: String,
    attributes: Vec<(String, String)>,
    styles: Vec<(String, String)>,
    natural_width: Option<u32>,
}

impl ElementData {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attributes: Vec::new(),
            styles: Vec::new(),
            natural_width: None,
        }
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    fn style_text(&self) -> String {
        self.styles
            .iter()
            .map(|(p, v)| format!("{p}: {v};"))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn set_style_text(&mut self, text: &str) {
        self.styles.clear();
        for declaration in text.split(';') {
            if let Some((property, value)) = declaration.split_once(':') {
                let property = property.trim().to_ascii_lowercase();
                let value = value.trim();
                if !property.is_empty() && !value.is_empty() {
                    upsert(&mut self.styles, &property, value);
                }
            }
        }
    }
}

#[derive(Debug, Clone)]
enum NodeKind {
    Element(ElementData),
    Text(String),
    Comment(String),
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

fn upsert(pairs: &mut Vec<(String, String)>, name: &str, value: &str) {
    match pairs.iter_mut().find(|(n, _)| n == name) {
        Some(pair) => pair.1 = value.to_owned(),
        None => pairs.push((name.to_owned(), value.to_owned())),
    }
}

/// In-memory [`Document`] implementation.
///
/// # Example
///
/// ```
/// use veil_dom::{Document, MemoryDocument};
///
/// let mut doc = MemoryDocument::new();
/// let body = doc.body();
/// let div = doc.create_element("div");
/// doc.set_inner_html(div, r#"<p class="greeting">Hello</p>"#);
/// doc.append_child(body, div);
///
/// let p = doc.query_selector(body, "div .greeting").unwrap();
/// assert_eq!(doc.text_content(p), "Hello");
/// ```
#[derive(Debug, Clone)]
pub struct MemoryDocument {
    nodes: Vec<NodeData>,
    body: NodeId,
    ready: bool,
    viewport_width: u32,
    default_offset_width: u32,
    dispatched: Vec<(NodeId, CustomEvent)>,
    released: Vec<NodeId>,
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDocument {
    /// Create a ready document with an empty body.
    #[must_use]
    pub fn new() -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            body: NodeId::from_raw(0),
            ready: true,
            viewport_width: DEFAULT_VIEWPORT_WIDTH,
            default_offset_width: 0,
            dispatched: Vec::new(),
            released: Vec::new(),
        };
        doc.body = doc.alloc(NodeKind::Element(ElementData::new("body")));
        doc
    }

    /// Create a document that is still loading; see [`MemoryDocument::set_ready`].
    #[must_use]
    pub fn loading() -> Self {
        Self {
            ready: false,
            ..Self::new()
        }
    }

    /// Set the viewport width (builder form).
    #[must_use]
    pub fn with_viewport_width(mut self, width: u32) -> Self {
        self.viewport_width = width;
        self
    }

    /// Mark the document as ready.
    pub fn set_ready(&mut self) {
        self.ready = true;
    }

    /// Change the viewport width, as a window resize would.
    pub fn set_viewport_width(&mut self, width: u32) {
        self.viewport_width = width;
    }

    /// Width reported for elements without an inline or natural width.
    pub fn set_default_offset_width(&mut self, width: u32) {
        self.default_offset_width = width;
    }

    /// Give `node` an intrinsic rendered width, used when no inline width is set.
    pub fn set_natural_width(&mut self, node: NodeId, width: u32) {
        if let Some(element) = self.element_mut(node) {
            element.natural_width = Some(width);
        }
    }

    /// Custom events dispatched so far, in dispatch order.
    #[must_use]
    pub fn dispatched(&self) -> &[(NodeId, CustomEvent)] {
        &self.dispatched
    }

    /// Take and clear the dispatched event log.
    pub fn take_dispatched(&mut self) -> Vec<(NodeId, CustomEvent)> {
        std::mem::take(&mut self.dispatched)
    }

    /// Nodes released by the caller, in release order. Arena nodes stay
    /// readable after release.
    #[must_use]
    pub fn released(&self) -> &[NodeId] {
        &self.released
    }

    /// Tag name of an element.
    #[must_use]
    pub fn tag_name(&self, node: NodeId) -> Option<&str> {
        self.element(node).map(|e| e.tag.as_str())
    }

    /// Whether `node` is attached (transitively) to the body.
    #[must_use]
    pub fn is_connected(&self, node: NodeId) -> bool {
        self.ancestors_inclusive(node).any(|n| n == self.body)
    }

    /// Concatenated text of `node` and its descendants.
    #[must_use]
    pub fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(node, &mut out);
        out
    }

    /// Serialized children of `node`.
    #[must_use]
    pub fn inner_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        if let Some(data) = self.get(node) {
            for &child in &data.children {
                self.write_outer(child, &mut out);
            }
        }
        out
    }

    /// Serialized `node` including itself.
    #[must_use]
    pub fn outer_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_outer(node, &mut out);
        out
    }

    /// All elements matching `selector` under `scope`, in document order.
    #[must_use]
    pub fn query_selector_all(&self, scope: NodeId, selector: &str) -> Vec<NodeId> {
        let Some(selector) = Selector::parse(selector) else {
            return Vec::new();
        };
        self.descendants(scope)
            .into_iter()
            .filter(|&n| self.matches(n, &selector))
            .collect()
    }

    // --- Arena internals ---

    fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let raw = u32::try_from(self.nodes.len()).unwrap_or(u32::MAX);
        self.nodes.push(NodeData {
            kind,
            parent: None,
            children: Vec::new(),
        });
        NodeId::from_raw(raw)
    }

    fn get(&self, node: NodeId) -> Option<&NodeData> {
        self.nodes.get(node.index())
    }

    fn element(&self, node: NodeId) -> Option<&ElementData> {
        match &self.get(node)?.kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    fn element_mut(&mut self, node: NodeId) -> Option<&mut ElementData> {
        match &mut self.nodes.get_mut(node.index())?.kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    fn ancestors_inclusive(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let start = self.get(node).map(|_| node);
        std::iter::successors(start, move |&n| self.get(n).and_then(|d| d.parent))
    }

    /// Element descendants of `scope` in document order (excluding `scope`).
    fn descendants(&self, scope: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = match self.get(scope) {
            Some(data) => data.children.iter().rev().copied().collect(),
            None => return out,
        };
        while let Some(node) = stack.pop() {
            let Some(data) = self.get(node) else {
                continue;
            };
            if matches!(data.kind, NodeKind::Element(_)) {
                out.push(node);
                stack.extend(data.children.iter().rev().copied());
            }
        }
        out
    }

    fn matches(&self, node: NodeId, selector: &Selector) -> bool {
        let chain = self
            .ancestors_inclusive(node)
            .filter_map(|n| self.element(n))
            .map(|element| {
                (element.tag.as_str(), move |name: &str| element.attribute(name))
            });
        selector.matches_chain(chain)
    }

    fn detach(&mut self, node: NodeId) -> bool {
        let Some(parent) = self.get(node).and_then(|d| d.parent) else {
            return false;
        };
        if let Some(parent_data) = self.nodes.get_mut(parent.index()) {
            parent_data.children.retain(|&c| c != node);
        }
        if let Some(data) = self.nodes.get_mut(node.index()) {
            data.parent = None;
        }
        true
    }

    /// Whether linking `child` under `parent` is structurally valid.
    fn can_adopt(&self, parent: NodeId, child: NodeId) -> bool {
        if self.element(parent).is_none() || self.get(child).is_none() {
            return false;
        }
        if self.ancestors_inclusive(parent).any(|n| n == child) {
            #[cfg(feature = "tracing")]
            tracing::warn!(%parent, %child, "hierarchy request rejected: child contains parent");
            return false;
        }
        true
    }

    fn insert_child(&mut self, parent: NodeId, child: NodeId, at_front: bool) {
        if !self.can_adopt(parent, child) {
            return;
        }
        self.detach(child);
        if let Some(parent_data) = self.nodes.get_mut(parent.index()) {
            if at_front {
                parent_data.children.insert(0, child);
            } else {
                parent_data.children.push(child);
            }
        }
        if let Some(child_data) = self.nodes.get_mut(child.index()) {
            child_data.parent = Some(parent);
        }
    }

    fn build(&mut self, markup: MarkupNode, parent: NodeId) {
        let node = match markup {
            MarkupNode::Text(text) => self.alloc(NodeKind::Text(text)),
            MarkupNode::Comment(body) => self.alloc(NodeKind::Comment(body)),
            MarkupNode::Element {
                tag,
                attributes,
                children,
            } => {
                let mut element = ElementData::new(&tag);
                for (name, value) in attributes {
                    if name == "style" {
                        element.set_style_text(&value);
                    } else {
                        element.attributes.push((name, value));
                    }
                }
                let node = self.alloc(NodeKind::Element(element));
                for child in children {
                    self.build(child, node);
                }
                node
            }
        };
        self.insert_child(parent, node, false);
    }

    fn collect_text(&self, node: NodeId, out: &mut String) {
        let Some(data) = self.get(node) else {
            return;
        };
        match &data.kind {
            NodeKind::Text(text) => out.push_str(text),
            NodeKind::Comment(_) => {}
            NodeKind::Element(_) => {
                for &child in &data.children {
                    self.collect_text(child, out);
                }
            }
        }
    }

    fn write_outer(&self, node: NodeId, out: &mut String) {
        let Some(data) = self.get(node) else {
            return;
        };
        match &data.kind {
            NodeKind::Text(text) => out.push_str(text),
            NodeKind::Comment(body) => {
                out.push_str("<!--");
                out.push_str(body);
                out.push_str("-->");
            }
            NodeKind::Element(element) => {
                let style = element.style_text();
                let attributes = element
                    .attributes
                    .iter()
                    .map(|(n, v)| (n.as_str(), v.as_str()))
                    .chain((!style.is_empty()).then_some(("style", style.as_str())));
                markup::write_start_tag(out, &element.tag, attributes);
                if markup::is_void_element(&element.tag) {
                    return;
                }
                for &child in &data.children {
                    self.write_outer(child, out);
                }
                markup::write_end_tag(out, &element.tag);
            }
        }
    }
}

fn parse_px(value: &str) -> Option<u32> {
    let number = value.trim().strip_suffix("px")?.trim();
    let parsed: f64 = number.parse().ok()?;
    if parsed.is_finite() && parsed >= 0.0 {
        // Saturating cast; fractional pixels round down.
        Some(parsed as u32)
    } else {
        None
    }
}

impl Document for MemoryDocument {
    fn is_ready(&self) -> bool {
        self.ready
    }

    fn body(&self) -> NodeId {
        self.body
    }

    fn create_element(&mut self, tag: &str) -> NodeId {
        self.alloc(NodeKind::Element(ElementData::new(tag)))
    }

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.descendants(self.body)
            .into_iter()
            .find(|&n| self.element(n).and_then(|e| e.attribute("id")) == Some(id))
    }

    fn query_selector(&self, scope: NodeId, selector: &str) -> Option<NodeId> {
        let selector = Selector::parse(selector)?;
        self.descendants(scope)
            .into_iter()
            .find(|&n| self.matches(n, &selector))
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.get(node)
            .map(|data| {
                data.children
                    .iter()
                    .copied()
                    .filter(|&c| self.element(c).is_some())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.get(node)?.parent
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.insert_child(parent, child, false);
    }

    fn prepend_child(&mut self, parent: NodeId, child: NodeId) {
        self.insert_child(parent, child, true);
    }

    fn remove(&mut self, node: NodeId) -> bool {
        self.detach(node)
    }

    fn set_inner_html(&mut self, node: NodeId, markup: &str) {
        if self.element(node).is_none() {
            return;
        }
        let old = self
            .nodes
            .get_mut(node.index())
            .map(|data| std::mem::take(&mut data.children))
            .unwrap_or_default();
        for child in old {
            if let Some(data) = self.nodes.get_mut(child.index()) {
                data.parent = None;
            }
        }
        for parsed in markup::parse_fragment(markup) {
            self.build(parsed, node);
        }
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        let element = self.element(node)?;
        if name.eq_ignore_ascii_case("style") {
            return (!element.styles.is_empty()).then(|| element.style_text());
        }
        element.attribute(&name.to_ascii_lowercase()).map(str::to_owned)
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        let name = name.to_ascii_lowercase();
        if let Some(element) = self.element_mut(node) {
            if name == "style" {
                element.set_style_text(value);
            } else {
                upsert(&mut element.attributes, &name, value);
            }
        }
    }

    fn remove_attribute(&mut self, node: NodeId, name: &str) {
        let name = name.to_ascii_lowercase();
        if let Some(element) = self.element_mut(node) {
            if name == "style" {
                element.styles.clear();
            } else {
                element.attributes.retain(|(n, _)| *n != name);
            }
        }
    }

    fn style(&self, node: NodeId, property: &str) -> Option<String> {
        self.element(node)?
            .styles
            .iter()
            .find(|(p, _)| p == property)
            .map(|(_, v)| v.clone())
    }

    fn set_style(&mut self, node: NodeId, property: &str, value: &str) {
        if value.is_empty() {
            self.remove_style(node, property);
            return;
        }
        if let Some(element) = self.element_mut(node) {
            upsert(&mut element.styles, property, value);
        }
    }

    fn remove_style(&mut self, node: NodeId, property: &str) {
        if let Some(element) = self.element_mut(node) {
            element.styles.retain(|(p, _)| p != property);
        }
    }

    fn offset_width(&self, node: NodeId) -> u32 {
        let Some(element) = self.element(node) else {
            return 0;
        };
        element
            .styles
            .iter()
            .find(|(p, _)| p == "width")
            .and_then(|(_, v)| parse_px(v))
            .or(element.natural_width)
            .unwrap_or(self.default_offset_width)
    }

    fn viewport_width(&self) -> u32 {
        self.viewport_width
    }

    fn dispatch_custom_event(&mut self, node: NodeId, event: &CustomEvent) {
        self.dispatched.push((node, event.clone()));
    }

    fn release(&mut self, node: NodeId) {
        self.released.push(node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn build_and_serialize() {
        let mut doc = MemoryDocument::new();
        let div = doc.create_element("div");
        doc.set_inner_html(div, r#"<header class="modal-title"><p>Hi</p></header>"#);
        doc.set_style(div, "width", "300px");
        doc.set_id(div, "a");
        assert_eq!(
            doc.outer_html(div),
            r#"<div id="a" style="width: 300px;"><header class="modal-title"><p>Hi</p></header></div>"#
        );
    }

    #[test]
    fn element_by_id_requires_connection() {
        let mut doc = MemoryDocument::new();
        let body = doc.body();
        let div = doc.create_element("div");
        doc.set_id(div, "x");
        assert_eq!(doc.element_by_id("x"), None);
        doc.append_child(body, div);
        assert_eq!(doc.element_by_id("x"), Some(div));
        assert!(doc.remove(div));
        assert_eq!(doc.element_by_id("x"), None);
    }

    #[test]
    fn removal_is_tolerant() {
        let mut doc = MemoryDocument::new();
        let body = doc.body();
        let div = doc.create_element("div");
        assert!(!doc.remove(div));
        doc.append_child(body, div);
        assert!(doc.remove(div));
        assert!(!doc.remove(div));
        assert!(!doc.remove(NodeId::from_raw(9_999)));
    }

    #[test]
    fn prepend_places_first() {
        let mut doc = MemoryDocument::new();
        let body = doc.body();
        let a = doc.create_element("a");
        let b = doc.create_element("b");
        doc.append_child(body, a);
        doc.prepend_child(body, b);
        assert_eq!(doc.children(body), vec![b, a]);
    }

    #[test]
    fn reparenting_moves_node() {
        let mut doc = MemoryDocument::new();
        let body = doc.body();
        let a = doc.create_element("div");
        let b = doc.create_element("div");
        let leaf = doc.create_element("span");
        doc.append_child(body, a);
        doc.append_child(body, b);
        doc.append_child(a, leaf);
        doc.append_child(b, leaf);
        assert!(doc.children(a).is_empty());
        assert_eq!(doc.children(b), vec![leaf]);
        assert_eq!(doc.parent(leaf), Some(b));
    }

    #[test]
    fn cycles_are_rejected() {
        let mut doc = MemoryDocument::new();
        let body = doc.body();
        let outer = doc.create_element("div");
        let inner = doc.create_element("div");
        doc.append_child(body, outer);
        doc.append_child(outer, inner);
        doc.append_child(inner, outer);
        assert_eq!(doc.parent(outer), Some(body));
        assert_eq!(doc.parent(inner), Some(outer));
    }

    #[test]
    fn set_inner_html_replaces_children() {
        let mut doc = MemoryDocument::new();
        let div = doc.create_element("div");
        doc.set_inner_html(div, "<p>one</p><p>two</p>");
        let old = doc.children(div);
        doc.set_inner_html(div, "three");
        assert_eq!(doc.inner_html(div), "three");
        assert!(doc.children(div).is_empty());
        assert!(old.iter().all(|&n| doc.parent(n).is_none()));
    }

    #[test]
    fn children_skip_text_nodes() {
        let mut doc = MemoryDocument::new();
        let div = doc.create_element("div");
        doc.set_inner_html(div, "text<p></p> <span></span>");
        assert_eq!(doc.children(div).len(), 2);
    }

    #[test]
    fn query_selector_descendant() {
        let mut doc = MemoryDocument::new();
        let root = doc.create_element("div");
        doc.set_inner_html(
            root,
            r#"<p>outside</p><header class="modal-title"><p>inside</p></header>"#,
        );
        let found = doc.query_selector(root, ".modal-title p").expect("title text");
        assert_eq!(doc.text_content(found), "inside");
        assert_eq!(doc.query_selector(root, ".modal-content"), None);
        assert_eq!(doc.query_selector(root, "div > p"), None);
    }

    #[test]
    fn query_selector_excludes_scope() {
        let mut doc = MemoryDocument::new();
        let root = doc.create_element("div");
        doc.set_attribute(root, "class", "modal");
        assert_eq!(doc.query_selector(root, ".modal"), None);
    }

    #[test]
    fn query_selector_all_in_document_order() {
        let mut doc = MemoryDocument::new();
        let body = doc.body();
        doc.set_inner_html(
            body,
            r#"<div class="modal" id="a"></div><div><div class="modal" id="b"></div></div>"#,
        );
        let ids: Vec<_> = doc
            .query_selector_all(body, ".modal")
            .into_iter()
            .filter_map(|n| doc.id(n))
            .collect();
        assert_eq!(ids, vec!["a".to_owned(), "b".to_owned()]);
    }

    #[test]
    fn class_helpers() {
        let mut doc = MemoryDocument::new();
        let div = doc.create_element("div");
        doc.add_class(div, "modal");
        doc.add_class(div, "close");
        doc.add_class(div, "close");
        assert_eq!(doc.attribute(div, "class").as_deref(), Some("modal close"));
        assert!(doc.has_class(div, "close"));
        doc.remove_class(div, "close");
        assert_eq!(doc.attribute(div, "class").as_deref(), Some("modal"));
        assert!(!doc.has_class(div, "close"));
    }

    #[test]
    fn style_attribute_round_trip() {
        let mut doc = MemoryDocument::new();
        let div = doc.create_element("div");
        doc.set_inner_html(div, r#"<p style="color: red; width:10px"></p>"#);
        let p = doc.children(div)[0];
        assert_eq!(doc.style(p, "width").as_deref(), Some("10px"));
        assert_eq!(doc.offset_width(p), 10);
        doc.set_style(p, "width", "");
        assert_eq!(doc.style(p, "width"), None);
        assert_eq!(doc.attribute(p, "style").as_deref(), Some("color: red;"));
    }

    #[test]
    fn offset_width_fallbacks() {
        let mut doc = MemoryDocument::new();
        let div = doc.create_element("div");
        assert_eq!(doc.offset_width(div), 0);
        doc.set_default_offset_width(500);
        assert_eq!(doc.offset_width(div), 500);
        doc.set_natural_width(div, 320);
        assert_eq!(doc.offset_width(div), 320);
        doc.set_style(div, "width", "200px");
        assert_eq!(doc.offset_width(div), 200);
        doc.set_style(div, "width", "auto");
        assert_eq!(doc.offset_width(div), 320);
    }

    #[test]
    fn displayed_and_descendant_helpers() {
        let mut doc = MemoryDocument::new();
        let body = doc.body();
        let div = doc.create_element("div");
        doc.append_child(body, div);
        assert!(!doc.is_displayed(div));
        doc.set_style(div, "display", "block");
        assert!(doc.is_displayed(div));
        assert!(doc.is_inclusive_descendant(div, body));
        assert!(doc.is_inclusive_descendant(div, div));
        assert!(!doc.is_inclusive_descendant(body, div));
    }

    #[test]
    fn dispatch_is_recorded() {
        let mut doc = MemoryDocument::new();
        let div = doc.create_element("div");
        doc.dispatch_custom_event(div, &CustomEvent::new("open", "a", None));
        assert_eq!(
            doc.take_dispatched(),
            vec![(div, CustomEvent::new("open", "a", None))]
        );
        assert!(doc.dispatched().is_empty());
    }

    #[test]
    fn loading_document_becomes_ready() {
        let mut doc = MemoryDocument::loading().with_viewport_width(800);
        assert!(!doc.is_ready());
        doc.set_ready();
        assert!(doc.is_ready());
        assert_eq!(doc.viewport_width(), 800);
    }
}
