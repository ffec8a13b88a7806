#![forbid(unsafe_code)]

//! The host document capability.
//!
//! [`Document`] is deliberately narrow: it exposes exactly the operations the
//! modal engine performs against a page. Implementations decide how handles
//! map to real nodes ([`MemoryDocument`](crate::MemoryDocument) uses an
//! arena, a browser backend keeps a table of elements).
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Unknown handle | Handle from another document | Reads return `None`/empty, writes are ignored |
//! | Detached node | Node removed earlier | Operations apply to the detached subtree |
//! | Double removal | Delayed removal after a manual one | `remove` returns `false` |
//! | Bad selector | Unsupported selector syntax | `query_selector` returns `None` |

use crate::node::NodeId;

/// A named notification dispatched on a node.
///
/// Carries the identifier of the modal that emitted it and, for the
/// open-family notifications, the element that triggered the open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomEvent {
    /// Event name (`beforeOpen`, `open`, `beforeClose`, `closed`).
    pub name: String,
    /// DOM identifier of the emitting modal.
    pub modal: String,
    /// Element that triggered the transition, if any.
    pub target: Option<NodeId>,
}

impl CustomEvent {
    /// Create a new event.
    pub fn new(name: impl Into<String>, modal: impl Into<String>, target: Option<NodeId>) -> Self {
        Self {
            name: name.into(),
            modal: modal.into(),
            target,
        }
    }
}

/// Host document operations required by the modal engine.
///
/// Mutating operations take `&mut self`; the engine owns its document and
/// never holds a handle across a host callback.
pub trait Document {
    /// Whether the document has reached an interactive ready state.
    fn is_ready(&self) -> bool;

    /// The body element. Always present.
    fn body(&self) -> NodeId;

    /// Create a detached element with the given tag name.
    fn create_element(&mut self, tag: &str) -> NodeId;

    /// Find a connected element by its `id` attribute.
    fn element_by_id(&self, id: &str) -> Option<NodeId>;

    /// First descendant of `scope` (document order) matching `selector`.
    fn query_selector(&self, scope: NodeId, selector: &str) -> Option<NodeId>;

    /// Element children of `node`, in order.
    fn children(&self, node: NodeId) -> Vec<NodeId>;

    /// Parent of `node`, if attached.
    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// Append `child` as the last child of `parent`, detaching it first.
    fn append_child(&mut self, parent: NodeId, child: NodeId);

    /// Insert `child` as the first child of `parent`, detaching it first.
    fn prepend_child(&mut self, parent: NodeId, child: NodeId);

    /// Detach `node` from its parent. Returns `false` if it had none.
    fn remove(&mut self, node: NodeId) -> bool;

    /// Replace the children of `node` with parsed `markup`.
    fn set_inner_html(&mut self, node: NodeId, markup: &str);

    /// Read an attribute.
    fn attribute(&self, node: NodeId, name: &str) -> Option<String>;

    /// Set an attribute, replacing any previous value.
    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str);

    /// Remove an attribute if present.
    fn remove_attribute(&mut self, node: NodeId, name: &str);

    /// Read an inline style property (kebab-case, e.g. `min-width`).
    fn style(&self, node: NodeId, property: &str) -> Option<String>;

    /// Set an inline style property.
    fn set_style(&mut self, node: NodeId, property: &str, value: &str);

    /// Remove an inline style property.
    fn remove_style(&mut self, node: NodeId, property: &str);

    /// Rendered width of `node` in CSS pixels.
    fn offset_width(&self, node: NodeId) -> u32;

    /// Width of the viewport in CSS pixels.
    fn viewport_width(&self) -> u32;

    /// Dispatch a custom event on `node`.
    ///
    /// Backends may defer delivery until the caller is done with the
    /// document; event order is preserved either way.
    fn dispatch_custom_event(&mut self, node: NodeId, event: &CustomEvent);

    // --- Provided helpers ---

    /// The caller holds no further handle to `node` or its descendants.
    ///
    /// Backends that keep node handles alive may drop them here. Handles
    /// used after release refer to nothing.
    fn release(&mut self, node: NodeId) {
        let _ = node;
    }

    /// The `id` attribute of `node`.
    fn id(&self, node: NodeId) -> Option<String> {
        self.attribute(node, "id")
    }

    /// Set the `id` attribute of `node`.
    fn set_id(&mut self, node: NodeId, id: &str) {
        self.set_attribute(node, "id", id);
    }

    /// Whether the class list of `node` contains `class`.
    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.attribute(node, "class")
            .is_some_and(|list| list.split_whitespace().any(|c| c == class))
    }

    /// Add `class` to the class list of `node` (no duplicates).
    fn add_class(&mut self, node: NodeId, class: &str) {
        if self.has_class(node, class) {
            return;
        }
        let list = match self.attribute(node, "class") {
            Some(existing) if !existing.trim().is_empty() => format!("{} {class}", existing.trim()),
            _ => class.to_owned(),
        };
        self.set_attribute(node, "class", &list);
    }

    /// Remove every occurrence of `class` from the class list of `node`.
    fn remove_class(&mut self, node: NodeId, class: &str) {
        let Some(existing) = self.attribute(node, "class") else {
            return;
        };
        let kept: Vec<&str> = existing
            .split_whitespace()
            .filter(|c| *c != class)
            .collect();
        self.set_attribute(node, "class", &kept.join(" "));
    }

    /// Whether `node` is shown with an inline `display: block`.
    fn is_displayed(&self, node: NodeId) -> bool {
        self.style(node, "display").as_deref() == Some("block")
    }

    /// Whether `node` is `ancestor` or one of its descendants.
    fn is_inclusive_descendant(&self, node: NodeId, ancestor: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(n) = current {
            if n == ancestor {
                return true;
            }
            current = self.parent(n);
        }
        false
    }
}
