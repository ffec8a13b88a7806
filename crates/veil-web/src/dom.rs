#![forbid(unsafe_code)]

//! [`Document`] over the browser DOM.
//!
//! Elements are interned into a handle table the first time the engine sees
//! them (created, queried or reported as an event target). A `js_sys::Map`
//! keyed by the element object keeps lookups O(1) and guarantees one handle
//! per element. [`Document::release`] drops a subtree's entries so detached
//! modals can be collected; handles are never reused.
//!
//! Custom events are not dispatched while the engine runs. They queue up as
//! [`PendingEvent`]s and the host delivers them once it has let go of the
//! engine, so listeners may call back into it.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Browser call throws | Invalid tag, selector or attribute name | Logged at `trace`, treated as a no-op / `None` |
//! | Element creation fails twice | Should not happen in a live document | Dangling handle, all operations ignore it |
//! | Released handle | Used after its modal was destroyed | Operations ignore it |
//! | No `<body>` yet | Script runs in `<head>` while loading | Falls back to `<html>` |

use std::cell::RefCell;

use js_sys::{Map, Object, Reflect};
use veil_dom::{CustomEvent, Document, NodeId};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CustomEventInit, Element, HtmlElement, Window};

use crate::error::{Result, WebError};

/// Handle returned when no element could be produced.
const DANGLING: NodeId = NodeId::from_raw(u32::MAX);

#[derive(Debug)]
struct NodeTable {
    elements: Vec<Option<Element>>,
    index: Map,
}

impl NodeTable {
    fn new() -> Self {
        Self {
            elements: Vec::new(),
            index: Map::new(),
        }
    }

    fn find(&self, element: &Element) -> Option<NodeId> {
        self.index
            .get(element)
            .as_f64()
            .map(|raw| NodeId::from_raw(raw as u32))
    }

    fn intern(&mut self, element: Element) -> NodeId {
        if let Some(node) = self.find(&element) {
            return node;
        }
        let Ok(raw) = u32::try_from(self.elements.len()) else {
            return DANGLING;
        };
        self.index.set(&element, &JsValue::from(raw));
        self.elements.push(Some(element));
        NodeId::from_raw(raw)
    }

    fn get(&self, node: NodeId) -> Option<&Element> {
        self.elements.get(node.raw() as usize)?.as_ref()
    }

    fn forget(&mut self, node: NodeId) {
        if let Some(slot) = self.elements.get_mut(node.raw() as usize)
            && let Some(element) = slot.take()
        {
            self.index.delete(&element);
        }
    }

    /// Forget `root` and every interned element inside it.
    fn forget_subtree(&mut self, root: NodeId) {
        let Some(root) = self.get(root).cloned() else {
            return;
        };
        for slot in &mut self.elements {
            if slot.as_ref().is_some_and(|e| root.contains(Some(&**e)))
                && let Some(element) = slot.take()
            {
                self.index.delete(&element);
            }
        }
    }

    fn live(&self) -> usize {
        self.elements.iter().filter(|slot| slot.is_some()).count()
    }
}

/// A notification waiting to be dispatched on its element.
#[derive(Debug)]
pub struct PendingEvent {
    target: Element,
    event: web_sys::CustomEvent,
}

impl PendingEvent {
    /// Dispatch the event; listeners run before this returns.
    pub fn deliver(self) {
        if let Err(err) = self.target.dispatch_event(&self.event) {
            log_js("dispatchEvent", &err);
        }
    }
}

/// The page document, addressed through interned handles.
#[derive(Debug)]
pub struct WebDocument {
    window: Window,
    document: web_sys::Document,
    table: RefCell<NodeTable>,
    pending: Vec<PendingEvent>,
}

impl WebDocument {
    /// Attach to the global window's document.
    pub fn from_window() -> Result<Self> {
        let window = web_sys::window().ok_or(WebError::NoWindow)?;
        let document = window.document().ok_or(WebError::NoDocument)?;
        Ok(Self {
            window,
            document,
            table: RefCell::new(NodeTable::new()),
            pending: Vec::new(),
        })
    }

    /// The underlying browser document.
    #[must_use]
    pub fn raw(&self) -> &web_sys::Document {
        &self.document
    }

    #[must_use]
    pub fn window(&self) -> &Window {
        &self.window
    }

    /// Handle for `element`, interning it on first sight.
    pub fn intern(&self, element: Element) -> NodeId {
        self.table.borrow_mut().intern(element)
    }

    /// Handle for `element` if it is already interned.
    #[must_use]
    pub fn find(&self, element: &Element) -> Option<NodeId> {
        self.table.borrow().find(element)
    }

    /// Drop the handle of `node` alone, leaving its descendants interned.
    pub fn forget(&self, node: NodeId) {
        self.table.borrow_mut().forget(node);
    }

    /// Number of elements currently interned.
    #[must_use]
    pub fn interned(&self) -> usize {
        self.table.borrow().live()
    }

    /// Take the notifications queued since the last call, in order.
    pub fn take_pending(&mut self) -> Vec<PendingEvent> {
        std::mem::take(&mut self.pending)
    }

    /// The element behind `node`.
    #[must_use]
    pub fn element(&self, node: NodeId) -> Option<Element> {
        self.table.borrow().get(node).cloned()
    }

    fn html(&self, node: NodeId) -> Option<HtmlElement> {
        self.element(node)?.dyn_into::<HtmlElement>().ok()
    }
}

fn log_js(operation: &str, err: &JsValue) {
    tracing::trace!(operation, error = ?err, "browser call failed");
}

impl Document for WebDocument {
    fn is_ready(&self) -> bool {
        Reflect::get(&self.document, &JsValue::from_str("readyState"))
            .ok()
            .and_then(|state| state.as_string())
            .is_some_and(|state| state != "loading")
    }

    fn body(&self) -> NodeId {
        let element = self
            .document
            .body()
            .map(Element::from)
            .or_else(|| self.document.document_element());
        element.map_or(DANGLING, |e| self.intern(e))
    }

    fn create_element(&mut self, tag: &str) -> NodeId {
        match self
            .document
            .create_element(tag)
            .or_else(|_| self.document.create_element("div"))
        {
            Ok(element) => self.intern(element),
            Err(err) => {
                log_js("createElement", &err);
                DANGLING
            }
        }
    }

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.document
            .get_element_by_id(id)
            .map(|e| self.intern(e))
    }

    fn query_selector(&self, scope: NodeId, selector: &str) -> Option<NodeId> {
        let scope = self.element(scope)?;
        match scope.query_selector(selector) {
            Ok(found) => found.map(|e| self.intern(e)),
            Err(err) => {
                log_js("querySelector", &err);
                None
            }
        }
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        let Some(element) = self.element(node) else {
            return Vec::new();
        };
        let collection = element.children();
        (0..collection.length())
            .filter_map(|i| collection.item(i))
            .map(|e| self.intern(e))
            .collect()
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.element(node)?.parent_element()?;
        Some(self.intern(parent))
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if let (Some(parent), Some(child)) = (self.element(parent), self.element(child))
            && let Err(err) = parent.append_child(&child)
        {
            log_js("appendChild", &err);
        }
    }

    fn prepend_child(&mut self, parent: NodeId, child: NodeId) {
        if let (Some(parent), Some(child)) = (self.element(parent), self.element(child))
            && let Err(err) = parent.insert_before(&child, parent.first_child().as_ref())
        {
            log_js("insertBefore", &err);
        }
    }

    fn remove(&mut self, node: NodeId) -> bool {
        match self.element(node) {
            Some(element) if element.parent_node().is_some() => {
                element.remove();
                true
            }
            _ => false,
        }
    }

    fn set_inner_html(&mut self, node: NodeId, markup: &str) {
        if let Some(element) = self.element(node) {
            element.set_inner_html(markup);
        }
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.element(node)?.get_attribute(name)
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        if let Some(element) = self.element(node)
            && let Err(err) = element.set_attribute(name, value)
        {
            log_js("setAttribute", &err);
        }
    }

    fn remove_attribute(&mut self, node: NodeId, name: &str) {
        if let Some(element) = self.element(node)
            && let Err(err) = element.remove_attribute(name)
        {
            log_js("removeAttribute", &err);
        }
    }

    fn style(&self, node: NodeId, property: &str) -> Option<String> {
        let value = self.html(node)?.style().get_property_value(property).ok()?;
        (!value.is_empty()).then_some(value)
    }

    fn set_style(&mut self, node: NodeId, property: &str, value: &str) {
        if let Some(element) = self.html(node)
            && let Err(err) = element.style().set_property(property, value)
        {
            log_js("style.setProperty", &err);
        }
    }

    fn remove_style(&mut self, node: NodeId, property: &str) {
        if let Some(element) = self.html(node)
            && let Err(err) = element.style().remove_property(property)
        {
            log_js("style.removeProperty", &err);
        }
    }

    fn offset_width(&self, node: NodeId) -> u32 {
        self.html(node)
            .map_or(0, |e| u32::try_from(e.offset_width()).unwrap_or(0))
    }

    fn viewport_width(&self) -> u32 {
        self.window
            .inner_width()
            .ok()
            .and_then(|w| w.as_f64())
            .map_or(0, |w| w.max(0.0) as u32)
    }

    fn dispatch_custom_event(&mut self, node: NodeId, event: &CustomEvent) {
        let Some(element) = self.element(node) else {
            return;
        };
        let detail = Object::new();
        let target = event
            .target
            .and_then(|t| self.element(t))
            .map_or(JsValue::NULL, JsValue::from);
        let stamped = Reflect::set(&detail, &"modal".into(), &JsValue::from_str(&event.modal))
            .and_then(|_| Reflect::set(&detail, &"target".into(), &target));
        if let Err(err) = stamped {
            log_js("CustomEvent.detail", &err);
        }

        let init = CustomEventInit::new();
        init.set_detail(&detail);
        match web_sys::CustomEvent::new_with_event_init_dict(&event.name, &init) {
            Ok(dom_event) => self.pending.push(PendingEvent {
                target: element,
                event: dom_event,
            }),
            Err(err) => log_js("new CustomEvent", &err),
        }
    }

    fn release(&mut self, node: NodeId) {
        self.table.get_mut().forget_subtree(node);
    }
}
