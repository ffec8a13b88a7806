#![forbid(unsafe_code)]

//! Template materialization.
//!
//! Turns a [`ModalConfig`] into a concrete DOM subtree under the shared
//! backdrop and returns the [`DomHandles`] the engine keeps.
//!
//! Templates are arbitrary markup. The engine only relies on three optional
//! regions, resolved by class into [`TemplateRegions`]:
//!
//! | Region | Selector | Used for |
//! |--------|----------|----------|
//! | title | `.modal-title` | close button host, fixed header |
//! | title text | `.modal-title p` | title markup |
//! | content | `.modal-content` | content markup |
//!
//! A missing region is fine unless the configuration has something to put
//! into it.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Bad class token | `customClass` / `closeBtnClass` token fails the grammar | `InvalidClassName`, nothing attached |
//! | Title without holder | Non-empty title, no `.modal-title p` | `TemplateMissingTitleRegion`, nothing attached |
//! | Content without holder | Non-empty content, no `.modal-content` | `TemplateMissingContentRegion`, nothing attached |

use tracing::debug_span;
use veil_dom::{Document, NodeId};

use crate::convention::{
    BACKDROP_ID, CHILD_ANIMATED_TRANSITION, CLOSE_BUTTON_CLASS, CLOSE_BUTTON_TAG, CONTENT_REGION,
    HEADER_FIXED_CLASS, MIN_WIDTH_PIN_THRESHOLD, MODAL_CLASS, TITLE_REGION, TITLE_TEXT,
    TRANSITION_ATTRIBUTE,
};
use crate::error::{ModalError, Result};
use crate::options::ModalConfig;

/// Nodes the engine keeps for one materialized modal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DomHandles {
    /// The modal root (`div.modal`).
    pub root: NodeId,
    /// The synthesized close button, if any.
    pub close_button: Option<NodeId>,
}

/// Optional regions resolved inside a modal root.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TemplateRegions {
    pub title: Option<NodeId>,
    pub title_text: Option<NodeId>,
    pub content: Option<NodeId>,
}

impl TemplateRegions {
    /// Locate the regions under `root`.
    pub fn resolve<D: Document + ?Sized>(doc: &D, root: NodeId) -> Self {
        Self {
            title: doc.query_selector(root, TITLE_REGION),
            title_text: doc.query_selector(root, TITLE_TEXT),
            content: doc.query_selector(root, CONTENT_REGION),
        }
    }

    /// Fail if the configuration has title or content with nowhere to go.
    pub fn check(&self, config: &ModalConfig) -> Result<()> {
        if !config.title.is_empty() && self.title_text.is_none() {
            return Err(ModalError::TemplateMissingTitleRegion);
        }
        if !config.content.is_empty() && self.content.is_none() {
            return Err(ModalError::TemplateMissingContentRegion);
        }
        Ok(())
    }
}

/// Whether `token` is a valid class name: an ASCII alphanumeric followed by
/// ASCII alphanumerics, `_` or `-`.
#[must_use]
pub fn is_valid_class_name(token: &str) -> bool {
    let mut chars = token.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphanumeric())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Split a space-separated class list, validating every token.
pub fn parse_class_list(list: &str) -> Result<Vec<&str>> {
    list.split_whitespace()
        .map(|token| {
            if is_valid_class_name(token) {
                Ok(token)
            } else {
                Err(ModalError::InvalidClassName(token.to_owned()))
            }
        })
        .collect()
}

/// Find or create the shared backdrop, the first child of body.
pub fn ensure_backdrop<D: Document + ?Sized>(doc: &mut D) -> NodeId {
    if let Some(existing) = doc.element_by_id(BACKDROP_ID) {
        return existing;
    }
    let backdrop = doc.create_element("div");
    doc.set_id(backdrop, BACKDROP_ID);
    let body = doc.body();
    doc.prepend_child(body, backdrop);
    backdrop
}

/// Format a pixel length.
pub(crate) fn px(value: u32) -> String {
    format!("{value}px")
}

/// Format a millisecond duration.
pub(crate) fn millis(value: u64) -> String {
    format!("{value}ms")
}

/// Set or clear inline height and width on `root`.
///
/// Widths under the pin threshold also pin `min-width`, otherwise the
/// stylesheet minimum wins. Clearing the width clears the pin too.
pub fn apply_size<D: Document + ?Sized>(
    doc: &mut D,
    root: NodeId,
    height: Option<u32>,
    width: Option<u32>,
) {
    match height {
        Some(h) => doc.set_style(root, "height", &px(h)),
        None => doc.remove_style(root, "height"),
    }
    match width {
        Some(w) => {
            doc.set_style(root, "width", &px(w));
            if w < MIN_WIDTH_PIN_THRESHOLD {
                doc.set_style(root, "min-width", &px(w));
            } else {
                doc.remove_style(root, "min-width");
            }
        }
        None => {
            doc.remove_style(root, "width");
            doc.remove_style(root, "min-width");
        }
    }
}

/// Build the close button and place it: inside the title region when there
/// is one, otherwise as the first child of `root`.
pub fn build_close_button<D: Document + ?Sized>(
    doc: &mut D,
    root: NodeId,
    title_region: Option<NodeId>,
    config: &ModalConfig,
) -> Result<NodeId> {
    let extra = parse_class_list(&config.close_btn_class)?;

    let button = doc.create_element(CLOSE_BUTTON_TAG);
    let mut class = String::from(CLOSE_BUTTON_CLASS);
    for token in extra {
        class.push(' ');
        class.push_str(token);
    }
    doc.set_attribute(button, "class", &class);
    doc.set_inner_html(button, &config.close_btn);

    match title_region {
        Some(header) => doc.append_child(header, button),
        None => doc.prepend_child(root, button),
    }
    Ok(button)
}

/// Write title and content into whichever regions exist.
pub fn populate<D: Document + ?Sized>(doc: &mut D, regions: &TemplateRegions, config: &ModalConfig) {
    if !config.title.is_empty()
        && let Some(holder) = regions.title_text
    {
        doc.set_inner_html(holder, &config.title);
    }
    if !config.content.is_empty()
        && let Some(holder) = regions.content
    {
        doc.set_inner_html(holder, &config.content);
    }
}

/// Render `config` into a new root appended to `backdrop`.
///
/// Nothing is attached on failure; the detached root is dropped.
pub fn materialize<D: Document + ?Sized>(
    doc: &mut D,
    backdrop: NodeId,
    config: &ModalConfig,
) -> Result<DomHandles> {
    let _span = debug_span!("modal.materialize", id = %config.id).entered();

    let custom = parse_class_list(&config.custom_class)?;

    let root = doc.create_element("div");
    doc.set_id(root, &config.id);
    let mut class = String::from(MODAL_CLASS);
    for token in custom {
        class.push(' ');
        class.push_str(token);
    }
    doc.set_attribute(root, "class", &class);

    doc.set_inner_html(root, &config.template);
    let regions = TemplateRegions::resolve(doc, root);

    if config.header_fixed && regions.title.is_some() {
        doc.add_class(root, HEADER_FIXED_CLASS);
    }

    let close_button = if config.add_close_btn {
        Some(build_close_button(doc, root, regions.title, config)?)
    } else {
        None
    };

    regions.check(config)?;
    populate(doc, &regions, config);

    apply_size(doc, root, config.height, config.width);

    let duration = millis(config.transition_duration_ms);
    doc.set_style(root, "animation-duration", &duration);
    if config.transition == CHILD_ANIMATED_TRANSITION {
        for child in doc.children(root) {
            doc.set_style(child, "animation-duration", &duration);
        }
    }

    doc.set_attribute(root, TRANSITION_ATTRIBUTE, &config.transition);
    for (name, value) in &config.attributes {
        doc.set_attribute(root, &format!("data-{name}"), value);
    }

    doc.append_child(backdrop, root);
    tracing::debug!(id = %config.id, root = %root, "modal materialized");

    Ok(DomHandles { root, close_button })
}
