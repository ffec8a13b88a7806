#![forbid(unsafe_code)]

//! Page-wide interaction routing.
//!
//! The host forwards three kinds of page events to the engine. Routing
//! starts once the document is ready; anything earlier is ignored.
//!
//! | Interaction | Condition | Effect |
//! |-------------|-----------|--------|
//! | click | target is or is inside a close button | close that modal |
//! | click | target has `data-modal="<id>"` | open `<id>` with the target |
//! | click | target has class `modal-close`, outside close buttons | close the displayed modal |
//! | click | target is the shown backdrop | close the displayed modal if `closeByOverlay` |
//! | keydown | Escape while the backdrop is shown | close the displayed modal if `escapeClose` |
//! | resize | backdrop shown | responsive width of the displayed modal |
//!
//! All click rules are evaluated for every click, in that order.

use veil_dom::{Document, NodeId};

use crate::convention::{CLOSE_MARKER_CLASS, OPEN_MARKER_ATTRIBUTE};
use crate::error::{ModalError, Result};
use crate::options::ModalConfig;
use crate::responsive;
use crate::system::ModalSystem;

/// A key as reported by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Escape,
    Other(String),
}

impl Key {
    /// From a DOM `KeyboardEvent.key` value.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "Escape" | "Esc" => Self::Escape,
            other => Self::Other(other.to_owned()),
        }
    }

    /// From a legacy `keyCode`.
    #[must_use]
    pub fn from_code(code: u32) -> Self {
        match code {
            27 => Self::Escape,
            other => Self::Other(other.to_string()),
        }
    }
}

/// A page event forwarded by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interaction {
    Click { target: NodeId },
    KeyDown { key: Key },
    Resize,
}

impl<D: Document> ModalSystem<D> {
    /// Route one page event.
    ///
    /// A click on a `data-modal` element naming no live modal fails with
    /// `UnknownModal` and stops the remaining click rules.
    pub fn handle_interaction(&mut self, interaction: &Interaction) -> Result<()> {
        if !self.ready {
            tracing::trace!(?interaction, "interaction before document ready");
            return Ok(());
        }
        match interaction {
            Interaction::Click { target } => self.route_click(*target),
            Interaction::KeyDown { key } => {
                if *key == Key::Escape && self.backdrop_visible() {
                    self.close_displayed(|config| config.escape_close)?;
                }
                Ok(())
            }
            Interaction::Resize => {
                if self.backdrop_visible()
                    && let Some(key) = self.displayed()
                    && let Some(instance) = self.registry.get(key)
                    && let Some(handles) = instance.handles
                {
                    let config = instance.config.clone();
                    responsive::apply(&mut self.doc, handles.root, &config);
                }
                Ok(())
            }
        }
    }

    fn route_click(&mut self, target: NodeId) -> Result<()> {
        let owner = self.registry.iter().find_map(|instance| {
            let button = instance.handles?.close_button?;
            self.doc
                .is_inclusive_descendant(target, button)
                .then_some(instance.key())
        });
        if let Some(key) = owner {
            self.close(key)?;
        }

        if let Some(id) = self.doc.attribute(target, OPEN_MARKER_ATTRIBUTE)
            && !id.is_empty()
        {
            let Some(key) = self.find(&id) else {
                tracing::warn!(id = %id, "click opens a modal that does not exist");
                return Err(ModalError::UnknownModal(id));
            };
            self.open(key, Some(target))?;
        }

        // A close button carrying the marker class was handled above.
        if owner.is_none() && self.doc.has_class(target, CLOSE_MARKER_CLASS) {
            self.close_displayed(|_| true)?;
        }

        if self.backdrop == Some(target) && self.backdrop_visible() {
            self.close_displayed(|config| config.close_by_overlay)?;
        }
        Ok(())
    }

    fn close_displayed(&mut self, allowed: impl FnOnce(&ModalConfig) -> bool) -> Result<()> {
        let Some(key) = self.displayed() else {
            return Ok(());
        };
        let permitted = self.config(key).is_some_and(allowed);
        if permitted {
            self.close(key)?;
        }
        Ok(())
    }
}
