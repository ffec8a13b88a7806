#![forbid(unsafe_code)]

//! Width recomputation against the viewport.
//!
//! With configured width `w`, margin `m`, viewport width `vw` and rendered
//! width `cur`, let `bound = vw - m` (saturating). The modal is
//!
//! - reduced when `bound <= cur`,
//! - stretched back when `bound > cur` and `cur < w`,
//!
//! and in both cases set to `min(w, bound)`. Otherwise it is left alone.

use veil_dom::{Document, NodeId};

use crate::options::ModalConfig;
use crate::template::px;

/// New inline width for a responsive modal, or `None` to leave it.
#[must_use]
pub fn responsive_width(configured: u32, margin: u32, viewport: u32, current: u32) -> Option<u32> {
    let bound = viewport.saturating_sub(margin);
    let reduce = bound <= current;
    let stretch = bound > current && current < configured;
    (reduce || stretch).then_some(configured.min(bound))
}

/// Apply the rule to `root` if `config` asks for it. Returns the width set.
pub fn apply<D: Document + ?Sized>(doc: &mut D, root: NodeId, config: &ModalConfig) -> Option<u32> {
    if !config.responsive {
        return None;
    }
    let configured = config.width?;
    let width = responsive_width(
        configured,
        config.responsive_brink,
        doc.viewport_width(),
        doc.offset_width(root),
    )?;
    doc.set_style(root, "width", &px(width));
    tracing::trace!(id = %config.id, width, "responsive width applied");
    Some(width)
}

#[cfg(test)]
mod tests {
    use super::*;
    use veil_dom::MemoryDocument;

    #[test]
    fn reduces_to_bound() {
        assert_eq!(responsive_width(600, 50, 500, 600), Some(450));
    }

    #[test]
    fn stretches_back_to_configured() {
        assert_eq!(responsive_width(600, 50, 1280, 450), Some(600));
    }

    #[test]
    fn stretch_is_capped_by_bound() {
        assert_eq!(responsive_width(600, 50, 560, 400), Some(510));
    }

    #[test]
    fn fits_already() {
        assert_eq!(responsive_width(600, 50, 1280, 600), None);
    }

    #[test]
    fn tiny_viewport_saturates() {
        assert_eq!(responsive_width(600, 50, 30, 600), Some(0));
    }

    #[test]
    fn apply_needs_responsive_and_width() {
        let mut doc = MemoryDocument::new().with_viewport_width(400);
        let root = doc.create_element("div");
        doc.set_natural_width(root, 600);

        let mut config = ModalConfig::with_id("r");
        assert_eq!(apply(&mut doc, root, &config), None);

        config.width = Some(600);
        config.responsive = false;
        assert_eq!(apply(&mut doc, root, &config), None);

        config.responsive = true;
        assert_eq!(apply(&mut doc, root, &config), Some(350));
        assert_eq!(doc.style(root, "width").as_deref(), Some("350px"));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn never_exceeds_configured_or_bound(
                w in 0u32..4000,
                m in 0u32..200,
                vw in 0u32..4000,
                cur in 0u32..4000,
            ) {
                let bound = vw.saturating_sub(m);
                match responsive_width(w, m, vw, cur) {
                    Some(new) => {
                        prop_assert!(new <= w);
                        prop_assert!(new <= bound);
                        prop_assert!(new == w || new == bound);
                    }
                    None => prop_assert!(bound > cur && cur >= w),
                }
            }
        }
    }
}
