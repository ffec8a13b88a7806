#![forbid(unsafe_code)]

//! Structural contract between templates, stylesheet and engine.
//!
//! Templates are free-form markup, but the engine locates regions inside
//! them by these fixed names, and the stylesheet keys its animations off the
//! classes and attributes the engine stamps.

/// DOM id of the shared backdrop container.
pub const BACKDROP_ID: &str = "modalBackground";
/// Class on the backdrop while a modal is shown.
pub const BACKDROP_VISIBLE_CLASS: &str = "show";

/// Base class of every modal root.
pub const MODAL_CLASS: &str = "modal";
/// Transitional class on a root while it closes.
pub const CLOSING_CLASS: &str = "close";
/// Class on a root whose header stays fixed while content scrolls.
pub const HEADER_FIXED_CLASS: &str = "fixed";

/// Title region selector.
pub const TITLE_REGION: &str = ".modal-title";
/// Title text holder, inside the title region.
pub const TITLE_TEXT: &str = ".modal-title p";
/// Content region selector.
pub const CONTENT_REGION: &str = ".modal-content";

/// Class of the synthesized close button.
pub const CLOSE_BUTTON_CLASS: &str = "modal-mainClose";
/// Tag of the synthesized close button.
pub const CLOSE_BUTTON_TAG: &str = "span";

/// Attribute naming the modal a clicked element opens.
pub const OPEN_MARKER_ATTRIBUTE: &str = "data-modal";
/// Class making any clicked element close the displayed modal.
pub const CLOSE_MARKER_CLASS: &str = "modal-close";

/// Attribute carrying the transition name.
pub const TRANSITION_ATTRIBUTE: &str = "data-transition";
/// Transition whose children animate independently.
pub const CHILD_ANIMATED_TRANSITION: &str = "donna";

/// Widths below this also pin `min-width`, since the stylesheet's default
/// minimum would otherwise win.
pub const MIN_WIDTH_PIN_THRESHOLD: u32 = 250;

/// Markup of the default template.
pub const DEFAULT_TEMPLATE: &str =
    r#"<header class="modal-title"><p></p></header><div class="modal-content"></div>"#;

/// Default close button content (a heavy multiplication sign).
pub const DEFAULT_CLOSE_BUTTON: &str = "&#10006";

/// Prefix of generated identifiers (`modal1`, `modal2`, ...).
pub const DEFAULT_ID_PREFIX: &str = "modal";
