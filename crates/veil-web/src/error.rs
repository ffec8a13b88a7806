#![forbid(unsafe_code)]

//! Errors raised while attaching to a browser page.

/// Failures of the browser backend itself. Modal errors pass through as
/// [`WebError::Modal`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WebError {
    /// No global `window` (not running in a browser main thread).
    #[error("no global window")]
    NoWindow,

    /// The window has no document.
    #[error("window has no document")]
    NoDocument,

    /// A browser call threw.
    #[error("browser call failed: {0}")]
    Js(String),

    /// Called from inside a `WebModals::with` closure.
    #[error("modal engine is busy: re-entrant call from inside `with`")]
    Busy,

    #[error(transparent)]
    Modal(#[from] veil_modal::ModalError),
}

pub type Result<T, E = WebError> = std::result::Result<T, E>;
