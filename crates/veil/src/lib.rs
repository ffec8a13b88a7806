#![forbid(unsafe_code)]

//! veil public facade.
//!
//! Re-exports the document capability ([`dom`]), the modal engine
//! ([`modal`]) and, with the `web` feature, the browser backend ([`web`]).
//!
//! ```
//! use std::time::Duration;
//! use veil::prelude::*;
//!
//! let mut modals = ModalSystem::new(MemoryDocument::new());
//! let key = modals.create(ModalOptions::new().id("about").title("About"))?;
//!
//! modals.open(key, None)?;
//! modals.advance(Duration::from_millis(400));
//! assert_eq!(modals.phase(key), Some(ModalPhase::Open));
//!
//! let backdrop = modals.backdrop().expect("created with the first modal");
//! modals.handle_interaction(&Interaction::Click { target: backdrop })?;
//! assert_eq!(modals.phase(key), Some(ModalPhase::Closing));
//! # Ok::<(), veil::ModalError>(())
//! ```

pub use veil_dom as dom;
pub use veil_modal as modal;
#[cfg(feature = "web")]
pub use veil_web as web;

pub use veil_dom::{Document, MemoryDocument, NodeId};
pub use veil_modal::{
    Interaction, Key, ModalConfig, ModalError, ModalEvent, ModalEventKind, ModalKey, ModalOptions,
    ModalPhase, ModalSystem,
};

/// Everything needed to create and drive modals.
pub mod prelude {
    pub use veil_dom::{Document, MemoryDocument, NodeId};
    pub use veil_modal::{
        Interaction, Key, ModalConfig, ModalError, ModalEvent, ModalEventKind, ModalKey,
        ModalOptions, ModalPhase, ModalSystem,
    };

    #[cfg(feature = "web")]
    pub use veil_web::Driver;
    #[cfg(all(feature = "web", target_arch = "wasm32"))]
    pub use veil_web::{WebDocument, WebModals};
}

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn prelude_drives_a_modal() {
        let mut modals = ModalSystem::new(MemoryDocument::new());
        let key = modals.create(ModalOptions::new().id("p")).unwrap();
        assert_eq!(modals.find("p"), Some(key));
        assert_eq!(modals.open(key, None), Ok(true));
    }
}
