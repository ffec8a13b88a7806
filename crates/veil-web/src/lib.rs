#![forbid(unsafe_code)]

//! Browser backend for veil.
//!
//! - [`driver::Driver`] advances a [`ModalSystem`](veil_modal::ModalSystem)
//!   by wall-clock time (`web-time`, so it also runs natively and in tests).
//! - `dom::WebDocument` implements [`Document`](veil_dom::Document) over
//!   `web-sys` (wasm32 only).
//! - `host::WebModals` installs the page listeners and the timer
//!   (wasm32 only).
//!
//! ```ignore
//! use veil_modal::ModalOptions;
//! use veil_web::WebModals;
//!
//! let modals = WebModals::attach()?;
//! let key = modals.create(ModalOptions::new().id("login").title("Sign in"))?;
//! // <button data-modal="login"> now opens it; Escape and the backdrop close it.
//! ```

pub mod driver;
pub mod error;

#[cfg(target_arch = "wasm32")]
pub mod dom;
#[cfg(target_arch = "wasm32")]
pub mod host;

pub use driver::Driver;
pub use error::{Result, WebError};

#[cfg(target_arch = "wasm32")]
pub use dom::WebDocument;
#[cfg(target_arch = "wasm32")]
pub use host::WebModals;
