#![forbid(unsafe_code)]

//! Modal dialog lifecycle engine.
//!
//! Manages overlay panels layered over a host document: registration,
//! materialization from a template, open/close sequencing with lifecycle
//! notifications, responsive width and teardown.
//!
//! # Architecture
//!
//! ```text
//!  ModalOptions ──resolve──▶ ModalConfig ──materialize──▶ DomHandles
//!                                 │                          │
//!                                 ▼                          ▼
//!                             Registry ◀──── ModalSystem ───▶ Document
//!                                           │    │    │
//!                            TransitionGate ┘    │    └ Scheduler<Task>
//!                                                ▼
//!                                  handle_interaction (router)
//! ```
//!
//! The engine is host-driven: it never sleeps or spawns. The host forwards
//! page events through [`ModalSystem::handle_interaction`] and moves virtual
//! time with [`ModalSystem::advance`].
//!
//! # Invariants
//!
//! 1. No two live modals share an identifier.
//! 2. At most one backdrop exists, as the first child of body.
//! 3. Notifications are never dispatched inside the call that caused them.
//! 4. A failed call leaves the registry as it was.

pub mod convention;
pub mod error;
pub mod event;
pub mod gate;
pub mod options;
pub mod registry;
pub mod responsive;
pub mod router;
pub mod schedule;
pub mod system;
pub mod template;

pub use error::{ModalError, Result};
pub use event::{ModalEvent, ModalEventKind};
pub use gate::{TransitionGate, TransitionKind};
pub use options::{ModalConfig, ModalOptions};
pub use registry::{Instance, ModalKey, ModalPhase, Registry};
pub use router::{Interaction, Key};
pub use system::ModalSystem;
pub use template::{DomHandles, TemplateRegions};
