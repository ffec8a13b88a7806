#![forbid(unsafe_code)]

//! Host document capability for veil.
//!
//! The modal engine never touches a browser API directly. Everything it
//! needs from the page (element creation, structural queries, attribute and
//! inline style mutation, custom event dispatch, viewport metrics) goes
//! through the [`Document`] trait, addressed by copyable [`NodeId`] handles.
//!
//! This crate provides:
//! - [`Document`], the capability trait the engine is generic over
//! - [`MemoryDocument`], an arena-backed DOM used headless and in tests
//! - [`markup`], a forgiving HTML fragment parser and serializer
//! - [`selector`], the small selector subset templates are resolved with
//!
//! # Invariants
//!
//! 1. A `NodeId` stays valid for the lifetime of the document that issued
//!    it, even after the node is detached. Operations on a detached node are
//!    applied to the detached subtree; nothing panics.
//! 2. Removal is tolerant: removing a node that has no parent returns
//!    `false` instead of failing.

pub mod document;
pub mod markup;
pub mod memory;
pub mod node;
pub mod selector;

pub use document::{CustomEvent, Document};
pub use memory::MemoryDocument;
pub use node::NodeId;
pub use selector::Selector;
