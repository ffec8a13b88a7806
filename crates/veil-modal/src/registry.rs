#![forbid(unsafe_code)]

//! Live modal instances in registration order.
//!
//! # Invariants
//!
//! 1. No two live instances share an identifier.
//! 2. Registration order is preserved; removal keeps the relative order of
//!    the rest.
//! 3. A failed `insert` or `rename` leaves the registry unchanged.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Duplicate id | `insert`/`rename` to a live identifier | `DuplicateIdentifier`, nothing changes |
//! | Unknown key | Key already removed | `None` / `UnknownModal` |

use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{ModalError, Result};
use crate::options::ModalConfig;
use crate::template::DomHandles;

static MODAL_KEY_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Stable handle to a modal instance.
///
/// Unlike the DOM identifier, a key never changes and is never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModalKey(u64);

impl ModalKey {
    /// Allocate a fresh key.
    pub(crate) fn next() -> Self {
        Self(MODAL_KEY_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw key value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ModalKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "modal-key:{}", self.0)
    }
}

/// Lifecycle phase of one modal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ModalPhase {
    #[default]
    Closed,
    Opening,
    Open,
    Closing,
}

impl ModalPhase {
    /// Whether the root is (or is becoming) visible.
    #[must_use]
    pub const fn is_visible(self) -> bool {
        matches!(self, Self::Opening | Self::Open)
    }
}

/// One registered modal.
#[derive(Debug, Clone)]
pub struct Instance {
    pub(crate) key: ModalKey,
    pub(crate) config: ModalConfig,
    pub(crate) handles: Option<DomHandles>,
    pub(crate) phase: ModalPhase,
}

impl Instance {
    pub(crate) fn new(config: ModalConfig) -> Self {
        Self {
            key: ModalKey::next(),
            config,
            handles: None,
            phase: ModalPhase::Closed,
        }
    }

    #[must_use]
    pub fn key(&self) -> ModalKey {
        self.key
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.config.id
    }

    #[must_use]
    pub fn config(&self) -> &ModalConfig {
        &self.config
    }

    /// DOM handles, once materialized.
    #[must_use]
    pub fn handles(&self) -> Option<&DomHandles> {
        self.handles.as_ref()
    }

    #[must_use]
    pub fn phase(&self) -> ModalPhase {
        self.phase
    }
}

/// Insertion-ordered set of live instances.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    entries: Vec<Instance>,
}

impl Registry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `instance` at the end.
    pub fn insert(&mut self, instance: Instance) -> Result<ModalKey> {
        if self.contains_id(instance.id()) {
            return Err(ModalError::DuplicateIdentifier(instance.config.id));
        }
        let key = instance.key;
        self.entries.push(instance);
        Ok(key)
    }

    /// Unregister by key.
    pub fn remove(&mut self, key: ModalKey) -> Option<Instance> {
        let idx = self.entries.iter().position(|e| e.key == key)?;
        Some(self.entries.remove(idx))
    }

    #[must_use]
    pub fn get(&self, key: ModalKey) -> Option<&Instance> {
        self.entries.iter().find(|e| e.key == key)
    }

    pub fn get_mut(&mut self, key: ModalKey) -> Option<&mut Instance> {
        self.entries.iter_mut().find(|e| e.key == key)
    }

    /// Find a live instance by DOM identifier.
    #[must_use]
    pub fn find_by_id(&self, id: &str) -> Option<&Instance> {
        self.entries.iter().find(|e| e.config.id == id)
    }

    #[must_use]
    pub fn contains_id(&self, id: &str) -> bool {
        self.find_by_id(id).is_some()
    }

    /// Change the identifier of `key`.
    ///
    /// Renaming an instance to its current identifier succeeds.
    pub fn rename(&mut self, key: ModalKey, id: &str) -> Result<()> {
        if self.entries.iter().any(|e| e.key != key && e.config.id == id) {
            return Err(ModalError::DuplicateIdentifier(id.to_owned()));
        }
        let entry = self
            .get_mut(key)
            .ok_or_else(|| ModalError::UnknownModal(key.to_string()))?;
        entry.config.id = id.to_owned();
        Ok(())
    }

    /// Instances in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Instance> {
        self.entries.iter()
    }

    /// Keys in registration order.
    #[must_use]
    pub fn keys(&self) -> Vec<ModalKey> {
        self.entries.iter().map(|e| e.key).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instance(id: &str) -> Instance {
        Instance::new(ModalConfig::with_id(id))
    }

    #[test]
    fn keys_are_unique() {
        let a = ModalKey::next();
        let b = ModalKey::next();
        assert_ne!(a, b);
        assert!(b.raw() > a.raw());
    }

    #[test]
    fn insert_rejects_duplicates() {
        let mut reg = Registry::new();
        reg.insert(instance("dup")).expect("first insert");
        let err = reg.insert(instance("dup")).expect_err("duplicate");
        assert_eq!(err, ModalError::DuplicateIdentifier("dup".into()));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn remove_keeps_order() {
        let mut reg = Registry::new();
        let a = reg.insert(instance("a")).unwrap();
        let b = reg.insert(instance("b")).unwrap();
        let c = reg.insert(instance("c")).unwrap();
        assert!(reg.remove(b).is_some());
        assert!(reg.remove(b).is_none());
        assert_eq!(reg.keys(), vec![a, c]);
    }

    #[test]
    fn removed_id_can_be_reused() {
        let mut reg = Registry::new();
        let a = reg.insert(instance("a")).unwrap();
        reg.remove(a);
        assert!(reg.insert(instance("a")).is_ok());
    }

    #[test]
    fn rename_checks_others_only() {
        let mut reg = Registry::new();
        let a = reg.insert(instance("a")).unwrap();
        reg.insert(instance("b")).unwrap();

        assert!(reg.rename(a, "a").is_ok());
        assert_eq!(
            reg.rename(a, "b"),
            Err(ModalError::DuplicateIdentifier("b".into()))
        );
        assert_eq!(reg.get(a).map(Instance::id), Some("a"));

        reg.rename(a, "z").unwrap();
        assert!(reg.find_by_id("z").is_some());
        assert!(reg.find_by_id("a").is_none());
    }

    #[test]
    fn rename_unknown_key() {
        let mut reg = Registry::new();
        let a = reg.insert(instance("a")).unwrap();
        reg.remove(a);
        assert!(matches!(reg.rename(a, "x"), Err(ModalError::UnknownModal(_))));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;
        use std::collections::HashSet;

        #[derive(Debug, Clone)]
        enum Op {
            Insert(u8),
            Remove(usize),
            Rename(usize, u8),
        }

        fn op() -> impl Strategy<Value = Op> {
            prop_oneof![
                (0u8..6).prop_map(Op::Insert),
                (0usize..8).prop_map(Op::Remove),
                ((0usize..8), (0u8..6)).prop_map(|(i, n)| Op::Rename(i, n)),
            ]
        }

        proptest! {
            #[test]
            fn identifiers_stay_distinct(ops in proptest::collection::vec(op(), 0..60)) {
                let mut reg = Registry::new();
                for op in ops {
                    let before = reg.len();
                    match op {
                        Op::Insert(n) => {
                            let id = format!("m{n}");
                            let existed = reg.contains_id(&id);
                            let result = reg.insert(instance(&id));
                            prop_assert_eq!(result.is_err(), existed);
                        }
                        Op::Remove(i) => {
                            if let Some(key) = reg.keys().get(i).copied() {
                                reg.remove(key);
                                prop_assert_eq!(reg.len(), before - 1);
                            }
                        }
                        Op::Rename(i, n) => {
                            if let Some(key) = reg.keys().get(i).copied() {
                                let _ = reg.rename(key, &format!("m{n}"));
                            }
                        }
                    }
                    let ids: HashSet<&str> = reg.iter().map(Instance::id).collect();
                    prop_assert_eq!(ids.len(), reg.len());
                }
            }
        }
    }
}
