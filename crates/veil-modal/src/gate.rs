#![forbid(unsafe_code)]

//! Process-wide transition coordinator.
//!
//! Two flags are shared by every modal of a [`ModalSystem`](crate::ModalSystem):
//!
//! - `closable`: cleared when an open starts, set again once it finishes.
//!   A close is only accepted while it is set.
//! - `trigger_pending`: set when a close starts, cleared a fixed delay later.
//!   An open is only accepted while it is clear.
//!
//! Triggers that arrive while the gate is shut are dropped, not queued.
//!
//! # Invariants
//!
//! 1. `try_begin(Open)` succeeds iff no close-trigger window is active.
//! 2. `try_begin(Close)` succeeds iff the last open has finished (or none
//!    has ever started).
//! 3. Flags only change through `try_begin` / `end`.

/// The two gated transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransitionKind {
    Open,
    Close,
}

/// Flags shared by all modals of one system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionGate {
    closable: bool,
    trigger_pending: bool,
}

impl Default for TransitionGate {
    fn default() -> Self {
        Self::new()
    }
}

impl TransitionGate {
    /// Fresh gate: closable, no pending trigger.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            closable: true,
            trigger_pending: false,
        }
    }

    /// Whether a transition of `kind` would be accepted now.
    #[must_use]
    pub const fn is_gate_open(&self, kind: TransitionKind) -> bool {
        match kind {
            TransitionKind::Open => !self.trigger_pending,
            TransitionKind::Close => self.closable,
        }
    }

    /// Start a transition. Returns `false` (and changes nothing) when the
    /// gate is shut for `kind`.
    pub fn try_begin(&mut self, kind: TransitionKind) -> bool {
        if !self.is_gate_open(kind) {
            return false;
        }
        match kind {
            TransitionKind::Open => self.closable = false,
            TransitionKind::Close => self.trigger_pending = true,
        }
        true
    }

    /// Finish the gated window for `kind`.
    ///
    /// For `Open` this re-enables closing; for `Close` it re-enables
    /// opening (called after the trigger-reset delay, not at close end).
    pub fn end(&mut self, kind: TransitionKind) {
        match kind {
            TransitionKind::Open => self.closable = true,
            TransitionKind::Close => self.trigger_pending = false,
        }
    }

    /// Whether closes are accepted.
    #[must_use]
    pub const fn closable(&self) -> bool {
        self.closable
    }

    /// Whether a close-trigger window is active.
    #[must_use]
    pub const fn trigger_pending(&self) -> bool {
        self.trigger_pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_gate_accepts_both() {
        let gate = TransitionGate::new();
        assert!(gate.is_gate_open(TransitionKind::Open));
        assert!(gate.is_gate_open(TransitionKind::Close));
    }

    #[test]
    fn open_shuts_close_until_end() {
        let mut gate = TransitionGate::new();
        assert!(gate.try_begin(TransitionKind::Open));
        assert!(!gate.try_begin(TransitionKind::Close));
        gate.end(TransitionKind::Open);
        assert!(gate.try_begin(TransitionKind::Close));
    }

    #[test]
    fn close_shuts_open_until_end() {
        let mut gate = TransitionGate::new();
        assert!(gate.try_begin(TransitionKind::Close));
        assert!(!gate.try_begin(TransitionKind::Open));
        assert!(gate.trigger_pending());
        gate.end(TransitionKind::Close);
        assert!(gate.try_begin(TransitionKind::Open));
    }

    #[test]
    fn opens_are_not_gated_by_opens() {
        let mut gate = TransitionGate::new();
        assert!(gate.try_begin(TransitionKind::Open));
        assert!(gate.try_begin(TransitionKind::Open));
        assert!(!gate.closable());
    }

    #[test]
    fn rejected_begin_changes_nothing() {
        let mut gate = TransitionGate::new();
        gate.try_begin(TransitionKind::Open);
        let before = gate.clone();
        assert!(!gate.try_begin(TransitionKind::Close));
        assert_eq!(gate, before);
    }
}
