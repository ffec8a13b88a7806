#![forbid(unsafe_code)]

//! Lifecycle notifications.

use veil_dom::{CustomEvent, NodeId};

use crate::registry::ModalKey;

/// The four lifecycle notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModalEventKind {
    BeforeOpen,
    Open,
    BeforeClose,
    Closed,
}

impl ModalEventKind {
    /// DOM event name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::BeforeOpen => "beforeOpen",
            Self::Open => "open",
            Self::BeforeClose => "beforeClose",
            Self::Closed => "closed",
        }
    }

    /// Whether the notification belongs to the open half of the cycle.
    #[must_use]
    pub const fn is_open_family(self) -> bool {
        matches!(self, Self::BeforeOpen | Self::Open)
    }
}

impl std::fmt::Display for ModalEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A notification as recorded in the engine outbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModalEvent {
    pub kind: ModalEventKind,
    pub key: ModalKey,
    /// Identifier of the modal when the notification was queued.
    pub id: String,
    /// Element that triggered the open, for open-family notifications.
    pub target: Option<NodeId>,
}

impl ModalEvent {
    /// The DOM form of this notification.
    #[must_use]
    pub fn to_custom_event(&self) -> CustomEvent {
        CustomEvent::new(self.kind.name(), self.id.clone(), self.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names() {
        assert_eq!(ModalEventKind::BeforeOpen.to_string(), "beforeOpen");
        assert_eq!(ModalEventKind::Closed.name(), "closed");
        assert!(ModalEventKind::Open.is_open_family());
        assert!(!ModalEventKind::BeforeClose.is_open_family());
    }
}
