#![forbid(unsafe_code)]

//! Wall-clock driving of a [`ModalSystem`].
//!
//! The engine runs on virtual time. [`Driver`] bridges it to a real clock:
//! every pump advances the engine by the wall time elapsed since the
//! previous pump and reports how long the host may sleep before the next
//! one. Interactions are routed after catching up, so the transition gate
//! always reflects the current time.
//!
//! The driver is target independent; the browser host only adds listeners
//! and `setTimeout` around it.

use std::time::Duration;

use veil_dom::Document;
use veil_modal::{Interaction, ModalSystem, Result};
use web_time::Instant;

/// A modal system plus the instant it was last advanced to.
#[derive(Debug)]
pub struct Driver<D: Document> {
    system: ModalSystem<D>,
    last: Instant,
}

impl<D: Document> Driver<D> {
    /// Start driving `system` from now.
    pub fn new(system: ModalSystem<D>) -> Self {
        Self::new_at(system, Instant::now())
    }

    /// Start driving `system` from `start`.
    pub fn new_at(system: ModalSystem<D>, start: Instant) -> Self {
        Self {
            system,
            last: start,
        }
    }

    #[must_use]
    pub fn system(&self) -> &ModalSystem<D> {
        &self.system
    }

    pub fn system_mut(&mut self) -> &mut ModalSystem<D> {
        &mut self.system
    }

    /// Advance to the current time. Returns the delay until the next pump.
    pub fn pump(&mut self) -> Option<Duration> {
        self.pump_at(Instant::now())
    }

    /// Advance to `now`. Instants earlier than the last pump are ignored.
    pub fn pump_at(&mut self, now: Instant) -> Option<Duration> {
        let elapsed = now.saturating_duration_since(self.last);
        if now > self.last {
            self.last = now;
        }
        self.system.advance(elapsed);
        self.system.next_deadline()
    }

    /// Catch up to the current time, then route `interaction`.
    pub fn dispatch(&mut self, interaction: &Interaction) -> Result<Option<Duration>> {
        self.dispatch_at(interaction, Instant::now())
    }

    /// Catch up to `now`, then route `interaction`.
    pub fn dispatch_at(&mut self, interaction: &Interaction, now: Instant) -> Result<Option<Duration>> {
        self.pump_at(now);
        self.system.handle_interaction(interaction)?;
        Ok(self.system.next_deadline())
    }

    /// Stop driving and return the engine.
    pub fn into_system(self) -> ModalSystem<D> {
        self.system
    }
}

/// `setTimeout` argument for a pump delay: whole milliseconds, rounded up.
#[must_use]
pub fn timeout_millis(delay: Duration) -> i32 {
    let mut millis = delay.as_millis();
    if delay.subsec_nanos() % 1_000_000 != 0 {
        millis += 1;
    }
    i32::try_from(millis).unwrap_or(i32::MAX)
}
