#![forbid(unsafe_code)]

//! Cooperative task queue over virtual time.
//!
//! The engine never sleeps or spawns. Delayed effects are queued here with a
//! delay relative to the scheduler's virtual clock; the host moves the clock
//! forward and the engine pops whatever became due.
//!
//! # Invariants
//!
//! 1. Tasks pop in `(due, insertion)` order.
//! 2. The clock never moves backwards.
//! 3. A task queued with delay zero is due *now* but only pops on the next
//!    drain; scheduling never runs anything.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use veil_modal::schedule::Scheduler;
//!
//! let mut s = Scheduler::new();
//! s.schedule(Duration::from_millis(10), "late");
//! s.schedule(Duration::ZERO, "soon");
//!
//! let deadline = s.now() + Duration::from_millis(10);
//! assert_eq!(s.pop_due(deadline), Some("soon"));
//! assert_eq!(s.pop_due(deadline), Some("late"));
//! assert_eq!(s.pop_due(deadline), None);
//! ```

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::Duration;

struct Entry<T> {
    due: Duration,
    seq: u64,
    task: T,
}

impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl<T> Eq for Entry<T> {}

impl<T> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Entry<T> {
    // Reversed: BinaryHeap is a max-heap, we want the earliest first.
    fn cmp(&self, other: &Self) -> Ordering {
        (other.due, other.seq).cmp(&(self.due, self.seq))
    }
}

/// Delay-ordered queue of pending tasks.
pub struct Scheduler<T> {
    now: Duration,
    seq: u64,
    queue: BinaryHeap<Entry<T>>,
}

impl<T> std::fmt::Debug for Scheduler<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("now", &self.now)
            .field("pending", &self.queue.len())
            .finish()
    }
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    /// Empty scheduler at time zero.
    #[must_use]
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            seq: 0,
            queue: BinaryHeap::new(),
        }
    }

    /// Current virtual time.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Queue `task` to become due `delay` from now.
    pub fn schedule(&mut self, delay: Duration, task: T) {
        let due = self.now.saturating_add(delay);
        let seq = self.seq;
        self.seq += 1;
        self.queue.push(Entry { due, seq, task });
    }

    /// Pop the earliest task due at or before `deadline`, moving the clock to
    /// its due time.
    pub fn pop_due(&mut self, deadline: Duration) -> Option<T> {
        if self.queue.peek()?.due > deadline {
            return None;
        }
        let entry = self.queue.pop()?;
        self.now = self.now.max(entry.due);
        Some(entry.task)
    }

    /// Move the clock to `time` once every due task has been popped.
    pub fn settle(&mut self, time: Duration) {
        self.now = self.now.max(time);
    }

    /// Time from now until the earliest pending task.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.queue
            .peek()
            .map(|entry| entry.due.saturating_sub(self.now))
    }

    /// Number of pending tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
