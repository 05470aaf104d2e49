//! Cancellable one-shot timers over a virtual clock.
//!
//! The runtime never sleeps. Controllers schedule [`TimerAction`]s here and
//! the host advances the clock (directly, or through the async driver); due
//! timers fire in deadline order, ties broken by scheduling order.

use std::time::Duration;

use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Handle to a scheduled timer. Stale after it fires or is cancelled.
    pub struct TimerId;
}

/// What a timer does when it fires. Carries the group or toast id it targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerAction {
    TooltipOpen(String),
    TooltipClose(String),
    ToastExpire(String),
}

#[derive(Debug)]
struct Entry {
    deadline: Duration,
    seq: u64,
    action: TimerAction,
}

/// Pending timers plus the current virtual time.
#[derive(Debug, Default)]
pub struct TimerQueue {
    now: Duration,
    seq: u64,
    entries: SlotMap<TimerId, Entry>,
}

impl TimerQueue {
    /// Create an empty queue at time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time since the runtime started.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Schedule `action` to fire `delay` from now.
    pub fn schedule(&mut self, delay: Duration, action: TimerAction) -> TimerId {
        self.seq += 1;
        self.entries.insert(Entry {
            deadline: self.now + delay,
            seq: self.seq,
            action,
        })
    }

    /// Cancel a pending timer. Returns `false` if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        self.entries.remove(id).is_some()
    }

    /// Whether the timer is still pending.
    pub fn is_pending(&self, id: TimerId) -> bool {
        self.entries.contains_key(id)
    }

    /// Number of pending timers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no timers are pending.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Earliest pending deadline.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.entries.values().map(|e| e.deadline).min()
    }

    /// Remove and return the earliest timer due at or before `until`,
    /// moving the clock to its deadline.
    pub fn pop_due(&mut self, until: Duration) -> Option<(TimerId, TimerAction)> {
        let id = self
            .entries
            .iter()
            .filter(|(_, e)| e.deadline <= until)
            .min_by_key(|(_, e)| (e.deadline, e.seq))
            .map(|(id, _)| id)?;
        let entry = self.entries.remove(id)?;
        self.now = self.now.max(entry.deadline);
        Some((id, entry.action))
    }

    /// Move the clock forward to `t`. Never moves backwards.
    pub fn advance_to(&mut self, t: Duration) {
        self.now = self.now.max(t);
    }
}
