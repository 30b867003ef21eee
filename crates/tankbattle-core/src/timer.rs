//! One-shot timers keyed by cancellable handles.
//!
//! Entities never own timers directly. They ask their host to arm one and
//! keep the returned [`TimerHandle`]; the host calls back into the owning
//! entity once the delay has elapsed. Clearing is idempotent: clearing an
//! invalid, expired or already-cleared handle does nothing.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::entity::EntityId;

/// Opaque handle to an armed timer. The default handle is invalid.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct TimerHandle(u64);

impl TimerHandle {
    /// A handle that refers to no timer.
    pub const INVALID: Self = Self(0);

    /// Whether this handle was issued by a timer manager and not yet
    /// invalidated by its holder.
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }

    /// Resets the handle to [`TimerHandle::INVALID`].
    pub fn invalidate(&mut self) {
        *self = Self::INVALID;
    }
}

/// What an expiring timer asks its owner to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimerKind {
    /// Retry a shot that was held back by the fire-rate gate.
    Fire,
}

/// A timer that has come due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FiredTimer {
    /// Handle the owner was given when arming it.
    pub handle: TimerHandle,
    /// Entity to call back.
    pub owner: EntityId,
    /// Callback selector.
    pub kind: TimerKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
struct Timer {
    owner: EntityId,
    kind: TimerKind,
    due: f32,
}

/// Pending one-shot timers ordered by issue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerManager {
    next_handle: u64,
    timers: BTreeMap<TimerHandle, Timer>,
}

impl Default for TimerManager {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerManager {
    /// Creates an empty manager.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            next_handle: 1,
            timers: BTreeMap::new(),
        }
    }

    /// Arms a timer for `owner` that comes due `delay` seconds after `now`.
    ///
    /// Negative delays are treated as zero.
    pub fn set_timer(&mut self, owner: EntityId, kind: TimerKind, now: f32, delay: f32) -> TimerHandle {
        let handle = TimerHandle(self.next_handle);
        self.next_handle += 1;
        self.timers.insert(
            handle,
            Timer {
                owner,
                kind,
                due: now + delay.max(0.0),
            },
        );
        handle
    }

    /// Cancels the timer behind `handle` and invalidates the handle.
    ///
    /// Returns whether a pending timer was actually removed.
    pub fn clear_timer(&mut self, handle: &mut TimerHandle) -> bool {
        let removed = self.timers.remove(handle).is_some();
        handle.invalidate();
        removed
    }

    /// Whether `handle` refers to a timer that has not yet fired.
    #[must_use]
    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.timers.contains_key(&handle)
    }

    /// Cancels every timer owned by `owner`. Returns how many were removed.
    pub fn clear_all_for(&mut self, owner: EntityId) -> usize {
        let before = self.timers.len();
        self.timers.retain(|_, timer| timer.owner != owner);
        before - self.timers.len()
    }

    /// Removes and returns every timer due at or before `now`, earliest
    /// first. Timers due at the same instant fire in the order they were
    /// armed.
    pub fn drain_due(&mut self, now: f32) -> Vec<FiredTimer> {
        let mut due: Vec<(f32, FiredTimer)> = self
            .timers
            .iter()
            .filter(|(_, timer)| timer.due <= now)
            .map(|(&handle, timer)| {
                (
                    timer.due,
                    FiredTimer {
                        handle,
                        owner: timer.owner,
                        kind: timer.kind,
                    },
                )
            })
            .collect();

        for (_, fired) in &due {
            self.timers.remove(&fired.handle);
        }

        due.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.handle.cmp(&b.1.handle)));
        due.into_iter().map(|(_, fired)| fired).collect()
    }

    /// Number of pending timers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.timers.len()
    }

    /// Returns `true` if no timers are pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }
}
