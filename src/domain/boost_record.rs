//! Per-business boost state: the active window and the pending queue.
//!
//! A [`BoostRecord`] exists for every registered business. Its boost fields
//! are dormant (no active window, empty queue) until a boost request
//! arrives, then cycle through active → expired → possibly
//! promoted-from-queue → active again. The scheduler never deletes records;
//! only explicit admin action resets or removes them.

use std::collections::VecDeque;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::{BusinessId, CategorySlug};

/// Half-open promotion window `[starts_at, ends_at)`.
///
/// `ends_at` is always `starts_at + boost_duration`; the window is expired
/// once `ends_at <= now`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoostWindow {
    /// When the featured placement begins.
    pub starts_at: DateTime<Utc>,
    /// When the featured placement ends.
    pub ends_at: DateTime<Utc>,
}

impl BoostWindow {
    /// Builds a window of the given duration starting at `starts_at`.
    #[must_use]
    pub fn starting_at(starts_at: DateTime<Utc>, duration: Duration) -> Self {
        Self {
            starts_at,
            ends_at: starts_at + duration,
        }
    }

    /// Returns `true` once the window has opened.
    #[must_use]
    pub fn has_started(&self, now: DateTime<Utc>) -> bool {
        self.starts_at <= now
    }

    /// Returns `true` once the window has closed.
    #[must_use]
    pub fn has_ended(&self, now: DateTime<Utc>) -> bool {
        self.ends_at <= now
    }
}

/// A boost request parked behind an occupied slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueuedBoost {
    /// Business that asked to be boosted.
    pub requested_by: BusinessId,
    /// Window this request will occupy once promoted.
    pub window: BoostWindow,
    /// Arrival timestamp; FIFO tiebreaker within a category.
    pub queued_at: DateTime<Utc>,
}

/// Boost state for one registered business.
///
/// The active window lives in a single `Option` so activation and clearing
/// are atomic at the type level; there is no way to leave a start timestamp
/// behind after the flag is dropped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoostRecord {
    /// Record key (immutable after registration).
    pub business_id: BusinessId,
    /// Display name, carried into sweep action messages.
    pub name: String,
    /// Competition scope; boosts compete only within one category.
    pub category: CategorySlug,
    /// Currently held featured window, if any.
    pub active: Option<BoostWindow>,
    /// Requests waiting for the slot, in arrival order.
    pub queue: VecDeque<QueuedBoost>,
    /// Registration timestamp.
    pub registered_at: DateTime<Utc>,
}

impl BoostRecord {
    /// Creates a dormant record for a newly registered business.
    #[must_use]
    pub fn new(
        business_id: BusinessId,
        name: String,
        category: CategorySlug,
        registered_at: DateTime<Utc>,
    ) -> Self {
        Self {
            business_id,
            name,
            category,
            active: None,
            queue: VecDeque::new(),
            registered_at,
        }
    }

    /// Returns `true` while this record holds an unexpired featured window.
    ///
    /// Always evaluated against `now` rather than a stored flag, so an
    /// expired-but-unswept boost reads as inactive.
    #[must_use]
    pub fn is_boosted(&self, now: DateTime<Utc>) -> bool {
        self.active.is_some_and(|w| !w.has_ended(now))
    }

    /// Takes the featured slot with the given window.
    pub fn activate(&mut self, window: BoostWindow) {
        self.active = Some(window);
    }

    /// Appends a request to the tail of this record's queue.
    pub fn enqueue(&mut self, queued: QueuedBoost) {
        self.queue.push_back(queued);
    }

    /// Drops the active window, leaving the queue untouched (expiry path).
    pub fn expire(&mut self) {
        self.active = None;
    }

    /// Administrative reset: drops the active window and empties the queue.
    pub fn clear_boost(&mut self) {
        self.active = None;
        self.queue.clear();
    }

    /// Pops the queue head and activates its window, returning the promoted
    /// entry. Returns `None` on an empty queue; eligibility is the caller's
    /// concern.
    pub fn promote_head(&mut self) -> Option<QueuedBoost> {
        let head = self.queue.pop_front()?;
        self.active = Some(head.window);
        Some(head)
    }

    /// Latest `ends_at` this record has committed to: the maximum of the
    /// active window's end and every queued window's end.
    #[must_use]
    pub fn latest_committed_end(&self) -> Option<DateTime<Utc>> {
        let active_end = self.active.map(|w| w.ends_at);
        let queued_end = self.queue.iter().map(|q| q.window.ends_at).max();
        active_end.max(queued_end)
    }
}
