// src/throttle.rs
use chrono::{DateTime, Duration as ChronoDuration, Utc};

use crate::entry::Entry;

/// Where the pop cadence stands at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThrottleState {
    /// A pop happened less than one window ago.
    CoolDown,
    /// No pop yet, or the window has elapsed.
    Ready,
}

/// Cool-down gate for `pop`.
/// - First pop is always allowed.
/// - Inside the window, the last popped entry is repeated.
/// - State only changes through `record`; expiry is evaluated lazily at each check.
#[derive(Debug, Clone)]
pub struct PopThrottle {
    window: ChronoDuration,
    last_pop_at: Option<DateTime<Utc>>,
    last_entry: Option<Entry>,
}

impl PopThrottle {
    /// A zero window disables throttling. Windows too large for chrono saturate.
    pub fn new(window: std::time::Duration) -> Self {
        Self {
            window: ChronoDuration::from_std(window).unwrap_or(ChronoDuration::MAX),
            last_pop_at: None,
            last_entry: None,
        }
    }

    pub fn state(&self, now: DateTime<Utc>) -> ThrottleState {
        match self.last_pop_at {
            Some(ts) if now.signed_duration_since(ts) < self.window => ThrottleState::CoolDown,
            _ => ThrottleState::Ready,
        }
    }

    /// The entry to repeat if we are still cooling down. Does NOT mutate state.
    pub fn repeat(&self, now: DateTime<Utc>) -> Option<&Entry> {
        match self.state(now) {
            ThrottleState::CoolDown => self.last_entry.as_ref(),
            ThrottleState::Ready => None,
        }
    }

    /// Record that `entry` was handed out at `now`.
    pub fn record(&mut self, entry: Entry, now: DateTime<Utc>) {
        self.last_pop_at = Some(now);
        self.last_entry = Some(entry);
    }

    pub fn last_entry(&self) -> Option<&Entry> {
        self.last_entry.as_ref()
    }

    pub fn last_pop_at(&self) -> Option<DateTime<Utc>> {
        self.last_pop_at
    }
}
