//! Per-channel time-window debounce gate.
//!
//! An observation is accepted only if at least `window` has elapsed since the
//! previously accepted one.  Rejected observations are dropped outright;
//! nothing is queued or retried.  Both the edge path and the poll path go
//! through the same gate, so a channel can never accept twice within one
//! window no matter which path reported it.

use core::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebounceGate {
    window: Duration,
    last_accept: Duration,
}

impl DebounceGate {
    /// `armed_at` counts as the last accepted observation, so nothing is
    /// accepted during the first window after (re)arming.
    pub const fn new(window: Duration, armed_at: Duration) -> Self {
        Self {
            window,
            last_accept: armed_at,
        }
    }

    /// Accept or reject an observation made at `now`.  Accepting advances
    /// the window start to `now`.
    pub fn accept(&mut self, now: Duration) -> bool {
        if now.saturating_sub(self.last_accept) < self.window {
            return false;
        }
        self.last_accept = now;
        true
    }

    /// Restart the window at `now` (used when a channel is re-armed).
    pub fn reset(&mut self, now: Duration) {
        self.last_accept = now;
    }

    /// Timestamp of the last accepted observation.
    pub fn last_accept(&self) -> Duration {
        self.last_accept
    }

    pub fn window(&self) -> Duration {
        self.window
    }
}
