//! Two-state door tracker.
//!
//! ```text
//!            [open observed]
//!   CLOSED ─────────────────▶ OPEN
//!      ▲                        │
//!      └────────────────────────┘
//!            [closed observed]
//! ```
//!
//! Only transitions produce a [`FadeRequest`]; an observation matching the
//! stored state is absorbed silently.

/// Debounced door state.  `Closed` at power-on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
pub enum DoorState {
    #[default]
    Closed,
    Open,
}

impl DoorState {
    pub fn from_open(open: bool) -> Self {
        if open { Self::Open } else { Self::Closed }
    }

    pub fn is_open(self) -> bool {
        matches!(self, Self::Open)
    }
}

/// Which way the light should ramp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FadeRequest {
    On,
    Off,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DoorTracker {
    state: DoorState,
}

impl DoorTracker {
    pub const fn new() -> Self {
        Self {
            state: DoorState::Closed,
        }
    }

    /// Feed an accepted, polarity-resolved observation.
    pub fn observe(&mut self, open: bool) -> Option<FadeRequest> {
        let next = DoorState::from_open(open);
        if next == self.state {
            return None;
        }
        self.state = next;
        Some(if open { FadeRequest::On } else { FadeRequest::Off })
    }

    pub fn state(&self) -> DoorState {
        self.state
    }

    /// Forget the door state (channel re-armed).
    pub fn reset(&mut self) {
        self.state = DoorState::Closed;
    }
}
