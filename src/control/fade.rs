//! Linear step fade for one light channel.
//!
//! The fade is advanced once per control tick rather than with an internal
//! timer: a full ramp takes `ceil(max / step)` ticks, so its wall-clock
//! duration follows the caller's tick cadence.
//!
//! ## Invariants
//!
//! - `current` and `target` stay within `0..=max`.
//! - `fading == (current != target)` after every call.
//! - `current` never overshoots `target` and never jumps: a redirected fade
//!   continues from wherever `current` is.

use super::door::FadeRequest;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fade {
    current: u16,
    target: u16,
    fading: bool,
    max: u16,
    step: u16,
}

impl Fade {
    /// A dark, idle fade.  `step` is clamped to at least 1.
    pub const fn new(max: u16, step: u16) -> Self {
        Self {
            current: 0,
            target: 0,
            fading: false,
            max,
            step: if step == 0 { 1 } else { step },
        }
    }

    /// Point the fade at full (`On`) or dark (`Off`).
    ///
    /// Returns `true` if the target changed.  Requesting the target that is
    /// already set leaves an in-progress ramp untouched.
    pub fn request(&mut self, request: FadeRequest) -> bool {
        let target = match request {
            FadeRequest::On => self.max,
            FadeRequest::Off => 0,
        };
        if target == self.target {
            return false;
        }
        self.target = target;
        self.fading = self.current != self.target;
        true
    }

    /// Move one step toward the target.
    ///
    /// Returns the new level when it changed, so the caller writes the output
    /// exactly on the ticks where brightness moves.
    pub fn advance(&mut self) -> Option<u16> {
        if !self.fading {
            return None;
        }
        if self.current == self.target {
            self.fading = false;
            return None;
        }

        self.current = if self.current < self.target {
            self.current.saturating_add(self.step).min(self.target)
        } else {
            self.current - self.step.min(self.current - self.target)
        };
        self.fading = self.current != self.target;
        Some(self.current)
    }

    /// Drop to dark immediately with no ramp.
    pub fn reset(&mut self) {
        self.current = 0;
        self.target = 0;
        self.fading = false;
    }

    /// Set an explicit starting point.  Both levels are clamped to `max`.
    pub fn set_levels(&mut self, current: u16, target: u16) {
        self.current = current.min(self.max);
        self.target = target.min(self.max);
        self.fading = self.current != self.target;
    }

    pub fn current(&self) -> u16 {
        self.current
    }

    pub fn target(&self) -> u16 {
        self.target
    }

    pub fn is_fading(&self) -> bool {
        self.fading
    }

    /// Ticks left until `current` reaches `target`.
    pub fn remaining_ticks(&self) -> u32 {
        u32::from(self.current.abs_diff(self.target)).div_ceil(u32::from(self.step))
    }
}
