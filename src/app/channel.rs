//! One door sensor + light pair.
//!
//! A channel bundles the pure control blocks and the bookkeeping both
//! capture paths share.  Everything here is owned by the tick context.

use core::time::Duration;

use crate::control::debounce::DebounceGate;
use crate::control::door::{DoorState, DoorTracker, FadeRequest};
use crate::control::fade::Fade;
use crate::control::polarity;
use crate::pins::PinId;

use super::events::ChannelStatus;

/// Outcome of offering a raw sample to a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observation {
    /// Poll path only: raw level unchanged, nothing offered.
    Unchanged,
    /// Inside the debounce window; dropped.
    Debounced,
    /// Accepted, but the door state did not change.
    Absorbed,
    /// Accepted door transition; the fade was pointed accordingly.
    Transition(FadeRequest),
}

#[derive(Debug, Clone)]
pub struct Channel {
    sensor_gpio: PinId,
    light_gpio: PinId,
    active_low: bool,
    sensor_armed: bool,
    light_armed: bool,
    door: DoorTracker,
    debounce: DebounceGate,
    /// Last raw level seen by the poll path.  `None` until the first poll
    /// sample is accepted.
    last_raw: Option<bool>,
    fade: Fade,
}

impl Channel {
    pub(crate) fn new(
        sensor_gpio: PinId,
        light_gpio: PinId,
        active_low: bool,
        fade: Fade,
        debounce: DebounceGate,
    ) -> Self {
        Self {
            sensor_gpio,
            light_gpio,
            active_low,
            sensor_armed: false,
            light_armed: false,
            door: DoorTracker::new(),
            debounce,
            last_raw: None,
            fade,
        }
    }

    // ── Capture paths ─────────────────────────────────────────

    /// Offer a raw sample taken at `now`.  Shared by both capture paths.
    pub(crate) fn observe(&mut self, raw: bool, now: Duration) -> Observation {
        if !self.debounce.accept(now) {
            return Observation::Debounced;
        }
        let open = polarity::resolve(raw, self.active_low);
        match self.door.observe(open) {
            Some(request) => {
                self.fade.request(request);
                Observation::Transition(request)
            }
            None => Observation::Absorbed,
        }
    }

    /// Poll-path sample: only a change of raw level is offered.
    ///
    /// The stored raw level follows the new sample whether or not the
    /// debounce gate accepted it, so a settled bounce is not re-reported.
    /// With no stored level yet, a sample that agrees with the door becomes
    /// the baseline without touching the gate.  One that disagrees is
    /// retried every tick until it is accepted.
    pub(crate) fn poll(&mut self, raw: bool, now: Duration) -> Observation {
        match self.last_raw {
            Some(prev) if prev == raw => Observation::Unchanged,
            Some(_) => {
                self.last_raw = Some(raw);
                self.observe(raw, now)
            }
            None if polarity::resolve(raw, self.active_low) == self.door().is_open() => {
                self.last_raw = Some(raw);
                Observation::Unchanged
            }
            None => {
                let outcome = self.observe(raw, now);
                if outcome != Observation::Debounced {
                    self.last_raw = Some(raw);
                }
                outcome
            }
        }
    }

    // ── Fade ──────────────────────────────────────────────────

    pub(crate) fn request_fade(&mut self, request: FadeRequest) -> bool {
        self.fade.request(request)
    }

    pub(crate) fn advance(&mut self) -> Option<u16> {
        self.fade.advance()
    }

    // ── Reconfiguration ───────────────────────────────────────

    /// Back to a dark, closed, freshly debounced state.
    pub(crate) fn deactivate(&mut self, now: Duration) {
        self.fade.reset();
        self.door.reset();
        self.debounce.reset(now);
        self.last_raw = None;
    }

    pub(crate) fn set_sensor(&mut self, pin: PinId, armed: bool) {
        self.sensor_gpio = pin;
        self.sensor_armed = armed;
    }

    pub(crate) fn set_light(&mut self, pin: PinId, armed: bool) {
        self.light_gpio = pin;
        self.light_armed = armed;
    }

    /// Change polarity.  A flip makes the poll path re-evaluate the input.
    pub(crate) fn set_active_low(&mut self, active_low: bool) {
        if self.active_low != active_low {
            self.active_low = active_low;
            self.last_raw = None;
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn sensor_gpio(&self) -> PinId {
        self.sensor_gpio
    }

    pub fn light_gpio(&self) -> PinId {
        self.light_gpio
    }

    pub fn active_low(&self) -> bool {
        self.active_low
    }

    pub fn sensor_armed(&self) -> bool {
        self.sensor_armed
    }

    pub fn light_armed(&self) -> bool {
        self.light_armed
    }

    pub fn door(&self) -> DoorState {
        self.door.state()
    }

    pub fn last_trigger(&self) -> Duration {
        self.debounce.last_accept()
    }

    pub fn last_raw(&self) -> Option<bool> {
        self.last_raw
    }

    pub fn fade(&self) -> &Fade {
        &self.fade
    }

    pub fn status(&self) -> ChannelStatus {
        ChannelStatus {
            sensor_gpio: self.sensor_gpio,
            light_gpio: self.light_gpio,
            active_low: self.active_low,
            door: self.door.state(),
            level: self.fade.current(),
            target: self.fade.target(),
            fading: self.fade.is_fading(),
        }
    }
}
