//! Hardware adapter: bridges GPIO and LEDC to the domain port traits.
//!
//! Implements [`SensorPort`], [`LightPort`] and [`ClockPort`] on top of the
//! single-pin helpers in [`hw_init`].  Light outputs draw LEDC channels from
//! a fixed pool; the pin → channel binding lives in a `FnvIndexMap` so a
//! released pin hands its channel straight back.
//!
//! On non-espidf targets the helpers are simulated and the adapter keeps an
//! in-memory picture of input levels and written brightness instead, which
//! the host binaries use to drive the controller.

use heapless::FnvIndexMap;
use log::{debug, warn};

use crate::adapters::time::Esp32TimeAdapter;
use crate::app::ports::{ClockPort, LightPort, SensorPort};
use crate::drivers::hw_init::{self, LEDC_CHANNELS};
use crate::error::HwError;
use crate::pins::PinId;

/// Pool capacity; must be a power of two for `FnvIndexMap`.
const LEDC_POOL: usize = 8;
const _: () = assert!(LEDC_POOL as u32 == LEDC_CHANNELS);

/// Concrete adapter that combines GPIO inputs, LEDC outputs and the clock.
pub struct HardwareAdapter {
    pwm_max: u16,
    ledc: FnvIndexMap<PinId, u32, LEDC_POOL>,
    clock: Esp32TimeAdapter,
    #[cfg(not(target_os = "espidf"))]
    sim: SimPins,
}

impl HardwareAdapter {
    /// `pwm_max` is the brightness scale written through [`LightPort`].
    pub fn new(pwm_max: u16, clock: Esp32TimeAdapter) -> Self {
        Self {
            pwm_max,
            ledc: FnvIndexMap::new(),
            clock,
            #[cfg(not(target_os = "espidf"))]
            sim: SimPins::default(),
        }
    }

    /// LEDC channel currently driving `pin`, if any.
    pub fn ledc_channel(&self, pin: PinId) -> Option<u32> {
        self.ledc.get(&pin).copied()
    }

    fn free_ledc_channel(&self) -> Option<u32> {
        (0..LEDC_CHANNELS).find(|ch| !self.ledc.values().any(|used| used == ch))
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl SensorPort for HardwareAdapter {
    fn arm_input(&mut self, pin: PinId) -> Result<(), HwError> {
        hw_init::arm_input(pin)?;
        #[cfg(not(target_os = "espidf"))]
        self.sim.arm(pin);
        Ok(())
    }

    fn release_input(&mut self, pin: PinId) {
        hw_init::release_input(pin);
        #[cfg(not(target_os = "espidf"))]
        self.sim.release(pin);
    }

    #[cfg(target_os = "espidf")]
    fn read_raw(&mut self, pin: PinId) -> bool {
        hw_init::gpio_read(pin)
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_raw(&mut self, pin: PinId) -> bool {
        self.sim.level(pin)
    }
}

// ── LightPort implementation ──────────────────────────────────

impl LightPort for HardwareAdapter {
    fn arm_output(&mut self, pin: PinId) -> Result<(), HwError> {
        if self.ledc.contains_key(&pin) {
            return Ok(());
        }
        let channel = self.free_ledc_channel().ok_or(HwError::NoFreePwmChannel)?;
        hw_init::ledc_attach(channel, pin)?;
        self.ledc
            .insert(pin, channel)
            .map_err(|_| HwError::NoFreePwmChannel)?;
        debug!("LEDC CH{channel} bound to GPIO {pin}");
        Ok(())
    }

    fn release_output(&mut self, pin: PinId) {
        if let Some(channel) = self.ledc.remove(&pin) {
            hw_init::ledc_set(channel, 0);
            hw_init::ledc_detach(channel, pin);
        }
        #[cfg(not(target_os = "espidf"))]
        self.sim.light(pin, 0);
    }

    fn write_level(&mut self, pin: PinId, level: u16) {
        let Some(&channel) = self.ledc.get(&pin) else {
            warn!("write to unbound light GPIO {pin} ignored");
            return;
        };
        hw_init::ledc_set(channel, hw_init::scale_duty(level, self.pwm_max));
        #[cfg(not(target_os = "espidf"))]
        self.sim.light(pin, level);
    }
}

impl ClockPort for HardwareAdapter {
    fn now(&self) -> core::time::Duration {
        self.clock.now()
    }
}

// ── Host simulation ───────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
#[derive(Default)]
struct SimPins {
    /// One bit per GPIO; set = low.  Idle inputs read high (pull-up).
    low: u64,
    armed: u64,
    levels: FnvIndexMap<PinId, u16, LEDC_POOL>,
}

#[cfg(not(target_os = "espidf"))]
impl SimPins {
    fn arm(&mut self, pin: PinId) {
        self.armed |= 1 << pin;
    }

    fn release(&mut self, pin: PinId) {
        self.armed &= !(1 << pin);
    }

    fn level(&self, pin: PinId) -> bool {
        self.low & (1 << pin) == 0
    }

    fn light(&mut self, pin: PinId, level: u16) {
        if level == 0 {
            self.levels.remove(&pin);
        } else if self.levels.insert(pin, level).is_err() {
            warn!("sim: light table full, GPIO {pin} not recorded");
        }
    }
}

#[cfg(not(target_os = "espidf"))]
impl HardwareAdapter {
    /// Drive a simulated input.  A level change on an armed pin raises an
    /// edge through the installed dispatcher, like the real ISR would.
    pub fn sim_set_input(&mut self, pin: PinId, high: bool) {
        let before = self.sim.level(pin);
        if high {
            self.sim.low &= !(1 << pin);
        } else {
            self.sim.low |= 1 << pin;
        }
        if before != high && self.sim.armed & (1 << pin) != 0 {
            crate::events::dispatch_edge(pin);
        }
    }

    /// Last brightness written to `pin` (0 when dark or unbound).
    pub fn sim_level(&self, pin: PinId) -> u16 {
        self.sim.levels.get(&pin).copied().unwrap_or(0)
    }
}
