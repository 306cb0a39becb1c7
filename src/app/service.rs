//! Application service: the hexagonal core.
//!
//! [`CabinetLight`] owns the four channels and drives them from a single
//! per-tick entry point.  All I/O flows through port traits injected at call
//! sites, making the whole controller testable with mock adapters.
//!
//! ```text
//!   GPIO ISR ──▶ EdgeNotifier ──┐
//!                               ▼
//!  SensorPort ──▶ ┌────────────────────────────┐ ──▶ EventSink
//!   ClockPort ──▶ │        CabinetLight        │
//!                 │ drain · poll · door · fade │
//!   LightPort ◀── └────────────────────────────┘
//! ```
//!
//! ## Tick order
//!
//! 1. Drain the pending-event set; sample and debounce each flagged channel.
//! 2. Poll fallback (if enabled): re-sample every channel, offer changes.
//! 3. Advance every fade one step and write changed levels.
//!
//! Nothing here blocks; the caller owns the tick cadence.

use core::time::Duration;

use log::{debug, info, warn};

use crate::config::{SystemConfig, validate_pin_table};
use crate::control::debounce::DebounceGate;
use crate::control::door::{DoorState, FadeRequest};
use crate::control::fade::Fade;
use crate::error::{ConfigError, Error, Result};
use crate::events::EdgeNotifier;
use crate::pins::{DEV_COUNT, PinId};

use super::channel::{Channel, Observation};
use super::events::{AppEvent, StatusReport};
use super::ports::{ClockPort, EventSink, LightPort, SensorPort};

// ───────────────────────────────────────────────────────────────
// CabinetLight
// ───────────────────────────────────────────────────────────────

/// The door-to-light controller.
pub struct CabinetLight {
    channels: [Channel; DEV_COUNT],
    notifier: &'static EdgeNotifier,
    polling_fallback: bool,
    initialized: bool,
    tick_count: u64,
}

impl CabinetLight {
    /// Construct the controller from configuration.
    ///
    /// Nothing is armed yet; call [`start`](Self::start) or
    /// [`configure`](Self::configure) next.
    pub fn new(
        config: &SystemConfig,
        notifier: &'static EdgeNotifier,
        clock: &impl ClockPort,
    ) -> Self {
        let now = clock.now();
        let channels = core::array::from_fn(|i| {
            Channel::new(
                config.sensor_gpios[i],
                config.light_gpios[i],
                config.active_low[i],
                Fade::new(config.pwm_max, config.fade_step),
                DebounceGate::new(config.debounce_window(), now),
            )
        });

        Self {
            channels,
            notifier,
            polling_fallback: config.polling_fallback,
            initialized: false,
            tick_count: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Arm every channel with the pin tables given at construction.
    pub fn start(
        &mut self,
        hw: &mut (impl SensorPort + LightPort + ClockPort),
        sink: &mut impl EventSink,
    ) -> Result<()> {
        sink.emit(&AppEvent::Started {
            polling_fallback: self.polling_fallback,
        });
        info!(
            "CabinetLight starting ({} channels, polling fallback {})",
            DEV_COUNT,
            if self.polling_fallback { "on" } else { "off" }
        );
        let sensors = self.channels.each_ref().map(Channel::sensor_gpio);
        let lights = self.channels.each_ref().map(Channel::light_gpio);
        let polarity = self.channels.each_ref().map(Channel::active_low);
        self.configure(sensors, lights, polarity, hw, sink)
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one control tick: drain edges → poll → advance fades.
    pub fn process(
        &mut self,
        hw: &mut (impl SensorPort + LightPort + ClockPort),
        sink: &mut impl EventSink,
    ) {
        self.tick_count += 1;
        let now = hw.now();

        // 1. Edge path
        let pending = self.notifier.drain();
        for channel in 0..DEV_COUNT {
            if pending & (1 << channel) == 0 || !self.channels[channel].sensor_armed() {
                continue;
            }
            let raw = hw.read_raw(self.channels[channel].sensor_gpio());
            let outcome = self.channels[channel].observe(raw, now);
            self.report(channel, outcome, "edge", sink);
        }

        // 2. Poll path
        if self.polling_fallback {
            for channel in 0..DEV_COUNT {
                if !self.channels[channel].sensor_armed() {
                    continue;
                }
                let raw = hw.read_raw(self.channels[channel].sensor_gpio());
                let outcome = self.channels[channel].poll(raw, now);
                self.report(channel, outcome, "poll", sink);
            }
        }

        // 3. Fades
        for (index, channel) in self.channels.iter_mut().enumerate() {
            let Some(level) = channel.advance() else {
                continue;
            };
            if channel.light_armed() {
                hw.write_level(channel.light_gpio(), level);
            }
            if !channel.fade().is_fading() {
                debug!("ch{index}: fade finished at {level}");
                sink.emit(&AppEvent::FadeFinished {
                    channel: index,
                    level,
                });
            }
        }
    }

    /// Record an edge on `pin`.  ISR-safe; forwards to the notifier.
    pub fn notify(&self, pin: PinId) -> bool {
        self.notifier.notify(pin)
    }

    /// Point `channel`'s fade at full or dark, bypassing the door tracker.
    /// Returns `true` if the target changed.
    pub fn request_fade(&mut self, channel: usize, on: bool) -> bool {
        let request = if on { FadeRequest::On } else { FadeRequest::Off };
        self.channels
            .get_mut(channel)
            .is_some_and(|ch| ch.request_fade(request))
    }

    /// Cut every light to dark immediately (no ramp).
    pub fn all_off(&mut self, hw: &mut (impl LightPort + ClockPort)) {
        let now = hw.now();
        for channel in &mut self.channels {
            channel.deactivate(now);
            if channel.light_armed() {
                hw.write_level(channel.light_gpio(), 0);
            }
        }
    }

    // ── Configuration ─────────────────────────────────────────

    /// Replace the whole channel map.
    ///
    /// Both pin tables are validated before anything changes; on rejection
    /// the previous configuration stays active.  Channels whose pins change
    /// are re-armed dark.  The polarity table is only replaced once every
    /// pin armed.
    pub fn configure(
        &mut self,
        sensors: [PinId; DEV_COUNT],
        lights: [PinId; DEV_COUNT],
        polarity: [bool; DEV_COUNT],
        hw: &mut (impl SensorPort + LightPort + ClockPort),
        sink: &mut impl EventSink,
    ) -> Result<()> {
        let result = validate_pin_table(&sensors)
            .and_then(|()| validate_pin_table(&lights))
            .and_then(|()| check_disjoint(&sensors, &lights))
            .map_err(Error::from)
            .and_then(|()| {
                let now = hw.now();
                let rearmed = self.apply_lights(lights, hw, now)?
                    | self.apply_sensors(sensors, hw, now)?;
                self.apply_polarity(polarity);
                Ok(rearmed)
            });
        self.finish_config(result, sink)
    }

    /// Replace the sensor input table.  All-or-nothing.
    pub fn set_sensor_inputs(
        &mut self,
        sensors: [PinId; DEV_COUNT],
        hw: &mut (impl SensorPort + LightPort + ClockPort),
        sink: &mut impl EventSink,
    ) -> Result<()> {
        let lights = self.channels.each_ref().map(Channel::light_gpio);
        let result = validate_pin_table(&sensors)
            .and_then(|()| check_disjoint(&sensors, &lights))
            .map_err(Error::from)
            .and_then(|()| {
                let now = hw.now();
                self.apply_sensors(sensors, hw, now)
            });
        self.finish_config(result, sink)
    }

    /// Replace the light output table.  All-or-nothing.
    pub fn set_light_outputs(
        &mut self,
        lights: [PinId; DEV_COUNT],
        hw: &mut (impl SensorPort + LightPort + ClockPort),
        sink: &mut impl EventSink,
    ) -> Result<()> {
        let sensors = self.channels.each_ref().map(Channel::sensor_gpio);
        let result = validate_pin_table(&lights)
            .and_then(|()| check_disjoint(&sensors, &lights))
            .map_err(Error::from)
            .and_then(|()| {
                let now = hw.now();
                self.apply_lights(lights, hw, now)
            });
        self.finish_config(result, sink)
    }

    /// Replace the polarity table.  Cannot fail.
    pub fn set_polarity(&mut self, polarity: [bool; DEV_COUNT]) {
        self.apply_polarity(polarity);
        info!("Sensor polarity set to {:?}", polarity);
    }

    /// Enable or disable the poll path.  The edge path always runs.
    pub fn set_polling_fallback(&mut self, enabled: bool, sink: &mut impl EventSink) {
        if self.polling_fallback != enabled {
            self.polling_fallback = enabled;
            info!("Polling fallback {}", if enabled { "enabled" } else { "disabled" });
            sink.emit(&AppEvent::PollingFallbackChanged(enabled));
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn polling_fallback(&self) -> bool {
        self.polling_fallback
    }

    /// Whether the most recent configuration call fully succeeded.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Total control ticks executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn channel(&self, index: usize) -> Option<&Channel> {
        self.channels.get(index)
    }

    pub fn door(&self, index: usize) -> Option<DoorState> {
        self.channels.get(index).map(Channel::door)
    }

    /// Snapshot of every channel, for telemetry.
    pub fn status(&self) -> StatusReport {
        StatusReport {
            initialized: self.initialized,
            polling_fallback: self.polling_fallback,
            channels: self.channels.each_ref().map(Channel::status),
        }
    }

    // ── Internal ──────────────────────────────────────────────

    fn report(
        &self,
        channel: usize,
        outcome: Observation,
        path: &str,
        sink: &mut impl EventSink,
    ) {
        match outcome {
            Observation::Unchanged | Observation::Absorbed => {}
            Observation::Debounced => debug!("ch{channel}: {path} observation debounced"),
            Observation::Transition(request) => {
                let state = self.channels[channel].door();
                info!("ch{channel}: door {:?} ({path}) -> fade {:?}", state, request);
                sink.emit(&AppEvent::DoorChanged { channel, state });
            }
        }
    }

    fn apply_polarity(&mut self, polarity: [bool; DEV_COUNT]) {
        for (channel, active_low) in self.channels.iter_mut().zip(polarity) {
            channel.set_active_low(active_low);
        }
    }

    /// Re-arm every channel whose light pin changed (or was never armed).
    /// Returns the re-armed channels as a bitmask.
    fn apply_lights(
        &mut self,
        lights: [PinId; DEV_COUNT],
        hw: &mut impl LightPort,
        now: Duration,
    ) -> Result<u8> {
        let changed = changed_mask(&self.channels, |index, ch| {
            ch.light_armed() && ch.light_gpio() == lights[index]
        });

        // Release every old output first so a pin moving between channels
        // is free before it is re-armed.
        for index in mask_iter(changed) {
            let channel = &mut self.channels[index];
            if channel.light_armed() {
                hw.release_output(channel.light_gpio());
            }
            channel.deactivate(now);
            channel.set_light(lights[index], false);
        }
        for index in mask_iter(changed) {
            hw.arm_output(lights[index])?;
            self.channels[index].set_light(lights[index], true);
            debug!("ch{index}: light armed on GPIO {}", lights[index]);
        }
        Ok(changed)
    }

    /// Re-arm every channel whose sensor pin changed (or was never armed).
    /// Returns the re-armed channels as a bitmask.
    fn apply_sensors(
        &mut self,
        sensors: [PinId; DEV_COUNT],
        hw: &mut (impl SensorPort + LightPort),
        now: Duration,
    ) -> Result<u8> {
        let changed = changed_mask(&self.channels, |index, ch| {
            ch.sensor_armed() && ch.sensor_gpio() == sensors[index]
        });

        for index in mask_iter(changed) {
            self.notifier.unroute(index);
            let channel = &mut self.channels[index];
            if channel.sensor_armed() {
                hw.release_input(channel.sensor_gpio());
            }
            if channel.light_armed() && channel.fade().current() != 0 {
                hw.write_level(channel.light_gpio(), 0);
            }
            channel.deactivate(now);
            channel.set_sensor(sensors[index], false);
        }
        for index in mask_iter(changed) {
            hw.arm_input(sensors[index])?;
            self.channels[index].set_sensor(sensors[index], true);
            self.notifier.route(index, sensors[index]);
            debug!("ch{index}: sensor armed on GPIO {}", sensors[index]);
        }
        Ok(changed)
    }

    fn finish_config(&mut self, result: Result<u8>, sink: &mut impl EventSink) -> Result<()> {
        self.initialized = result.is_ok();
        match result {
            Ok(rearmed) => {
                info!("Configuration applied (re-armed 0b{:04b})", rearmed);
                sink.emit(&AppEvent::Configured { rearmed });
                Ok(())
            }
            Err(e) => {
                warn!("Configuration failed: {}", e);
                sink.emit(&AppEvent::ConfigRejected(e));
                Err(e)
            }
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Helpers
// ───────────────────────────────────────────────────────────────

/// A GPIO may not be both a sensor and a light.
fn check_disjoint(
    sensors: &[PinId; DEV_COUNT],
    lights: &[PinId; DEV_COUNT],
) -> core::result::Result<(), ConfigError> {
    match sensors.iter().find(|pin| lights.contains(pin)) {
        Some(&pin) => Err(ConfigError::DuplicatePin { pin }),
        None => Ok(()),
    }
}

/// Bitmask of channels for which `unchanged` is false.
fn changed_mask(
    channels: &[Channel; DEV_COUNT],
    unchanged: impl Fn(usize, &Channel) -> bool,
) -> u8 {
    channels
        .iter()
        .enumerate()
        .filter(|&(index, ch)| !unchanged(index, ch))
        .fold(0, |mask, (index, _)| mask | (1 << index))
}

fn mask_iter(mask: u8) -> impl Iterator<Item = usize> {
    (0..DEV_COUNT).filter(move |index| mask & (1 << index) != 0)
}
