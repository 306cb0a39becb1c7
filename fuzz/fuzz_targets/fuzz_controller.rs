//! Fuzz target: `CabinetLight` tick loop
//!
//! Interprets the input as a byte-coded stream of edges, raw input
//! changes, clock advances, reconfigurations and fade requests, and checks
//! after every step:
//! - No panics
//! - Every armed light's written level equals its fade level
//! - Levels never exceed `pwm_max`
//! - A settled fade sits exactly on its target
//!
//! cargo fuzz run fuzz_controller

#![no_main]

use std::collections::HashMap;
use std::time::Duration;

use cabinetlight::app::events::AppEvent;
use cabinetlight::app::ports::{ClockPort, EventSink, LightPort, SensorPort};
use cabinetlight::app::service::CabinetLight;
use cabinetlight::config::SystemConfig;
use cabinetlight::error::HwError;
use cabinetlight::events::EdgeNotifier;
use cabinetlight::pins::{DEV_COUNT, PinId};
use libfuzzer_sys::fuzz_target;

#[derive(Default)]
struct SimHw {
    inputs: HashMap<PinId, bool>,
    levels: HashMap<PinId, u16>,
    now_ms: u64,
}

impl SensorPort for SimHw {
    fn arm_input(&mut self, _pin: PinId) -> Result<(), HwError> {
        Ok(())
    }

    fn release_input(&mut self, _pin: PinId) {}

    fn read_raw(&mut self, pin: PinId) -> bool {
        self.inputs.get(&pin).copied().unwrap_or(true)
    }
}

impl LightPort for SimHw {
    fn arm_output(&mut self, pin: PinId) -> Result<(), HwError> {
        self.levels.insert(pin, 0);
        Ok(())
    }

    fn release_output(&mut self, pin: PinId) {
        self.levels.remove(&pin);
    }

    fn write_level(&mut self, pin: PinId, level: u16) {
        self.levels.insert(pin, level);
    }
}

impl ClockPort for SimHw {
    fn now(&self) -> Duration {
        Duration::from_millis(self.now_ms)
    }
}

struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: &AppEvent) {}
}

fuzz_target!(|data: &[u8]| {
    let config = SystemConfig::default();
    let notifier: &'static EdgeNotifier = Box::leak(Box::new(EdgeNotifier::new()));
    let mut hw = SimHw::default();
    let mut sink = NullSink;
    let mut app = CabinetLight::new(&config, notifier, &hw);
    if app.start(&mut hw, &mut sink).is_err() {
        return;
    }

    for chunk in data.chunks_exact(2) {
        let (op, arg) = (chunk[0], chunk[1]);
        let ch = usize::from(arg) % DEV_COUNT;
        match op % 6 {
            0 => {
                // Edges on arbitrary pins, routed or not.
                let _ = app.notify(arg);
            }
            1 => {
                let pin = app.channel(ch).map_or(arg, |c| c.sensor_gpio());
                hw.inputs.insert(pin, arg & 0x80 != 0);
            }
            2 => {
                hw.now_ms += u64::from(arg);
                app.process(&mut hw, &mut sink);
            }
            3 => {
                let _ = app.request_fade(ch, arg & 0x80 != 0);
            }
            4 => {
                // Rotate sensors through a pool that sometimes collides or
                // leaves the legal range.
                let base = arg % 50;
                let sensors = [base, base + 1, base + 2, base + 3];
                let _ = app.set_sensor_inputs(sensors, &mut hw, &mut sink);
            }
            _ => {
                let mut polarity = [true; DEV_COUNT];
                polarity[ch] = arg & 0x80 == 0;
                app.set_polarity(polarity);
            }
        }

        for i in 0..DEV_COUNT {
            let Some(channel) = app.channel(i) else { continue };
            let fade = channel.fade();
            assert!(fade.current() <= config.pwm_max);
            if !fade.is_fading() {
                assert_eq!(fade.current(), fade.target());
            }
            if channel.light_armed() {
                assert_eq!(hw.levels.get(&channel.light_gpio()), Some(&fade.current()));
            }
        }
    }
});
