//! System configuration parameters
//!
//! All tunable parameters for the cabinet light controller.  Values are
//! compiled in from [`crate::pins`]; the pin tables and polarity can be
//! replaced at runtime through the controller's reconfiguration calls.

use core::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::pins::{self, DEV_COUNT, PinId};

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Channel map ---
    /// Door sensor GPIO per channel
    pub sensor_gpios: [PinId; DEV_COUNT],
    /// Light PWM GPIO per channel
    pub light_gpios: [PinId; DEV_COUNT],
    /// Sensor polarity per channel (true = low means open)
    pub active_low: [bool; DEV_COUNT],

    // --- PWM ---
    /// Full-brightness level
    pub pwm_max: u16,
    /// PWM carrier frequency (Hz)
    pub pwm_freq_hz: u32,

    // --- Timing ---
    /// Debounce window (milliseconds)
    pub debounce_ms: u32,
    /// Brightness step per tick while fading
    pub fade_step: u16,
    /// Main-loop tick period (milliseconds)
    pub tick_ms: u32,

    // --- Behaviour ---
    /// Re-sample every sensor each tick as a backstop for missed edges
    pub polling_fallback: bool,
    /// Blink every channel once at boot
    pub startup_test: bool,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            sensor_gpios: pins::DEFAULT_SENSOR_GPIOS,
            light_gpios: pins::DEFAULT_LIGHT_GPIOS,
            active_low: pins::DEFAULT_ACTIVE_LOW,

            pwm_max: pins::PWM_MAX,
            pwm_freq_hz: pins::PWM_FREQ_HZ,

            debounce_ms: pins::DEBOUNCE_MS,
            fade_step: pins::FADE_STEP,
            tick_ms: pins::TICK_MS, // 50 Hz

            polling_fallback: true,
            startup_test: true,
        }
    }
}

impl SystemConfig {
    /// Reject values the controller cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pwm_max == 0 {
            return Err(ConfigError::InvalidParameter("pwm_max must be > 0"));
        }
        if self.fade_step == 0 || self.fade_step > self.pwm_max {
            return Err(ConfigError::InvalidParameter("fade_step must be in 1..=pwm_max"));
        }
        if self.pwm_freq_hz == 0 {
            return Err(ConfigError::InvalidParameter("pwm_freq_hz must be > 0"));
        }
        if self.tick_ms == 0 {
            return Err(ConfigError::InvalidParameter("tick_ms must be > 0"));
        }
        validate_pin_table(&self.sensor_gpios)?;
        validate_pin_table(&self.light_gpios)
    }

    pub fn debounce_window(&self) -> Duration {
        Duration::from_millis(u64::from(self.debounce_ms))
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(u64::from(self.tick_ms))
    }

    /// Ticks needed for a full off→on ramp.
    pub fn fade_ticks(&self) -> u32 {
        u32::from(self.pwm_max).div_ceil(u32::from(self.fade_step.max(1)))
    }
}

/// All-or-nothing check of a per-channel pin table: every pin legal, no pin
/// used twice.
pub fn validate_pin_table(pins: &[PinId; DEV_COUNT]) -> Result<(), ConfigError> {
    for (channel, &pin) in pins.iter().enumerate() {
        if !pins::is_legal_gpio(pin) {
            return Err(ConfigError::PinOutOfRange { channel, pin });
        }
        if pins[..channel].contains(&pin) {
            return Err(ConfigError::DuplicatePin { pin });
        }
    }
    Ok(())
}
