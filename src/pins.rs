//! GPIO / peripheral pin assignments for the cabinet light board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.  Runtime reconfiguration starts from these
//! defaults and is validated against [`is_legal_gpio`].

/// Opaque handle for a sensor input or light output (the GPIO number).
pub type PinId = u8;

/// Number of independent door/light channels.
pub const DEV_COUNT: usize = 4;

// The pending-event set is a single `AtomicU8`.
const _: () = assert!(DEV_COUNT <= 8);

// ---------------------------------------------------------------------------
// Light outputs (low-RDS(on) MOSFET gates, LEDC PWM)
// ---------------------------------------------------------------------------

/// Default PWM outputs driving the MOSFETs, one per channel.
pub const DEFAULT_LIGHT_GPIOS: [PinId; DEV_COUNT] = [2, 3, 4, 5];

// ---------------------------------------------------------------------------
// Door sensors (reed contacts / hall switches to GND, internal pull-up)
// ---------------------------------------------------------------------------

/// Default digital inputs for the door sensors, one per channel.
pub const DEFAULT_SENSOR_GPIOS: [PinId; DEV_COUNT] = [6, 7, 8, 9];

/// Default polarity: contact pulls the line LOW when the door is open.
pub const DEFAULT_ACTIVE_LOW: [bool; DEV_COUNT] = [true; DEV_COUNT];

// ---------------------------------------------------------------------------
// Legal GPIO range (ESP32-S3)
// ---------------------------------------------------------------------------

/// Highest GPIO number routed on the ESP32-S3.
pub const MAX_GPIO: PinId = 48;

/// GPIOs 26–32 are wired to the SPI flash / PSRAM and must never be touched.
const FLASH_GPIOS: core::ops::RangeInclusive<PinId> = 26..=32;

/// Whether `pin` may be used as a sensor input or light output.
pub fn is_legal_gpio(pin: PinId) -> bool {
    pin <= MAX_GPIO && !FLASH_GPIOS.contains(&pin)
}

// ---------------------------------------------------------------------------
// PWM / timing configuration
// ---------------------------------------------------------------------------

/// Full-brightness level.  Levels run from `0` to `PWM_MAX` inclusive.
pub const PWM_MAX: u16 = 12_500;
/// LEDC carrier frequency for the light MOSFETs (1 kHz, flicker-free).
pub const PWM_FREQ_HZ: u32 = 1_000;
/// LEDC timer resolution (bits).  14-bit is the maximum at 1 kHz.
pub const PWM_RESOLUTION_BITS: u32 = 14;
/// Minimum time between two accepted observations on one channel.
pub const DEBOUNCE_MS: u32 = 100;
/// Brightness change per control tick while fading.
pub const FADE_STEP: u16 = 1_000;
/// Main-loop tick period (50 Hz).
pub const TICK_MS: u32 = 20;
