//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ CabinetLight (domain)
//! ```
//!
//! Driven adapters (sensor inputs, light outputs, clock, event sinks)
//! implement these traits.  The [`CabinetLight`](super::service::CabinetLight)
//! consumes them via generics, so the domain core never touches hardware
//! directly.  Pins are identified by their opaque [`PinId`]; adapters own
//! whatever peripheral handles sit behind an id.

use core::time::Duration;

use crate::error::HwError;
use crate::pins::PinId;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Door sensor inputs.
pub trait SensorPort {
    /// Configure `pin` as an input and enable its any-edge notification.
    fn arm_input(&mut self, pin: PinId) -> Result<(), HwError>;

    /// Disable the edge notification on `pin`.  Never fails.
    fn release_input(&mut self, pin: PinId);

    /// Synchronously sample the raw level of `pin` (`true` = high).
    fn read_raw(&mut self, pin: PinId) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Light port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Dimmable light outputs.
pub trait LightPort {
    /// Bind `pin` to a PWM output, initially dark.
    fn arm_output(&mut self, pin: PinId) -> Result<(), HwError>;

    /// Drive `pin` dark and free its PWM output.  Never fails.
    fn release_output(&mut self, pin: PinId);

    /// Set the brightness of `pin`.  `level` is in `0..=pwm_max`.
    fn write_level(&mut self, pin: PinId, level: u16);
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Monotonic time source.
pub trait ClockPort {
    /// Time since boot.  Never goes backwards.
    fn now(&self) -> Duration;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
