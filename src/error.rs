//! Unified error types for the cabinet light firmware.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! bootstrap path's error handling uniform.  All variants are `Copy` so they
//! can be passed through events and logs without allocation.
//!
//! Debounce rejections and spurious edge notifications are deliberately
//! absent: they are silent no-ops, not errors.

use core::fmt;

use crate::pins::PinId;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A configuration request was rejected; nothing was changed.
    Config(ConfigError),
    /// A peripheral could not be armed.
    Hardware(HwError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Hardware(e) => write!(f, "hardware: {e}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A channel was assigned a GPIO outside the legal hardware range.
    PinOutOfRange { channel: usize, pin: PinId },
    /// The same GPIO appears twice in one pin table.
    DuplicatePin { pin: PinId },
    /// A numeric parameter is out of range.  Names the field.
    InvalidParameter(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PinOutOfRange { channel, pin } => {
                write!(f, "channel {channel}: GPIO {pin} out of range")
            }
            Self::DuplicatePin { pin } => write!(f, "GPIO {pin} assigned twice"),
            Self::InvalidParameter(field) => write!(f, "invalid parameter: {field}"),
        }
    }
}

impl core::error::Error for ConfigError {}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Hardware errors
// ---------------------------------------------------------------------------

/// Errors raised while arming a sensor input or light output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwError {
    GpioConfigFailed(i32),
    IsrInstallFailed(i32),
    LedcInitFailed(i32),
    /// Every LEDC channel is already bound to an output.
    NoFreePwmChannel,
    /// The adapter has no peripheral behind this GPIO.
    PinUnavailable(PinId),
}

impl fmt::Display for HwError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={rc})"),
            Self::IsrInstallFailed(rc) => write!(f, "GPIO ISR install failed (rc={rc})"),
            Self::LedcInitFailed(rc) => write!(f, "LEDC timer/channel config failed (rc={rc})"),
            Self::NoFreePwmChannel => write!(f, "no free LEDC channel"),
            Self::PinUnavailable(pin) => write!(f, "GPIO {pin} not available"),
        }
    }
}

impl core::error::Error for HwError {}

impl From<HwError> for Error {
    fn from(e: HwError) -> Self {
        Self::Hardware(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
