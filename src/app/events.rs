//! Outbound application events.
//!
//! The [`CabinetLight`](super::service::CabinetLight) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other side
//! decide what to do with them: log to serial, count them in tests, etc.

use serde::Serialize;

use crate::control::door::DoorState;
use crate::error::Error;
use crate::pins::{DEV_COUNT, PinId};

/// Structured events emitted by the controller.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Channels are about to be armed.
    Started { polling_fallback: bool },

    /// A configuration call committed (carries the channels it re-armed as
    /// a bitmask).
    Configured { rearmed: u8 },

    /// A configuration call was rejected or failed to arm hardware.
    ConfigRejected(Error),

    /// A debounced door transition.
    DoorChanged { channel: usize, state: DoorState },

    /// A fade reached its target.
    FadeFinished { channel: usize, level: u16 },

    /// The poll path was switched on or off.
    PollingFallbackChanged(bool),

    /// Periodic status snapshot.
    Status(StatusReport),
}

/// Point-in-time state of one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChannelStatus {
    pub sensor_gpio: PinId,
    pub light_gpio: PinId,
    pub active_low: bool,
    pub door: DoorState,
    pub level: u16,
    pub target: u16,
    pub fading: bool,
}

/// Snapshot of the whole controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub initialized: bool,
    pub polling_fallback: bool,
    pub channels: [ChannelStatus; DEV_COUNT],
}
