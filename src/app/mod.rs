//! Application core: pure domain logic, zero I/O.
//!
//! The door-to-light rules live here: per-channel capture, debounce,
//! door tracking and fades, orchestrated by [`service::CabinetLight`].
//! All interaction with hardware happens through **port traits** defined
//! in [`ports`], keeping this layer fully testable without real peripherals.

pub mod channel;
pub mod events;
pub mod ports;
pub mod service;
