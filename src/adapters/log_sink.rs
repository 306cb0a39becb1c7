//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).
//! Status snapshots are rendered as compact JSON so a serial monitor can
//! scrape them.

use log::{info, warn};

use crate::app::events::{AppEvent, StatusReport};
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started { polling_fallback } => {
                info!("START | polling_fallback={}", polling_fallback);
            }
            AppEvent::Configured { rearmed } => {
                info!("CONFIG | applied, rearmed=0b{:04b}", rearmed);
            }
            AppEvent::ConfigRejected(e) => {
                warn!("CONFIG | rejected: {}", e);
            }
            AppEvent::DoorChanged { channel, state } => {
                info!("DOOR | ch={} state={:?}", channel, state);
            }
            AppEvent::FadeFinished { channel, level } => {
                info!("FADE | ch={} level={}", channel, level);
            }
            AppEvent::PollingFallbackChanged(enabled) => {
                info!("POLL | fallback={}", enabled);
            }
            AppEvent::Status(report) => match status_json(report) {
                Some(json) => info!("STATUS | {}", json),
                None => warn!("STATUS | serialisation failed"),
            },
        }
    }
}

/// Render a status snapshot as one line of JSON.
pub fn status_json(report: &StatusReport) -> Option<String> {
    serde_json::to_string(report).ok()
}
