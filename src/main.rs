//! Cabinet light firmware: main entry point.
//!
//! Hexagonal architecture driven by a fixed-period control tick.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter          LogEventSink       Esp32TimeAdapter  │
//! │  (Sensor+Light+Clock)     (EventSink)        (ClockPort)       │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │            CabinetLight (pure logic)                   │    │
//! │  │  debounce · door tracking · fades                      │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  GPIO ISR ──▶ EdgeNotifier (lock-free pending set)             │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::thread;
use std::time::Duration;

use anyhow::Result;
use log::{error, info};

use cabinetlight::adapters::hardware::HardwareAdapter;
use cabinetlight::adapters::log_sink::LogEventSink;
use cabinetlight::adapters::time::Esp32TimeAdapter;
use cabinetlight::app::events::AppEvent;
use cabinetlight::app::ports::EventSink;
use cabinetlight::app::service::CabinetLight;
use cabinetlight::config::SystemConfig;
use cabinetlight::drivers::hw_init;
use cabinetlight::drivers::startup_blink::StartupBlink;
use cabinetlight::events::{self, EdgeNotifier};

/// Seconds between status snapshots on the console.
const STATUS_INTERVAL_SECS: u64 = 60;

static NOTIFIER: EdgeNotifier = EdgeNotifier::new();

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  CabinetLight v{}                 ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let config = SystemConfig::default();
    config.validate()?;

    // ── 2. Peripherals ────────────────────────────────────────
    events::install_dispatch(&NOTIFIER);
    hw_init::init_isr_service()?;
    hw_init::init_ledc_timer()?;

    let mut hw = HardwareAdapter::new(config.pwm_max, Esp32TimeAdapter::new());
    let mut log_sink = LogEventSink::new();

    // ── 3. Controller ─────────────────────────────────────────
    let mut app = CabinetLight::new(&config, &NOTIFIER, &hw);
    if let Err(e) = app.start(&mut hw, &mut log_sink) {
        error!("Channel setup failed: {}, halting", e);
    }
    if !app.is_initialized() {
        // Nothing sensible to drive; the lights stay dark.
        loop {
            thread::sleep(Duration::from_secs(1));
        }
    }

    let tick = config.tick_period();

    // ── 4. Startup self-test ──────────────────────────────────
    if config.startup_test {
        let mut blink = StartupBlink::new(config.light_gpios, config.pwm_max, config.tick_ms);
        while blink.tick(&mut hw) {
            thread::sleep(tick);
        }
    }

    info!("System ready. Entering control loop ({} ms tick).", config.tick_ms);

    // ── 5. Control loop ───────────────────────────────────────
    let status_every = (STATUS_INTERVAL_SECS * 1_000 / u64::from(config.tick_ms)).max(1);

    loop {
        app.process(&mut hw, &mut log_sink);

        if app.tick_count() % status_every == 0 {
            log_sink.emit(&AppEvent::Status(app.status()));
        }

        thread::sleep(tick);
    }
}
