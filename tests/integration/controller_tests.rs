//! Integration tests for the notify → process → fade → light pipeline.
//!
//! These run on the host and drive a [`CabinetLight`] through the mock
//! adapters tick by tick, with the clock under test control.

use cabinetlight::app::events::AppEvent;
use cabinetlight::app::service::CabinetLight;
use cabinetlight::config::SystemConfig;
use cabinetlight::control::door::DoorState;
use cabinetlight::events::EdgeNotifier;

use crate::mock_hw::{LogSink, MockHardware, leak_notifier};

const TICK_MS: u64 = 20;

fn make_app(polling: bool) -> (CabinetLight, MockHardware, LogSink, &'static EdgeNotifier) {
    let config = SystemConfig {
        polling_fallback: polling,
        ..SystemConfig::default()
    };
    let notifier = leak_notifier();
    let mut hw = MockHardware::new();
    let mut sink = LogSink::new();
    let mut app = CabinetLight::new(&config, notifier, &hw);
    app.start(&mut hw, &mut sink).unwrap();
    (app, hw, sink, notifier)
}

/// Run `n` ticks, advancing the clock by one tick period before each.
fn run_ticks(app: &mut CabinetLight, hw: &mut MockHardware, sink: &mut LogSink, n: usize) {
    for _ in 0..n {
        hw.advance_ms(TICK_MS);
        app.process(hw, sink);
    }
}

// ── Startup ───────────────────────────────────────────────────

#[test]
fn start_arms_every_channel_dark() {
    let (app, hw, sink, notifier) = make_app(true);

    assert!(app.is_initialized());
    for (ch, pin) in [6, 7, 8, 9].into_iter().enumerate() {
        assert_eq!(notifier.routed_pin(ch), Some(pin));
    }
    for pin in [2, 3, 4, 5] {
        assert_eq!(hw.level(pin), 0);
    }
    assert!(matches!(
        sink.events.first(),
        Some(AppEvent::Started { polling_fallback: true })
    ));
    assert!(matches!(
        sink.events.last(),
        Some(AppEvent::Configured { rearmed: 0b1111 })
    ));
}

// ── Edge path ─────────────────────────────────────────────────

#[test]
fn edge_after_debounce_window_opens_door() {
    let (mut app, mut hw, mut sink, notifier) = make_app(false);

    hw.edge(notifier, 6, false);
    hw.set_time_ms(150);
    app.process(&mut hw, &mut sink);

    let ch = app.channel(0).unwrap();
    assert_eq!(ch.door(), DoorState::Open);
    assert_eq!(ch.fade().target(), 12_500);
    assert!(ch.fade().is_fading());
    // First step already taken this tick.
    assert_eq!(hw.level(2), 1_000);
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::DoorChanged { channel: 0, state: DoorState::Open })),
        1
    );
}

#[test]
fn toggle_inside_window_is_rejected() {
    let (mut app, mut hw, mut sink, notifier) = make_app(false);

    hw.edge(notifier, 6, false);
    hw.set_time_ms(150);
    app.process(&mut hw, &mut sink);

    // Bounce 50 ms after the accepted observation.
    hw.edge(notifier, 6, true);
    hw.set_time_ms(200);
    app.process(&mut hw, &mut sink);

    let ch = app.channel(0).unwrap();
    assert_eq!(ch.door(), DoorState::Open);
    assert_eq!(ch.fade().target(), 12_500);
    assert_eq!(ch.last_trigger().as_millis(), 150);
}

#[test]
fn edge_inside_initial_window_is_dropped() {
    let (mut app, mut hw, mut sink, notifier) = make_app(false);

    hw.edge(notifier, 7, false);
    hw.set_time_ms(40);
    app.process(&mut hw, &mut sink);

    assert_eq!(app.door(1), Some(DoorState::Closed));
    assert_eq!(notifier.pending(), 0);
}

#[test]
fn burst_of_edges_is_one_observation() {
    let (mut app, mut hw, mut sink, notifier) = make_app(false);

    for high in [false, true, false, true, false] {
        hw.edge(notifier, 8, high);
    }
    hw.set_time_ms(500);
    app.process(&mut hw, &mut sink);

    assert_eq!(app.door(2), Some(DoorState::Open));
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::DoorChanged { .. })),
        1
    );
}

#[test]
fn unrouted_pin_is_ignored() {
    let (mut app, mut hw, mut sink, _notifier) = make_app(false);

    assert!(!app.notify(40));
    hw.set_time_ms(500);
    app.process(&mut hw, &mut sink);

    for ch in 0..4 {
        assert_eq!(app.door(ch), Some(DoorState::Closed));
    }
}

#[test]
fn without_polling_undelivered_edges_change_nothing() {
    let (mut app, mut hw, mut sink, _notifier) = make_app(false);
    hw.clear_calls();

    // Channel 2's input flips repeatedly but no edge is ever delivered.
    for i in 0..50 {
        hw.set_input(8, i % 2 == 1);
        run_ticks(&mut app, &mut hw, &mut sink, 5);
    }

    assert_eq!(app.door(2), Some(DoorState::Closed));
    assert!(hw.writes_to(4).is_empty());
}

// ── Poll path ─────────────────────────────────────────────────

#[test]
fn polling_catches_missed_edge() {
    let (mut app, mut hw, mut sink, _notifier) = make_app(true);

    hw.set_input(9, false);
    run_ticks(&mut app, &mut hw, &mut sink, 6);

    assert_eq!(app.door(3), Some(DoorState::Open));
    assert!(hw.level(5) > 0);
}

#[test]
fn steady_door_is_not_reported_twice() {
    let (mut app, mut hw, mut sink, notifier) = make_app(true);

    hw.edge(notifier, 6, false);
    run_ticks(&mut app, &mut hw, &mut sink, 50);

    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::DoorChanged { .. })),
        1
    );
}

/// Tick every 20 ms from the current time up to and including `until_ms`.
fn run_until(app: &mut CabinetLight, hw: &mut MockHardware, sink: &mut LogSink, until_ms: u64) {
    while hw.now_ms() + TICK_MS <= until_ms {
        run_ticks(app, hw, sink, 1);
    }
}

#[test]
fn polling_from_boot_keeps_window_for_first_opening() {
    let (mut app, mut hw, mut sink, notifier) = make_app(true);

    run_until(&mut app, &mut hw, &mut sink, 140);
    assert_eq!(app.channel(0).unwrap().last_trigger().as_millis(), 0);

    hw.edge(notifier, 6, false);
    hw.set_time_ms(150);
    app.process(&mut hw, &mut sink);
    run_until(&mut app, &mut hw, &mut sink, 3_000);

    assert_eq!(app.door(0), Some(DoorState::Open));
    assert_eq!(hw.level(2), 12_500);
}

#[test]
fn polling_after_resensor_keeps_window_for_first_opening() {
    let (mut app, mut hw, mut sink, notifier) = make_app(true);

    hw.set_time_ms(1_000);
    app.set_sensor_inputs([6, 7, 8, 10], &mut hw, &mut sink).unwrap();
    run_until(&mut app, &mut hw, &mut sink, 1_140);

    hw.edge(notifier, 10, false);
    hw.set_time_ms(1_150);
    app.process(&mut hw, &mut sink);
    run_until(&mut app, &mut hw, &mut sink, 3_000);

    assert_eq!(app.door(3), Some(DoorState::Open));
    assert_eq!(hw.level(5), 12_500);
}

#[test]
fn polling_toggle_emits_event() {
    let (mut app, _hw, mut sink, _notifier) = make_app(true);

    app.set_polling_fallback(false, &mut sink);
    app.set_polling_fallback(false, &mut sink);

    assert!(!app.polling_fallback());
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::PollingFallbackChanged(false))),
        1
    );
}

// ── Fades ─────────────────────────────────────────────────────

#[test]
fn open_ramps_to_full_then_finishes_once() {
    let (mut app, mut hw, mut sink, notifier) = make_app(false);

    hw.edge(notifier, 6, false);
    hw.set_time_ms(150);
    app.process(&mut hw, &mut sink);
    run_ticks(&mut app, &mut hw, &mut sink, 20);

    let writes = hw.writes_to(2);
    assert_eq!(writes.len(), 13);
    assert!(writes.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(writes.last(), Some(&12_500));
    assert!(!app.channel(0).unwrap().fade().is_fading());
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::FadeFinished { channel: 0, level: 12_500 })),
        1
    );
}

#[test]
fn close_mid_ramp_reverses_from_current_level() {
    let (mut app, mut hw, mut sink, notifier) = make_app(false);

    hw.edge(notifier, 6, false);
    hw.set_time_ms(150);
    app.process(&mut hw, &mut sink);
    run_ticks(&mut app, &mut hw, &mut sink, 7);
    assert_eq!(hw.level(2), 8_000);

    hw.edge(notifier, 6, true);
    hw.advance_ms(TICK_MS);
    app.process(&mut hw, &mut sink);

    assert_eq!(app.door(0), Some(DoorState::Closed));
    assert_eq!(hw.level(2), 7_000);
    assert_eq!(app.channel(0).unwrap().fade().target(), 0);
}

#[test]
fn request_fade_bypasses_door() {
    let (mut app, mut hw, mut sink, _notifier) = make_app(false);

    assert!(app.request_fade(1, true));
    assert!(!app.request_fade(1, true));
    assert!(!app.request_fade(7, true));
    run_ticks(&mut app, &mut hw, &mut sink, 1);

    assert_eq!(hw.level(3), 1_000);
    assert_eq!(app.door(1), Some(DoorState::Closed));
}

#[test]
fn all_off_cuts_lights_immediately() {
    let (mut app, mut hw, mut sink, notifier) = make_app(false);

    hw.edge(notifier, 6, false);
    hw.set_time_ms(150);
    app.process(&mut hw, &mut sink);
    run_ticks(&mut app, &mut hw, &mut sink, 3);

    app.all_off(&mut hw);

    assert_eq!(hw.level(2), 0);
    let ch = app.channel(0).unwrap();
    assert_eq!(ch.door(), DoorState::Closed);
    assert!(!ch.fade().is_fading());
}

// ── Status ────────────────────────────────────────────────────

#[test]
fn status_reflects_channel_state() {
    let (mut app, mut hw, mut sink, notifier) = make_app(false);

    hw.edge(notifier, 7, false);
    hw.set_time_ms(150);
    app.process(&mut hw, &mut sink);

    let report = app.status();
    assert!(report.initialized);
    assert!(!report.polling_fallback);
    let ch1 = report.channels[1];
    assert_eq!((ch1.sensor_gpio, ch1.light_gpio), (7, 3));
    assert!(ch1.active_low);
    assert_eq!(ch1.door, DoorState::Open);
    assert_eq!((ch1.level, ch1.target, ch1.fading), (1_000, 12_500, true));
    assert_eq!(report.channels[0].door, DoorState::Closed);
    assert_eq!(app.tick_count(), 1);
}

// ── Host hardware adapter ─────────────────────────────────────

#[test]
fn simulated_hardware_edge_reaches_controller() {
    use cabinetlight::adapters::hardware::HardwareAdapter;
    use cabinetlight::adapters::time::Esp32TimeAdapter;
    use cabinetlight::events;

    let config = SystemConfig {
        debounce_ms: 0,
        polling_fallback: false,
        ..SystemConfig::default()
    };
    let notifier = leak_notifier();
    events::install_dispatch(notifier);
    let mut hw = HardwareAdapter::new(config.pwm_max, Esp32TimeAdapter::new());
    let mut sink = LogSink::new();
    let mut app = CabinetLight::new(&config, notifier, &hw);
    app.start(&mut hw, &mut sink).unwrap();

    hw.sim_set_input(6, false);
    assert_eq!(notifier.pending(), 0b0001);
    app.process(&mut hw, &mut sink);

    assert_eq!(app.door(0), Some(DoorState::Open));
    assert_eq!(hw.sim_level(2), 1_000);
}
