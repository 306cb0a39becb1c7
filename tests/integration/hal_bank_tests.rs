//! The controller driven through the generic `embedded-hal` pin bank.
//!
//! The bank has no interrupt source, so these run with the polling
//! fallback on and never touch the notifier.

use std::cell::Cell;
use std::convert::Infallible;
use std::rc::Rc;
use std::time::Duration;

use cabinetlight::adapters::hal_pins::HalPinBank;
use cabinetlight::app::ports::ClockPort;
use cabinetlight::app::service::CabinetLight;
use cabinetlight::config::SystemConfig;
use cabinetlight::control::door::DoorState;
use cabinetlight::error::{Error, HwError};
use embedded_hal::digital::InputPin;
use embedded_hal::pwm::SetDutyCycle;

use crate::mock_hw::{LogSink, leak_notifier};

const DUTY_MAX: u16 = 1_000;

#[derive(Clone, Default)]
struct SharedInput(Rc<Cell<bool>>);

impl embedded_hal::digital::ErrorType for SharedInput {
    type Error = Infallible;
}

impl InputPin for SharedInput {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        Ok(self.0.get())
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        Ok(!self.0.get())
    }
}

#[derive(Clone, Default)]
struct SharedPwm(Rc<Cell<u16>>);

impl embedded_hal::pwm::ErrorType for SharedPwm {
    type Error = Infallible;
}

impl SetDutyCycle for SharedPwm {
    fn max_duty_cycle(&self) -> u16 {
        DUTY_MAX
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Infallible> {
        self.0.set(duty);
        Ok(())
    }
}

#[derive(Clone, Default)]
struct SharedClock(Rc<Cell<u64>>);

impl ClockPort for SharedClock {
    fn now(&self) -> Duration {
        Duration::from_millis(self.0.get())
    }
}

type Bank = HalPinBank<SharedInput, SharedPwm, SharedClock, 4, 4>;

struct Board {
    bank: Bank,
    inputs: [SharedInput; 4],
    pwms: [SharedPwm; 4],
    clock: SharedClock,
}

fn board() -> Board {
    let inputs: [SharedInput; 4] = core::array::from_fn(|_| SharedInput(Rc::new(Cell::new(true))));
    let pwms: [SharedPwm; 4] = core::array::from_fn(|_| SharedPwm::default());
    let clock = SharedClock::default();
    let bank = HalPinBank::new(
        [6u8, 7, 8, 9].map(|pin| (pin, inputs[usize::from(pin - 6)].clone())),
        [2u8, 3, 4, 5].map(|pin| (pin, pwms[usize::from(pin - 2)].clone())),
        12_500,
        clock.clone(),
    );
    Board {
        bank,
        inputs,
        pwms,
        clock,
    }
}

fn start(board: &mut Board) -> (CabinetLight, LogSink) {
    let config = SystemConfig {
        polling_fallback: true,
        ..SystemConfig::default()
    };
    let mut sink = LogSink::new();
    let mut app = CabinetLight::new(&config, leak_notifier(), &board.bank);
    app.start(&mut board.bank, &mut sink).unwrap();
    (app, sink)
}

fn run_ticks(app: &mut CabinetLight, board: &mut Board, sink: &mut LogSink, n: usize) {
    for _ in 0..n {
        board.clock.0.set(board.clock.0.get() + 20);
        app.process(&mut board.bank, sink);
    }
}

#[test]
fn polled_door_drives_hal_duty() {
    let mut board = board();
    let (mut app, mut sink) = start(&mut board);
    assert!(app.is_initialized());
    assert!(board.pwms.iter().all(|p| p.0.get() == 0));

    board.inputs[1].0.set(false);
    run_ticks(&mut app, &mut board, &mut sink, 30);

    assert_eq!(app.door(1), Some(DoorState::Open));
    assert_eq!(board.pwms[1].0.get(), DUTY_MAX);
    assert_eq!(board.pwms[0].0.get(), 0);

    board.inputs[1].0.set(true);
    run_ticks(&mut app, &mut board, &mut sink, 30);

    assert_eq!(app.door(1), Some(DoorState::Closed));
    assert_eq!(board.pwms[1].0.get(), 0);
}

#[test]
fn pin_outside_bank_is_reported_unavailable() {
    let mut board = board();
    let (mut app, mut sink) = start(&mut board);

    let result = app.set_sensor_inputs([6, 7, 8, 10], &mut board.bank, &mut sink);

    assert_eq!(result, Err(Error::Hardware(HwError::PinUnavailable(10))));
    assert!(!app.is_initialized());
    assert!(!app.channel(3).unwrap().sensor_armed());
}
