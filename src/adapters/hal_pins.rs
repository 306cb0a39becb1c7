//! Generic `embedded-hal` pin bank.
//!
//! Implements the hardware ports over any [`InputPin`] / [`SetDutyCycle`]
//! pair, for boards brought up through a HAL instead of raw ESP-IDF calls.
//! The bank owns a fixed set of pins handed over at construction and can
//! only arm those; it has no interrupt source, so a controller driving it
//! must keep the polling fallback enabled.

use core::fmt::Debug;

use embedded_hal::digital::InputPin;
use embedded_hal::pwm::SetDutyCycle;
use log::warn;

use crate::app::ports::{ClockPort, LightPort, SensorPort};
use crate::error::HwError;
use crate::pins::PinId;

struct Slot<P> {
    pin: PinId,
    periph: P,
    armed: bool,
}

impl<P> Slot<P> {
    fn new((pin, periph): (PinId, P)) -> Self {
        Self {
            pin,
            periph,
            armed: false,
        }
    }
}

/// A fixed bank of HAL pins addressed by GPIO number.
pub struct HalPinBank<I, O, C, const NI: usize, const NO: usize> {
    inputs: [Slot<I>; NI],
    outputs: [Slot<O>; NO],
    pwm_max: u16,
    clock: C,
}

impl<I, O, C, const NI: usize, const NO: usize> HalPinBank<I, O, C, NI, NO>
where
    I: InputPin,
    O: SetDutyCycle,
    C: ClockPort,
{
    pub fn new(
        inputs: [(PinId, I); NI],
        outputs: [(PinId, O); NO],
        pwm_max: u16,
        clock: C,
    ) -> Self {
        Self {
            inputs: inputs.map(Slot::new),
            outputs: outputs.map(Slot::new),
            pwm_max,
            clock,
        }
    }

    /// Borrow the output peripheral behind `pin`.
    pub fn output(&self, pin: PinId) -> Option<&O> {
        self.outputs.iter().find(|s| s.pin == pin).map(|s| &s.periph)
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    fn input_slot(&mut self, pin: PinId) -> Option<&mut Slot<I>> {
        self.inputs.iter_mut().find(|s| s.pin == pin)
    }

    fn output_slot(&mut self, pin: PinId) -> Option<&mut Slot<O>> {
        self.outputs.iter_mut().find(|s| s.pin == pin)
    }
}

impl<I, O, C, const NI: usize, const NO: usize> SensorPort for HalPinBank<I, O, C, NI, NO>
where
    I: InputPin,
    I::Error: Debug,
    O: SetDutyCycle,
    C: ClockPort,
{
    fn arm_input(&mut self, pin: PinId) -> Result<(), HwError> {
        let slot = self.input_slot(pin).ok_or(HwError::PinUnavailable(pin))?;
        slot.armed = true;
        Ok(())
    }

    fn release_input(&mut self, pin: PinId) {
        if let Some(slot) = self.input_slot(pin) {
            slot.armed = false;
        }
    }

    fn read_raw(&mut self, pin: PinId) -> bool {
        let Some(slot) = self.input_slot(pin) else {
            return true;
        };
        slot.periph.is_high().unwrap_or_else(|e| {
            warn!("GPIO {pin} read failed: {e:?}");
            true
        })
    }
}

impl<I, O, C, const NI: usize, const NO: usize> LightPort for HalPinBank<I, O, C, NI, NO>
where
    I: InputPin,
    O: SetDutyCycle,
    O::Error: Debug,
    C: ClockPort,
{
    fn arm_output(&mut self, pin: PinId) -> Result<(), HwError> {
        let slot = self.output_slot(pin).ok_or(HwError::PinUnavailable(pin))?;
        slot.periph
            .set_duty_cycle_fully_off()
            .map_err(|_| HwError::PinUnavailable(pin))?;
        slot.armed = true;
        Ok(())
    }

    fn release_output(&mut self, pin: PinId) {
        if let Some(slot) = self.output_slot(pin) {
            if let Err(e) = slot.periph.set_duty_cycle_fully_off() {
                warn!("GPIO {pin} off failed: {e:?}");
            }
            slot.armed = false;
        }
    }

    fn write_level(&mut self, pin: PinId, level: u16) {
        let pwm_max = self.pwm_max;
        let Some(slot) = self.output_slot(pin).filter(|s| s.armed) else {
            return;
        };
        if let Err(e) = slot.periph.set_duty_cycle_fraction(level.min(pwm_max), pwm_max) {
            warn!("GPIO {pin} duty write failed: {e:?}");
        }
    }
}

impl<I, O, C: ClockPort, const NI: usize, const NO: usize> ClockPort
    for HalPinBank<I, O, C, NI, NO>
{
    fn now(&self) -> core::time::Duration {
        self.clock.now()
    }
}
