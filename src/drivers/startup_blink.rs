//! Startup self-test: blink each light in turn.
//!
//! Runs on the same tick cadence as the controller and never blocks.  The
//! main loop calls [`StartupBlink::tick`] until it returns `false`, then
//! hands the lights over to the controller with every output dark.
//!
//! ```text
//!  ch0 ▇▇▇▇______________
//!  ch1 ____▇▇▇▇__________
//!  ch2 ________▇▇▇▇______
//!  ch3 ____________▇▇▇▇__
//! ```

use log::info;

use crate::app::ports::LightPort;
use crate::pins::{DEV_COUNT, PinId};

/// How long each light stays on.
pub const BLINK_ON_MS: u32 = 250;

pub struct StartupBlink {
    lights: [PinId; DEV_COUNT],
    level: u16,
    on_ticks: u32,
    channel: usize,
    elapsed: u32,
}

impl StartupBlink {
    /// `level` is the brightness each light is shown at; `tick_ms` the
    /// caller's tick period.
    pub fn new(lights: [PinId; DEV_COUNT], level: u16, tick_ms: u32) -> Self {
        Self {
            lights,
            level,
            on_ticks: BLINK_ON_MS.div_ceil(tick_ms.max(1)),
            channel: 0,
            elapsed: 0,
        }
    }

    /// Advance one tick.  Returns `true` while the sequence is still running.
    pub fn tick(&mut self, hw: &mut impl LightPort) -> bool {
        let Some(&pin) = self.lights.get(self.channel) else {
            return false;
        };
        if self.elapsed == 0 {
            hw.write_level(pin, self.level);
        }
        self.elapsed += 1;
        if self.elapsed >= self.on_ticks {
            hw.write_level(pin, 0);
            self.channel += 1;
            self.elapsed = 0;
            if self.is_done() {
                info!("Startup self-test complete ({} lights)", DEV_COUNT);
            }
        }
        !self.is_done()
    }

    pub fn is_done(&self) -> bool {
        self.channel >= DEV_COUNT
    }
}
