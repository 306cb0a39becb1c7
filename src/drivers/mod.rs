//! Peripheral bring-up and light-side helpers.

pub mod hw_init;
pub mod startup_blink;
