//! Sensor polarity resolution.
//!
//! Reed contacts can be wired either way round.  With `active_low` the
//! contact pulls the (pulled-up) line LOW when the door is open; without it
//! the line reads HIGH when open.

/// Map a raw input level to "door open".
pub const fn resolve(raw: bool, active_low: bool) -> bool {
    raw != active_low
}
