//! Pure control building blocks: no I/O, no clocks of their own.
//!
//! | Module     | Role                                          |
//! |------------|-----------------------------------------------|
//! | `polarity` | raw level + wiring → door open?               |
//! | `debounce` | per-channel acceptance window                 |
//! | `door`     | CLOSED/OPEN tracker, emits fade requests      |
//! | `fade`     | linear step ramp between dark and full        |

pub mod debounce;
pub mod door;
pub mod fade;
pub mod polarity;
