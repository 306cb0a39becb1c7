//! Interrupt-to-main-loop edge signalling.
//!
//! Door sensor edges are produced by GPIO ISRs and consumed by the control
//! tick.  The only data written from both sides is one pending-event
//! bitmask, one bit per channel:
//!
//! ```text
//! ┌─────────────┐  fetch_or(1 << ch)  ┌──────────────┐  swap(0)  ┌──────────────┐
//! │ GPIO ISR    │────────────────────▶│ pending: u8  │──────────▶│ process()    │
//! │ (any edge)  │                     │  (atomic)    │           │ (main loop)  │
//! └─────────────┘                     └──────────────┘           └──────────────┘
//! ```
//!
//! OR-set from the ISR and swap-to-zero from the tick are single atomic RMW
//! operations, so an edge arriving during a drain lands in either this drain
//! or the next one, never lost and never counted twice.  Any number of edges
//! on one channel between two drains collapse into one bit.
//!
//! The ISR finds the channel for a GPIO through a routing table of atomics.
//! The table is written only by the tick context during reconfiguration and
//! read by the ISR; no other controller state is reachable from here.

use core::ptr;
use core::sync::atomic::{AtomicPtr, AtomicU8, Ordering};

use crate::pins::{DEV_COUNT, PinId};

/// Routing-table value for a channel with no armed sensor.
const UNROUTED: u8 = u8::MAX;

/// Pending-event set plus the GPIO → channel routing table.
pub struct EdgeNotifier {
    pending: AtomicU8,
    routes: [AtomicU8; DEV_COUNT],
}

impl Default for EdgeNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl EdgeNotifier {
    /// `const` so the notifier can live in a `static`.
    pub const fn new() -> Self {
        Self {
            pending: AtomicU8::new(0),
            routes: [const { AtomicU8::new(UNROUTED) }; DEV_COUNT],
        }
    }

    /// Record an edge on `pin`.
    /// Safe to call from interrupt context (lock-free).
    /// Returns `false` if no channel is routed to `pin` (edge ignored).
    pub fn notify(&self, pin: PinId) -> bool {
        if pin == UNROUTED {
            return false;
        }
        for (channel, route) in self.routes.iter().enumerate() {
            if route.load(Ordering::Acquire) == pin {
                self.pending.fetch_or(1 << channel, Ordering::AcqRel);
                return true;
            }
        }
        false
    }

    /// Take every pending bit, leaving the set empty.
    /// Called from the main loop (single consumer).
    pub fn drain(&self) -> u8 {
        self.pending.swap(0, Ordering::AcqRel)
    }

    /// Peek without clearing.
    pub fn pending(&self) -> u8 {
        self.pending.load(Ordering::Acquire)
    }

    /// Route edges on `pin` to `channel`.
    pub(crate) fn route(&self, channel: usize, pin: PinId) {
        self.routes[channel].store(pin, Ordering::Release);
    }

    /// Stop routing edges to `channel` and drop any edge already pending
    /// for it.
    pub(crate) fn unroute(&self, channel: usize) {
        self.routes[channel].store(UNROUTED, Ordering::Release);
        self.pending.fetch_and(!(1 << channel), Ordering::AcqRel);
    }

    /// GPIO currently routed to `channel`, if any.
    pub fn routed_pin(&self, channel: usize) -> Option<PinId> {
        match self.routes[channel].load(Ordering::Acquire) {
            UNROUTED => None,
            pin => Some(pin),
        }
    }
}

// ── ISR dispatch ──────────────────────────────────────────────
//
// ESP-IDF GPIO ISRs are plain `extern "C"` functions.  The per-pin
// registration argument carries the GPIO number; this one pointer is the
// only global and is used for nothing but forwarding edges.

static DISPATCH: AtomicPtr<EdgeNotifier> = AtomicPtr::new(ptr::null_mut());

/// Make `notifier` the target of [`dispatch_edge`].
pub fn install_dispatch(notifier: &'static EdgeNotifier) {
    DISPATCH.store(ptr::from_ref(notifier).cast_mut(), Ordering::Release);
}

/// Forward an edge on `pin` to the installed notifier.
/// Safe to call from interrupt context.  Returns `false` if nothing is
/// installed or the pin is not routed.
pub fn dispatch_edge(pin: PinId) -> bool {
    let notifier = DISPATCH.load(Ordering::Acquire);
    if notifier.is_null() {
        return false;
    }
    // SAFETY: the pointer was derived from a `&'static EdgeNotifier` in
    // `install_dispatch`, and `EdgeNotifier` is only accessed through
    // shared references (all fields are atomics).
    unsafe { (*notifier).notify(pin) }
}
