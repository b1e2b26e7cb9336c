//! Timing utilities.
//!
//! [`SdpiClock`] measures the total time of one solve call and is checked
//! against the caller's time limit.  [`Timers`] collects nested per-phase
//! timings for verbose reporting.

mod clock;
#[allow(clippy::module_inception)]
mod timers;

pub use clock::*;
pub use timers::*;

cfg_if::cfg_if! {
    if #[cfg(target_family = "wasm")] {
        pub(crate) use web_time::{Duration, Instant};
    } else {
        pub(crate) use std::time::{Duration, Instant};
    }
}
