/// Shared utilities

pub mod clock;
pub mod display;

pub use clock::{Clock, FixedClock, SystemClock};
