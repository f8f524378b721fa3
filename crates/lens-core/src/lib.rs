//! Shared data model for swap-pattern profiling.

pub mod patterns;
pub mod types;

pub use patterns::*;
pub use types::*;
