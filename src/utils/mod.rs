//! Shared utilities: constants, fixed-point math and clocks.

pub mod constants;
pub mod math;
pub mod time;
