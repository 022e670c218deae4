//! Argument parsing, sampling and formatting helpers shared by transforms.

pub mod range;
pub mod repr;

pub use range::*;
pub use repr::*;
