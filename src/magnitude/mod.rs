//! Byte quantities with a power-of-1024 exponent.
//!
//! [`MagnitudeCount`] is used for every size total the recovery keeps, so that
//! a run over many large logs can accumulate terabytes next to single bytes.

pub mod count;

pub use count::{MAX_SCALE, MIN_SCALE, MagnitudeCount, PREFIXES};
