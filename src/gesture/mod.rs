//! Shake gesture detection
//!
//! Pointer samples are reduced to cardinal directions, and a shake is a quick
//! run of direction reversals. Speed alone is not enough: a fast straight
//! drag must not trigger the effect.

pub mod direction;
pub mod shake;

pub use shake::{ShakeDetector, Verdict};
