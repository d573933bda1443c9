//! Sensor conditioning
//!
//! Turns raw analog samples into a [`SensorSnapshot`](crate::core::types::SensorSnapshot):
//!
//! ```text
//! raw ──▶ IirFilter ──▶ threshold ──▶ obstacle flags
//!                  └──▶ polarity ──▶ MarkEdgeDetector ──▶ mark_detected + edge latch
//! ```

mod conditioner;
mod debounce;
mod filter;

pub use conditioner::{ConditionerConfig, SensorConditioner};
pub use debounce::MarkEdgeDetector;
pub use filter::IirFilter;
