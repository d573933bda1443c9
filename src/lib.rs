//! navcar - Navigation core for an obstacle-avoiding, mark-counting car
//!
//! The car drives forward, backs off and turns around obstacles seen by
//! three IR range sensors, and counts floor marks on a single seven-segment
//! digit. Once it has been boxed in on all three sides it counts down
//! instead, and stops for good when the count reaches zero.
//!
//! ## Layout
//!
//! - [`sensors`]: Filtering, thresholds and mark debouncing
//! - [`navigation`]: Scene classification, maneuver queue and per-tick control
//! - [`telemetry`]: Status line, panel view and publisher thread
//! - [`devices`]: Device factory and the simulated car
//! - [`app`]: Fixed-cadence runner
//!
//! ## Features
//!
//! - `mock` (default): Simulated car for hardware-free runs

pub mod app;
pub mod config;
pub mod core;
pub mod devices;
pub mod error;
pub mod navigation;
pub mod sensors;
pub mod telemetry;

// Re-export commonly used types
pub use config::NavConfig;
pub use error::{Error, Result};
pub use navigation::NavigationController;
