//! Status telemetry
//!
//! - [`StatusReport`]: point-in-time navigation status, rendered as the
//!   comma-separated status line or the two-line 16x2 panel view
//! - [`PeriodicSchedule`]: wrap-safe "every N ms" gate
//! - [`StatusPublisher`]: background thread writing status lines

mod publisher;
mod report;
mod schedule;

pub use publisher::StatusPublisher;
pub use report::{PANEL_COLUMNS, StatusReport};
pub use schedule::PeriodicSchedule;

/// First line published after start-up
pub const BOOT_LINE: &str = "boot:navcar ready";
