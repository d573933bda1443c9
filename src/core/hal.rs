//! Collaborator traits between the navigation core and a device.
//!
//! The core only *requests* things through these traits. Implementations
//! must return promptly: anything that takes time (beep patterns, blinking,
//! serial output) belongs on the implementation's own thread.

use crate::core::types::{Channel, DisplayDigit, Motion, MotionCommand};
use crate::error::Result;
use crate::telemetry::StatusReport;

/// Analog inputs
pub trait SensorPort {
    /// Read one channel (0..=4095)
    fn read_channel(&mut self, channel: Channel) -> Result<u16>;
}

/// Monotonic millisecond clock
///
/// The counter wraps at `u32::MAX`; callers compare with `wrapping_sub`.
pub trait Clock {
    fn now_ms(&self) -> u32;
}

/// Drive, display and indicator outputs
pub trait ActuatorPort {
    /// Drive with the given motion and per-wheel duty (0-100)
    fn set_motion(&mut self, motion: Motion, left_speed_pct: u8, right_speed_pct: u8);

    /// Cut drive power
    fn stop_motors(&mut self);

    /// Show a value on the counter display
    fn set_digit(&mut self, digit: DisplayDigit);

    fn set_obstacle_indicator(&mut self, on: bool);

    fn set_mark_indicator(&mut self, on: bool);

    /// Apply a motion command (stop commands cut power)
    fn apply(&mut self, command: MotionCommand) {
        if command.is_stop() {
            self.stop_motors();
        } else {
            self.set_motion(
                command.motion,
                command.left_speed_pct,
                command.right_speed_pct,
            );
        }
    }
}

/// Audible and visual feedback requests
pub trait FeedbackPort {
    fn request_beep(&mut self, duration_ms: u32);

    fn request_beep_pattern(&mut self, count: u8, on_ms: u32, off_ms: u32);

    /// Blink both indicators together
    fn request_blink(&mut self, count: u8, on_ms: u32, off_ms: u32);
}

/// Periodic status output
pub trait TelemetryPort {
    fn report_status(&mut self, report: &StatusReport);
}

/// Everything the navigation core needs from a vehicle
pub trait DeviceDriver: SensorPort + Clock + ActuatorPort + FeedbackPort + Send {
    /// Bring up the device (start simulation/worker threads)
    fn initialize(&mut self) -> Result<()>;

    /// Stop motors and release background resources
    fn shutdown(&mut self) -> Result<()>;
}
