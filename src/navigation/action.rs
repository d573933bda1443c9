//! Timed maneuvers

use crate::config::{ActionConfig, SpeedConfig};
use crate::core::types::{CountMode, Motion, MotionCommand};

/// Maneuver kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActionKind {
    #[default]
    None,
    Pause,
    Reverse,
    Backoff,
    TurnLeft90,
    TurnRight90,
    UTurn180,
}

/// One maneuver with a fixed duration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimedAction {
    pub kind: ActionKind,
    pub duration_ms: u32,
}

impl TimedAction {
    pub const fn new(kind: ActionKind, duration_ms: u32) -> Self {
        Self { kind, duration_ms }
    }
}

/// Wheel duty per motion profile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpeedProfile {
    pub forward_pct: u8,
    pub reverse_pct: u8,
    pub turn_pct: u8,
}

impl From<&SpeedConfig> for SpeedProfile {
    fn from(c: &SpeedConfig) -> Self {
        Self {
            forward_pct: c.forward_pct,
            reverse_pct: c.reverse_pct,
            turn_pct: c.turn_pct,
        }
    }
}

impl Default for SpeedProfile {
    fn default() -> Self {
        Self::from(&SpeedConfig::default())
    }
}

/// Maneuver durations used by the planner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionTiming {
    pub pause_before_reverse_ms: u32,
    pub reverse_long_ms: u32,
    pub backoff_short_ms: u32,
    pub turn_90_ms: u32,
    pub turn_180_ms: u32,
}

impl From<&ActionConfig> for ActionTiming {
    fn from(c: &ActionConfig) -> Self {
        Self {
            pause_before_reverse_ms: c.pause_before_reverse_ms,
            reverse_long_ms: c.reverse_long_ms,
            backoff_short_ms: c.backoff_short_ms,
            turn_90_ms: c.turn_90_ms,
            turn_180_ms: c.turn_180_ms,
        }
    }
}

impl Default for ActionTiming {
    fn default() -> Self {
        Self::from(&ActionConfig::default())
    }
}

/// What starting an action does to the drive and the count mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionEffect {
    pub command: MotionCommand,
    pub count_mode: CountMode,
}

impl ActionKind {
    /// Effect of starting this action
    ///
    /// Reversing always counts down; every other kind restores the mode
    /// implied by the countdown flag.
    pub fn effect(self, speeds: &SpeedProfile, countdown: bool) -> ActionEffect {
        let restored = if countdown {
            CountMode::Down
        } else {
            CountMode::Up
        };
        let (command, count_mode) = match self {
            ActionKind::None | ActionKind::Pause => (MotionCommand::STOP, restored),
            ActionKind::Reverse | ActionKind::Backoff => (
                MotionCommand::symmetric(Motion::Backward, speeds.reverse_pct),
                CountMode::Down,
            ),
            ActionKind::TurnLeft90 => (
                MotionCommand::symmetric(Motion::TurnLeft, speeds.turn_pct),
                restored,
            ),
            ActionKind::TurnRight90 | ActionKind::UTurn180 => (
                MotionCommand::symmetric(Motion::TurnRight, speeds.turn_pct),
                restored,
            ),
        };
        ActionEffect {
            command,
            count_mode,
        }
    }
}
