//! Core data types for sensing, motion and display.
//!
//! Key types:
//! - [`SensorSnapshot`]: Conditioned view of the four analog channels, rebuilt every tick
//! - [`MotionCommand`]: What the drive should do right now
//! - [`SceneId`]: Which sensors currently report an obstacle
//! - [`DisplayDigit`]: Single seven-segment digit (or blank)

use serde::{Deserialize, Serialize};
use std::fmt;

/// Full-scale reading of the 12-bit analog inputs
pub const ADC_MAX: u16 = 4095;

/// Analog input channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    /// Reflective floor sensor used to detect marks
    Mark,
    /// Forward-looking IR range sensor
    Front,
    /// Left IR range sensor
    Left,
    /// Right IR range sensor
    Right,
}

/// Drive motion state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Motion {
    #[default]
    Stop,
    Forward,
    Backward,
    TurnLeft,
    TurnRight,
}

impl Motion {
    /// Short label used on the status panel
    pub fn label(&self) -> &'static str {
        match self {
            Motion::Stop => "STOP",
            Motion::Forward => "FWD",
            Motion::Backward => "BACK",
            Motion::TurnLeft => "L-TURN",
            Motion::TurnRight => "R-TURN",
        }
    }
}

/// Scene classification from the obstacle flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SceneId {
    /// Front clear (side flags ignored)
    #[default]
    ClearForward,
    /// Front blocked, both sides clear
    FrontOnly,
    /// Front and left blocked
    FrontLeft,
    /// Front and right blocked
    FrontRight,
    /// Front, left and right blocked
    FrontLeftRight,
}

impl SceneId {
    /// Numeric scene id (1..=5) used in telemetry
    pub fn id(&self) -> u8 {
        match self {
            SceneId::ClearForward => 1,
            SceneId::FrontOnly => 2,
            SceneId::FrontLeft => 3,
            SceneId::FrontRight => 4,
            SceneId::FrontLeftRight => 5,
        }
    }
}

impl fmt::Display for SceneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Scene{}", self.id())
    }
}

/// Direction the mark counter moves on each accepted mark
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CountMode {
    #[default]
    Up,
    Down,
}

/// One raw reading of every analog channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RawSample {
    pub mark: u16,
    pub front: u16,
    pub left: u16,
    pub right: u16,
}

/// Conditioned sensor state for one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SensorSnapshot {
    /// Raw readings as sampled this tick
    pub raw: RawSample,
    /// IIR-filtered readings
    pub filtered: RawSample,
    pub front_blocked: bool,
    pub left_blocked: bool,
    pub right_blocked: bool,
    /// Debounced mark state
    pub mark_detected: bool,
}

impl SensorSnapshot {
    /// True when any range sensor reports an obstacle
    #[inline]
    pub fn any_obstacle(&self) -> bool {
        self.front_blocked || self.left_blocked || self.right_blocked
    }
}

/// Drive command emitted by the navigation core
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MotionCommand {
    pub motion: Motion,
    /// Left wheel duty (0-100)
    pub left_speed_pct: u8,
    /// Right wheel duty (0-100)
    pub right_speed_pct: u8,
}

impl MotionCommand {
    /// Stop with zero duty
    pub const STOP: MotionCommand = MotionCommand {
        motion: Motion::Stop,
        left_speed_pct: 0,
        right_speed_pct: 0,
    };

    /// Same duty on both wheels
    pub fn symmetric(motion: Motion, speed_pct: u8) -> Self {
        Self {
            motion,
            left_speed_pct: speed_pct,
            right_speed_pct: speed_pct,
        }
    }

    #[inline]
    pub fn is_stop(&self) -> bool {
        self.motion == Motion::Stop
    }
}

/// Segment masks for digits 0-9, bit order A B C D E F G (bit 0 = A)
const DIGIT_SEGMENTS: [u8; 10] = [0x3F, 0x06, 0x5B, 0x4F, 0x66, 0x6D, 0x7D, 0x07, 0x7F, 0x6F];

/// Value shown on the single-digit counter display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayDigit {
    #[default]
    Blank,
    Digit(u8),
}

impl DisplayDigit {
    /// Map a counter value onto the display; anything outside 0..=9 is blank
    pub fn from_value(value: i32) -> Self {
        match u8::try_from(value) {
            Ok(d) if d <= 9 => DisplayDigit::Digit(d),
            _ => DisplayDigit::Blank,
        }
    }

    /// Seven-segment mask for this value
    pub fn segments(&self) -> u8 {
        match self {
            DisplayDigit::Digit(d) => DIGIT_SEGMENTS.get(*d as usize).copied().unwrap_or(0),
            DisplayDigit::Blank => 0,
        }
    }
}
