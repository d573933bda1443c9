//! Mock device simulation configuration
//!
//! Every parameter has a default that reproduces the reference car on a
//! small test arena, so `[device.simulation]` may be omitted entirely.
//!
//! # Configuration Hierarchy
//!
//! ```text
//! SimulationConfig
//! ├── arena_width/height            # Walled rectangle, origin bottom-left
//! ├── obstacles, marks              # Axis-aligned boxes / floor strips
//! ├── start_x/y/theta               # Initial pose
//! ├── speed_factor, random_seed     # Simulation control
//! ├── clock_offset_ms               # Initial device clock value
//! ├── RobotConfig                   # Wheel base, speed limit, radius
//! ├── SensorModelConfig             # Range/mark sensor mounting + response
//! └── NoiseConfig                   # Reading noise, read failures
//! ```
//!
//! # Default Values
//!
//! | Parameter | Default | Source |
//! |-----------|---------|--------|
//! | wheel_base | 0.13 m | Measured |
//! | max_wheel_speed | 0.30 m/s | TT gear motor at 100% duty |
//! | robot_radius | 0.08 m | Chassis |
//! | range_gain | 43750 counts·cm | 2Y0A21 fit, 3.3V / 12-bit |
//! | mark_on/off_counts | 600 / 3200 | OPB704 over tape / floor |

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::f32::consts::FRAC_PI_4;

/// Axis-aligned rectangle (meters, arena frame)
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct RectConfig {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl RectConfig {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Robot physical parameters
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RobotConfig {
    /// Distance between wheel centers (meters)
    #[serde(default = "default_wheel_base")]
    pub wheel_base: f32,

    /// Wheel surface speed at 100% duty (m/s)
    #[serde(default = "default_max_wheel_speed")]
    pub max_wheel_speed: f32,

    /// Robot collision radius (meters)
    #[serde(default = "default_robot_radius")]
    pub robot_radius: f32,
}

fn default_wheel_base() -> f32 {
    0.13
}
fn default_max_wheel_speed() -> f32 {
    0.30
}
fn default_robot_radius() -> f32 {
    0.08
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            wheel_base: default_wheel_base(),
            max_wheel_speed: default_max_wheel_speed(),
            robot_radius: default_robot_radius(),
        }
    }
}

/// Range and mark sensor models
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SensorModelConfig {
    /// Side sensor angle from forward (radians, left positive)
    #[serde(default = "default_side_angle")]
    pub side_angle: f32,

    /// Range response: counts = range_gain / distance_cm
    #[serde(default = "default_range_gain")]
    pub range_gain: f32,

    /// Farthest distance the range sensors resolve (meters)
    #[serde(default = "default_max_range")]
    pub max_range: f32,

    /// Reading with nothing in range
    #[serde(default = "default_floor_counts")]
    pub floor_counts: u16,

    /// Mark sensor distance ahead of the robot center (meters)
    #[serde(default = "default_mark_offset")]
    pub mark_offset: f32,

    /// Mark sensor reading over a mark
    #[serde(default = "default_mark_on_counts")]
    pub mark_on_counts: u16,

    /// Mark sensor reading over bare floor
    #[serde(default = "default_mark_off_counts")]
    pub mark_off_counts: u16,
}

fn default_side_angle() -> f32 {
    FRAC_PI_4
}
fn default_range_gain() -> f32 {
    43750.0
}
fn default_max_range() -> f32 {
    0.8
}
fn default_floor_counts() -> u16 {
    300
}
fn default_mark_offset() -> f32 {
    0.05
}
fn default_mark_on_counts() -> u16 {
    600
}
fn default_mark_off_counts() -> u16 {
    3200
}

impl Default for SensorModelConfig {
    fn default() -> Self {
        Self {
            side_angle: default_side_angle(),
            range_gain: default_range_gain(),
            max_range: default_max_range(),
            floor_counts: default_floor_counts(),
            mark_offset: default_mark_offset(),
            mark_on_counts: default_mark_on_counts(),
            mark_off_counts: default_mark_off_counts(),
        }
    }
}

/// Reading noise
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NoiseConfig {
    /// Range reading noise standard deviation (counts)
    #[serde(default = "default_range_stddev")]
    pub range_stddev: f32,

    /// Mark reading noise standard deviation (counts)
    #[serde(default = "default_mark_stddev")]
    pub mark_stddev: f32,

    /// Probability that a channel read fails (0.0-1.0)
    #[serde(default)]
    pub read_failure_rate: f32,
}

fn default_range_stddev() -> f32 {
    15.0
}
fn default_mark_stddev() -> f32 {
    20.0
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            range_stddev: default_range_stddev(),
            mark_stddev: default_mark_stddev(),
            read_failure_rate: 0.0,
        }
    }
}

/// Root simulation configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimulationConfig {
    /// Arena width along X (meters)
    #[serde(default = "default_arena_width")]
    pub arena_width: f32,

    /// Arena height along Y (meters)
    #[serde(default = "default_arena_height")]
    pub arena_height: f32,

    /// Initial robot X position (meters)
    #[serde(default = "default_start_x")]
    pub start_x: f32,

    /// Initial robot Y position (meters)
    #[serde(default = "default_start_y")]
    pub start_y: f32,

    /// Initial robot orientation (radians, CCW from +X)
    #[serde(default)]
    pub start_theta: f32,

    /// Simulation speed multiplier (1.0 = real-time)
    #[serde(default = "default_speed_factor")]
    pub speed_factor: f32,

    /// Random seed for reproducible noise (0 = random each run)
    #[serde(default)]
    pub random_seed: u64,

    /// Device clock value at start-up (ms)
    #[serde(default)]
    pub clock_offset_ms: u32,

    /// Physics update rate (Hz, simulated time)
    #[serde(default = "default_physics_rate_hz")]
    pub physics_rate_hz: f32,

    /// Robot physical parameters
    #[serde(default)]
    pub robot: RobotConfig,

    /// Sensor response models
    #[serde(default)]
    pub sensors: SensorModelConfig,

    /// Reading noise
    #[serde(default)]
    pub noise: NoiseConfig,

    /// Solid boxes inside the arena
    #[serde(default = "default_obstacles")]
    pub obstacles: Vec<RectConfig>,

    /// Floor marks counted by the car
    #[serde(default = "default_marks")]
    pub marks: Vec<RectConfig>,
}

fn default_arena_width() -> f32 {
    3.0
}
fn default_arena_height() -> f32 {
    2.0
}
fn default_start_x() -> f32 {
    0.3
}
fn default_start_y() -> f32 {
    1.0
}
fn default_speed_factor() -> f32 {
    1.0
}
fn default_physics_rate_hz() -> f32 {
    200.0
}
fn default_obstacles() -> Vec<RectConfig> {
    vec![
        RectConfig::new(1.9, 0.7, 0.2, 0.6),
        RectConfig::new(0.9, 0.0, 0.3, 0.35),
    ]
}
fn default_marks() -> Vec<RectConfig> {
    vec![
        RectConfig::new(0.8, 0.4, 0.04, 1.2),
        RectConfig::new(1.3, 0.4, 0.04, 1.2),
        RectConfig::new(2.5, 0.2, 0.04, 1.6),
    ]
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            arena_width: default_arena_width(),
            arena_height: default_arena_height(),
            start_x: default_start_x(),
            start_y: default_start_y(),
            start_theta: 0.0,
            speed_factor: default_speed_factor(),
            random_seed: 0,
            clock_offset_ms: 0,
            physics_rate_hz: default_physics_rate_hz(),
            robot: RobotConfig::default(),
            sensors: SensorModelConfig::default(),
            noise: NoiseConfig::default(),
            obstacles: default_obstacles(),
            marks: default_marks(),
        }
    }
}

impl SimulationConfig {
    /// Reject geometry and rates the simulation cannot run with
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("arena_width", self.arena_width),
            ("arena_height", self.arena_height),
            ("speed_factor", self.speed_factor),
            ("physics_rate_hz", self.physics_rate_hz),
            ("robot.wheel_base", self.robot.wheel_base),
            ("robot.max_wheel_speed", self.robot.max_wheel_speed),
            ("robot.robot_radius", self.robot.robot_radius),
            ("sensors.range_gain", self.sensors.range_gain),
            ("sensors.max_range", self.sensors.max_range),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(Error::Config(format!(
                    "device.simulation.{} must be positive (got {})",
                    name, value
                )));
            }
        }

        if !(0.0..=self.arena_width).contains(&self.start_x)
            || !(0.0..=self.arena_height).contains(&self.start_y)
        {
            return Err(Error::Config(format!(
                "start pose ({}, {}) outside {}x{} arena",
                self.start_x, self.start_y, self.arena_width, self.arena_height
            )));
        }

        for rect in self.obstacles.iter().chain(&self.marks) {
            if rect.width <= 0.0 || rect.height <= 0.0 {
                return Err(Error::Config(format!(
                    "rectangle at ({}, {}) has non-positive size",
                    rect.x, rect.y
                )));
            }
        }

        if !(0.0..=1.0).contains(&self.noise.read_failure_rate) {
            return Err(Error::Config(format!(
                "noise.read_failure_rate = {} outside 0..1",
                self.noise.read_failure_rate
            )));
        }

        Ok(())
    }
}
