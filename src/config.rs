//! Configuration for navcar
//!
//! Loads a TOML file in which every field is optional; missing values fall
//! back to the calibration defaults of the reference car (12-bit ADC at 3.3V,
//! 2Y0A21 range sensors, OPB704 mark sensor).
//!
//! # Configuration Hierarchy
//!
//! ```text
//! NavConfig
//! ├── SensorConfig      # thresholds, mark polarity, debounce/rearm windows
//! ├── ActionConfig      # maneuver durations
//! ├── SpeedConfig       # duty per motion profile
//! ├── CounterConfig     # counter bound
//! ├── FeedbackConfig    # beep/blink timings
//! ├── RuntimeConfig     # tick, status and panel cadence
//! └── DeviceConfig      # device type (+ simulation for the mock device)
//! ```

use crate::core::types::ADC_MAX;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[cfg(feature = "mock")]
use crate::devices::mock::config::SimulationConfig;

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct NavConfig {
    #[serde(default)]
    pub sensors: SensorConfig,
    #[serde(default)]
    pub actions: ActionConfig,
    #[serde(default)]
    pub speeds: SpeedConfig,
    #[serde(default)]
    pub counter: CounterConfig,
    #[serde(default)]
    pub feedback: FeedbackConfig,
    #[serde(default)]
    pub runtime: RuntimeConfig,
    #[serde(default)]
    pub device: DeviceConfig,
}

/// Mark sensor output polarity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkPolarity {
    /// Mark pulls the reading below the threshold (pulled-up collector)
    #[default]
    ActiveLow,
    /// Mark pushes the reading above the threshold
    ActiveHigh,
}

/// Sensor conditioning parameters
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SensorConfig {
    /// Filtered range reading at or above which a side counts as blocked
    /// (~25 cm on a 2Y0A21)
    #[serde(default = "default_obstacle_threshold")]
    pub obstacle_threshold: u16,

    /// Mark sensor decision threshold (ADC counts)
    #[serde(default = "default_mark_threshold")]
    pub mark_threshold: u16,

    #[serde(default)]
    pub mark_polarity: MarkPolarity,

    /// Time the raw mark decision must hold before it is accepted
    #[serde(default = "default_mark_debounce_ms")]
    pub mark_debounce_ms: u32,

    /// Minimum time between two counted marks
    #[serde(default = "default_mark_rearm_ms")]
    pub mark_rearm_ms: u32,
}

/// Maneuver durations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ActionConfig {
    #[serde(default = "default_pause_before_reverse_ms")]
    pub pause_before_reverse_ms: u32,
    #[serde(default = "default_reverse_long_ms")]
    pub reverse_long_ms: u32,
    #[serde(default = "default_backoff_short_ms")]
    pub backoff_short_ms: u32,
    #[serde(default = "default_turn_90_ms")]
    pub turn_90_ms: u32,
    #[serde(default = "default_turn_180_ms")]
    pub turn_180_ms: u32,
}

/// Wheel duty per motion profile (0-100)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SpeedConfig {
    #[serde(default = "default_forward_pct")]
    pub forward_pct: u8,
    #[serde(default = "default_reverse_pct")]
    pub reverse_pct: u8,
    #[serde(default = "default_turn_pct")]
    pub turn_pct: u8,
}

/// Mark counter
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CounterConfig {
    /// Upper bound of the counter (single display digit, so at most 9)
    #[serde(default = "default_counter_max")]
    pub max_value: u8,
}

/// Buzzer and indicator timings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FeedbackConfig {
    #[serde(default = "default_mark_beep_ms")]
    pub mark_beep_ms: u32,
    #[serde(default = "default_obstacle_beep_ms")]
    pub obstacle_beep_ms: u32,
    #[serde(default = "default_done_count")]
    pub done_beep_count: u8,
    #[serde(default = "default_done_beep_on_ms")]
    pub done_beep_on_ms: u32,
    #[serde(default = "default_done_beep_off_ms")]
    pub done_beep_off_ms: u32,
    #[serde(default = "default_done_count")]
    pub done_blink_count: u8,
    #[serde(default = "default_done_blink_ms")]
    pub done_blink_on_ms: u32,
    #[serde(default = "default_done_blink_ms")]
    pub done_blink_off_ms: u32,
}

/// Control loop cadence
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RuntimeConfig {
    /// Period between navigation ticks (device clock)
    #[serde(default = "default_tick_period_ms")]
    pub tick_period_ms: u32,

    /// Period between status reports
    #[serde(default = "default_status_period_ms")]
    pub status_period_ms: u32,

    /// Period between status panel refreshes
    #[serde(default = "default_panel_refresh_ms")]
    pub panel_refresh_ms: u32,

    /// Leave the run loop once the car has halted
    #[serde(default = "default_true")]
    pub exit_on_halt: bool,

    /// Time to keep ticking after a halt so completion feedback can finish
    #[serde(default = "default_halt_linger_ms")]
    pub halt_linger_ms: u32,
}

/// Device selection
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeviceConfig {
    /// Device type ("mock")
    #[serde(rename = "type", default = "default_device_type")]
    pub device_type: String,

    /// Human-readable device name
    #[serde(default = "default_device_name")]
    pub name: String,

    /// Simulation parameters for the mock device
    #[cfg(feature = "mock")]
    #[serde(default)]
    pub simulation: SimulationConfig,
}

// Default value functions
fn default_obstacle_threshold() -> u16 {
    1750
}
fn default_mark_threshold() -> u16 {
    1800
}
fn default_mark_debounce_ms() -> u32 {
    80
}
fn default_mark_rearm_ms() -> u32 {
    120
}
fn default_pause_before_reverse_ms() -> u32 {
    250
}
fn default_reverse_long_ms() -> u32 {
    1200
}
fn default_backoff_short_ms() -> u32 {
    350
}
fn default_turn_90_ms() -> u32 {
    560
}
fn default_turn_180_ms() -> u32 {
    1080
}
fn default_forward_pct() -> u8 {
    72
}
fn default_reverse_pct() -> u8 {
    62
}
fn default_turn_pct() -> u8 {
    60
}
fn default_counter_max() -> u8 {
    9
}
fn default_mark_beep_ms() -> u32 {
    50
}
fn default_obstacle_beep_ms() -> u32 {
    120
}
fn default_done_count() -> u8 {
    2
}
fn default_done_beep_on_ms() -> u32 {
    180
}
fn default_done_beep_off_ms() -> u32 {
    80
}
fn default_done_blink_ms() -> u32 {
    80
}
fn default_tick_period_ms() -> u32 {
    20
}
fn default_status_period_ms() -> u32 {
    500
}
fn default_panel_refresh_ms() -> u32 {
    200
}
fn default_true() -> bool {
    true
}
fn default_halt_linger_ms() -> u32 {
    1000
}
fn default_device_type() -> String {
    "mock".to_string()
}
fn default_device_name() -> String {
    "Mock navcar".to_string()
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            obstacle_threshold: default_obstacle_threshold(),
            mark_threshold: default_mark_threshold(),
            mark_polarity: MarkPolarity::default(),
            mark_debounce_ms: default_mark_debounce_ms(),
            mark_rearm_ms: default_mark_rearm_ms(),
        }
    }
}

impl Default for ActionConfig {
    fn default() -> Self {
        Self {
            pause_before_reverse_ms: default_pause_before_reverse_ms(),
            reverse_long_ms: default_reverse_long_ms(),
            backoff_short_ms: default_backoff_short_ms(),
            turn_90_ms: default_turn_90_ms(),
            turn_180_ms: default_turn_180_ms(),
        }
    }
}

impl Default for SpeedConfig {
    fn default() -> Self {
        Self {
            forward_pct: default_forward_pct(),
            reverse_pct: default_reverse_pct(),
            turn_pct: default_turn_pct(),
        }
    }
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            max_value: default_counter_max(),
        }
    }
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            mark_beep_ms: default_mark_beep_ms(),
            obstacle_beep_ms: default_obstacle_beep_ms(),
            done_beep_count: default_done_count(),
            done_beep_on_ms: default_done_beep_on_ms(),
            done_beep_off_ms: default_done_beep_off_ms(),
            done_blink_count: default_done_count(),
            done_blink_on_ms: default_done_blink_ms(),
            done_blink_off_ms: default_done_blink_ms(),
        }
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            tick_period_ms: default_tick_period_ms(),
            status_period_ms: default_status_period_ms(),
            panel_refresh_ms: default_panel_refresh_ms(),
            exit_on_halt: default_true(),
            halt_linger_ms: default_halt_linger_ms(),
        }
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            device_type: default_device_type(),
            name: default_device_name(),
            #[cfg(feature = "mock")]
            simulation: SimulationConfig::default(),
        }
    }
}

impl NavConfig {
    /// Load and validate configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: NavConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Check value ranges
    ///
    /// Cadence problems that still allow operation (a tick slower than the
    /// debounce window) are only logged.
    pub fn validate(&self) -> Result<()> {
        let s = &self.sensors;
        if s.obstacle_threshold > ADC_MAX || s.mark_threshold > ADC_MAX {
            return Err(Error::Config(format!(
                "sensor thresholds must be <= {} (obstacle={}, mark={})",
                ADC_MAX, s.obstacle_threshold, s.mark_threshold
            )));
        }

        for (name, pct) in [
            ("forward_pct", self.speeds.forward_pct),
            ("reverse_pct", self.speeds.reverse_pct),
            ("turn_pct", self.speeds.turn_pct),
        ] {
            if pct > 100 {
                return Err(Error::Config(format!(
                    "speeds.{} = {} exceeds 100",
                    name, pct
                )));
            }
        }

        if self.counter.max_value > 9 {
            return Err(Error::Config(format!(
                "counter.max_value = {} does not fit a single digit",
                self.counter.max_value
            )));
        }

        if self.runtime.tick_period_ms == 0 {
            return Err(Error::Config(
                "runtime.tick_period_ms must be > 0".to_string(),
            ));
        }

        if self.runtime.tick_period_ms > s.mark_debounce_ms {
            log::warn!(
                "Tick period {}ms exceeds mark debounce window {}ms; marks may be missed",
                self.runtime.tick_period_ms,
                s.mark_debounce_ms
            );
        }

        #[cfg(feature = "mock")]
        self.device.simulation.validate()?;

        Ok(())
    }
}
