//! Sensor conditioner: filters, thresholds and the mark edge detector

use super::debounce::MarkEdgeDetector;
use super::filter::IirFilter;
use crate::config::{MarkPolarity, SensorConfig};
use crate::core::hal::SensorPort;
use crate::core::types::{Channel, RawSample, SensorSnapshot};

/// Parameters the conditioner needs from [`SensorConfig`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConditionerConfig {
    pub obstacle_threshold: u16,
    pub mark_threshold: u16,
    pub mark_polarity: MarkPolarity,
    pub mark_debounce_ms: u32,
    pub mark_rearm_ms: u32,
}

impl From<&SensorConfig> for ConditionerConfig {
    fn from(c: &SensorConfig) -> Self {
        Self {
            obstacle_threshold: c.obstacle_threshold,
            mark_threshold: c.mark_threshold,
            mark_polarity: c.mark_polarity,
            mark_debounce_ms: c.mark_debounce_ms,
            mark_rearm_ms: c.mark_rearm_ms,
        }
    }
}

impl Default for ConditionerConfig {
    fn default() -> Self {
        Self::from(&SensorConfig::default())
    }
}

/// Owns the per-channel filters, the mark detector and the current snapshot
#[derive(Debug, Clone)]
pub struct SensorConditioner {
    config: ConditionerConfig,
    mark: IirFilter,
    front: IirFilter,
    left: IirFilter,
    right: IirFilter,
    detector: MarkEdgeDetector,
    snapshot: SensorSnapshot,
}

impl SensorConditioner {
    pub fn new(config: ConditionerConfig, now_ms: u32) -> Self {
        Self {
            config,
            mark: IirFilter::new(),
            front: IirFilter::new(),
            left: IirFilter::new(),
            right: IirFilter::new(),
            detector: MarkEdgeDetector::new(config.mark_debounce_ms, config.mark_rearm_ms, now_ms),
            snapshot: SensorSnapshot::default(),
        }
    }

    /// Return to the power-on state
    pub fn reset(&mut self, now_ms: u32) {
        *self = Self::new(self.config, now_ms);
    }

    /// Read all four channels from `port` and update
    ///
    /// A failed read counts as a zero reading; the loop keeps running.
    pub fn sample<P: SensorPort + ?Sized>(&mut self, port: &mut P, now_ms: u32) -> SensorSnapshot {
        let mut read = |channel: Channel| match port.read_channel(channel) {
            Ok(value) => value,
            Err(e) => {
                log::debug!("Treating failed read as 0: {}", e);
                0
            }
        };
        let raw = RawSample {
            mark: read(Channel::Mark),
            front: read(Channel::Front),
            left: read(Channel::Left),
            right: read(Channel::Right),
        };
        self.update(raw, now_ms)
    }

    /// Condition one set of raw readings
    pub fn update(&mut self, raw: RawSample, now_ms: u32) -> SensorSnapshot {
        let filtered = RawSample {
            mark: self.mark.update(raw.mark),
            front: self.front.update(raw.front),
            left: self.left.update(raw.left),
            right: self.right.update(raw.right),
        };

        let threshold = self.config.obstacle_threshold;
        let mark_raw = self.is_mark_raw(filtered.mark);
        let mark_detected = self.detector.update(mark_raw, now_ms);

        self.snapshot = SensorSnapshot {
            raw,
            filtered,
            front_blocked: filtered.front >= threshold,
            left_blocked: filtered.left >= threshold,
            right_blocked: filtered.right >= threshold,
            mark_detected,
        };
        self.snapshot
    }

    /// Take the latched mark edge (read-once)
    #[inline]
    pub fn consume_edge(&mut self) -> bool {
        self.detector.consume_edge()
    }

    /// Snapshot from the most recent update
    #[inline]
    pub fn snapshot(&self) -> &SensorSnapshot {
        &self.snapshot
    }

    fn is_mark_raw(&self, value: u16) -> bool {
        match self.config.mark_polarity {
            MarkPolarity::ActiveLow => value < self.config.mark_threshold,
            MarkPolarity::ActiveHigh => value > self.config.mark_threshold,
        }
    }
}
