//! Wrap-safe periodic gate for status and panel refresh

/// Fires at most once per period on a wrapping millisecond clock
#[derive(Debug, Clone)]
pub struct PeriodicSchedule {
    period_ms: u32,
    last_ms: Option<u32>,
}

impl PeriodicSchedule {
    pub fn new(period_ms: u32) -> Self {
        Self {
            period_ms,
            last_ms: None,
        }
    }

    /// True when a period has elapsed since the last firing (or on first call)
    pub fn due(&mut self, now_ms: u32) -> bool {
        let fire = self
            .last_ms
            .is_none_or(|last| now_ms.wrapping_sub(last) >= self.period_ms);
        if fire {
            self.last_ms = Some(now_ms);
        }
        fire
    }
}
