//! Debounced edge detection for the mark sensor

/// Debounce state machine with a read-once rising-edge latch
///
/// - A change in the raw decision restarts the candidate timer.
/// - The candidate becomes the stable value once it has held for the
///   debounce window.
/// - A 0→1 commit latches an edge unless the previous latched edge is
///   younger than the rearm window.
///
/// All time arithmetic uses wrapping subtraction on the millisecond clock.
#[derive(Debug, Clone)]
pub struct MarkEdgeDetector {
    debounce_ms: u32,
    rearm_ms: u32,
    candidate: bool,
    candidate_since_ms: u32,
    stable: bool,
    last_edge_ms: Option<u32>,
    edge_latched: bool,
}

impl MarkEdgeDetector {
    /// Create a detector whose candidate timer starts at `now_ms`
    pub fn new(debounce_ms: u32, rearm_ms: u32, now_ms: u32) -> Self {
        Self {
            debounce_ms,
            rearm_ms,
            candidate: false,
            candidate_since_ms: now_ms,
            stable: false,
            last_edge_ms: None,
            edge_latched: false,
        }
    }

    /// Return to the power-on state
    pub fn reset(&mut self, now_ms: u32) {
        *self = Self::new(self.debounce_ms, self.rearm_ms, now_ms);
    }

    /// Feed the raw decision for this tick and return the stable value
    pub fn update(&mut self, raw: bool, now_ms: u32) -> bool {
        if raw != self.candidate {
            self.candidate = raw;
            self.candidate_since_ms = now_ms;
        }

        let held_ms = now_ms.wrapping_sub(self.candidate_since_ms);
        if held_ms >= self.debounce_ms && self.stable != self.candidate {
            self.stable = self.candidate;
            if self.stable {
                let rearmed = self
                    .last_edge_ms
                    .is_none_or(|last| now_ms.wrapping_sub(last) >= self.rearm_ms);
                if rearmed {
                    self.edge_latched = true;
                    self.last_edge_ms = Some(now_ms);
                } else {
                    log::trace!(
                        "Mark edge suppressed: within {}ms rearm window",
                        self.rearm_ms
                    );
                }
            }
        }

        self.stable
    }

    /// Take the latched edge, clearing it
    pub fn consume_edge(&mut self) -> bool {
        std::mem::take(&mut self.edge_latched)
    }

    #[inline]
    pub fn stable(&self) -> bool {
        self.stable
    }

    /// Time of the last latched edge
    #[inline]
    pub fn last_edge_ms(&self) -> Option<u32> {
        self.last_edge_ms
    }

    /// Whether an edge is waiting to be consumed
    #[inline]
    pub fn is_latched(&self) -> bool {
        self.edge_latched
    }
}
