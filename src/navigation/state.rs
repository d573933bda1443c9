//! Navigation bookkeeping owned by the controller

use crate::core::types::{CountMode, Motion, SceneId};

/// Highest value the single-digit display can show
pub const COUNTER_LIMIT: u8 = 9;

/// Counter, modes and scene bookkeeping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationState {
    pub counter: u8,
    pub counter_max: u8,
    pub count_mode: CountMode,
    pub scene: SceneId,
    pub motion: Motion,
    /// Terminal until re-initialization
    pub halted: bool,
    /// Latched by Scene5
    pub countdown_mode: bool,
    /// Next Scene2 turn goes right
    pub scene2_turn_right: bool,
    pub last_front_blocked: bool,
}

impl NavigationState {
    pub fn new(counter_max: u8) -> Self {
        Self {
            counter: 0,
            counter_max: counter_max.min(COUNTER_LIMIT),
            count_mode: CountMode::Up,
            scene: SceneId::ClearForward,
            motion: Motion::Stop,
            halted: false,
            countdown_mode: false,
            scene2_turn_right: false,
            last_front_blocked: false,
        }
    }

    /// Back to power-on values
    pub fn reset(&mut self) {
        *self = Self::new(self.counter_max);
    }

    /// Count mode implied by the countdown flag
    #[inline]
    pub fn restored_count_mode(&self) -> CountMode {
        if self.countdown_mode {
            CountMode::Down
        } else {
            CountMode::Up
        }
    }

    /// Step the counter in the current mode, saturating at both ends
    ///
    /// Returns true if the value changed.
    pub fn apply_mark(&mut self) -> bool {
        match self.count_mode {
            CountMode::Up if self.counter < self.counter_max => {
                self.counter += 1;
                true
            }
            CountMode::Down if self.counter > 0 => {
                self.counter -= 1;
                true
            }
            _ => false,
        }
    }

    /// Countdown finished: the run is over
    #[inline]
    pub fn countdown_expired(&self) -> bool {
        self.countdown_mode && self.counter == 0
    }
}

impl Default for NavigationState {
    fn default() -> Self {
        Self::new(COUNTER_LIMIT)
    }
}
