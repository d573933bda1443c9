//! Scene classification and maneuver planning

use super::action::{ActionKind, ActionTiming, TimedAction};
use super::queue::ActionQueue;
use super::state::NavigationState;
use crate::core::types::{CountMode, SceneId};

/// Classify the obstacle flags into a scene
///
/// Front clear always means Scene1, whatever the side sensors say.
pub fn classify(front_blocked: bool, left_blocked: bool, right_blocked: bool) -> SceneId {
    if !front_blocked {
        return SceneId::ClearForward;
    }
    match (left_blocked, right_blocked) {
        (false, false) => SceneId::FrontOnly,
        (true, false) => SceneId::FrontLeft,
        (false, true) => SceneId::FrontRight,
        (true, true) => SceneId::FrontLeftRight,
    }
}

/// Builds the maneuver sequence for a blocked scene
#[derive(Debug, Clone)]
pub struct ActionPlanner {
    timing: ActionTiming,
}

impl ActionPlanner {
    pub fn new(timing: ActionTiming) -> Self {
        Self { timing }
    }

    /// Replace the queue with the plan for `scene`
    ///
    /// Scene1 has no plan (the controller drives forward directly) and leaves
    /// the queue empty.
    pub fn plan<const N: usize>(
        &self,
        scene: SceneId,
        state: &mut NavigationState,
        queue: &mut ActionQueue<N>,
    ) {
        let t = &self.timing;
        queue.clear();

        let mut push = |kind, duration_ms| {
            queue.push(TimedAction::new(kind, duration_ms));
        };

        match scene {
            SceneId::ClearForward => {}
            SceneId::FrontOnly => {
                let turn = if state.scene2_turn_right {
                    ActionKind::TurnRight90
                } else {
                    ActionKind::TurnLeft90
                };
                state.scene2_turn_right = !state.scene2_turn_right;
                push(ActionKind::Pause, t.pause_before_reverse_ms);
                push(ActionKind::Reverse, t.reverse_long_ms);
                push(turn, t.turn_90_ms);
            }
            SceneId::FrontLeft => {
                push(ActionKind::Backoff, t.backoff_short_ms);
                push(ActionKind::TurnRight90, t.turn_90_ms);
            }
            SceneId::FrontRight => {
                push(ActionKind::Backoff, t.backoff_short_ms);
                push(ActionKind::TurnLeft90, t.turn_90_ms);
            }
            SceneId::FrontLeftRight => {
                if !state.countdown_mode {
                    log::info!("Dead end: switching to countdown");
                }
                state.countdown_mode = true;
                state.count_mode = CountMode::Down;
                push(ActionKind::Backoff, t.backoff_short_ms);
                push(ActionKind::UTurn180, t.turn_180_ms);
            }
        }
    }
}

impl Default for ActionPlanner {
    fn default() -> Self {
        Self::new(ActionTiming::default())
    }
}
