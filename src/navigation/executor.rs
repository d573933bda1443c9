//! Single-slot maneuver executor
//!
//! Idle ⇄ Active. An action always runs for its full duration; the executor
//! only reports the motion command to emit, the controller writes it out.

use super::action::{SpeedProfile, TimedAction};
use super::queue::ActionQueue;
use super::state::NavigationState;
use crate::core::types::{Motion, MotionCommand};

/// The action currently running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveAction {
    pub action: TimedAction,
    pub start_ms: u32,
}

impl ActiveAction {
    /// Elapsed time since start (wrap-safe)
    #[inline]
    pub fn elapsed_ms(&self, now_ms: u32) -> u32 {
        now_ms.wrapping_sub(self.start_ms)
    }

    #[inline]
    pub fn is_finished(&self, now_ms: u32) -> bool {
        self.elapsed_ms(now_ms) >= self.action.duration_ms
    }
}

#[derive(Debug, Clone, Default)]
pub struct Executor {
    active: Option<ActiveAction>,
}

impl Executor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start the next queued action if nothing is running
    ///
    /// Returns the command to emit when an action was started.
    pub fn start_next_if_idle<const N: usize>(
        &mut self,
        queue: &mut ActionQueue<N>,
        state: &mut NavigationState,
        speeds: &SpeedProfile,
        now_ms: u32,
    ) -> Option<MotionCommand> {
        if state.halted || self.active.is_some() {
            return None;
        }
        let action = queue.pop()?;
        let effect = action.kind.effect(speeds, state.countdown_mode);

        self.active = Some(ActiveAction {
            action,
            start_ms: now_ms,
        });
        state.motion = effect.command.motion;
        state.count_mode = effect.count_mode;

        log::debug!(
            "Action started: {:?} for {}ms ({:?})",
            action.kind,
            action.duration_ms,
            effect.command.motion
        );
        Some(effect.command)
    }

    /// Finish the running action once its duration has elapsed
    ///
    /// Returns a stop command on completion.
    pub fn process_active(
        &mut self,
        state: &mut NavigationState,
        now_ms: u32,
    ) -> Option<MotionCommand> {
        let active = self.active?;
        if !active.is_finished(now_ms) {
            return None;
        }
        self.active = None;
        state.motion = Motion::Stop;
        log::debug!(
            "Action finished: {:?} after {}ms",
            active.action.kind,
            active.elapsed_ms(now_ms)
        );
        Some(MotionCommand::STOP)
    }

    /// Drop the running action without completing it
    pub fn abort(&mut self) {
        if let Some(active) = self.active.take() {
            log::debug!("Action aborted: {:?}", active.action.kind);
        }
    }

    #[inline]
    pub fn is_idle(&self) -> bool {
        self.active.is_none()
    }

    #[inline]
    pub fn active(&self) -> Option<&ActiveAction> {
        self.active.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::CountMode;
    use crate::navigation::action::ActionKind;

    fn setup() -> (Executor, ActionQueue, NavigationState, SpeedProfile) {
        (
            Executor::new(),
            ActionQueue::new(),
            NavigationState::default(),
            SpeedProfile::default(),
        )
    }

    #[test]
    fn test_idle_with_empty_queue() {
        let (mut exec, mut queue, mut state, speeds) = setup();
        assert!(exec.is_idle());
        assert_eq!(
            exec.start_next_if_idle(&mut queue, &mut state, &speeds, 0),
            None
        );
        assert_eq!(exec.process_active(&mut state, 100), None);
    }

    #[test]
    fn test_single_active_action() {
        let (mut exec, mut queue, mut state, speeds) = setup();
        queue.push(TimedAction::new(ActionKind::Reverse, 100));
        queue.push(TimedAction::new(ActionKind::TurnLeft90, 50));

        let cmd = exec.start_next_if_idle(&mut queue, &mut state, &speeds, 10);
        assert_eq!(cmd.map(|c| c.motion), Some(Motion::Backward));
        assert_eq!(state.count_mode, CountMode::Down);
        assert_eq!(queue.len(), 1);

        // Second start while active is refused
        assert_eq!(
            exec.start_next_if_idle(&mut queue, &mut state, &speeds, 20),
            None
        );
        assert_eq!(queue.len(), 1);
        assert_eq!(
            exec.active().map(|a| a.action.kind),
            Some(ActionKind::Reverse)
        );
    }

    #[test]
    fn test_completes_after_duration() {
        let (mut exec, mut queue, mut state, speeds) = setup();
        queue.push(TimedAction::new(ActionKind::TurnRight90, 560));
        exec.start_next_if_idle(&mut queue, &mut state, &speeds, 1000);
        assert_eq!(state.motion, Motion::TurnRight);

        assert_eq!(exec.process_active(&mut state, 1559), None);
        assert!(!exec.is_idle());

        assert_eq!(
            exec.process_active(&mut state, 1560),
            Some(MotionCommand::STOP)
        );
        assert!(exec.is_idle());
        assert_eq!(state.motion, Motion::Stop);
    }

    #[test]
    fn test_completion_across_clock_wrap() {
        let (mut exec, mut queue, mut state, speeds) = setup();
        queue.push(TimedAction::new(ActionKind::Pause, 250));
        let start = u32::MAX - 100;
        exec.start_next_if_idle(&mut queue, &mut state, &speeds, start);

        assert_eq!(exec.process_active(&mut state, 100), None);
        assert!(exec.process_active(&mut state, 149).is_some());
    }

    #[test]
    fn test_halted_never_starts() {
        let (mut exec, mut queue, mut state, speeds) = setup();
        queue.push(TimedAction::new(ActionKind::Pause, 10));
        state.halted = true;
        assert_eq!(
            exec.start_next_if_idle(&mut queue, &mut state, &speeds, 0),
            None
        );
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_abort() {
        let (mut exec, mut queue, mut state, speeds) = setup();
        queue.push(TimedAction::new(ActionKind::UTurn180, 1080));
        exec.start_next_if_idle(&mut queue, &mut state, &speeds, 0);
        exec.abort();
        assert!(exec.is_idle());
        assert_eq!(exec.process_active(&mut state, 5000), None);
    }
}
