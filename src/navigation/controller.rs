//! Per-tick navigation orchestration
//!
//! [`NavigationController`] owns every piece of navigation state and is
//! driven exclusively through `&mut self`. It never blocks: maneuver timing
//! is polled against the device clock, and feedback is only requested.

use super::action::{ActionTiming, SpeedProfile, TimedAction};
use super::executor::{ActiveAction, Executor};
use super::planner::{ActionPlanner, classify};
use super::queue::ActionQueue;
use super::state::NavigationState;
use crate::config::{FeedbackConfig, NavConfig};
use crate::core::hal::{ActuatorPort, Clock, FeedbackPort, SensorPort};
use crate::core::types::{CountMode, DisplayDigit, Motion, MotionCommand, SceneId, SensorSnapshot};
use crate::sensors::{ConditionerConfig, SensorConditioner};
use crate::telemetry::StatusReport;

/// Everything the controller needs from the configuration
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    pub conditioner: ConditionerConfig,
    pub timing: ActionTiming,
    pub speeds: SpeedProfile,
    pub counter_max: u8,
    pub feedback: FeedbackConfig,
}

impl From<&NavConfig> for ControllerConfig {
    fn from(config: &NavConfig) -> Self {
        Self {
            conditioner: ConditionerConfig::from(&config.sensors),
            timing: ActionTiming::from(&config.actions),
            speeds: SpeedProfile::from(&config.speeds),
            counter_max: config.counter.max_value,
            feedback: config.feedback.clone(),
        }
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self::from(&NavConfig::default())
    }
}

/// Navigation decision core
pub struct NavigationController {
    config: ControllerConfig,
    conditioner: SensorConditioner,
    state: NavigationState,
    queue: ActionQueue,
    executor: Executor,
    planner: ActionPlanner,
    /// Latched mark edges since the last initialize
    marks_seen: u32,
}

impl NavigationController {
    pub fn new(config: &NavConfig, now_ms: u32) -> Self {
        Self::with_config(ControllerConfig::from(config), now_ms)
    }

    pub fn with_config(config: ControllerConfig, now_ms: u32) -> Self {
        Self {
            conditioner: SensorConditioner::new(config.conditioner, now_ms),
            state: NavigationState::new(config.counter_max),
            queue: ActionQueue::new(),
            executor: Executor::new(),
            planner: ActionPlanner::new(config.timing),
            marks_seen: 0,
            config,
        }
    }

    /// Reset to power-on state: counter 0, Scene1, Up, stopped
    ///
    /// Also clears a previous halt.
    pub fn initialize<D>(&mut self, device: &mut D)
    where
        D: Clock + ActuatorPort + ?Sized,
    {
        let now = device.now_ms();
        self.state.reset();
        self.conditioner.reset(now);
        self.queue.clear();
        self.executor.abort();
        self.marks_seen = 0;

        device.stop_motors();
        device.set_digit(DisplayDigit::from_value(0));
        device.set_obstacle_indicator(false);
        device.set_mark_indicator(false);
        log::info!("Navigation initialized at t={}ms", now);
    }

    /// Run one control period
    pub fn tick<D>(&mut self, device: &mut D)
    where
        D: SensorPort + Clock + ActuatorPort + FeedbackPort + ?Sized,
    {
        let now = device.now_ms();
        let snapshot = self.conditioner.sample(device, now);
        log::trace!(
            "t={} raw={:?} filtered={:?}",
            now,
            snapshot.raw,
            snapshot.filtered
        );

        device.set_obstacle_indicator(snapshot.any_obstacle());
        device.set_mark_indicator(snapshot.mark_detected);

        if self.conditioner.consume_edge() {
            self.on_mark(device);
        }

        if snapshot.front_blocked && !self.state.last_front_blocked {
            device.request_beep(self.config.feedback.obstacle_beep_ms);
        }
        self.state.last_front_blocked = snapshot.front_blocked;

        if self.state.halted {
            self.state.motion = Motion::Stop;
            device.stop_motors();
            return;
        }

        if let Some(cmd) = self.executor.process_active(&mut self.state, now) {
            device.apply(cmd);
        }
        self.start_next(device, now);

        if self.executor.is_idle() && self.queue.is_empty() {
            self.replan(device, &snapshot, now);
        }
    }

    fn on_mark<D>(&mut self, device: &mut D)
    where
        D: ActuatorPort + FeedbackPort + ?Sized,
    {
        device.request_beep(self.config.feedback.mark_beep_ms);
        if self.state.halted {
            log::debug!("Mark after halt ignored");
            return;
        }

        self.marks_seen = self.marks_seen.wrapping_add(1);
        let changed = self.state.apply_mark();
        device.set_digit(DisplayDigit::from_value(i32::from(self.state.counter)));
        log::info!(
            "Mark {:?}: counter={}{}",
            self.state.count_mode,
            self.state.counter,
            if changed { "" } else { " (saturated)" }
        );

        if self.state.countdown_expired() {
            self.halt(device);
        }
    }

    fn start_next<D>(&mut self, device: &mut D, now: u32)
    where
        D: ActuatorPort + ?Sized,
    {
        if let Some(cmd) = self.executor.start_next_if_idle(
            &mut self.queue,
            &mut self.state,
            &self.config.speeds,
            now,
        ) {
            device.apply(cmd);
        }
    }

    fn replan<D>(&mut self, device: &mut D, snapshot: &SensorSnapshot, now: u32)
    where
        D: ActuatorPort + FeedbackPort + ?Sized,
    {
        let scene = classify(
            snapshot.front_blocked,
            snapshot.left_blocked,
            snapshot.right_blocked,
        );
        if scene != self.state.scene {
            log::info!("{} -> {}", self.state.scene, scene);
        }
        self.state.scene = scene;

        if scene == SceneId::ClearForward {
            self.state.count_mode = self.state.restored_count_mode();
            if self.state.countdown_expired() {
                self.halt(device);
                return;
            }
            self.state.motion = Motion::Forward;
            device.apply(MotionCommand::symmetric(
                Motion::Forward,
                self.config.speeds.forward_pct,
            ));
            return;
        }

        self.planner.plan(scene, &mut self.state, &mut self.queue);
        self.start_next(device, now);
    }

    /// Terminal stop: clears every plan and signals completion
    ///
    /// A second call is a no-op.
    pub fn halt<D>(&mut self, device: &mut D)
    where
        D: ActuatorPort + FeedbackPort + ?Sized,
    {
        if self.state.halted {
            return;
        }
        self.state.halted = true;
        self.queue.clear();
        self.executor.abort();
        self.state.motion = Motion::Stop;

        device.stop_motors();
        device.set_digit(DisplayDigit::from_value(i32::from(self.state.counter)));

        let fb = &self.config.feedback;
        device.request_beep_pattern(fb.done_beep_count, fb.done_beep_on_ms, fb.done_beep_off_ms);
        device.request_blink(
            fb.done_blink_count,
            fb.done_blink_on_ms,
            fb.done_blink_off_ms,
        );
        log::info!(
            "Halted: counter={} after {} marks",
            self.state.counter,
            self.marks_seen
        );
    }

    pub fn counter(&self) -> u8 {
        self.state.counter
    }

    pub fn scene(&self) -> SceneId {
        self.state.scene
    }

    pub fn motion(&self) -> Motion {
        self.state.motion
    }

    pub fn count_mode(&self) -> CountMode {
        self.state.count_mode
    }

    pub fn is_countdown(&self) -> bool {
        self.state.countdown_mode
    }

    pub fn is_halted(&self) -> bool {
        self.state.halted
    }

    /// No maneuver running
    pub fn is_idle(&self) -> bool {
        self.executor.is_idle()
    }

    pub fn snapshot(&self) -> &SensorSnapshot {
        self.conditioner.snapshot()
    }

    /// Pending maneuvers, next first
    pub fn queued_actions(&self) -> impl Iterator<Item = &TimedAction> + '_ {
        self.queue.iter()
    }

    pub fn active_action(&self) -> Option<&ActiveAction> {
        self.executor.active()
    }

    pub fn marks_seen(&self) -> u32 {
        self.marks_seen
    }

    /// Rejected queue pushes (always 0 unless a plan outgrows the queue)
    pub fn queue_overflows(&self) -> u32 {
        self.queue.overflow_count()
    }

    pub fn state(&self) -> &NavigationState {
        &self.state
    }

    /// Mutable state access for presetting scenarios
    pub fn state_mut(&mut self) -> &mut NavigationState {
        &mut self.state
    }

    pub fn status_report(&self) -> StatusReport {
        StatusReport {
            counter: self.state.counter,
            scene: self.state.scene,
            motion: self.state.motion,
            count_mode: self.state.count_mode,
            halted: self.state.halted,
            snapshot: *self.conditioner.snapshot(),
        }
    }
}
