//! End-to-end navigation scenarios against a scripted device.

mod common;

use common::{Output, ScriptedDevice, controller, mark_pulse, run_for, run_ticks};
use navcar::core::types::{Channel, CountMode, DisplayDigit, Motion, SceneId};
use navcar::navigation::{ActionKind, ActiveAction, classify};

/// Motion kinds with consecutive repeats collapsed
fn motion_trace(outputs: &[Output]) -> Vec<Motion> {
    let mut trace: Vec<Motion> = Vec::new();
    for output in outputs {
        if let Output::Motion(cmd) = output
            && trace.last() != Some(&cmd.motion)
        {
            trace.push(cmd.motion);
        }
    }
    trace
}

// ============================================================================
// Obstacle avoidance
// ============================================================================

#[test]
fn test_front_obstacle_runs_scene2_then_replans() {
    let mut dev = ScriptedDevice::new();
    let mut ctrl = controller(&mut dev);
    run_ticks(&mut ctrl, &mut dev, 3);
    assert_eq!(ctrl.motion(), Motion::Forward);

    let start = dev.outputs.len();
    dev.set_obstacles(true, false, false);
    run_ticks(&mut ctrl, &mut dev, 5);

    // Filtered front crosses the threshold on the third blocked tick (t=100)
    assert_eq!(ctrl.scene(), SceneId::FrontOnly);
    let active = ctrl.active_action().copied().unwrap();
    assert_eq!(active.start_ms, 100);
    let mut plan = vec![(active.action.kind, active.action.duration_ms)];
    plan.extend(ctrl.queued_actions().map(|a| (a.kind, a.duration_ms)));
    assert_eq!(
        plan,
        vec![
            (ActionKind::Pause, 250),
            (ActionKind::Reverse, 1200),
            (ActionKind::TurnLeft90, 560)
        ]
    );

    // Obstacle gone: the maneuver still runs to completion
    dev.set_obstacles(false, false, false);
    while dev.now <= 2100 {
        run_ticks(&mut ctrl, &mut dev, 1);
    }
    assert_eq!(
        ctrl.active_action().map(|a| a.action.kind),
        Some(ActionKind::TurnLeft90)
    );

    // 250 + 1200 + 560 rounded up to whole ticks: idle again at t0 + 2020
    run_ticks(&mut ctrl, &mut dev, 1);
    assert!(ctrl.is_idle());
    assert_eq!(ctrl.scene(), SceneId::ClearForward);
    assert_eq!(ctrl.motion(), Motion::Forward);

    assert_eq!(
        motion_trace(&dev.outputs[start..]),
        vec![
            Motion::Forward,
            Motion::Stop,
            Motion::Backward,
            Motion::Stop,
            Motion::TurnLeft,
            Motion::Stop,
            Motion::Forward
        ]
    );
}

#[test]
fn test_scene2_turns_alternate() {
    let mut dev = ScriptedDevice::new();
    let mut ctrl = controller(&mut dev);
    dev.set_obstacles(true, false, false);
    run_for(&mut ctrl, &mut dev, 6300);

    let turns: Vec<Motion> = dev
        .motions()
        .into_iter()
        .map(|c| c.motion)
        .filter(|m| matches!(m, Motion::TurnLeft | Motion::TurnRight))
        .collect();
    assert_eq!(
        turns,
        vec![Motion::TurnLeft, Motion::TurnRight, Motion::TurnLeft]
    );
}

#[test]
fn test_side_obstacles_with_front_clear_keep_driving() {
    let mut dev = ScriptedDevice::new();
    let mut ctrl = controller(&mut dev);
    dev.set_obstacles(false, true, true);
    run_for(&mut ctrl, &mut dev, 1000);

    assert_eq!(ctrl.scene(), SceneId::ClearForward);
    assert_eq!(ctrl.motion(), Motion::Forward);
    assert!(!ctrl.is_countdown());
    assert!(dev.obstacle_indicator);
}

#[test]
fn test_boxed_in_switches_to_countdown() {
    let mut dev = ScriptedDevice::new();
    let mut ctrl = controller(&mut dev);
    run_for(&mut ctrl, &mut dev, 200);
    mark_pulse(&mut ctrl, &mut dev, 200, 200);
    mark_pulse(&mut ctrl, &mut dev, 200, 200);
    assert_eq!(ctrl.counter(), 2);

    dev.set_obstacles(true, true, true);
    run_for(&mut ctrl, &mut dev, 200);
    assert_eq!(ctrl.scene(), SceneId::FrontLeftRight);
    assert!(ctrl.is_countdown());
    assert_eq!(ctrl.count_mode(), CountMode::Down);

    // Finish Backoff + UTurn180, then drive on and count down
    dev.set_obstacles(false, false, false);
    run_for(&mut ctrl, &mut dev, 1600);
    assert_eq!(ctrl.motion(), Motion::Forward);
    assert!(ctrl.is_countdown());

    mark_pulse(&mut ctrl, &mut dev, 200, 200);
    assert_eq!(ctrl.counter(), 1);
    assert!(!ctrl.is_halted());
}

// ============================================================================
// Mark counting
// ============================================================================

#[test]
fn test_six_marks_count_up() {
    let mut dev = ScriptedDevice::new();
    let mut ctrl = controller(&mut dev);
    run_for(&mut ctrl, &mut dev, 200);

    for _ in 0..6 {
        mark_pulse(&mut ctrl, &mut dev, 200, 200);
    }

    assert_eq!(ctrl.counter(), 6);
    assert_eq!(ctrl.marks_seen(), 6);
    assert_eq!(dev.beeps(), vec![50; 6]);
    assert_eq!(dev.last_digit(), Some(DisplayDigit::Digit(6)));
}

#[test]
fn test_counter_saturates_at_nine() {
    let mut dev = ScriptedDevice::new();
    let mut ctrl = controller(&mut dev);
    run_for(&mut ctrl, &mut dev, 200);

    for _ in 0..12 {
        mark_pulse(&mut ctrl, &mut dev, 200, 200);
    }

    assert_eq!(ctrl.counter(), 9);
    assert_eq!(ctrl.marks_seen(), 12);
    assert_eq!(dev.last_digit(), Some(DisplayDigit::Digit(9)));
}

#[test]
fn test_short_flicker_is_ignored() {
    let mut dev = ScriptedDevice::new();
    let mut ctrl = controller(&mut dev);
    run_for(&mut ctrl, &mut dev, 200);

    // Two ticks on a mark never get past the filter and debounce
    mark_pulse(&mut ctrl, &mut dev, 40, 400);
    assert_eq!(ctrl.counter(), 0);
    assert!(dev.beeps().is_empty());
}

// ============================================================================
// Countdown and halt
// ============================================================================

#[test]
fn test_countdown_to_zero_halts_once() {
    let mut dev = ScriptedDevice::new();
    let mut ctrl = controller(&mut dev);
    {
        let state = ctrl.state_mut();
        state.countdown_mode = true;
        state.count_mode = CountMode::Down;
        state.counter = 1;
    }

    // Blocked first, then the front clears and the car drives on
    dev.set_obstacles(true, false, false);
    run_for(&mut ctrl, &mut dev, 100);
    dev.set_obstacles(false, false, false);
    run_for(&mut ctrl, &mut dev, 2400);
    assert_eq!(ctrl.motion(), Motion::Forward);
    assert_eq!(ctrl.count_mode(), CountMode::Down);
    assert_eq!(ctrl.counter(), 1);

    mark_pulse(&mut ctrl, &mut dev, 200, 200);
    assert!(ctrl.is_halted());
    assert_eq!(ctrl.counter(), 0);
    assert_eq!(ctrl.motion(), Motion::Stop);
    assert_eq!(dev.count(|o| *o == Output::BeepPattern(2, 180, 80)), 1);
    assert_eq!(dev.count(|o| *o == Output::Blink(2, 80, 80)), 1);

    // Nothing brings it back to life
    let moves = dev.moving_commands();
    dev.set_obstacles(true, true, false);
    run_for(&mut ctrl, &mut dev, 1000);
    mark_pulse(&mut ctrl, &mut dev, 200, 200);
    dev.set_obstacles(false, false, false);
    run_for(&mut ctrl, &mut dev, 1000);

    assert_eq!(dev.moving_commands(), moves);
    assert_eq!(ctrl.motion(), Motion::Stop);
    assert_eq!(ctrl.counter(), 0);
    assert_eq!(dev.last_digit(), Some(DisplayDigit::Digit(0)));
    assert_eq!(dev.count(|o| matches!(o, Output::BeepPattern(..))), 1);
    assert!(ctrl.queued_actions().next().is_none());
    assert!(ctrl.active_action().is_none());
}

// ============================================================================
// Clock wraparound and faults
// ============================================================================

#[test]
fn test_maneuver_and_marks_across_clock_wrap() {
    let mut dev = ScriptedDevice::starting_at(u32::MAX - 999);
    let mut ctrl = controller(&mut dev);
    run_for(&mut ctrl, &mut dev, 200);

    dev.set_obstacles(true, false, false);
    run_for(&mut ctrl, &mut dev, 100);
    dev.set_obstacles(false, false, false);
    assert_eq!(ctrl.scene(), SceneId::FrontOnly);

    // The maneuver straddles the wrap and still ends on time
    run_for(&mut ctrl, &mut dev, 1900);
    assert!(!ctrl.is_idle());
    run_for(&mut ctrl, &mut dev, 200);
    assert!(ctrl.is_idle());
    assert_eq!(ctrl.motion(), Motion::Forward);

    mark_pulse(&mut ctrl, &mut dev, 200, 200);
    mark_pulse(&mut ctrl, &mut dev, 200, 200);
    assert_eq!(ctrl.counter(), 2);
}

#[test]
fn test_failed_front_read_counts_as_clear() {
    let mut dev = ScriptedDevice::new();
    let mut ctrl = controller(&mut dev);
    dev.set_obstacles(true, false, false);
    dev.failing.push(Channel::Front);

    run_for(&mut ctrl, &mut dev, 200);
    assert_eq!(ctrl.snapshot().raw.front, 0);
    assert!(!ctrl.snapshot().front_blocked);
    assert_eq!(ctrl.motion(), Motion::Forward);

    // The filter restarts from the first good reading
    dev.failing.clear();
    run_ticks(&mut ctrl, &mut dev, 1);
    assert!(ctrl.snapshot().front_blocked);
    assert_eq!(ctrl.scene(), SceneId::FrontOnly);
}

// ============================================================================
// Properties
// ============================================================================

/// Minimal deterministic generator for scripted sensor sequences
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0 >> 33
    }
}

#[test]
fn test_actions_never_preempted() {
    let mut rng = Lcg(12345);
    let mut dev = ScriptedDevice::new();
    let mut ctrl = controller(&mut dev);
    let mut previous: Option<ActiveAction> = None;

    for step in 0..3000u32 {
        if step % 7 == 0 {
            let bits = rng.next();
            dev.set_obstacles(bits & 1 != 0, bits & 2 != 0, bits & 4 != 0);
            dev.mark = if bits & 8 != 0 {
                common::MARK_ON
            } else {
                common::MARK_OFF
            };
        }

        ctrl.tick(&mut dev);
        let now = dev.now;
        let current = ctrl.active_action().copied();

        // Halt is the only thing allowed to cut an action short
        if let Some(prev) = previous
            && current != Some(prev)
            && !ctrl.is_halted()
        {
            assert!(
                now.wrapping_sub(prev.start_ms) >= prev.action.duration_ms,
                "{:?} replaced after {}ms",
                prev.action.kind,
                now.wrapping_sub(prev.start_ms)
            );
        }
        previous = current;
        dev.now = dev.now.wrapping_add(common::TICK_MS);
    }

    assert_eq!(ctrl.queue_overflows(), 0);
    assert!(ctrl.counter() <= 9);
}

#[test]
fn test_front_clear_is_always_scene1() {
    for left in [false, true] {
        for right in [false, true] {
            assert_eq!(classify(false, left, right), SceneId::ClearForward);
        }
    }
    assert_eq!(classify(true, true, true), SceneId::FrontLeftRight);
}
