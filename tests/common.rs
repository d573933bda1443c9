//! Test utilities for navcar integration tests.
//!
//! [`ScriptedDevice`] holds fixed channel readings that tests change between
//! ticks, runs a manual clock, and records every output request.

#![allow(dead_code)]

use navcar::core::hal::{ActuatorPort, Clock, DeviceDriver, FeedbackPort, SensorPort};
use navcar::core::types::{Channel, DisplayDigit, Motion, MotionCommand};
use navcar::{Error, NavConfig, NavigationController, Result};

/// Raw counts well above the default obstacle threshold
pub const BLOCKED: u16 = 3000;
/// Raw counts with nothing in range
pub const CLEAR: u16 = 200;
/// Mark sensor over a mark (active-low)
pub const MARK_ON: u16 = 600;
/// Mark sensor over bare floor
pub const MARK_OFF: u16 = 3200;
/// Default control period
pub const TICK_MS: u32 = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    Motion(MotionCommand),
    Digit(DisplayDigit),
    Beep(u32),
    BeepPattern(u8, u32, u32),
    Blink(u8, u32, u32),
}

#[derive(Debug, Default)]
pub struct ScriptedDevice {
    pub now: u32,
    pub mark: u16,
    pub front: u16,
    pub left: u16,
    pub right: u16,
    /// Channels whose reads fail
    pub failing: Vec<Channel>,
    pub outputs: Vec<Output>,
    pub obstacle_indicator: bool,
    pub mark_indicator: bool,
    pub initialized: bool,
}

impl ScriptedDevice {
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    pub fn starting_at(now: u32) -> Self {
        Self {
            now,
            mark: MARK_OFF,
            front: CLEAR,
            left: CLEAR,
            right: CLEAR,
            ..Default::default()
        }
    }

    pub fn set_obstacles(&mut self, front: bool, left: bool, right: bool) {
        let level = |blocked| if blocked { BLOCKED } else { CLEAR };
        self.front = level(front);
        self.left = level(left);
        self.right = level(right);
    }

    pub fn motions(&self) -> Vec<MotionCommand> {
        self.outputs
            .iter()
            .filter_map(|o| match o {
                Output::Motion(cmd) => Some(*cmd),
                _ => None,
            })
            .collect()
    }

    pub fn moving_commands(&self) -> usize {
        self.motions().iter().filter(|c| !c.is_stop()).count()
    }

    pub fn beeps(&self) -> Vec<u32> {
        self.outputs
            .iter()
            .filter_map(|o| match o {
                Output::Beep(ms) => Some(*ms),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&Output) -> bool) -> usize {
        self.outputs.iter().filter(|o| pred(o)).count()
    }

    pub fn last_digit(&self) -> Option<DisplayDigit> {
        self.outputs.iter().rev().find_map(|o| match o {
            Output::Digit(d) => Some(*d),
            _ => None,
        })
    }
}

impl SensorPort for ScriptedDevice {
    fn read_channel(&mut self, channel: Channel) -> Result<u16> {
        if self.failing.contains(&channel) {
            return Err(Error::SensorRead {
                channel,
                reason: "scripted failure".to_string(),
            });
        }
        Ok(match channel {
            Channel::Mark => self.mark,
            Channel::Front => self.front,
            Channel::Left => self.left,
            Channel::Right => self.right,
        })
    }
}

impl Clock for ScriptedDevice {
    fn now_ms(&self) -> u32 {
        self.now
    }
}

impl ActuatorPort for ScriptedDevice {
    fn set_motion(&mut self, motion: Motion, left_speed_pct: u8, right_speed_pct: u8) {
        self.outputs.push(Output::Motion(MotionCommand {
            motion,
            left_speed_pct,
            right_speed_pct,
        }));
    }

    fn stop_motors(&mut self) {
        self.outputs.push(Output::Motion(MotionCommand::STOP));
    }

    fn set_digit(&mut self, digit: DisplayDigit) {
        self.outputs.push(Output::Digit(digit));
    }

    fn set_obstacle_indicator(&mut self, on: bool) {
        self.obstacle_indicator = on;
    }

    fn set_mark_indicator(&mut self, on: bool) {
        self.mark_indicator = on;
    }
}

impl FeedbackPort for ScriptedDevice {
    fn request_beep(&mut self, duration_ms: u32) {
        self.outputs.push(Output::Beep(duration_ms));
    }

    fn request_beep_pattern(&mut self, count: u8, on_ms: u32, off_ms: u32) {
        self.outputs.push(Output::BeepPattern(count, on_ms, off_ms));
    }

    fn request_blink(&mut self, count: u8, on_ms: u32, off_ms: u32) {
        self.outputs.push(Output::Blink(count, on_ms, off_ms));
    }
}

impl DeviceDriver for ScriptedDevice {
    fn initialize(&mut self) -> Result<()> {
        self.initialized = true;
        Ok(())
    }

    fn shutdown(&mut self) -> Result<()> {
        self.stop_motors();
        Ok(())
    }
}

/// Controller with default configuration, initialized against `device`
pub fn controller(device: &mut ScriptedDevice) -> NavigationController {
    let mut ctrl = NavigationController::new(&NavConfig::default(), device.now);
    ctrl.initialize(device);
    ctrl
}

/// Tick `n` times, advancing the clock one period after each tick
pub fn run_ticks(ctrl: &mut NavigationController, device: &mut ScriptedDevice, n: u32) {
    for _ in 0..n {
        ctrl.tick(device);
        device.now = device.now.wrapping_add(TICK_MS);
    }
}

/// Tick until `ms` of device time have passed
pub fn run_for(ctrl: &mut NavigationController, device: &mut ScriptedDevice, ms: u32) {
    run_ticks(ctrl, device, ms.div_ceil(TICK_MS));
}

/// One mark pass: `on_ms` over the mark, then `off_ms` of bare floor
pub fn mark_pulse(
    ctrl: &mut NavigationController,
    device: &mut ScriptedDevice,
    on_ms: u32,
    off_ms: u32,
) {
    device.mark = MARK_ON;
    run_for(ctrl, device, on_ms);
    device.mark = MARK_OFF;
    run_for(ctrl, device, off_ms);
}
