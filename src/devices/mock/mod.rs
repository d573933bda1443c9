//! Mock device driver for hardware-free runs
//!
//! Simulates the whole car: a differential drive in a walled arena with
//! obstacle boxes and floor marks, IR range sensors, the reflective mark
//! sensor, the counter display, indicators and the buzzer.
//!
//! | Component | Simulation Method |
//! |-----------|-------------------|
//! | Drive | Differential drive kinematics, stop on contact |
//! | Range sensors | Ray-cast from the chassis edge, 1/d response + noise |
//! | Mark sensor | Floor lookup just ahead of center + noise |
//! | Display / indicators | Latched in the driver, logged on change |
//! | Buzzer / blink | Feedback worker thread |
//!
//! # Configuration
//!
//! ```toml
//! [device]
//! type = "mock"
//! name = "Mock navcar"
//!
//! [device.simulation]
//! arena_width = 3.0
//! arena_height = 2.0
//! speed_factor = 1.0    # 2.0 = 2x speed
//! random_seed = 42      # 0 = random each run
//! marks = [{ x = 0.8, y = 0.4, width = 0.04, height = 1.2 }]
//! ```
//!
//! # Thread Model
//!
//! ```text
//! ┌─────────────────┐   wheel speeds   ┌─────────────────┐
//! │  Control loop   │ ───────────────▶ │ mock-simulation │
//! │ (reads sensors) │ ◀─── pose ────── │  (physics)      │
//! └────────┬────────┘                  └─────────────────┘
//!          │ try_send
//!          ▼
//! ┌─────────────────┐
//! │    feedback     │
//! └─────────────────┘
//! ```
//!
//! The device clock runs at `speed_factor` times wall time, starting from
//! `clock_offset_ms` and wrapping at `u32::MAX`.
//!
//! # Module Structure
//!
//! - [`config`]: Simulation parameters
//! - [`world`]: Arena geometry and ray casting
//! - [`physics`]: Differential drive kinematics
//! - [`sensor_sim`]: Range and mark sensor response
//! - [`noise`]: Seedable noise generator
//! - [`feedback`]: Buzzer/blink worker

pub mod config;
mod feedback;
mod noise;
mod physics;
mod sensor_sim;
mod world;

use crate::config::DeviceConfig;
use crate::core::hal::{ActuatorPort, Clock, DeviceDriver, FeedbackPort, SensorPort};
use crate::core::types::{ADC_MAX, Channel, DisplayDigit, Motion};
use crate::error::{Error, Result};

use config::SimulationConfig;
use feedback::{FeedbackRequest, FeedbackWorker};
use noise::NoiseGenerator;
use physics::PhysicsState;
use sensor_sim::SensorModel;
use world::World;

use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Car state advanced by the simulation thread
struct SimState {
    physics: PhysicsState,
    /// Commanded wheel surface speeds (m/s)
    left_vel: f32,
    right_vel: f32,
    collisions: u32,
    in_contact: bool,
}

/// Shared state for thread communication
struct SharedState {
    sim: Mutex<SimState>,
    shutdown: AtomicBool,
}

/// Latched display and indicator outputs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PanelOutputs {
    pub digit: DisplayDigit,
    pub obstacle_indicator: bool,
    pub mark_indicator: bool,
}

/// Mock car driver
pub struct MockDriver {
    name: String,
    config: SimulationConfig,
    world: Arc<World>,
    sensors: SensorModel,
    noise: NoiseGenerator,
    shared: Arc<SharedState>,
    simulation_handle: Option<JoinHandle<()>>,
    feedback: Option<FeedbackWorker>,
    epoch: Instant,
    outputs: PanelOutputs,
}

impl MockDriver {
    /// Create a new mock driver from device configuration
    pub fn new(device_config: &DeviceConfig) -> Result<Self> {
        let config = device_config.simulation.clone();
        config.validate()?;

        let world = Arc::new(World::new(&config));
        let physics = PhysicsState::new(
            config.start_x,
            config.start_y,
            config.start_theta,
            &config.robot,
        );

        Ok(Self {
            name: device_config.name.clone(),
            sensors: SensorModel::new(&config.sensors, config.robot.robot_radius),
            noise: NoiseGenerator::new(config.random_seed),
            shared: Arc::new(SharedState {
                sim: Mutex::new(SimState {
                    physics,
                    left_vel: 0.0,
                    right_vel: 0.0,
                    collisions: 0,
                    in_contact: false,
                }),
                shutdown: AtomicBool::new(false),
            }),
            simulation_handle: None,
            feedback: None,
            epoch: Instant::now(),
            outputs: PanelOutputs::default(),
            world,
            config,
        })
    }

    /// Current pose (x, y, theta)
    pub fn pose(&self) -> (f32, f32, f32) {
        let sim = self.shared.sim.lock();
        (sim.physics.x(), sim.physics.y(), sim.physics.theta())
    }

    /// Contacts with walls or obstacles so far
    pub fn collisions(&self) -> u32 {
        self.shared.sim.lock().collisions
    }

    /// Latched outputs; both indicators read on while a blink pulse is lit
    pub fn outputs(&self) -> PanelOutputs {
        let blinking = self
            .feedback
            .as_ref()
            .is_some_and(|f| f.state().blink_on.load(Ordering::Relaxed));
        PanelOutputs {
            obstacle_indicator: self.outputs.obstacle_indicator || blinking,
            mark_indicator: self.outputs.mark_indicator || blinking,
            ..self.outputs
        }
    }

    /// Buzzer pulses completed by the running feedback worker
    pub fn beeps_played(&self) -> u32 {
        self.feedback
            .as_ref()
            .map_or(0, |f| f.state().beeps.load(Ordering::Relaxed))
    }

    fn set_wheels(&mut self, left_vel: f32, right_vel: f32) {
        let mut sim = self.shared.sim.lock();
        sim.left_vel = left_vel;
        sim.right_vel = right_vel;
    }

    fn send_feedback(&mut self, request: FeedbackRequest) {
        match self.feedback.as_mut() {
            Some(worker) => worker.request(request),
            None => log::debug!("Feedback before initialize ignored: {:?}", request),
        }
    }

    fn shutdown_all(&mut self) {
        self.shared.shutdown.store(true, Ordering::Relaxed);
        if let Some(handle) = self.simulation_handle.take()
            && handle.join().is_err()
        {
            log::error!("Simulation thread panicked");
        }
        if let Some(mut worker) = self.feedback.take() {
            worker.shutdown();
            if worker.dropped() > 0 {
                log::warn!("{} feedback requests were dropped", worker.dropped());
            }
        }
    }
}

/// Wheel surface speeds (m/s) for a motion at the given duty
fn wheel_speeds(motion: Motion, left_pct: u8, right_pct: u8, max_speed: f32) -> (f32, f32) {
    let l = f32::from(left_pct.min(100)) / 100.0 * max_speed;
    let r = f32::from(right_pct.min(100)) / 100.0 * max_speed;
    match motion {
        Motion::Stop => (0.0, 0.0),
        Motion::Forward => (l, r),
        Motion::Backward => (-l, -r),
        Motion::TurnLeft => (-l, r),
        Motion::TurnRight => (l, -r),
    }
}

impl SensorPort for MockDriver {
    fn read_channel(&mut self, channel: Channel) -> Result<u16> {
        if self.noise.chance(self.config.noise.read_failure_rate) {
            return Err(Error::SensorRead {
                channel,
                reason: "simulated ADC timeout".to_string(),
            });
        }

        let counts = {
            let sim = self.shared.sim.lock();
            self.sensors.read(channel, &self.world, &sim.physics)
        };
        let stddev = match channel {
            Channel::Mark => self.config.noise.mark_stddev,
            _ => self.config.noise.range_stddev,
        };
        Ok(self.noise.perturb_counts(counts, stddev, ADC_MAX))
    }
}

impl Clock for MockDriver {
    fn now_ms(&self) -> u32 {
        let scale = f64::from(self.config.speed_factor);
        let sim_ms = self.epoch.elapsed().as_secs_f64() * scale * 1000.0;
        let offset = self.config.clock_offset_ms;
        // Truncation to u32 is the wrap
        offset.wrapping_add(sim_ms as u64 as u32)
    }
}

impl ActuatorPort for MockDriver {
    fn set_motion(&mut self, motion: Motion, left_speed_pct: u8, right_speed_pct: u8) {
        let (l, r) = wheel_speeds(
            motion,
            left_speed_pct,
            right_speed_pct,
            self.config.robot.max_wheel_speed,
        );
        log::trace!("Drive {:?}: left={:.3} right={:.3} m/s", motion, l, r);
        self.set_wheels(l, r);
    }

    fn stop_motors(&mut self) {
        self.set_wheels(0.0, 0.0);
    }

    fn set_digit(&mut self, digit: DisplayDigit) {
        if self.outputs.digit != digit {
            log::debug!("Display: {:?} (segments {:#04x})", digit, digit.segments());
        }
        self.outputs.digit = digit;
    }

    fn set_obstacle_indicator(&mut self, on: bool) {
        self.outputs.obstacle_indicator = on;
    }

    fn set_mark_indicator(&mut self, on: bool) {
        self.outputs.mark_indicator = on;
    }
}

impl FeedbackPort for MockDriver {
    fn request_beep(&mut self, duration_ms: u32) {
        self.send_feedback(FeedbackRequest::Beep { duration_ms });
    }

    fn request_beep_pattern(&mut self, count: u8, on_ms: u32, off_ms: u32) {
        self.send_feedback(FeedbackRequest::BeepPattern {
            count,
            on_ms,
            off_ms,
        });
    }

    fn request_blink(&mut self, count: u8, on_ms: u32, off_ms: u32) {
        self.send_feedback(FeedbackRequest::Blink {
            count,
            on_ms,
            off_ms,
        });
    }
}

impl DeviceDriver for MockDriver {
    fn initialize(&mut self) -> Result<()> {
        if self.simulation_handle.is_some() {
            return Ok(());
        }
        log::info!(
            "Initializing {} ({}x{} m arena, {} obstacles, {} marks)",
            self.name,
            self.world.width(),
            self.world.height(),
            self.config.obstacles.len(),
            self.config.marks.len()
        );

        self.shared.shutdown.store(false, Ordering::Relaxed);
        self.feedback = Some(FeedbackWorker::spawn(self.config.speed_factor)?);

        let config = self.config.clone();
        let shared = Arc::clone(&self.shared);
        let world = Arc::clone(&self.world);

        let handle = thread::Builder::new()
            .name("mock-simulation".to_string())
            .spawn(move || simulation_loop(config, shared, world))
            .map_err(|e| Error::Other(format!("Failed to spawn simulation thread: {}", e)))?;
        self.simulation_handle = Some(handle);

        log::info!("Mock device driver initialized");
        Ok(())
    }

    fn shutdown(&mut self) -> Result<()> {
        self.stop_motors();
        self.shutdown_all();
        let (x, y, theta) = self.pose();
        log::info!(
            "Mock device stopped at ({:.2}, {:.2}, {:.2} rad), {} collisions",
            x,
            y,
            theta,
            self.collisions()
        );
        Ok(())
    }
}

impl Drop for MockDriver {
    fn drop(&mut self) {
        self.shutdown_all();
    }
}

/// Physics loop at `physics_rate_hz` of simulated time
fn simulation_loop(config: SimulationConfig, shared: Arc<SharedState>, world: Arc<World>) {
    let interval = Duration::from_secs_f32(1.0 / config.physics_rate_hz / config.speed_factor);
    let mut last_time = Instant::now();

    log::info!(
        "Simulation loop started: speed_factor={}, interval={:?}",
        config.speed_factor,
        interval
    );

    while !shared.shutdown.load(Ordering::Relaxed) {
        let loop_start = Instant::now();
        let sim_dt = loop_start.duration_since(last_time).as_secs_f32() * config.speed_factor;
        last_time = loop_start;

        {
            let mut sim = shared.sim.lock();
            let (left_vel, right_vel) = (sim.left_vel, sim.right_vel);
            let blocked = sim
                .physics
                .update(sim_dt, left_vel, right_vel, &world, &config.robot);
            if blocked && !sim.in_contact {
                sim.collisions += 1;
                log::debug!(
                    "Contact at ({:.3}, {:.3})",
                    sim.physics.x(),
                    sim.physics.y()
                );
            }
            sim.in_contact = blocked;
        }

        if let Some(remaining) = interval.checked_sub(loop_start.elapsed()) {
            thread::sleep(remaining);
        }
    }

    log::info!("Simulation loop stopped");
}
