//! Fixed-cadence runner
//!
//! Drives one [`NavigationController::tick`] per `runtime.tick_period_ms`
//! of device time and publishes status alongside:
//!
//! ```text
//! every tick ........ controller.tick(device)
//! status_period ..... StatusReport -> status publisher
//! panel_refresh ..... two-line panel view (debug log)
//! halted ............ linger, then stop (exit_on_halt)
//! ```

use crate::config::NavConfig;
use crate::core::hal::{Clock, DeviceDriver, TelemetryPort};
use crate::error::Result;
use crate::navigation::NavigationController;
use crate::telemetry::{BOOT_LINE, PeriodicSchedule, StatusPublisher};
use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Why the run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Countdown finished and the linger period elapsed
    Halted,
    /// Shutdown flag cleared (Ctrl-C)
    Interrupted,
    /// Wall-clock limit reached
    TimeLimit,
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub reason: StopReason,
    pub ticks: u64,
    pub counter: u8,
    pub marks_seen: u32,
    pub halted: bool,
    pub elapsed: Duration,
}

pub struct NavcarApp {
    config: NavConfig,
    device: Box<dyn DeviceDriver>,
    controller: NavigationController,
    publisher: StatusPublisher,
    running: Arc<AtomicBool>,
    max_runtime: Option<Duration>,
}

impl NavcarApp {
    /// Build the runner; status lines go to `status_out`
    pub fn new(
        config: NavConfig,
        device: Box<dyn DeviceDriver>,
        status_out: Box<dyn Write + Send>,
        running: Arc<AtomicBool>,
    ) -> Result<Self> {
        let controller = NavigationController::new(&config, device.now_ms());
        let publisher = StatusPublisher::spawn(status_out)?;
        Ok(Self {
            config,
            device,
            controller,
            publisher,
            running,
            max_runtime: None,
        })
    }

    /// Stop after this much wall-clock time
    pub fn with_max_runtime(mut self, limit: Duration) -> Self {
        self.max_runtime = Some(limit);
        self
    }

    pub fn controller(&self) -> &NavigationController {
        &self.controller
    }

    /// Run until halt, interrupt or time limit
    pub fn run(&mut self) -> Result<RunSummary> {
        self.device.initialize()?;
        self.publisher.publish_line(BOOT_LINE)?;
        self.controller.initialize(self.device.as_mut());

        let runtime = self.config.runtime.clone();
        let scale = time_scale(&self.config);
        let tick_interval = Duration::from_secs_f32(runtime.tick_period_ms as f32 / 1000.0 / scale);
        let mut status = PeriodicSchedule::new(runtime.status_period_ms);
        let mut panel = PeriodicSchedule::new(runtime.panel_refresh_ms);

        let started = Instant::now();
        let mut ticks: u64 = 0;
        let mut halted_at: Option<u32> = None;
        let max_runtime = self.max_runtime;

        log::info!(
            "Running: tick={}ms ({:?} wall), status every {}ms",
            runtime.tick_period_ms,
            tick_interval,
            runtime.status_period_ms
        );

        let reason = loop {
            if !self.running.load(Ordering::Relaxed) {
                break StopReason::Interrupted;
            }
            if max_runtime.is_some_and(|limit| started.elapsed() >= limit) {
                break StopReason::TimeLimit;
            }

            let tick_start = Instant::now();
            self.controller.tick(self.device.as_mut());
            ticks += 1;

            let now = self.device.now_ms();
            let report = self.controller.status_report();
            if status.due(now) {
                self.publisher.report_status(&report);
            }
            if panel.due(now) {
                let [line1, line2] = report.panel_lines();
                log::debug!("|{}|{}|", line1, line2);
            }

            if self.controller.is_halted() && runtime.exit_on_halt {
                let since = *halted_at.get_or_insert(now);
                if now.wrapping_sub(since) >= runtime.halt_linger_ms {
                    break StopReason::Halted;
                }
            }

            if let Some(remaining) = tick_interval.checked_sub(tick_start.elapsed()) {
                std::thread::sleep(remaining);
            }
        };

        // Final status so the last counter value is always published
        let report = self.controller.status_report();
        self.publisher.report_status(&report);
        self.device.shutdown()?;
        self.publisher.shutdown();

        let summary = RunSummary {
            reason,
            ticks,
            counter: self.controller.counter(),
            marks_seen: self.controller.marks_seen(),
            halted: self.controller.is_halted(),
            elapsed: started.elapsed(),
        };
        log::info!(
            "Stopped ({:?}) after {} ticks: counter={} marks={}",
            summary.reason,
            summary.ticks,
            summary.counter,
            summary.marks_seen
        );
        Ok(summary)
    }
}

/// Device time per wall time
fn time_scale(config: &NavConfig) -> f32 {
    #[cfg(feature = "mock")]
    {
        config.device.simulation.speed_factor
    }
    #[cfg(not(feature = "mock"))]
    {
        let _ = config;
        1.0
    }
}
