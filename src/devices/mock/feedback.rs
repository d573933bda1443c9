//! Buzzer and indicator feedback worker
//!
//! Beep and blink patterns block for their full duration, so they run on a
//! dedicated thread fed through a bounded channel. Requests that arrive while
//! the channel is full are dropped.

use crate::error::{Error, Result};
use crossbeam_channel::{Sender, TrySendError, bounded};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Pending requests before new ones are dropped
const CHANNEL_CAPACITY: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackRequest {
    Beep { duration_ms: u32 },
    BeepPattern { count: u8, on_ms: u32, off_ms: u32 },
    Blink { count: u8, on_ms: u32, off_ms: u32 },
}

/// Output state visible to the driver
#[derive(Debug, Default)]
pub struct FeedbackState {
    pub buzzer_on: AtomicBool,
    /// Both indicators forced on by a blink
    pub blink_on: AtomicBool,
    /// Completed buzzer pulses
    pub beeps: AtomicU32,
    /// Completed blink pulses
    pub blinks: AtomicU32,
}

pub struct FeedbackWorker {
    tx: Option<Sender<FeedbackRequest>>,
    handle: Option<JoinHandle<()>>,
    state: Arc<FeedbackState>,
    dropped: u32,
}

impl FeedbackWorker {
    /// Start the worker; pattern timings are divided by `speed_factor`
    pub fn spawn(speed_factor: f32) -> Result<Self> {
        let (tx, rx) = bounded::<FeedbackRequest>(CHANNEL_CAPACITY);
        let state = Arc::new(FeedbackState::default());
        let worker_state = Arc::clone(&state);

        let handle = thread::Builder::new()
            .name("feedback".to_string())
            .spawn(move || {
                let scaled = |ms: u32| Duration::from_secs_f32(ms as f32 / 1000.0 / speed_factor);
                for request in rx.iter() {
                    log::debug!("Feedback: {:?}", request);
                    match request {
                        FeedbackRequest::Beep { duration_ms } => {
                            pulse(
                                &worker_state.buzzer_on,
                                &worker_state.beeps,
                                scaled(duration_ms),
                            );
                        }
                        FeedbackRequest::BeepPattern {
                            count,
                            on_ms,
                            off_ms,
                        } => pulse_train(
                            &worker_state.buzzer_on,
                            &worker_state.beeps,
                            count,
                            scaled(on_ms),
                            scaled(off_ms),
                        ),
                        FeedbackRequest::Blink {
                            count,
                            on_ms,
                            off_ms,
                        } => pulse_train(
                            &worker_state.blink_on,
                            &worker_state.blinks,
                            count,
                            scaled(on_ms),
                            scaled(off_ms),
                        ),
                    }
                }
                log::debug!("Feedback worker stopped");
            })
            .map_err(|e| Error::Other(format!("Failed to spawn feedback thread: {}", e)))?;

        Ok(Self {
            tx: Some(tx),
            handle: Some(handle),
            state,
            dropped: 0,
        })
    }

    /// Queue a request without blocking
    pub fn request(&mut self, request: FeedbackRequest) {
        let Some(tx) = &self.tx else {
            log::warn!("Feedback worker stopped, ignoring {:?}", request);
            return;
        };
        match tx.try_send(request) {
            Ok(()) => {}
            Err(TrySendError::Full(request)) => {
                self.dropped += 1;
                log::warn!("Feedback queue full, dropped {:?}", request);
            }
            Err(TrySendError::Disconnected(request)) => {
                log::warn!("Feedback worker gone, dropped {:?}", request);
            }
        }
    }

    pub fn state(&self) -> &Arc<FeedbackState> {
        &self.state
    }

    pub fn dropped(&self) -> u32 {
        self.dropped
    }

    /// Finish queued patterns and stop the thread
    pub fn shutdown(&mut self) {
        self.tx.take();
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            log::error!("Feedback thread panicked");
        }
    }
}

impl Drop for FeedbackWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn pulse(output: &AtomicBool, counter: &AtomicU32, on: Duration) {
    output.store(true, Ordering::Relaxed);
    thread::sleep(on);
    output.store(false, Ordering::Relaxed);
    counter.fetch_add(1, Ordering::Relaxed);
}

/// `count` pulses separated by `off`; no gap after the last one
fn pulse_train(output: &AtomicBool, counter: &AtomicU32, count: u8, on: Duration, off: Duration) {
    for i in 0..count {
        pulse(output, counter, on);
        if i + 1 < count {
            thread::sleep(off);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_patterns_complete_on_shutdown() {
        let mut worker = FeedbackWorker::spawn(100.0).unwrap();
        worker.request(FeedbackRequest::Beep { duration_ms: 50 });
        worker.request(FeedbackRequest::BeepPattern {
            count: 2,
            on_ms: 180,
            off_ms: 80,
        });
        worker.request(FeedbackRequest::Blink {
            count: 2,
            on_ms: 80,
            off_ms: 80,
        });
        let state = Arc::clone(worker.state());
        worker.shutdown();

        assert_eq!(state.beeps.load(Ordering::Relaxed), 3);
        assert_eq!(state.blinks.load(Ordering::Relaxed), 2);
        assert!(!state.buzzer_on.load(Ordering::Relaxed));
    }

    #[test]
    fn test_no_gap_after_last_pulse() {
        let mut worker = FeedbackWorker::spawn(1.0).unwrap();
        let started = Instant::now();
        worker.request(FeedbackRequest::BeepPattern {
            count: 1,
            on_ms: 10,
            off_ms: 5_000,
        });
        worker.request(FeedbackRequest::Blink {
            count: 1,
            on_ms: 10,
            off_ms: 5_000,
        });
        let state = Arc::clone(worker.state());
        worker.shutdown();

        assert!(started.elapsed() < Duration::from_secs(2));
        assert_eq!(state.beeps.load(Ordering::Relaxed), 1);
        assert_eq!(state.blinks.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_request_after_shutdown_is_ignored() {
        let mut worker = FeedbackWorker::spawn(1.0).unwrap();
        worker.shutdown();
        worker.request(FeedbackRequest::Beep { duration_ms: 10 });
        assert_eq!(worker.dropped(), 0);
    }
}
