//! Background status line writer
//!
//! The control loop hands lines over a bounded channel and never waits on
//! the output. A full channel drops the line with a warning.

use super::report::StatusReport;
use crate::core::hal::TelemetryPort;
use crate::error::{Error, Result};
use crossbeam_channel::{Sender, TrySendError, bounded};
use std::io::Write;
use std::thread::JoinHandle;

/// Lines buffered before new ones are dropped
const CHANNEL_CAPACITY: usize = 32;

pub struct StatusPublisher {
    tx: Option<Sender<String>>,
    handle: Option<JoinHandle<()>>,
    published: u64,
    dropped: u64,
}

impl StatusPublisher {
    /// Start the publisher thread writing to `writer`
    pub fn spawn(mut writer: Box<dyn Write + Send>) -> Result<Self> {
        let (tx, rx) = bounded::<String>(CHANNEL_CAPACITY);

        let handle = std::thread::Builder::new()
            .name("status-publisher".to_string())
            .spawn(move || {
                log::debug!("Status publisher started");
                for line in rx.iter() {
                    if let Err(e) = writeln!(writer, "{}", line).and_then(|_| writer.flush()) {
                        log::warn!("Status write failed: {}", e);
                    }
                }
                log::debug!("Status publisher stopped");
            })?;

        Ok(Self {
            tx: Some(tx),
            handle: Some(handle),
            published: 0,
            dropped: 0,
        })
    }

    /// Queue one line for output
    pub fn publish_line(&mut self, line: impl Into<String>) -> Result<()> {
        let tx = self
            .tx
            .as_ref()
            .ok_or(Error::ChannelClosed("status publisher"))?;
        match tx.try_send(line.into()) {
            Ok(()) => {
                self.published += 1;
                Ok(())
            }
            Err(TrySendError::Full(line)) => {
                self.dropped += 1;
                log::warn!("Status channel full, dropped: {}", line);
                Ok(())
            }
            Err(TrySendError::Disconnected(_)) => Err(Error::ChannelClosed("status publisher")),
        }
    }

    pub fn published(&self) -> u64 {
        self.published
    }

    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Flush pending lines and stop the thread
    pub fn shutdown(&mut self) {
        self.tx.take();
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            log::error!("Status publisher thread panicked");
        }
    }
}

impl TelemetryPort for StatusPublisher {
    fn report_status(&mut self, report: &StatusReport) {
        if let Err(e) = self.publish_line(report.to_string()) {
            log::warn!("Status report lost: {}", e);
        }
    }
}

impl Drop for StatusPublisher {
    fn drop(&mut self) {
        self.shutdown();
    }
}
