//! Periodic status polling on a dedicated thread.
//!
//! The poller only reads; what to do with a failure is up to the consumer
//! of the [`PollEvent`]s.

use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::debug;

use crate::device::Status;
use crate::error::KrakenError;
use crate::repository::KrakenRepository;

/// Outcome of one poll.
#[derive(Debug)]
pub enum PollEvent {
    Status(Status),
    /// Connected, but the reading was rejected or the device is not recognized.
    NoStatus,
    /// No supported device is plugged in.
    Unavailable,
    Error(KrakenError),
}

impl From<crate::error::Result<Option<Status>>> for PollEvent {
    fn from(result: crate::error::Result<Option<Status>>) -> Self {
        match result {
            Ok(Some(status)) => PollEvent::Status(status),
            Ok(None) => PollEvent::NoStatus,
            Err(KrakenError::DeviceUnavailable) => PollEvent::Unavailable,
            Err(e) => PollEvent::Error(e),
        }
    }
}

/// Handle to a running poll thread. Dropping it stops the thread.
pub struct Poller {
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl Poller {
    /// Start polling `repository` now and then every `interval`.
    pub fn spawn(
        repository: Arc<KrakenRepository>,
        interval: Duration,
    ) -> std::io::Result<(Self, Receiver<PollEvent>)> {
        let (events_tx, events_rx) = mpsc::channel();
        let (stop_tx, stop_rx) = mpsc::channel::<()>();

        let handle = thread::Builder::new()
            .name("kraken-poller".into())
            .spawn(move || poll_loop(&repository, interval, &events_tx, &stop_rx))?;

        let poller = Self {
            stop: Some(stop_tx),
            handle: Some(handle),
        };
        Ok((poller, events_rx))
    }

    /// Stop polling and wait for an in-flight poll to finish.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        // Closing the stop channel wakes the thread
        self.stop.take();
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            debug!("Poll thread panicked");
        }
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn poll_loop(
    repository: &KrakenRepository,
    interval: Duration,
    events: &Sender<PollEvent>,
    stop: &Receiver<()>,
) {
    debug!("Polling every {:?}", interval);
    loop {
        let event = PollEvent::from(repository.get_status());
        if events.send(event).is_err() {
            debug!("Poll consumer gone, stopping");
            break;
        }

        match stop.recv_timeout(interval) {
            Err(RecvTimeoutError::Timeout) => {}
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    debug!("Polling stopped");
}
