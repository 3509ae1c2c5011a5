//! Background tasks
//!
//! A named thread that runs a closure on a fixed interval until it is
//! stopped. Stopping disconnects the shutdown channel; the loop sees that
//! on its next wakeup, so an in-flight tick always runs to completion.

use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{self, Sender};
use crossbeam::select;

use crate::error::Result;

/// A periodic job bound to the lifetime of its owner
pub struct BackgroundTask {
    name: &'static str,
    shutdown_tx: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl BackgroundTask {
    /// Spawn `tick` every `interval`; the first run happens one interval in
    pub fn spawn<F>(name: &'static str, interval: Duration, mut tick: F) -> Result<Self>
    where
        F: FnMut() + Send + 'static,
    {
        let (shutdown_tx, shutdown_rx) = channel::bounded::<()>(0);

        let handle = thread::Builder::new()
            .name(format!("ttlkv-{}", name))
            .spawn(move || {
                let ticker = channel::tick(interval);
                tracing::debug!(task = name, ?interval, "background task started");

                loop {
                    select! {
                        recv(ticker) -> _ => tick(),
                        recv(shutdown_rx) -> _ => break,
                    }
                }

                tracing::debug!(task = name, "background task stopped");
            })?;

        Ok(Self {
            name,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        })
    }

    /// Signal the loop to exit and wait for the thread
    pub fn stop(&mut self) {
        drop(self.shutdown_tx.take());

        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!(task = self.name, "background task panicked");
            }
        }
    }

    /// Whether the thread is still running
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().map_or(false, |h| !h.is_finished())
    }
}

impl Drop for BackgroundTask {
    fn drop(&mut self) {
        self.stop();
    }
}
