use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;
use tracing::debug;

pub const DEFAULT_DETACH_DELAY: Duration = Duration::from_millis(100);

/// Work handed back to the event loop that owns the manager
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deferred {
    DetachAll { generation: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheduled {
    /// A timer task was spawned and will deliver `Deferred::DetachAll`
    Later { generation: u64 },
    /// No async runtime is running; the caller must detach right away
    Now,
}

/// One-shot, cancellable "detach everything" timer armed by hide-all.
///
/// Each arm bumps a generation counter. A message from an older generation,
/// or one that raced with `cancel`, is rejected by `fire`.
pub struct DetachTimer {
    delay: Duration,
    generation: u64,
    pending: Option<CancellationToken>,
    tx: UnboundedSender<Deferred>,
}

impl DetachTimer {
    pub fn new(delay: Duration, tx: UnboundedSender<Deferred>) -> Self {
        Self {
            delay,
            generation: 0,
            pending: None,
            tx,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn schedule(&mut self) -> Scheduled {
        self.cancel();
        self.generation += 1;
        let generation = self.generation;

        let Ok(handle) = Handle::try_current() else {
            debug!("no runtime, detaching immediately");
            return Scheduled::Now;
        };

        let token = CancellationToken::new();
        let cancelled = token.clone();
        let tx = self.tx.clone();
        let delay = self.delay;

        handle.spawn(async move {
            tokio::select! {
                _ = cancelled.cancelled() => {}
                _ = tokio::time::sleep(delay) => {
                    let _ = tx.send(Deferred::DetachAll { generation });
                }
            }
        });

        self.pending = Some(token);
        Scheduled::Later { generation }
    }

    /// Cancel a pending detach. Returns true if one was pending.
    pub fn cancel(&mut self) -> bool {
        match self.pending.take() {
            Some(token) => {
                token.cancel();
                // Invalidate a message that may already be queued
                self.generation += 1;
                true
            }
            None => false,
        }
    }

    /// Accept a delivered detach if it belongs to the current arm
    pub fn fire(&mut self, generation: u64) -> bool {
        if self.pending.is_some() && generation == self.generation {
            self.pending = None;
            true
        } else {
            false
        }
    }
}
