//! Tick scheduling.
//!
//! A [`TickScheduler`] hands out repeating timers identified by [`TimerId`].
//! The playback controller owns at most one of them at a time and cancels it
//! before scheduling a replacement.

use std::collections::{BTreeSet, HashMap};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::trace;

const LOG_TARGET: &str = "glimpse::timer";

/// Identifier of one scheduled timer. Never reused by the scheduler that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

impl TimerId {
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for TimerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "timer#{}", self.0)
    }
}

/// Source of repeating tick timers.
pub trait TickScheduler {
    /// Start a timer firing every `interval`, first fire one full interval from now.
    fn schedule(&mut self, interval: Duration) -> TimerId;

    /// Stop a timer. Cancelling an unknown or already-cancelled timer does nothing.
    fn cancel(&mut self, id: TimerId);
}

/// Timers backed by tokio tasks.
///
/// Fires are delivered as [`TimerId`]s on the receiver returned by
/// [`TokioTickScheduler::new`]. A fire may already be queued when its timer
/// is cancelled, so consumers must compare the id against the timer they
/// currently own.
pub struct TokioTickScheduler {
    next_id: u64,
    fired_tx: mpsc::UnboundedSender<TimerId>,
    timers: HashMap<TimerId, CancellationToken>,
    root: CancellationToken,
}

impl TokioTickScheduler {
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<TimerId>) {
        let (fired_tx, fired_rx) = mpsc::unbounded_channel();
        (
            Self {
                next_id: 0,
                fired_tx,
                timers: HashMap::new(),
                root: CancellationToken::new(),
            },
            fired_rx,
        )
    }

    /// Number of timers that have been scheduled and not cancelled.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.timers.len()
    }
}

impl TickScheduler for TokioTickScheduler {
    /// # Panics
    ///
    /// Panics if called outside of a tokio runtime.
    fn schedule(&mut self, interval: Duration) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        let token = self.root.child_token();
        let fired_tx = self.fired_tx.clone();
        let task_token = token.clone();

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    () = task_token.cancelled() => break,
                    _ = ticker.tick() => {
                        if fired_tx.send(id).is_err() {
                            break;
                        }
                    }
                }
            }
        });

        trace!(target: LOG_TARGET, "Scheduled {} every {:?}", id, interval);
        self.timers.insert(id, token);
        id
    }

    fn cancel(&mut self, id: TimerId) {
        if let Some(token) = self.timers.remove(&id) {
            token.cancel();
            trace!(target: LOG_TARGET, "Cancelled {}", id);
        }
    }
}

impl Drop for TokioTickScheduler {
    fn drop(&mut self) {
        self.root.cancel();
    }
}

/// Scheduler that never fires on its own.
///
/// Hosts call the controller's tick entry points themselves; the scheduler
/// only keeps the bookkeeping so the single-timer discipline can be checked.
#[derive(Debug, Default)]
pub struct ManualTickScheduler {
    next_id: u64,
    active: BTreeSet<TimerId>,
    scheduled: usize,
    cancelled: usize,
    last_interval: Option<Duration>,
}

impl ManualTickScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently active timers, oldest first.
    #[must_use]
    pub fn active(&self) -> Vec<TimerId> {
        self.active.iter().copied().collect()
    }

    /// The most recently scheduled timer that is still active.
    #[must_use]
    pub fn active_timer(&self) -> Option<TimerId> {
        self.active.iter().next_back().copied()
    }

    #[must_use]
    pub const fn schedule_count(&self) -> usize {
        self.scheduled
    }

    /// Cancellations that actually stopped an active timer.
    #[must_use]
    pub const fn cancel_count(&self) -> usize {
        self.cancelled
    }

    #[must_use]
    pub const fn last_interval(&self) -> Option<Duration> {
        self.last_interval
    }
}

impl TickScheduler for ManualTickScheduler {
    fn schedule(&mut self, interval: Duration) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        self.active.insert(id);
        self.scheduled += 1;
        self.last_interval = Some(interval);
        id
    }

    fn cancel(&mut self, id: TimerId) {
        if self.active.remove(&id) {
            self.cancelled += 1;
        }
    }
}
