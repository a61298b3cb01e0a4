//! Cancellable phase countdowns for Huddle.
//!
//! A timed phase (answering, voting) arms a [`PhaseTimer`] when it is
//! entered and cancels it when it is left. The timer carries a caller-chosen
//! tag, typically the engine's timer epoch, so whoever receives the expiry
//! can tell which phase it was armed for.
//!
//! # Disarmed mode
//!
//! When nothing is armed, [`PhaseTimer::wait_for_expiry`] pends forever.
//! That keeps it usable as an unconditional `tokio::select!` branch in a
//! session loop:
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         Some(cmd) = cmd_rx.recv() => { /* apply player action, re-arm */ }
//!         epoch = timer.wait_for_expiry() => {
//!             let notices = controller.expire(epoch);
//!             /* publish, re-arm */
//!         }
//!     }
//! }
//! ```
//!
//! # Cancellation
//!
//! Arming replaces any previous countdown and cancelling drops it, so a
//! callback for a phase the state machine has already left can never fire.
//! Dropping the `wait_for_expiry` future (because another `select!` branch
//! won) leaves the countdown armed; the next call resumes waiting on the
//! same deadline.

use std::time::Duration;

use tokio::time::{self, Instant};
use tracing::{debug, trace};

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Lifetime counters for a [`PhaseTimer`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimerStats {
    /// Countdowns started.
    pub armed: u64,
    /// Countdowns that ran to completion.
    pub fired: u64,
    /// Countdowns dropped before their deadline (explicitly or by re-arming).
    pub cancelled: u64,
}

// ---------------------------------------------------------------------------
// Timer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
struct Armed<T> {
    tag: T,
    deadline: Instant,
    duration: Duration,
}

/// A single-shot, cancellable countdown.
///
/// At most one countdown is armed at a time. One `PhaseTimer` per session.
#[derive(Debug)]
pub struct PhaseTimer<T> {
    armed: Option<Armed<T>>,
    stats: TimerStats,
}

impl<T: Copy + std::fmt::Debug> PhaseTimer<T> {
    /// Creates a disarmed timer.
    pub fn new() -> Self {
        Self {
            armed: None,
            stats: TimerStats::default(),
        }
    }

    /// Starts a countdown of `duration` tagged with `tag`.
    ///
    /// Any countdown already running is cancelled first.
    pub fn arm(&mut self, tag: T, duration: Duration) {
        if let Some(previous) = self.armed.take() {
            self.stats.cancelled += 1;
            debug!(tag = ?previous.tag, "replacing armed phase timer");
        }
        self.armed = Some(Armed {
            tag,
            deadline: Instant::now() + duration,
            duration,
        });
        self.stats.armed += 1;
        debug!(?tag, secs = duration.as_secs_f64(), "phase timer armed");
    }

    /// Cancels the running countdown, returning its tag.
    ///
    /// Returns `None` (and does nothing) if the timer wasn't armed.
    pub fn cancel(&mut self) -> Option<T> {
        let armed = self.armed.take()?;
        self.stats.cancelled += 1;
        debug!(tag = ?armed.tag, "phase timer cancelled");
        Some(armed.tag)
    }

    /// Waits until the armed countdown reaches its deadline and returns its
    /// tag. The timer is disarmed once this resolves.
    ///
    /// Pends forever while disarmed.
    pub async fn wait_for_expiry(&mut self) -> T {
        let (tag, deadline) = match &self.armed {
            Some(armed) => (armed.tag, armed.deadline),
            None => {
                std::future::pending::<()>().await;
                unreachable!()
            }
        };

        time::sleep_until(deadline).await;

        self.armed = None;
        self.stats.fired += 1;
        trace!(?tag, "phase timer fired");
        tag
    }

    /// Whether a countdown is running.
    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    /// Tag of the running countdown.
    pub fn tag(&self) -> Option<T> {
        self.armed.map(|a| a.tag)
    }

    /// Time left before the running countdown fires. Saturates at zero.
    pub fn remaining(&self) -> Option<Duration> {
        self.armed
            .map(|a| a.deadline.saturating_duration_since(Instant::now()))
    }

    /// Full length of the running countdown, as armed.
    pub fn duration(&self) -> Option<Duration> {
        self.armed.map(|a| a.duration)
    }

    pub fn stats(&self) -> TimerStats {
        self.stats
    }
}

impl<T: Copy + std::fmt::Debug> Default for PhaseTimer<T> {
    fn default() -> Self {
        Self::new()
    }
}
