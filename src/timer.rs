//! Round countdown
//!
//! The countdown is cooperative: the engine never spawns threads or
//! sleeps. Instead it asks the host to deliver an [`AlarmMessage`] after
//! each [`TICK_INTERVAL`](crate::constants::timing::TICK_INTERVAL). Each
//! timer carries an epoch, so alarms that arrive after their timer has
//! been released are recognised and dropped.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use web_time::SystemTime;

use crate::constants::timing::TICK_INTERVAL;

/// Alarm messages the host delivers back to the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlarmMessage {
    /// One countdown tick for a round
    Tick {
        /// Index of the round the tick belongs to
        round: usize,
        /// Epoch of the timer that scheduled the tick
        epoch: u64,
    },
}

/// Countdown updates sent to the display
#[serde_with::serde_as]
#[derive(Debug, Clone, Serialize)]
pub enum UpdateMessage {
    /// Remaining time after a tick
    Countdown {
        /// Index of the round being timed
        index: usize,
        /// Time left before the round is forced to complete
        #[serde_as(as = "serde_with::DurationMilliSeconds<u64>")]
        remaining: Duration,
    },
}

/// Result of advancing a countdown by one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Time remains
    Running(Duration),
    /// The countdown reached zero
    Expired,
}

/// The countdown of a single round
///
/// A `RoundTimer` is owned by the game while its round is open. Dropping
/// it is all it takes to cancel the countdown: later ticks fail
/// [`RoundTimer::owns`] against whatever timer replaced it.
#[derive(Debug, Clone)]
pub struct RoundTimer {
    round: usize,
    epoch: u64,
    limit: Duration,
    remaining: Duration,
    started_at: SystemTime,
}

impl RoundTimer {
    /// Starts a countdown of `limit` for `round`
    pub fn start(round: usize, epoch: u64, limit: Duration, now: SystemTime) -> Self {
        Self {
            round,
            epoch,
            limit,
            remaining: limit,
            started_at: now,
        }
    }

    /// Returns the alarm this timer expects next
    pub fn alarm(&self) -> AlarmMessage {
        AlarmMessage::Tick {
            round: self.round,
            epoch: self.epoch,
        }
    }

    /// Checks whether `alarm` was scheduled by this timer
    pub fn owns(&self, alarm: &AlarmMessage) -> bool {
        *alarm == self.alarm()
    }

    /// Asks the host to deliver the next tick
    pub fn schedule_next<S: FnMut(AlarmMessage, Duration)>(&self, schedule_message: &mut S) {
        schedule_message(self.alarm(), TICK_INTERVAL);
    }

    /// Advances the countdown by one tick
    pub fn tick(&mut self) -> TickOutcome {
        self.remaining = self.remaining.saturating_sub(TICK_INTERVAL);
        if self.remaining.is_zero() {
            TickOutcome::Expired
        } else {
            TickOutcome::Running(self.remaining)
        }
    }

    /// Returns the time left on the countdown
    pub fn remaining(&self) -> Duration {
        self.remaining
    }

    /// Returns the full time limit
    pub fn limit(&self) -> Duration {
        self.limit
    }

    /// Returns the round this timer belongs to
    pub fn round(&self) -> usize {
        self.round
    }

    /// Returns the time elapsed since the round started, clamped to
    /// `[0, limit]`
    pub fn elapsed_at(&self, now: SystemTime) -> Duration {
        now.duration_since(self.started_at)
            .unwrap_or_default()
            .min(self.limit)
    }
}
