//! Configuration constants for the QuickThinker engine
//!
//! This module contains the limits and tuning values used throughout
//! the engine: session sizing, round timing, and distractor synthesis.

use std::time::Duration;

/// Session sizing constants
pub mod session {
    /// Number of rounds in a session when no count is configured
    pub const DEFAULT_ROUND_COUNT: usize = 10;
    /// Minimum number of rounds in a session
    pub const MIN_ROUND_COUNT: usize = 1;
    /// Maximum number of rounds in a session
    pub const MAX_ROUND_COUNT: usize = 50;
}

/// Round timing constants
pub mod timing {
    use super::Duration;

    /// Time limit applied to rounds that do not carry their own
    pub const DEFAULT_TIME_LIMIT: Duration = Duration::from_secs(10);
    /// Minimum time limit in seconds for a round
    pub const MIN_TIME_LIMIT: u64 = 3;
    /// Maximum time limit in seconds for a round
    pub const MAX_TIME_LIMIT: u64 = 60;
    /// Granularity of the countdown
    pub const TICK_INTERVAL: Duration = Duration::from_millis(100);
}

/// Speed math round constants
pub mod speed_math {
    /// Number of incorrect options generated next to the answer
    pub const DISTRACTOR_COUNT: usize = 3;
    /// Smallest distance a distractor may be drawn from
    pub const MIN_SPREAD: i64 = 3;
    /// Distractors are drawn within `answer / SPREAD_DIVISOR` of the answer (20%)
    pub const SPREAD_DIVISOR: i64 = 5;
    /// Random draws attempted before falling back to fixed offsets
    pub const MAX_DISTRACTOR_ATTEMPTS: usize = 32;
}

/// Odd-one-out round constants
pub mod odd_one_out {
    /// Number of items drawn from the shared category
    pub const MAJORITY_COUNT: usize = 3;
}

/// Generic round content limits, enforced on loaded decks
pub mod round {
    /// Minimum number of options a round must present
    pub const MIN_OPTION_COUNT: usize = 2;
    /// Maximum number of options a round may present
    pub const MAX_OPTION_COUNT: usize = 8;
    /// Maximum length of a question text
    pub const MAX_QUESTION_LENGTH: usize = 200;
    /// Maximum length of an option label
    pub const MAX_LABEL_LENGTH: usize = 100;
}
