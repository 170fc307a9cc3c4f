//! End-of-session summary
//!
//! Turns a final score and total time into a qualitative rating and a
//! percentile-style rank. Nothing here is persisted; it only feeds the
//! results screen.
//!
//! Ratings are chosen by accuracy tier plus a speed bonus:
//!
//! | accuracy      | tier |
//! |---------------|------|
//! | below 50%     | 0    |
//! | 50% to 69%    | 1    |
//! | 70% to 89%    | 2    |
//! | 90% and above | 3    |
//!
//! A session at 50% accuracy or more whose average round took at most
//! [`FAST_AVERAGE`] earns one extra tier. The rank is
//! `accuracy * (80 + 19 * speed)`, where `speed` is the share of the
//! default time limit left unused on average, clamped to `[1, 99]`.

use std::time::Duration;

use enum_map::EnumMap;
use serde::Serialize;

use crate::{
    constants::timing::DEFAULT_TIME_LIMIT,
    game::RoundResult,
    round::{Round, RoundKind},
};

/// Average round time at or below which the speed bonus applies
pub const FAST_AVERAGE: Duration = Duration::from_secs(3);

/// Qualitative rating, from worst to best
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Rating {
    /// Below half correct
    KeepPracticing,
    /// At least half correct
    SteadySolver,
    /// Mostly correct
    QuickWit,
    /// Nearly all correct
    SharpMind,
    /// Nearly all correct, and fast
    LightningThinker,
}

impl Rating {
    const BY_TIER: [Rating; 5] = [
        Rating::KeepPracticing,
        Rating::SteadySolver,
        Rating::QuickWit,
        Rating::SharpMind,
        Rating::LightningThinker,
    ];

    /// Returns the text shown to the player
    pub fn label(self) -> &'static str {
        match self {
            Self::KeepPracticing => "Keep Practicing",
            Self::SteadySolver => "Steady Solver",
            Self::QuickWit => "Quick Wit",
            Self::SharpMind => "Sharp Mind",
            Self::LightningThinker => "Lightning Thinker",
        }
    }
}

/// Presentation data derived from a finished session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// The rating
    pub rating: Rating,
    /// The rating's display text
    pub label: &'static str,
    /// Percentile-style rank in `[1, 99]`
    pub rank: u8,
}

/// Correct and total rounds of one kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct KindStats {
    /// Rounds answered correctly
    pub correct: usize,
    /// Rounds played
    pub total: usize,
}

/// Rates a session from its score, length, and total time
pub fn summarize(score: usize, total_rounds: usize, total_time: Duration) -> Summary {
    let (accuracy, average) = if total_rounds == 0 {
        (0., Duration::ZERO)
    } else {
        (
            score.min(total_rounds) as f64 / total_rounds as f64,
            total_time.div_f64(total_rounds as f64),
        )
    };

    let tier = match accuracy {
        a if a >= 0.9 => 3,
        a if a >= 0.7 => 2,
        a if a >= 0.5 => 1,
        _ => 0,
    };
    let bonus = usize::from(accuracy >= 0.5 && average <= FAST_AVERAGE);
    let rating = Rating::BY_TIER[(tier + bonus).min(Rating::BY_TIER.len() - 1)];

    let speed = 1. - (average.as_secs_f64() / DEFAULT_TIME_LIMIT.as_secs_f64()).min(1.);
    let rank = (accuracy * (80. + 19. * speed)).round().clamp(1., 99.) as u8;

    Summary {
        rating,
        label: rating.label(),
        rank,
    }
}

/// Counts correct and total rounds per kind
///
/// Results are matched to rounds by their round index; results without
/// a matching round are ignored.
pub fn breakdown(rounds: &[Round], results: &[RoundResult]) -> EnumMap<RoundKind, KindStats> {
    let mut stats = EnumMap::<RoundKind, KindStats>::default();

    for result in results {
        if let Some(round) = rounds.get(result.round_index) {
            let entry = &mut stats[round.kind()];
            entry.total += 1;
            entry.correct += usize::from(result.correct);
        }
    }

    stats
}
