//! Session configuration
//!
//! This module defines the options a host passes when creating a game:
//! how many rounds to play, how long each round lasts, and how hard the
//! generated arithmetic is. Options are validated with `garde` before a
//! game accepts them.

use std::time::Duration;

use garde::Validate;
use serde::{Deserialize, Serialize};

use crate::constants;

type ValidationResult = garde::Result;

/// Validates that a duration falls within specified bounds
///
/// # Arguments
///
/// * `field` - Name of the field being validated (for error messages)
/// * `val` - The duration value to validate
///
/// # Errors
///
/// Returns a `garde::Error` if the duration is outside the bounds.
pub(crate) fn validate_duration<const MIN_SECONDS: u64, const MAX_SECONDS: u64>(
    field: &'static str,
    val: &Duration,
) -> ValidationResult {
    let bounds = Duration::from_secs(MIN_SECONDS)..=Duration::from_secs(MAX_SECONDS);
    if bounds.contains(val) && !val.is_zero() {
        Ok(())
    } else {
        Err(garde::Error::new(format!(
            "{field} is outside of the bounds [{MIN_SECONDS},{MAX_SECONDS}]",
        )))
    }
}

/// Validates the time limit of a round
pub(crate) fn validate_time_limit(val: &Duration) -> ValidationResult {
    validate_duration::<
        { constants::timing::MIN_TIME_LIMIT },
        { constants::timing::MAX_TIME_LIMIT },
    >("time_limit", val)
}

/// Scales the operand ranges of generated arithmetic
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    /// Small operands, suited to warming up
    Easy,
    /// The default range
    #[default]
    Normal,
    /// Large operands and bigger products
    Hard,
}

impl Difficulty {
    /// Largest operand for addition and subtraction
    pub fn max_operand(self) -> u32 {
        match self {
            Self::Easy => 10,
            Self::Normal => 25,
            Self::Hard => 99,
        }
    }

    /// Largest operand for multiplication
    pub fn max_factor(self) -> u32 {
        match self {
            Self::Easy => 5,
            Self::Normal => 12,
            Self::Hard => 20,
        }
    }
}

/// Options for a game session
///
/// Every field has a default, so hosts can deserialize a partial JSON
/// object and only override what they need.
#[serde_with::serde_as]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct Options {
    /// Number of rounds in a session
    #[garde(range(min = constants::session::MIN_ROUND_COUNT, max = constants::session::MAX_ROUND_COUNT))]
    pub round_count: usize,
    /// Time limit for rounds that do not carry their own
    #[garde(custom(|v, _| validate_time_limit(v)))]
    #[serde_as(as = "serde_with::DurationMilliSeconds<u64>")]
    pub time_limit: Duration,
    /// Operand scaling for speed math rounds
    #[garde(skip)]
    pub difficulty: Difficulty,
    /// Seed for reproducible round generation
    #[garde(skip)]
    pub seed: Option<u64>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            round_count: constants::session::DEFAULT_ROUND_COUNT,
            time_limit: constants::timing::DEFAULT_TIME_LIMIT,
            difficulty: Difficulty::default(),
            seed: None,
        }
    }
}

impl Options {
    /// Returns a random number generator honoring the configured seed
    pub fn rng(&self) -> fastrand::Rng {
        match self.seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_default_options_are_valid() {
        let options = Options::default();
        assert!(options.validate().is_ok());
        assert_eq!(options.round_count, 10);
        assert_eq!(options.time_limit, Duration::from_secs(10));
        assert_eq!(options.difficulty, Difficulty::Normal);
    }

    #[test]
    fn test_round_count_bounds() {
        let mut options = Options {
            round_count: 0,
            ..Options::default()
        };
        assert!(options.validate().is_err());

        options.round_count = 51;
        assert!(options.validate().is_err());

        options.round_count = 50;
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_time_limit_bounds() {
        let mut options = Options {
            time_limit: Duration::from_secs(2),
            ..Options::default()
        };
        assert!(options.validate().is_err());

        options.time_limit = Duration::from_secs(61);
        assert!(options.validate().is_err());

        options.time_limit = Duration::from_secs(3);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_time_limit_bounds_are_exact() {
        assert!(validate_time_limit(&Duration::from_secs(60)).is_ok());
        assert!(validate_time_limit(&Duration::from_millis(60_001)).is_err());
        assert!(validate_time_limit(&Duration::from_millis(60_999)).is_err());
        assert!(validate_time_limit(&Duration::from_millis(2_999)).is_err());
        assert!(validate_time_limit(&Duration::from_millis(3_000)).is_ok());
    }

    #[test]
    fn test_validate_duration_message() {
        let err = validate_time_limit(&Duration::from_secs(100)).unwrap_err();
        assert!(err.to_string().contains("time_limit"));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let options: Options = serde_json::from_str(r#"{"round_count": 3, "time_limit": 5000}"#)
            .expect("valid options");
        assert_eq!(options.round_count, 3);
        assert_eq!(options.time_limit, Duration::from_secs(5));
        assert_eq!(options.difficulty, Difficulty::Normal);
        assert!(options.seed.is_none());
    }

    #[test]
    fn test_seeded_rng_is_reproducible() {
        let options = Options {
            seed: Some(42),
            ..Options::default()
        };
        let mut a = options.rng();
        let mut b = options.rng();
        assert_eq!(a.u64(..), b.u64(..));
    }

    #[test]
    fn test_difficulty_scales_operands() {
        assert!(Difficulty::Easy.max_operand() < Difficulty::Normal.max_operand());
        assert!(Difficulty::Normal.max_operand() < Difficulty::Hard.max_operand());
        assert!(Difficulty::Easy.max_factor() < Difficulty::Hard.max_factor());
    }
}
