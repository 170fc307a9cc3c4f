//! Challenge rounds
//!
//! A round is one timed challenge shown to the player. Every round wraps
//! a closed [`Challenge`] variant, so consumers match exhaustively over
//! the supported kinds. Rounds are created once, at session start, and
//! never change afterwards.
//!
//! Rounds can also be loaded from a JSON deck with [`parse_deck`]. Deck
//! entries whose `kind` is not recognised deserialize to
//! [`Challenge::Unsupported`] and are skipped during play.

use std::{collections::HashSet, time::Duration};

use enum_map::Enum;
use garde::Validate;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use thiserror::Error;

pub mod logic_mcq;
pub mod odd_one_out;
pub mod speed_math;

pub use logic_mcq::LogicMcq;
pub use odd_one_out::{OddOneOut, OddOption};
pub use speed_math::{Operator, SpeedMath};

/// Errors raised when a round breaks its invariants or a deck cannot be loaded
#[derive(Debug, Error)]
pub enum Error {
    /// The recorded answer does not appear among the options
    #[error("answer {0:?} is not among the options")]
    AnswerMissing(String),
    /// An option identity appears more than once
    #[error("option {0:?} is listed more than once")]
    DuplicateOption(String),
    /// An odd-one-out round must flag exactly one option
    #[error("expected exactly one odd option, found {0}")]
    OddCount(usize),
    /// A speed math answer disagrees with its operands
    #[error("{left} {operator} {right} is not {answer}")]
    WrongArithmetic {
        /// Left operand
        left: u32,
        /// Operator applied
        operator: Operator,
        /// Right operand
        right: u32,
        /// The recorded answer
        answer: String,
    },
    /// A round failed field validation
    #[error("round {index} is invalid: {report}")]
    Validation {
        /// Position of the round in the deck
        index: usize,
        /// The validation report
        report: garde::Report,
    },
    /// A round broke one of its invariants
    #[error("round {index}: {source}")]
    Invariant {
        /// Position of the round in the deck
        index: usize,
        /// The broken invariant
        source: Box<Error>,
    },
    /// The deck has no rounds at all
    #[error("deck is empty")]
    EmptyDeck,
    /// The deck is not valid JSON for a list of rounds
    #[error("deck could not be parsed: {0}")]
    Parse(#[from] serde_json::Error),
}

/// The kinds of challenge a round can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Enum)]
#[serde(rename_all = "kebab-case")]
pub enum RoundKind {
    /// Mental arithmetic against the clock
    SpeedMath,
    /// A multiple choice reasoning question
    LogicMcq,
    /// Spot the item that belongs to a different category
    OddOneOut,
    /// A deck entry of a kind this engine does not play
    Unsupported,
}

/// Kind-specific payload of a round
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Challenge {
    /// Arithmetic with generated distractors
    SpeedMath(#[garde(dive)] SpeedMath),
    /// Multiple choice question
    LogicMcq(#[garde(dive)] LogicMcq),
    /// Odd-one-out puzzle
    OddOneOut(#[garde(dive)] OddOneOut),
    /// Unknown kind, completed as incorrect without being shown
    #[serde(other)]
    Unsupported,
}

/// Validates an optional per-round time limit
fn validate_optional_time_limit(val: &Option<Duration>, _ctx: &()) -> garde::Result {
    match val {
        Some(limit) => crate::config::validate_time_limit(limit),
        None => Ok(()),
    }
}

/// One timed challenge
#[serde_with::serde_as]
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Round {
    /// Overrides the session time limit for this round
    #[garde(custom(validate_optional_time_limit))]
    #[serde_as(as = "Option<serde_with::DurationMilliSeconds<u64>>")]
    time_limit: Option<Duration>,
    /// The challenge itself
    #[garde(dive)]
    challenge: Challenge,
}

/// A selectable option as presented to the player
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct OptionView {
    /// Value submitted when this option is chosen
    pub id: String,
    /// Text shown to the player
    pub label: String,
}

/// The player-facing rendering of a round, without the answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoundView {
    /// Kind of the round
    pub kind: RoundKind,
    /// Question text
    pub question: String,
    /// Options in presentation order
    pub options: Vec<OptionView>,
}

impl From<Challenge> for Round {
    fn from(challenge: Challenge) -> Self {
        Self {
            time_limit: None,
            challenge,
        }
    }
}

impl From<SpeedMath> for Round {
    fn from(value: SpeedMath) -> Self {
        Challenge::SpeedMath(value).into()
    }
}

impl From<LogicMcq> for Round {
    fn from(value: LogicMcq) -> Self {
        Challenge::LogicMcq(value).into()
    }
}

impl From<OddOneOut> for Round {
    fn from(value: OddOneOut) -> Self {
        Challenge::OddOneOut(value).into()
    }
}

impl Round {
    /// Sets a time limit for this round only
    #[must_use]
    pub fn with_time_limit(mut self, time_limit: Duration) -> Self {
        self.time_limit = Some(time_limit);
        self
    }

    /// Returns the challenge payload
    pub fn challenge(&self) -> &Challenge {
        &self.challenge
    }

    /// Returns the kind of this round
    pub fn kind(&self) -> RoundKind {
        match &self.challenge {
            Challenge::SpeedMath(_) => RoundKind::SpeedMath,
            Challenge::LogicMcq(_) => RoundKind::LogicMcq,
            Challenge::OddOneOut(_) => RoundKind::OddOneOut,
            Challenge::Unsupported => RoundKind::Unsupported,
        }
    }

    /// Returns the time limit of this round, falling back to `default`
    pub fn time_limit_or(&self, default: Duration) -> Duration {
        self.time_limit.unwrap_or(default)
    }

    /// Returns the correct answer, in the same representation as the option ids
    pub fn answer(&self) -> Option<&str> {
        match &self.challenge {
            Challenge::SpeedMath(s) => Some(s.answer()),
            Challenge::LogicMcq(l) => Some(l.answer()),
            Challenge::OddOneOut(o) => Some(o.answer()),
            Challenge::Unsupported => None,
        }
    }

    /// Returns the identities of the options in presentation order
    pub fn option_ids(&self) -> Vec<&str> {
        match &self.challenge {
            Challenge::SpeedMath(s) => s.options().iter().map(String::as_str).collect_vec(),
            Challenge::LogicMcq(l) => l.options().iter().map(String::as_str).collect_vec(),
            Challenge::OddOneOut(o) => o.options().iter().map(|o| o.id.as_str()).collect_vec(),
            Challenge::Unsupported => Vec::new(),
        }
    }

    /// Checks whether `choice` is the correct answer
    pub fn is_correct(&self, choice: &str) -> bool {
        self.answer() == Some(choice)
    }

    /// Renders the round for display, hiding which option is correct
    pub fn view(&self) -> RoundView {
        let (question, options) = match &self.challenge {
            Challenge::SpeedMath(s) => (
                s.question(),
                s.options()
                    .iter()
                    .map(|o| OptionView {
                        id: o.clone(),
                        label: o.clone(),
                    })
                    .collect_vec(),
            ),
            Challenge::LogicMcq(l) => (
                l.question().to_owned(),
                l.options()
                    .iter()
                    .map(|o| OptionView {
                        id: o.clone(),
                        label: o.clone(),
                    })
                    .collect_vec(),
            ),
            Challenge::OddOneOut(o) => (
                o.question().to_owned(),
                o.options()
                    .iter()
                    .map(|o| OptionView {
                        id: o.id.clone(),
                        label: o.label.clone(),
                    })
                    .collect_vec(),
            ),
            Challenge::Unsupported => (String::new(), Vec::new()),
        };

        RoundView {
            kind: self.kind(),
            question,
            options,
        }
    }

    /// Checks the round invariants: the answer is listed, options are
    /// unique, and the kind-specific rules hold
    ///
    /// # Errors
    ///
    /// Returns the first broken invariant found.
    pub fn check(&self) -> Result<(), Error> {
        let Some(answer) = self.answer() else {
            return Ok(());
        };

        let ids = self.option_ids();
        check_unique(&ids)?;
        if !ids.contains(&answer) {
            return Err(Error::AnswerMissing(answer.to_owned()));
        }

        match &self.challenge {
            Challenge::SpeedMath(s) => s.check(),
            Challenge::OddOneOut(o) => o.check(),
            Challenge::LogicMcq(_) | Challenge::Unsupported => Ok(()),
        }
    }
}

/// Fails on the first option identity that appears twice
fn check_unique(ids: &[&str]) -> Result<(), Error> {
    let mut seen = HashSet::new();
    match ids.iter().find(|id| !seen.insert(**id)) {
        Some(duplicate) => Err(Error::DuplicateOption((*duplicate).to_owned())),
        None => Ok(()),
    }
}

/// Validates every round of a deck
///
/// # Errors
///
/// Returns [`Error::EmptyDeck`] for an empty deck, otherwise the first
/// round failing validation or its invariants, tagged with its position.
pub fn validate_deck(deck: &[Round]) -> Result<(), Error> {
    if deck.is_empty() {
        return Err(Error::EmptyDeck);
    }

    for (index, round) in deck.iter().enumerate() {
        round
            .validate()
            .map_err(|report| Error::Validation { index, report })?;
        round.check().map_err(|source| Error::Invariant {
            index,
            source: Box::new(source),
        })?;
    }

    Ok(())
}

/// Parses and validates a JSON deck of rounds
///
/// # Errors
///
/// Returns [`Error::Parse`] for malformed JSON and any error from
/// [`validate_deck`].
pub fn parse_deck(json: &str) -> Result<Vec<Round>, Error> {
    let deck: Vec<Round> = serde_json::from_str(json)?;
    validate_deck(&deck)?;
    Ok(deck)
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    const DECK: &str = r#"[
        {
            "challenge": {
                "kind": "speed-math",
                "left": 3,
                "right": 4,
                "operator": "add",
                "options": ["5", "7", "8", "9"],
                "answer": "7"
            }
        },
        {
            "time_limit": 5000,
            "challenge": {
                "kind": "logic-mcq",
                "question": "Which number comes next: 2, 4, 8, 16?",
                "options": ["18", "24", "32", "20"],
                "answer": "32"
            }
        },
        {
            "challenge": {
                "kind": "memory-match",
                "pairs": 6
            }
        }
    ]"#;

    fn logic_round() -> Round {
        LogicMcq::new(
            "Pick the vowel",
            vec!["b".to_owned(), "a".to_owned(), "c".to_owned()],
            "a",
        )
        .into()
    }

    #[test]
    fn test_parse_deck() {
        let deck = parse_deck(DECK).expect("deck is valid");
        assert_eq!(deck.len(), 3);
        assert_eq!(deck[0].kind(), RoundKind::SpeedMath);
        assert_eq!(deck[1].kind(), RoundKind::LogicMcq);
        assert_eq!(deck[2].kind(), RoundKind::Unsupported);
        assert_eq!(
            deck[1].time_limit_or(Duration::from_secs(10)),
            Duration::from_secs(5)
        );
        assert_eq!(
            deck[0].time_limit_or(Duration::from_secs(10)),
            Duration::from_secs(10)
        );
    }

    #[test]
    fn test_parse_deck_rejects_garbage() {
        assert!(matches!(parse_deck("{"), Err(Error::Parse(_))));
        assert!(matches!(parse_deck("[]"), Err(Error::EmptyDeck)));
    }

    #[test]
    fn test_parse_deck_rejects_missing_answer() {
        let json = r#"[{"challenge": {"kind": "logic-mcq", "question": "q",
            "options": ["a", "b"], "answer": "c"}}]"#;
        let err = parse_deck(json).unwrap_err();
        assert!(matches!(err, Error::Invariant { index: 0, .. }));
        assert!(err.to_string().contains("not among the options"));
    }

    #[test]
    fn test_parse_deck_rejects_bad_time_limit() {
        let json = r#"[{"time_limit": 500, "challenge": {"kind": "logic-mcq",
            "question": "q", "options": ["a", "b"], "answer": "a"}}]"#;
        assert!(matches!(
            parse_deck(json),
            Err(Error::Validation { index: 0, .. })
        ));
    }

    #[test]
    fn test_check_duplicate_options() {
        let round: Round = LogicMcq::new(
            "q",
            vec!["a".to_owned(), "a".to_owned(), "b".to_owned()],
            "a",
        )
        .into();
        assert!(matches!(round.check(), Err(Error::DuplicateOption(d)) if d == "a"));
    }

    #[test]
    fn test_is_correct_and_answer() {
        let round = logic_round();
        assert_eq!(round.answer(), Some("a"));
        assert!(round.is_correct("a"));
        assert!(!round.is_correct("b"));
        assert!(!round.is_correct("A"));
    }

    #[test]
    fn test_view_hides_nothing_but_answer() {
        let round = logic_round();
        let view = round.view();
        assert_eq!(view.kind, RoundKind::LogicMcq);
        assert_eq!(view.question, "Pick the vowel");
        assert_eq!(
            view.options.iter().map(|o| o.id.as_str()).collect_vec(),
            round.option_ids()
        );
        let json = serde_json::to_string(&view).unwrap();
        assert!(!json.contains("answer"));
    }

    #[test]
    fn test_unsupported_round() {
        let round: Round = Challenge::Unsupported.into();
        assert_eq!(round.kind(), RoundKind::Unsupported);
        assert!(round.answer().is_none());
        assert!(round.option_ids().is_empty());
        assert!(!round.is_correct(""));
        assert!(round.check().is_ok());
    }

    #[test]
    fn test_with_time_limit() {
        let round = logic_round().with_time_limit(Duration::from_secs(4));
        assert_eq!(
            round.time_limit_or(Duration::from_secs(10)),
            Duration::from_secs(4)
        );
        assert!(round.validate().is_ok());
    }
}
