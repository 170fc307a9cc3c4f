//! # QuickThinker
//!
//! The engine behind a timed quiz round game. A session plays a fixed
//! number of short rounds (speed arithmetic, logic multiple choice, odd
//! one out) under a per-round countdown, scores each answer by
//! correctness and elapsed time, and ends with a qualitative summary.
//!
//! The engine is host-driven: the host delivers player commands and
//! countdown alarms, and receives display updates through a
//! [`session::Tunnel`].

#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::similar_names)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::struct_field_names)]
#![allow(clippy::doc_markdown)]
use serde::Serialize;

pub mod config;
pub mod constants;
pub mod game;
pub mod generator;
pub mod round;
pub mod session;
pub mod summary;
pub mod timer;

/// Messages sent to update the view as the game progresses
///
/// Update messages describe a single change, such as a new round, a
/// countdown tick, or a recorded result.
#[derive(Debug, Serialize, Clone, derive_more::From)]
pub enum UpdateMessage {
    /// Session lifecycle updates
    Game(game::UpdateMessage),
    /// Countdown updates
    Timer(timer::UpdateMessage),
}

impl UpdateMessage {
    /// Converts the update message to a JSON string for transmission
    ///
    /// # Panics
    ///
    /// This method panics if serialization fails, which should never happen
    /// with the default JSON serializer for well-formed data.
    pub fn to_message(&self) -> String {
        serde_json::to_string(self).expect("default serializer cannot fail")
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_countdown_converts_and_serializes() {
        let message: UpdateMessage = timer::UpdateMessage::Countdown {
            index: 2,
            remaining: Duration::from_millis(4_300),
        }
        .into();

        assert!(matches!(message, UpdateMessage::Timer(_)));
        assert_eq!(
            message.to_message(),
            r#"{"Timer":{"Countdown":{"index":2,"remaining":4300}}}"#
        );
    }

    #[test]
    fn test_outcome_serializes_result() {
        let message: UpdateMessage = game::UpdateMessage::RoundOutcome {
            result: game::RoundResult::new(1, true, Duration::from_millis(1_500)),
            answer: Some("7".to_owned()),
            score: 2,
        }
        .into();

        let json: serde_json::Value = serde_json::from_str(&message.to_message()).unwrap();
        let outcome = &json["Game"]["RoundOutcome"];
        assert_eq!(outcome["result"]["round_index"], 1);
        assert_eq!(outcome["result"]["correct"], true);
        assert_eq!(outcome["result"]["time_taken"], 1500);
        assert_eq!(outcome["answer"], "7");
        assert_eq!(outcome["score"], 2);
    }

    #[test]
    fn test_missing_answer_is_skipped() {
        let message: UpdateMessage = game::UpdateMessage::RoundOutcome {
            result: game::RoundResult::new(0, false, Duration::ZERO),
            answer: None,
            score: 0,
        }
        .into();

        assert!(!message.to_message().contains("answer"));
    }
}
