//! Logic multiple choice rounds

use garde::Validate;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{constants, generator::shuffle};

/// Built-in questions: text, options, and the correct option
const BANK: &[(&str, &[&str], &str)] = &[
    (
        "Which number comes next: 2, 4, 8, 16, ...?",
        &["24", "32", "18", "20"],
        "32",
    ),
    (
        "If all bloops are razzies and all razzies are lazzies, are all bloops lazzies?",
        &["Yes", "No", "Only some", "Cannot tell"],
        "Yes",
    ),
    (
        "A bat and a ball cost 1.10 in total. The bat costs 1.00 more than the ball. How much is the ball?",
        &["0.10", "0.05", "0.15", "1.00"],
        "0.05",
    ),
    (
        "Which word does not fit: north, south, river, west?",
        &["north", "south", "river", "west"],
        "river",
    ),
    (
        "How many months have 28 days?",
        &["1", "2", "6", "12"],
        "12",
    ),
    (
        "Tom is taller than Ann. Ann is taller than Bob. Who is the shortest?",
        &["Tom", "Ann", "Bob", "Cannot tell"],
        "Bob",
    ),
    (
        "Which number comes next: 1, 1, 2, 3, 5, 8, ...?",
        &["11", "12", "13", "15"],
        "13",
    ),
    (
        "If today is Monday, what day is it 10 days from now?",
        &["Wednesday", "Thursday", "Friday", "Sunday"],
        "Thursday",
    ),
];

/// A multiple choice challenge with one designated correct option
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LogicMcq {
    #[garde(length(min = 1, max = constants::round::MAX_QUESTION_LENGTH))]
    question: String,
    #[garde(
        length(min = constants::round::MIN_OPTION_COUNT, max = constants::round::MAX_OPTION_COUNT),
        inner(length(min = 1, max = constants::round::MAX_LABEL_LENGTH))
    )]
    options: Vec<String>,
    #[garde(skip)]
    answer: String,
}

impl LogicMcq {
    /// Creates a question with options kept in the given order
    pub fn new(question: impl Into<String>, options: Vec<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            options,
            answer: answer.into(),
        }
    }

    /// Returns every built-in question, each with its options shuffled
    pub fn bank(rng: &mut fastrand::Rng) -> Vec<Self> {
        BANK.iter()
            .map(|(question, options, answer)| {
                let mut options = options.iter().map(|o| (*o).to_owned()).collect_vec();
                shuffle(&mut options, rng);
                Self::new(*question, options, *answer)
            })
            .collect_vec()
    }

    /// Returns the question text
    pub fn question(&self) -> &str {
        &self.question
    }

    /// Returns the options in presentation order
    pub fn options(&self) -> &[String] {
        &self.options
    }

    /// Returns the correct option
    pub fn answer(&self) -> &str {
        &self.answer
    }
}
