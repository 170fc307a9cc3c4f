//! Speed math rounds
//!
//! Two operands, one operator, and four numeric options. The answer and
//! the options are stored as strings so a submitted choice compares
//! equal to the answer exactly when it names the same option.

use std::fmt::Display;

use garde::Validate;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use super::Error;
use crate::{config::Difficulty, constants, generator::shuffle};

/// Arithmetic operator of a speed math round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Operator {
    /// Addition
    Add,
    /// Subtraction
    Subtract,
    /// Multiplication
    Multiply,
}

impl Operator {
    const ALL: [Operator; 3] = [Operator::Add, Operator::Subtract, Operator::Multiply];

    /// Applies the operator to two operands
    pub fn apply(self, left: i64, right: i64) -> i64 {
        match self {
            Self::Add => left + right,
            Self::Subtract => left - right,
            Self::Multiply => left * right,
        }
    }

    /// Picks an operator uniformly at random
    pub fn random(rng: &mut fastrand::Rng) -> Self {
        Self::ALL[rng.usize(..Self::ALL.len())]
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "×",
        })
    }
}

/// A speed math challenge
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SpeedMath {
    #[garde(skip)]
    left: u32,
    #[garde(skip)]
    right: u32,
    #[garde(skip)]
    operator: Operator,
    /// Options in presentation order
    #[garde(
        length(min = constants::round::MIN_OPTION_COUNT, max = constants::round::MAX_OPTION_COUNT),
        inner(length(max = constants::round::MAX_LABEL_LENGTH))
    )]
    options: Vec<String>,
    #[garde(length(max = constants::round::MAX_LABEL_LENGTH))]
    answer: String,
}

impl SpeedMath {
    /// Creates a round for `left operator right` with shuffled distractors
    pub fn new(left: u32, right: u32, operator: Operator, rng: &mut fastrand::Rng) -> Self {
        let answer = operator.apply(i64::from(left), i64::from(right));

        let mut options = distractors(answer, rng);
        options.push(answer);
        shuffle(&mut options, rng);

        Self {
            left,
            right,
            operator,
            options: options.into_iter().map(|o| o.to_string()).collect_vec(),
            answer: answer.to_string(),
        }
    }

    /// Creates a random round with operands scaled by `difficulty`
    ///
    /// Subtraction keeps the larger operand on the left so answers stay
    /// non-negative.
    pub fn random(difficulty: Difficulty, rng: &mut fastrand::Rng) -> Self {
        Self::with_operator(Operator::random(rng), difficulty, rng)
    }

    /// Creates a random round for a fixed operator
    pub fn with_operator(operator: Operator, difficulty: Difficulty, rng: &mut fastrand::Rng) -> Self {
        let max = match operator {
            Operator::Add | Operator::Subtract => difficulty.max_operand(),
            Operator::Multiply => difficulty.max_factor(),
        };

        let a = rng.u32(1..=max);
        let b = rng.u32(1..=max);
        let (left, right) = match operator {
            Operator::Subtract => (a.max(b), a.min(b)),
            Operator::Add | Operator::Multiply => (a, b),
        };

        Self::new(left, right, operator, rng)
    }

    /// Returns the question text, e.g. `3 + 4 = ?`
    pub fn question(&self) -> String {
        format!("{} {} {} = ?", self.left, self.operator, self.right)
    }

    /// Returns the operands
    pub fn operands(&self) -> (u32, u32) {
        (self.left, self.right)
    }

    /// Returns the operator
    pub fn operator(&self) -> Operator {
        self.operator
    }

    /// Returns the options in presentation order
    pub fn options(&self) -> &[String] {
        &self.options
    }

    /// Returns the correct answer
    pub fn answer(&self) -> &str {
        &self.answer
    }

    /// Checks that the recorded answer is the result of the operation
    pub(super) fn check(&self) -> Result<(), Error> {
        let expected = self
            .operator
            .apply(i64::from(self.left), i64::from(self.right));
        if expected.to_string() == self.answer {
            Ok(())
        } else {
            Err(Error::WrongArithmetic {
                left: self.left,
                operator: self.operator,
                right: self.right,
                answer: self.answer.clone(),
            })
        }
    }
}

/// Synthesizes the distractors for `answer`
///
/// Distractors are distinct from the answer and from each other, drawn
/// within 20% of the answer's magnitude (never closer than
/// [`MIN_SPREAD`](constants::speed_math::MIN_SPREAD)). Non-negative
/// answers only get non-negative distractors. After a bounded number of
/// random draws the remaining slots are filled with incremental offsets
/// `+1, -1, +2, -2, ...`, so this always succeeds.
pub fn distractors(answer: i64, rng: &mut fastrand::Rng) -> Vec<i64> {
    use constants::speed_math::{
        DISTRACTOR_COUNT, MAX_DISTRACTOR_ATTEMPTS, MIN_SPREAD, SPREAD_DIVISOR,
    };

    let spread = (answer.abs() / SPREAD_DIVISOR).max(MIN_SPREAD);
    let mut chosen = Vec::with_capacity(DISTRACTOR_COUNT + 1);

    for _ in 0..MAX_DISTRACTOR_ATTEMPTS {
        if chosen.len() == DISTRACTOR_COUNT {
            return chosen;
        }
        let candidate = answer + rng.i64(-spread..=spread);
        if is_acceptable(answer, candidate, &chosen) {
            chosen.push(candidate);
        }
    }

    fill_with_offsets(answer, &mut chosen);
    chosen
}

/// Whether `candidate` can join `chosen` as a distractor for `answer`
fn is_acceptable(answer: i64, candidate: i64, chosen: &[i64]) -> bool {
    candidate != answer && !chosen.contains(&candidate) && (answer < 0 || candidate >= 0)
}

/// Tops `chosen` up to the distractor count with the nearest acceptable
/// offsets from `answer`, tried in the order `+1, -1, +2, -2, ...`
fn fill_with_offsets(answer: i64, chosen: &mut Vec<i64>) {
    use constants::speed_math::DISTRACTOR_COUNT;

    for offset in (1..).flat_map(|step: i64| [step, -step]) {
        if chosen.len() >= DISTRACTOR_COUNT {
            break;
        }
        let candidate = answer + offset;
        if is_acceptable(answer, candidate, chosen) {
            chosen.push(candidate);
        }
    }
}
