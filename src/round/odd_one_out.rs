//! Odd-one-out rounds
//!
//! Three items share a category and one does not. The odd item is
//! flagged on its option, and the correct answer is always read back
//! from that flag after the options are shuffled.

use garde::Validate;
use heck::{ToSnakeCase, ToTitleCase};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use super::Error;
use crate::{constants, generator::shuffle};

/// Categorised items the generator draws from
///
/// Item names are unique across categories.
const CATEGORIES: &[(&str, &[&str])] = &[
    ("fruit", &["apple", "banana", "cherry", "grape", "mango", "pear"]),
    ("animal", &["tiger", "otter", "falcon", "wolf", "red panda", "koala"]),
    ("planet", &["mercury", "venus", "mars", "jupiter", "saturn", "neptune"]),
    ("instrument", &["violin", "trumpet", "cello", "flute", "drum", "harp"]),
    ("vehicle", &["bicycle", "tram", "canoe", "scooter", "truck", "glider"]),
];

const QUESTION: &str = "Which one does not belong?";

/// A single option of an odd-one-out round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct OddOption {
    /// Value submitted when this option is chosen
    #[garde(length(min = 1, max = constants::round::MAX_LABEL_LENGTH))]
    pub id: String,
    /// Text shown to the player
    #[garde(length(max = constants::round::MAX_LABEL_LENGTH))]
    pub label: String,
    /// Whether this is the item that does not belong
    #[garde(skip)]
    pub odd: bool,
}

impl OddOption {
    fn from_item(item: &str, odd: bool) -> Self {
        Self {
            id: item.to_snake_case(),
            label: item.to_title_case(),
            odd,
        }
    }
}

/// An odd-one-out challenge
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OddOneOut {
    #[garde(length(max = constants::round::MAX_QUESTION_LENGTH))]
    question: String,
    /// Category shared by every option except the odd one
    #[serde(default)]
    #[garde(length(max = constants::round::MAX_LABEL_LENGTH))]
    category: String,
    #[garde(
        length(min = constants::round::MIN_OPTION_COUNT, max = constants::round::MAX_OPTION_COUNT),
        dive
    )]
    options: Vec<OddOption>,
    #[garde(skip)]
    answer: String,
}

impl OddOneOut {
    /// Creates a round from the shared items and the odd item, then shuffles it
    pub fn new(category: &str, common: &[&str], odd: &str, rng: &mut fastrand::Rng) -> Self {
        let mut options = common
            .iter()
            .map(|item| OddOption::from_item(item, false))
            .chain(std::iter::once(OddOption::from_item(odd, true)))
            .collect_vec();
        shuffle(&mut options, rng);

        Self {
            question: QUESTION.to_owned(),
            category: category.to_owned(),
            answer: odd_id(&options).unwrap_or_default(),
            options,
        }
    }

    /// Draws a random round from the built-in categories
    pub fn random(rng: &mut fastrand::Rng) -> Self {
        let majority = rng.usize(..CATEGORIES.len());
        let minority = (majority + rng.usize(1..CATEGORIES.len())) % CATEGORIES.len();

        let (category, items) = CATEGORIES[majority];
        let mut common = items.to_vec();
        shuffle(&mut common, rng);
        common.truncate(constants::odd_one_out::MAJORITY_COUNT);

        let (_, odd_items) = CATEGORIES[minority];
        let odd = odd_items[rng.usize(..odd_items.len())];

        Self::new(category, &common, odd, rng)
    }

    /// Returns the question text
    pub fn question(&self) -> &str {
        &self.question
    }

    /// Returns the category the non-odd options share
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Returns the options in presentation order
    pub fn options(&self) -> &[OddOption] {
        &self.options
    }

    /// Returns the id of the odd option
    pub fn answer(&self) -> &str {
        &self.answer
    }

    /// Checks that exactly one option is odd and that it is the answer
    pub(super) fn check(&self) -> Result<(), Error> {
        let odd_count = self.options.iter().filter(|o| o.odd).count();
        if odd_count != 1 {
            return Err(Error::OddCount(odd_count));
        }
        match odd_id(&self.options) {
            Some(id) if id == self.answer => Ok(()),
            _ => Err(Error::AnswerMissing(self.answer.clone())),
        }
    }
}

/// Scans for the option flagged odd
fn odd_id(options: &[OddOption]) -> Option<String> {
    options.iter().find(|o| o.odd).map(|o| o.id.clone())
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_item_names_are_unique() {
        let all = CATEGORIES
            .iter()
            .flat_map(|(_, items)| items.iter())
            .collect_vec();
        let unique: HashSet<_> = all.iter().collect();
        assert_eq!(all.len(), unique.len());
    }

    #[test]
    fn test_answer_follows_odd_flag_after_shuffle() {
        for seed in 0..100 {
            let mut rng = fastrand::Rng::with_seed(seed);
            let round = OddOneOut::new("fruit", &["apple", "pear", "mango"], "red panda", &mut rng);

            assert_eq!(round.answer(), "red_panda");
            let odd = round.options().iter().filter(|o| o.odd).collect_vec();
            assert_eq!(odd.len(), 1);
            assert_eq!(odd[0].id, round.answer());
            assert_eq!(odd[0].label, "Red Panda");
            assert!(round.check().is_ok());
        }
    }

    #[test]
    fn test_random_rounds_hold_invariants() {
        let mut rng = fastrand::Rng::with_seed(2024);
        for _ in 0..200 {
            let round = OddOneOut::random(&mut rng);
            assert_eq!(round.options().len(), 4);
            assert!(round.check().is_ok());

            let ids: HashSet<_> = round.options().iter().map(|o| &o.id).collect();
            assert_eq!(ids.len(), 4);

            let (_, items) = CATEGORIES
                .iter()
                .find(|(name, _)| *name == round.category())
                .expect("category exists");
            for option in round.options() {
                let in_category = items.iter().any(|i| i.to_snake_case() == option.id);
                assert_eq!(in_category, !option.odd);
            }
        }
    }

    #[test]
    fn test_check_rejects_two_odd_options() {
        let mut rng = fastrand::Rng::with_seed(1);
        let mut round = OddOneOut::new("planet", &["mars", "venus", "saturn"], "cello", &mut rng);
        round.options[0].odd = true;
        round.options[1].odd = true;
        round.options[2].odd = false;
        round.options[3].odd = false;
        assert!(matches!(round.check(), Err(Error::OddCount(2))));
    }

    #[test]
    fn test_check_rejects_stale_answer() {
        let mut rng = fastrand::Rng::with_seed(1);
        let mut round = OddOneOut::new("planet", &["mars", "venus", "saturn"], "cello", &mut rng);
        round.answer = "mars".to_owned();
        assert!(matches!(round.check(), Err(Error::AnswerMissing(_))));
    }
}
