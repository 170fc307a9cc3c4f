//! Round generation
//!
//! The generator builds a pool of candidate rounds holding every
//! supported kind, shuffles it, and takes as many rounds as the session
//! needs. When the session is longer than the pool, the shuffled pool is
//! cycled.

use itertools::Itertools;
use tracing::debug;

use crate::{
    config::{Difficulty, Options},
    round::{LogicMcq, OddOneOut, Operator, Round, SpeedMath},
};

/// Speed math candidates generated per operator
const SPEED_MATH_PER_OPERATOR: usize = 2;
/// Odd-one-out candidates in the built-in pool
const ODD_ONE_OUT_CANDIDATES: usize = 4;

/// Shuffles `items` in place with a uniform random permutation
///
/// Durstenfeld's variant of Fisher-Yates: walking from the last index
/// down to 1, each element is swapped with a uniformly chosen element at
/// an index no greater than its own.
pub fn shuffle<T>(items: &mut [T], rng: &mut fastrand::Rng) {
    for i in (1..items.len()).rev() {
        let j = rng.usize(..=i);
        items.swap(i, j);
    }
}

/// Produces the round list of a session
#[derive(Debug)]
pub struct Generator {
    rng: fastrand::Rng,
    difficulty: Difficulty,
    /// Replaces the built-in pool when set
    deck: Option<Vec<Round>>,
}

impl Generator {
    /// Creates a generator drawing from the built-in pool
    pub fn new(options: &Options) -> Self {
        Self {
            rng: options.rng(),
            difficulty: options.difficulty,
            deck: None,
        }
    }

    /// Creates a generator drawing from a fixed deck
    ///
    /// The deck is expected to be validated already, see
    /// [`validate_deck`](crate::round::validate_deck).
    pub fn with_deck(options: &Options, deck: Vec<Round>) -> Self {
        Self {
            deck: Some(deck),
            ..Self::new(options)
        }
    }

    /// Builds a fresh candidate pool
    ///
    /// The built-in pool holds speed math rounds for every operator, the
    /// whole logic question bank, and a few odd-one-out puzzles.
    pub fn candidate_pool(&mut self) -> Vec<Round> {
        if let Some(deck) = &self.deck {
            return deck.clone();
        }

        let difficulty = self.difficulty;
        let rng = &mut self.rng;

        let speed_math = [Operator::Add, Operator::Subtract, Operator::Multiply]
            .into_iter()
            .flat_map(|operator| std::iter::repeat_n(operator, SPEED_MATH_PER_OPERATOR))
            .map(|operator| Round::from(SpeedMath::with_operator(operator, difficulty, rng)))
            .collect_vec();

        let logic = LogicMcq::bank(rng).into_iter().map(Round::from).collect_vec();

        let odd_one_out = (0..ODD_ONE_OUT_CANDIDATES)
            .map(|_| Round::from(OddOneOut::random(rng)))
            .collect_vec();

        speed_math
            .into_iter()
            .chain(logic)
            .chain(odd_one_out)
            .collect_vec()
    }

    /// Generates `count` rounds from a fresh candidate pool
    pub fn generate_rounds(&mut self, count: usize) -> Vec<Round> {
        let pool = self.candidate_pool();
        self.rounds_from_pool(pool, count)
    }

    /// Shuffles `pool` and takes `count` rounds from it, cycling when
    /// the pool is shorter than `count`
    pub fn rounds_from_pool(&mut self, mut pool: Vec<Round>, count: usize) -> Vec<Round> {
        shuffle(&mut pool, &mut self.rng);

        debug!(pool = pool.len(), count, "drawing rounds");

        pool.iter().cycle().take(count).cloned().collect_vec()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::round::{Challenge, RoundKind};
    use std::collections::HashSet;

    fn seeded(seed: u64) -> Generator {
        Generator::new(&Options {
            seed: Some(seed),
            ..Options::default()
        })
    }

    #[test]
    fn test_shuffle_is_a_permutation() {
        let mut rng = fastrand::Rng::with_seed(17);
        let mut items = (0..50).collect_vec();
        shuffle(&mut items, &mut rng);
        assert_eq!(items.iter().copied().sorted().collect_vec(), (0..50).collect_vec());
    }

    #[test]
    fn test_shuffle_handles_tiny_slices() {
        let mut rng = fastrand::Rng::with_seed(17);
        let mut empty: [u8; 0] = [];
        shuffle(&mut empty, &mut rng);
        let mut one = [1];
        shuffle(&mut one, &mut rng);
        assert_eq!(one, [1]);
    }

    #[test]
    fn test_shuffle_reaches_every_position() {
        let mut rng = fastrand::Rng::with_seed(3);
        let mut first_positions = HashSet::new();
        for _ in 0..500 {
            let mut items = [0, 1, 2, 3];
            shuffle(&mut items, &mut rng);
            first_positions.insert(items[0]);
        }
        assert_eq!(first_positions.len(), 4);
    }

    #[test]
    fn test_pool_holds_every_kind() {
        let pool = seeded(1).candidate_pool();
        let kinds: HashSet<_> = pool.iter().map(Round::kind).collect();
        assert!(kinds.contains(&RoundKind::SpeedMath));
        assert!(kinds.contains(&RoundKind::LogicMcq));
        assert!(kinds.contains(&RoundKind::OddOneOut));
        assert!(!kinds.contains(&RoundKind::Unsupported));
    }

    #[test]
    fn test_generate_rounds_exact_count_and_invariants() {
        let mut generator = seeded(5);
        for count in [1, 2, 7, 10, 18, 19, 50] {
            let rounds = generator.generate_rounds(count);
            assert_eq!(rounds.len(), count);
            for round in &rounds {
                assert!(round.check().is_ok(), "{round:?}");
                let answer = round.answer().expect("generated rounds have answers");
                assert_eq!(round.option_ids().iter().filter(|id| **id == answer).count(), 1);
            }
        }
    }

    #[test]
    fn test_cycling_repeats_the_pool_in_order() {
        let mut generator = seeded(9);
        let pool = generator.candidate_pool();
        let pool_len = pool.len();
        let rounds = generator.rounds_from_pool(pool, pool_len * 2 + 1);

        assert_eq!(rounds.len(), pool_len * 2 + 1);
        for i in 0..pool_len {
            assert_eq!(rounds[i].view(), rounds[i + pool_len].view());
        }
        assert_eq!(rounds[0].view(), rounds[pool_len * 2].view());
    }

    #[test]
    fn test_first_pass_has_no_duplicates() {
        let mut generator = seeded(21);
        let pool = generator.candidate_pool();
        let pool_len = pool.len();
        let rounds = generator.rounds_from_pool(pool, pool_len);
        let questions: HashSet<_> = rounds.iter().map(|r| r.view()).map(|v| (v.question, v.options)).collect();
        assert_eq!(questions.len(), pool_len);
    }

    #[test]
    fn test_single_candidate_pool() {
        let mut rng = fastrand::Rng::with_seed(4);
        let pool = vec![Round::from(SpeedMath::new(3, 4, Operator::Add, &mut rng))];
        let rounds = seeded(4).rounds_from_pool(pool, 1);

        assert_eq!(rounds.len(), 1);
        let Challenge::SpeedMath(math) = rounds[0].challenge() else {
            panic!("expected a speed math round");
        };
        assert_eq!(math.answer(), "7");
        assert_eq!(math.options().len(), 4);
        assert!(math.options().iter().any(|o| o == "7"));
        let unique: HashSet<_> = math.options().iter().collect();
        assert_eq!(unique.len(), 4);
    }

    #[test]
    fn test_deck_generator_draws_from_deck() {
        let deck = vec![
            Round::from(LogicMcq::new("q1", vec!["a".to_owned(), "b".to_owned()], "a")),
            Round::from(LogicMcq::new("q2", vec!["c".to_owned(), "d".to_owned()], "d")),
        ];
        let mut generator = Generator::with_deck(&Options::default(), deck);
        let rounds = generator.generate_rounds(5);
        assert_eq!(rounds.len(), 5);
        assert!(
            rounds
                .iter()
                .all(|r| matches!(r.view().question.as_str(), "q1" | "q2"))
        );
    }

    #[test]
    fn test_seeded_generation_is_reproducible() {
        let a = seeded(77).generate_rounds(10);
        let b = seeded(77).generate_rounds(10);
        assert_eq!(
            a.iter().map(Round::view).collect_vec(),
            b.iter().map(Round::view).collect_vec()
        );
    }
}
