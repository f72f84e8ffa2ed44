//! Deck generation. Externally pluggable per the spec; this module supplies
//! the trait boundary plus the shuffle-backed default used by the demo binary
//! and the tests.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::model::Card;

/// Produces the initial, ordered pool of cards the dealer draws from.
/// Implementations decide ordering (e.g. shuffled, or fixed for a
/// deterministic test) but must return exactly `deck_size` distinct ids in
/// `[0, deck_size)`.
pub trait DeckGenerator: Send + Sync {
    fn generate(&self, deck_size: usize) -> Vec<Card>;
}

/// `0..deck_size`, shuffled with `rand`. Optionally seeded for reproducible
/// demo runs and tests.
pub struct ShuffledDeckGenerator {
    seed: Option<u64>,
}

impl ShuffledDeckGenerator {
    pub fn new(seed: Option<u64>) -> Self {
        Self { seed }
    }
}

impl DeckGenerator for ShuffledDeckGenerator {
    fn generate(&self, deck_size: usize) -> Vec<Card> {
        let mut deck: Vec<Card> = (0..deck_size as Card).collect();
        match self.seed {
            Some(seed) => deck.shuffle(&mut StdRng::seed_from_u64(seed)),
            None => deck.shuffle(&mut rand::thread_rng()),
        }
        deck
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_every_card_exactly_once() {
        let gen = ShuffledDeckGenerator::new(Some(7));
        let mut deck = gen.generate(81);
        deck.sort();
        let expected: Vec<Card> = (0..81).collect();
        assert_eq!(deck, expected);
    }

    #[test]
    fn same_seed_is_deterministic() {
        let a = ShuffledDeckGenerator::new(Some(42)).generate(81);
        let b = ShuffledDeckGenerator::new(Some(42)).generate(81);
        assert_eq!(a, b);
    }
}
