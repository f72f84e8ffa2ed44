//! Set-validity oracle. The spec treats this as an externally supplied, pure
//! collaborator; this module defines the trait boundary plus a default
//! generalized implementation so the crate is runnable without external
//! wiring.

use crate::model::Card;

/// A pure, side-effect-free predicate over card ids. Implementations must not
/// perform I/O or hold any lock — the table invokes this while its own
/// `cardsLock` is held (`hints`) or with a point-in-time snapshot of cards
/// (the dealer's verification path).
pub trait SetOracle: Send + Sync {
    /// Does this group of `feature_size` cards form a legal set?
    fn test_set(&self, cards: &[Card]) -> bool;

    /// Enumerate up to `max_count` legal sets among `cards`, most naturally
    /// in the order the naive triple-nested search encounters them.
    fn find_sets(&self, cards: &[Card], max_count: usize) -> Vec<Vec<Card>>;

    /// Decode each card into its feature digits, for diagnostics/tests.
    fn cards_to_features(&self, cards: &[Card]) -> Vec<Vec<u32>>;
}

/// Generalized Set-game oracle. Cards are `num_features`-digit base-`feature_size`
/// numerals; a group is legal iff, for every feature, the digits sum to zero
/// modulo `feature_size` — the usual "all same or all different" rule,
/// generalized to an arbitrary group size. With `feature_size == 3` and
/// `num_features == 4` this is exactly the classic 81-card game.
#[derive(Debug, Clone, Copy)]
pub struct FeatureOracle {
    feature_size: usize,
    num_features: u32,
}

impl FeatureOracle {
    /// `deck_size` must equal `feature_size.pow(num_features)`; `num_features`
    /// is the smallest value satisfying that equation, so the oracle can be
    /// built purely from the two configured sizes.
    pub fn new(feature_size: usize, deck_size: usize) -> Self {
        let mut num_features = 0u32;
        let mut capacity: usize = 1;
        while capacity < deck_size {
            capacity = capacity.saturating_mul(feature_size);
            num_features += 1;
        }
        debug_assert_eq!(
            capacity, deck_size,
            "deck_size must be feature_size^k for the generalized Set oracle"
        );
        Self {
            feature_size,
            num_features,
        }
    }

    fn digits(&self, card: Card) -> Vec<u32> {
        let mut n = card;
        let mut out = Vec::with_capacity(self.num_features as usize);
        for _ in 0..self.num_features {
            out.push(n % self.feature_size as u32);
            n /= self.feature_size as u32;
        }
        out
    }
}

impl SetOracle for FeatureOracle {
    fn test_set(&self, cards: &[Card]) -> bool {
        if cards.len() != self.feature_size {
            return false;
        }
        let digit_rows: Vec<Vec<u32>> = cards.iter().map(|&c| self.digits(c)).collect();
        for feature in 0..self.num_features as usize {
            let sum: u32 = digit_rows.iter().map(|row| row[feature]).sum();
            if sum % self.feature_size as u32 != 0 {
                return false;
            }
        }
        true
    }

    fn find_sets(&self, cards: &[Card], max_count: usize) -> Vec<Vec<Card>> {
        let mut found = Vec::new();
        if max_count == 0 || cards.len() < self.feature_size {
            return found;
        }
        let mut combo = vec![0usize; self.feature_size];
        fn recurse(
            oracle: &FeatureOracle,
            cards: &[Card],
            start: usize,
            depth: usize,
            combo: &mut Vec<usize>,
            found: &mut Vec<Vec<Card>>,
            max_count: usize,
        ) {
            if found.len() >= max_count {
                return;
            }
            if depth == combo.len() {
                let group: Vec<Card> = combo.iter().map(|&i| cards[i]).collect();
                if oracle.test_set(&group) {
                    found.push(group);
                }
                return;
            }
            for i in start..cards.len() {
                if found.len() >= max_count {
                    return;
                }
                combo[depth] = i;
                recurse(oracle, cards, i + 1, depth + 1, combo, found, max_count);
            }
        }
        recurse(self, cards, 0, 0, &mut combo, &mut found, max_count);
        found
    }

    fn cards_to_features(&self, cards: &[Card]) -> Vec<Vec<u32>> {
        cards.iter().map(|&c| self.digits(c)).collect()
    }
}
