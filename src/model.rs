//! Core id types shared by the table, players and dealer.

/// Opaque card identifier in `[0, deck_size)`. Only the oracle interprets its features.
pub type Card = u32;

/// Fixed grid position in `[0, table_size)`.
pub type Slot = u32;

/// Stable identity for a seat at the table, human or AI.
pub type PlayerId = u32;

/// Outcome of a candidate set, as seen by the submitting player once the dealer
/// has arbitrated it. `Pending` is the value while a request is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Pending,
    Accepted,
    Rejected,
    /// Tokens backing the candidate were reaped by another player's acceptance
    /// before this request reached the front of the queue. No freeze follows.
    Invalidated,
}

impl Verdict {
    fn to_u8(self) -> u8 {
        match self {
            Verdict::Pending => 0,
            Verdict::Accepted => 1,
            Verdict::Rejected => 2,
            Verdict::Invalidated => 3,
        }
    }

    fn from_u8(v: u8) -> Self {
        match v {
            1 => Verdict::Accepted,
            2 => Verdict::Rejected,
            3 => Verdict::Invalidated,
            _ => Verdict::Pending,
        }
    }
}

use std::sync::atomic::{AtomicU8, Ordering};

/// An `AtomicU8`-backed cell for `Verdict`, so the dealer can publish a result
/// without taking a lock the waiting player might contend on.
#[derive(Debug, Default)]
pub struct VerdictCell(AtomicU8);

impl VerdictCell {
    pub fn new() -> Self {
        Self(AtomicU8::new(Verdict::Pending.to_u8()))
    }

    pub fn set(&self, verdict: Verdict) {
        self.0.store(verdict.to_u8(), Ordering::Release);
    }

    pub fn get(&self) -> Verdict {
        Verdict::from_u8(self.0.load(Ordering::Acquire))
    }
}
