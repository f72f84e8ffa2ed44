//! UI sink. Externally pluggable per the spec: the table, player and dealer
//! only depend on the trait, never on a concrete renderer. This module also
//! supplies a default implementation that routes every call through
//! `tracing`, so the crate is observable without a real UI attached.

use crate::model::{Card, PlayerId, Slot};

const LOG_TARGET: &str = "ui";

/// Every call may arrive from any worker and must be internally thread-safe.
/// Ordering of calls from a single emitter (e.g. the dealer's countdown
/// ticks) is preserved by the emitter's own serialization, not by this trait.
pub trait UiSink: Send + Sync {
    fn place_card(&self, card: Card, slot: Slot);
    fn remove_card(&self, slot: Slot);
    fn place_token(&self, player: PlayerId, slot: Slot);
    fn remove_token(&self, player: PlayerId, slot: Slot);
    fn set_score(&self, player: PlayerId, score: u64);
    fn set_freeze(&self, player: PlayerId, millis_remaining: u64);
    fn set_countdown(&self, millis_remaining: u64, warning: bool);
    fn announce_winner(&self, player_ids: &[PlayerId]);
}

/// Default sink: every event becomes a structured `tracing` call.
#[derive(Debug, Default)]
pub struct TracingUiSink;

impl UiSink for TracingUiSink {
    fn place_card(&self, card: Card, slot: Slot) {
        tracing::debug!(target: LOG_TARGET, card, slot, "place_card");
    }

    fn remove_card(&self, slot: Slot) {
        tracing::debug!(target: LOG_TARGET, slot, "remove_card");
    }

    fn place_token(&self, player: PlayerId, slot: Slot) {
        tracing::debug!(target: LOG_TARGET, player, slot, "place_token");
    }

    fn remove_token(&self, player: PlayerId, slot: Slot) {
        tracing::debug!(target: LOG_TARGET, player, slot, "remove_token");
    }

    fn set_score(&self, player: PlayerId, score: u64) {
        tracing::info!(target: LOG_TARGET, player, score, "set_score");
    }

    fn set_freeze(&self, player: PlayerId, millis_remaining: u64) {
        tracing::debug!(target: LOG_TARGET, player, millis_remaining, "set_freeze");
    }

    fn set_countdown(&self, millis_remaining: u64, warning: bool) {
        tracing::trace!(
            target: LOG_TARGET,
            millis_remaining,
            warning,
            "set_countdown"
        );
    }

    fn announce_winner(&self, player_ids: &[PlayerId]) {
        tracing::info!(target: LOG_TARGET, ?player_ids, "announce_winner");
    }
}

/// A no-op sink, useful for tests that only care about `Table`/`Dealer`
/// invariants and would otherwise drown in trace noise.
#[derive(Debug, Default)]
pub struct NullUiSink;

impl UiSink for NullUiSink {
    fn place_card(&self, _card: Card, _slot: Slot) {}
    fn remove_card(&self, _slot: Slot) {}
    fn place_token(&self, _player: PlayerId, _slot: Slot) {}
    fn remove_token(&self, _player: PlayerId, _slot: Slot) {}
    fn set_score(&self, _player: PlayerId, _score: u64) {}
    fn set_freeze(&self, _player: PlayerId, _millis_remaining: u64) {}
    fn set_countdown(&self, _millis_remaining: u64, _warning: bool) {}
    fn announce_winner(&self, _player_ids: &[PlayerId]) {}
}

/// A terminal-friendly renderer for the demo binary: plain lines on stdout
/// rather than structured log events. Countdown ticks are deliberately not
/// printed per-call here (they would flood the terminal); only the warning
/// transition is.
#[derive(Debug, Default)]
pub struct StdoutUiSink;

impl UiSink for StdoutUiSink {
    fn place_card(&self, card: Card, slot: Slot) {
        println!("slot {slot}: card {card} placed");
    }

    fn remove_card(&self, slot: Slot) {
        println!("slot {slot}: card removed");
    }

    fn place_token(&self, player: PlayerId, slot: Slot) {
        println!("player {player}: token placed on slot {slot}");
    }

    fn remove_token(&self, player: PlayerId, slot: Slot) {
        println!("player {player}: token removed from slot {slot}");
    }

    fn set_score(&self, player: PlayerId, score: u64) {
        println!("player {player}: score = {score}");
    }

    fn set_freeze(&self, player: PlayerId, millis_remaining: u64) {
        if millis_remaining == 0 {
            println!("player {player}: unfrozen");
        }
    }

    fn set_countdown(&self, millis_remaining: u64, warning: bool) {
        if warning && millis_remaining % 1_000 < 100 {
            println!("round ending in {}s", millis_remaining / 1_000);
        }
    }

    fn announce_winner(&self, player_ids: &[PlayerId]) {
        println!("game over, winner(s): {player_ids:?}");
    }
}
