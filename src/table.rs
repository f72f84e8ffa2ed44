//! Shared table state: the slot↔card bijection and the multi-owner token
//! map, guarded by two independent locks per the design (`cards`-before-
//! `tokens` when both are needed, and never nested the other way).

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::model::{Card, PlayerId, Slot};
use crate::oracle::SetOracle;
use crate::ui::UiSink;

const LOG_TARGET: &str = "table";

#[derive(Debug, Default)]
struct CardState {
    slot_to_card: HashMap<Slot, Card>,
    card_to_slot: HashMap<Card, Slot>,
}

#[derive(Debug, Default)]
struct TokenState {
    /// Insertion-ordered per player, so the player loop can evict the oldest
    /// token when a new key press arrives at capacity.
    player_tokens: HashMap<PlayerId, VecDeque<Slot>>,
    slot_tokens: HashMap<Slot, HashSet<PlayerId>>,
}

pub struct Table {
    cards: Mutex<CardState>,
    tokens: Mutex<TokenState>,
    ui: Arc<dyn UiSink>,
    table_delay: Duration,
}

impl Table {
    pub fn new(ui: Arc<dyn UiSink>, table_delay: Duration) -> Self {
        Self {
            cards: Mutex::new(CardState::default()),
            tokens: Mutex::new(TokenState::default()),
            ui,
            table_delay,
        }
    }

    /// Simulated hardware placement latency. Must run before any lock is
    /// taken so that concurrent delays don't serialize behind each other.
    async fn simulate_delay(&self) {
        if !self.table_delay.is_zero() {
            tokio::time::sleep(self.table_delay).await;
        }
    }

    pub async fn place_card(&self, card: Card, slot: Slot) {
        self.simulate_delay().await;
        {
            let mut cards = self.cards.lock();
            cards.slot_to_card.insert(slot, card);
            cards.card_to_slot.insert(card, slot);
        }
        tracing::debug!(target: LOG_TARGET, card, slot, "placed card");
        self.ui.place_card(card, slot);
    }

    pub async fn remove_card(&self, slot: Slot) {
        self.simulate_delay().await;
        let removed = {
            let mut cards = self.cards.lock();
            match cards.slot_to_card.remove(&slot) {
                Some(card) => {
                    cards.card_to_slot.remove(&card);
                    true
                }
                None => false,
            }
        };
        if removed {
            tracing::debug!(target: LOG_TARGET, slot, "removed card");
            self.ui.remove_card(slot);
        }
    }

    /// `false` if the slot is empty; tokens cannot be placed on empty slots.
    pub fn place_token(&self, player: PlayerId, slot: Slot) -> bool {
        let occupied = self.cards.lock().slot_to_card.contains_key(&slot);
        if !occupied {
            return false;
        }
        let mut tokens = self.tokens.lock();
        tokens
            .player_tokens
            .entry(player)
            .or_default()
            .push_back(slot);
        tokens.slot_tokens.entry(slot).or_default().insert(player);
        drop(tokens);
        self.ui.place_token(player, slot);
        true
    }

    /// `false` if the (player, slot) pair held no token.
    pub fn remove_token(&self, player: PlayerId, slot: Slot) -> bool {
        let removed = {
            let mut tokens = self.tokens.lock();
            let had = if let Some(q) = tokens.player_tokens.get_mut(&player) {
                if let Some(pos) = q.iter().position(|&s| s == slot) {
                    q.remove(pos);
                    true
                } else {
                    false
                }
            } else {
                false
            };
            if had {
                if let Some(set) = tokens.slot_tokens.get_mut(&slot) {
                    set.remove(&player);
                    if set.is_empty() {
                        tokens.slot_tokens.remove(&slot);
                    }
                }
            }
            had
        };
        if removed {
            self.ui.remove_token(player, slot);
        }
        removed
    }

    /// Clears every token on `slot`, mirroring each removal to the UI. Called
    /// by the dealer after an acceptance, before the card itself is removed.
    pub fn remove_tokens_from_slot(&self, slot: Slot) {
        let holders: Vec<PlayerId> = {
            let mut tokens = self.tokens.lock();
            let holders: Vec<PlayerId> = tokens
                .slot_tokens
                .remove(&slot)
                .map(|s| s.into_iter().collect())
                .unwrap_or_default();
            for &player in &holders {
                if let Some(q) = tokens.player_tokens.get_mut(&player) {
                    q.retain(|&s| s != slot);
                }
            }
            holders
        };
        for player in holders {
            self.ui.remove_token(player, slot);
        }
    }

    pub fn empty_slots(&self, table_size: usize) -> Vec<Slot> {
        let cards = self.cards.lock();
        (0..table_size as Slot)
            .filter(|s| !cards.slot_to_card.contains_key(s))
            .collect()
    }

    pub fn get_card_from_slot(&self, slot: Slot) -> Option<Card> {
        self.cards.lock().slot_to_card.get(&slot).copied()
    }

    pub fn num_tokens(&self, player: PlayerId) -> usize {
        self.tokens
            .lock()
            .player_tokens
            .get(&player)
            .map(|q| q.len())
            .unwrap_or(0)
    }

    /// A copy of the player's tokened slots, oldest first.
    pub fn get_tokens(&self, player: PlayerId) -> Vec<Slot> {
        self.tokens
            .lock()
            .player_tokens
            .get(&player)
            .map(|q| q.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Prints every legal set currently on the table to the operator console.
    pub fn hints(&self, oracle: &dyn SetOracle, feature_size: usize) {
        let cards: Vec<Card> = {
            let cards = self.cards.lock();
            cards.slot_to_card.values().copied().collect()
        };
        let sets = oracle.find_sets(&cards, usize::MAX);
        tracing::info!(
            target: "table::hints",
            count = sets.len(),
            feature_size,
            ?sets,
            "legal sets on table"
        );
    }
}
