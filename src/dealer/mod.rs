//! The dealer: owns the deck, drives round lifecycle, and is the sole
//! arbiter of candidate sets submitted by players.

use std::sync::Arc;
use std::time::Duration;

use rand::seq::SliceRandom;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::config::GameConfig;
use crate::deckgen::DeckGenerator;
use crate::model::{Card, PlayerId, Slot};
use crate::oracle::SetOracle;
use crate::player::{self, PlayerHandle};
use crate::table::Table;
use crate::ui::UiSink;

const LOG_TARGET: &str = "dealer";

/// A non-configurable upper bound on how long a non-human player's key
/// generator waits between presses while topping up its channel.
const KEYGEN_JITTER: Duration = Duration::from_millis(200);

pub struct Dealer {
    table: Arc<Table>,
    oracle: Arc<dyn SetOracle>,
    ui: Arc<dyn UiSink>,
    deck: Vec<Card>,
    players: Vec<Arc<PlayerHandle>>,
    request_rx: mpsc::Receiver<PlayerId>,
    cancel: CancellationToken,
    table_size: usize,
    feature_size: usize,
    turn_timeout: Duration,
    turn_timeout_warning: Duration,
    point_freeze: Duration,
    penalty_freeze: Duration,
    hints: bool,
}

impl Dealer {
    /// Spawns one player (and, for non-human seats, its paired key generator)
    /// per `config.players`, wires them to a shared request channel, and
    /// returns the dealer alongside the player handles so a caller can feed
    /// key presses to the human seat(s) while the dealer's round loop runs
    /// independently.
    pub fn new(
        config: &GameConfig,
        table: Arc<Table>,
        oracle: Arc<dyn SetOracle>,
        deckgen: &dyn DeckGenerator,
        ui: Arc<dyn UiSink>,
    ) -> (Self, Vec<Arc<PlayerHandle>>) {
        let (request_tx, request_rx) = mpsc::channel(config.players.max(1) * 2);

        let players: Vec<Arc<PlayerHandle>> = (0..config.players as PlayerId)
            .map(|id| {
                let human = (id as usize) < config.human_players;
                Arc::new(player::spawn(
                    id,
                    human,
                    config.feature_size,
                    config.table_size,
                    table.clone(),
                    request_tx.clone(),
                    KEYGEN_JITTER,
                    ui.clone(),
                ))
            })
            .collect();
        drop(request_tx);

        let deck = deckgen.generate(config.deck_size);
        let handles = players.clone();
        let dealer = Self {
            table,
            oracle,
            ui,
            deck,
            players,
            request_rx,
            cancel: CancellationToken::new(),
            table_size: config.table_size,
            feature_size: config.feature_size,
            turn_timeout: Duration::from_millis(config.turn_timeout_millis),
            turn_timeout_warning: Duration::from_millis(config.turn_timeout_warning_millis),
            point_freeze: Duration::from_millis(config.point_freeze_millis),
            penalty_freeze: Duration::from_millis(config.penalty_freeze_millis),
            hints: config.hints,
        };
        (dealer, handles)
    }

    /// The signal callers use to request a graceful shutdown (e.g. on Ctrl+C),
    /// independent of each player's own per-task cancellation.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Runs rounds until terminated or no legal set remains anywhere, then
    /// terminates every player and returns the tied winners.
    pub async fn run(mut self) -> Vec<PlayerId> {
        while !self.should_finish() {
            self.shuffle_deck();
            self.place_cards_on_table().await;
            self.timer_loop().await;
            if self.cancel.is_cancelled() {
                break;
            }
            self.remove_all_cards_from_table().await;
        }
        self.terminate_and_announce().await
    }

    fn shuffle_deck(&mut self) {
        self.deck.shuffle(&mut rand::thread_rng());
    }

    fn should_finish(&self) -> bool {
        if self.cancel.is_cancelled() {
            return true;
        }
        let mut all_cards = self.deck.clone();
        all_cards.extend(
            (0..self.table_size as Slot).filter_map(|s| self.table.get_card_from_slot(s)),
        );
        self.oracle.find_sets(&all_cards, 1).is_empty()
    }

    async fn place_cards_on_table(&mut self) {
        let mut empty = self.table.empty_slots(self.table_size);
        empty.shuffle(&mut rand::thread_rng());
        let mut placed_any = false;
        for slot in empty {
            let Some(card) = self.deck.pop() else {
                break;
            };
            self.table.place_card(card, slot).await;
            placed_any = true;
        }
        if self.hints && placed_any {
            self.table.hints(self.oracle.as_ref(), self.feature_size);
        }
    }

    async fn timer_loop(&mut self) {
        let mut deadline = Instant::now() + self.turn_timeout;
        loop {
            if self.cancel.is_cancelled() {
                return;
            }
            let now = Instant::now();
            if now >= deadline {
                return;
            }
            let remaining = deadline - now;
            let warning = remaining <= self.turn_timeout_warning;
            let tick = if warning {
                Duration::from_millis(100)
            } else {
                Duration::from_millis(1_000)
            };
            let wait = tick.min(remaining);
            self.ui
                .set_countdown(remaining.as_millis() as u64, warning);

            tokio::select! {
                _ = self.cancel.cancelled() => return,
                res = tokio::time::timeout(wait, self.request_rx.recv()) => {
                    match res {
                        Ok(Some(first)) => {
                            let mut batch = vec![first];
                            while let Ok(id) = self.request_rx.try_recv() {
                                batch.push(id);
                            }
                            for player_id in batch {
                                self.handle_request(player_id, &mut deadline).await;
                            }
                            self.place_cards_on_table().await;
                        }
                        Ok(None) => return,
                        Err(_) => {}
                    }
                }
            }
        }
    }

    async fn handle_request(&mut self, player_id: PlayerId, deadline: &mut Instant) {
        let Some(player) = self.players.iter().find(|p| p.shared.id == player_id) else {
            return;
        };
        let tokens = self.table.get_tokens(player_id);
        if tokens.len() != self.feature_size {
            tracing::debug!(target: LOG_TARGET, player_id, "stale candidate, invalidated");
            player.shared.invalidate();
            return;
        }
        let cards: Vec<Card> = tokens
            .iter()
            .filter_map(|&s| self.table.get_card_from_slot(s))
            .collect();
        if cards.len() != tokens.len() {
            player.shared.invalidate();
            return;
        }

        if self.oracle.test_set(&cards) {
            tracing::info!(target: LOG_TARGET, player_id, ?tokens, "accepted candidate");
            for &slot in &tokens {
                self.table.remove_tokens_from_slot(slot);
                self.table.remove_card(slot).await;
            }
            player.shared.point(self.point_freeze);
            *deadline = Instant::now() + self.turn_timeout;
        } else {
            tracing::info!(target: LOG_TARGET, player_id, ?tokens, "rejected candidate");
            player.shared.penalty(self.penalty_freeze);
        }
    }

    async fn remove_all_cards_from_table(&mut self) {
        for slot in 0..self.table_size as Slot {
            if let Some(card) = self.table.get_card_from_slot(slot) {
                self.table.remove_tokens_from_slot(slot);
                self.table.remove_card(slot).await;
                self.deck.push(card);
            }
        }
    }

    async fn terminate_and_announce(self) -> Vec<PlayerId> {
        for player in &self.players {
            player.terminate().await;
        }
        let max_score = self
            .players
            .iter()
            .map(|p| p.shared.score())
            .max()
            .unwrap_or(0);
        let winners: Vec<PlayerId> = self
            .players
            .iter()
            .filter(|p| p.shared.score() == max_score)
            .map(|p| p.shared.id)
            .collect();
        tracing::info!(target: LOG_TARGET, ?winners, max_score, "game over");
        self.ui.announce_winner(&winners);
        winners
    }
}
