//! Shared test-only helpers: a `UiSink` that records every call so tests can
//! assert on the event stream instead of re-deriving it from final state.

use parking_lot::Mutex;

use crate::model::{Card, PlayerId, Slot};
use crate::ui::UiSink;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    PlaceCard(Card, Slot),
    RemoveCard(Slot),
    PlaceToken(PlayerId, Slot),
    RemoveToken(PlayerId, Slot),
    SetScore(PlayerId, u64),
    SetFreeze(PlayerId, u64),
    SetCountdown(u64, bool),
    AnnounceWinner(Vec<PlayerId>),
}

#[derive(Debug, Default)]
pub struct RecordingUiSink {
    events: Mutex<Vec<UiEvent>>,
}

impl RecordingUiSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<UiEvent> {
        self.events.lock().clone()
    }

    pub fn count(&self, f: impl Fn(&UiEvent) -> bool) -> usize {
        self.events.lock().iter().filter(|e| f(e)).count()
    }
}

impl UiSink for RecordingUiSink {
    fn place_card(&self, card: Card, slot: Slot) {
        self.events.lock().push(UiEvent::PlaceCard(card, slot));
    }

    fn remove_card(&self, slot: Slot) {
        self.events.lock().push(UiEvent::RemoveCard(slot));
    }

    fn place_token(&self, player: PlayerId, slot: Slot) {
        self.events
            .lock()
            .push(UiEvent::PlaceToken(player, slot));
    }

    fn remove_token(&self, player: PlayerId, slot: Slot) {
        self.events
            .lock()
            .push(UiEvent::RemoveToken(player, slot));
    }

    fn set_score(&self, player: PlayerId, score: u64) {
        self.events.lock().push(UiEvent::SetScore(player, score));
    }

    fn set_freeze(&self, player: PlayerId, millis_remaining: u64) {
        self.events
            .lock()
            .push(UiEvent::SetFreeze(player, millis_remaining));
    }

    fn set_countdown(&self, millis_remaining: u64, warning: bool) {
        self.events
            .lock()
            .push(UiEvent::SetCountdown(millis_remaining, warning));
    }

    fn announce_winner(&self, player_ids: &[PlayerId]) {
        self.events
            .lock()
            .push(UiEvent::AnnounceWinner(player_ids.to_vec()));
    }
}
