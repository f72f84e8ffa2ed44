//! Keyboard input source. Externally pluggable per the spec: whatever reads
//! raw input must not block the dealer or any player, and simply calls
//! `PlayerHandle::key_pressed` on the addressed seat.

use std::sync::Arc;
use std::thread;

use crate::model::{PlayerId, Slot};
use crate::player::PlayerHandle;

const LOG_TARGET: &str = "input";

/// A source of slot presses for a single human seat. Implementations run on
/// whatever thread suits them; the only contract is that dispatching a press
/// never blocks the player or dealer.
pub trait KeyboardSource: Send + Sync {
    /// Starts reading input in the background, forwarding presses to
    /// `player` until the process exits. Returns immediately.
    fn spawn(self: Box<Self>, player_id: PlayerId, player: Arc<PlayerHandle>);
}

/// Reads whitespace-separated slot numbers from stdin on a dedicated
/// blocking thread (stdin has no async-native read primitive worth pulling
/// in for a single demo input source) and forwards each to the given
/// player's key channel.
#[derive(Debug, Default)]
pub struct StdinKeyboardSource;

impl KeyboardSource for StdinKeyboardSource {
    fn spawn(self: Box<Self>, player_id: PlayerId, player: Arc<PlayerHandle>) {
        thread::spawn(move || {
            use std::io::BufRead;
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                for token in line.split_whitespace() {
                    match token.parse::<Slot>() {
                        Ok(slot) => {
                            tracing::debug!(target: LOG_TARGET, player_id, slot, "key pressed");
                            player.key_pressed(slot);
                        }
                        Err(_) => {
                            tracing::warn!(target: LOG_TARGET, player_id, token, "not a slot number");
                        }
                    }
                }
            }
        });
    }
}
