//! The AI key generator: a worker paired 1:1 with a non-human player, keeping
//! its key channel topped up and backing off once the player is saturated.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

use crate::keychannel::KeyChannel;
use crate::model::Slot;

const LOG_TARGET: &str = "keygen";

/// The specific shared resources a key generator needs from its player — not
/// the player itself. There is no back-edge to reason about: the generator
/// never holds anything that could keep the player alive beyond its own run.
pub struct KeyGenLink {
    pub key_channel: Arc<KeyChannel>,
    pub resume: Arc<Notify>,
    pub cancel: CancellationToken,
}

/// Runs until `link.cancel` fires. Not a method on `Player` so the generator
/// can be spawned as its own task with only the resources above.
pub async fn run(
    player_id: u32,
    link: Arc<KeyGenLink>,
    table_size: usize,
    feature_size: usize,
    jitter: Duration,
) {
    loop {
        if link.cancel.is_cancelled() {
            break;
        }
        while link.key_channel.len() < feature_size {
            if link.cancel.is_cancelled() {
                return;
            }
            let slot = rand::thread_rng().gen_range(0..table_size as Slot);
            link.key_channel.push(slot);
            tracing::trace!(target: LOG_TARGET, player_id, slot, "keygen pressed");
            if !jitter.is_zero() {
                let wait_millis = rand::thread_rng().gen_range(0..jitter.as_millis().max(1) as u64);
                let wait = Duration::from_millis(wait_millis);
                tokio::select! {
                    _ = tokio::time::sleep(wait) => {}
                    _ = link.cancel.cancelled() => return,
                }
            }
        }
        tokio::select! {
            _ = link.resume.notified() => {}
            _ = link.cancel.cancelled() => return,
        }
    }
    tracing::debug!(target: LOG_TARGET, player_id, "keygen terminated");
}
