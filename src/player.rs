//! The per-player worker: translates key presses into token toggles, submits
//! full candidate sets to the dealer, and enforces the post-verdict freeze.

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Notify};
use tokio_util::sync::CancellationToken;

use crate::keychannel::KeyChannel;
use crate::keygen::{self, KeyGenLink};
use crate::model::{PlayerId, Slot, Verdict, VerdictCell};
use crate::table::Table;
use crate::tokio_tools::spawn_named_task;
use crate::ui::UiSink;

const LOG_TARGET: &str = "player";

/// State the dealer needs to reach into from outside the player's task:
/// score, freeze deadline, and the verdict rendezvous. Owned by an `Arc`
/// shared between the spawned task and the handle the dealer holds.
pub struct PlayerShared {
    pub id: PlayerId,
    pub human: bool,
    score: AtomicU64,
    /// Millis since `UNIX_EPOCH`; `0` means unfrozen.
    freeze_until_millis: AtomicI64,
    verdict_notify: Notify,
    verdict: VerdictCell,
    ui: Arc<dyn UiSink>,
}

fn now_millis() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("system clock before unix epoch")
        .as_millis() as i64
}

impl PlayerShared {
    pub fn score(&self) -> u64 {
        self.score.load(Ordering::Acquire)
    }

    /// Millis remaining on the freeze, 0 if not frozen.
    pub fn freeze_remaining_millis(&self) -> u64 {
        let until = self.freeze_until_millis.load(Ordering::Acquire);
        if until == 0 {
            return 0;
        }
        (until - now_millis()).max(0) as u64
    }

    fn arm_freeze(&self, duration: Duration) {
        let until = now_millis() + duration.as_millis() as i64;
        self.freeze_until_millis.store(until, Ordering::Release);
    }

    fn clear_freeze(&self) {
        self.freeze_until_millis.store(0, Ordering::Release);
    }

    /// Called by the dealer when a candidate is accepted.
    pub fn point(&self, point_freeze: Duration) {
        let new_score = self.score.fetch_add(1, Ordering::AcqRel) + 1;
        self.ui.set_score(self.id, new_score);
        self.arm_freeze(point_freeze);
        self.verdict.set(Verdict::Accepted);
        self.verdict_notify.notify_one();
    }

    /// Called by the dealer when a candidate is rejected.
    pub fn penalty(&self, penalty_freeze: Duration) {
        self.arm_freeze(penalty_freeze);
        self.verdict.set(Verdict::Rejected);
        self.verdict_notify.notify_one();
    }

    /// Called by the dealer when the candidate's tokens were reaped by
    /// another acceptance before arbitration reached this request. No freeze
    /// follows — this is the race-fair "no penalty" reading (see design
    /// notes' open question).
    pub fn invalidate(&self) {
        self.verdict.set(Verdict::Invalidated);
        self.verdict_notify.notify_one();
    }
}

/// Handle retained by whoever starts the game: lets the caller feed key
/// presses and terminate the player (which in turn terminates its key
/// generator), without exposing the task's internals.
pub struct PlayerHandle {
    pub shared: Arc<PlayerShared>,
    key_channel: Arc<KeyChannel>,
    cancel: CancellationToken,
    task: tokio::sync::Mutex<Option<tokio::task::JoinHandle<()>>>,
}

impl PlayerHandle {
    /// Never blocks: if the key channel is full, the oldest pending press is
    /// dropped to make room for this one.
    pub fn key_pressed(&self, slot: Slot) {
        self.key_channel.push(slot);
    }

    pub async fn terminate(&self) {
        self.cancel.cancel();
        if let Some(task) = self.task.lock().await.take() {
            let _ = task.await;
        }
    }
}

#[allow(clippy::too_many_arguments)]
pub fn spawn(
    id: PlayerId,
    human: bool,
    feature_size: usize,
    table_size: usize,
    table: Arc<Table>,
    request_tx: mpsc::Sender<PlayerId>,
    keygen_jitter: Duration,
    ui: Arc<dyn UiSink>,
) -> PlayerHandle {
    let shared = Arc::new(PlayerShared {
        id,
        human,
        score: AtomicU64::new(0),
        freeze_until_millis: AtomicI64::new(0),
        verdict_notify: Notify::new(),
        verdict: VerdictCell::new(),
        ui: ui.clone(),
    });
    let key_channel = Arc::new(KeyChannel::new(feature_size));
    let cancel = CancellationToken::new();

    let keygen_handle = if !human {
        let link = Arc::new(KeyGenLink {
            key_channel: key_channel.clone(),
            resume: Arc::new(Notify::new()),
            cancel: cancel.clone(),
        });
        let link_for_task = link.clone();
        let task = spawn_named_task(format!("keygen-{id}"), async move {
            keygen::run(id, link_for_task, table_size, feature_size, keygen_jitter).await;
        });
        Some((link, task))
    } else {
        None
    };

    let task = spawn_named_task(
        format!("player-{id}"),
        run(
            shared.clone(),
            feature_size,
            table,
            request_tx,
            key_channel.clone(),
            keygen_handle,
            cancel.clone(),
            ui,
        ),
    );

    PlayerHandle {
        shared,
        key_channel,
        cancel,
        task: tokio::sync::Mutex::new(Some(task)),
    }
}

#[allow(clippy::too_many_arguments)]
async fn run(
    shared: Arc<PlayerShared>,
    feature_size: usize,
    table: Arc<Table>,
    request_tx: mpsc::Sender<PlayerId>,
    key_channel: Arc<KeyChannel>,
    keygen_handle: Option<(Arc<KeyGenLink>, tokio::task::JoinHandle<()>)>,
    cancel: CancellationToken,
    ui: Arc<dyn UiSink>,
) {
    let id = shared.id;
    loop {
        let Some(slot) = key_channel.pop(&cancel).await else {
            break;
        };

        // At capacity: evict the oldest token to make room for this press.
        if table.num_tokens(id) >= feature_size {
            let tokens = table.get_tokens(id);
            if let Some(&oldest) = tokens.first() {
                table.remove_token(id, oldest);
            }
        }

        if table.get_tokens(id).contains(&slot) {
            table.remove_token(id, slot);
        } else {
            // Placing on an empty slot fails silently; this is the key
            // press's only no-op path.
            table.place_token(id, slot);
        }

        if table.num_tokens(id) == feature_size {
            tracing::debug!(target: LOG_TARGET, id, "submitting candidate set");
            shared.verdict.set(Verdict::Pending);
            if request_tx.send(id).await.is_err() {
                // Dealer has shut down its intake; nothing left to arbitrate.
                break;
            }
            loop {
                tokio::select! {
                    _ = shared.verdict_notify.notified() => {}
                    _ = cancel.cancelled() => break,
                }
                if !matches!(shared.verdict.get(), Verdict::Pending) {
                    break;
                }
            }
            tracing::debug!(target: LOG_TARGET, id, verdict = ?shared.verdict.get(), "verdict received");
        }

        if cancel.is_cancelled() {
            break;
        }

        // Enforce the freeze, ticking the UI at <=1s cadence.
        loop {
            let remaining = shared.freeze_remaining_millis();
            if remaining == 0 {
                break;
            }
            ui.set_freeze(id, remaining);
            let slice = remaining.min(1_000);
            tokio::select! {
                _ = tokio::time::sleep(Duration::from_millis(slice)) => {}
                _ = cancel.cancelled() => break,
            }
            if cancel.is_cancelled() {
                break;
            }
        }
        if shared.freeze_remaining_millis() == 0 {
            shared.clear_freeze();
            ui.set_freeze(id, 0);
        }

        if cancel.is_cancelled() {
            break;
        }

        key_channel.clear();
        if let Some((link, _)) = &keygen_handle {
            link.resume.notify_one();
        }
    }

    if let Some((_, task)) = keygen_handle {
        let _ = task.await;
    }
    tracing::debug!(target: LOG_TARGET, id, "player terminated");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::RecordingUiSink;
    use crate::ui::NullUiSink;

    fn table_with_cards(ui: Arc<dyn UiSink>) -> Arc<Table> {
        Arc::new(Table::new(ui, Duration::from_millis(0)))
    }

    async fn place_cards(table: &Table, n: u32) {
        for s in 0..n {
            table.place_card(s, s).await;
        }
    }

    #[tokio::test]
    async fn human_player_submits_after_feature_size_tokens() {
        let ui: Arc<dyn UiSink> = Arc::new(NullUiSink);
        let table = table_with_cards(ui.clone());
        place_cards(&table, 12).await;

        let (tx, mut rx) = mpsc::channel(8);
        let handle = spawn(
            1,
            true,
            3,
            12,
            table.clone(),
            tx,
            Duration::from_millis(0),
            ui,
        );

        handle.key_pressed(0);
        handle.key_pressed(1);
        handle.key_pressed(2);

        let submitted = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("dealer should receive a request")
            .unwrap();
        assert_eq!(submitted, 1);
        assert_eq!(table.get_tokens(1).len(), 3);

        handle.shared.point(Duration::from_millis(20));
        tokio::time::sleep(Duration::from_millis(200)).await;
        handle.terminate().await;
    }

    #[tokio::test]
    async fn fourth_press_at_capacity_evicts_oldest_token() {
        let ui: Arc<dyn UiSink> = Arc::new(NullUiSink);
        let table = table_with_cards(ui.clone());
        place_cards(&table, 12).await;

        let (tx, mut rx) = mpsc::channel(8);
        let handle = spawn(
            2,
            true,
            3,
            12,
            table.clone(),
            tx,
            Duration::from_millis(0),
            ui,
        );

        handle.key_pressed(0);
        handle.key_pressed(1);
        handle.key_pressed(2);
        let _ = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap()
            .unwrap();

        // Resolve with an invalidation so the player loop resumes without a freeze.
        handle.shared.invalidate();
        tokio::time::sleep(Duration::from_millis(50)).await;

        handle.key_pressed(3);
        tokio::time::sleep(Duration::from_millis(50)).await;

        let mut tokens = table.get_tokens(2);
        tokens.sort();
        assert_eq!(tokens, vec![1, 2, 3]);
        handle.terminate().await;
    }

    #[tokio::test]
    async fn terminate_interrupts_mid_freeze() {
        let ui: Arc<dyn UiSink> = Arc::new(RecordingUiSink::new());
        let table = table_with_cards(ui.clone());
        place_cards(&table, 12).await;

        let (tx, mut rx) = mpsc::channel(8);
        let handle = spawn(
            3,
            true,
            3,
            12,
            table.clone(),
            tx,
            Duration::from_millis(0),
            ui,
        );
        handle.key_pressed(0);
        handle.key_pressed(1);
        handle.key_pressed(2);
        let _ = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap()
            .unwrap();
        handle.shared.point(Duration::from_secs(30));

        tokio::time::sleep(Duration::from_millis(50)).await;
        tokio::time::timeout(Duration::from_secs(1), handle.terminate())
            .await
            .expect("terminate should interrupt the freeze promptly");
    }
}
