//! A bounded FIFO of pending key presses with a drop-oldest-on-full policy.
//! `tokio::sync::mpsc` cannot express this: its bounded sender blocks (or, in
//! `try_send`, errors) once full, rather than evicting. This is the
//! custom primitive the design notes call for instead.

use std::collections::VecDeque;

use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

use crate::model::Slot;

pub struct KeyChannel {
    queue: Mutex<VecDeque<Slot>>,
    capacity: usize,
    notify: Notify,
}

impl KeyChannel {
    pub fn new(capacity: usize) -> Self {
        Self {
            queue: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
            notify: Notify::new(),
        }
    }

    /// Never blocks. If the channel is already at capacity, the oldest
    /// pending press is dropped to make room for this one.
    pub fn push(&self, slot: Slot) {
        {
            let mut q = self.queue.lock();
            if q.len() >= self.capacity {
                q.pop_front();
            }
            q.push_back(slot);
        }
        self.notify.notify_one();
    }

    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.queue.lock().clear();
    }

    /// Blocks (cooperatively) until a slot is available or `cancel` fires.
    pub async fn pop(&self, cancel: &CancellationToken) -> Option<Slot> {
        loop {
            if let Some(slot) = self.queue.lock().pop_front() {
                return Some(slot);
            }
            tokio::select! {
                _ = self.notify.notified() => {}
                _ = cancel.cancelled() => return None,
            }
        }
    }
}
