//! Transient user notifications.
//!
//! Toasts are events, not state: curator operations publish them, the host
//! drains and renders them, and nothing keeps them once their TTL lapses.

use std::collections::VecDeque;
use std::time::Duration;

use serde::Serialize;
use time::OffsetDateTime;
use tracing::debug;
use uuid::Uuid;

pub const DEFAULT_TOAST_TTL: Duration = Duration::from_millis(6000);

/// Monotonic sequence number of a toast within its queue.
pub type Epoch = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToastKind {
    Success,
    Error,
}

impl ToastKind {
    pub fn as_variant(self) -> &'static str {
        match self {
            ToastKind::Success => "success",
            ToastKind::Error => "error",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub id: Uuid,
    pub epoch: Epoch,
    pub kind: ToastKind,
    pub text: String,
    pub ttl: Duration,
    pub created_at: OffsetDateTime,
}

impl Toast {
    fn new(kind: ToastKind, text: String, ttl: Duration, epoch: Epoch) -> Self {
        Self {
            id: Uuid::new_v4(),
            epoch,
            kind,
            text,
            ttl,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        now - self.created_at >= self.ttl
    }

    pub fn ttl_ms(&self) -> u64 {
        u64::try_from(self.ttl.as_millis()).unwrap_or(u64::MAX)
    }
}

/// FIFO queue of pending toasts owned by one curator.
#[derive(Debug)]
pub struct ToastQueue {
    queue: VecDeque<Toast>,
    epoch_counter: Epoch,
    ttl: Duration,
}

impl ToastQueue {
    pub fn new(ttl: Duration) -> Self {
        Self {
            queue: VecDeque::new(),
            epoch_counter: 0,
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn success(&mut self, text: impl Into<String>) -> Epoch {
        self.publish(ToastKind::Success, text)
    }

    pub fn error(&mut self, text: impl Into<String>) -> Epoch {
        self.publish(ToastKind::Error, text)
    }

    pub fn publish(&mut self, kind: ToastKind, text: impl Into<String>) -> Epoch {
        let epoch = self.epoch_counter;
        self.epoch_counter += 1;
        let toast = Toast::new(kind, text.into(), self.ttl, epoch);

        debug!(
            toast_id = %toast.id,
            toast_epoch = toast.epoch,
            toast_kind = toast.kind.as_variant(),
            text = %toast.text,
            "Toast published"
        );

        self.queue.push_back(toast);
        epoch
    }

    /// Drain up to `limit` toasts in FIFO order.
    pub fn drain(&mut self, limit: usize) -> Vec<Toast> {
        let count = limit.min(self.queue.len());
        self.queue.drain(..count).collect()
    }

    pub fn drain_all(&mut self) -> Vec<Toast> {
        self.queue.drain(..).collect()
    }

    /// Drop toasts whose TTL has lapsed; returns how many were removed.
    pub fn prune_expired(&mut self, now: OffsetDateTime) -> usize {
        let before = self.queue.len();
        self.queue.retain(|toast| !toast.is_expired(now));
        before - self.queue.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Toast> {
        self.queue.iter()
    }

    pub fn last(&self) -> Option<&Toast> {
        self.queue.back()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }
}

impl Default for ToastQueue {
    fn default() -> Self {
        Self::new(DEFAULT_TOAST_TTL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publish_and_drain_fifo() {
        let mut queue = ToastQueue::default();
        queue.success("Comment approved");
        queue.error("Failed to delete post");
        queue.success("Role updated");

        assert_eq!(queue.len(), 3);

        let drained = queue.drain(2);
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].kind, ToastKind::Success);
        assert_eq!(drained[1].text, "Failed to delete post");
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn epochs_are_monotonic() {
        let mut queue = ToastQueue::default();
        let a = queue.success("a");
        let b = queue.error("b");
        let c = queue.success("c");
        assert!(a < b && b < c);
    }

    #[test]
    fn expired_toasts_are_pruned() {
        let mut queue = ToastQueue::new(Duration::from_millis(500));
        queue.success("short lived");
        let created = queue.last().map(|t| t.created_at).expect("toast");

        assert_eq!(queue.prune_expired(created + Duration::from_millis(100)), 0);
        assert_eq!(queue.prune_expired(created + Duration::from_millis(500)), 1);
        assert!(queue.is_empty());
    }

    #[test]
    fn clear_empties_queue() {
        let mut queue = ToastQueue::default();
        queue.success("x");
        queue.clear();
        assert!(queue.is_empty());
        assert!(queue.drain_all().is_empty());
    }
}
