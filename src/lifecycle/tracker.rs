// src/lifecycle/tracker.rs
//! Webhook correlation between in-flight call lifecycles and the inbound
//! `/webhook` endpoint.

use std::collections::HashMap;
use tokio::sync::{oneshot, Mutex};
use tracing::warn;

/// Completion payload delivered by the vendor webhook.
#[derive(Debug, Clone)]
pub struct WebhookEvent {
    pub call_id: String,
    pub status: Option<String>,
    pub to: Option<String>,
    pub summary: Option<String>,
}

/// Registry of lifecycles waiting on a webhook, keyed by vendor call id.
/// Claims are take-once: delivering an event removes the waiter, so a call
/// is never analyzed twice.
#[derive(Default)]
pub struct WebhookTracker {
    pending: Mutex<HashMap<String, oneshot::Sender<WebhookEvent>>>,
}

impl WebhookTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register interest in a call id. The returned receiver resolves when
    /// the webhook for that call arrives.
    pub async fn register(&self, call_id: &str) -> oneshot::Receiver<WebhookEvent> {
        let (tx, rx) = oneshot::channel();
        let mut pending = self.pending.lock().await;
        if pending.insert(call_id.to_string(), tx).is_some() {
            warn!("Replaced existing webhook waiter for call {}", call_id);
        }
        rx
    }

    /// Deliver a webhook event to its waiter. Returns false when nothing was
    /// waiting (webhook for an unknown or already-resolved call).
    pub async fn complete(&self, event: WebhookEvent) -> bool {
        let sender = {
            let mut pending = self.pending.lock().await;
            pending.remove(&event.call_id)
        };

        match sender {
            Some(tx) => tx.send(event).is_ok(),
            None => false,
        }
    }

    /// Drop a waiter that gave up (webhook wait expired, lifecycle moved on
    /// to polling).
    pub async fn abandon(&self, call_id: &str) {
        let mut pending = self.pending.lock().await;
        pending.remove(call_id);
    }

    pub async fn pending_count(&self) -> usize {
        self.pending.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(call_id: &str) -> WebhookEvent {
        WebhookEvent {
            call_id: call_id.to_string(),
            status: Some("completed".to_string()),
            to: Some("+15551234567".to_string()),
            summary: Some("Caller was interested.".to_string()),
        }
    }

    #[tokio::test]
    async fn test_register_and_complete_delivers_event() {
        let tracker = WebhookTracker::new();
        let rx = tracker.register("call-1").await;

        assert!(tracker.complete(event("call-1")).await);
        let delivered = rx.await.expect("event delivered");
        assert_eq!(delivered.call_id, "call-1");
        assert_eq!(delivered.summary.as_deref(), Some("Caller was interested."));
    }

    #[tokio::test]
    async fn test_complete_without_waiter_returns_false() {
        let tracker = WebhookTracker::new();
        assert!(!tracker.complete(event("call-unclaimed")).await);
    }

    #[tokio::test]
    async fn test_claim_is_take_once() {
        let tracker = WebhookTracker::new();
        let _rx = tracker.register("call-2").await;

        assert!(tracker.complete(event("call-2")).await);
        assert!(!tracker.complete(event("call-2")).await);
    }

    #[tokio::test]
    async fn test_abandon_removes_waiter() {
        let tracker = WebhookTracker::new();
        let _rx = tracker.register("call-3").await;
        assert_eq!(tracker.pending_count().await, 1);

        tracker.abandon("call-3").await;
        assert_eq!(tracker.pending_count().await, 0);
        assert!(!tracker.complete(event("call-3")).await);
    }
}
