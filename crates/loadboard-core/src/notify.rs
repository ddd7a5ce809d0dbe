//! In-process notification channel between the batch processor and the UI.
//!
//! [`Notifier`] broadcasts [`OrderEvent`]s to every current subscriber. Each
//! event has a wire name (`deleteOrdersRequest`, `modifyProgress`,
//! `cloneOrdersSuccess`, ...) and a JSON payload matching what the host-page
//! listeners expect.
//!
//! Delivery is best-effort: sending never blocks, a notifier without
//! subscribers drops the event, and a receiver created after an event was
//! sent never sees it. There is no replay buffer. A subscriber that falls more
//! than the channel capacity behind loses the oldest events and observes
//! `RecvError::Lagged`.

use log::{debug, trace};
use serde_json::{json, Value};
use tokio::sync::broadcast;

use crate::{
    changes::ChangeSet,
    models::{Order, OrderAction, Progress},
};

/// Events buffered per subscriber before the slowest one starts lagging.
pub const DEFAULT_CAPACITY: usize = 256;

/// A notification about a batch operation.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderEvent {
    /// A UI asks for a batch operation to start
    Request {
        action: OrderAction,
        orders: Vec<Order>,
        changes: Option<ChangeSet>,
    },
    /// Counters after one record or batch was attempted
    Progress {
        action: OrderAction,
        progress: Progress,
    },
    /// Terminal event: at least one record succeeded
    Success {
        action: OrderAction,
        progress: Progress,
    },
    /// Terminal event: nothing succeeded
    Error { action: OrderAction, error: String },
    /// A request that never started, e.g. while another batch was running.
    /// Not terminal: the running batch still ends with its own event.
    Rejected { action: OrderAction, error: String },
}

impl OrderEvent {
    pub fn action(&self) -> OrderAction {
        match self {
            OrderEvent::Request { action, .. }
            | OrderEvent::Progress { action, .. }
            | OrderEvent::Success { action, .. }
            | OrderEvent::Error { action, .. }
            | OrderEvent::Rejected { action, .. } => *action,
        }
    }

    /// Whether this event ends a batch operation.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderEvent::Success { .. } | OrderEvent::Error { .. })
    }

    /// Event name as dispatched on the host page.
    pub fn name(&self) -> String {
        let action = self.action();
        match self {
            OrderEvent::Request { .. } => format!("{action}OrdersRequest"),
            OrderEvent::Progress { .. } => format!("{action}Progress"),
            OrderEvent::Success { .. } => format!("{action}OrdersSuccess"),
            OrderEvent::Error { .. } => format!("{action}OrdersError"),
            OrderEvent::Rejected { .. } => format!("{action}OrdersRejected"),
        }
    }

    /// Event detail payload as dispatched on the host page.
    pub fn payload(&self) -> Value {
        match self {
            OrderEvent::Request {
                orders, changes, ..
            } => json!({ "orders": orders, "changes": changes }),
            OrderEvent::Progress { progress, .. } | OrderEvent::Success { progress, .. } => {
                json!(progress)
            }
            OrderEvent::Error { error, .. } | OrderEvent::Rejected { error, .. } => {
                json!({ "error": error })
            }
        }
    }
}

/// Broadcast hub for [`OrderEvent`]s. Cloning shares the same channel.
#[derive(Debug, Clone)]
pub struct Notifier {
    sender: broadcast::Sender<OrderEvent>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Registers a new listener. It observes only events sent from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<OrderEvent> {
        self.sender.subscribe()
    }

    /// Number of listeners currently registered.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    fn emit(&self, event: OrderEvent) {
        trace!("{} {}", event.name(), event.payload());
        if self.sender.send(event).is_err() {
            debug!("Notification dropped: no subscribers");
        }
    }

    pub fn emit_progress(&self, action: OrderAction, progress: Progress) {
        self.emit(OrderEvent::Progress { action, progress });
    }

    pub fn emit_success(&self, action: OrderAction, result: Progress) {
        self.emit(OrderEvent::Success {
            action,
            progress: result.finished(),
        });
    }

    pub fn emit_error(&self, action: OrderAction, message: impl Into<String>) {
        self.emit(OrderEvent::Error {
            action,
            error: message.into(),
        });
    }

    /// Reports a request that was turned away without running.
    pub fn emit_rejected(&self, action: OrderAction, message: impl Into<String>) {
        self.emit(OrderEvent::Rejected {
            action,
            error: message.into(),
        });
    }

    /// Entry point a UI uses to start a batch operation through a running
    /// dispatcher (see [`crate::Loadboard::spawn_dispatcher`]).
    pub fn emit_request(&self, action: OrderAction, orders: Vec<Order>, changes: Option<ChangeSet>) {
        self.emit(OrderEvent::Request {
            action,
            orders,
            changes,
        });
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names() {
        let progress = Progress::new(3);
        assert_eq!(
            OrderEvent::Progress {
                action: OrderAction::Delete,
                progress
            }
            .name(),
            "deleteProgress"
        );
        assert_eq!(
            OrderEvent::Success {
                action: OrderAction::Modify,
                progress
            }
            .name(),
            "modifyOrdersSuccess"
        );
        assert_eq!(
            OrderEvent::Error {
                action: OrderAction::Clone,
                error: "x".into()
            }
            .name(),
            "cloneOrdersError"
        );
        assert_eq!(
            OrderEvent::Request {
                action: OrderAction::Delete,
                orders: vec![],
                changes: None
            }
            .name(),
            "deleteOrdersRequest"
        );
    }

    #[test]
    fn test_error_payload_shape() {
        let event = OrderEvent::Error {
            action: OrderAction::Delete,
            error: "Failed to delete 2 orders".into(),
        };
        assert_eq!(event.payload(), json!({ "error": "Failed to delete 2 orders" }));
        assert!(event.is_terminal());
    }

    #[test]
    fn test_rejected_is_not_terminal() {
        let event = OrderEvent::Rejected {
            action: OrderAction::Delete,
            error: "busy".into(),
        };
        assert_eq!(event.name(), "deleteOrdersRejected");
        assert_eq!(event.payload(), json!({ "error": "busy" }));
        assert!(!event.is_terminal());
    }

    #[tokio::test]
    async fn test_success_marks_complete() {
        let notifier = Notifier::new();
        let mut rx = notifier.subscribe();
        let mut progress = Progress::new(2);
        progress.completed = 2;

        notifier.emit_success(OrderAction::Modify, progress);

        match rx.recv().await.unwrap() {
            OrderEvent::Success { progress, .. } => {
                assert!(progress.is_complete);
                assert_eq!(progress.completed, 2);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_late_subscriber_misses_earlier_events() {
        let notifier = Notifier::new();
        let mut early = notifier.subscribe();

        notifier.emit_error(OrderAction::Delete, "first");
        let mut late = notifier.subscribe();
        notifier.emit_error(OrderAction::Delete, "second");

        assert_eq!(
            early.recv().await.unwrap(),
            OrderEvent::Error {
                action: OrderAction::Delete,
                error: "first".into()
            }
        );
        assert_eq!(
            late.recv().await.unwrap(),
            OrderEvent::Error {
                action: OrderAction::Delete,
                error: "second".into()
            }
        );
        assert!(late.try_recv().is_err());
    }

    #[test]
    fn test_emit_without_subscribers_is_silent() {
        let notifier = Notifier::new();
        assert_eq!(notifier.subscriber_count(), 0);
        notifier.emit_progress(OrderAction::Clone, Progress::new(1));
    }
}
