//! Data-changed notifications.
//!
//! Observers subscribe once and refresh their view of `list()` whenever an
//! event arrives. Subscribers whose receiver was dropped are pruned lazily.

use crate::model::task::TaskId;
use crossbeam_channel::{unbounded, Receiver, Sender};
use log::debug;
use std::sync::Mutex;

/// Mutation that changed stored tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    Created { id: TaskId },
    Updated { id: TaskId },
    Deleted { id: TaskId },
    Cleared { removed: usize },
    Seeded { inserted: usize },
}

/// Subscription list of change observers.
#[derive(Default)]
pub struct ChangeNotifier {
    subscribers: Mutex<Vec<Sender<ChangeEvent>>>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new observer.
    pub fn subscribe(&self) -> Receiver<ChangeEvent> {
        let (tx, rx) = unbounded();
        if let Ok(mut subscribers) = self.subscribers.lock() {
            subscribers.push(tx);
        }
        rx
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().map(|s| s.len()).unwrap_or(0)
    }

    /// Delivers `event` to every live subscriber.
    pub fn publish(&self, event: ChangeEvent) {
        let Ok(mut subscribers) = self.subscribers.lock() else {
            return;
        };
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());
        debug!(
            "event=change_publish module=events kind={} subscribers={}",
            event_kind(&event),
            subscribers.len()
        );
    }
}

fn event_kind(event: &ChangeEvent) -> &'static str {
    match event {
        ChangeEvent::Created { .. } => "created",
        ChangeEvent::Updated { .. } => "updated",
        ChangeEvent::Deleted { .. } => "deleted",
        ChangeEvent::Cleared { .. } => "cleared",
        ChangeEvent::Seeded { .. } => "seeded",
    }
}
