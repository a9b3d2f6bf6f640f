use crate::core::contracts::BoxError;
use crate::core::logging::{LogFacade, Logger};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::any::Any;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

pub type EventHandler = Arc<dyn Fn(&Event) -> Result<(), BoxError> + Send + Sync>;

/// A named event with an arbitrary payload.
#[derive(Clone)]
pub struct Event {
    id: Uuid,
    name: String,
    payload: Arc<dyn Any + Send + Sync>,
    occurred_at: DateTime<Utc>,
}

impl Event {
    pub fn new<T: Any + Send + Sync>(name: impl Into<String>, payload: T) -> Self {
        Self {
            id: Uuid::now_v7(),
            name: name.into(),
            payload: Arc::new(payload),
            occurred_at: Utc::now(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }

    pub fn payload<T: Any>(&self) -> Option<&T> {
        self.payload.downcast_ref::<T>()
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("occurred_at", &self.occurred_at)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EmitReport {
    pub invoked: usize,
    pub failed: usize,
}

#[derive(Clone)]
struct Subscription {
    id: SubscriptionId,
    handler: EventHandler,
}

/// Synchronous publish/subscribe by event name.
///
/// Handlers run on the emitting thread in subscription order. The handler
/// list is copied out of the map before invocation, so a handler may emit or
/// subscribe again without deadlocking. A failing or panicking handler is
/// logged and skipped; it never reaches the emitter.
pub struct EventBus {
    subscriptions: DashMap<String, Vec<Subscription>>,
    next_id: AtomicU64,
    logger: Arc<dyn Logger>,
}

impl EventBus {
    pub fn new(logger: Arc<dyn Logger>) -> Self {
        Self {
            subscriptions: DashMap::new(),
            next_id: AtomicU64::new(1),
            logger,
        }
    }

    pub fn subscribe<F>(&self, event_name: impl Into<String>, handler: F) -> SubscriptionId
    where
        F: Fn(&Event) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.subscriptions
            .entry(event_name.into())
            .or_default()
            .push(Subscription {
                id,
                handler: Arc::new(handler),
            });
        id
    }

    /// Removes only the handler registered under `id`.
    pub fn unsubscribe(&self, event_name: &str, id: SubscriptionId) -> bool {
        let removed = match self.subscriptions.get_mut(event_name) {
            Some(mut entry) => {
                let before = entry.len();
                entry.retain(|s| s.id != id);
                entry.len() != before
            }
            None => false,
        };
        self.subscriptions
            .remove_if(event_name, |_, handlers| handlers.is_empty());
        removed
    }

    pub fn emit<T: Any + Send + Sync>(&self, event_name: &str, payload: T) -> EmitReport {
        self.emit_event(&Event::new(event_name, payload))
    }

    pub fn emit_event(&self, event: &Event) -> EmitReport {
        let snapshot: Vec<Subscription> = match self.subscriptions.get(event.name()) {
            Some(entry) => entry.value().clone(),
            None => return EmitReport::default(),
        };

        let mut report = EmitReport::default();
        for subscription in snapshot {
            report.invoked += 1;
            let outcome = catch_unwind(AssertUnwindSafe(|| (subscription.handler)(event)));
            let failure = match outcome {
                Ok(Ok(())) => continue,
                Ok(Err(err)) => err.to_string(),
                Err(panic) => panic_message(panic.as_ref()),
            };
            report.failed += 1;
            self.logger.error(
                "event handler failed",
                &[
                    ("event", event.name().to_string()),
                    ("handler", subscription.id.0.to_string()),
                    ("error", failure),
                ],
            );
        }
        report
    }

    pub fn subscriber_count(&self, event_name: &str) -> usize {
        self.subscriptions
            .get(event_name)
            .map(|entry| entry.len())
            .unwrap_or(0)
    }

    pub fn event_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .subscriptions
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        names.sort();
        names
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(Arc::new(LogFacade))
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        format!("panic: {msg}")
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        format!("panic: {msg}")
    } else {
        "panic".to_string()
    }
}
