use std::collections::HashMap;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll};

use smarthome_api::models::ThermostatSnapshot;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio_stream::Stream;
use uuid::Uuid;

/// Set of live snapshot observers. Each observer owns a small bounded
/// channel; publishing never waits on one.
pub struct ObserverRegistry {
    observers: Mutex<HashMap<Uuid, mpsc::Sender<ThermostatSnapshot>>>,
    capacity: usize,
}

impl ObserverRegistry {
    pub fn new(capacity: usize) -> Self {
        Self {
            observers: Mutex::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }

    /// Registers a new observer. It is removed again when the returned
    /// subscription is dropped.
    pub fn subscribe(self: &Arc<Self>) -> Subscription {
        let id = Uuid::new_v4();
        let (sender, receiver) = mpsc::channel(self.capacity);

        let count = {
            let mut observers = self.lock();
            observers.insert(id, sender);
            observers.len()
        };
        tracing::debug!(observer = %id, count, "observer subscribed");

        Subscription {
            id,
            receiver,
            registry: Arc::clone(self),
        }
    }

    pub fn unsubscribe(&self, id: &Uuid) -> bool {
        let removed = self.lock().remove(id).is_some();
        if removed {
            tracing::debug!(observer = %id, "observer unsubscribed");
        }
        removed
    }

    /// Drops every observer, ending their streams.
    pub fn close_all(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sends the snapshot to every observer and returns how many received
    /// it. Observers that are gone or too slow to keep up are dropped.
    pub fn publish(&self, snapshot: &ThermostatSnapshot) -> usize {
        let observers: Vec<_> = self
            .lock()
            .iter()
            .map(|(id, sender)| (*id, sender.clone()))
            .collect();

        let mut delivered = 0;
        for (id, sender) in observers {
            match sender.try_send(snapshot.clone()) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => {
                    tracing::warn!(observer = %id, "dropping slow observer");
                    self.unsubscribe(&id);
                }
                Err(TrySendError::Closed(_)) => {
                    self.unsubscribe(&id);
                }
            }
        }

        delivered
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<Uuid, mpsc::Sender<ThermostatSnapshot>>> {
        self.observers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

pub struct Subscription {
    id: Uuid,
    receiver: mpsc::Receiver<ThermostatSnapshot>,
    registry: Arc<ObserverRegistry>,
}

impl Stream for Subscription {
    type Item = ThermostatSnapshot;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().receiver.poll_recv(cx)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.registry.unsubscribe(&self.id);
    }
}
