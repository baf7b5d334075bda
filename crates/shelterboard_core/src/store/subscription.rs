//! Snapshot subscriptions for store collections.
//!
//! # Invariants
//! - Every event carries a full replacement snapshot, never a delta.
//! - `Failed` is terminal: no further events follow it.
//! - Dropping a `Subscription` unsubscribes; the publisher prunes it on the
//!   next publish.

use std::cell::RefCell;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::time::Duration;

/// Event delivered to a subscriber.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotEvent<T> {
    /// Full replacement snapshot of the collection.
    Snapshot(Vec<T>),
    /// Terminal error; the subscription is closed afterwards.
    Failed(String),
}

/// Receiving end of a collection subscription.
pub struct Subscription<T> {
    receiver: Receiver<SnapshotEvent<T>>,
}

impl<T> Subscription<T> {
    /// Returns the next pending event without blocking.
    pub fn try_next(&self) -> Option<SnapshotEvent<T>> {
        match self.receiver.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Waits up to `timeout` for the next event.
    pub fn next_timeout(&self, timeout: Duration) -> Option<SnapshotEvent<T>> {
        match self.receiver.recv_timeout(timeout) {
            Ok(event) => Some(event),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Drains pending events and returns the one that matters.
    ///
    /// A terminal `Failed` wins over any snapshot; otherwise the newest
    /// snapshot is returned.
    pub fn latest(&self) -> Option<SnapshotEvent<T>> {
        let mut latest = None;
        while let Some(event) = self.try_next() {
            if let SnapshotEvent::Failed(_) = event {
                return Some(event);
            }
            latest = Some(event);
        }
        latest
    }
}

/// Publisher side kept by the store, one per collection.
pub(super) struct SubscriberList<T> {
    senders: RefCell<Vec<Sender<SnapshotEvent<T>>>>,
}

impl<T: Clone> SubscriberList<T> {
    pub(super) fn new() -> Self {
        Self {
            senders: RefCell::new(Vec::new()),
        }
    }

    /// Registers a subscriber and hands it `initial` right away.
    pub(super) fn subscribe(&self, initial: Vec<T>) -> Subscription<T> {
        let (sender, receiver) = mpsc::channel();
        // The receiver is alive here, so this send cannot fail.
        let _ = sender.send(SnapshotEvent::Snapshot(initial));
        self.senders.borrow_mut().push(sender);
        Subscription { receiver }
    }

    pub(super) fn publish(&self, snapshot: &[T]) {
        self.senders.borrow_mut().retain(|sender| {
            sender
                .send(SnapshotEvent::Snapshot(snapshot.to_vec()))
                .is_ok()
        });
    }

    /// Sends a terminal error to every subscriber and forgets them.
    pub(super) fn fail(&self, message: &str) {
        for sender in self.senders.borrow_mut().drain(..) {
            let _ = sender.send(SnapshotEvent::Failed(message.to_string()));
        }
    }

    pub(super) fn len(&self) -> usize {
        self.senders.borrow().len()
    }
}
