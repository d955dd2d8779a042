//! State cell shared by every controller.
//!
//! A [`StateCell`] owns one controller's state together with the request
//! generation counter and the observer list. Every request takes a
//! [`Ticket`] when it starts; its result is applied only if that ticket is
//! still the newest one and the controller has not been disposed. The lock
//! is held only while a transition is applied and never across an await.
//!
//! Snapshots are queued for observers in the order their transitions were
//! applied. One caller at a time drains the queue, so an observer never sees
//! an older state after a newer one, even when completions race on different
//! worker threads.

use std::collections::VecDeque;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::JoinHandle;

use crate::client::ErrorInfo;

/// Handle returned by `subscribe`, used to unsubscribe later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// Sequence number of one issued request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

impl Ticket {
    pub fn sequence(&self) -> u64 {
        self.0
    }
}

type Observer<S> = Arc<dyn Fn(&S) + Send + Sync>;

struct Slot<S> {
    state: S,
    generation: u64,
    disposed: bool,
}

/// Snapshots awaiting delivery, oldest first.
struct Outbox<S> {
    pending: VecDeque<S>,
    draining: bool,
}

/// Controller state plus sequence-discard bookkeeping and observers.
pub struct StateCell<S> {
    slot: Mutex<Slot<S>>,
    observers: Mutex<Vec<(SubscriptionId, Observer<S>)>>,
    outbox: Mutex<Outbox<S>>,
    next_subscription: AtomicU64,
}

impl<S: fmt::Debug> fmt::Debug for StateCell<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slot = self.lock_slot();
        f.debug_struct("StateCell")
            .field("state", &slot.state)
            .field("generation", &slot.generation)
            .field("disposed", &slot.disposed)
            .finish_non_exhaustive()
    }
}

impl<S: Clone + Send + 'static> StateCell<S> {
    pub fn new(initial: S) -> Self {
        Self {
            slot: Mutex::new(Slot {
                state: initial,
                generation: 0,
                disposed: false,
            }),
            observers: Mutex::new(Vec::new()),
            outbox: Mutex::new(Outbox {
                pending: VecDeque::new(),
                draining: false,
            }),
            next_subscription: AtomicU64::new(1),
        }
    }

    /// A copy of the current state
    pub fn snapshot(&self) -> S {
        self.lock_slot().state.clone()
    }

    /// Sequence number of the newest issued request (0 if none)
    pub fn generation(&self) -> u64 {
        self.lock_slot().generation
    }

    pub fn is_disposed(&self) -> bool {
        self.lock_slot().disposed
    }

    /// Register a callback invoked with the new state after every transition.
    pub fn subscribe<F>(&self, observer: F) -> SubscriptionId
    where
        F: Fn(&S) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::Relaxed));
        self.lock_observers().push((id, Arc::new(observer)));
        id
    }

    /// Remove a callback. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut observers = self.lock_observers();
        let before = observers.len();
        observers.retain(|(sub, _)| *sub != id);
        observers.len() != before
    }

    /// Mark the controller disposed and drop every observer.
    ///
    /// Requests still in flight complete without touching state.
    pub fn dispose(&self) {
        self.lock_slot().disposed = true;
        self.lock_observers().clear();
        self.lock_outbox().pending.clear();
    }

    /// Start a new request: bump the generation and apply the loading
    /// transition. Returns `None` once disposed.
    pub(crate) fn begin(&self, transition: impl FnOnce(&mut S)) -> Option<Ticket> {
        let ticket = {
            let mut slot = self.lock_slot();
            if slot.disposed {
                return None;
            }
            slot.generation += 1;
            transition(&mut slot.state);
            self.lock_outbox().pending.push_back(slot.state.clone());
            Ticket(slot.generation)
        };

        self.deliver();
        Some(ticket)
    }

    /// Apply a finished request if it is still the newest one.
    ///
    /// Returns `false` when the result was discarded.
    pub(crate) fn complete(&self, ticket: Ticket, transition: impl FnOnce(&mut S)) -> bool {
        {
            let mut slot = self.lock_slot();
            if slot.disposed {
                tracing::debug!(sequence = ticket.0, "controller disposed, dropping response");
                return false;
            }
            if slot.generation != ticket.0 {
                tracing::debug!(
                    sequence = ticket.0,
                    current = slot.generation,
                    "discarding superseded response"
                );
                return false;
            }
            transition(&mut slot.state);
            self.lock_outbox().pending.push_back(slot.state.clone());
        }

        self.deliver();
        true
    }

    /// Run `request` on the runtime and apply its result with `apply`.
    pub(crate) fn spawn_completion<T, Fut, A>(
        self: &Arc<Self>,
        ticket: Ticket,
        request: Fut,
        apply: A,
    ) -> JoinHandle<()>
    where
        T: Send + 'static,
        Fut: Future<Output = Result<T, ErrorInfo>> + Send + 'static,
        A: FnOnce(&mut S, Result<T, ErrorInfo>) + Send + 'static,
    {
        let cell = Arc::clone(self);
        tokio::spawn(async move {
            let result = request.await;
            if let Err(ref err) = result {
                tracing::debug!(sequence = ticket.0, error = %err, "request failed");
            }
            cell.complete(ticket, move |state| apply(state, result));
        })
    }

    /// Hand queued snapshots to observers in order.
    ///
    /// Returns at once if another caller is already draining; that caller
    /// picks up anything queued here. Observers may start new requests from
    /// inside a callback.
    fn deliver(&self) {
        {
            let mut outbox = self.lock_outbox();
            if outbox.draining {
                return;
            }
            outbox.draining = true;
        }

        loop {
            let snapshot = {
                let mut outbox = self.lock_outbox();
                match outbox.pending.pop_front() {
                    Some(snapshot) => snapshot,
                    None => {
                        outbox.draining = false;
                        return;
                    }
                }
            };

            let observers: Vec<Observer<S>> = self
                .lock_observers()
                .iter()
                .map(|(_, observer)| Arc::clone(observer))
                .collect();
            for observer in observers {
                observer(&snapshot);
            }
        }
    }

    fn lock_outbox(&self) -> MutexGuard<'_, Outbox<S>> {
        self.outbox.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_observers(&self) -> MutexGuard<'_, Vec<(SubscriptionId, Observer<S>)>> {
        self.observers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<S> StateCell<S> {
    fn lock_slot(&self) -> MutexGuard<'_, Slot<S>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_stale_ticket_is_discarded() {
        let cell = StateCell::new(0u32);
        let first = cell.begin(|s| *s = 1).unwrap();
        let second = cell.begin(|s| *s = 2).unwrap();

        assert!(cell.complete(second, |s| *s = 20));
        assert!(!cell.complete(first, |s| *s = 10));
        assert_eq!(cell.snapshot(), 20);
        assert_eq!(second.sequence(), 2);
    }

    #[test]
    fn test_observers_see_every_transition() {
        let cell = StateCell::new(0u32);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let id = cell.subscribe(move |s| sink.lock().unwrap().push(*s));

        let ticket = cell.begin(|s| *s = 1).unwrap();
        cell.complete(ticket, |s| *s = 2);
        assert!(cell.unsubscribe(id));
        assert!(!cell.unsubscribe(id));
        cell.begin(|s| *s = 3);

        assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_dispose_blocks_begin_and_complete() {
        let cell = StateCell::new(0u32);
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        cell.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let ticket = cell.begin(|s| *s = 1).unwrap();
        cell.dispose();

        assert!(!cell.complete(ticket, |s| *s = 99));
        assert!(cell.begin(|s| *s = 5).is_none());
        assert_eq!(cell.snapshot(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(cell.is_disposed());
    }

    #[test]
    fn test_observer_may_start_request_from_callback() {
        let cell = Arc::new(StateCell::new(0u32));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let inner = Arc::downgrade(&cell);
        cell.subscribe(move |s| {
            sink.lock().unwrap().push(*s);
            if *s == 1 {
                if let Some(cell) = inner.upgrade() {
                    cell.begin(|s| *s = 2);
                }
            }
        });

        cell.begin(|s| *s = 1);

        assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
        assert_eq!(cell.generation(), 2);
    }

    #[test]
    fn test_racing_completions_are_delivered_in_apply_order() {
        use std::sync::mpsc;

        let cell = Arc::new(StateCell::new(0u32));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel::<()>();
        let entered_tx = Mutex::new(entered_tx);
        let release_rx = Mutex::new(release_rx);
        let sink = Arc::clone(&seen);
        cell.subscribe(move |s| {
            if *s == 10 {
                entered_tx.lock().unwrap().send(()).unwrap();
                release_rx.lock().unwrap().recv().unwrap();
            }
            sink.lock().unwrap().push(*s);
        });

        let first = cell.begin(|s| *s = 1).unwrap();
        let slow = {
            let cell = Arc::clone(&cell);
            std::thread::spawn(move || cell.complete(first, |s| *s = 10))
        };
        entered_rx.recv().unwrap();

        let second = cell.begin(|s| *s = 2).unwrap();
        assert!(cell.complete(second, |s| *s = 20));
        release_tx.send(()).unwrap();
        assert!(slow.join().unwrap());

        assert_eq!(*seen.lock().unwrap(), vec![1, 10, 2, 20]);
        assert_eq!(cell.snapshot(), 20);
    }
}
