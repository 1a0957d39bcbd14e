//! Events
//!
//! Two pieces:
//! - `EventQueue<T>`: a per-tick buffer. Gameplay code pushes into it while the
//!   world is mutably borrowed, and the owner drains it once the tick is done.
//! - `EventBus<E>`: synchronous publish/subscribe. Handlers run in subscription
//!   order on the emitting call. A handler that fails or panics is logged and
//!   skipped; the remaining handlers still see the event.

use std::hash::Hash;
use std::panic::{catch_unwind, AssertUnwindSafe};

use rustc_hash::FxHashMap;

use crate::error::HandlerError;

/// Events collected during a tick and drained at a known point.
#[derive(Debug)]
pub struct EventQueue<T> {
    events: Vec<T>,
}

impl<T> EventQueue<T> {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn send(&mut self, event: T) {
        self.events.push(event);
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.events.iter()
    }

    pub fn drain(&mut self) -> impl Iterator<Item = T> + '_ {
        self.events.drain(..)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl<T> Default for EventQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// An event that can travel over an `EventBus`.
pub trait BusEvent {
    type Kind: Copy + Eq + Hash + std::fmt::Debug;

    fn kind(&self) -> Self::Kind;
}

pub type Handler<E> = Box<dyn FnMut(&E) -> Result<(), HandlerError>>;

/// Returned by `subscribe`, used to `unsubscribe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

pub struct EventBus<E: BusEvent> {
    handlers: FxHashMap<E::Kind, Vec<(SubscriptionId, Handler<E>)>>,
    next_id: u64,
    /// Handler failures since creation, shown on the debug overlay
    failures: u64,
}

impl<E: BusEvent> EventBus<E> {
    pub fn new() -> Self {
        Self {
            handlers: FxHashMap::default(),
            next_id: 0,
            failures: 0,
        }
    }

    pub fn subscribe(
        &mut self,
        kind: E::Kind,
        handler: impl FnMut(&E) -> Result<(), HandlerError> + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.handlers
            .entry(kind)
            .or_default()
            .push((id, Box::new(handler)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        for list in self.handlers.values_mut() {
            if let Some(pos) = list.iter().position(|(sid, _)| *sid == id) {
                list.remove(pos);
                return true;
            }
        }
        false
    }

    /// Deliver `event` to every handler subscribed to its kind.
    /// Returns the number of handlers that completed successfully.
    pub fn emit(&mut self, event: &E) -> usize {
        let kind = event.kind();
        let Some(list) = self.handlers.get_mut(&kind) else {
            return 0;
        };

        let mut delivered = 0;
        for (id, handler) in list.iter_mut() {
            match catch_unwind(AssertUnwindSafe(|| handler(event))) {
                Ok(Ok(())) => delivered += 1,
                Ok(Err(err)) => {
                    self.failures += 1;
                    tracing::error!(?kind, subscription = id.0, "event handler failed: {err}");
                }
                Err(_) => {
                    self.failures += 1;
                    tracing::error!(?kind, subscription = id.0, "event handler panicked");
                }
            }
        }
        delivered
    }

    pub fn subscriber_count(&self, kind: E::Kind) -> usize {
        self.handlers.get(&kind).map_or(0, Vec::len)
    }

    pub fn failures(&self) -> u64 {
        self.failures
    }
}

impl<E: BusEvent> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Kind {
        Ping,
        Pong,
    }

    #[derive(Debug)]
    enum Msg {
        Ping(u32),
        Pong,
    }

    impl BusEvent for Msg {
        type Kind = Kind;
        fn kind(&self) -> Kind {
            match self {
                Msg::Ping(_) => Kind::Ping,
                Msg::Pong => Kind::Pong,
            }
        }
    }

    #[test]
    fn test_queue_drain_empties() {
        let mut queue = EventQueue::new();
        queue.send(1);
        queue.send(2);
        assert_eq!(queue.len(), 2);
        let drained: Vec<_> = queue.drain().collect();
        assert_eq!(drained, vec![1, 2]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_handlers_run_in_subscription_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut bus: EventBus<Msg> = EventBus::new();

        let a = log.clone();
        bus.subscribe(Kind::Ping, move |msg| {
            if let Msg::Ping(n) = msg {
                a.borrow_mut().push(("a", *n));
            }
            Ok(())
        });
        let b = log.clone();
        bus.subscribe(Kind::Ping, move |msg| {
            if let Msg::Ping(n) = msg {
                b.borrow_mut().push(("b", *n));
            }
            Ok(())
        });

        assert_eq!(bus.emit(&Msg::Ping(7)), 2);
        assert_eq!(bus.emit(&Msg::Pong), 0);
        assert_eq!(*log.borrow(), vec![("a", 7), ("b", 7)]);
    }

    #[test]
    fn test_failing_handler_does_not_stop_others() {
        let hits = Rc::new(RefCell::new(0));
        let mut bus: EventBus<Msg> = EventBus::new();

        bus.subscribe(Kind::Pong, |_| Err(HandlerError::new("speaker unplugged")));
        bus.subscribe(Kind::Pong, |_| panic!("boom"));
        let h = hits.clone();
        bus.subscribe(Kind::Pong, move |_| {
            *h.borrow_mut() += 1;
            Ok(())
        });

        assert_eq!(bus.emit(&Msg::Pong), 1);
        assert_eq!(*hits.borrow(), 1);
        assert_eq!(bus.failures(), 2);
    }

    #[test]
    fn test_unsubscribe() {
        let mut bus: EventBus<Msg> = EventBus::new();
        let id = bus.subscribe(Kind::Ping, |_| Ok(()));
        assert_eq!(bus.subscriber_count(Kind::Ping), 1);
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        assert_eq!(bus.emit(&Msg::Ping(1)), 0);
    }
}
