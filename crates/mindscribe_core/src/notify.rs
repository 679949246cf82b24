//! Synchronous, typed publish/subscribe.
//!
//! # Responsibility
//! - Deliver change notifications from managers to renderers.
//!
//! # Invariants
//! - Handlers run synchronously, in subscription order.
//! - A handler that errors or panics never prevents later handlers from
//!   running; the failure is logged and counted.
//! - Subscription ids are never reused within one bus.

use log::warn;
use std::error::Error;
use std::fmt::Debug;
use std::panic::{catch_unwind, AssertUnwindSafe};

pub type HandlerError = Box<dyn Error + Send + Sync>;
pub type HandlerResult = Result<(), HandlerError>;

type Handler<P> = Box<dyn FnMut(&P) -> HandlerResult>;

/// Handle returned by [`EventBus::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Outcome of one [`EventBus::publish`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishReport {
    pub delivered: usize,
    pub failed: usize,
}

struct Subscriber<K, P> {
    id: SubscriptionId,
    kind: K,
    handler: Handler<P>,
}

/// Event bus keyed by an event kind `K` carrying payloads of type `P`.
pub struct EventBus<K, P> {
    next_id: u64,
    subscribers: Vec<Subscriber<K, P>>,
}

impl<K, P> Default for EventBus<K, P> {
    fn default() -> Self {
        Self {
            next_id: 0,
            subscribers: Vec::new(),
        }
    }
}

impl<K: Copy + Eq + Debug, P> EventBus<K, P> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for events of `kind`.
    pub fn subscribe<F>(&mut self, kind: K, handler: F) -> SubscriptionId
    where
        F: FnMut(&P) -> HandlerResult + 'static,
    {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.subscribers.push(Subscriber {
            id,
            kind,
            handler: Box::new(handler),
        });
        id
    }

    /// Removes a subscription. Returns `false` if it was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|subscriber| subscriber.id != id);
        self.subscribers.len() != before
    }

    pub fn subscriber_count(&self, kind: K) -> usize {
        self.subscribers
            .iter()
            .filter(|subscriber| subscriber.kind == kind)
            .count()
    }

    /// Invokes every handler registered for `kind` with `payload`.
    pub fn publish(&mut self, kind: K, payload: &P) -> PublishReport {
        let mut report = PublishReport::default();
        for subscriber in self
            .subscribers
            .iter_mut()
            .filter(|subscriber| subscriber.kind == kind)
        {
            let handler = &mut subscriber.handler;
            match catch_unwind(AssertUnwindSafe(|| handler(payload))) {
                Ok(Ok(())) => report.delivered += 1,
                Ok(Err(err)) => {
                    report.failed += 1;
                    warn!("event=notify_handler module=notify status=error kind={kind:?} error={err}");
                }
                Err(_) => {
                    report.failed += 1;
                    warn!("event=notify_handler module=notify status=panic kind={kind:?}");
                }
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::{EventBus, PublishReport};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Topic {
        Saved,
        Removed,
    }

    #[test]
    fn handlers_run_in_subscription_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut bus: EventBus<Topic, u32> = EventBus::new();
        for label in ["first", "second", "third"] {
            let seen = Rc::clone(&seen);
            bus.subscribe(Topic::Saved, move |value| {
                seen.borrow_mut().push(format!("{label}:{value}"));
                Ok(())
            });
        }

        bus.publish(Topic::Saved, &7);
        assert_eq!(
            *seen.borrow(),
            vec!["first:7", "second:7", "third:7"]
        );
    }

    #[test]
    fn failing_handlers_do_not_block_the_rest() {
        let hits = Rc::new(RefCell::new(0));
        let mut bus: EventBus<Topic, ()> = EventBus::new();
        bus.subscribe(Topic::Saved, |_| Err("boom".into()));
        bus.subscribe(Topic::Saved, |_| panic!("handler panic"));
        let counter = Rc::clone(&hits);
        bus.subscribe(Topic::Saved, move |_| {
            *counter.borrow_mut() += 1;
            Ok(())
        });

        let report = bus.publish(Topic::Saved, &());
        assert_eq!(
            report,
            PublishReport {
                delivered: 1,
                failed: 2
            }
        );
        assert_eq!(*hits.borrow(), 1);
    }

    #[test]
    fn unsubscribe_stops_delivery_and_filters_by_kind() {
        let hits = Rc::new(RefCell::new(0));
        let mut bus: EventBus<Topic, ()> = EventBus::new();
        let counter = Rc::clone(&hits);
        let id = bus.subscribe(Topic::Removed, move |_| {
            *counter.borrow_mut() += 1;
            Ok(())
        });

        bus.publish(Topic::Saved, &());
        assert_eq!(*hits.borrow(), 0);
        bus.publish(Topic::Removed, &());
        assert_eq!(*hits.borrow(), 1);

        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.publish(Topic::Removed, &());
        assert_eq!(*hits.borrow(), 1);
        assert_eq!(bus.subscriber_count(Topic::Removed), 0);
    }
}
