/// Minimal synchronous publish/subscribe channel.
///
/// Handlers run on the caller's thread, in registration order, before
/// `trigger` returns. Marshaling to other threads is the handler's job.
use std::fmt;

/// Handle returned by `Emitter::on`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Subscriber<T> {
    id: SubscriptionId,
    once: bool,
    handler: Box<dyn FnMut(&T)>,
}

/// An ordered list of event handlers.
pub struct Emitter<T> {
    subscribers: Vec<Subscriber<T>>,
    next_id: u64,
}

impl<T> fmt::Debug for Emitter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emitter")
            .field("subscribers", &self.subscribers.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}

impl<T> Default for Emitter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Emitter<T> {
    /// Creates an emitter with no subscribers.
    pub fn new() -> Self {
        Self {
            subscribers: Vec::new(),
            next_id: 0,
        }
    }

    /// Registers a handler called on every `trigger`.
    pub fn on(&mut self, handler: impl FnMut(&T) + 'static) -> SubscriptionId {
        self.subscribe(handler, false)
    }

    /// Registers a handler that is removed after its first call.
    pub fn once(&mut self, handler: impl FnMut(&T) + 'static) -> SubscriptionId {
        self.subscribe(handler, true)
    }

    /// Removes a handler. Returns `false` if it was already gone.
    pub fn off(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|s| s.id != id);
        self.subscribers.len() != before
    }

    /// Calls every handler with `event`, in registration order.
    pub fn trigger(&mut self, event: &T) {
        for subscriber in &mut self.subscribers {
            (subscriber.handler)(event);
        }
        self.subscribers.retain(|s| !s.once);
    }

    /// Removes all handlers.
    pub fn clear(&mut self) {
        self.subscribers.clear();
    }

    /// Number of registered handlers.
    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    /// Whether no handler is registered.
    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    fn subscribe(&mut self, handler: impl FnMut(&T) + 'static, once: bool) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push(Subscriber {
            id,
            once,
            handler: Box::new(handler),
        });
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recorder() -> (Rc<RefCell<Vec<String>>>, Rc<RefCell<Vec<String>>>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        (Rc::clone(&log), log)
    }

    #[test]
    fn test_trigger_runs_handlers_in_registration_order() {
        let (log, handle) = recorder();
        let mut emitter: Emitter<u32> = Emitter::new();

        let first = Rc::clone(&handle);
        emitter.on(move |n| first.borrow_mut().push(format!("first {n}")));
        let second = Rc::clone(&handle);
        emitter.on(move |n| second.borrow_mut().push(format!("second {n}")));

        emitter.trigger(&7);
        assert_eq!(*log.borrow(), vec!["first 7", "second 7"]);
    }

    #[test]
    fn test_off_unsubscribes() {
        let (log, handle) = recorder();
        let mut emitter: Emitter<u32> = Emitter::new();

        let id = emitter.on(move |n| handle.borrow_mut().push(n.to_string()));
        assert!(emitter.off(id));
        assert!(!emitter.off(id));

        emitter.trigger(&1);
        assert!(log.borrow().is_empty());
        assert!(emitter.is_empty());
    }

    #[test]
    fn test_once_fires_a_single_time() {
        let (log, handle) = recorder();
        let mut emitter: Emitter<u32> = Emitter::new();

        emitter.once(move |n| handle.borrow_mut().push(n.to_string()));
        emitter.trigger(&1);
        emitter.trigger(&2);

        assert_eq!(*log.borrow(), vec!["1"]);
        assert_eq!(emitter.len(), 0);
    }

    #[test]
    fn test_clear_removes_everything() {
        let mut emitter: Emitter<u32> = Emitter::new();
        emitter.on(|_| {});
        emitter.once(|_| {});
        assert_eq!(emitter.len(), 2);

        emitter.clear();
        assert!(emitter.is_empty());
    }
}
