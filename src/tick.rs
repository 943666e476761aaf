use parking_lot::Mutex;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

/// A callback fired once per host tick, on the thread driving the tick.
pub type TickHandler = Arc<dyn Fn() + Send + Sync>;

/// Identity a handler is subscribed and unsubscribed under.
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct HandlerId(u64);

impl HandlerId {
    /// Returns an identity no other call in this process has returned.
    pub fn unique() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        HandlerId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// The host's per-frame callback subscription capability.
///
/// Handlers may subscribe or unsubscribe (themselves included) while being fired,
/// so implementations must not hold internal locks while invoking handlers.
pub trait TickSource: Send + Sync {
    /// Subscribes `handler` under `id`; subscribing an `id` that is already present
    /// must not make it fire twice per tick.
    fn subscribe(&self, id: HandlerId, handler: TickHandler);

    /// Removes the handler subscribed under `id`, if any.
    fn unsubscribe(&self, id: HandlerId);
}

impl<T> TickSource for Arc<T>
where
    T: TickSource + ?Sized,
{
    fn subscribe(&self, id: HandlerId, handler: TickHandler) {
        (**self).subscribe(id, handler);
    }

    fn unsubscribe(&self, id: HandlerId) {
        (**self).unsubscribe(id);
    }
}

impl<T> TickSource for &'_ T
where
    T: TickSource + ?Sized,
{
    fn subscribe(&self, id: HandlerId, handler: TickHandler) {
        (**self).subscribe(id, handler);
    }

    fn unsubscribe(&self, id: HandlerId) {
        (**self).unsubscribe(id);
    }
}

/// A ready-made [`TickSource`](trait.TickSource.html) for hosts without an event system
/// of their own: call [`::fire()`](#method.fire) once per frame from the owner thread.
#[derive(Default)]
pub struct TickHub {
    handlers: Mutex<Vec<(HandlerId, TickHandler)>>,
    ticks: AtomicU64,
}

impl TickHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Invokes every handler subscribed at the moment of the call, in subscription order,
    /// and returns how many were invoked.
    ///
    /// Handlers subscribed during the firing run on the next tick.
    pub fn fire(&self) -> usize {
        let handlers: Vec<TickHandler> = self
            .handlers
            .lock()
            .iter()
            .map(|(_, handler)| handler.clone())
            .collect();
        self.ticks.fetch_add(1, Ordering::Relaxed);
        for handler in &handlers {
            handler();
        }
        handlers.len()
    }

    /// Number of times [`::fire()`](#method.fire) has been called.
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    pub fn subscriber_count(&self) -> usize {
        self.handlers.lock().len()
    }

    pub fn is_subscribed(&self, id: HandlerId) -> bool {
        self.handlers.lock().iter().any(|(other, _)| *other == id)
    }
}

impl TickSource for TickHub {
    fn subscribe(&self, id: HandlerId, handler: TickHandler) {
        let mut handlers = self.handlers.lock();
        if handlers.iter().any(|(other, _)| *other == id) {
            log::warn!("handler {:?} is already subscribed", id);
            return;
        }
        handlers.push((id, handler));
    }

    fn unsubscribe(&self, id: HandlerId) {
        self.handlers.lock().retain(|(other, _)| *other != id);
    }
}
