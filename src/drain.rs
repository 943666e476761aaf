use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::{
    mailbox::{Delivery, Mailbox, Ticket},
    queue::{self, PendingQueue},
    HandlerId, ResourceKind, ResourceRequest, TickHandler, TickSource,
};

/// Outcome of one drain cycle of a lane.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Default)]
pub struct DrainReport {
    /// Requests covered by the snapshot, duplicates included.
    pub requests: usize,
    /// Distinct names handed to the fetcher.
    pub fetched: usize,
    /// Distinct names that produced a failure marker.
    pub failed: usize,
    /// Callers that received a delivery.
    pub delivered: usize,
    /// Whether the lane unsubscribed and went idle at the end of the cycle.
    pub went_idle: bool,
}

/// Pending queue, mailbox and drain handler state for one resource kind.
///
/// The queue and the mailbox are guarded by separate locks and never held together.
/// The active flag only changes while the queue lock is held, which is what keeps
/// subscription idempotent and prevents a request from being stranded in an idle lane.
pub struct Lane<R> {
    kind: ResourceKind,
    handler_id: HandlerId,
    active: AtomicBool,
    queue: Mutex<PendingQueue>,
    mailbox: Mutex<Mailbox<R>>,
}

impl<R> Lane<R>
where
    R: Clone,
{
    pub fn new(kind: ResourceKind) -> Self {
        Self {
            kind,
            handler_id: HandlerId::unique(),
            active: AtomicBool::new(false),
            queue: Mutex::new(PendingQueue::new()),
            mailbox: Mutex::new(Mailbox::new(kind)),
        }
    }

    #[cfg(test)]
    pub fn handler_id(&self) -> HandlerId {
        self.handler_id
    }

    /// Whether the drain handler is currently subscribed to the tick source.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    pub fn pending_len(&self) -> usize {
        self.queue.lock().len()
    }

    pub fn mailbox_len(&self) -> usize {
        self.mailbox.lock().len()
    }

    /// Queues a request for `name` and returns the ticket its result will arrive on.
    ///
    /// `handler` is only called, and its result subscribed, if the lane was idle.
    pub fn submit<Tick, Handler>(&self, name: &str, tick: &Tick, handler: Handler) -> Ticket<R>
    where
        Tick: TickSource + ?Sized,
        Handler: FnOnce() -> TickHandler,
    {
        // The slot must exist before the request is visible to a drain.
        let ticket = self.mailbox.lock().register(name);
        let mut queue = self.queue.lock();
        queue.push(ResourceRequest::new(name, self.kind));
        log::trace!("{} `{}` queued, {} pending", self.kind, name, queue.len());
        if !self.active.swap(true, Ordering::AcqRel) {
            tick.subscribe(self.handler_id, handler());
            log::debug!("{} drain handler {:?} subscribed", self.kind, self.handler_id);
        }
        drop(queue);
        ticket
    }

    /// Runs one drain cycle: fetches every distinct name pending at the moment of the call
    /// and posts the results, then unsubscribes if nothing new arrived meanwhile.
    ///
    /// Must only be called on the owner thread; `fetch` is invoked once per distinct name.
    pub fn drain<Tick, Fetch>(&self, tick: &Tick, mut fetch: Fetch) -> DrainReport
    where
        Tick: TickSource + ?Sized,
        Fetch: FnMut(&str) -> Delivery<R>,
    {
        let snapshot = self.queue.lock().snapshot();
        let mut report = DrainReport {
            requests: snapshot.len(),
            ..DrainReport::default()
        };
        for (name, count) in queue::batch(&snapshot) {
            let delivery = fetch(name);
            report.fetched += 1;
            if delivery.is_err() {
                report.failed += 1;
            }
            report.delivered += self.mailbox.lock().post(name, count, &delivery);
        }
        let mut queue = self.queue.lock();
        queue.remove_serviced(snapshot.len());
        if queue.is_empty() {
            self.active.store(false, Ordering::Release);
            tick.unsubscribe(self.handler_id);
            report.went_idle = true;
            log::debug!(
                "{} drain handler {:?} unsubscribed",
                self.kind,
                self.handler_id
            );
        }
        drop(queue);
        log::debug!("{} drain cycle: {:?}", self.kind, report);
        report
    }

    /// Unsubscribes the drain handler if it is still active.
    pub fn detach<Tick>(&self, tick: &Tick)
    where
        Tick: TickSource + ?Sized,
    {
        let _queue = self.queue.lock();
        if self.active.swap(false, Ordering::AcqRel) {
            tick.unsubscribe(self.handler_id);
        }
    }
}
