use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use std::{
    collections::{HashMap, VecDeque},
    time::Duration,
};

use crate::{DispatchError, ResourceKind};

/// What a drain cycle posts for a request: the resource, or a failure marker.
pub type Delivery<R> = Result<R, DispatchError>;

/// Completed-result delivery for one resource kind, keyed by name.
///
/// Each waiting caller owns a single-use slot; a drain cycle posts into as many slots
/// of a name as it serviced requests for, and the slot's owner is the only reader.
pub struct Mailbox<R> {
    kind: ResourceKind,
    slots: HashMap<String, VecDeque<Sender<Delivery<R>>>>,
}

impl<R> Mailbox<R>
where
    R: Clone,
{
    pub fn new(kind: ResourceKind) -> Self {
        Self {
            kind,
            slots: HashMap::new(),
        }
    }

    /// Opens a slot for `name` and returns the ticket that will receive its delivery.
    pub fn register(&mut self, name: &str) -> Ticket<R> {
        let (sender, receiver) = crossbeam_channel::bounded(1);
        self.slots
            .entry(name.to_owned())
            .or_insert_with(VecDeque::new)
            .push_back(sender);
        Ticket {
            name: name.to_owned(),
            kind: self.kind,
            receiver,
        }
    }

    /// Posts `delivery` into up to `count` of the oldest slots for `name`,
    /// returning how many callers actually received it.
    pub fn post(&mut self, name: &str, count: usize, delivery: &Delivery<R>) -> usize {
        let kind = self.kind;
        let slots = match self.slots.get_mut(name) {
            Some(slots) => slots,
            None => {
                log::warn!("no {} slots open for `{}`", kind, name);
                return 0;
            }
        };
        let take = count.min(slots.len());
        let delivered = slots
            .drain(..take)
            .filter(|slot| {
                // A fresh single-capacity slot can only refuse if its ticket is gone.
                let sent = slot.try_send(delivery.clone()).is_ok();
                if !sent {
                    log::debug!("{} `{}` waiter left before delivery", kind, name);
                }
                sent
            })
            .count();
        if slots.is_empty() {
            self.slots.remove(name);
        }
        delivered
    }

    /// Number of open slots across all names.
    pub fn len(&self) -> usize {
        self.slots.values().map(VecDeque::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// The receiving end of one mailbox slot, held by the waiting caller.
#[must_use = "dropping a ticket abandons the request's result"]
pub struct Ticket<R> {
    name: String,
    kind: ResourceKind,
    receiver: Receiver<Delivery<R>>,
}

impl<R> Ticket<R> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Checks for a delivery without blocking.
    pub fn try_take(&self) -> Option<Delivery<R>> {
        self.receiver.try_recv().ok()
    }

    /// Blocks until the delivery arrives, or until `timeout` elapses if one is given.
    pub fn wait(self, timeout: Option<Duration>) -> Delivery<R> {
        let Ticket {
            name,
            kind,
            receiver,
        } = self;
        match timeout {
            None => receiver
                .recv()
                .unwrap_or_else(|_| Err(DispatchError::Disconnected { name, kind })),
            Some(waited) => match receiver.recv_timeout(waited) {
                Ok(delivery) => delivery,
                Err(RecvTimeoutError::Timeout) => {
                    log::warn!("{} `{}` not delivered within {:?}", kind, name, waited);
                    Err(DispatchError::Timeout { name, kind, waited })
                }
                Err(RecvTimeoutError::Disconnected) => {
                    Err(DispatchError::Disconnected { name, kind })
                }
            },
        }
    }
}
