//! Loads resources that may only be acquired on a single owner thread, from any thread.
//!
//! A host (typically a game) enforces that a class of resources is only touched on one
//! thread, and fires a callback on that thread once per frame. A
//! [`Dispatcher`](struct.Dispatcher.html) lets worker threads request such resources
//! anyway: the request is queued, the dispatcher subscribes a drain handler to the host's
//! [`TickSource`](trait.TickSource.html), and the worker blocks until the owner thread has
//! fetched the resource on the next tick. Calls made on the owner thread skip all of that
//! and fetch directly.

mod dispatcher;
mod drain;
mod error;
mod fetcher;
mod mailbox;
mod owner;
mod queue;
mod request;
mod tick;

pub use dispatcher::{Dispatcher, DispatcherBuilder, DispatcherConfig};
pub use error::{AffinityViolation, DispatchError};
pub use fetcher::{well_known, ContentLoader, Fetcher};
pub use mailbox::{Delivery, Mailbox, Ticket};
pub use owner::OwnerThread;
pub use queue::PendingQueue;
pub use request::{ResourceKind, ResourceRequest};
pub use tick::{HandlerId, TickHandler, TickHub, TickSource};
