use std::{
    sync::{Arc, Weak},
    thread,
};

use crate::{
    drain::Lane,
    AffinityViolation, ContentLoader, DispatchError, Fetcher, OwnerThread, ResourceKind,
    TickHandler, TickSource,
};

mod builder;

pub use builder::{DispatcherBuilder, DispatcherConfig};

/// Everything a dispatcher and its drain handlers share.
struct Shared<Loader, Tick>
where
    Loader: ContentLoader,
    Tick: TickSource,
{
    owner: OwnerThread,
    fetcher: Fetcher<Loader>,
    lanes: [Lane<Loader::Resource>; 2],
    tick: Tick,
    config: DispatcherConfig,
}

/// Loads resources that may only be acquired on one owner thread, from any thread.
///
/// On the owner thread, loads call the content loader directly. Everywhere else, the request
/// is queued for the owner thread and the caller blocks until a drain handler, fired by the
/// host's tick source on the owner thread, posts the result. Each resource kind has its own
/// queue and handler; a handler is subscribed only while its queue has work.
///
/// Dispatchers are cheap to clone; clones share the same queues and owner thread.
///
/// # Example
/// ```rust
/// use std::{sync::Arc, thread};
/// use tickbound::{Dispatcher, TickHub};
///
/// let hub = Arc::new(TickHub::new());
/// let dispatcher = Dispatcher::builder(
///     |name: &str| -> Result<String, String> { Ok(format!("texture:{}", name)) },
///     hub.clone(),
/// )
/// .build();
/// dispatcher.initialize().unwrap();
///
/// let worker = {
///     let dispatcher = dispatcher.clone();
///     thread::spawn(move || dispatcher.load_image("rock"))
/// };
/// // The host's frame loop, running on the owner thread.
/// while !worker.is_finished() {
///     hub.fire();
///     thread::yield_now();
/// }
/// assert_eq!(worker.join().unwrap().unwrap(), "texture:rock");
/// ```
pub struct Dispatcher<Loader, Tick>
where
    Loader: ContentLoader,
    Tick: TickSource,
{
    shared: Arc<Shared<Loader, Tick>>,
}

impl<Loader, Tick> Clone for Dispatcher<Loader, Tick>
where
    Loader: ContentLoader,
    Tick: TickSource,
{
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<Loader, Tick> Dispatcher<Loader, Tick>
where
    Loader: ContentLoader,
    Tick: TickSource + 'static,
{
    /// Creates a new [`DispatcherBuilder`](struct.DispatcherBuilder.html) around the host's
    /// content loader and tick source.
    pub fn builder(loader: Loader, tick: Tick) -> DispatcherBuilder<Loader, Tick> {
        DispatcherBuilder {
            loader,
            tick,
            sprite_sheets: Default::default(),
            config: DispatcherConfig::default(),
        }
    }

    pub(crate) fn build(builder: DispatcherBuilder<Loader, Tick>) -> Self {
        let DispatcherBuilder {
            loader,
            tick,
            sprite_sheets,
            config,
        } = builder;
        let owner = match config.owner {
            Some(id) => OwnerThread::with_owner(id),
            None => OwnerThread::new(),
        };
        log::debug!(
            "dispatcher built with {} global sprite sheets, wait timeout {:?}",
            sprite_sheets.len(),
            config.wait_timeout
        );
        Self {
            shared: Arc::new(Shared {
                owner,
                fetcher: Fetcher::new(loader, sprite_sheets),
                lanes: [
                    Lane::new(ResourceKind::Image),
                    Lane::new(ResourceKind::SpriteSheet),
                ],
                tick,
                config,
            }),
        }
    }

    /// Records the calling thread as the owner thread.
    ///
    /// Must be called exactly once, on the thread that fires the tick source, before any
    /// load from another thread. Calling it again fails with
    /// [`DispatchError::AlreadyInitialized`](enum.DispatchError.html) and changes nothing.
    pub fn initialize(&self) -> Result<(), DispatchError> {
        self.shared.owner.initialize()
    }

    pub fn is_owner_thread(&self) -> bool {
        self.shared.owner.is_owner_thread()
    }

    pub fn owner(&self) -> &OwnerThread {
        &self.shared.owner
    }

    pub fn tick_source(&self) -> &Tick {
        &self.shared.tick
    }

    pub fn loader(&self) -> &Loader {
        self.shared.fetcher.loader()
    }

    pub fn config(&self) -> &DispatcherConfig {
        &self.shared.config
    }

    /// Loads a sprite sheet; see [`::load()`](#method.load).
    pub fn load_sprite_sheet(&self, name: &str) -> Result<Loader::Resource, DispatchError> {
        self.load(name, ResourceKind::SpriteSheet)
    }

    /// Loads an image; see [`::load()`](#method.load).
    pub fn load_image(&self, name: &str) -> Result<Loader::Resource, DispatchError> {
        self.load(name, ResourceKind::Image)
    }

    /// Loads the resource `name` of the given kind, blocking until it's available.
    ///
    /// Called on the owner thread, fetches immediately. Called on any other thread, queues
    /// the request and waits for the next drain on the owner thread; nothing is cached, so
    /// every call results in a fresh fetch.
    ///
    /// # Errors
    /// - [`DispatchError::NotFound`] if the content loader can't resolve `name`.
    /// - [`DispatchError::ThreadAffinity`] if no owner thread has been initialized.
    /// - [`DispatchError::Timeout`] if a wait timeout is configured and elapses.
    /// - [`DispatchError::Disconnected`] if the delivery slot is dropped without a result.
    ///
    /// [`DispatchError::NotFound`]: enum.DispatchError.html#variant.NotFound
    /// [`DispatchError::ThreadAffinity`]: enum.DispatchError.html#variant.ThreadAffinity
    /// [`DispatchError::Timeout`]: enum.DispatchError.html#variant.Timeout
    /// [`DispatchError::Disconnected`]: enum.DispatchError.html#variant.Disconnected
    pub fn load(&self, name: &str, kind: ResourceKind) -> Result<Loader::Resource, DispatchError> {
        let shared = &*self.shared;
        match shared.owner.owner() {
            Some(owner) if owner == thread::current().id() => {
                shared.fetcher.fetch(&shared.owner, name, kind)
            }
            Some(_) => {
                let weak = Arc::downgrade(&self.shared);
                let ticket = shared
                    .lane(kind)
                    .submit(name, &shared.tick, || drain_handler(weak, kind));
                ticket.wait(shared.config.wait_timeout)
            }
            None => Err(shared.owner.refuse("Dispatcher::load", AffinityViolation::Uninitialized)),
        }
    }

    /// Number of requests of `kind` waiting for a drain.
    pub fn pending_len(&self, kind: ResourceKind) -> usize {
        self.shared.lane(kind).pending_len()
    }

    /// Number of callers of `kind` waiting on a delivery.
    pub fn mailbox_len(&self, kind: ResourceKind) -> usize {
        self.shared.lane(kind).mailbox_len()
    }

    /// Whether the drain handler of `kind` is subscribed to the tick source.
    pub fn is_subscribed(&self, kind: ResourceKind) -> bool {
        self.shared.lane(kind).is_active()
    }
}

impl<Loader, Tick> Shared<Loader, Tick>
where
    Loader: ContentLoader,
    Tick: TickSource,
{
    fn lane(&self, kind: ResourceKind) -> &Lane<Loader::Resource> {
        &self.lanes[kind.index()]
    }

    fn drain(&self, kind: ResourceKind) -> Result<(), DispatchError> {
        self.owner.check("drain handler")?;
        let Shared {
            owner,
            fetcher,
            tick,
            ..
        } = self;
        self.lane(kind)
            .drain(tick, |name| fetcher.fetch(owner, name, kind));
        Ok(())
    }
}

impl<Loader, Tick> Drop for Shared<Loader, Tick>
where
    Loader: ContentLoader,
    Tick: TickSource,
{
    fn drop(&mut self) {
        for lane in &self.lanes {
            lane.detach(&self.tick);
        }
    }
}

/// The handler subscribed for a lane; it holds the dispatcher weakly so that a tick source
/// outliving the dispatcher doesn't keep it alive.
fn drain_handler<Loader, Tick>(shared: Weak<Shared<Loader, Tick>>, kind: ResourceKind) -> TickHandler
where
    Loader: ContentLoader,
    Tick: TickSource + 'static,
{
    Arc::new(move || {
        if let Some(shared) = shared.upgrade() {
            // Refused drains leave the queue untouched for the owner thread's next tick.
            if let Err(error) = shared.drain(kind) {
                log::trace!("{} drain skipped: {}", kind, error);
            }
        }
    })
}
