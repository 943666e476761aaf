use std::{collections::HashMap, thread::ThreadId, time::Duration};

use crate::{ContentLoader, Dispatcher, TickSource};

/// Plain settings of a [`Dispatcher`](struct.Dispatcher.html).
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DispatcherConfig {
    /// How long a worker waits for its delivery before giving up;
    /// `None` waits for as long as it takes.
    pub wait_timeout: Option<Duration>,
    /// Owner thread to record up front, instead of calling
    /// [`Dispatcher::initialize()`](struct.Dispatcher.html#method.initialize) later.
    pub owner: Option<ThreadId>,
}

/// A builder for [`Dispatcher`](struct.Dispatcher.html) (and the only way of creating one).
pub struct DispatcherBuilder<Loader, Tick>
where
    Loader: ContentLoader,
    Tick: TickSource,
{
    pub(crate) loader: Loader,
    pub(crate) tick: Tick,
    pub(crate) sprite_sheets: HashMap<String, Loader::Resource>,
    pub(crate) config: DispatcherConfig,
}

impl<Loader, Tick> DispatcherBuilder<Loader, Tick>
where
    Loader: ContentLoader,
    Tick: TickSource + 'static,
{
    /// Registers a sprite sheet the host already holds, so requests for `name` resolve to it
    /// without going through the content loader.
    ///
    /// Typically called for each of the [`well_known`](well_known/index.html) names:
    /// ```rust
    /// # use std::sync::Arc;
    /// use tickbound::{well_known, Dispatcher, TickHub};
    ///
    /// let loader = |name: &str| -> Result<Arc<String>, String> { Ok(Arc::new(name.to_owned())) };
    /// let dispatcher = Dispatcher::builder(loader, Arc::new(TickHub::new()))
    ///     .sprite_sheet(well_known::EMOTE_SPRITE_SHEET, Arc::new("emotes".to_owned()))
    ///     .build();
    /// dispatcher.initialize().unwrap();
    /// let sheet = dispatcher.load_sprite_sheet(well_known::EMOTE_SPRITE_SHEET).unwrap();
    /// assert_eq!(*sheet, "emotes");
    /// ```
    pub fn sprite_sheet(mut self, name: impl Into<String>, resource: Loader::Resource) -> Self {
        let name = name.into();
        if !crate::well_known::contains(&name) {
            log::debug!("registering non-standard global sprite sheet `{}`", name);
        }
        self.sprite_sheets.insert(name, resource);
        self
    }

    /// Makes workers give up with [`DispatchError::Timeout`](enum.DispatchError.html)
    /// if their request isn't serviced within `timeout`.
    ///
    /// By default workers wait until the owner thread gets to their request, however long
    /// that takes; a host that stops ticking will leave them blocked.
    pub fn wait_timeout(mut self, timeout: Duration) -> Self {
        self.config.wait_timeout = Some(timeout);
        self
    }

    /// Records `owner` as the owner thread when the dispatcher is built.
    pub fn owner_thread(mut self, owner: ThreadId) -> Self {
        self.config.owner = Some(owner);
        self
    }

    /// Replaces all plain settings at once.
    pub fn config(mut self, config: DispatcherConfig) -> Self {
        self.config = config;
        self
    }

    /// Consumes the builder and returns the finalized dispatcher.
    pub fn build(self) -> Dispatcher<Loader, Tick> {
        Dispatcher::build(self)
    }
}
