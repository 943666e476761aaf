use std::{
    collections::HashMap,
    panic::{catch_unwind, AssertUnwindSafe},
};

use crate::{DispatchError, OwnerThread, ResourceKind};

/// Names of the sprite sheets the host keeps loaded for its whole lifetime.
pub mod well_known {
    pub const EMOTE_SPRITE_SHEET: &str = "emoteSpriteSheet";
    pub const OBJECT_SPRITE_SHEET: &str = "objectSpriteSheet";
    pub const BIG_CRAFTABLE_SPRITE_SHEET: &str = "bigCraftableSpriteSheet";

    pub const ALL: [&str; 3] = [
        EMOTE_SPRITE_SHEET,
        OBJECT_SPRITE_SHEET,
        BIG_CRAFTABLE_SPRITE_SHEET,
    ];

    pub fn contains(name: &str) -> bool {
        ALL.contains(&name)
    }
}

/// The host's generic named-content loader.
///
/// It is only ever invoked on the owner thread; implementations may rely on that.
pub trait ContentLoader: Send + Sync + 'static {
    type Resource: Clone + Send + Sync + 'static;
    type Error: std::fmt::Display;

    fn load(&self, name: &str) -> Result<Self::Resource, Self::Error>;
}

impl<F, R, E> ContentLoader for F
where
    F: Fn(&str) -> Result<R, E> + Send + Sync + 'static,
    R: Clone + Send + Sync + 'static,
    E: std::fmt::Display,
{
    type Resource = R;
    type Error = E;

    fn load(&self, name: &str) -> Result<R, E> {
        self(name)
    }
}

/// Turns a resource name into a resource, or into a [`DispatchError::NotFound`] marker.
///
/// Every fetch asserts it runs on the owner thread before touching the loader.
pub struct Fetcher<Loader>
where
    Loader: ContentLoader,
{
    loader: Loader,
    sprite_sheets: HashMap<String, Loader::Resource>,
}

impl<Loader> Fetcher<Loader>
where
    Loader: ContentLoader,
{
    pub fn new(loader: Loader, sprite_sheets: HashMap<String, Loader::Resource>) -> Self {
        Self {
            loader,
            sprite_sheets,
        }
    }

    pub fn loader(&self) -> &Loader {
        &self.loader
    }

    /// Returns `true` if `name` resolves to a pre-loaded sprite sheet.
    pub fn is_global_sprite_sheet(&self, name: &str) -> bool {
        self.sprite_sheets.contains_key(name)
    }

    pub fn fetch(
        &self,
        owner: &OwnerThread,
        name: &str,
        kind: ResourceKind,
    ) -> Result<Loader::Resource, DispatchError> {
        match kind {
            ResourceKind::Image => self.image(owner, name),
            ResourceKind::SpriteSheet => self.sprite_sheet(owner, name),
        }
    }

    pub fn sprite_sheet(
        &self,
        owner: &OwnerThread,
        name: &str,
    ) -> Result<Loader::Resource, DispatchError> {
        owner.check("Fetcher::sprite_sheet")?;
        log::trace!("fetching sprite sheet `{}`", name);
        if let Some(sheet) = self.sprite_sheets.get(name) {
            return Ok(sheet.clone());
        }
        self.load(name, ResourceKind::SpriteSheet)
    }

    pub fn image(&self, owner: &OwnerThread, name: &str) -> Result<Loader::Resource, DispatchError> {
        owner.check("Fetcher::image")?;
        log::trace!("fetching image `{}`", name);
        self.load(name, ResourceKind::Image)
    }

    fn load(&self, name: &str, kind: ResourceKind) -> Result<Loader::Resource, DispatchError> {
        match catch_unwind(AssertUnwindSafe(|| self.loader.load(name))) {
            Ok(Ok(resource)) => Ok(resource),
            Ok(Err(error)) => {
                log::warn!("{} `{}` not found: {}", kind, name, error);
                Err(DispatchError::not_found(name, kind, error))
            }
            Err(payload) => {
                let reason = payload
                    .downcast_ref::<&str>()
                    .map(|s| (*s).to_owned())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "content loader panicked".to_owned());
                log::error!("content loader panicked on {} `{}`: {}", kind, name, reason);
                Err(DispatchError::not_found(name, kind, reason))
            }
        }
    }
}
