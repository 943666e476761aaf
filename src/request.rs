use std::fmt::{Display, Formatter, Result as FmtResult};

/// The kinds of resource a [`Dispatcher`](struct.Dispatcher.html) can marshal.
///
/// Each kind has its own pending queue, mailbox, and drain handler.
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum ResourceKind {
    Image,
    SpriteSheet,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 2] = [ResourceKind::Image, ResourceKind::SpriteSheet];

    pub(crate) fn index(self) -> usize {
        match self {
            ResourceKind::Image => 0,
            ResourceKind::SpriteSheet => 1,
        }
    }
}

impl Display for ResourceKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            ResourceKind::Image => f.pad("image"),
            ResourceKind::SpriteSheet => f.pad("sprite sheet"),
        }
    }
}

/// A single request for a named resource, as it sits in a pending queue.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct ResourceRequest {
    pub name: String,
    pub kind: ResourceKind,
}

impl ResourceRequest {
    pub fn new(name: impl Into<String>, kind: ResourceKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}
