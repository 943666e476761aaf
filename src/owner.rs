use once_cell::sync::OnceCell;
use std::thread::{self, ThreadId};

use crate::{AffinityViolation, DispatchError};

/// Records the one thread that is allowed to acquire resources.
///
/// The identity is written at most once and never changes afterwards,
/// so reading it takes no locks.
#[derive(Debug, Default)]
pub struct OwnerThread {
    id: OnceCell<ThreadId>,
}

impl OwnerThread {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry that already considers `id` the owner.
    pub fn with_owner(id: ThreadId) -> Self {
        let cell = OnceCell::new();
        let _ = cell.set(id);
        Self { id: cell }
    }

    /// Captures the calling thread as the owner.
    ///
    /// Must be called exactly once, from the thread that will later drive the tick source.
    /// A second call leaves the recorded owner in place and returns
    /// [`DispatchError::AlreadyInitialized`](enum.DispatchError.html).
    pub fn initialize(&self) -> Result<(), DispatchError> {
        let current = thread::current().id();
        self.id.set(current).map_err(|_| {
            log::warn!(
                "owner thread re-initialization from {:?} ignored, owner remains {:?}",
                current,
                self.id.get()
            );
            DispatchError::AlreadyInitialized
        })?;
        log::debug!("owner thread initialized as {:?}", current);
        Ok(())
    }

    pub fn owner(&self) -> Option<ThreadId> {
        self.id.get().copied()
    }

    pub fn is_initialized(&self) -> bool {
        self.id.get().is_some()
    }

    /// Returns `true` if the calling thread is the recorded owner.
    pub fn is_owner_thread(&self) -> bool {
        self.id.get() == Some(&thread::current().id())
    }

    /// Fails with a thread affinity violation unless called on the owner thread.
    pub fn check(&self, operation: &'static str) -> Result<(), DispatchError> {
        match self.id.get() {
            Some(id) if *id == thread::current().id() => Ok(()),
            Some(_) => Err(self.refuse(operation, AffinityViolation::WrongThread)),
            None => Err(self.refuse(operation, AffinityViolation::Uninitialized)),
        }
    }

    pub(crate) fn refuse(
        &self,
        operation: &'static str,
        violation: AffinityViolation,
    ) -> DispatchError {
        log::error!(
            "`{}` refused on {:?}: {}",
            operation,
            thread::current().id(),
            violation
        );
        DispatchError::ThreadAffinity {
            operation,
            violation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uninitialized() {
        let owner = OwnerThread::new();
        assert!(!owner.is_initialized());
        assert!(!owner.is_owner_thread());
        assert_eq!(
            owner.check("test"),
            Err(DispatchError::ThreadAffinity {
                operation: "test",
                violation: AffinityViolation::Uninitialized,
            })
        );
    }

    #[test]
    fn initialize_once() {
        let owner = OwnerThread::new();
        owner.initialize().unwrap();
        assert!(owner.is_owner_thread());
        assert_eq!(owner.owner(), Some(thread::current().id()));
        assert!(owner.check("test").is_ok());
        assert_eq!(owner.initialize(), Err(DispatchError::AlreadyInitialized));
    }

    #[test]
    fn reinitialize_elsewhere_keeps_owner() {
        let owner = OwnerThread::new();
        owner.initialize().unwrap();
        thread::scope(|scope| {
            scope.spawn(|| {
                assert_eq!(owner.initialize(), Err(DispatchError::AlreadyInitialized));
                assert!(!owner.is_owner_thread());
                assert_eq!(
                    owner.check("test"),
                    Err(DispatchError::ThreadAffinity {
                        operation: "test",
                        violation: AffinityViolation::WrongThread,
                    })
                );
            });
        });
        assert!(owner.is_owner_thread());
    }

    #[test]
    fn with_owner() {
        let owner = OwnerThread::with_owner(thread::current().id());
        assert!(owner.is_owner_thread());
        assert_eq!(owner.initialize(), Err(DispatchError::AlreadyInitialized));
    }
}
