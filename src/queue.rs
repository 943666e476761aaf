use std::collections::HashMap;

use crate::ResourceRequest;

/// Ordered requests awaiting acquisition for one resource kind.
///
/// Duplicates are kept: every caller's request occupies its own position.
#[derive(Default, Debug)]
pub struct PendingQueue {
    requests: Vec<ResourceRequest>,
}

impl PendingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, request: ResourceRequest) {
        self.requests.push(request)
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    /// Copies out everything currently pending, leaving the queue intact.
    pub fn snapshot(&self) -> Vec<ResourceRequest> {
        self.requests.clone()
    }

    /// Removes the first `len` requests, i.e. the ones a previous snapshot covered.
    pub fn remove_serviced(&mut self, len: usize) {
        debug_assert!(len <= self.requests.len(), "serviced more than was pending");
        let len = len.min(self.requests.len());
        self.requests.drain(..len);
    }
}

/// Collapses a snapshot into distinct names in first-occurrence order,
/// each paired with how many requests asked for it.
pub fn batch(snapshot: &[ResourceRequest]) -> Vec<(&str, usize)> {
    let mut positions: HashMap<&str, usize> = HashMap::with_capacity(snapshot.len());
    let mut batch: Vec<(&str, usize)> = Vec::with_capacity(snapshot.len());
    for request in snapshot {
        let name = request.name.as_str();
        match positions.get(name) {
            Some(&position) => batch[position].1 += 1,
            None => {
                positions.insert(name, batch.len());
                batch.push((name, 1));
            }
        }
    }
    batch
}
