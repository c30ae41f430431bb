use crate::core::ResourceId;
use ahash::AHashSet as HashSet;
use std::collections::VecDeque;

/// A FIFO of resources awaiting reconciliation. A resource that is already queued is not queued
/// again, so bursts of changes to the same resource are reconciled once.
#[derive(Debug, Default)]
pub(crate) struct Queue {
    order: VecDeque<ResourceId>,
    queued: HashSet<ResourceId>,
}

impl Queue {
    /// Returns false if the resource was already queued.
    pub(crate) fn push(&mut self, id: ResourceId) -> bool {
        if !self.queued.insert(id.clone()) {
            return false;
        }
        self.order.push_back(id);
        true
    }

    pub(crate) fn pop(&mut self) -> Option<ResourceId> {
        let id = self.order.pop_front()?;
        self.queued.remove(&id);
        Some(id)
    }

    pub(crate) fn len(&self) -> usize {
        self.order.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coalesces() {
        let mut queue = Queue::default();
        let cafe = ResourceId::new("default", "cafe");
        let tea = ResourceId::new("default", "tea");

        assert!(queue.push(cafe.clone()));
        assert!(queue.push(tea.clone()));
        assert!(!queue.push(cafe.clone()));
        assert_eq!(queue.len(), 2);

        assert_eq!(queue.pop(), Some(cafe.clone()));

        // Once popped, a resource may be queued again.
        assert!(queue.push(cafe.clone()));
        assert_eq!(queue.pop(), Some(tea));
        assert_eq!(queue.pop(), Some(cafe));
        assert_eq!(queue.pop(), None);
    }
}
