//! Slot storage for the nodes of an ordered index.

use std::collections::TryReserveError;
use std::ops;

use crate::skipnode::{NodeId, SkipNode};

/// Growable storage addressed by [`NodeId`].
///
/// Slot 0 always holds the head node.  Released slots are kept on a free-list
/// and handed out again before the storage grows.
#[derive(Clone, Debug)]
pub(crate) struct Arena<K> {
    slots: Vec<Option<SkipNode<K>>>,
    free: Vec<NodeId>,
}

impl<K> Arena<K> {
    /// Create an arena holding only `head`.
    pub fn new(head: SkipNode<K>) -> Self {
        Arena {
            slots: vec![Some(head)],
            free: Vec::new(),
        }
    }

    /// Store `node`, reusing a released slot if there is one.
    pub fn alloc(&mut self, node: SkipNode<K>) -> NodeId {
        if let Some(id) = self.free.pop() {
            self.slots[id.index()] = Some(node);
            id
        } else {
            self.slots.push(Some(node));
            NodeId::new(self.slots.len() - 1)
        }
    }

    /// Make sure the next [`alloc`][Arena::alloc] does not need to allocate.
    pub fn try_reserve(&mut self) -> Result<(), TryReserveError> {
        if self.free.is_empty() {
            self.slots.try_reserve(1)
        } else {
            Ok(())
        }
    }

    /// Take the node out of its slot and put the slot on the free-list.
    ///
    /// The caller must have unlinked the node from every level first.
    pub fn release(&mut self, id: NodeId) -> SkipNode<K> {
        debug_assert_ne!(id, NodeId::HEAD, "the head node is never released");
        match self.slots.get_mut(id.index()).and_then(Option::take) {
            Some(node) => {
                self.free.push(id);
                node
            }
            None => unreachable!("released a vacant slot {}", id.index()),
        }
    }

    /// Drop every node and start over with `head`.  Keeps the allocation.
    pub fn reset(&mut self, head: SkipNode<K>) {
        self.slots.clear();
        self.free.clear();
        self.slots.push(Some(head));
    }

    /// Number of occupied slots, the head included.
    #[cfg(test)]
    pub fn live(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// Number of slots ever handed out, occupied or not.
    #[cfg(test)]
    pub fn slots(&self) -> usize {
        self.slots.len()
    }
}

impl<K> ops::Index<NodeId> for Arena<K> {
    type Output = SkipNode<K>;

    fn index(&self, id: NodeId) -> &Self::Output {
        match self.slots.get(id.index()) {
            Some(Some(node)) => node,
            _ => unreachable!("dangling link to slot {}", id.index()),
        }
    }
}

impl<K> ops::IndexMut<NodeId> for Arena<K> {
    fn index_mut(&mut self, id: NodeId) -> &mut Self::Output {
        match self.slots.get_mut(id.index()) {
            Some(Some(node)) => node,
            _ => unreachable!("dangling link to slot {}", id.index()),
        }
    }
}
