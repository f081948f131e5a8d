use std::collections::TryReserveError;
use std::iter;

// ////////////////////////////////////////////////////////////////////////////
// NodeId
// ////////////////////////////////////////////////////////////////////////////

/// Stable address of a [`SkipNode`] inside the index's arena.
///
/// Links between nodes are stored as `Option<NodeId>` rather than pointers, so
/// a node is reachable only through the arena that owns it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(usize);

impl NodeId {
    /// The header sentinel always lives in the first slot.
    pub(crate) const HEAD: Self = NodeId(0);

    pub(crate) fn new(index: usize) -> Self {
        NodeId(index)
    }

    pub(crate) fn index(self) -> usize {
        self.0
    }
}

// ////////////////////////////////////////////////////////////////////////////
// SkipNode
// ////////////////////////////////////////////////////////////////////////////

/// SkipNodes make up the ordered index.  The index owns the head node (which
/// has no key) and every other node through its arena.
///
/// The node has a `level` which corresponds to how 'high' the node reaches.
///
/// A node of `level` n has (n + 1) links to next nodes, which are stored in
/// a vector.  There are no back links: once a node is unlinked from every
/// level, nothing refers to it.
#[derive(Clone, Debug)]
pub(crate) struct SkipNode<K> {
    // The key should never be None, with the sole exception being the head
    // node.
    pub key: Option<K>,
    // How high the node reaches.
    pub level: usize,
    // Vector of links to the next node at the respective level.  This vector
    // *must* be of length `self.level + 1`.
    pub links: Vec<Option<NodeId>>,
}

// ///////////////////////////////////////////////
// Inherent methods
// ///////////////////////////////////////////////

impl<K> SkipNode<K> {
    /// Create a new head node reaching through `total_levels` levels.
    ///
    /// `total_levels` must be at least 1.
    pub fn head(total_levels: usize) -> Self {
        SkipNode {
            key: None,
            level: total_levels.saturating_sub(1),
            links: iter::repeat_n(None, total_levels.max(1)).collect(),
        }
    }

    /// Create a new SkipNode with the given key.
    /// All links default to None.
    pub fn new(key: K, level: usize) -> Self {
        SkipNode {
            key: Some(key),
            level,
            links: iter::repeat_n(None, level + 1).collect(),
        }
    }

    /// Same as [`SkipNode::new`], but reports a failure to allocate the links
    /// instead of aborting.
    pub fn try_new(key: K, level: usize) -> Result<Self, TryReserveError> {
        let mut links = Vec::new();
        links.try_reserve_exact(level + 1)?;
        links.resize(level + 1, None);
        Ok(SkipNode {
            key: Some(key),
            level,
            links,
        })
    }

    /// Consumes the node returning the key it contains.
    pub fn into_inner(self) -> Option<K> {
        self.key
    }

    /// Returns `true` is the node is a head-node.
    #[cfg(test)]
    pub fn is_head(&self) -> bool {
        self.key.is_none()
    }

    /// The next node at `level`, if this node reaches that level and has a
    /// successor there.
    pub fn next(&self, level: usize) -> Option<NodeId> {
        self.links.get(level).copied().flatten()
    }
}
