//! An always-ordered index of unique keys.

use std::{borrow::Borrow, cmp, fmt, iter, ops::Range};

use tracing::Level as LogLevel;

use crate::{
    arena::Arena,
    error::IndexError,
    level_generator::{Geometric, GeometricError, LevelGenerator},
    options::{DEFAULT_MAX_HEIGHT, IndexOptions},
    skipnode::{NodeId, SkipNode},
};

/// The lowest value the number of active levels can take.  Level 0 stays
/// active even when the index is empty.
pub const FLOOR: usize = 1;

// ////////////////////////////////////////////////////////////////////////////
// OrderedIndex
// ////////////////////////////////////////////////////////////////////////////

/// The ordered index stores unique keys such that they are always sorted, and
/// provides expected `O(log n)` search, insertion and deletion.
///
/// Internally it is a skiplist: a head node anchors one linked chain per level,
/// level 0 holds every key, and each new key is promoted to higher levels
/// according to a [`LevelGenerator`].  Nodes live in an arena and link to each
/// other by index; a deleted node's slot is reused by a later insertion.
///
/// Duplicate keys are rejected rather than replaced.
///
/// The index does no synchronisation of its own.  Mutation takes `&mut self`,
/// so callers sharing an index between threads must serialise whole
/// insertions and deletions themselves.
///
/// # Examples
///
/// ```
/// use ordered_index::OrderedIndex;
///
/// let mut index = OrderedIndex::with_max_height(4).unwrap();
/// for key in [3, 6, 7, 9, 12, 19, 17, 26, 21, 25] {
///     assert!(index.insert(key));
/// }
///
/// assert!(index.search(&6));
/// assert!(!index.search(&99));
/// assert!(index.delete(&17));
/// assert!(!index.search(&17));
/// assert!(index.iter().copied().eq([3, 6, 7, 9, 12, 19, 21, 25, 26]));
/// ```
pub struct OrderedIndex<K, G = Geometric> {
    // Slot 0 is the head; every other occupied slot is linked on level 0.
    arena: Arena<K>,
    len: usize,
    // Number of levels in use, in `[FLOOR, max_height]`.
    active_levels: usize,
    max_height: usize,
    level_generator: G,
}

// ///////////////////////////////////////////////
// Inherent methods
// ///////////////////////////////////////////////

impl<K> OrderedIndex<K, Geometric> {
    /// Create a new index with the default options: 10 levels and a fair coin.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_index::OrderedIndex;
    ///
    /// let index: OrderedIndex<i64> = OrderedIndex::new();
    /// assert!(index.is_empty());
    /// ```
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::from_generator(Geometric::fair(DEFAULT_MAX_HEIGHT))
    }

    /// Create a new index with `max_height` levels and a fair coin.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::InvalidOptions`] if `max_height` is zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_index::OrderedIndex;
    ///
    /// let index: OrderedIndex<u8> = OrderedIndex::with_max_height(4).unwrap();
    /// assert_eq!(index.max_height(), 4);
    /// assert!(OrderedIndex::<u8>::with_max_height(0).is_err());
    /// ```
    #[inline]
    pub fn with_max_height(max_height: usize) -> Result<Self, IndexError> {
        Self::with_options(IndexOptions::default().max_height(max_height))
    }

    /// Create a new index from `options`.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::InvalidOptions`] if the maximum height is zero or
    /// the probability is outside `(0, 1)`.
    #[inline]
    pub fn with_options(options: IndexOptions) -> Result<Self, IndexError> {
        let generator = match options.seed {
            Some(seed) => Geometric::with_seed(options.max_height, options.probability, seed)?,
            None => Geometric::new(options.max_height, options.probability)?,
        };
        Ok(Self::from_generator(generator))
    }
}

impl<K, G> OrderedIndex<K, G>
where
    G: LevelGenerator,
{
    /// Create a new index drawing node levels from `level_generator`.  The
    /// index has [`total`][LevelGenerator::total] levels.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::InvalidOptions`] if the generator reports zero
    /// levels.
    #[inline]
    pub fn with_level_generator(level_generator: G) -> Result<Self, IndexError> {
        if level_generator.total() == 0 {
            return Err(GeometricError::ZeroMax.into());
        }
        Ok(Self::from_generator(level_generator))
    }

    /// Expects a generator with at least one level.
    fn from_generator(level_generator: G) -> Self {
        let max_height = level_generator.total().max(1);
        OrderedIndex {
            arena: Arena::new(SkipNode::head(max_height)),
            len: 0,
            active_levels: FLOOR,
            max_height,
            level_generator,
        }
    }

    /// Draws a level for a new node, clamped to the top level.
    fn random_level(&mut self) -> usize {
        cmp::min(self.level_generator.level(), self.max_height - 1)
    }
}

impl<K, G> OrderedIndex<K, G> {
    /// Clears the index, removing all keys.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_index::OrderedIndex;
    ///
    /// let mut index = OrderedIndex::new();
    /// index.extend(0..10);
    /// index.clear();
    /// assert!(index.is_empty());
    /// assert_eq!(index.active_levels(), 1);
    /// ```
    #[inline]
    pub fn clear(&mut self) {
        tracing::event!(LogLevel::DEBUG, len = self.len, "clearing ordered index");
        self.arena.reset(SkipNode::head(self.max_height));
        self.len = 0;
        self.active_levels = FLOOR;
    }

    /// Returns the number of keys in the index.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the index contains no keys.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The configured maximum number of levels.
    #[inline]
    #[must_use]
    pub fn max_height(&self) -> usize {
        self.max_height
    }

    /// The number of levels currently in use: one more than the highest level
    /// holding a key, and never less than [`FLOOR`].
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_index::OrderedIndex;
    ///
    /// let mut index = OrderedIndex::with_max_height(8).unwrap();
    /// assert_eq!(index.active_levels(), 1);
    /// index.extend(0..100);
    /// assert!((1..=8).contains(&index.active_levels()));
    /// ```
    #[inline]
    #[must_use]
    pub fn active_levels(&self) -> usize {
        self.active_levels
    }

    /// Provides a reference to the smallest key, or `None` if the index is
    /// empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_index::OrderedIndex;
    ///
    /// let mut index = OrderedIndex::new();
    /// assert!(index.first().is_none());
    ///
    /// index.insert(2);
    /// index.insert(1);
    /// assert_eq!(index.first(), Some(&1));
    /// ```
    #[inline]
    #[must_use]
    pub fn first(&self) -> Option<&K> {
        self.iter().next()
    }

    /// Provides a reference to the largest key, or `None` if the index is
    /// empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_index::OrderedIndex;
    ///
    /// let mut index = OrderedIndex::new();
    /// assert!(index.last().is_none());
    ///
    /// index.insert(2);
    /// index.insert(1);
    /// assert_eq!(index.last(), Some(&2));
    /// ```
    #[inline]
    #[must_use]
    pub fn last(&self) -> Option<&K> {
        let node = (0..self.active_levels).rev().fold(NodeId::HEAD, |mut cursor, level| {
            while let Some(next) = self.arena[cursor].next(level) {
                cursor = next;
            }
            cursor
        });
        self.arena[node].key.as_ref()
    }

    /// Returns an ascending iterator over the keys, following level 0.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_index::OrderedIndex;
    ///
    /// let mut index = OrderedIndex::new();
    /// index.extend([5, 1, 3]);
    /// assert_eq!(index.iter().collect::<Vec<_>>(), vec![&1, &3, &5]);
    /// ```
    #[inline]
    pub fn iter(&self) -> Keys<'_, K> {
        self.keys_at(0)
    }

    /// Returns one iterator per active level, from the top level down to
    /// level 0, each yielding the keys on that level's chain in order.
    ///
    /// This is a diagnostic view and has no effect on the index.  The level
    /// iterators are lazy and can be cloned to restart them.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_index::OrderedIndex;
    ///
    /// let mut index = OrderedIndex::new();
    /// index.extend([2, 1]);
    ///
    /// let levels: Vec<_> = index.dump().collect();
    /// assert_eq!(levels.len(), index.active_levels());
    ///
    /// let bottom = levels.last().unwrap();
    /// assert_eq!(bottom.level(), 0);
    /// assert_eq!(bottom.clone().collect::<Vec<_>>(), vec![&1, &2]);
    /// ```
    #[inline]
    pub fn dump(&self) -> Dump<'_, K> {
        Dump {
            arena: &self.arena,
            levels: 0..self.active_levels,
        }
    }

    fn keys_at(&self, level: usize) -> Keys<'_, K> {
        Keys {
            arena: &self.arena,
            next: self.arena[NodeId::HEAD].next(level),
            level,
        }
    }

    /// Lowers the active levels while the top one is empty.
    fn shrink_active_levels(&mut self) {
        let before = self.active_levels;
        while self.active_levels > FLOOR
            && self.arena[NodeId::HEAD]
                .next(self.active_levels - 1)
                .is_none()
        {
            self.active_levels -= 1;
        }
        if self.active_levels != before {
            let after = self.active_levels;
            tracing::event!(LogLevel::DEBUG, "lowered active levels from {before} to {after}");
        }
    }
}

impl<K, G> OrderedIndex<K, G>
where
    K: Ord,
    G: LevelGenerator,
{
    /// Returns `true` if the index contains `key`.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_index::OrderedIndex;
    ///
    /// let mut index = OrderedIndex::new();
    /// assert!(!index.search(&4));
    ///
    /// index.extend(0..10);
    /// assert!(index.search(&4));
    /// assert!(!index.search(&15));
    /// ```
    #[inline]
    pub fn search<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let cursor = (0..self.active_levels)
            .rev()
            .fold(NodeId::HEAD, |cursor, level| {
                self.advance_at_level(cursor, level, key)
            });
        self.matching_successor(cursor, key).is_some()
    }

    /// Insert `key` into the index.
    ///
    /// Returns `false`, leaving the index untouched, if the key is already
    /// present.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_index::OrderedIndex;
    ///
    /// let mut index = OrderedIndex::new();
    ///
    /// assert!(index.insert(0));
    /// assert!(index.insert(5));
    /// assert!(!index.insert(5));
    /// assert_eq!(index.len(), 2);
    /// ```
    #[inline]
    pub fn insert(&mut self, key: K) -> bool {
        let mut update = Vec::with_capacity(self.max_height);
        let cursor = self.descend(&key, &mut update);
        if self.matching_successor(cursor, &key).is_some() {
            tracing::event!(LogLevel::TRACE, "rejected duplicate key");
            return false;
        }

        let level = self.random_level();
        self.splice(&update, SkipNode::new(key, level));
        true
    }

    /// Insert `key` into the index, reporting why it could not be inserted.
    ///
    /// All the memory the new node needs is reserved before any link is
    /// changed, so on error the index is exactly as it was.
    ///
    /// # Errors
    ///
    /// - [`IndexError::DuplicateKey`] if the key is already present.
    /// - [`IndexError::Allocation`] if memory for the node cannot be reserved.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_index::{IndexError, OrderedIndex};
    ///
    /// let mut index = OrderedIndex::new();
    /// assert_eq!(index.try_insert("a"), Ok(()));
    /// assert_eq!(index.try_insert("a"), Err(IndexError::DuplicateKey));
    /// ```
    #[inline]
    pub fn try_insert(&mut self, key: K) -> Result<(), IndexError> {
        let mut update = Vec::new();
        update.try_reserve_exact(self.max_height)?;
        let cursor = self.descend(&key, &mut update);
        if self.matching_successor(cursor, &key).is_some() {
            return Err(IndexError::DuplicateKey);
        }

        let level = self.random_level();
        let node = SkipNode::try_new(key, level)?;
        self.arena.try_reserve()?;
        self.splice(&update, node);
        Ok(())
    }

    /// Remove `key` from the index.
    ///
    /// Returns `false`, leaving the index untouched, if the key is not
    /// present.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_index::OrderedIndex;
    ///
    /// let mut index = OrderedIndex::new();
    /// index.extend(0..10);
    ///
    /// assert!(index.delete(&4));
    /// assert!(!index.delete(&4));
    /// assert_eq!(index.len(), 9);
    /// ```
    #[inline]
    pub fn delete<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.try_delete(key).is_ok()
    }

    /// Remove `key` from the index and return the stored key.
    ///
    /// # Errors
    ///
    /// [`IndexError::KeyNotFound`] if the key is not present.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_index::{IndexError, OrderedIndex};
    ///
    /// let mut index = OrderedIndex::new();
    /// index.insert(String::from("memtable"));
    ///
    /// assert_eq!(index.try_delete("memtable"), Ok(String::from("memtable")));
    /// assert_eq!(index.try_delete("memtable"), Err(IndexError::KeyNotFound));
    /// ```
    #[inline]
    pub fn try_delete<Q>(&mut self, key: &Q) -> Result<K, IndexError>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut update = Vec::with_capacity(self.max_height);
        let cursor = self.descend(key, &mut update);
        let Some(found) = self.matching_successor(cursor, key) else {
            return Err(IndexError::KeyNotFound);
        };

        // A predecessor that does not point at the node means the node stops
        // below this level.
        let top = cmp::min(self.active_levels - 1, self.arena[found].level);
        let mut unlinked = 0;
        for (level, &prev) in update.iter().enumerate().take(top + 1) {
            if self.arena[prev].next(level) != Some(found) {
                break;
            }
            let next = self.arena[found].next(level);
            self.arena[prev].links[level] = next;
            unlinked += 1;
        }

        let mut node = self.arena.release(found);
        node.links.clear();
        self.len -= 1;
        tracing::event!(LogLevel::TRACE, unlinked, len = self.len, "unlinked node");

        self.shrink_active_levels();
        node.into_inner().ok_or(IndexError::KeyNotFound)
    }

    /// Walk along `level` from `cursor` while the next key is strictly less
    /// than `key`, returning the last node visited.
    fn advance_at_level<Q>(&self, mut cursor: NodeId, level: usize, key: &Q) -> NodeId
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        while let Some(next) = self.arena[cursor].next(level) {
            match self.arena[next].key.as_ref() {
                Some(next_key) if Borrow::<Q>::borrow(next_key) < key => cursor = next,
                _ => break,
            }
        }
        cursor
    }

    /// Descend from the head through the active levels, filling `update` so
    /// that `update[i]` is the last node on level `i` whose key is less than
    /// `key`.  Levels above the active ones get the head.
    ///
    /// Returns the level-0 predecessor.
    fn descend<Q>(&self, key: &Q, update: &mut Vec<NodeId>) -> NodeId
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        update.clear();
        update.resize(self.max_height, NodeId::HEAD);

        let mut cursor = NodeId::HEAD;
        for level in (0..self.active_levels).rev() {
            cursor = self.advance_at_level(cursor, level, key);
            update[level] = cursor;
        }
        cursor
    }

    /// The level-0 successor of `cursor`, if it holds `key`.
    fn matching_successor<Q>(&self, cursor: NodeId, key: &Q) -> Option<NodeId>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let next = self.arena[cursor].next(0)?;
        let next_key = self.arena[next].key.as_ref()?;
        (Borrow::<Q>::borrow(next_key) == key).then_some(next)
    }

    /// Link `node` in after `update[i]` on each of its levels.
    ///
    /// Nothing in here allocates except [`Arena::alloc`], which the fallible
    /// path reserves beforehand.
    fn splice(&mut self, update: &[NodeId], mut node: SkipNode<K>) {
        let level = node.level;
        if level >= self.active_levels {
            let before = self.active_levels;
            self.active_levels = level + 1;
            let after = self.active_levels;
            tracing::event!(LogLevel::DEBUG, "raised active levels from {before} to {after}");
        }

        // Entries of `update` above the old active levels are the head.
        for (i, &prev) in update.iter().enumerate().take(level + 1) {
            node.links[i] = self.arena[prev].next(i);
        }
        let id = self.arena.alloc(node);
        for (i, &prev) in update.iter().enumerate().take(level + 1) {
            self.arena[prev].links[i] = Some(id);
        }

        self.len += 1;
        tracing::event!(LogLevel::TRACE, node_level = level, len = self.len, "spliced node");
    }
}

// ///////////////////////////////////////////////
// Trait implementation
// ///////////////////////////////////////////////

impl<K> Default for OrderedIndex<K, Geometric> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<K, G> Extend<K> for OrderedIndex<K, G>
where
    K: Ord,
    G: LevelGenerator,
{
    /// Duplicate keys are skipped.
    #[inline]
    fn extend<I: IntoIterator<Item = K>>(&mut self, iterable: I) {
        for key in iterable {
            self.insert(key);
        }
    }
}

impl<K> iter::FromIterator<K> for OrderedIndex<K, Geometric>
where
    K: Ord,
{
    #[inline]
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut index = Self::new();
        index.extend(iter);
        index
    }
}

impl<'a, K, G> IntoIterator for &'a OrderedIndex<K, G> {
    type Item = &'a K;
    type IntoIter = Keys<'a, K>;

    #[inline]
    fn into_iter(self) -> Keys<'a, K> {
        self.iter()
    }
}

impl<K, G> fmt::Debug for OrderedIndex<K, G>
where
    K: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;

        for (i, key) in self.iter().enumerate() {
            if i != 0 {
                write!(f, ", ")?;
            }
            write!(f, "{key:?}")?;
        }
        write!(f, "]")
    }
}

/// Writes one row per active level, top level first, as `level: keys...`.
impl<K, G> fmt::Display for OrderedIndex<K, G>
where
    K: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, keys) in self.dump().enumerate() {
            if i != 0 {
                writeln!(f)?;
            }
            write!(f, "{}:", keys.level())?;
            for key in keys {
                write!(f, " {key}")?;
            }
        }
        Ok(())
    }
}

// ////////////////////////////////////////////////////////////////////////////
// Iterators
// ////////////////////////////////////////////////////////////////////////////

/// Iterator over the keys on one level of an [`OrderedIndex`], in ascending
/// order.
///
/// Returned by [`OrderedIndex::iter`] (level 0) and by [`Dump`].
pub struct Keys<'a, K> {
    arena: &'a Arena<K>,
    next: Option<NodeId>,
    level: usize,
}

impl<K> Keys<'_, K> {
    /// The level this iterator walks.
    #[inline]
    #[must_use]
    pub fn level(&self) -> usize {
        self.level
    }
}

impl<K> Clone for Keys<'_, K> {
    #[inline]
    fn clone(&self) -> Self {
        Keys {
            arena: self.arena,
            next: self.next,
            level: self.level,
        }
    }
}

impl<'a, K> Iterator for Keys<'a, K> {
    type Item = &'a K;

    #[inline]
    fn next(&mut self) -> Option<&'a K> {
        let arena = self.arena;
        let node = &arena[self.next?];
        self.next = node.next(self.level);
        node.key.as_ref()
    }
}

impl<K> iter::FusedIterator for Keys<'_, K> {}

/// Iterator over the active levels of an [`OrderedIndex`], from the top level
/// down to level 0.
///
/// Returned by [`OrderedIndex::dump`].
pub struct Dump<'a, K> {
    arena: &'a Arena<K>,
    levels: Range<usize>,
}

impl<K> Clone for Dump<'_, K> {
    #[inline]
    fn clone(&self) -> Self {
        Dump {
            arena: self.arena,
            levels: self.levels.clone(),
        }
    }
}

impl<'a, K> Iterator for Dump<'a, K> {
    type Item = Keys<'a, K>;

    #[inline]
    fn next(&mut self) -> Option<Keys<'a, K>> {
        let level = self.levels.next_back()?;
        Some(Keys {
            arena: self.arena,
            next: self.arena[NodeId::HEAD].next(level),
            level,
        })
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.levels.size_hint()
    }
}

impl<K> ExactSizeIterator for Dump<'_, K> {}

impl<K> iter::FusedIterator for Dump<'_, K> {}

// ////////////////////////////////////////////////////////////////////////////
// Integrity check
// ////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
impl<K, G> OrderedIndex<K, G>
where
    K: Ord,
{
    /// Checks the integrity of the index, panicking on the first violation.
    fn check(&self) {
        assert!(
            (FLOOR..=self.max_height).contains(&self.active_levels),
            "active levels {} outside [{FLOOR}, {}]",
            self.active_levels,
            self.max_height
        );
        let head = &self.arena[NodeId::HEAD];
        assert!(head.is_head());
        assert_eq!(head.links.len(), self.max_height);
        if self.active_levels > FLOOR {
            assert!(
                head.next(self.active_levels - 1).is_some(),
                "top active level is empty"
            );
        }

        let bottom: Vec<NodeId> =
            iter::successors(head.next(0), |&id| self.arena[id].next(0)).collect();
        assert_eq!(bottom.len(), self.len);
        assert_eq!(self.arena.live(), self.len + 1);

        for level in 0..self.max_height {
            let chain: Vec<NodeId> =
                iter::successors(head.next(level), |&id| self.arena[id].next(level)).collect();
            if level >= self.active_levels {
                assert!(chain.is_empty(), "dead level {level} is linked");
                continue;
            }

            for &id in &chain {
                let node = &self.arena[id];
                assert!(!node.is_head());
                assert_eq!(node.links.len(), node.level + 1);
                assert!(node.level >= level, "node below level {level} linked on it");
            }
            for pair in chain.windows(2) {
                assert!(
                    self.arena[pair[0]].key < self.arena[pair[1]].key,
                    "level {level} out of order"
                );
            }
            // Together with the checks above, every node reaching this level
            // is on its chain exactly once.
            let reaching = bottom
                .iter()
                .filter(|&&id| self.arena[id].level >= level)
                .count();
            assert_eq!(chain.len(), reaching, "level {level} skips a node");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeSet, VecDeque};

    use anyhow::Result;
    use pretty_assertions::assert_eq;
    use rand::{Rng, SeedableRng, rngs::StdRng};
    use rstest::rstest;

    use super::{FLOOR, OrderedIndex};
    use crate::{GeometricError, IndexError, IndexOptions, level_generator::LevelGenerator};

    /// Hands out a fixed sequence of levels, then level 0 forever.
    struct Scripted {
        total: usize,
        levels: VecDeque<usize>,
    }

    impl Scripted {
        fn new(total: usize, levels: impl IntoIterator<Item = usize>) -> Self {
            Scripted {
                total,
                levels: levels.into_iter().collect(),
            }
        }
    }

    impl LevelGenerator for Scripted {
        fn total(&self) -> usize {
            self.total
        }

        fn level(&mut self) -> usize {
            self.levels.pop_front().unwrap_or(0)
        }
    }

    const SCENARIO: [u32; 10] = [3, 6, 7, 9, 12, 19, 17, 26, 21, 25];

    fn scenario() -> Result<OrderedIndex<u32, Scripted>> {
        let generator = Scripted::new(4, [0, 1, 0, 2, 0, 1, 0, 0, 1, 0]);
        let mut index = OrderedIndex::with_level_generator(generator)?;
        for key in SCENARIO {
            assert!(index.insert(key));
            index.check();
        }
        Ok(index)
    }

    fn rows<K: Clone, G>(index: &OrderedIndex<K, G>) -> Vec<Vec<K>> {
        index.dump().map(|keys| keys.cloned().collect()).collect()
    }

    #[test]
    fn empty() {
        let mut index: OrderedIndex<i64> = OrderedIndex::new();
        index.check();
        assert!(index.is_empty());
        assert!(!index.search(&1));
        assert!(!index.delete(&1));
        assert_eq!(index.first(), None);
        assert_eq!(index.last(), None);
        assert_eq!(index.active_levels(), FLOOR);
        assert_eq!(rows(&index), vec![Vec::<i64>::new()]);
        index.check();
    }

    #[test]
    fn first_insert_links_level_zero() -> Result<()> {
        let mut index = OrderedIndex::with_max_height(4)?;
        assert!(index.insert(42));
        index.check();
        assert_eq!(index.len(), 1);
        assert_eq!(index.iter().collect::<Vec<_>>(), vec![&42]);
        assert_eq!(index.first(), Some(&42));
        assert_eq!(index.last(), Some(&42));
        Ok(())
    }

    #[test]
    fn zero_height_rejected() {
        assert_eq!(
            OrderedIndex::<u8>::with_max_height(0).err(),
            Some(IndexError::InvalidOptions(GeometricError::ZeroMax))
        );
        assert!(OrderedIndex::<u8, _>::with_level_generator(Scripted::new(0, [])).is_err());
        assert!(
            OrderedIndex::<u8>::with_options(IndexOptions::default().probability(1.0)).is_err()
        );
    }

    #[test]
    fn scenario_with_scripted_levels() -> Result<()> {
        let mut index = scenario()?;
        assert_eq!(index.active_levels(), 3);
        assert_eq!(
            rows(&index),
            vec![
                vec![9],
                vec![6, 9, 19, 21],
                vec![3, 6, 7, 9, 12, 17, 19, 21, 25, 26],
            ]
        );

        assert!(index.search(&6));
        assert!(!index.search(&99));
        assert!(index.delete(&17));
        index.check();
        assert!(!index.search(&17));
        assert_eq!(
            index.iter().copied().collect::<Vec<_>>(),
            vec![3, 6, 7, 9, 12, 19, 21, 25, 26]
        );
        insta::assert_snapshot!(index.to_string(), @r"
        2: 9
        1: 6 9 19 21
        0: 3 6 7 9 12 19 21 25 26
        ");
        Ok(())
    }

    #[test]
    fn scenario_with_seeded_levels() -> Result<()> {
        let options = IndexOptions::default().max_height(4).seed(0x1234_abcd);
        let mut index = OrderedIndex::with_options(options)?;
        for key in SCENARIO {
            assert!(index.insert(key));
        }
        index.check();

        assert!(index.search(&6));
        assert!(!index.search(&99));
        assert!(index.delete(&17));
        assert!(!index.search(&17));
        assert_eq!(
            index.iter().copied().collect::<Vec<_>>(),
            vec![3, 6, 7, 9, 12, 19, 21, 25, 26]
        );
        index.check();
        Ok(())
    }

    #[test]
    fn seeded_shapes_match() -> Result<()> {
        let options = IndexOptions::default().max_height(6).seed(7);
        let mut a = OrderedIndex::with_options(options)?;
        let mut b = OrderedIndex::with_options(options)?;
        a.extend(0..200_u32);
        b.extend(0..200_u32);
        assert_eq!(rows(&a), rows(&b));
        Ok(())
    }

    #[test]
    fn deleting_tallest_node_lowers_levels() -> Result<()> {
        let mut index = scenario()?;
        assert!(index.delete(&9));
        index.check();
        assert_eq!(index.active_levels(), 2);
        assert_eq!(
            rows(&index),
            vec![vec![6, 19, 21], vec![3, 6, 7, 12, 17, 19, 21, 25, 26]]
        );

        for key in [6, 19, 21] {
            assert!(index.delete(&key));
            index.check();
        }
        assert_eq!(index.active_levels(), FLOOR);
        Ok(())
    }

    #[test]
    fn levels_above_active_splice_after_head() -> Result<()> {
        let generator = Scripted::new(5, [0, 0, 4]);
        let mut index = OrderedIndex::with_level_generator(generator)?;
        index.extend([10, 30, 20]);
        index.check();
        assert_eq!(index.active_levels(), 5);
        assert_eq!(
            rows(&index),
            vec![
                vec![20],
                vec![20],
                vec![20],
                vec![20],
                vec![10, 20, 30]
            ]
        );
        Ok(())
    }

    #[test]
    fn generator_level_is_clamped() -> Result<()> {
        let generator = Scripted::new(3, [17]);
        let mut index = OrderedIndex::with_level_generator(generator)?;
        assert!(index.insert('k'));
        index.check();
        assert_eq!(index.active_levels(), 3);
        Ok(())
    }

    #[test]
    fn duplicate_rejected() -> Result<()> {
        let mut index = scenario()?;
        let before = rows(&index);
        assert!(!index.insert(12));
        assert_eq!(index.try_insert(12), Err(IndexError::DuplicateKey));
        index.check();
        assert_eq!(index.len(), SCENARIO.len());
        assert_eq!(rows(&index), before);
        Ok(())
    }

    #[test]
    fn double_delete() -> Result<()> {
        let mut index = scenario()?;
        assert!(index.delete(&12));
        let before = rows(&index);
        assert!(!index.delete(&12));
        assert_eq!(index.try_delete(&12), Err(IndexError::KeyNotFound));
        index.check();
        assert_eq!(rows(&index), before);
        Ok(())
    }

    #[test]
    fn try_delete_returns_key() {
        let mut index: OrderedIndex<String> =
            ["b", "a", "c"].into_iter().map(String::from).collect();
        assert_eq!(index.try_delete("a"), Ok(String::from("a")));
        assert!(index.search("b"));
        assert!(!index.search("a"));
        index.check();
    }

    #[test]
    fn delete_everything() -> Result<()> {
        let mut index = OrderedIndex::with_max_height(8)?;
        index.extend(0..500);
        index.check();
        for key in (0..500).rev() {
            assert!(index.delete(&key));
        }
        index.check();
        assert!(index.is_empty());
        assert_eq!(index.active_levels(), FLOOR);
        assert_eq!(rows(&index), vec![Vec::<i32>::new()]);
        Ok(())
    }

    #[test]
    fn slots_are_reused() -> Result<()> {
        let mut index = OrderedIndex::with_max_height(6)?;
        index.extend(0..64);
        let slots = index.arena.slots();
        for key in 0..32 {
            assert!(index.delete(&key));
        }
        index.extend(100..132);
        index.check();
        assert_eq!(index.arena.slots(), slots);
        assert_eq!(index.len(), 64);
        Ok(())
    }

    #[test]
    fn clear() {
        let mut index: OrderedIndex<usize> = (0..100).collect();
        index.clear();
        index.check();
        assert!(index.is_empty());
        assert!(!index.search(&5));
        assert!(index.insert(5));
        index.check();
    }

    #[rstest]
    fn random_against_model(
        #[values(1, 2, 4, 16)] max_height: usize,
        #[values(0.25, 0.5, 0.75)] p: f64,
    ) -> Result<()> {
        let options = IndexOptions::default()
            .max_height(max_height)
            .probability(p)
            .seed(0x1234_abcd);
        let mut index = OrderedIndex::with_options(options)?;
        let mut model = BTreeSet::new();
        let mut rng = StdRng::seed_from_u64(0xdead_beef);

        for step in 0..2_000 {
            let key: u16 = rng.random_range(0..256);
            if rng.random_bool(0.6) {
                assert_eq!(index.insert(key), model.insert(key));
            } else {
                assert_eq!(index.delete(&key), model.remove(&key));
            }
            assert_eq!(index.search(&key), model.contains(&key));
            if step % 100 == 0 {
                index.check();
            }
        }
        index.check();
        assert!(index.iter().eq(model.iter()));
        assert_eq!(index.first(), model.first());
        assert_eq!(index.last(), model.last());
        Ok(())
    }

    #[test]
    fn iterators_restart() -> Result<()> {
        let index = scenario()?;
        let dump = index.dump();
        assert_eq!(dump.len(), 3);
        let again: Vec<Vec<u32>> = dump.clone().map(|keys| keys.copied().collect()).collect();
        let once: Vec<Vec<u32>> = dump.map(|keys| keys.copied().collect()).collect();
        assert_eq!(again, once);

        let mut keys = index.iter();
        assert_eq!(keys.next(), Some(&3));
        let restarted = keys.clone();
        assert_eq!(keys.count(), restarted.count());
        Ok(())
    }

    #[test]
    fn debug_display() -> Result<()> {
        let index = scenario()?;
        assert_eq!(
            format!("{index:?}"),
            "[3, 6, 7, 9, 12, 17, 19, 21, 25, 26]"
        );
        insta::assert_snapshot!(index.to_string(), @r"
        2: 9
        1: 6 9 19 21
        0: 3 6 7 9 12 17 19 21 25 26
        ");

        let empty: OrderedIndex<u8> = OrderedIndex::new();
        assert_eq!(format!("{empty:?}"), "[]");
        assert_eq!(empty.to_string(), "0:");
        Ok(())
    }

    #[test]
    fn borrowed_lookup() {
        let mut index: OrderedIndex<Vec<u8>> = OrderedIndex::new();
        assert!(index.insert(b"key-1".to_vec()));
        assert!(index.insert(b"key-0".to_vec()));
        assert!(index.search(b"key-1".as_slice()));
        assert!(index.delete(b"key-0".as_slice()));
        assert_eq!(index.len(), 1);
    }
}
