//! The ordered index uses a probabilistic distribution of nodes over its
//! internal levels, whereby the lowest level (level 0) contains all the nodes,
//! and each level $n > 0$ contains a random subset of the nodes on level
//! `n - 1`.
//!
//! Most commonly, a geometric distribution is used whereby the chance that a
//! node occupies level $n$ is $p$ times the chance of occupying level $n-1$
//! (with $0 < p < 1$).  With a fair coin ($p = 1/2$) the expected number of
//! forward links per node is 2, and the expected number of levels touched by
//! an operation is $O(\log n)$.
//!
//! There is no rebalancing.  The balance of the index is only bounded in
//! expectation: an unlucky (or adversarial) sequence of draws can degrade an
//! operation towards $O(n)$.  This is accepted behaviour.
//!
//! It is very unlikely that this will need to be changed as the default should
//! suffice, but if need be custom level generators can be implemented.

pub mod geometric;

pub use geometric::{Geometric, GeometricError};

// ////////////////////////////////////////////////////////////////////////////
// Level Generator
// ////////////////////////////////////////////////////////////////////////////

/// Upon the insertion of a new node in the index, the node is replicated to
/// higher levels with a certain probability as determined by a
/// [`LevelGenerator`].
pub trait LevelGenerator {
    /// The total number of levels that are assumed to exist.
    ///
    /// This must be at least 1 and must not change over the lifetime of the
    /// generator.
    #[must_use]
    fn total(&self) -> usize;

    /// Generate a level for a new node in the range `[0, total)`.
    ///
    /// The returned value is the 0-indexed top level of the node, so a node at
    /// level `n` participates in levels `0..=n`.  This function should _never_
    /// return a level greater or equal to [`total`][LevelGenerator::total];
    /// the index clamps such values regardless.
    #[must_use]
    fn level(&mut self) -> usize;
}
