//! An ordered index of unique keys backed by a skiplist, with expected
//! `O(log(n))` search, insertion and deletion and no rebalancing step.  It is
//! meant to serve as the sorted in-memory table (memtable) in front of a
//! log-structured storage engine.
//!
//! Conceptually, the index resembles something like:
//!
//! ```text
//! <head> ----------> [2] --------------------------------------------------> [9] ---------->
//! <head> ----------> [2] ------------------------------------[7] ----------> [9] ---------->
//! <head> ----------> [2] ----------> [4] ------------------> [7] ----------> [9] --> [10] ->
//! <head> --> [1] --> [2] --> [3] --> [4] --> [5] --> [6] --> [7] --> [8] --> [9] --> [10] ->
//! ```
//!
//! where each node `[x]` has links to nodes further down the index, allowing
//! a search to effectively skip ahead.  The height of every node is drawn at
//! random when it is inserted (see [`level_generator`]); balance therefore
//! only holds in expectation.
//!
//! Keys are ordered by their [`Ord`] implementation, which **must** be
//! well-behaved (a total order that does not change while the key is in the
//! index).  Failure to satisfy this results in keys that cannot be found or
//! removed, though never in memory unsafety.
//!
//! The index is single-writer: every mutation takes `&mut self` and nothing is
//! synchronised internally.

mod arena;
mod error;
pub mod level_generator;
mod options;
mod ordered_index;
mod skipnode;

pub use error::IndexError;
pub use level_generator::{Geometric, GeometricError, LevelGenerator};
pub use options::{DEFAULT_MAX_HEIGHT, DEFAULT_PROBABILITY, IndexOptions};
pub use ordered_index::{Dump, FLOOR, Keys, OrderedIndex};
