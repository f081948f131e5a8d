//! Construction parameters for an [`OrderedIndex`][crate::OrderedIndex].

/// Default number of levels.  Ten levels keep the top level sparse for indexes
/// of up to about a thousand keys with a fair coin, which suits a memtable
/// that is flushed regularly.
pub const DEFAULT_MAX_HEIGHT: usize = 10;

/// Default probability that a node is promoted to the next level.
pub const DEFAULT_PROBABILITY: f64 = 0.5;

/// Options used to build an [`OrderedIndex`][crate::OrderedIndex].
///
/// Validation is deferred to
/// [`OrderedIndex::with_options`][crate::OrderedIndex::with_options].
///
/// # Examples
///
/// ```
/// use ordered_index::{IndexOptions, OrderedIndex};
///
/// let options = IndexOptions::default().max_height(4).seed(0x1234_abcd);
/// let index: OrderedIndex<u64> = OrderedIndex::with_options(options).unwrap();
/// assert_eq!(index.max_height(), 4);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IndexOptions {
    pub(crate) max_height: usize,
    pub(crate) probability: f64,
    pub(crate) seed: Option<u64>,
}

impl Default for IndexOptions {
    #[inline]
    fn default() -> Self {
        IndexOptions {
            max_height: DEFAULT_MAX_HEIGHT,
            probability: DEFAULT_PROBABILITY,
            seed: None,
        }
    }
}

impl IndexOptions {
    /// Set the maximum number of levels.  Must be at least 1.
    #[must_use]
    #[inline]
    pub fn max_height(mut self, max_height: usize) -> Self {
        self.max_height = max_height;
        self
    }

    /// Set the probability that a node is promoted to the next level.  Must be
    /// in `(0, 1)`.
    #[must_use]
    #[inline]
    pub fn probability(mut self, probability: f64) -> Self {
        self.probability = probability;
        self
    }

    /// Seed the level generator so that the shape of the index is
    /// reproducible.
    #[must_use]
    #[inline]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{DEFAULT_MAX_HEIGHT, DEFAULT_PROBABILITY, IndexOptions};

    #[test]
    fn defaults() {
        let options = IndexOptions::default();
        assert_eq!(options.max_height, DEFAULT_MAX_HEIGHT);
        assert_eq!(options.probability, DEFAULT_PROBABILITY);
        assert_eq!(options.seed, None);
    }

    #[test]
    fn setters_chain() {
        let options = IndexOptions::default()
            .max_height(3)
            .probability(0.25)
            .seed(9);
        assert_eq!(
            options,
            IndexOptions {
                max_height: 3,
                probability: 0.25,
                seed: Some(9),
            }
        );
    }
}
