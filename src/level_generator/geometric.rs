//! Geometric level generator.

use rand::{Rng, SeedableRng, rngs::SmallRng};
use thiserror::Error;

use crate::level_generator::LevelGenerator;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
/// Errors that can occur when creating a [`Geometric`] level generator.
#[expect(
    clippy::module_name_repetitions,
    reason = "Using 'Error' would be too generic and may cause confusion."
)]
#[non_exhaustive]
pub enum GeometricError {
    /// The maximum number of levels must be non-zero.
    #[error("max must be non-zero.")]
    ZeroMax,
    /// The probability `$p$` must be in the range `$(0, 1)$`.
    #[error("p must be in (0, 1).")]
    InvalidProbability,
}

/// A level generator using a geometric distribution.
///
/// A coin which lands heads with probability `$p$` is flipped repeatedly.
/// Every head raises the level by one; the first tail stops the process, as
/// does reaching the top level `total - 1`.  The probability of drawing level
/// `$k$` is therefore `$p^k (1 - p)$`, truncated at the maximum number of
/// levels allowed (the top level absorbs the remaining mass).
#[derive(Debug, Clone)]
pub struct Geometric {
    /// The total number of levels that are assumed to exist.
    total: usize,
    /// The probability that a node is present in the next level.
    p: f64,
    /// The random number generator.
    rng: SmallRng,
}

impl Geometric {
    /// Create a new geometric level generator with `total` number of levels,
    /// and `p` as the probability that a given node is present in the next
    /// level.  The generator is seeded from the thread-local RNG.
    ///
    /// # Errors
    ///
    /// `p` must be strictly between 0 and 1, and `total` must be greater or
    /// equal to 1.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_index::level_generator::{Geometric, LevelGenerator};
    ///
    /// let mut generator = Geometric::new(4, 0.5).unwrap();
    /// assert!(generator.level() < 4);
    /// ```
    #[inline]
    pub fn new(total: usize, p: f64) -> Result<Self, GeometricError> {
        Self::validate(total, p)?;
        Ok(Geometric {
            total,
            p,
            rng: SmallRng::from_rng(&mut rand::rng()),
        })
    }

    /// Create a new geometric level generator whose draws are fully determined
    /// by `seed`.
    ///
    /// Two generators built with the same arguments produce the same sequence
    /// of levels, which makes the shape of an index reproducible.
    ///
    /// # Errors
    ///
    /// Same as [`Geometric::new`].
    #[inline]
    pub fn with_seed(total: usize, p: f64, seed: u64) -> Result<Self, GeometricError> {
        Self::validate(total, p)?;
        Ok(Geometric {
            total,
            p,
            rng: SmallRng::seed_from_u64(seed),
        })
    }

    /// A fair-coin generator.  A `total` of zero is raised to one.
    pub(crate) fn fair(total: usize) -> Self {
        Geometric {
            total: total.max(1),
            p: 0.5,
            rng: SmallRng::from_rng(&mut rand::rng()),
        }
    }

    /// The probability that a node is promoted to the next level.
    #[must_use]
    #[inline]
    pub fn probability(&self) -> f64 {
        self.p
    }

    fn validate(total: usize, p: f64) -> Result<(), GeometricError> {
        if total == 0 {
            return Err(GeometricError::ZeroMax);
        }
        // Written this way so that NaN is rejected too.
        if !(0.0 < p && p < 1.0) {
            return Err(GeometricError::InvalidProbability);
        }
        Ok(())
    }
}

impl LevelGenerator for Geometric {
    #[inline]
    fn total(&self) -> usize {
        self.total
    }

    #[inline]
    fn level(&mut self) -> usize {
        let mut h = 0;
        while h + 1 < self.total && self.rng.random_bool(self.p) {
            h += 1;
        }
        h
    }
}
