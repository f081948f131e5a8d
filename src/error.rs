//! Errors reported by the ordered index.

use std::collections::TryReserveError;

use thiserror::Error;

use crate::level_generator::GeometricError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
/// Errors that can occur when building or mutating an
/// [`OrderedIndex`][crate::OrderedIndex].
///
/// [`DuplicateKey`][IndexError::DuplicateKey] and
/// [`KeyNotFound`][IndexError::KeyNotFound] are ordinary outcomes rather than
/// failures; [`insert`][crate::OrderedIndex::insert] and
/// [`delete`][crate::OrderedIndex::delete] report them as `false`.
#[expect(
    clippy::module_name_repetitions,
    reason = "Re-exported at the crate root where 'Error' would be ambiguous."
)]
#[non_exhaustive]
pub enum IndexError {
    /// The key is already present; the index was not modified.
    #[error("key is already present in the index.")]
    DuplicateKey,
    /// The key is not present; the index was not modified.
    #[error("key is not present in the index.")]
    KeyNotFound,
    /// The options used to build the index were rejected.
    #[error("invalid index options: {0}")]
    InvalidOptions(#[from] GeometricError),
    /// Memory for a new node could not be reserved; the index was not
    /// modified.
    #[error("failed to reserve memory for a new node: {0}")]
    Allocation(#[from] TryReserveError),
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::IndexError;
    use crate::level_generator::GeometricError;

    #[test]
    fn messages() {
        assert_eq!(
            IndexError::DuplicateKey.to_string(),
            "key is already present in the index."
        );
        assert_eq!(
            IndexError::KeyNotFound.to_string(),
            "key is not present in the index."
        );
        assert_eq!(
            IndexError::from(GeometricError::ZeroMax).to_string(),
            "invalid index options: max must be non-zero."
        );
    }
}
