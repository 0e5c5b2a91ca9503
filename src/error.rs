/// Errors returned by [`HashTable`](crate::HashTable) and
/// [`HashMap`](crate::HashMap) operations.
///
/// A failed operation never leaves the table partially modified.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A payload's width does not match the table's declared value size.
    #[error("incorrect value size: table stores {expected}-byte values, got {actual} bytes")]
    IncorrectValueSize {
        /// The value size the table was created with.
        expected: usize,
        /// The width of the rejected payload.
        actual: usize,
    },

    /// Growing or reserving would overflow the addressable buffer size.
    #[error("capacity overflow")]
    CapacityOverflow,
}
