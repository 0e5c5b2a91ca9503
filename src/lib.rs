#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

/// Errors returned by table operations.
pub mod error;

/// A typed multimap over the byte-level `HashTable`.
///
/// This module provides a `HashMap` that serializes values through their
/// fixed-width `Value` codec, so callers never handle raw bytes.
pub mod hash_map;

/// The byte-level table engine and its cursor.
pub mod hash_table;

/// Keys and the hash that turns them into cell tags.
pub mod key;

/// The fixed-width value codec.
pub mod value;

#[cfg(test)]
mod proptests;

pub use error::Error;
pub use hash_map::HashMap;
pub use hash_table::HashTable;
pub use key::Key;
pub use value::Value;
