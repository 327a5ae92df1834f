#![deny(missing_docs)]

//! In-memory sorted containers backed by a balanced 2-3-4 tree: the ordered
//! [`TetraMap`] and the derived ordered [`TetraSet`], with O(log n)
//! insert/lookup/update and bidirectional cursors that step through the keys
//! without allocating.

//!# Features
//!
//! This crate supports the following cargo features:
//! - `serde` : enables serialisation of [`TetraMap`] and [`TetraSet`] via serde crate.

/// Ordered map.
pub mod map;

pub use map::TetraMap;

/// Ordered set.
pub mod set;

pub use set::TetraSet;
