//! Authenticated data structures over a user-supplied hash function.
//!
//! Two structures share the crate: [`bmt`], a balanced binary Merkle tree
//! with incremental append/insert/commit/rollback, and [`mmr`], an
//! append-only Merkle Mountain Range. Neither implements a concrete digest —
//! both take a [`hasher::Hasher`] from the caller.

pub mod bmt;
pub mod encoding;
pub mod hasher;
pub mod mmr;

pub use hasher::{Hash, Hasher};
