//! Merkle Mountain Range (MMR): an append-only authenticated log of peaks.
//!
//! # Core types
//!
//! - [`MMR`] — push leaves, compute the root, generate proofs, commit.
//! - [`Proof`] — an MMR inclusion proof (verify, recompute root).
//! - [`Leaf`] — a leaf's 0-based ordinal paired with its hash.
//!
//! # Store traits
//!
//! - [`StoreReadOps`]/[`StoreWriteOps`] — the backing-store contract.
//! - [`MemStore`] — reference in-memory implementation.

mod error;
pub(crate) mod helper;
mod leaf;
mod mmr;
mod proof;
mod store;

pub use error::{Error, Result};
pub use helper::{leaf_index_to_mmr_size, leaf_index_to_pos, mmr_size_to_leaf_count};
pub use leaf::Leaf;
pub use mmr::MMR;
pub use proof::Proof;
pub use store::{Batch, MemStore, StoreReadOps, StoreWriteOps};
