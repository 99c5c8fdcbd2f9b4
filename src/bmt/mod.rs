//! Binary Merkle tree (BMT): a mutable, append-and-insert authenticated
//! leaf layer with inclusion proofs.
//!
//! [`Tree`] holds committed state plus an uncommitted staging buffer;
//! [`commit`](Tree::commit)/[`rollback`](Tree::rollback) move leaves between
//! the two without rehashing already-settled nodes. [`Proof`] carries the
//! sibling hashes needed to recompute a root independently of the tree.

mod error;
mod indices;
mod leaf;
mod partial_tree;
mod proof;
#[cfg(test)]
mod tests;
mod tree;

pub use error::{Error, Result};
pub use leaf::Leaf;
pub use partial_tree::{Layers, PartialTree};
pub use proof::Proof;
pub use tree::Tree;
