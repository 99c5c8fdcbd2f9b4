use thiserror::Error;

/// Alias for `core::result::Result<T, Error>`.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors produced by binary Merkle tree operations.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
#[non_exhaustive]
pub enum Error {
    /// A proof's item count did not match what the layer structure
    /// required, or unexpected items remained once the root was built.
    #[error("corrupted proof: {0}")]
    CorruptedProof(String),
    /// `PartialTree::build` needed a left child at some parent slot that
    /// was not present in the input layers.
    #[error("not enough helper nodes: {0}")]
    NotEnoughHelperNodes(String),
}
