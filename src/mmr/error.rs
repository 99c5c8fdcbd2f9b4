use thiserror::Error;

/// Alias for `core::result::Result<T, Error>`.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors produced by MMR operations.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
#[non_exhaustive]
pub enum Error {
    /// Tried to compute the root hash of an empty MMR.
    #[error("get root on an empty MMR")]
    GetRootOnEmpty,
    /// The backing store was missing a node the computation needed.
    #[error("inconsistent store: missing node at position {0}")]
    InconsistentStore(u64),
    /// `gen_proof` was called with an empty position list or a position
    /// beyond the MMR's range.
    #[error("generate proof for invalid leaves: {0}")]
    GenProofForInvalidLeaves(String),
    /// A proof did not carry enough items to recompute the root, or carried
    /// leftover items/leaves after the root was reconstructed.
    #[error("corrupted proof: {0}")]
    CorruptedProof(String),
    /// Invalid arguments passed to a proof operation.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}
