//! The single external collaborator the core depends on: a hash function.
//!
//! Neither the binary Merkle tree nor the MMR implement a concrete digest.
//! Callers supply one (SHA-256, Keccak-256, Blake3, ...) by implementing
//! [`Hasher`]; the core only ever calls `hash` on byte slices it has already
//! concatenated in the right order.

/// An opaque digest produced by a [`Hasher`].
///
/// Two hashes are equal iff their bytes are equal. Digest length is
/// whatever the hasher produces and is not otherwise constrained.
pub type Hash = Vec<u8>;

/// A deterministic, synchronous hash function.
///
/// Implementations must be pure: the same input bytes always produce the
/// same output bytes, for the lifetime of one `Hasher` value. Both cores
/// combine child hashes by plain byte concatenation before calling `hash` —
/// no length prefix, no domain tag is applied by this crate.
pub trait Hasher: Clone {
    /// Hash `data` and return the digest.
    fn hash(&self, data: &[u8]) -> Hash;

    /// Hash the concatenation `left || right`.
    ///
    /// The default implementation concatenates into one buffer and calls
    /// [`Hasher::hash`] once; override it if a streaming hasher can avoid
    /// the allocation.
    fn concat_and_hash(&self, left: &[u8], right: &[u8]) -> Hash {
        let mut buf = Vec::with_capacity(left.len() + right.len());
        buf.extend_from_slice(left);
        buf.extend_from_slice(right);
        self.hash(&buf)
    }
}
