use crate::hasher::Hash;

/// A leaf attested by an MMR proof: its 0-based leaf ordinal and hash.
///
/// Distinct from a node *position* (see [`crate::mmr::helper`]), which
/// additionally accounts for internal nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leaf {
    /// 0-based leaf ordinal (not an MMR node position).
    pub index: u64,
    /// The leaf's hash.
    pub hash: Hash,
}

impl Leaf {
    /// Construct a new leaf.
    pub fn new(index: u64, hash: Hash) -> Self {
        Leaf { index, hash }
    }
}
