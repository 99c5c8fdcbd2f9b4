//! BMT inclusion proofs: root reconstruction from a flattened sibling list.

use super::{
    error::{Error, Result},
    indices::{proof_indices_by_layers, tree_depth},
    leaf::Leaf,
    partial_tree::{Layers, PartialTree},
};
use crate::hasher::{Hash, Hasher};

/// A binary Merkle tree inclusion proof.
///
/// Carries the leaves being proved and the flattened sibling hashes needed
/// to recompute the root — bottom-to-top, ascending by index within each
/// layer — together with the leaf count the proof was generated against.
#[derive(Debug, Clone)]
pub struct Proof<H> {
    leaves: Vec<Leaf>,
    proof_hashes: Vec<Hash>,
    total_leaves_count: u64,
    hasher: H,
}

impl<H: Hasher> Proof<H> {
    /// Construct a proof from its constituent parts.
    pub fn new(leaves: Vec<Leaf>, proof_hashes: Vec<Hash>, total_leaves_count: u64, hasher: H) -> Self {
        Proof {
            leaves,
            proof_hashes,
            total_leaves_count,
            hasher,
        }
    }

    /// The leaves this proof covers.
    pub fn leaves(&self) -> &[Leaf] {
        &self.leaves
    }

    /// The flattened sibling hashes this proof carries.
    pub fn proof_hashes(&self) -> &[Hash] {
        &self.proof_hashes
    }

    /// The committed leaf count at the time this proof was generated.
    pub fn total_leaves_count(&self) -> u64 {
        self.total_leaves_count
    }

    /// Recompute the root this proof implies.
    pub fn root(&self) -> Result<Hash> {
        let mut leaves = self.leaves.clone();
        leaves.sort_by_key(|leaf| leaf.index);
        let leaf_indices: Vec<u64> = leaves.iter().map(|leaf| leaf.index).collect();

        let depth = tree_depth(self.total_leaves_count);
        let layered_indices = proof_indices_by_layers(&leaf_indices, self.total_leaves_count);

        let mut remaining = self.proof_hashes.iter();
        let mut proof_layers: Layers = Vec::with_capacity(layered_indices.len() + 1);
        for indices in &layered_indices {
            let mut layer = Vec::with_capacity(indices.len());
            for &index in indices {
                let hash = remaining
                    .next()
                    .ok_or_else(|| {
                        Error::CorruptedProof(
                            "not enough proof hashes for the claimed layer structure".into(),
                        )
                    })?
                    .clone();
                layer.push(Leaf::new(index, hash));
            }
            proof_layers.push(layer);
        }
        if remaining.next().is_some() {
            return Err(Error::CorruptedProof(
                "excess proof hashes beyond what the layer structure requires".into(),
            ));
        }

        if proof_layers.is_empty() {
            proof_layers.push(Vec::new());
        }
        proof_layers[0].extend(leaves);
        proof_layers[0].sort_by_key(|leaf| leaf.index);

        let tree = PartialTree::build(proof_layers, depth, &self.hasher)?;
        Ok(tree.root())
    }

    /// `true` if this proof's leaves and hashes recompute to `expected_root`.
    pub fn verify(&self, expected_root: &Hash) -> Result<bool> {
        self.root().map(|root| &root == expected_root)
    }
}
