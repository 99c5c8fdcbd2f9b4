//! The mutable binary Merkle tree: append/insert/commit/rollback.

use super::{
    error::{Error, Result},
    indices::{parent_indices, sibling_indices, tree_depth},
    leaf::Leaf,
    partial_tree::{Layers, PartialTree},
    proof::Proof,
};
use crate::hasher::{Hash, Hasher};

/// A binary Merkle tree supporting incremental mutation.
///
/// Leaves are appended or inserted into an uncommitted buffer; `commit`
/// folds that buffer into the committed tree, remembering the diff so
/// `rollback` can undo it.
#[derive(Debug, Clone)]
pub struct Tree<H> {
    current_working_tree: PartialTree,
    history: Vec<PartialTree>,
    uncommitted_leaves: Vec<Hash>,
    hasher: H,
}

impl<H: Hasher> Tree<H> {
    /// An empty tree.
    pub fn new(hasher: H) -> Self {
        Tree {
            current_working_tree: PartialTree::new(),
            history: Vec::new(),
            uncommitted_leaves: Vec::new(),
            hasher,
        }
    }

    /// Build a tree from a complete leaf list in one shot: append then
    /// commit.
    pub fn from_leaves(leaves: Vec<Hash>, hasher: H) -> Result<Self> {
        let mut tree = Tree::new(hasher);
        tree.append(leaves);
        tree.commit()?;
        Ok(tree)
    }

    /// Queue `leaves` for the next commit.
    pub fn append(&mut self, leaves: Vec<Hash>) {
        self.uncommitted_leaves.extend(leaves);
    }

    /// Queue a single `leaf` for the next commit.
    pub fn insert(&mut self, leaf: Hash) {
        self.uncommitted_leaves.push(leaf);
    }

    /// The number of leaves committed so far (excludes the uncommitted
    /// buffer).
    pub fn committed_leaf_count(&self) -> u64 {
        self.current_working_tree
            .layers()
            .first()
            .map(|layer| layer.len() as u64)
            .unwrap_or(0)
    }

    /// Fold the uncommitted buffer into the committed tree.
    ///
    /// A no-op if nothing is pending. On success the diff that was just
    /// folded in is pushed onto the commit history for [`Tree::rollback`].
    pub fn commit(&mut self) -> Result<()> {
        if self.uncommitted_leaves.is_empty() {
            return Ok(());
        }
        let diff = self.uncommitted_diff()?;
        self.current_working_tree.merge_unverified(&diff);
        self.history.push(diff);
        self.uncommitted_leaves.clear();
        Ok(())
    }

    /// Undo the last commit, rebuilding the committed tree from the
    /// remaining history.
    pub fn rollback(&mut self) {
        self.history.pop();
        let mut rebuilt = PartialTree::new();
        for diff in &self.history {
            rebuilt.merge_unverified(diff);
        }
        self.current_working_tree = rebuilt;
    }

    /// The committed root, or an empty hash if nothing has been committed.
    pub fn root(&self) -> Hash {
        self.current_working_tree.root()
    }

    /// The root that `commit` would produce, without mutating the tree.
    pub fn uncommitted_root(&self) -> Result<Hash> {
        if self.uncommitted_leaves.is_empty() {
            return Ok(self.root());
        }
        let diff = self.uncommitted_diff()?;
        let mut projected = self.current_working_tree.clone();
        projected.merge_unverified(&diff);
        Ok(projected.root())
    }

    /// Build an inclusion proof for the committed leaves at `leaf_indices`.
    pub fn proof(&self, leaf_indices: &[u64]) -> Result<Proof<H>> {
        let layer0 = self
            .current_working_tree
            .layers()
            .first()
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        let proof_leaves: Vec<Leaf> = leaf_indices
            .iter()
            .map(|&index| {
                layer0
                    .binary_search_by_key(&index, |leaf| leaf.index)
                    .map(|pos| layer0[pos].clone())
                    .map_err(|_| {
                        Error::CorruptedProof(format!(
                            "leaf index {index} is not present in the committed tree"
                        ))
                    })
            })
            .collect::<Result<_>>()?;
        let proof_hashes = self.helper_node_hashes(leaf_indices);
        Ok(Proof::new(
            proof_leaves,
            proof_hashes,
            self.committed_leaf_count(),
            self.hasher.clone(),
        ))
    }

    /// Sibling hashes needed to recompute the root from `leaf_indices`,
    /// bottom-to-top, ascending within each layer.
    fn helper_node_hashes(&self, leaf_indices: &[u64]) -> Vec<Hash> {
        let mut current = sorted_dedup(leaf_indices);
        let mut hashes = Vec::new();
        let mut layer_idx = 0usize;
        while !is_root_only(&current) {
            let Some(layer) = self.current_working_tree.layers().get(layer_idx) else {
                break;
            };
            for helper in helper_indices(&current) {
                if let Ok(pos) = layer.binary_search_by_key(&helper, |leaf| leaf.index) {
                    hashes.push(layer[pos].hash.clone());
                }
            }
            current = parent_indices(&current);
            layer_idx += 1;
        }
        hashes
    }

    /// Sibling `(index, hash)` pairs needed to recompute the root from
    /// `indices`, grouped bottom-to-top into sparse layers.
    fn helper_node_layers(&self, indices: &[u64]) -> Layers {
        let mut current = sorted_dedup(indices);
        let mut layers = Vec::new();
        let mut layer_idx = 0usize;
        while !is_root_only(&current) {
            let layer_nodes: Vec<Leaf> = match self.current_working_tree.layers().get(layer_idx) {
                Some(layer) => helper_indices(&current)
                    .into_iter()
                    .filter_map(|helper| {
                        layer
                            .binary_search_by_key(&helper, |leaf| leaf.index)
                            .ok()
                            .map(|pos| layer[pos].clone())
                    })
                    .collect(),
                None => Vec::new(),
            };
            layers.push(layer_nodes);
            current = parent_indices(&current);
            layer_idx += 1;
        }
        layers
    }

    /// Build the `PartialTree` diff representing the pending uncommitted
    /// leaves, carrying in whatever committed siblings they need.
    fn uncommitted_diff(&self) -> Result<PartialTree> {
        let commit_count = self.committed_leaf_count();
        let reserved_leaves: Vec<Leaf> = self
            .uncommitted_leaves
            .iter()
            .enumerate()
            .map(|(k, hash)| Leaf::new(commit_count + k as u64, hash.clone()))
            .collect();
        let reserved_indices: Vec<u64> = reserved_leaves.iter().map(|leaf| leaf.index).collect();

        let mut partial_layers = self.helper_node_layers(&reserved_indices);
        if partial_layers.is_empty() {
            partial_layers.push(Vec::new());
        }
        partial_layers[0].extend(reserved_leaves);
        partial_layers[0].sort_by_key(|leaf| leaf.index);

        let new_depth = tree_depth(commit_count + self.uncommitted_leaves.len() as u64);
        PartialTree::build(partial_layers, new_depth, &self.hasher)
    }
}

fn sorted_dedup(indices: &[u64]) -> Vec<u64> {
    let mut sorted = indices.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    sorted
}

fn is_root_only(indices: &[u64]) -> bool {
    indices.len() == 1 && indices[0] == 0
}

/// Siblings of `indices` that are not themselves already being proved.
fn helper_indices(indices: &[u64]) -> Vec<u64> {
    let siblings = sibling_indices(indices);
    siblings
        .into_iter()
        .filter(|s| !indices.contains(s))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hasher::test_support::Sha256Hasher;
    use crate::encoding::to_hex;

    fn leaves(bytes: impl IntoIterator<Item = u8>, hasher: &Sha256Hasher) -> Vec<Hash> {
        bytes.into_iter().map(|b| hasher.hash(&[b])).collect()
    }

    #[test]
    fn six_leaf_root_matches_fixture() {
        let hasher = Sha256Hasher;
        let tree = Tree::from_leaves(leaves(b'a'..=b'f', &hasher), hasher).unwrap();
        assert_eq!(
            to_hex(&tree.root()),
            "1f7379539707bcaea00564168d1d4d626b09b73f8a2a365234c62d763f854da2"
        );
    }

    #[test]
    fn single_leaf_root_is_the_leaf() {
        let hasher = Sha256Hasher;
        let leaf_hash = hasher.hash(b"solo");
        let tree = Tree::from_leaves(vec![leaf_hash.clone()], hasher).unwrap();
        assert_eq!(tree.root(), leaf_hash);
    }

    #[test]
    fn append_then_insert_then_append_matches_fixtures_and_rollback_undoes_them() {
        let hasher = Sha256Hasher;
        let mut tree = Tree::new(hasher.clone());
        tree.append(leaves(b'a'..=b'f', &hasher));
        assert_eq!(
            to_hex(&tree.uncommitted_root().unwrap()),
            "1f7379539707bcaea00564168d1d4d626b09b73f8a2a365234c62d763f854da2"
        );
        tree.commit().unwrap();

        tree.insert(hasher.hash(b"g"));
        assert_eq!(
            to_hex(&tree.uncommitted_root().unwrap()),
            "e2a80e0e872a6c6eaed37b4c1f220e1935004805585b5f99617e48e9c8fe4034"
        );
        tree.commit().unwrap();

        tree.append(vec![hasher.hash(b"h"), hasher.hash(b"k")]);
        assert_eq!(
            to_hex(&tree.uncommitted_root().unwrap()),
            "09b6890b23e32e607f0e5f670ab224e36af8f6599cbe88b468f4b0f761802dd6"
        );
        tree.commit().unwrap();

        tree.rollback();
        assert_eq!(
            to_hex(&tree.root()),
            "e2a80e0e872a6c6eaed37b4c1f220e1935004805585b5f99617e48e9c8fe4034"
        );

        tree.rollback();
        assert_eq!(
            to_hex(&tree.root()),
            "1f7379539707bcaea00564168d1d4d626b09b73f8a2a365234c62d763f854da2"
        );
    }

    #[test]
    fn commit_equivalence_holds_for_split_appends() {
        let hasher = Sha256Hasher;
        let all = leaves(b'a'..=b'f', &hasher);

        let whole = Tree::from_leaves(all.clone(), hasher.clone()).unwrap();

        let mut split = Tree::new(hasher);
        split.append(all[..3].to_vec());
        split.commit().unwrap();
        split.append(all[3..].to_vec());
        split.commit().unwrap();

        assert_eq!(whole.root(), split.root());
    }

    #[test]
    fn proof_for_disjoint_pair_verifies() {
        let hasher = Sha256Hasher;
        let tree = Tree::from_leaves(leaves(b'a'..=b'f', &hasher), hasher.clone()).unwrap();
        let proof = tree.proof(&[3, 4]).unwrap();
        assert!(proof.verify(&tree.root()).unwrap());
    }

    #[test]
    fn proof_rejects_uncommitted_leaf_index() {
        let hasher = Sha256Hasher;
        let tree = Tree::from_leaves(leaves(b'a'..=b'c', &hasher), hasher).unwrap();
        assert!(tree.proof(&[5]).is_err());
    }
}
