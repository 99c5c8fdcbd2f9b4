//! The sparse, layered tree used both to build full trees from leaves and
//! to recompute a root from a proof.

use super::{
    error::{Error, Result},
    indices::parent_indices,
    leaf::Leaf,
};
use crate::hasher::Hasher;

/// A sparse sequence of layers, bottom (leaves) first, each sorted
/// ascending by index.
pub type Layers = Vec<Vec<Leaf>>;

/// A partially or fully populated binary Merkle tree, stored as sparse
/// `(index, hash)` layers rather than a dense array.
#[derive(Debug, Clone, Default)]
pub struct PartialTree {
    layers: Layers,
}

impl PartialTree {
    /// An empty partial tree (no layers).
    pub fn new() -> Self {
        PartialTree { layers: Vec::new() }
    }

    /// Construct from already-built layers (used by [`PartialTree::build`]
    /// and tests).
    pub fn from_layers(layers: Layers) -> Self {
        PartialTree { layers }
    }

    /// This tree's layers, bottom first.
    pub fn layers(&self) -> &[Vec<Leaf>] {
        &self.layers
    }

    /// Build a partial tree from sparse bottom-first `partial_layers`,
    /// combining nodes upward for `full_tree_depth` iterations.
    ///
    /// Each iteration folds in the next given layer (if any), sorts it,
    /// records it, then computes the parent layer: a parent's hash is
    /// `hasher(left ∥ right)`, or just the left child's hash unchanged when
    /// no right child exists (the odd-layer promotion rule). A parent with
    /// no left child at all is an error.
    pub fn build<H: Hasher>(
        partial_layers: Layers,
        full_tree_depth: u64,
        hasher: &H,
    ) -> Result<Self> {
        let mut given_layers = partial_layers.into_iter();
        let mut current_layer: Vec<Leaf> = Vec::new();
        let mut layers: Layers = Vec::new();

        for _ in 0..full_tree_depth {
            if let Some(next) = given_layers.next() {
                current_layer.extend(next);
            }
            current_layer.sort_by_key(|leaf| leaf.index);
            layers.push(current_layer.clone());

            let indices: Vec<u64> = current_layer.iter().map(|leaf| leaf.index).collect();
            let parents = parent_indices(&indices);
            current_layer = Vec::with_capacity(parents.len());

            for (i, &parent_index) in parents.iter().enumerate() {
                let left_index = i * 2;
                if left_index >= layers.last().expect("just pushed").len() {
                    return Err(Error::NotEnoughHelperNodes(format!(
                        "no left child for parent index {parent_index}"
                    )));
                }
                let current = layers.last().expect("just pushed");
                let left = &current[left_index].hash;
                let right_index = left_index + 1;
                let hash = match current.get(right_index) {
                    Some(right) => hasher.concat_and_hash(left, &right.hash),
                    None => left.clone(),
                };
                current_layer.push(Leaf::new(parent_index, hash));
            }
        }

        if !current_layer.is_empty() {
            layers.push(current_layer);
        }

        Ok(PartialTree { layers })
    }

    /// The root hash: the single entry of the topmost layer, or an empty
    /// hash if this tree has no layers.
    pub fn root(&self) -> Vec<u8> {
        self.layers
            .last()
            .and_then(|layer| layer.first())
            .map(|leaf| leaf.hash.clone())
            .unwrap_or_default()
    }

    /// `true` if the layer at `layer_index` contains a node at `node_index`.
    pub fn contains(&self, layer_index: usize, node_index: u64) -> bool {
        self.layers
            .get(layer_index)
            .is_some_and(|layer| layer.iter().any(|leaf| leaf.index == node_index))
    }

    /// Fold `other` into `self`, layer by layer, without rehashing.
    ///
    /// For each layer, nodes from `self` that `other` also carries are
    /// dropped in favor of `other`'s version; the result is re-sorted
    /// ascending. This does not verify that the combined tree is
    /// internally consistent — only use it when the inputs are already
    /// known-good (e.g. folding a freshly built diff into committed state).
    pub fn merge_unverified(&mut self, other: &PartialTree) {
        let combined_depth = self.layers.len().max(other.layers.len());
        for layer_index in 0..combined_depth {
            let mut combined: Vec<Leaf> = match self.layers.get(layer_index) {
                Some(layer) => layer
                    .iter()
                    .filter(|leaf| !other.contains(layer_index, leaf.index))
                    .cloned()
                    .collect(),
                None => Vec::new(),
            };
            if let Some(other_layer) = other.layers.get(layer_index) {
                combined.extend(other_layer.iter().cloned());
            }
            combined.sort_by_key(|leaf| leaf.index);

            if layer_index < self.layers.len() {
                self.layers[layer_index] = combined;
            } else {
                self.layers.push(combined);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hasher::test_support::Sha256Hasher;

    #[test]
    fn build_from_full_leaf_layer_produces_root() {
        let hasher = Sha256Hasher;
        let leaves: Vec<Leaf> = (b'a'..=b'f')
            .enumerate()
            .map(|(i, c)| Leaf::new(i as u64, hasher.hash(&[c])))
            .collect();
        let tree = PartialTree::build(vec![leaves], 3, &hasher).unwrap();
        assert_eq!(tree.layers().len(), 4);
        assert_eq!(tree.layers()[0].len(), 6);
        assert_eq!(tree.layers()[3].len(), 1);
    }

    #[test]
    fn odd_layer_promotes_lonely_node_unhashed() {
        let hasher = Sha256Hasher;
        let leaves: Vec<Leaf> = (b'a'..=b'c')
            .enumerate()
            .map(|(i, c)| Leaf::new(i as u64, hasher.hash(&[c])))
            .collect();
        let tree = PartialTree::build(vec![leaves.clone()], 2, &hasher).unwrap();
        // 3 leaves -> layer 1 has ceil(3/2)=2 nodes: hash(a,b), and c promoted unhashed.
        assert_eq!(tree.layers()[1][1].hash, leaves[2].hash);
    }

    #[test]
    fn empty_tree_has_empty_root() {
        let tree = PartialTree::new();
        assert!(tree.root().is_empty());
    }
}
