//! Pure layer-local index arithmetic for the binary Merkle tree.
//!
//! Indices here are dense, 0-based, and scoped to a single layer — distinct
//! from the MMR's single flat position space (see [`crate::mmr::helper`]).

/// The sibling of `index` within its layer.
pub fn sibling(index: u64) -> u64 {
    index ^ 1
}

/// The parent of `index` in the layer above.
pub fn parent(index: u64) -> u64 {
    (index ^ 1) / 2
}

/// Siblings of each element of `indices`, in the same order.
pub fn sibling_indices(indices: &[u64]) -> Vec<u64> {
    indices.iter().copied().map(sibling).collect()
}

/// Parents of `indices`, assuming `indices` is sorted ascending.
///
/// Adjacent duplicates are removed (two siblings share a parent), so the
/// result stays sorted ascending and duplicate-free.
pub fn parent_indices(indices: &[u64]) -> Vec<u64> {
    let mut parents = Vec::with_capacity(indices.len());
    let mut last = None;
    for &index in indices {
        let p = parent(index);
        if Some(p) != last {
            parents.push(p);
            last = Some(p);
        }
    }
    parents
}

/// The depth of a complete binary tree holding `n_leaves` leaves.
///
/// A single leaf has depth 1; otherwise `ceil(log2(n_leaves))`.
pub fn tree_depth(n_leaves: u64) -> u64 {
    if n_leaves <= 1 {
        return 1;
    }
    (u64::BITS - (n_leaves - 1).leading_zeros()) as u64
}

/// The number of nodes in the layer `layer_index` levels above the leaves,
/// for a tree holding `total_leaves_count` leaves.
pub fn layer_size(total_leaves_count: u64, layer_index: u64) -> u64 {
    let mut size = total_leaves_count;
    for _ in 0..layer_index {
        size = (size + 1) / 2;
    }
    size
}

/// Per layer, the element count at that layer when it is odd — the layers
/// where the rightmost node is a lonely, promoted-unhashed child.
pub fn uneven_layers_map(total_leaves_count: u64, depth: u64) -> std::collections::BTreeMap<u64, u64> {
    let mut map = std::collections::BTreeMap::new();
    let mut size = total_leaves_count;
    for layer in 0..depth {
        if size % 2 == 1 {
            map.insert(layer, size);
        }
        size = (size + 1) / 2;
    }
    map
}

/// The proof indices needed at each layer to recompute the root from
/// `leaf_indices`, bottom-to-top, ascending within each layer.
///
/// Mirrors the index bookkeeping `Tree::proof` does against the committed
/// tree, but works from `total_leaves_count` alone so a verifier without
/// the tree itself can match up proof hashes to positions.
pub fn proof_indices_by_layers(leaf_indices: &[u64], total_leaves_count: u64) -> Vec<Vec<u64>> {
    let depth = tree_depth(total_leaves_count);
    let uneven = uneven_layers_map(total_leaves_count, depth);

    let mut current = leaf_indices.to_vec();
    current.sort_unstable();
    current.dedup();

    let mut layers = Vec::new();
    let mut layer_idx = 0u64;
    while !(current.len() == 1 && current[0] == 0) {
        let mut siblings = sibling_indices(&current);
        if let Some(&size) = uneven.get(&layer_idx) {
            siblings.retain(|&s| s != size);
        }
        let needed: Vec<u64> = siblings
            .into_iter()
            .filter(|s| !current.contains(s))
            .collect();
        layers.push(needed);
        current = parent_indices(&current);
        layer_idx += 1;
    }
    layers
}
