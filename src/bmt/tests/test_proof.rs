use proptest::prelude::*;

use crate::{
    bmt::{Leaf, Proof, Tree},
    hasher::{Hasher, test_support::Sha256Hasher},
};

fn leaf_hash<H: Hasher>(hasher: &H, i: u32) -> Vec<u8> {
    hasher.hash(&i.to_le_bytes())
}

fn build(hasher: &Sha256Hasher, count: u32) -> Tree<Sha256Hasher> {
    let leaves = (0..count).map(|i| leaf_hash(hasher, i)).collect();
    Tree::from_leaves(leaves, hasher.clone()).unwrap()
}

proptest! {
    #[test]
    fn random_subset_proofs_verify(count in 1u32..80u32, seed in 0u64..1000u64) {
        let hasher = Sha256Hasher;
        let tree = build(&hasher, count);

        let subset_size = 1 + (seed % count as u64) as u32;
        let mut indices: Vec<u64> = (0..count as u64).collect();
        // deterministic pseudo-shuffle so different seeds pick different subsets
        indices.sort_by_key(|&i| (i.wrapping_mul(2654435761).wrapping_add(seed)) % (count as u64 + 1));
        indices.truncate(subset_size as usize);

        let proof = tree.proof(&indices).unwrap();
        prop_assert!(proof.verify(&tree.root()).unwrap());
    }

    #[test]
    fn tampering_a_proved_leaf_breaks_verification(count in 2u32..50u32) {
        let hasher = Sha256Hasher;
        let tree = build(&hasher, count);
        let proof = tree.proof(&[0]).unwrap();

        let mut tampered_hash = leaf_hash(&hasher, 0);
        tampered_hash[0] ^= 0xff;
        let tampered = Proof::new(
            vec![Leaf::new(0, tampered_hash)],
            proof.proof_hashes().to_vec(),
            proof.total_leaves_count(),
            hasher,
        );
        prop_assert!(!tampered.verify(&tree.root()).unwrap());
    }
}

#[test]
fn single_leaf_tree_proof_has_no_sibling_hashes() {
    let hasher = Sha256Hasher;
    let tree = build(&hasher, 1);
    let proof = tree.proof(&[0]).unwrap();
    assert!(proof.proof_hashes().is_empty());
    assert!(proof.verify(&tree.root()).unwrap());
}

#[test]
fn proof_over_every_leaf_reconstructs_the_root() {
    let hasher = Sha256Hasher;
    let tree = build(&hasher, 11);
    let all_indices: Vec<u64> = (0..11).collect();
    let proof = tree.proof(&all_indices).unwrap();
    assert!(proof.verify(&tree.root()).unwrap());
}
