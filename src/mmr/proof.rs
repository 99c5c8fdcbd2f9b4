//! MMR inclusion proofs: verification and root reconstruction.

use std::{collections::VecDeque, mem};

use super::{
    error::{Error, Result},
    helper::{get_peaks, leaf_index_to_pos, parent_offset, pos_height_in_tree, sibling_offset},
    leaf::Leaf,
    mmr::bag_peaks,
};
use crate::hasher::{Hash, Hasher};

/// An MMR inclusion proof: the sibling and peak hashes needed to recompute
/// the root from a set of leaves.
///
/// Produced by [`super::mmr::MMR::gen_proof`]; carries no leaf values of its
/// own — callers supply the leaves being checked to [`Proof::verify`] or
/// [`Proof::calculate_root`].
#[derive(Debug, Clone)]
pub struct Proof<H> {
    mmr_size: u64,
    proof_items: Vec<Hash>,
    hasher: H,
}

impl<H: Hasher> Proof<H> {
    /// Construct a proof from its constituent parts.
    pub fn new(mmr_size: u64, proof_items: Vec<Hash>, hasher: H) -> Self {
        Proof {
            mmr_size,
            proof_items,
            hasher,
        }
    }

    /// The MMR size at the time this proof was generated.
    pub fn mmr_size(&self) -> u64 {
        self.mmr_size
    }

    /// The raw sibling/peak hashes carried by this proof.
    pub fn proof_items(&self) -> &[Hash] {
        &self.proof_items
    }

    /// Recompute the MMR root from the given leaves and this proof's items.
    pub fn calculate_root(&self, leaves: Vec<Leaf>) -> Result<Hash> {
        calculate_root(
            leaves_to_pos_items(leaves),
            self.mmr_size,
            self.proof_items.iter(),
            &self.hasher,
        )
    }

    /// Verify that `leaves` produce `root` under this proof.
    pub fn verify(&self, root: &Hash, leaves: Vec<Leaf>) -> Result<bool> {
        self.calculate_root(leaves).map(|computed| &computed == root)
    }

    /// From a proof of the predecessors of leaf `new_index`, compute the
    /// root of the MMR after one more leaf (`new_elem`) has been pushed,
    /// without regenerating the proof from scratch.
    ///
    /// `leaves` are the already-known leaves this proof covers; `new_index`
    /// is the 0-based leaf index the new leaf will occupy and `new_mmr_size`
    /// is the MMR size after the push.
    pub fn calculate_root_with_new_leaf(
        &self,
        mut leaves: Vec<Leaf>,
        new_index: u64,
        new_elem: Hash,
        new_mmr_size: u64,
    ) -> Result<Hash> {
        let new_pos = leaf_index_to_pos(new_index);
        if new_pos >= new_mmr_size {
            return Err(Error::InvalidInput(format!(
                "new_pos {new_pos} must be less than new_mmr_size {new_mmr_size}"
            )));
        }
        let pos_height = pos_height_in_tree(new_pos);
        let next_height = pos_height_in_tree(new_pos + 1);
        if next_height > pos_height {
            let mut peaks_hashes = calculate_peaks_hashes(
                leaves_to_pos_items(leaves),
                self.mmr_size,
                self.proof_items.iter(),
                &self.hasher,
            )?;
            let peaks_pos = get_peaks(new_mmr_size);
            let i = peaks_pos
                .iter()
                .position(|p| *p >= new_pos)
                .ok_or_else(|| {
                    Error::InvalidInput(format!(
                        "new_pos {new_pos} exceeds all peaks for new_mmr_size {new_mmr_size}"
                    ))
                })?;
            if i > peaks_hashes.len() {
                return Err(Error::InvalidInput(format!(
                    "peak index {i} out of range for {} peak hashes",
                    peaks_hashes.len()
                )));
            }
            peaks_hashes[i..].reverse();
            calculate_root(
                vec![(new_pos, new_elem)],
                new_mmr_size,
                peaks_hashes.iter(),
                &self.hasher,
            )
        } else {
            let mut items = leaves_to_pos_items(leaves);
            items.push((new_pos, new_elem));
            calculate_root(items, new_mmr_size, self.proof_items.iter(), &self.hasher)
        }
    }
}

fn leaves_to_pos_items(leaves: Vec<Leaf>) -> Vec<(u64, Hash)> {
    leaves
        .into_iter()
        .map(|leaf| (leaf_index_to_pos(leaf.index), leaf.hash))
        .collect()
}

fn calculate_peak_root<'a, I, H>(
    items: Vec<(u64, Hash)>,
    peak_pos: u64,
    proof_iter: &mut I,
    hasher: &H,
) -> Result<Hash>
where
    I: Iterator<Item = &'a Hash>,
    H: Hasher,
{
    let mut queue: VecDeque<_> = items
        .into_iter()
        .map(|(pos, item)| (pos, item, 0u8))
        .collect();

    while let Some((pos, item, height)) = queue.pop_front() {
        if pos == peak_pos {
            if queue.is_empty() {
                return Ok(item);
            }
            return Err(Error::CorruptedProof(
                "queue not empty after reaching peak position".into(),
            ));
        }
        let next_height = pos_height_in_tree(pos + 1);
        let offset = sibling_offset(height);
        let (parent_pos, parent_item) = if next_height > height {
            let sib_pos = pos - offset;
            let parent_pos = pos + 1;
            let parent_item = if Some(&sib_pos) == queue.front().map(|(pos, ..)| pos) {
                let sibling = queue.pop_front().map(|(_, item, _)| item).unwrap();
                hasher.concat_and_hash(&sibling, &item)
            } else {
                let sibling = proof_iter
                    .next()
                    .ok_or_else(|| Error::CorruptedProof("not enough helper hashes".into()))?;
                hasher.concat_and_hash(sibling, &item)
            };
            (parent_pos, parent_item)
        } else {
            let sib_pos = pos + offset;
            let parent_pos = pos + parent_offset(height);
            let parent_item = if Some(&sib_pos) == queue.front().map(|(pos, ..)| pos) {
                let sibling = queue.pop_front().map(|(_, item, _)| item).unwrap();
                hasher.concat_and_hash(&item, &sibling)
            } else {
                let sibling = proof_iter
                    .next()
                    .ok_or_else(|| Error::CorruptedProof("not enough helper hashes".into()))?;
                hasher.concat_and_hash(&item, sibling)
            };
            (parent_pos, parent_item)
        };

        if parent_pos <= peak_pos {
            queue.push_back((parent_pos, parent_item, height + 1));
        } else {
            return Err(Error::CorruptedProof(
                "parent position exceeds peak position".into(),
            ));
        }
    }
    Err(Error::CorruptedProof(
        "queue exhausted without reaching peak".into(),
    ))
}

fn calculate_peaks_hashes<'a, I, H>(
    mut items: Vec<(u64, Hash)>,
    mmr_size: u64,
    mut proof_iter: I,
    hasher: &H,
) -> Result<Vec<Hash>>
where
    I: Iterator<Item = &'a Hash>,
    H: Hasher,
{
    if mmr_size == 1 && items.len() == 1 && items[0].0 == 0 {
        return Ok(items.into_iter().map(|(_, hash)| hash).collect());
    }

    items.sort_by_key(|(pos, _)| *pos);
    items.dedup_by(|a, b| a.0 == b.0);
    let peaks = get_peaks(mmr_size);

    let mut peaks_hashes = Vec::with_capacity(peaks.len() + 1);
    for peak_pos in peaks {
        let mut peak_items = take_while_vec(&mut items, |(pos, _)| *pos <= peak_pos);
        let peak_root = if peak_items.len() == 1 && peak_items[0].0 == peak_pos {
            peak_items.remove(0).1
        } else if peak_items.is_empty() {
            if let Some(peak_root) = proof_iter.next() {
                peak_root.clone()
            } else {
                break;
            }
        } else {
            calculate_peak_root(peak_items, peak_pos, &mut proof_iter, hasher)?
        };
        peaks_hashes.push(peak_root);
    }

    if !items.is_empty() {
        return Err(Error::CorruptedProof("unprocessed leaves remain".into()));
    }

    if let Some(rhs_bagged) = proof_iter.next() {
        peaks_hashes.push(rhs_bagged.clone());
    }
    if proof_iter.next().is_some() {
        return Err(Error::CorruptedProof(
            "excess proof items after processing all peaks".into(),
        ));
    }
    Ok(peaks_hashes)
}

fn calculate_root<'a, I, H>(
    items: Vec<(u64, Hash)>,
    mmr_size: u64,
    proof_iter: I,
    hasher: &H,
) -> Result<Hash>
where
    I: Iterator<Item = &'a Hash>,
    H: Hasher,
{
    let peaks_hashes = calculate_peaks_hashes(items, mmr_size, proof_iter, hasher)?;
    bag_peaks(peaks_hashes, hasher).ok_or_else(|| Error::CorruptedProof("no peaks to bag".into()))
}

/// Drain elements from the front of `v` while `p` returns true.
fn take_while_vec<T, P: Fn(&T) -> bool>(v: &mut Vec<T>, p: P) -> Vec<T> {
    for i in 0..v.len() {
        if !p(&v[i]) {
            return v.drain(..i).collect();
        }
    }
    mem::take(v)
}
