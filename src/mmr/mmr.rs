//! The Merkle Mountain Range itself: push, root, and proof generation.

use std::collections::VecDeque;

use super::{
    error::{Error, Result},
    helper::{get_peak_map, get_peaks, parent_offset, pos_height_in_tree, sibling_offset},
    proof::Proof,
    store::{Batch, StoreReadOps, StoreWriteOps},
};
use crate::hasher::{Hash, Hasher};

/// An append-only Merkle Mountain Range backed by a pluggable store.
///
/// `S` is the backing store (see [`StoreReadOps`]/[`StoreWriteOps`]); `H`
/// is the user-supplied hash function. Pushes are buffered in an internal
/// [`Batch`] — call [`MMR::commit`] to flush them to the store.
pub struct MMR<S, H> {
    size: u64,
    batch: Batch<S>,
    hasher: H,
}

impl<S, H> MMR<S, H> {
    /// Create an MMR resuming at `size` nodes, backed by `store`.
    ///
    /// Use `size = 0` for a fresh, empty MMR. To resume an existing MMR,
    /// pass the size last returned by [`MMR::size`] after a commit.
    pub fn new(size: u64, store: S, hasher: H) -> Self {
        MMR {
            size,
            batch: Batch::new(store),
            hasher,
        }
    }

    /// The current number of MMR nodes (leaves *and* internal nodes).
    pub fn size(&self) -> u64 {
        self.size
    }

    /// `true` if the MMR has never had a leaf pushed.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// A reference to the underlying store.
    pub fn store(&self) -> &S {
        self.batch.store()
    }
}

impl<S: StoreReadOps, H: Hasher> MMR<S, H> {
    fn get_or_staged(&self, pos: u64, staged: &[Hash]) -> Result<Hash> {
        if let Some(offset) = pos.checked_sub(self.size) {
            if let Some(hash) = staged.get(offset as usize) {
                return Ok(hash.clone());
            }
        }
        self.batch.get(pos).ok_or(Error::InconsistentStore(pos))
    }

    /// Push a leaf hash onto the MMR.
    ///
    /// Returns the node position assigned to the new leaf. Internal
    /// (parent) nodes created by the push are staged alongside it; none of
    /// it is visible to readers of the underlying store until
    /// [`MMR::commit`] is called.
    pub fn push(&mut self, leaf_hash: Hash) -> Result<u64> {
        let elem_pos = self.size;
        let mut staged = vec![leaf_hash];
        let peak_map = get_peak_map(self.size);
        let mut pos = self.size;
        let mut peak = 1;
        while (peak_map & peak) != 0 {
            peak <<= 1;
            pos += 1;
            let left_pos = pos - peak;
            let left = self.get_or_staged(left_pos, &staged)?;
            let right = staged.last().expect("just pushed").clone();
            staged.push(self.hasher.concat_and_hash(&left, &right));
        }
        self.batch.append(elem_pos, staged);
        self.size = pos + 1;
        Ok(elem_pos)
    }

    /// Compute the root hash by bagging all peaks right-to-left.
    pub fn root(&self) -> Result<Hash> {
        if self.size == 0 {
            return Err(Error::GetRootOnEmpty);
        }
        if self.size == 1 {
            return self.batch.get(0).ok_or(Error::InconsistentStore(0));
        }
        let peaks = get_peaks(self.size)
            .into_iter()
            .map(|pos| self.batch.get(pos).ok_or(Error::InconsistentStore(pos)))
            .collect::<Result<Vec<_>>>()?;
        bag_peaks(peaks, &self.hasher)
            .ok_or_else(|| Error::CorruptedProof("no peaks to bag while computing root".into()))
    }

    fn gen_proof_for_peak(
        &self,
        proof: &mut Vec<Hash>,
        pos_list: Vec<u64>,
        peak_pos: u64,
    ) -> Result<()> {
        if pos_list.len() == 1 && pos_list[0] == peak_pos {
            return Ok(());
        }
        if pos_list.is_empty() {
            proof.push(
                self.batch
                    .get(peak_pos)
                    .ok_or(Error::InconsistentStore(peak_pos))?,
            );
            return Ok(());
        }

        let mut queue: VecDeque<_> = pos_list.into_iter().map(|pos| (pos, 0u8)).collect();
        while let Some((pos, height)) = queue.pop_front() {
            if pos == peak_pos {
                continue;
            }
            let next_height = pos_height_in_tree(pos + 1);
            let (sib_pos, parent_pos) = if next_height > height {
                (pos - sibling_offset(height), pos + 1)
            } else {
                (pos + sibling_offset(height), pos + parent_offset(height))
            };

            if Some(&sib_pos) == queue.front().map(|(pos, _)| pos) {
                queue.pop_front();
            } else {
                proof.push(
                    self.batch
                        .get(sib_pos)
                        .ok_or(Error::InconsistentStore(sib_pos))?,
                );
            }
            if parent_pos < peak_pos {
                queue.push_back((parent_pos, height + 1));
            }
        }
        Ok(())
    }

    /// Generate a Merkle inclusion proof for the given node positions.
    ///
    /// Positions are sorted and de-duplicated internally.
    pub fn gen_proof(&self, mut pos_list: Vec<u64>) -> Result<Proof<H>> {
        if pos_list.is_empty() {
            return Err(Error::GenProofForInvalidLeaves(
                "position list is empty".into(),
            ));
        }
        if self.size == 1 && pos_list == [0] {
            return Ok(Proof::new(self.size, Vec::new(), self.hasher.clone()));
        }
        pos_list.sort_unstable();
        pos_list.dedup();

        let peaks = get_peaks(self.size);
        let mut proof = Vec::new();
        let mut bagging_track = 0usize;
        for peak_pos in peaks {
            let split_at = pos_list.partition_point(|&pos| pos <= peak_pos);
            let prefix: Vec<u64> = pos_list.drain(..split_at).collect();
            if prefix.is_empty() {
                bagging_track += 1;
            } else {
                bagging_track = 0;
            }
            self.gen_proof_for_peak(&mut proof, prefix, peak_pos)?;
        }

        if !pos_list.is_empty() {
            return Err(Error::GenProofForInvalidLeaves(format!(
                "{} position(s) exceed the MMR's peak range",
                pos_list.len()
            )));
        }

        if bagging_track > 1 {
            let rhs_peaks = proof.split_off(proof.len() - bagging_track);
            let bagged = bag_peaks(rhs_peaks, &self.hasher)
                .ok_or_else(|| Error::CorruptedProof("no right-hand peaks to bag".into()))?;
            proof.push(bagged);
        }

        Ok(Proof::new(self.size, proof, self.hasher.clone()))
    }
}

impl<S: StoreWriteOps, H> MMR<S, H> {
    /// Flush all buffered pushes to the underlying store.
    pub fn commit(&mut self) {
        self.batch.commit();
    }
}

/// Bag peaks right-to-left: pop the rightmost (R) then the next (L), push
/// `hash(R || L)`, until one hash remains.
pub(crate) fn bag_peaks<H: Hasher>(mut peaks: Vec<Hash>, hasher: &H) -> Option<Hash> {
    while peaks.len() > 1 {
        let right = peaks.pop().expect("len > 1");
        let left = peaks.pop().expect("len > 1");
        peaks.push(hasher.concat_and_hash(&right, &left));
    }
    peaks.pop()
}
