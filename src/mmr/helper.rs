//! Pure position arithmetic for the MMR's node-position space.
//!
//! A position identifies any node (leaf or internal) in the dense sequence
//! of nodes an MMR has ever held; it is distinct from a leaf's 0-based
//! ordinal ("leaf index"). All functions here are total and side-effect
//! free.

/// Convert a 0-based leaf index to its MMR node position.
///
/// # Panics
///
/// Overflows (wraps, in release; panics in debug) when `index` is within a
/// few bits of `u64::MAX`. Callers validate indices against the MMR's
/// current leaf count before calling.
pub fn leaf_index_to_pos(index: u64) -> u64 {
    // mmr_size - H - 1, H is the height (in positions) of the last peak.
    leaf_index_to_mmr_size(index) - (index + 1).trailing_zeros() as u64 - 1
}

/// Compute the MMR size after `index + 1` leaves have been pushed.
pub fn leaf_index_to_mmr_size(index: u64) -> u64 {
    // leaf index starts at 0
    let leaves_count = index + 1;
    // the peak count is the number of 1 bits in the leaf count
    let peak_count = leaves_count.count_ones() as u64;
    2 * leaves_count - peak_count
}

/// Derive the number of leaves an MMR of the given size holds.
///
/// The peak bitmap's numeric value equals the leaf count: each set bit at
/// height `h` contributes `2^h` leaves.
pub fn mmr_size_to_leaf_count(mmr_size: u64) -> u64 {
    get_peak_map(mmr_size)
}

/// The height of the subtree rooted at `pos`.
///
/// Leaves have height 0; internal nodes have height > 0.
pub fn pos_height_in_tree(mut pos: u64) -> u8 {
    pos += 1;

    fn all_ones(num: u64) -> bool {
        num != 0 && num.count_zeros() == num.leading_zeros()
    }
    fn jump_left(pos: u64) -> u64 {
        let bit_length = 64 - pos.leading_zeros();
        let most_significant_bit = 1u64 << (bit_length - 1);
        pos - (most_significant_bit - 1)
    }

    while !all_ones(pos) {
        pos = jump_left(pos);
    }

    (64 - pos.leading_zeros() - 1) as u8
}

/// Offset from a node to its sibling at the given height.
pub fn sibling_offset(height: u8) -> u64 {
    (2 << height) - 1
}

/// Offset from a node to its parent at the given height.
pub fn parent_offset(height: u8) -> u64 {
    2 << height
}

/// Bitmap of peak heights for an MMR of the given size.
///
/// Bit `h` is set iff there is a peak of height `h`. The numeric value of
/// the bitmap equals the MMR's leaf count.
pub fn get_peak_map(mmr_size: u64) -> u64 {
    if mmr_size == 0 {
        return 0;
    }
    let mut pos = mmr_size;
    let mut peak_size = u64::MAX >> pos.leading_zeros();
    let mut peak_map = 0;
    while peak_size > 0 {
        peak_map <<= 1;
        if pos >= peak_size {
            pos -= peak_size;
            peak_map |= 1;
        }
        peak_size >>= 1;
    }
    peak_map
}

/// Positions of the peaks of an MMR of the given size, left to right.
pub fn get_peaks(mmr_size: u64) -> Vec<u64> {
    if mmr_size == 0 {
        return vec![];
    }
    let leading_zeros = mmr_size.leading_zeros();
    let mut pos = mmr_size;
    let mut peak_size = u64::MAX >> leading_zeros;
    let mut peaks = Vec::with_capacity(64 - leading_zeros as usize);
    let mut peaks_sum = 0;
    while peak_size > 0 {
        if pos >= peak_size {
            pos -= peak_size;
            peaks.push(peaks_sum + peak_size - 1);
            peaks_sum += peak_size;
        }
        peak_size >>= 1;
    }
    peaks
}
