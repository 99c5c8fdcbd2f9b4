//! MMR node storage: read/write traits, a batching overlay, and a reference
//! in-memory implementation.

use std::{cell::RefCell, collections::BTreeMap};

use crate::hasher::Hash;

/// Read access to the MMR backing store.
///
/// Returns the hash stored at `pos`, or `None` if nothing has been
/// written there yet.
pub trait StoreReadOps {
    /// Retrieve the hash stored at `pos`, if any.
    fn get(&self, pos: u64) -> Option<Hash>;
}

/// Write access to the MMR backing store.
///
/// Implementations persist a contiguous run of hashes starting at `pos`.
/// Appends are always dense and at growing positions; positions are never
/// reused.
pub trait StoreWriteOps {
    /// Persist `hashes` starting at position `pos`.
    fn append(&mut self, pos: u64, hashes: Vec<Hash>);
}

/// In-memory MMR store backed by a `BTreeMap`.
///
/// The reference persistence backend named in the core's external
/// interface; useful for tests and ephemeral computations.
#[derive(Debug, Default, Clone)]
pub struct MemStore(RefCell<BTreeMap<u64, Hash>>);

impl MemStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl StoreReadOps for &MemStore {
    fn get(&self, pos: u64) -> Option<Hash> {
        self.0.borrow().get(&pos).cloned()
    }
}

impl StoreWriteOps for &MemStore {
    fn append(&mut self, pos: u64, hashes: Vec<Hash>) {
        let mut store = self.0.borrow_mut();
        for (i, hash) in hashes.into_iter().enumerate() {
            store.insert(pos + i as u64, hash);
        }
    }
}

/// Write-ahead batch buffer for MMR mutations.
///
/// Appended hashes are held in memory and served back on reads (overlay
/// semantics) until [`Batch::commit`] flushes them to the underlying store.
#[derive(Default)]
pub struct Batch<S> {
    staged: Vec<(u64, Vec<Hash>)>,
    store: S,
}

impl<S> Batch<S> {
    /// Create a new batch wrapping the given store.
    pub fn new(store: S) -> Self {
        Batch {
            staged: Vec::new(),
            store,
        }
    }

    /// Buffer a contiguous run of hashes starting at `pos`.
    pub fn append(&mut self, pos: u64, hashes: Vec<Hash>) {
        self.staged.push((pos, hashes));
    }

    /// Return a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S: StoreReadOps> Batch<S> {
    /// Look up a hash by position, checking the staged writes first
    /// (newest to oldest), falling back to the underlying store on miss.
    pub fn get(&self, pos: u64) -> Option<Hash> {
        for (start_pos, hashes) in self.staged.iter().rev() {
            if pos < *start_pos {
                continue;
            } else if pos < start_pos + hashes.len() as u64 {
                return hashes.get((pos - start_pos) as usize).cloned();
            } else {
                break;
            }
        }
        self.store.get(pos)
    }
}

impl<S: StoreWriteOps> Batch<S> {
    /// Flush all staged writes to the underlying store, in the order they
    /// were appended.
    pub fn commit(&mut self) {
        for (pos, hashes) in self.staged.drain(..) {
            self.store.append(pos, hashes);
        }
    }
}
