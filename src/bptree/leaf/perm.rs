//! Permutation container leaf backing `DynamicPermutation` (spec.md §4.1, §4.8).
//!
//! Stores `(pointer, key)` pairs where `pointer` is the partner tree's
//! leaf-arena index and `key` is an 8-bit disambiguator unique within the
//! partner leaf, per `original_source/include/permutation/permutation_item.hpp`
//! (the authoritative `PermutationItem { uint64_t pointer; uint8_t key; }`).
//!
//! The pointer is kept as a plain `u64` rather than variable-length coded —
//! see DESIGN.md for the rationale; every operation the spec documents for
//! this container is preserved exactly.

use super::ds64::{read_u64, read_u8};
use super::LeafContainer;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PermItem {
    pub pointer: u64,
    pub key: u8,
}

impl PermItem {
    /// Placeholder written by `DynamicPermutation::insert` before the real
    /// partner pair is known (spec.md §4.8 step 1/2, "insert a stub
    /// `(0, 0xFF)`"). `pointer` is `u64::MAX` rather than literal `0` here:
    /// a real pointer is always a live leaf-arena index, so this sentinel
    /// can never collide with one and confuse `get_new_key`/`find` while the
    /// stub is briefly in the tree.
    pub const STUB: PermItem = PermItem {
        pointer: u64::MAX,
        key: 0xFF,
    };
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermLeaf {
    items: Vec<PermItem>,
}

impl LeafContainer for PermLeaf {
    type Value = PermItem;

    fn len(&self) -> usize {
        self.items.len()
    }

    fn at(&self, i: usize) -> PermItem {
        self.items[i]
    }

    fn insert(&mut self, i: usize, v: PermItem) {
        self.items.insert(i, v);
    }

    fn remove(&mut self, i: usize) -> PermItem {
        self.items.remove(i)
    }

    fn byte_size(&self) -> usize {
        8 + self.items.len() * 9
    }

    fn serialize(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&(self.items.len() as u64).to_le_bytes());
        for item in &self.items {
            out.extend_from_slice(&item.pointer.to_le_bytes());
            out.push(item.key);
        }
    }

    fn deserialize(buf: &[u8], pos: &mut usize) -> Self {
        let n = read_u64(buf, pos) as usize;
        let mut items = Vec::with_capacity(n);
        for _ in 0..n {
            let pointer = read_u64(buf, pos);
            let key = read_u8(buf, pos);
            items.push(PermItem { pointer, key });
        }
        PermLeaf { items }
    }
}

impl PermLeaf {
    /// Smallest `u8` not currently used as a key among entries whose pointer
    /// equals `partner_leaf` (spec.md §4.1 `get_new_key`, up to 256
    /// simultaneous partners per leaf).
    pub fn get_new_key(&self, partner_leaf: u64) -> u8 {
        let mut used = [false; 256];
        for item in &self.items {
            if item.pointer == partner_leaf {
                used[item.key as usize] = true;
            }
        }
        used.iter()
            .position(|&taken| !taken)
            .expect("leaf exhausted all 256 partner keys") as u8
    }

    /// Position of the entry whose `(pointer, key)` exactly matches, if any.
    pub fn find(&self, pointer: u64, key: u8) -> Option<usize> {
        self.items
            .iter()
            .position(|item| item.pointer == pointer && item.key == key)
    }

    pub fn set(&mut self, i: usize, v: PermItem) {
        self.items[i] = v;
    }

    /// Like [`Self::get_new_key`], but ignores the entry at `exclude_idx`
    /// while scanning for used keys. Used when re-keying an entry in place
    /// after a value moved trees (`DynamicPermutation`'s `update_linked_tree`
    /// hook): the entry being re-keyed is itself still present in `items` and
    /// must not count as "already using" its own old key.
    pub fn get_new_key_excluding(&self, exclude_idx: usize, partner_leaf: u64) -> u8 {
        let mut used = [false; 256];
        for (idx, item) in self.items.iter().enumerate() {
            if idx != exclude_idx && item.pointer == partner_leaf {
                used[item.key as usize] = true;
            }
        }
        used.iter()
            .position(|&taken| !taken)
            .expect("leaf exhausted all 256 partner keys") as u8
    }
}
