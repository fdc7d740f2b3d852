//! Composed operations for leaves that implement the `SumLeaf` or `BitOps`
//! extension traits (spec.md §4.3.2 `psum`/`search`/`search0`/`select_c`).
//!
//! The generic engine in `mod.rs` only knows how to descend by position or
//! by aggregate value; it never inspects what a leaf's local `psum`/`rank`/
//! `select` actually compute. These impls compose the two, so every façade
//! that needs prefix sums (`DPS`, `DWT`'s levels) or rank/select (`DBS`)
//! shares one implementation instead of five copies.

use super::leaf::{BitOps, LeafContainer, SumLeaf};
use super::{BpTree, Root};

impl<L: LeafContainer> BpTree<L> {
    /// Overwrite the value at `index`, adjusting the sum deque by whatever
    /// `weight_fn` says the replacement is worth (spec.md §4.4 `set_value`
    /// as "increment by the signed delta"; here folded into one leaf write
    /// instead of a read-modify-write pair).
    pub fn set(&mut self, index: usize, value: L::Value) {
        let path = self.locate(index);
        let leaf = self.leaves.get(path.leaf);
        let old_weight = (self.weight_fn)(leaf.at(path.offset)) as i64;
        let new_weight = (self.weight_fn)(value) as i64;
        self.leaves.get_mut(path.leaf).set(path.offset, value);
        if new_weight != old_weight {
            self.propagate(&path, 0, new_weight - old_weight);
        }
    }
}

impl<L: SumLeaf> BpTree<L> {
    /// Sum of the first `i + 1` values (spec.md §4.3.2, §4.4).
    pub fn psum(&self, i: usize) -> u64 {
        let path = self.locate(i);
        let leaf = self.leaves.get(path.leaf);
        self.preceding_sum(&path) + leaf.psum(path.offset)
    }

    /// Sum of every value currently in the tree.
    pub fn total_sum(&self) -> u64 {
        match self.root {
            Root::Empty => 0,
            Root::Leaf(id) => self.leaves.get(id).total(),
            Root::Internal(id) => self.nodes.get(id).total_sum(),
        }
    }

    /// Smallest index `i` with `psum(i) >= s`, or `-1` if `total_sum() < s`
    /// (spec.md §4.3.2 `search`).
    pub fn search(&self, s: u64) -> isize {
        if s == 0 {
            return if self.is_empty() { -1 } else { 0 };
        }
        match self.locate_by_sum(s) {
            None => -1,
            Some((path, remaining)) => {
                let leaf = self.leaves.get(path.leaf);
                let local = leaf.search(remaining);
                if local < 0 {
                    -1
                } else {
                    self.preceding_count(&path) as isize + local
                }
            }
        }
    }
}

impl<L: BitOps> BpTree<L> {
    /// Count of 1-bits in positions `[0, i)` (spec.md §4.5 `rank1` is built
    /// from this as `rank1(i) = bit_psum(i - 1)`, 0 for `i == 0`).
    fn bit_psum_inclusive(&self, i: usize) -> u64 {
        let path = self.locate(i);
        let leaf = self.leaves.get(path.leaf);
        self.preceding_sum(&path) + leaf.rank1(path.offset + 1) as u64
    }

    pub fn rank1(&self, i: usize) -> usize {
        if i == 0 {
            0
        } else {
            self.bit_psum_inclusive(i - 1) as usize
        }
    }

    pub fn rank0(&self, i: usize) -> usize {
        i - self.rank1(i)
    }

    pub fn count1(&self) -> usize {
        self.total_ones() as usize
    }

    pub fn count0(&self) -> usize {
        self.size() - self.count1()
    }

    fn total_ones(&self) -> u64 {
        match self.root {
            Root::Empty => 0,
            Root::Leaf(id) => self.leaves.get(id).rank1(self.leaves.get(id).len()) as u64,
            Root::Internal(id) => self.nodes.get(id).total_sum(),
        }
    }

    /// Position of the `n`-th (0-based) 1-bit, or `-1` if absent (spec.md
    /// §4.5 `select1` = `search(n + 1)` via the sum deque).
    pub fn select1(&self, n: usize) -> isize {
        if self.is_empty() {
            return -1;
        }
        match self.locate_by_sum(n as u64 + 1) {
            None => -1,
            Some((path, remaining)) => {
                if remaining == 0 {
                    return -1;
                }
                let leaf = self.leaves.get(path.leaf);
                let local = leaf.select1((remaining - 1) as usize);
                if local < 0 {
                    -1
                } else {
                    self.preceding_count(&path) as isize + local
                }
            }
        }
    }

    /// Position of the `n`-th (0-based) 0-bit, descending by `count - sum`
    /// (spec.md §4.5 `select0`).
    pub fn select0(&self, n: usize) -> isize {
        if self.is_empty() {
            return -1;
        }
        match self.locate_by_count_minus_sum(n as u64 + 1) {
            None => -1,
            Some((path, remaining)) => {
                if remaining == 0 {
                    return -1;
                }
                let leaf = self.leaves.get(path.leaf);
                let local = leaf.select0((remaining - 1) as usize);
                if local < 0 {
                    -1
                } else {
                    self.preceding_count(&path) as isize + local
                }
            }
        }
    }
}
