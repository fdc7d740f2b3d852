//! Leaf container contract (spec.md §4.1) and its concrete variants.
//!
//! A leaf holds at most `L_max` values of one concrete element type. The
//! generic B+ tree engine (`crate::bptree::BpTree`) only depends on the base
//! [`LeafContainer`] trait; façades that need prefix sums, rank/select, or
//! permutation-partner bookkeeping add a bound on the relevant extension
//! trait in their own impl blocks, mirroring how the teacher keeps
//! `StaticBitVec`/`DynBitVec` as separate small traits rather than one
//! monolithic interface (`src/traits.rs`).

mod bitbuf;
pub mod bits;
pub mod ds64;
pub mod perm;
pub mod vlc;

pub use bits::BitLeaf;
pub use ds64::Ds64Leaf;
pub use perm::{PermItem, PermLeaf};
pub use vlc::VlcLeaf;

use std::fmt::Debug;

/// Minimal shape every leaf variant must provide. The B+ tree engine never
/// inspects a leaf's internal layout beyond this contract.
pub trait LeafContainer: Default + Clone + Debug {
    type Value: Copy;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn at(&self, i: usize) -> Self::Value;

    /// Insert `v` at position `i`, `i` in `0..=len()`.
    fn insert(&mut self, i: usize, v: Self::Value);

    /// Remove and return the value at position `i`.
    fn remove(&mut self, i: usize) -> Self::Value;

    fn push_back(&mut self, v: Self::Value) {
        let n = self.len();
        self.insert(n, v);
    }

    fn push_front(&mut self, v: Self::Value) {
        self.insert(0, v);
    }

    /// Bulk-append a sequence at the back, in order.
    fn push_many_back(&mut self, seq: &[Self::Value]) {
        for &v in seq {
            self.push_back(v);
        }
    }

    fn push_many_front(&mut self, seq: &[Self::Value]) {
        for &v in seq.iter().rev() {
            self.push_front(v);
        }
    }

    /// Remove and return the last `k` values, in their original left-to-right order.
    fn pop_back(&mut self, k: usize) -> Vec<Self::Value> {
        let mut out = Vec::with_capacity(k);
        for _ in 0..k {
            out.push(self.remove(self.len() - 1));
        }
        out.reverse();
        out
    }

    /// Remove and return the first `k` values, in their original left-to-right order.
    fn pop_front(&mut self, k: usize) -> Vec<Self::Value> {
        let mut out = Vec::with_capacity(k);
        for _ in 0..k {
            out.push(self.remove(0));
        }
        out
    }

    /// Overwrite the value at `i`. The default goes through `remove`+`insert`,
    /// which is correct for every variant but wasteful for ones that can
    /// mutate in place (`Ds64Leaf`, `SumLeaf::set` below); those override it.
    fn set(&mut self, i: usize, v: Self::Value) {
        self.remove(i);
        self.insert(i, v);
    }

    fn swap(&mut self, other: &mut Self) {
        std::mem::swap(self, other);
    }

    fn clear(&mut self) {
        *self = Self::default();
    }

    fn to_values(&self) -> Vec<Self::Value> {
        (0..self.len()).map(|i| self.at(i)).collect()
    }

    fn byte_size(&self) -> usize;

    fn serialize(&self, out: &mut Vec<u8>);

    /// Deserialise a leaf previously written with [`LeafContainer::serialize`],
    /// advancing `pos` past the consumed bytes.
    fn deserialize(buf: &[u8], pos: &mut usize) -> Self;
}

/// Extension for leaves whose value type supports a running sum: prefix-sum,
/// search-by-cumulative-value, and signed increment (spec.md §4.1, §4.4).
pub trait SumLeaf: LeafContainer<Value = u64> {
    /// Sum of the first `i + 1` values.
    fn psum(&self, i: usize) -> u64;

    /// Sum of all values.
    fn total(&self) -> u64 {
        if self.is_empty() {
            0
        } else {
            self.psum(self.len() - 1)
        }
    }

    /// Sum of the last `i + 1` values.
    fn reverse_psum(&self, i: usize) -> u64 {
        self.total() - if self.len() > i + 1 { self.psum(self.len() - i - 2) } else { 0 }
    }

    /// Sum of values in `[i, j]` inclusive.
    fn psum_range(&self, i: usize, j: usize) -> u64 {
        self.psum(j) - if i == 0 { 0 } else { self.psum(i - 1) }
    }

    /// Smallest `i` with `psum(i) >= s`, or `-1` if `total() < s`.
    fn search(&self, s: u64) -> isize {
        if s == 0 {
            return 0;
        }
        let mut acc = 0u64;
        for i in 0..self.len() {
            acc += self.at(i);
            if acc >= s {
                return i as isize;
            }
        }
        -1
    }

    /// Add the signed delta `d` to the value at position `i`.
    fn increment(&mut self, i: usize, d: i64) {
        let cur = self.at(i) as i64;
        let new_value = (cur + d) as u64;
        self.set(i, new_value);
    }

    fn set(&mut self, i: usize, v: u64);
}

/// Extension for bit leaves (spec.md §4.5).
pub trait BitOps: LeafContainer<Value = bool> {
    fn rank1(&self, i: usize) -> usize;

    fn rank0(&self, i: usize) -> usize {
        i - self.rank1(i)
    }

    /// Position of the `n`-th (0-based) 1-bit, or `-1` if absent.
    fn select1(&self, n: usize) -> isize;

    /// Position of the `n`-th (0-based) 0-bit, or `-1` if absent.
    fn select0(&self, n: usize) -> isize;

    fn count1(&self) -> usize {
        self.rank1(self.len())
    }

    fn count0(&self) -> usize {
        self.len() - self.count1()
    }

    fn flip(&mut self, i: usize);
}
