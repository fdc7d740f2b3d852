//! Dynamic prefix sum (spec.md §4.4, component C4): a façade over
//! [`BpTree`] with the sum deque active and a variable-length-coded `u64`
//! leaf ([`VlcLeaf`]). The thin layer every other numeric façade either is
//! (`DS64`, sums off) or builds on top of (`DWT`'s per-level bit sequences
//! reuse the same sum-deque plumbing via `DBS`).

use crate::bptree::leaf::vlc::VlcLeaf;
use crate::bptree::{BpConfig, BpTree};
use crate::error::{Error, Result};
use crate::io;
use crate::memory::MemoryUsage;

fn identity_weight(v: u64) -> u64 {
    v
}

/// `DPS`: a dynamic sequence of `u64` supporting prefix-sum queries.
#[derive(Debug, Clone)]
pub struct DynamicPrefixSum {
    tree: BpTree<VlcLeaf>,
}

impl DynamicPrefixSum {
    pub fn new(d_max: usize, l_max: usize) -> Result<Self> {
        let config = BpConfig::new(d_max, l_max)?;
        Ok(DynamicPrefixSum {
            tree: BpTree::new(config, true).with_weight_fn(identity_weight),
        })
    }

    pub fn build(d_max: usize, l_max: usize, values: &[u64]) -> Result<Self> {
        let config = BpConfig::new(d_max, l_max)?;
        Ok(DynamicPrefixSum {
            tree: BpTree::build(config, true, identity_weight, values),
        })
    }

    pub fn size(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    pub fn size_in_bytes(&self) -> usize {
        self.tree.byte_size()
    }

    pub fn get_memory_usage_info(&self, _paragraph: &str) -> MemoryUsage {
        MemoryUsage::new(
            self.tree.byte_size(),
            vec![("tree", self.tree.byte_size())],
        )
    }

    pub fn at(&self, i: usize) -> Result<u64> {
        self.tree.check_bounds(i)?;
        Ok(self.tree.at(i))
    }

    /// Sum of the first `i + 1` values.
    pub fn psum(&self, i: usize) -> Result<u64> {
        self.tree.check_bounds(i)?;
        Ok(self.tree.psum(i))
    }

    /// Sum of every value currently in the sequence.
    pub fn total(&self) -> u64 {
        self.tree.total_sum()
    }

    /// Smallest `i` with `psum(i) >= s`, or `-1` if `total() < s` (spec.md
    /// §4.3.2, §8 property 2).
    pub fn search(&self, s: u64) -> isize {
        self.tree.search(s)
    }

    #[tracing::instrument(level = "trace", skip(self))]
    pub fn insert(&mut self, i: usize, v: u64) -> Result<()> {
        if i > self.size() {
            return Err(Error::OutOfRange {
                index: i,
                size: self.size(),
            });
        }
        self.tree.insert(i, v);
        Ok(())
    }

    #[tracing::instrument(level = "trace", skip(self))]
    pub fn remove(&mut self, i: usize) -> Result<u64> {
        self.tree.check_bounds(i)?;
        Ok(self.tree.remove(i))
    }

    pub fn push_back(&mut self, v: u64) {
        let n = self.size();
        self.tree.insert(n, v);
    }

    pub fn push_front(&mut self, v: u64) {
        self.tree.insert(0, v);
    }

    pub fn pop_back(&mut self) -> Option<u64> {
        if self.is_empty() {
            None
        } else {
            Some(self.tree.remove(self.size() - 1))
        }
    }

    pub fn pop_front(&mut self) -> Option<u64> {
        if self.is_empty() {
            None
        } else {
            Some(self.tree.remove(0))
        }
    }

    /// Add signed `delta` to the value at `i`.
    pub fn increment(&mut self, i: usize, delta: i64) -> Result<()> {
        self.tree.check_bounds(i)?;
        let cur = self.tree.at(i) as i64;
        let new_value = (cur + delta).max(0) as u64;
        self.tree.set(i, new_value);
        Ok(())
    }

    pub fn decrement(&mut self, i: usize, delta: u64) -> Result<()> {
        self.increment(i, -(delta as i64))
    }

    pub fn set_value(&mut self, i: usize, v: u64) -> Result<()> {
        self.tree.check_bounds(i)?;
        let delta = v as i64 - self.tree.at(i) as i64;
        self.increment(i, delta)
    }

    pub fn set_values(&mut self, i: usize, seq: &[u64]) -> Result<()> {
        for (k, &v) in seq.iter().enumerate() {
            self.set_value(i + k, v)?;
        }
        Ok(())
    }

    /// Largest index `i` with `psum(i) <= v`, or `-1` if the sequence is
    /// empty or every value sums to less than the first element (spec.md
    /// §4.4: `search(v)` "refined by at most one comparison against psum at
    /// the returned index").
    pub fn predecessor_index(&self, v: u64) -> isize {
        if self.is_empty() {
            return -1;
        }
        let i = self.search(v);
        if i < 0 {
            return self.size() as isize - 1;
        }
        if self.tree.psum(i as usize) == v {
            i
        } else {
            i - 1
        }
    }

    /// `search(v)` unchanged, or `-1` if `v` exceeds the total sum.
    pub fn successor_index(&self, v: u64) -> isize {
        self.search(v)
    }

    pub fn clear(&mut self) {
        self.tree.clear();
    }

    pub fn swap(&mut self, other: &mut Self) {
        std::mem::swap(&mut self.tree, &mut other.tree);
    }

    pub fn verify(&self) {
        self.tree.verify_counts();
        self.tree.verify_sums();
    }

    pub fn store_to_bytes(&self, buf: &mut Vec<u8>) {
        self.tree.store_into(buf);
    }

    pub fn load_from_bytes(buf: &[u8], pos: &mut usize) -> Result<Self> {
        let tree = BpTree::load_from(buf, pos, identity_weight)?;
        Ok(DynamicPrefixSum { tree })
    }

    pub fn store_to_file(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        io::write_bytes(path, &self.tree.store())
    }

    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = io::read_bytes(path)?;
        Ok(DynamicPrefixSum {
            tree: BpTree::load(&bytes, identity_weight)?,
        })
    }

    pub fn to_values(&self) -> Vec<u64> {
        (0..self.size()).map(|i| self.tree.at(i)).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        (0..self.size()).map(move |i| self.tree.at(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use quickcheck::TestResult;
    use quickcheck_macros::quickcheck;

    /// spec.md §8 scenario S2.
    #[test]
    fn prefix_sum_scenario() {
        let mut dps = DynamicPrefixSum::build(4, 8, &[3, 1, 4, 1, 5, 9, 2, 6]).unwrap();

        assert_eq!(dps.psum(0).unwrap(), 3);
        assert_eq!(dps.psum(3).unwrap(), 9);
        assert_eq!(dps.psum(7).unwrap(), 31);

        assert_eq!(dps.search(1), 0);
        assert_eq!(dps.search(3), 0);
        assert_eq!(dps.search(4), 1);
        assert_eq!(dps.search(10), 4);
        assert_eq!(dps.search(31), 7);
        assert_eq!(dps.search(32), -1);

        assert_eq!(dps.at(5).unwrap(), 9);

        dps.insert(3, 7).unwrap();
        assert_eq!(dps.to_values(), vec![3, 1, 4, 7, 1, 5, 9, 2, 6]);
        assert_eq!(dps.psum(3).unwrap(), 15);
    }

    #[test]
    fn all_equal_values_search_is_exact_division() {
        let dps = DynamicPrefixSum::build(4, 8, &[5; 10]).unwrap();
        for k in 1..=10u64 {
            let s = k * 5;
            let expected = (k - 1) as isize;
            assert_eq!(dps.search(s), expected);
        }
        assert_eq!(dps.search(46), 9); // ceil(46/5) - 1 = 9, clamped to size - 1
    }

    #[test]
    fn empty_tree_boundary_behaviour() {
        let dps = DynamicPrefixSum::build(4, 8, &[]).unwrap();
        assert_eq!(dps.size(), 0);
        assert_eq!(dps.search(1), -1);
        assert!(dps.at(0).is_err());
    }

    #[test]
    fn predecessor_and_successor_index() {
        let dps = DynamicPrefixSum::build(4, 8, &[3, 1, 4, 1, 5, 9, 2, 6]).unwrap();
        // psum: 3 4 8 9 14 23 25 31
        assert_eq!(dps.successor_index(9), 3);
        assert_eq!(dps.successor_index(32), -1);
        assert_eq!(dps.predecessor_index(9), 3);
        assert_eq!(dps.predecessor_index(10), 3);
    }

    #[test]
    fn increment_decrement_and_set_value() {
        let mut dps = DynamicPrefixSum::build(4, 8, &[1, 2, 3]).unwrap();
        dps.increment(1, 10).unwrap();
        assert_eq!(dps.at(1).unwrap(), 12);
        dps.decrement(1, 5).unwrap();
        assert_eq!(dps.at(1).unwrap(), 7);
        dps.set_value(0, 100).unwrap();
        assert_eq!(dps.at(0).unwrap(), 100);
    }

    #[test]
    fn store_and_load_round_trips() {
        let dps = DynamicPrefixSum::build(4, 8, &[3, 1, 4, 1, 5, 9, 2, 6]).unwrap();
        let mut buf = Vec::new();
        dps.store_to_bytes(&mut buf);
        let mut pos = 0;
        let loaded = DynamicPrefixSum::load_from_bytes(&buf, &mut pos).unwrap();
        assert_eq!(loaded.to_values(), dps.to_values());
        assert_eq!(loaded.total(), dps.total());
    }

    /// spec.md §8 property 2: `psum(i) = sum(at(0..=i))`, and `search`
    /// recovers an index whose own psum already reaches the query.
    #[quickcheck]
    fn psum_matches_naive_sum(values: Vec<u32>) -> TestResult {
        if values.is_empty() || values.len() > 200 {
            return TestResult::discard();
        }
        let values: Vec<u64> = values.iter().map(|&v| v as u64).collect();
        let dps = DynamicPrefixSum::build(4, 8, &values).unwrap();

        let mut running = 0u64;
        for (i, &v) in values.iter().enumerate() {
            running += v;
            if dps.psum(i).unwrap() != running {
                return TestResult::failed();
            }
            let idx = dps.search(running);
            if idx < 0 || idx as usize > i || dps.psum(idx as usize).unwrap() < running {
                return TestResult::failed();
            }
        }
        TestResult::passed()
    }
}
