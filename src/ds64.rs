//! Dynamic sequence-64 (spec.md §4.6, component C6): a façade over
//! [`BpTree`] with the sum deque disabled. Gives random access,
//! insert/remove/push/pop and iteration over a sequence of `u64` without
//! paying for prefix-sum bookkeeping — the thinnest of the six façades,
//! mirroring how `DPS` (`crate::dps`) is the same tree with sums turned on.

use crate::bptree::leaf::ds64::Ds64Leaf;
use crate::bptree::{BpConfig, BpTree};
use crate::error::{Error, Result};
use crate::io;
use crate::memory::MemoryUsage;

/// `DS64`: a dynamic, insertable/removable sequence of `u64` values.
#[derive(Debug, Clone)]
pub struct DynamicSequence64 {
    tree: BpTree<Ds64Leaf>,
}

impl DynamicSequence64 {
    pub fn new(d_max: usize, l_max: usize) -> Result<Self> {
        let config = BpConfig::new(d_max, l_max)?;
        Ok(DynamicSequence64 {
            tree: BpTree::new(config, false),
        })
    }

    /// Build from a flat sequence in one bulk pass (spec.md §4.3.6).
    pub fn build(d_max: usize, l_max: usize, values: &[u64]) -> Result<Self> {
        let config = BpConfig::new(d_max, l_max)?;
        Ok(DynamicSequence64 {
            tree: BpTree::build(config, false, |_| 0, values),
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

    pub fn push_many(&mut self, seq: &[u64]) {
        for &v in seq {
            self.push_back(v);
        }
    }

    pub fn pop_back(&mut self, k: usize) -> Vec<u64> {
        let mut out = Vec::with_capacity(k);
        for _ in 0..k.min(self.size()) {
            out.push(self.tree.remove(self.size() - 1));
        }
        out.reverse();
        out
    }

    pub fn pop_front(&mut self, k: usize) -> Vec<u64> {
        let mut out = Vec::with_capacity(k);
        for _ in 0..k.min(self.size()) {
            out.push(self.tree.remove(0));
        }
        out
    }

    /// Add signed `delta` to the value at `i` (spec.md §4.4's `increment`,
    /// mirrored here without the sum-deque side effect since `DS64` has none).
    pub fn increment(&mut self, i: usize, delta: i64) -> Result<()> {
        self.tree.check_bounds(i)?;
        let cur = self.tree.at(i) as i64;
        self.tree.set(i, (cur + delta) as u64);
        Ok(())
    }

    pub fn set_value(&mut self, i: usize, v: u64) -> Result<()> {
        self.tree.check_bounds(i)?;
        self.tree.set(i, v);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.tree.clear();
    }

    pub fn swap(&mut self, other: &mut Self) {
        std::mem::swap(&mut self.tree, &mut other.tree);
    }

    /// Recompute every count aggregate and panic (debug builds only) on
    /// mismatch (spec.md §7).
    pub fn verify(&self) {
        self.tree.verify_counts();
    }

    pub fn store_to_bytes(&self, buf: &mut Vec<u8>) {
        self.tree.store_into(buf);
    }

    pub fn load_from_bytes(buf: &[u8], pos: &mut usize) -> Result<Self> {
        let tree = BpTree::load_from(buf, pos, |_| 0)?;
        Ok(DynamicSequence64 { tree })
    }

    pub fn store_to_file(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        io::write_bytes(path, &self.tree.store())
    }

    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = io::read_bytes(path)?;
        Ok(DynamicSequence64 {
            tree: BpTree::load(&bytes, |_| 0)?,
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

    /// spec.md §8 scenario S1.
    #[test]
    fn push_insert_remove_scenario() {
        let mut ds = DynamicSequence64::build(4, 8, &[10, 20, 30, 40, 50, 60, 70, 80, 90, 100]).unwrap();

        ds.insert(4, 1).unwrap();
        assert_eq!(ds.at(4).unwrap(), 1);
        assert_eq!(ds.size(), 11);
        assert_eq!(
            ds.to_values(),
            vec![10, 20, 30, 40, 1, 50, 60, 70, 80, 90, 100]
        );

        ds.remove(4).unwrap();
        assert_eq!(
            ds.to_values(),
            vec![10, 20, 30, 40, 50, 60, 70, 80, 90, 100]
        );

        ds.push_back(0);
        ds.push_front(1);
        assert_eq!(
            ds.to_values(),
            vec![1, 10, 20, 30, 40, 50, 60, 70, 80, 90, 100, 0]
        );

        ds.push_many(&[1, 2, 3, 4]);
        let values = ds.to_values();
        assert_eq!(&values[values.len() - 4..], &[1, 2, 3, 4]);

        let mut buf = Vec::new();
        ds.store_to_bytes(&mut buf);
        let mut pos = 0;
        let loaded = DynamicSequence64::load_from_bytes(&buf, &mut pos).unwrap();
        assert_eq!(loaded.to_values(), ds.to_values());
    }

    #[test]
    fn out_of_range_access_errors() {
        let ds = DynamicSequence64::build(4, 8, &[1, 2, 3]).unwrap();
        assert!(ds.at(3).is_err());
        assert!(matches!(ds.at(3), Err(Error::OutOfRange { index: 3, size: 3 })));
    }

    #[test]
    fn empty_sequence_round_trips() {
        let ds = DynamicSequence64::build(4, 8, &[]).unwrap();
        assert_eq!(ds.size(), 0);
        assert!(ds.is_empty());
        let mut buf = Vec::new();
        ds.store_to_bytes(&mut buf);
        let mut pos = 0;
        let loaded = DynamicSequence64::load_from_bytes(&buf, &mut pos).unwrap();
        assert!(loaded.is_empty());
    }

    #[test]
    fn increment_and_set_value() {
        let mut ds = DynamicSequence64::build(4, 8, &[1, 2, 3]).unwrap();
        ds.increment(1, 5).unwrap();
        assert_eq!(ds.at(1).unwrap(), 7);
        ds.set_value(1, 42).unwrap();
        assert_eq!(ds.at(1).unwrap(), 42);
    }

    #[quickcheck]
    fn insert_remove_matches_vec_oracle(ops: Vec<(u8, u64, bool)>) -> TestResult {
        let mut ds = DynamicSequence64::new(4, 8).unwrap();
        let mut oracle: Vec<u64> = Vec::new();

        for (raw_pos, value, do_insert) in ops {
            if do_insert || oracle.is_empty() {
                let pos = raw_pos as usize % (oracle.len() + 1);
                ds.insert(pos, value).unwrap();
                oracle.insert(pos, value);
            } else {
                let pos = raw_pos as usize % oracle.len();
                let expected = oracle.remove(pos);
                let got = ds.remove(pos).unwrap();
                if got != expected {
                    return TestResult::failed();
                }
            }
        }

        if ds.size() != oracle.len() {
            return TestResult::failed();
        }
        TestResult::from_bool(ds.to_values() == oracle)
    }
}
