//! Dynamic bit sequence (spec.md §4.5, component C5): a `DPS`-shaped façade
//! whose leaf packs bits instead of variable-length-coded integers, adding
//! rank/select on top of the same sum-deque plumbing (the sum deque here
//! tracks the running count of 1-bits, so `psum` *is* `rank1`).

use crate::bptree::leaf::bits::BitLeaf;
use crate::bptree::{BpConfig, BpTree};
use crate::error::{Error, Result};
use crate::io;
use crate::memory::MemoryUsage;

fn bit_weight(b: bool) -> u64 {
    b as u64
}

/// `DBS`: a dynamic bit sequence with rank/select.
#[derive(Debug, Clone)]
pub struct DynamicBitSequence {
    tree: BpTree<BitLeaf>,
}

impl DynamicBitSequence {
    pub fn new(d_max: usize, l_max: usize) -> Result<Self> {
        let config = BpConfig::new(d_max, l_max)?;
        Ok(DynamicBitSequence {
            tree: BpTree::new(config, true).with_weight_fn(bit_weight),
        })
    }

    pub fn build(d_max: usize, l_max: usize, bits: &[bool]) -> Result<Self> {
        let config = BpConfig::new(d_max, l_max)?;
        Ok(DynamicBitSequence {
            tree: BpTree::build(config, true, bit_weight, bits),
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

    pub fn at(&self, i: usize) -> Result<bool> {
        self.tree.check_bounds(i)?;
        Ok(self.tree.at(i))
    }

    /// Count of 1-bits strictly before position `i`.
    pub fn rank1(&self, i: usize) -> usize {
        self.tree.rank1(i)
    }

    /// Count of 0-bits strictly before position `i`.
    pub fn rank0(&self, i: usize) -> usize {
        self.tree.rank0(i)
    }

    /// Position of the `n`-th (0-based) 1-bit, or `-1` if absent.
    pub fn select1(&self, n: usize) -> isize {
        self.tree.select1(n)
    }

    /// Position of the `n`-th (0-based) 0-bit, or `-1` if absent.
    pub fn select0(&self, n: usize) -> isize {
        self.tree.select0(n)
    }

    pub fn count1(&self) -> usize {
        self.tree.count1()
    }

    pub fn count0(&self) -> usize {
        self.tree.count0()
    }

    #[tracing::instrument(level = "trace", skip(self))]
    pub fn insert(&mut self, i: usize, b: bool) -> Result<()> {
        if i > self.size() {
            return Err(Error::OutOfRange {
                index: i,
                size: self.size(),
            });
        }
        self.tree.insert(i, b);
        Ok(())
    }

    #[tracing::instrument(level = "trace", skip(self))]
    pub fn remove(&mut self, i: usize) -> Result<bool> {
        self.tree.check_bounds(i)?;
        Ok(self.tree.remove(i))
    }

    pub fn push_back(&mut self, b: bool) {
        let n = self.size();
        self.tree.insert(n, b);
    }

    pub fn push_front(&mut self, b: bool) {
        self.tree.insert(0, b);
    }

    pub fn push_many(&mut self, seq: &[bool]) {
        for &b in seq {
            self.push_back(b);
        }
    }

    /// Set the bit at `i` to `b`, adjusting the 1-count aggregate by ±1
    /// only if the bit actually flips (spec.md §4.5 `set_bit`).
    pub fn set_bit(&mut self, i: usize, b: bool) -> Result<()> {
        self.tree.check_bounds(i)?;
        self.tree.set(i, b);
        Ok(())
    }

    /// Overwrite `bits.len()` consecutive positions starting at `i` in
    /// place (length unchanged), updating the 1-count aggregate for every
    /// touched position. Used by the range-reporting tree's subtree
    /// rebuild, which redistributes an existing bit range rather than
    /// reinserting each bit one at a time.
    pub fn set_bits(&mut self, i: usize, bits: &[bool]) -> Result<()> {
        for (k, &b) in bits.iter().enumerate() {
            self.set_bit(i + k, b)?;
        }
        Ok(())
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
        let tree = BpTree::load_from(buf, pos, bit_weight)?;
        Ok(DynamicBitSequence { tree })
    }

    pub fn store_to_file(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        io::write_bytes(path, &self.tree.store())
    }

    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = io::read_bytes(path)?;
        Ok(DynamicBitSequence {
            tree: BpTree::load(&bytes, bit_weight)?,
        })
    }

    pub fn to_values(&self) -> Vec<bool> {
        (0..self.size()).map(|i| self.tree.at(i)).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.size()).map(move |i| self.tree.at(i))
    }

    pub(crate) fn tree(&self) -> &BpTree<BitLeaf> {
        &self.tree
    }

    pub(crate) fn tree_mut(&mut self) -> &mut BpTree<BitLeaf> {
        &mut self.tree
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use quickcheck::TestResult;
    use quickcheck_macros::quickcheck;

    fn bits_from(s: &[u8]) -> Vec<bool> {
        s.iter().map(|&b| b != 0).collect()
    }

    /// spec.md §8 scenario S3.
    #[test]
    fn rank_select_scenario() {
        let mut dbs = DynamicBitSequence::build(4, 8, &bits_from(&[1, 0, 1, 1, 0, 0, 1, 0, 1, 1])).unwrap();

        assert_eq!(dbs.rank1(0), 0);
        assert_eq!(dbs.rank1(1), 1);
        assert_eq!(dbs.rank1(5), 3);
        assert_eq!(dbs.rank1(10), 6);

        assert_eq!(dbs.select1(0), 0);
        assert_eq!(dbs.select1(2), 3);
        assert_eq!(dbs.select1(5), 9);

        assert_eq!(dbs.select0(0), 1);
        assert_eq!(dbs.select0(3), 7);
        assert_eq!(dbs.select0(4), -1);

        dbs.set_bit(4, true).unwrap();
        assert_eq!(dbs.rank1(10), 7);
    }

    #[test]
    fn empty_sequence_boundary_behaviour() {
        let dbs = DynamicBitSequence::build(4, 8, &[]).unwrap();
        assert_eq!(dbs.size(), 0);
        assert_eq!(dbs.select1(0), -1);
        assert_eq!(dbs.select0(0), -1);
        assert!(dbs.at(0).is_err());
    }

    #[test]
    fn select_inverts_rank_at_set_bits() {
        let dbs = DynamicBitSequence::build(4, 8, &bits_from(&[1, 0, 1, 1, 0, 0, 1, 0, 1, 1])).unwrap();
        for i in 1..=dbs.size() {
            if dbs.at(i - 1).unwrap() {
                let r = dbs.rank1(i) - 1;
                assert_eq!(dbs.select1(r), (i - 1) as isize, "property 3 at i={i}");
            }
        }
    }

    #[test]
    fn store_and_load_round_trips() {
        let dbs = DynamicBitSequence::build(4, 8, &bits_from(&[1, 0, 1, 1, 0, 0, 1, 0, 1, 1])).unwrap();
        let mut buf = Vec::new();
        dbs.store_to_bytes(&mut buf);
        let mut pos = 0;
        let loaded = DynamicBitSequence::load_from_bytes(&buf, &mut pos).unwrap();
        assert_eq!(loaded.to_values(), dbs.to_values());
    }

    #[quickcheck]
    fn rank0_and_rank1_partition_position(ops: Vec<(u8, bool)>) -> TestResult {
        if ops.is_empty() || ops.len() > 200 {
            return TestResult::discard();
        }
        let mut dbs = DynamicBitSequence::new(4, 8).unwrap();
        let mut oracle: Vec<bool> = Vec::new();
        for (raw_pos, b) in ops {
            let pos = raw_pos as usize % (oracle.len() + 1);
            dbs.insert(pos, b).unwrap();
            oracle.insert(pos, b);
        }
        for i in 0..=oracle.len() {
            if dbs.rank0(i) + dbs.rank1(i) != i {
                return TestResult::failed();
            }
        }
        TestResult::from_bool(dbs.to_values() == oracle)
    }
}
