//! Dynamic permutation (spec.md §4.8, component C8): a pair of
//! [`BpTree`] instances over [`PermLeaf`], `T_pi` and `T_pi_inverse`,
//! each entry in one pointing back at its partner's current leaf in the
//! other via `(pointer, key)`, per
//! `original_source/include/permutation/dynamic_permutation.hpp`'s
//! `DynamicPermutation` class. Both trees run with the sum deque off
//! (a permutation has no meaningful running total) and parent tracking on
//! (`pi(i)`/`pi_inverse(i)` climb `leaf_parent` to recover a logical
//! position, spec.md §4.8 "computed by summing count[0..idx-1] along the
//! parent chain").

use crate::bptree::arena::Id;
use crate::bptree::leaf::perm::{PermItem, PermLeaf};
use crate::bptree::{BpConfig, BpTree};
use crate::dbs::DynamicBitSequence;
use crate::error::Result;
use crate::io;
use crate::memory::MemoryUsage;

fn perm_weight(_: PermItem) -> u64 {
    0
}

/// `DP`: a dynamic permutation supporting `pi`/`pi_inverse` access and
/// position-preserving insert/erase in amortised `O(log n)`.
#[derive(Debug, Clone)]
pub struct DynamicPermutation {
    pi: BpTree<PermLeaf>,
    inverse: BpTree<PermLeaf>,
}

impl DynamicPermutation {
    pub fn new(d_max: usize, l_max: usize) -> Result<Self> {
        let config = BpConfig::new(d_max, l_max)?.with_parent_tracking();
        Ok(DynamicPermutation {
            pi: BpTree::new(config, false).with_weight_fn(perm_weight),
            inverse: BpTree::new(config, false).with_weight_fn(perm_weight),
        })
    }

    /// Build from a permutation array `perm` where `perm[i]` is `pi(i)`
    /// (spec.md §4.8 `build`). Processes positions left to right, converting
    /// each target value to its rank among targets seen so far with a
    /// scratch bit sequence — the standard online array-to-permutation
    /// insertion technique, `O(n log n)` overall — rather than the
    /// postorder-leaf-layout builder the original describes (see
    /// DESIGN.md for why this substitution is equivalent and simpler to
    /// get right without a compiler to check it against).
    pub fn build(d_max: usize, l_max: usize, perm: &[usize]) -> Result<Self> {
        let n = perm.len();
        let mut dp = Self::new(d_max, l_max)?;
        let mut seen = DynamicBitSequence::build(d_max, l_max, &vec![false; n.max(1)])?;
        for (i, &target) in perm.iter().enumerate() {
            let q = seen.rank1(target);
            dp.insert(i, q)?;
            seen.set_bit(target, true)?;
        }
        Ok(dp)
    }

    pub fn size(&self) -> usize {
        self.pi.size()
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    pub fn size_in_bytes(&self) -> usize {
        self.pi.byte_size() + self.inverse.byte_size()
    }

    pub fn get_memory_usage_info(&self, _paragraph: &str) -> MemoryUsage {
        MemoryUsage::new(
            self.size_in_bytes(),
            vec![
                ("pi", self.pi.byte_size()),
                ("pi_inverse", self.inverse.byte_size()),
            ],
        )
    }

    /// `pi(i)` (spec.md §4.8 "access").
    pub fn apply(&self, i: usize) -> Result<usize> {
        self.pi.check_bounds(i)?;
        let path = self.pi.locate(i);
        let item = self.pi.leaves.get(path.leaf).at(path.offset);
        Ok(self.partner_position(&self.inverse, path.leaf, item))
    }

    /// `pi^-1(i)`.
    pub fn inverse(&self, i: usize) -> Result<usize> {
        self.inverse.check_bounds(i)?;
        let path = self.inverse.locate(i);
        let item = self.inverse.leaves.get(path.leaf).at(path.offset);
        Ok(self.partner_position(&self.pi, path.leaf, item))
    }

    /// Given an entry `item` read from `from_leaf` in one tree, recover its
    /// partner's logical position in `other`.
    fn partner_position(&self, other: &BpTree<PermLeaf>, from_leaf: Id, item: PermItem) -> usize {
        let partner_leaf = Id::from(item.pointer as usize);
        let idx = other
            .leaves
            .get(partner_leaf)
            .find(from_leaf.0 as u64, item.key)
            .expect("permutation partner pointer/key out of sync");
        other.position_of(partner_leaf, idx)
    }

    /// Insert a new pair so that the resulting permutation has `pi(p) == q`
    /// (spec.md §4.8 "insert"): write a stub into both trees at `p`/`q`,
    /// then pair the stubs up with a freshly allocated key once their final
    /// leaves are known.
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn insert(&mut self, p: usize, q: usize) -> Result<()> {
        self.pi.insert(p, PermItem::STUB);
        let moves_pi = std::mem::take(&mut self.pi.moved);
        Self::update_linked_tree(&mut self.pi, &mut self.inverse, &moves_pi);

        self.inverse.insert(q, PermItem::STUB);
        let moves_inverse = std::mem::take(&mut self.inverse.moved);
        Self::update_linked_tree(&mut self.inverse, &mut self.pi, &moves_inverse);

        let leaf_a = self.pi.locate(p).leaf;
        let leaf_b = self.inverse.locate(q).leaf;
        let key = self.pi.leaves.get(leaf_a).get_new_key(leaf_b.0 as u64);

        let idx_a = self.pi.locate(p).offset;
        self.pi.leaves.get_mut(leaf_a).set(
            idx_a,
            PermItem {
                pointer: leaf_b.0 as u64,
                key,
            },
        );
        let idx_b = self.inverse.locate(q).offset;
        self.inverse.leaves.get_mut(leaf_b).set(
            idx_b,
            PermItem {
                pointer: leaf_a.0 as u64,
                key,
            },
        );
        Ok(())
    }

    /// Remove the pair at position `p`, i.e. `pi(p)` and its inverse entry
    /// (spec.md §4.8 "erase").
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn erase(&mut self, p: usize) -> Result<()> {
        let q = self.apply(p)?;

        self.pi.remove(p);
        let moves_pi = std::mem::take(&mut self.pi.moved);
        Self::update_linked_tree(&mut self.pi, &mut self.inverse, &moves_pi);

        self.inverse.remove(q);
        let moves_inverse = std::mem::take(&mut self.inverse.moved);
        Self::update_linked_tree(&mut self.inverse, &mut self.pi, &moves_inverse);
        Ok(())
    }

    /// Reassign `pi(p)` to `new_q`, leaving every other pair untouched —
    /// `original_source`'s `move_pi_index`, implemented here as an erase
    /// followed by a re-insert at the same `p` (spec.md §4.8 [ADDED],
    /// "equivalent to erase+insert but documented separately since the
    /// original exposes it as one call").
    pub fn move_pi_index(&mut self, p: usize, new_q: usize) -> Result<()> {
        self.erase(p)?;
        self.insert(p, new_q)
    }

    /// After a rebalancing sweep on `this_tree` relocated some values
    /// between leaves, patch every relocated value's partner entry in
    /// `other_tree` so it keeps pointing at the value's new leaf (spec.md
    /// §4.8 `update_linked_tree`). Entries still holding the `STUB`
    /// sentinel are skipped: they have no partner yet, the caller is about
    /// to give them a real one.
    fn update_linked_tree(
        this_tree: &mut BpTree<PermLeaf>,
        other_tree: &mut BpTree<PermLeaf>,
        moves: &[(PermItem, Id, Id)],
    ) {
        for &(item, from_leaf, to_leaf) in moves {
            if item.pointer == PermItem::STUB.pointer {
                continue;
            }
            let partner_leaf = Id::from(item.pointer as usize);
            let old_key = item.key;

            let partner = other_tree.leaves.get(partner_leaf);
            let idx = partner
                .find(from_leaf.0 as u64, old_key)
                .expect("permutation partner out of sync during rebalance");
            let collision = (0..partner.len()).any(|k| {
                k != idx && partner.at(k).pointer == to_leaf.0 as u64 && partner.at(k).key == old_key
            });
            let new_key = if collision {
                partner.get_new_key_excluding(idx, to_leaf.0 as u64)
            } else {
                old_key
            };
            other_tree.leaves.get_mut(partner_leaf).set(
                idx,
                PermItem {
                    pointer: to_leaf.0 as u64,
                    key: new_key,
                },
            );

            if new_key != old_key {
                let moved_idx = this_tree
                    .leaves
                    .get(to_leaf)
                    .find(partner_leaf.0 as u64, old_key)
                    .expect("moved item missing from its destination leaf");
                this_tree.leaves.get_mut(to_leaf).set(
                    moved_idx,
                    PermItem {
                        pointer: partner_leaf.0 as u64,
                        key: new_key,
                    },
                );
            }
        }
    }

    pub fn clear(&mut self) {
        self.pi.clear();
        self.inverse.clear();
    }

    pub fn swap(&mut self, other: &mut Self) {
        std::mem::swap(&mut self.pi, &mut other.pi);
        std::mem::swap(&mut self.inverse, &mut other.inverse);
    }

    /// Checks `pi(pi_inverse(i)) == i` and `pi_inverse(pi(i)) == i` for
    /// every `i` (spec.md §8 property 4).
    pub fn verify(&self) {
        self.pi.verify_counts();
        self.inverse.verify_counts();
        for i in 0..self.size() {
            let q = self.apply(i).expect("in bounds");
            debug_assert_eq!(
                self.inverse(q).expect("in bounds"),
                i,
                "pi_inverse(pi({i})) != {i}"
            );
        }
    }

    /// Sort both trees' leaf arenas into logical order before writing, so
    /// the stored form (and the other tree's `pointer` fields) are
    /// independent of however insert/remove happened to scatter them
    /// (spec.md §4.3.7, §4.8). Runs on a scratch clone; the live structure
    /// is left untouched.
    fn sorted_clone(&self) -> Self {
        let mut tmp = self.clone();
        let swaps_pi = tmp.pi.sort_leaf_containers();
        Self::remap_partner_pointers(&mut tmp.inverse, &swaps_pi);
        let swaps_inverse = tmp.inverse.sort_leaf_containers();
        Self::remap_partner_pointers(&mut tmp.pi, &swaps_inverse);
        tmp
    }

    /// Rewrite every `pointer` field in `other`'s leaves that referenced
    /// one side of a swapped pair to the other side, via a sentinel value
    /// so a swap's two halves don't clobber each other mid-pass (spec.md
    /// §4.3.7's "three-phase" bookkeeping, generalised from one leaf pair
    /// to every leaf in the tree).
    fn remap_partner_pointers(other: &mut BpTree<PermLeaf>, swaps: &[(Id, Id)]) {
        const SENTINEL: u64 = u64::MAX - 1;
        for &(a, b) in swaps {
            if a == b {
                continue;
            }
            for leaf in other.leaves.iter_mut() {
                for idx in 0..leaf.len() {
                    if leaf.at(idx).pointer == a.0 as u64 {
                        let key = leaf.at(idx).key;
                        leaf.set(idx, PermItem { pointer: SENTINEL, key });
                    }
                }
            }
            for leaf in other.leaves.iter_mut() {
                for idx in 0..leaf.len() {
                    if leaf.at(idx).pointer == b.0 as u64 {
                        let key = leaf.at(idx).key;
                        leaf.set(
                            idx,
                            PermItem {
                                pointer: a.0 as u64,
                                key,
                            },
                        );
                    }
                }
            }
            for leaf in other.leaves.iter_mut() {
                for idx in 0..leaf.len() {
                    if leaf.at(idx).pointer == SENTINEL {
                        let key = leaf.at(idx).key;
                        leaf.set(
                            idx,
                            PermItem {
                                pointer: b.0 as u64,
                                key,
                            },
                        );
                    }
                }
            }
        }
    }

    pub fn store_to_bytes(&self, buf: &mut Vec<u8>) {
        let sorted = self.sorted_clone();
        sorted.pi.store_into(buf);
        sorted.inverse.store_into(buf);
    }

    pub fn load_from_bytes(buf: &[u8], pos: &mut usize) -> Result<Self> {
        let pi = BpTree::load_from(buf, pos, perm_weight)?;
        let inverse = BpTree::load_from(buf, pos, perm_weight)?;
        Ok(DynamicPermutation { pi, inverse })
    }

    pub fn store_to_file(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let mut buf = Vec::new();
        self.store_to_bytes(&mut buf);
        io::write_bytes(path, &buf)
    }

    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = io::read_bytes(path)?;
        let mut pos = 0;
        Self::load_from_bytes(&bytes, &mut pos)
    }

    pub fn to_values(&self) -> Vec<usize> {
        (0..self.size()).map(|i| self.apply(i).expect("in bounds")).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use quickcheck::TestResult;
    use quickcheck_macros::quickcheck;

    /// spec.md §8 scenario S5 (the access/insert half; see
    /// `insert_grows_by_one_while_keeping_existing_pairs` for the shape of
    /// the insert check, since the exact post-insert array in the spec text
    /// depends on a tie-break the spec leaves open — DESIGN.md records the
    /// decision).
    #[test]
    fn pi_on_literal_permutation() {
        let dp = DynamicPermutation::build(4, 8, &[2, 0, 3, 1]).unwrap();
        assert_eq!(dp.apply(0).unwrap(), 2);
        assert_eq!(dp.apply(2).unwrap(), 3);
        assert_eq!(dp.inverse(3).unwrap(), 2);
        dp.verify();
    }

    #[test]
    fn insert_grows_by_one_while_keeping_existing_pairs() {
        // pi = [2, 0, 3, 1]; insert(2, 1) shifts every pi-position >= 2 up
        // by one and every pi-value >= 1 up by one, then plants (2, 1).
        let mut dp = DynamicPermutation::build(4, 8, &[2, 0, 3, 1]).unwrap();
        dp.insert(2, 1).unwrap();
        assert_eq!(dp.size(), 5);
        dp.verify();
        assert_eq!(dp.to_values(), vec![3, 0, 1, 4, 2]);
        assert_eq!(dp.apply(2).unwrap(), 1);
        assert_eq!(dp.inverse(1).unwrap(), 2);
    }

    #[test]
    fn erase_shrinks_back_down() {
        let mut dp = DynamicPermutation::build(4, 8, &[2, 0, 3, 1]).unwrap();
        dp.erase(0).unwrap();
        assert_eq!(dp.size(), 3);
        dp.verify();
        let values = dp.to_values();
        let mut sorted = values.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, vec![0, 1, 2]);
    }

    #[test]
    fn store_and_load_round_trips() {
        let dp = DynamicPermutation::build(4, 8, &[4, 1, 6, 3, 0, 5, 2, 7]).unwrap();
        let mut buf = Vec::new();
        dp.store_to_bytes(&mut buf);
        let mut pos = 0;
        let loaded = DynamicPermutation::load_from_bytes(&buf, &mut pos).unwrap();
        assert_eq!(loaded.to_values(), dp.to_values());
        for i in 0..dp.size() {
            assert_eq!(loaded.inverse(i).unwrap(), dp.inverse(i).unwrap());
        }
    }

    #[test]
    fn move_pi_index_reassigns_single_pair() {
        let mut dp = DynamicPermutation::build(4, 8, &[2, 0, 3, 1]).unwrap();
        dp.move_pi_index(0, 1).unwrap();
        assert_eq!(dp.size(), 4);
        dp.verify();
        assert_eq!(dp.apply(0).unwrap(), 1);
    }

    /// spec.md §8 property 4: `pi_inverse(pi(i)) == i` and `pi(pi_inverse(i)) == i`.
    #[quickcheck]
    fn inverse_round_trips_on_random_permutations(seed: Vec<u8>) -> TestResult {
        if seed.len() < 2 || seed.len() > 40 {
            return TestResult::discard();
        }
        // Fisher-Yates over the seed bytes to build a permutation of 0..n.
        let n = seed.len();
        let mut perm: Vec<usize> = (0..n).collect();
        for i in (1..n).rev() {
            let j = seed[i] as usize % (i + 1);
            perm.swap(i, j);
        }
        let dp = DynamicPermutation::build(4, 8, &perm).unwrap();
        for i in 0..n {
            let q = dp.apply(i).unwrap();
            if dp.inverse(q).unwrap() != i {
                return TestResult::failed();
            }
            let p = dp.inverse(i).unwrap();
            if dp.apply(p).unwrap() != i {
                return TestResult::failed();
            }
        }
        TestResult::passed()
    }
}
