//! Dynamic range-reporting tree (component C9): a weight-balanced wavelet
//! tree over a dense permutation, answering axis-aligned rectangle queries
//! over (x-rank, y-rank) points. Grounded in
//! `original_source/include/range_search/dynamic_wavelet_tree_on_grid.hpp`
//! (`DynamicWaveletTreeOnGrid`), the C++ implementation this façade is
//! distilled from; the level representation (one `DBS` plus one `DPS` per
//! level, rather than one node struct per wavelet-tree node) follows that
//! source directly.
//!
//! Each level `h` holds `2^h` nodes, numbered left to right. Node `id`'s
//! bits live in `bits[h]` at the contiguous offset `length[h].psum(id-1)`
//! (0 for `id == 0`); `length[h].at(id)` is the node's population. Because
//! every split routes a point right iff its x-rank is at least the left
//! child's population, a node's bit-range offset within `bits[h]` and its
//! x-rank range start coincide — the same quantity serves both roles
//! throughout this module.

use crate::dbs::DynamicBitSequence;
use crate::dps::DynamicPrefixSum;
use crate::error::{Error, Result};
use crate::io;
use crate::memory::MemoryUsage;

/// `U(h, H)`: the population a level-`h` node may reach before a rebuild is
/// forced, for a tree of height `H`. Mirrors
/// `_get_upper_size_of_internal_node` bit for bit: `2^(H-h-1)`, halved once
/// it exceeds 4.
fn upper_size(h: usize, height: usize) -> u64 {
    let mut u1: u64 = 1;
    let mut p = h + 1;
    while p < height {
        u1 *= 2;
        p += 1;
    }
    if u1 > 4 {
        u1 / 2
    } else {
        u1
    }
}

fn lower_size(h: usize, height: usize) -> u64 {
    upper_size(h, height) / 4
}

/// Smallest `H` with `upper_size(0, H) > n`.
fn min_height(n: usize) -> usize {
    let mut height = 0usize;
    loop {
        if (n as u64) < upper_size(0, height) {
            return height;
        }
        height += 1;
    }
}

/// `DRR`: stores a permutation `R[0..n-1]`, `R[y]` the x-rank of the point
/// with y-rank `y`, supporting point insert/remove and rectangle reports in
/// roughly `O(log^2 n)`.
#[derive(Debug, Clone)]
pub struct DynamicRangeReportingTree {
    bits: Vec<DynamicBitSequence>,
    length: Vec<DynamicPrefixSum>,
    d_max: usize,
    l_max: usize,
    height: usize,
}

impl DynamicRangeReportingTree {
    pub fn new(d_max: usize, l_max: usize) -> Result<Self> {
        Ok(DynamicRangeReportingTree {
            bits: Vec::new(),
            length: Vec::new(),
            d_max,
            l_max,
            height: 0,
        })
    }

    /// Build from `r`, a permutation of `0..r.len()` indexed by y-rank
    /// (`build(R)`): pick the minimal height, then split top-down, a bit
    /// per point recording which half it lands in.
    pub fn build(d_max: usize, l_max: usize, r: &[usize]) -> Result<Self> {
        let n = r.len();
        for &v in r {
            if v >= n {
                return Err(Error::Config("range-reporting permutation entry out of range"));
            }
        }
        let height = min_height(n);
        let mut bits = Vec::with_capacity(height);
        let mut length = Vec::with_capacity(height);

        if height > 0 {
            let mut current = r.to_vec();
            let mut sizes_this_level = vec![n as u64];
            for h in 0..height {
                let node_count = 1usize << h;
                let has_next = h + 1 < height;
                let mut level_bits = vec![false; current.len()];
                let mut next_current = Vec::with_capacity(current.len());
                let mut sizes_next = Vec::with_capacity(node_count * 2);
                let mut pos = 0usize;
                for i in 0..node_count {
                    let bit_size = sizes_this_level[i] as usize;
                    let half = bit_size / 2;
                    let group = &current[pos..pos + bit_size];
                    if has_next {
                        let mut left_count = 0u64;
                        for &v in group {
                            if v < half {
                                next_current.push(v);
                                left_count += 1;
                            }
                        }
                        let mut right_count = 0u64;
                        for (j, &v) in group.iter().enumerate() {
                            if v >= half {
                                level_bits[pos + j] = true;
                                next_current.push(v - half);
                                right_count += 1;
                            }
                        }
                        sizes_next.push(left_count);
                        sizes_next.push(right_count);
                    } else {
                        debug_assert!(bit_size <= 1, "range-reporting leaf node holds more than one point");
                    }
                    pos += bit_size;
                }
                bits.push(DynamicBitSequence::build(d_max, l_max, &level_bits)?);
                length.push(DynamicPrefixSum::build(d_max, l_max, &sizes_this_level)?);
                current = next_current;
                sizes_this_level = sizes_next;
            }
        }

        Ok(DynamicRangeReportingTree {
            bits,
            length,
            d_max,
            l_max,
            height,
        })
    }

    pub fn size(&self) -> usize {
        if self.height > 0 {
            self.bits[0].size()
        } else {
            0
        }
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn size_in_bytes(&self) -> usize {
        8 + self
            .bits
            .iter()
            .zip(self.length.iter())
            .map(|(b, l)| b.size_in_bytes() + l.size_in_bytes())
            .sum::<usize>()
    }

    pub fn get_memory_usage_info(&self, _paragraph: &str) -> MemoryUsage {
        let bytes = self.size_in_bytes();
        MemoryUsage::new(bytes, vec![("levels", bytes - 8)])
    }

    fn node_x_pos(&self, h: usize, node_id: usize) -> usize {
        if node_id == 0 {
            0
        } else {
            self.length[h].psum(node_id - 1).expect("node id within level bounds") as usize
        }
    }

    fn node_size(&self, h: usize, node_id: usize) -> usize {
        self.length[h].at(node_id).expect("node id within level bounds") as usize
    }

    /// Count of zeros in the node-local range `[0, i]` (inclusive).
    fn rank0_in_node(&self, h: usize, node_x_pos: usize, i: usize) -> usize {
        self.bits[h].rank0(node_x_pos + i + 1) - self.bits[h].rank0(node_x_pos)
    }

    /// Count of ones in the node-local range `[0, i]` (inclusive).
    fn rank1_in_node(&self, h: usize, node_x_pos: usize, i: usize) -> usize {
        self.bits[h].rank1(node_x_pos + i + 1) - self.bits[h].rank1(node_x_pos)
    }

    fn recursive_add(&mut self, h: usize, node_id: usize, x_rank: usize, y_rank: usize, path: &mut [usize]) {
        path[h] = node_id;
        let node_size = self.node_size(h, node_id);
        let node_x_pos = self.node_x_pos(h, node_id);

        if h + 1 < self.height {
            let left_id = 2 * node_id;
            let right_id = left_id + 1;
            let left_size = self.node_size(h + 1, left_id);

            if x_rank <= left_size {
                let new_y = if y_rank > 0 { self.rank0_in_node(h, node_x_pos, y_rank - 1) } else { 0 };
                self.recursive_add(h + 1, left_id, x_rank, new_y, path);
                self.bits[h].insert(node_x_pos + y_rank, false).expect("y_rank within node bounds");
                self.length[h].increment(node_id, 1).expect("node id within level bounds");
            } else {
                let new_y = if y_rank > 0 { self.rank1_in_node(h, node_x_pos, y_rank - 1) } else { 0 };
                let new_x = x_rank - left_size;
                self.recursive_add(h + 1, right_id, new_x, new_y, path);
                self.bits[h].insert(node_x_pos + y_rank, true).expect("y_rank within node bounds");
                self.length[h].increment(node_id, 1).expect("node id within level bounds");
            }
        } else {
            debug_assert!(node_size <= 1, "range-reporting leaf node holds more than one point before insertion");
            if node_size == 0 {
                self.bits[h].insert(node_x_pos + y_rank, false).expect("y_rank within node bounds");
            } else {
                if x_rank == 0 {
                    self.bits[h].set_bit(node_x_pos, true).expect("node_x_pos within bounds");
                    self.bits[h].insert(node_x_pos + y_rank, false).expect("y_rank within node bounds");
                } else {
                    self.bits[h].insert(node_x_pos + y_rank, true).expect("y_rank within node bounds");
                }
            }
            self.length[h].increment(node_id, 1).expect("node id within level bounds");
        }
    }

    fn is_unbalanced_node(&self, h: usize, node_id: usize) -> bool {
        if h + 1 < self.height {
            let left = self.node_size(h + 1, 2 * node_id) as u64;
            let right = self.node_size(h + 1, 2 * node_id + 1) as u64;
            let unbalanced = left > right * 2 || right > left * 2;
            let child_upper = upper_size(h + 1, self.height);
            unbalanced || left >= child_upper || right >= child_upper
        } else {
            self.node_size(h, node_id) >= 2
        }
    }

    /// Rank-array of the subtree rooted at `(h, node_id)`, in y-order,
    /// relative to the subtree's own x-range (`to_local_rank_elements_in_y_order`).
    fn local_rank_elements(&self, h: usize, node_id: usize) -> Vec<usize> {
        let node_size = self.node_size(h, node_id);
        let x_pos = self.node_x_pos(h, node_id);
        if h + 1 < self.height {
            let left_id = 2 * node_id;
            let right_id = left_id + 1;
            let left_size = self.node_size(h + 1, left_id);
            let left_elems = self.local_rank_elements(h + 1, left_id);
            let right_elems = self.local_rank_elements(h + 1, right_id);
            let mut out = Vec::with_capacity(node_size);
            let mut li = 0usize;
            let mut ri = 0usize;
            for i in 0..node_size {
                let b = self.bits[h].at(x_pos + i).expect("position within node bounds");
                if b {
                    out.push(right_elems[ri] + left_size);
                    ri += 1;
                } else {
                    out.push(left_elems[li]);
                    li += 1;
                }
            }
            out
        } else if node_size == 0 {
            Vec::new()
        } else if node_size == 1 {
            vec![0]
        } else {
            (0..node_size)
                .map(|i| self.bits[h].at(x_pos + i).expect("position within node bounds") as usize)
                .collect()
        }
    }

    /// Rebuild the subtree rooted at `(h, node_id)` from its own elements,
    /// splitting each node's current population in half rather than
    /// reconstructing the whole tree (`rebuild_internal_node`).
    fn rebuild_internal_node(&mut self, h: usize, node_id: usize) -> Result<()> {
        let mut rank_elements = self.local_rank_elements(h, node_id);
        let mut current_node_id = node_id;
        let mut current_node_count = 1usize;

        for q in h..self.height {
            let first_x_pos = self.node_x_pos(q, current_node_id);
            let has_next = q + 1 < self.height;
            let mut level_bits = vec![false; rank_elements.len()];
            let mut next_rank_elements = Vec::with_capacity(rank_elements.len());
            let mut next_sizes = Vec::with_capacity(current_node_count * 2);
            let mut pos = 0usize;

            for local_i in 0..current_node_count {
                let id = current_node_id + local_i;
                let bit_size = self.node_size(q, id);
                let half = bit_size / 2;
                let group = &rank_elements[pos..pos + bit_size];
                if has_next {
                    let mut left_count = 0u64;
                    for &v in group {
                        if v < half {
                            next_rank_elements.push(v);
                            left_count += 1;
                        }
                    }
                    let mut right_count = 0u64;
                    for (j, &v) in group.iter().enumerate() {
                        if v >= half {
                            level_bits[pos + j] = true;
                            next_rank_elements.push(v - half);
                            right_count += 1;
                        }
                    }
                    next_sizes.push(left_count);
                    next_sizes.push(right_count);
                } else {
                    debug_assert!(bit_size <= 1, "range-reporting leaf node holds more than one point after rebuild");
                }
                pos += bit_size;
            }

            self.bits[q].set_bits(first_x_pos, &level_bits)?;
            rank_elements = next_rank_elements;
            current_node_count *= 2;
            current_node_id *= 2;
            if has_next {
                self.length[q + 1].set_values(current_node_id, &next_sizes)?;
            }
        }
        Ok(())
    }

    /// In y-order, the x-rank of every point currently stored
    /// (`to_rank_elements_in_y_order`), used to feed a whole-tree rebuild.
    fn to_rank_elements_in_y_order(&self) -> Vec<usize> {
        if self.height > 0 {
            self.local_rank_elements(0, 0)
        } else {
            Vec::new()
        }
    }

    /// Insert the point `(x_rank, y_rank)`: `x_rank` must be in
    /// `0..=size()` and `y_rank` in `0..=size()`, since inserting shifts
    /// every x-rank/y-rank at or past the insertion point up by one.
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn add(&mut self, x_rank: usize, y_rank: usize) -> Result<()> {
        let size = self.size();
        if x_rank > size || y_rank > size {
            return Err(Error::OutOfRange { index: x_rank.max(y_rank), size });
        }
        if size == 0 {
            *self = Self::build(self.d_max, self.l_max, &[0])?;
            return Ok(());
        }

        let mut path = vec![usize::MAX; self.height];
        self.recursive_add(0, 0, x_rank, y_rank, &mut path);

        let upper = upper_size(0, self.height);
        if self.size() as u64 >= upper {
            let elems = self.to_rank_elements_in_y_order();
            *self = Self::build(self.d_max, self.l_max, &elems)?;
        } else {
            for h in 0..self.height {
                let id = path[h];
                if self.is_unbalanced_node(h, id) {
                    self.rebuild_internal_node(h, id)?;
                    break;
                }
            }
        }
        Ok(())
    }

    /// Remove the point with y-rank `y_rank`, returning its x-rank.
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn remove(&mut self, y_rank: usize) -> Result<usize> {
        let size = self.size();
        if y_rank >= size {
            return Err(Error::OutOfRange { index: y_rank, size });
        }

        let mut h_y = y_rank;
        let mut node_id = 0usize;
        for h in 0..self.height {
            let pos = self.node_x_pos(h, node_id);
            let b = self.bits[h].at(pos + h_y)?;
            let next_id = 2 * node_id + b as usize;
            let removed = if b {
                self.rank0_in_node(h, pos, h_y)
            } else {
                self.rank1_in_node(h, pos, h_y)
            };
            self.bits[h].remove(pos + h_y)?;
            self.length[h].decrement(node_id, 1)?;
            h_y -= removed;
            node_id = next_id;
        }
        let x_rank = node_id;

        let upper = upper_size(0, self.height);
        if (self.size() as u64) < upper / 2 {
            let elems = self.to_rank_elements_in_y_order();
            *self = Self::build(self.d_max, self.l_max, &elems)?;
        }
        Ok(x_rank)
    }

    /// `compute_local_x_rank`: the x-rank, relative to the subtree rooted
    /// at `(node_y, node_id)`, of the point whose y-rank within that
    /// subtree is `local_y_rank`.
    fn compute_local_x_rank(&self, node_y: usize, node_id: usize, mut local_y_rank: usize) -> usize {
        let mut x_rank = 0usize;
        let mut h_node_id = node_id;
        let mut h = node_y;
        while h + 1 < self.height {
            let node_x_pos = self.node_x_pos(h, h_node_id);
            let b = self.bits[h].at(node_x_pos + local_y_rank).expect("position within node bounds");
            let next_node_id = 2 * h_node_id + b as usize;
            if b {
                x_rank += self.node_size(h + 1, 2 * h_node_id);
                local_y_rank -= self.rank0_in_node(h, node_x_pos, local_y_rank);
            } else {
                local_y_rank -= self.rank1_in_node(h, node_x_pos, local_y_rank);
            }
            h_node_id = next_node_id;
            h += 1;
        }
        x_rank
    }

    /// The x-rank of the point with y-rank `y_rank`.
    pub fn access_x_rank(&self, y_rank: usize) -> Result<usize> {
        let size = self.size();
        if y_rank >= size {
            return Err(Error::OutOfRange { index: y_rank, size });
        }
        Ok(self.compute_local_x_rank(0, 0, y_rank))
    }

    fn find_leaf_index(&self, x_rank: usize) -> usize {
        let mut current_x = x_rank;
        let mut node_id = 0usize;
        for h in 0..self.height.saturating_sub(1) {
            let left_size = self.node_size(h + 1, 2 * node_id);
            if current_x < left_size {
                node_id = 2 * node_id;
            } else {
                current_x -= left_size;
                node_id = 2 * node_id + 1;
            }
        }
        node_id
    }

    /// The y-rank of the point with x-rank `x_rank`: a forward descent to
    /// the point's leaf followed by a bottom-up climb using `select0`/
    /// `select1` to recover the y-rank one level up at each step.
    pub fn access_y_rank(&self, x_rank: usize) -> Result<usize> {
        let size = self.size();
        if x_rank >= size {
            return Err(Error::OutOfRange { index: x_rank, size });
        }
        let mut prev_node_id = self.find_leaf_index(x_rank);
        let mut current_y = 0usize;
        for h in (0..self.height - 1).rev() {
            let next_node_id = prev_node_id / 2;
            let next_x_pos = self.node_x_pos(h, next_node_id);
            if prev_node_id % 2 == 0 {
                let zero_offset = self.bits[h].rank0(next_x_pos);
                let sel = self.bits[h].select0(current_y + zero_offset);
                current_y = sel as usize - next_x_pos;
            } else {
                let one_offset = self.bits[h].rank1(next_x_pos);
                let sel = self.bits[h].select1(current_y + one_offset);
                current_y = sel as usize - next_x_pos;
            }
            prev_node_id = next_node_id;
        }
        Ok(current_y)
    }

    /// List the x-ranks of points in `[x_min, x_max] x [y_min, y_max]`,
    /// in ascending y-rank order, appending them to `out`. Returns the
    /// number of points found.
    pub fn range_report(&self, x_min: usize, x_max: usize, y_min: usize, y_max: usize, out: &mut Vec<usize>) -> usize {
        if self.height == 0 || x_min > x_max || y_min > y_max {
            return 0;
        }
        self.recursive_range_report(0, 0, 0, x_min as i64, x_max as i64, y_min, y_max, out)
    }

    #[allow(clippy::too_many_arguments)]
    fn recursive_range_report(
        &self,
        h: usize,
        node_id: usize,
        node_x_pos: usize,
        x_min: i64,
        x_max: i64,
        hy_min: usize,
        hy_max: usize,
        out: &mut Vec<usize>,
    ) -> usize {
        let node_size = self.node_size(h, node_id);
        if node_size == 0 {
            return 0;
        }
        let mut found = 0usize;

        if x_min <= node_x_pos as i64 && (node_x_pos + node_size - 1) as i64 <= x_max {
            let limit_r = hy_max.min(node_size - 1);
            if hy_min <= limit_r {
                for i in hy_min..=limit_r {
                    out.push(self.compute_local_x_rank(h, node_id, i) + node_x_pos);
                    found += 1;
                }
            }
        } else if h + 1 < self.height {
            let left_size = self.node_size(h + 1, 2 * node_id);
            let node_x_pos_r = node_x_pos + left_size;

            let hy_max_0 = self.rank0_in_node(h, node_x_pos, hy_max) as i64 - 1;
            let hy_max_1 = self.rank1_in_node(h, node_x_pos, hy_max) as i64 - 1;
            let hy_min_0 = if hy_min > 0 { self.rank0_in_node(h, node_x_pos, hy_min - 1) as i64 } else { 0 };
            let hy_min_1 = if hy_min > 0 { self.rank1_in_node(h, node_x_pos, hy_min - 1) as i64 } else { 0 };

            let next_l = 2 * node_id;
            let next_r = next_l + 1;

            if x_min < node_x_pos_r as i64 && hy_min_0 <= hy_max_0 {
                found += self.recursive_range_report(h + 1, next_l, node_x_pos, x_min, x_max, hy_min_0 as usize, hy_max_0 as usize, out);
            }
            if x_max >= node_x_pos_r as i64 && hy_min_1 <= hy_max_1 {
                found += self.recursive_range_report(h + 1, next_r, node_x_pos_r, x_min, x_max, hy_min_1 as usize, hy_max_1 as usize, out);
            }
        }
        found
    }

    pub fn clear(&mut self) {
        self.bits.clear();
        self.length.clear();
        self.height = 0;
    }

    pub fn swap(&mut self, other: &mut Self) {
        std::mem::swap(&mut self.bits, &mut other.bits);
        std::mem::swap(&mut self.length, &mut other.length);
        std::mem::swap(&mut self.height, &mut other.height);
    }

    pub fn verify(&self) {
        for level in &self.bits {
            level.verify();
        }
        for level in &self.length {
            level.verify();
        }
        for h in 0..self.height.saturating_sub(1) {
            let node_count = 1usize << h;
            for id in 0..node_count {
                let left = self.node_size(h + 1, 2 * id);
                let right = self.node_size(h + 1, 2 * id + 1);
                debug_assert_eq!(left + right, self.node_size(h, id), "child sizes must sum to parent size");
            }
        }
        if self.height > 0 {
            for id in 0..(1usize << (self.height - 1)) {
                debug_assert!(self.node_size(self.height - 1, id) <= 1, "bottom-level node holds more than one point");
            }
        }
    }

    pub fn store_to_bytes(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&(self.height as u64).to_le_bytes());
        for (bits, length) in self.bits.iter().zip(self.length.iter()) {
            bits.store_to_bytes(buf);
            length.store_to_bytes(buf);
        }
    }

    pub fn load_from_bytes(buf: &[u8], pos: &mut usize, d_max: usize, l_max: usize) -> Result<Self> {
        let height = crate::bptree::leaf::ds64::read_u64(buf, pos) as usize;
        let mut bits = Vec::with_capacity(height);
        let mut length = Vec::with_capacity(height);
        for _ in 0..height {
            bits.push(DynamicBitSequence::load_from_bytes(buf, pos)?);
            length.push(DynamicPrefixSum::load_from_bytes(buf, pos)?);
        }
        Ok(DynamicRangeReportingTree { bits, length, d_max, l_max, height })
    }

    pub fn store_to_file(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let mut buf = Vec::new();
        self.store_to_bytes(&mut buf);
        io::write_bytes(path, &buf)
    }

    pub fn load_from_file(path: impl AsRef<std::path::Path>, d_max: usize, l_max: usize) -> Result<Self> {
        let bytes = io::read_bytes(path)?;
        let mut pos = 0;
        Self::load_from_bytes(&bytes, &mut pos, d_max, l_max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points_in_y_order(r: &[usize]) -> Vec<(usize, usize)> {
        r.iter().enumerate().map(|(y, &x)| (x, y)).collect()
    }

    #[test]
    fn build_then_access_round_trips() {
        let r = vec![4, 1, 6, 3, 0, 5, 2, 7];
        let t = DynamicRangeReportingTree::build(4, 8, &r).unwrap();
        assert_eq!(t.size(), 8);
        for (x, y) in points_in_y_order(&r) {
            assert_eq!(t.access_x_rank(y).unwrap(), x);
            assert_eq!(t.access_y_rank(x).unwrap(), y);
        }
    }

    #[test]
    fn range_report_matches_literal_scenario() {
        let r = vec![4, 1, 6, 3, 0, 5, 2, 7];
        let t = DynamicRangeReportingTree::build(4, 8, &r).unwrap();

        let mut out = Vec::new();
        t.range_report(5, 7, 1, 3, &mut out);
        assert_eq!(out, vec![6]);

        let mut out = Vec::new();
        t.range_report(0, 3, 0, 7, &mut out);
        assert_eq!(out, vec![1, 3, 0, 2]);

        let mut out = Vec::new();
        let count = t.range_report(0, 7, 0, 7, &mut out);
        assert_eq!(count, 8);
        let mut sorted = out.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..8).collect::<Vec<_>>());
    }

    #[test]
    fn add_then_remove_round_trips_permutation() {
        let mut t = DynamicRangeReportingTree::new(4, 8).unwrap();
        let points = [(0, 0), (1, 0), (1, 1), (0, 1), (2, 2)];
        for &(x, y) in &points {
            t.add(x, y).unwrap();
            t.verify();
        }
        assert_eq!(t.size(), 5);

        for y in 0..t.size() {
            let x = t.access_x_rank(y).unwrap();
            assert_eq!(t.access_y_rank(x).unwrap(), y);
        }

        let removed_x = t.remove(0).unwrap();
        t.verify();
        assert_eq!(t.size(), 4);
        assert!(removed_x < 5);
    }

    #[test]
    fn store_and_load_round_trips() {
        let r = vec![3, 1, 0, 2];
        let t = DynamicRangeReportingTree::build(4, 8, &r).unwrap();
        let mut buf = Vec::new();
        t.store_to_bytes(&mut buf);

        let mut pos = 0;
        let loaded = DynamicRangeReportingTree::load_from_bytes(&buf, &mut pos, 4, 8).unwrap();
        assert_eq!(loaded.size(), t.size());
        for y in 0..t.size() {
            assert_eq!(loaded.access_x_rank(y).unwrap(), t.access_x_rank(y).unwrap());
        }
    }

    #[test]
    fn empty_tree_has_zero_size() {
        let t = DynamicRangeReportingTree::new(4, 8).unwrap();
        assert_eq!(t.size(), 0);
        assert!(t.is_empty());
        assert_eq!(t.height(), 0);
    }
}
