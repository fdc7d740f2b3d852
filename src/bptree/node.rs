//! Internal node (spec.md §4.2): a fixed-capacity children array plus two
//! parallel aggregate arrays (`count`, `sum`). The aggregate arrays are kept
//! as plain `Vec<u64>` rather than a nested tree — the spec explicitly says
//! they "do not themselves need to be a tree" — mirroring the teacher's own
//! choice of a flat `Vec<Node>` over anything fancier (`src/dynamic_vector/mod.rs`).

use super::arena::Id;

/// Ordered children of an internal node, together with per-child count/sum
/// aggregates. `children[k]` is a leaf-arena `Id` when `is_parent_of_leaves`
/// is set, otherwise an internal-node-pool `Id`.
#[derive(Debug, Clone, Default)]
pub struct InternalNode {
    pub children: Vec<Id>,
    pub count: Vec<u64>,
    /// `None` for façades that disable the sum deque (`DS64`, `DynamicPermutation`).
    pub sum: Option<Vec<u64>>,
    pub is_parent_of_leaves: bool,
    /// Back-reference used only by the permutation specialisation
    /// (spec.md §3, §9 "Back-references").
    pub parent: Option<Id>,
}

impl InternalNode {
    pub fn new(has_sum: bool) -> Self {
        InternalNode {
            children: Vec::new(),
            count: Vec::new(),
            sum: if has_sum { Some(Vec::new()) } else { None },
            is_parent_of_leaves: false,
            parent: None,
        }
    }

    pub fn degree(&self) -> usize {
        self.children.len()
    }

    pub fn get_child(&self, i: usize) -> Id {
        self.children[i]
    }

    pub fn index_of(&self, child: Id) -> Option<usize> {
        self.children.iter().position(|&c| c == child)
    }

    pub fn append_child(&mut self, child: Id, count: u64, sum: u64) {
        self.children.push(child);
        self.count.push(count);
        if let Some(s) = self.sum.as_mut() {
            s.push(sum);
        }
    }

    pub fn insert_child(&mut self, pos: usize, child: Id, count: u64, sum: u64) {
        self.children.insert(pos, child);
        self.count.insert(pos, count);
        if let Some(s) = self.sum.as_mut() {
            s.insert(pos, sum);
        }
    }

    pub fn remove_child(&mut self, pos: usize) -> Id {
        self.count.remove(pos);
        if let Some(s) = self.sum.as_mut() {
            s.remove(pos);
        }
        self.children.remove(pos)
    }

    pub fn increment(&mut self, child_idx: usize, d_count: i64, d_sum: i64) {
        self.count[child_idx] = (self.count[child_idx] as i64 + d_count) as u64;
        if let Some(s) = self.sum.as_mut() {
            s[child_idx] = (s[child_idx] as i64 + d_sum) as u64;
        }
    }

    pub fn total_count(&self) -> u64 {
        self.count.iter().sum()
    }

    pub fn total_sum(&self) -> u64 {
        self.sum.as_ref().map(|s| s.iter().sum()).unwrap_or(0)
    }

    /// Sum of `count[0..=i]`.
    pub fn psum_on_count_deque(&self, i: usize) -> u64 {
        self.count[..=i].iter().sum()
    }

    pub fn psum_on_sum_deque(&self, i: usize) -> u64 {
        self.sum
            .as_ref()
            .map(|s| s[..=i].iter().sum())
            .unwrap_or(0)
    }

    /// Smallest child index `k` such that the count-prefix up to and
    /// including `k` exceeds `v`; used during descent by position.
    pub fn search_on_count_deque(&self, v: u64) -> usize {
        let mut acc = 0u64;
        for (k, &c) in self.count.iter().enumerate() {
            acc += c;
            if acc > v {
                return k;
            }
        }
        self.count.len() - 1
    }

    /// Smallest child index `k` such that the sum-prefix up to and including
    /// `k` reaches `v` (used by `search`/`select1` descent).
    pub fn search_on_sum_deque(&self, v: u64) -> usize {
        let sum = self.sum.as_ref().expect("sum deque disabled");
        let mut acc = 0u64;
        for (k, &s) in sum.iter().enumerate() {
            acc += s;
            if acc >= v {
                return k;
            }
        }
        sum.len() - 1
    }

    pub fn byte_size(&self) -> usize {
        std::mem::size_of::<Id>() * self.children.len()
            + 8 * self.count.len()
            + self.sum.as_ref().map(|s| 8 * s.len()).unwrap_or(0)
            + 2
    }
}
