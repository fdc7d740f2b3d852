//! The shared B+ tree engine (spec.md §4.3): owns the leaf arena, the
//! internal-node pool, rebalancing, path discovery, bulk build and
//! serialisation. Every façade (`DynamicPrefixSum`, `DynamicBitSequence`,
//! `DynamicSequence64`, `DynamicWaveletTree`, `DynamicPermutation`,
//! `DynamicRangeReportingTree`) is a thin wrapper around one or two
//! instances of [`BpTree`].
//!
//! Generalises the teacher's binary, AVL-balanced `DynamicBitVector`
//! (`src/dynamic_vector/mod.rs`) to an arbitrary-degree B+ tree: the same
//! arena-plus-index discipline, the same "retrace aggregates up the path"
//! idea, but splitting/merging by `D_max`/`L_max` thresholds rather than by
//! AVL rotations.

pub mod arena;
pub mod build;
pub mod insert;
pub mod leaf;
pub mod node;
pub mod query;
pub mod remove;
pub mod serialize;

#[cfg(test)]
mod tests;

use arena::{Arena, Id};
use leaf::LeafContainer;
use node::InternalNode;

use crate::error::{Error, Result};

/// Tuning parameters for one tree instance (spec.md §3, §4.3.3).
#[derive(Debug, Clone, Copy)]
pub struct BpConfig {
    /// Maximum children of a non-root internal node.
    pub d_max: usize,
    /// Maximum values in a non-root leaf.
    pub l_max: usize,
    /// When `true`, rebalancing moves as many values as possible to a
    /// sibling instead of the minimal one value (spec.md §4.3.3).
    pub super_left_push_mode: bool,
    /// When `true`, the engine maintains leaf- and node-parent back
    /// references, required by the permutation specialisation (spec.md §3,
    /// §9 "Back-references").
    pub track_parent: bool,
}

impl BpConfig {
    pub fn new(d_max: usize, l_max: usize) -> Result<Self> {
        if d_max < 4 {
            return Err(Error::Config("d_max must be >= 4"));
        }
        if l_max < 4 {
            return Err(Error::Config("l_max must be >= 4"));
        }
        Ok(BpConfig {
            d_max,
            l_max,
            super_left_push_mode: false,
            track_parent: false,
        })
    }

    pub fn with_parent_tracking(mut self) -> Self {
        self.track_parent = true;
        self
    }
}

/// The tree's root handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Root {
    Empty,
    Leaf(Id),
    Internal(Id),
}

/// One step of a root-to-leaf descent: the internal node visited and which
/// child index was taken (spec.md §4.3.1).
#[derive(Debug, Clone, Copy)]
pub struct PathStep {
    pub node: Id,
    pub child_idx: usize,
}

/// A fully-resolved descent, reusable as the engine's "scratch path buffer"
/// (spec.md §4.3.1): `steps` from the root down to (but excluding) the
/// leaf, plus the leaf itself and the local offset within it.
#[derive(Debug, Clone)]
pub struct Path {
    pub steps: Vec<PathStep>,
    pub leaf: Id,
    pub offset: usize,
}

pub struct BpTree<L: LeafContainer> {
    pub config: BpConfig,
    pub has_sum: bool,
    /// How much a single value contributes to the sum deque. Kept as a
    /// plain function pointer rather than a `SumLeaf` trait bound on the
    /// whole engine: the structural machinery (split/merge/rebalance) never
    /// needs to know *how* to decode a leaf's total, only how to weigh one
    /// value at a time, which keeps `BpTree` usable for façades whose leaf
    /// value isn't summable at all (`DS64`, `DynamicPermutation`).
    weight_fn: fn(L::Value) -> u64,
    pub leaves: Arena<L>,
    pub nodes: Arena<InternalNode>,
    pub root: Root,
    pub height: usize,
    /// `leaf_parent[i]` is the internal node that directly owns leaf `i`,
    /// maintained only when `config.track_parent` is set.
    pub leaf_parent: Vec<Id>,
    /// Log of `(value, from_leaf, to_leaf)` for every value physically
    /// relocated between two already-existing leaves during the rebalancing
    /// sweep of the *last* `insert`/`remove` call (cleared at the start of
    /// each). Every façade pays an empty `Vec`'s worth of overhead; only
    /// `DynamicPermutation` drains it, to replay spec.md §4.8's
    /// `update_linked_tree` hook against its partner tree — the permutation
    /// specialisation is the only one whose leaves hold a reference
    /// (`PermItem::pointer`) into a *different* tree's arena that a plain
    /// intra-tree rebalance would otherwise silently invalidate.
    pub(crate) moved: Vec<(L::Value, Id, Id)>,
}

impl<L: LeafContainer> BpTree<L> {
    pub fn new(config: BpConfig, has_sum: bool) -> Self {
        BpTree {
            config,
            has_sum,
            weight_fn: |_| 0,
            leaves: Arena::new(),
            nodes: Arena::with_free_cap(4096),
            root: Root::Empty,
            height: 0,
            leaf_parent: Vec::new(),
            moved: Vec::new(),
        }
    }

    pub fn with_weight_fn(mut self, f: fn(L::Value) -> u64) -> Self {
        self.weight_fn = f;
        self
    }

    /// Sum of `weight_fn` applied to every value currently in `leaf_id`.
    pub(crate) fn leaf_weight(&self, leaf_id: Id) -> u64 {
        let leaf = self.leaves.get(leaf_id);
        (0..leaf.len()).map(|i| (self.weight_fn)(leaf.at(i))).sum()
    }

    pub fn size(&self) -> usize {
        match self.root {
            Root::Empty => 0,
            Root::Leaf(id) => self.leaves.get(id).len(),
            Root::Internal(id) => self.nodes.get(id).total_count() as usize,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    pub fn clear(&mut self) {
        self.leaves.clear();
        self.nodes.clear();
        self.root = Root::Empty;
        self.height = 0;
        self.leaf_parent.clear();
    }

    // -- leaf/node (de)allocation, keeping leaf_parent in sync -----------

    pub(crate) fn alloc_leaf(&mut self, value: L, parent: Id) -> Id {
        let id = self.leaves.alloc(value);
        if self.config.track_parent {
            let idx = id.index();
            if self.leaf_parent.len() <= idx {
                self.leaf_parent.resize(idx + 1, Id::NIL);
            }
            self.leaf_parent[idx] = parent;
        }
        id
    }

    pub(crate) fn set_leaf_parent(&mut self, leaf: Id, parent: Id) {
        if self.config.track_parent {
            let idx = leaf.index();
            if self.leaf_parent.len() <= idx {
                self.leaf_parent.resize(idx + 1, Id::NIL);
            }
            self.leaf_parent[idx] = parent;
        }
    }

    pub(crate) fn alloc_node(&mut self, is_parent_of_leaves: bool) -> Id {
        let mut node = InternalNode::new(self.has_sum);
        node.is_parent_of_leaves = is_parent_of_leaves;
        self.nodes.alloc(node)
    }

    // -- descent (spec.md §4.3.1, §4.3.2) ---------------------------------

    /// Resolve logical position `index` to a leaf + local offset.
    pub fn locate(&self, index: usize) -> Path {
        debug_assert!(index < self.size(), "locate index out of bounds");
        match self.root {
            Root::Empty => panic!("locate on empty tree"),
            Root::Leaf(id) => Path {
                steps: Vec::new(),
                leaf: id,
                offset: index,
            },
            Root::Internal(root_id) => {
                let mut steps = Vec::with_capacity(self.height);
                let mut node_id = root_id;
                let mut remaining = index as u64;
                loop {
                    let node = self.nodes.get(node_id);
                    let child_idx = node.search_on_count_deque(remaining);
                    let preceding = if child_idx == 0 {
                        0
                    } else {
                        node.psum_on_count_deque(child_idx - 1)
                    };
                    remaining -= preceding;
                    steps.push(PathStep {
                        node: node_id,
                        child_idx,
                    });
                    let child = node.get_child(child_idx);
                    if node.is_parent_of_leaves {
                        return Path {
                            steps,
                            leaf: child,
                            offset: remaining as usize,
                        };
                    }
                    node_id = child;
                }
            }
        }
    }

    pub fn at(&self, index: usize) -> L::Value {
        let path = self.locate(index);
        self.leaves.get(path.leaf).at(path.offset)
    }

    /// Like [`Self::locate`], but also accepts `index == size()` (the
    /// insertion point one past the last value), which lands on the final
    /// leaf's one-past-the-end offset. Used only by `insert`.
    pub(crate) fn locate_for_insert(&self, index: usize) -> Path {
        debug_assert!(index <= self.size(), "insert index out of bounds");
        match self.root {
            Root::Empty => panic!("locate_for_insert on empty tree"),
            Root::Leaf(id) => Path {
                steps: Vec::new(),
                leaf: id,
                offset: index,
            },
            Root::Internal(root_id) => {
                let mut steps = Vec::with_capacity(self.height);
                let mut node_id = root_id;
                let mut remaining = index as u64;
                loop {
                    let node = self.nodes.get(node_id);
                    let child_idx = node.search_on_count_deque(remaining);
                    let preceding = if child_idx == 0 {
                        0
                    } else {
                        node.psum_on_count_deque(child_idx - 1)
                    };
                    remaining -= preceding;
                    steps.push(PathStep {
                        node: node_id,
                        child_idx,
                    });
                    let child = node.get_child(child_idx);
                    if node.is_parent_of_leaves {
                        return Path {
                            steps,
                            leaf: child,
                            offset: remaining as usize,
                        };
                    }
                    node_id = child;
                }
            }
        }
    }

    /// Sum of `sum[0..child_idx)` accumulated along `path.steps`, i.e. the
    /// total contribution of everything strictly before the target leaf.
    pub fn preceding_sum(&self, path: &Path) -> u64 {
        debug_assert!(self.has_sum);
        let mut total = 0u64;
        for step in &path.steps {
            let node = self.nodes.get(step.node);
            if step.child_idx > 0 {
                total += node.psum_on_sum_deque(step.child_idx - 1);
            }
        }
        total
    }

    pub fn preceding_count(&self, path: &Path) -> u64 {
        let mut total = 0u64;
        for step in &path.steps {
            let node = self.nodes.get(step.node);
            if step.child_idx > 0 {
                total += node.psum_on_count_deque(step.child_idx - 1);
            }
        }
        total
    }

    /// Inverse of descending to a leaf: given a leaf and a local offset in
    /// it, recover the logical position by climbing `leaf_parent`/`parent`
    /// back-references to the root, summing preceding siblings' counts at
    /// every level. Requires `config.track_parent` (spec.md §4.8's `π(i)`
    /// access walks exactly this path, "computed by summing count[0..idx-1]
    /// along the parent chain of that leaf").
    pub fn position_of(&self, leaf: Id, local_offset: usize) -> usize {
        debug_assert!(self.config.track_parent, "position_of requires parent tracking");
        let mut offset = local_offset as u64;
        let mut child = leaf;
        let mut parent = self.leaf_parent[leaf.index()];
        loop {
            if parent.is_nil() {
                return offset as usize;
            }
            let node = self.nodes.get(parent);
            let idx = node
                .index_of(child)
                .expect("leaf_parent/node.parent out of sync with parent's children");
            if idx > 0 {
                offset += node.psum_on_count_deque(idx - 1);
            }
            child = parent;
            parent = node.parent.unwrap_or(Id::NIL);
        }
    }

    /// Descend by target sum `s` using the sum deque at each level
    /// (spec.md §4.3.2 `search`); returns the resolved path and the leftover
    /// sum to search for inside the leaf.
    pub fn locate_by_sum(&self, s: u64) -> Option<(Path, u64)> {
        match self.root {
            Root::Empty => None,
            Root::Leaf(id) => Some((
                Path {
                    steps: Vec::new(),
                    leaf: id,
                    offset: 0,
                },
                s,
            )),
            Root::Internal(root_id) => {
                let mut steps = Vec::with_capacity(self.height);
                let mut node_id = root_id;
                let mut remaining = s;
                loop {
                    let node = self.nodes.get(node_id);
                    let child_idx = node.search_on_sum_deque(remaining);
                    let preceding = if child_idx == 0 {
                        0
                    } else {
                        node.psum_on_sum_deque(child_idx - 1)
                    };
                    remaining -= preceding;
                    steps.push(PathStep {
                        node: node_id,
                        child_idx,
                    });
                    let child = node.get_child(child_idx);
                    if node.is_parent_of_leaves {
                        return Some((
                            Path {
                                steps,
                                leaf: child,
                                offset: 0,
                            },
                            remaining,
                        ));
                    }
                    node_id = child;
                }
            }
        }
    }

    /// Descend by `count - sum` (spec.md `search0`/`select0` for bit
    /// sequences): used when the complementary (zero-count) aggregate is
    /// the one being searched.
    pub fn locate_by_count_minus_sum(&self, v: u64) -> Option<(Path, u64)> {
        match self.root {
            Root::Empty => None,
            Root::Leaf(id) => Some((
                Path {
                    steps: Vec::new(),
                    leaf: id,
                    offset: 0,
                },
                v,
            )),
            Root::Internal(root_id) => {
                let mut steps = Vec::with_capacity(self.height);
                let mut node_id = root_id;
                let mut remaining = v;
                loop {
                    let node = self.nodes.get(node_id);
                    let sum = node.sum.as_ref().expect("sum deque disabled");
                    let mut acc = 0u64;
                    let mut child_idx = node.count.len() - 1;
                    for (k, (&c, &s)) in node.count.iter().zip(sum.iter()).enumerate() {
                        acc += c - s;
                        if acc > remaining {
                            child_idx = k;
                            break;
                        }
                    }
                    let preceding: u64 = node.count[..child_idx]
                        .iter()
                        .zip(sum[..child_idx].iter())
                        .map(|(&c, &s)| c - s)
                        .sum();
                    remaining -= preceding;
                    steps.push(PathStep {
                        node: node_id,
                        child_idx,
                    });
                    let child = node.get_child(child_idx);
                    if node.is_parent_of_leaves {
                        return Some((
                            Path {
                                steps,
                                leaf: child,
                                offset: 0,
                            },
                            remaining,
                        ));
                    }
                    node_id = child;
                }
            }
        }
    }

    /// Propagate `(d_count, d_sum)` to every node along `path.steps`
    /// (spec.md §4.3.3 "count deltas ... propagated up by a single pass").
    pub fn propagate(&mut self, path: &Path, d_count: i64, d_sum: i64) {
        for step in &path.steps {
            self.nodes.get_mut(step.node).increment(step.child_idx, d_count, d_sum);
        }
    }

    pub fn check_bounds(&self, index: usize) -> Result<()> {
        if index >= self.size() {
            Err(Error::OutOfRange {
                index,
                size: self.size(),
            })
        } else {
            Ok(())
        }
    }

    pub fn byte_size(&self) -> usize {
        16 + self.leaves.byte_size_with(|l| l.byte_size())
            + self.nodes.byte_size_with(|n| n.byte_size())
    }

    /// Recompute every `count` aggregate from scratch and compare against
    /// the stored counters; panics (debug builds only, spec.md §7) on
    /// mismatch. Façades whose leaves carry a sum additionally call
    /// [`crate::bptree::leaf::SumLeaf`]-bounded verification in their own
    /// `verify`.
    pub fn verify_counts(&self) {
        if let Root::Internal(root_id) = self.root {
            self.verify_counts_node(root_id);
        }
    }

    fn verify_counts_node(&self, node_id: Id) -> u64 {
        let node = self.nodes.get(node_id);
        debug_assert!(
            node.degree() >= 2,
            "internal node below minimum degree: {node_id:?}"
        );
        let mut total_count = 0u64;
        for (k, &child) in node.children.iter().enumerate() {
            let c = if node.is_parent_of_leaves {
                self.leaves.get(child).len() as u64
            } else {
                self.verify_counts_node(child)
            };
            debug_assert_eq!(node.count[k], c, "count mismatch at child {k}");
            total_count += c;
        }
        total_count
    }

    /// Same recomputation as [`Self::verify_counts`], additionally checking
    /// the sum deque against each leaf's own total.
    pub fn verify_sums(&self)
    where
        L: leaf::SumLeaf,
    {
        if let Root::Internal(root_id) = self.root {
            self.verify_sums_node(root_id);
        }
    }

    fn verify_sums_node(&self, node_id: Id) -> (u64, u64)
    where
        L: leaf::SumLeaf,
    {
        let node = self.nodes.get(node_id);
        let mut total_count = 0u64;
        let mut total_sum = 0u64;
        for (k, &child) in node.children.iter().enumerate() {
            let (c, s) = if node.is_parent_of_leaves {
                let leaf = self.leaves.get(child);
                (leaf.len() as u64, leaf.total())
            } else {
                self.verify_sums_node(child)
            };
            debug_assert_eq!(node.count[k], c, "count mismatch at child {k}");
            debug_assert_eq!(
                node.sum.as_ref().expect("sum deque disabled")[k],
                s,
                "sum mismatch at child {k}"
            );
            total_count += c;
            total_sum += s;
        }
        (total_count, total_sum)
    }
}
