//! Bulk construction from a flat value sequence, and the postorder
//! defragmentation pass that re-packs the leaf arena into left-to-right
//! logical order.
//!
//! Bulk build chunks the input into leaves first (bottom level), then
//! repeatedly chunks the previous level's node ids into parents until a
//! single root remains — the usual level-by-level packing used to avoid
//! inserting one value at a time when the whole sequence is known up front.

use super::arena::Id;
use super::leaf::LeafContainer;
use super::node::InternalNode;
use super::{BpConfig, BpTree, Root};

impl<L: LeafContainer> BpTree<L> {
    /// Build a tree from `values` in one pass, skipping the split machinery
    /// that single-value `insert` relies on.
    pub fn build(config: BpConfig, has_sum: bool, weight_fn: fn(L::Value) -> u64, values: &[L::Value]) -> Self {
        let mut tree = BpTree::new(config, has_sum).with_weight_fn(weight_fn);
        if values.is_empty() {
            return tree;
        }

        let l_max = tree.config.l_max;
        let sizes = Self::chunk_sizes(values.len(), l_max);
        let mut leaf_ids = Vec::with_capacity(sizes.len());
        let mut offset = 0;
        for size in sizes {
            let mut leaf = L::default();
            leaf.push_many_back(&values[offset..offset + size]);
            leaf_ids.push(tree.alloc_leaf(leaf, Id::NIL));
            offset += size;
        }

        tree.assemble_from_leaves(leaf_ids);
        tree
    }

    /// Stack already-allocated, already-ordered leaves into internal-node
    /// levels until a single root remains. Shared by [`Self::build`] and
    /// `serialize::load`, which both start from a flat leaf sequence but get
    /// there differently (chunking raw values vs. deserialising stored leaves).
    pub(crate) fn assemble_from_leaves(&mut self, leaf_ids: Vec<Id>) {
        if leaf_ids.len() == 1 {
            self.root = Root::Leaf(leaf_ids[0]);
            return;
        }

        let mut level_children = leaf_ids;
        let mut is_parent_of_leaves = true;
        loop {
            let d_max = self.config.d_max;
            let chunk_bounds = {
                let sizes = Self::chunk_sizes(level_children.len(), d_max);
                let mut bounds = Vec::with_capacity(sizes.len());
                let mut start = 0;
                for size in sizes {
                    bounds.push((start, start + size));
                    start += size;
                }
                bounds
            };

            let mut next_level = Vec::with_capacity(chunk_bounds.len());
            for (start, end) in chunk_bounds {
                let mut node = InternalNode::new(self.has_sum);
                node.is_parent_of_leaves = is_parent_of_leaves;
                for &child in &level_children[start..end] {
                    let (count, sum) = if is_parent_of_leaves {
                        (self.leaves.get(child).len() as u64, self.leaf_weight(child))
                    } else {
                        (
                            self.nodes.get(child).total_count(),
                            self.nodes.get(child).total_sum(),
                        )
                    };
                    node.append_child(child, count, sum);
                }
                let node_id = self.nodes.alloc(node);
                self.reparent_children(node_id);
                next_level.push(node_id);
            }

            self.height += 1;
            if next_level.len() == 1 {
                self.root = Root::Internal(next_level[0]);
                break;
            }
            level_children = next_level;
            is_parent_of_leaves = false;
        }
    }

    /// Chunk `n` items into groups of at most `max`, avoiding an undersized
    /// final group: once fewer than `2 * max` items remain, split the
    /// remainder into two roughly-even groups instead of one full and one
    /// small one.
    fn chunk_sizes(n: usize, max: usize) -> Vec<usize> {
        if n <= max {
            return vec![n];
        }
        let mut sizes = Vec::new();
        let mut remaining = n;
        while remaining > max {
            if remaining >= 2 * max {
                sizes.push(max);
                remaining -= max;
            } else {
                let first = remaining - remaining / 2;
                sizes.push(first);
                remaining -= first;
                break;
            }
        }
        if remaining > 0 {
            sizes.push(remaining);
        }
        sizes
    }

    /// Re-pack the leaf arena so arena slot order matches left-to-right
    /// logical order, swapping two leaves' contents at a time and patching
    /// the owning internal nodes' child lists to match. Requires
    /// `config.track_parent` (used by the permutation façade, which needs a
    /// leaf's arena slot to double as a stable cross-tree pointer).
    ///
    /// Returns every `(a, b)` slot pair swapped, in order, so a façade whose
    /// leaves carry pointers into this same arena (the permutation
    /// specialisation) can patch up those pointers afterwards.
    pub fn sort_leaf_containers(&mut self) -> Vec<(Id, Id)> {
        assert!(
            self.config.track_parent,
            "sort_leaf_containers requires parent tracking"
        );
        let target = self.collect_leaves_in_order();
        let n = target.len();
        let mut perm: Vec<usize> = target.iter().map(|id| id.index()).collect();
        let mut swaps = Vec::new();
        for i in 0..n {
            while perm[i] != i {
                let j = perm[i];
                self.swap_leaf_slots(Id::from(i), Id::from(j));
                swaps.push((Id::from(i), Id::from(j)));
                perm.swap(i, j);
            }
        }
        swaps
    }

    pub(crate) fn collect_leaves_in_order(&self) -> Vec<Id> {
        let mut out = Vec::new();
        match self.root {
            Root::Empty => {}
            Root::Leaf(id) => out.push(id),
            Root::Internal(root_id) => self.collect_leaves_node(root_id, &mut out),
        }
        out
    }

    fn collect_leaves_node(&self, node_id: Id, out: &mut Vec<Id>) {
        let node = self.nodes.get(node_id);
        if node.is_parent_of_leaves {
            out.extend(node.children.iter().copied());
        } else {
            for &child in &node.children {
                self.collect_leaves_node(child, out);
            }
        }
    }

    /// Swap the contents of leaf slots `a` and `b`, fixing up whichever
    /// internal nodes own them so the child lists keep pointing at the
    /// right content. Count/sum aggregates describe "whatever leaf sits at
    /// this child position" and are unaffected by a content swap.
    fn swap_leaf_slots(&mut self, a: Id, b: Id) {
        if a == b {
            return;
        }
        let parent_a = self.leaf_parent[a.index()];
        let parent_b = self.leaf_parent[b.index()];
        let idx_a = self
            .nodes
            .get(parent_a)
            .index_of(a)
            .expect("leaf_parent out of sync with parent's children");
        let idx_b = self
            .nodes
            .get(parent_b)
            .index_of(b)
            .expect("leaf_parent out of sync with parent's children");

        self.leaves.swap_slots(a, b);
        self.nodes.get_mut(parent_a).children[idx_a] = b;
        self.nodes.get_mut(parent_b).children[idx_b] = a;
        self.leaf_parent.swap(a.index(), b.index());
    }
}
