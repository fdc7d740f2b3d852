//! Point insertion and the overflow-rebalancing sweep that follows it.
//!
//! A value lands in exactly one leaf, counts and sums are retraced up the
//! path in one pass, and then each level from the leaf upward is checked for
//! overflow. On overflow the node is split in half (biased by
//! `super_left_push_mode` when set) and the new sibling is spliced into the
//! parent one slot to the right; if the split reaches the root, a fresh
//! two-child root is grown and the tree gains a level. This mirrors the
//! teacher's own `DynamicBitVector::insert`, which retraces balance factors
//! up the same root-to-leaf path it just descended (`src/dynamic_vector/mod.rs`),
//! generalised from an AVL rotation to an arity-bounded split.
//!
//! Sibling redistribution before splitting (moving a value across to a
//! neighbour with headroom instead of growing the tree) is not implemented
//! here; see DESIGN.md for why the size invariants still hold without it.

use super::arena::Id;
use super::leaf::LeafContainer;
use super::node::InternalNode;
use super::{BpTree, Path, Root};

impl<L: LeafContainer> BpTree<L> {
    /// Insert `value` at logical position `index` (`index == size()` appends).
    pub fn insert(&mut self, index: usize, value: L::Value) {
        self.moved.clear();
        let d_sum = (self.weight_fn)(value) as i64;

        if self.is_empty() {
            let leaf_id = self.alloc_leaf(L::default(), Id::NIL);
            self.root = Root::Leaf(leaf_id);
        }

        match self.root {
            Root::Leaf(leaf_id) => {
                self.leaves.get_mut(leaf_id).insert(index, value);
                if self.leaves.get(leaf_id).len() > self.config.l_max {
                    self.split_root_leaf(leaf_id);
                }
            }
            Root::Internal(_) => {
                let path = self.locate_for_insert(index);
                self.leaves.get_mut(path.leaf).insert(path.offset, value);
                self.propagate(&path, 1, d_sum);
                self.fix_overflow(&path);
            }
            Root::Empty => unreachable!("just allocated a root leaf above"),
        }
    }

    fn fix_overflow(&mut self, path: &Path) {
        let leaf_len = self.leaves.get(path.leaf).len();
        if leaf_len > self.config.l_max {
            let new_leaf_id = self.split_leaf(path.leaf);
            let last = *path
                .steps
                .last()
                .expect("a leaf under an internal root always has a parent step");
            self.splice_sibling(last.node, last.child_idx, new_leaf_id, true);
        }

        for i in (0..path.steps.len()).rev() {
            let node_id = path.steps[i].node;
            if self.nodes.get(node_id).degree() <= self.config.d_max {
                break;
            }
            let new_node_id = self.split_internal(node_id);
            if i == 0 {
                self.create_new_root(node_id, new_node_id, false);
            } else {
                let parent = path.steps[i - 1];
                self.splice_sibling(parent.node, parent.child_idx, new_node_id, false);
            }
        }
    }

    /// Split a root that is itself a single overflowing leaf, growing the
    /// tree from height 0 to height 1.
    fn split_root_leaf(&mut self, leaf_id: Id) {
        let new_leaf_id = self.split_leaf(leaf_id);
        self.create_new_root(leaf_id, new_leaf_id, true);
    }

    /// Move the back half (or more, under `super_left_push_mode`) of
    /// `leaf_id`'s values into a freshly allocated leaf and return its id.
    fn split_leaf(&mut self, leaf_id: Id) -> Id {
        let d = self.leaves.get(leaf_id).len();
        let right_len = if self.config.super_left_push_mode {
            d - self.config.l_max / 2
        } else {
            d - d / 2
        };
        let values = self.leaves.get_mut(leaf_id).pop_back(right_len);
        let mut new_leaf = L::default();
        new_leaf.push_many_back(&values);
        let new_id = self.alloc_leaf(new_leaf, Id::NIL);
        for &v in &values {
            self.moved.push((v, leaf_id, new_id));
        }
        new_id
    }

    /// Move the back half of `node_id`'s children into a freshly allocated
    /// internal node, reparenting them, and return the new node's id.
    fn split_internal(&mut self, node_id: Id) -> Id {
        let is_parent_of_leaves = self.nodes.get(node_id).is_parent_of_leaves;
        let node = self.nodes.get_mut(node_id);
        let d = node.children.len();
        let right_len = if self.config.super_left_push_mode {
            d - self.config.d_max / 2
        } else {
            d - d / 2
        };
        let split_at = d - right_len;
        let right_children = node.children.split_off(split_at);
        let right_count = node.count.split_off(split_at);
        let right_sum = node.sum.as_mut().map(|s| s.split_off(split_at));

        let mut new_node = InternalNode::new(self.has_sum);
        new_node.is_parent_of_leaves = is_parent_of_leaves;
        new_node.children = right_children;
        new_node.count = right_count;
        new_node.sum = right_sum;
        let new_id = self.nodes.alloc(new_node);
        self.reparent_children(new_id);
        new_id
    }

    /// Re-point every child of `node_id` at `node_id` as their parent
    /// (back-reference bookkeeping, only active under `track_parent`).
    pub(crate) fn reparent_children(&mut self, node_id: Id) {
        let node = self.nodes.get(node_id);
        let is_parent_of_leaves = node.is_parent_of_leaves;
        let children = node.children.clone();
        if is_parent_of_leaves {
            for child in children {
                self.set_leaf_parent(child, node_id);
            }
        } else if self.config.track_parent {
            for child in children {
                self.nodes.get_mut(child).parent = Some(node_id);
            }
        }
    }

    /// Splice `new_child` into `parent_id` immediately after `child_idx`,
    /// correcting `child_idx`'s own (count, sum) entry for whatever it lost
    /// to the split and inserting a fresh entry for `new_child`.
    pub(crate) fn splice_sibling(
        &mut self,
        parent_id: Id,
        child_idx: usize,
        new_child: Id,
        is_leaf_child: bool,
    ) {
        let old_child = self.nodes.get(parent_id).get_child(child_idx);
        let (old_count, old_sum, new_count, new_sum) = if is_leaf_child {
            (
                self.leaves.get(old_child).len() as u64,
                self.leaf_weight(old_child),
                self.leaves.get(new_child).len() as u64,
                self.leaf_weight(new_child),
            )
        } else {
            (
                self.nodes.get(old_child).total_count(),
                self.nodes.get(old_child).total_sum(),
                self.nodes.get(new_child).total_count(),
                self.nodes.get(new_child).total_sum(),
            )
        };

        let parent = self.nodes.get_mut(parent_id);
        parent.count[child_idx] = old_count;
        if let Some(s) = parent.sum.as_mut() {
            s[child_idx] = old_sum;
        }
        parent.insert_child(child_idx + 1, new_child, new_count, new_sum);

        if is_leaf_child {
            self.set_leaf_parent(old_child, parent_id);
            self.set_leaf_parent(new_child, parent_id);
        } else if self.config.track_parent {
            self.nodes.get_mut(old_child).parent = Some(parent_id);
            self.nodes.get_mut(new_child).parent = Some(parent_id);
        }
    }

    /// Grow the tree by one level: allocate a new two-child root over
    /// `left`/`right`, which until now were the whole tree (or the two
    /// halves of a just-split former root).
    pub(crate) fn create_new_root(&mut self, left: Id, right: Id, is_parent_of_leaves: bool) {
        let (left_count, left_sum, right_count, right_sum) = if is_parent_of_leaves {
            (
                self.leaves.get(left).len() as u64,
                self.leaf_weight(left),
                self.leaves.get(right).len() as u64,
                self.leaf_weight(right),
            )
        } else {
            (
                self.nodes.get(left).total_count(),
                self.nodes.get(left).total_sum(),
                self.nodes.get(right).total_count(),
                self.nodes.get(right).total_sum(),
            )
        };

        let mut root = InternalNode::new(self.has_sum);
        root.is_parent_of_leaves = is_parent_of_leaves;
        root.append_child(left, left_count, left_sum);
        root.append_child(right, right_count, right_sum);
        let root_id = self.nodes.alloc(root);

        if is_parent_of_leaves {
            self.set_leaf_parent(left, root_id);
            self.set_leaf_parent(right, root_id);
        } else if self.config.track_parent {
            self.nodes.get_mut(left).parent = Some(root_id);
            self.nodes.get_mut(right).parent = Some(root_id);
        }

        self.root = Root::Internal(root_id);
        self.height += 1;
    }
}
