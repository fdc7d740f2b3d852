//! Point removal and the underflow-rebalancing sweep that follows it.
//!
//! Mirrors `insert.rs`'s shape but walks the opposite direction: a value
//! leaves a leaf, counts and sums are retraced down-to-zero along the path,
//! and then each level is checked against its minimum occupancy. A sibling
//! with headroom lends one value/child across before falling back to a
//! merge, which is the one place (unlike insertion's split-only sweep) where
//! the corpus's "prefer redistribution" rule is implemented in full, since
//! skipping it here would mean never merging small leaves back together —
//! visibly wrong rather than just a missed optimisation.

use super::arena::Id;
use super::leaf::LeafContainer;
use super::{BpTree, Path, Root};

impl<L: LeafContainer> BpTree<L> {
    /// Remove and return the value at logical position `index`.
    pub fn remove(&mut self, index: usize) -> L::Value {
        self.moved.clear();
        match self.root {
            Root::Empty => panic!("remove from empty tree"),
            Root::Leaf(leaf_id) => {
                let value = self.leaves.get_mut(leaf_id).remove(index);
                if self.leaves.get(leaf_id).is_empty() {
                    self.leaves.free(leaf_id);
                    self.root = Root::Empty;
                }
                value
            }
            Root::Internal(_) => {
                let path = self.locate(index);
                let value = self.leaves.get_mut(path.leaf).remove(path.offset);
                let d_sum = -((self.weight_fn)(value) as i64);
                self.propagate(&path, -1, d_sum);
                self.fix_underflow(&path);
                self.collapse_empty_leaf_root();
                value
            }
        }
    }

    fn fix_underflow(&mut self, path: &Path) {
        let last = *path
            .steps
            .last()
            .expect("a leaf under an internal root always has a parent step");
        let mut lost_child = self.fix_leaf_underflow(last.node, last.child_idx);

        for i in (0..path.steps.len()).rev() {
            if !lost_child {
                break;
            }
            if i == 0 {
                break; // root has no parent to steal from or merge into
            }
            let parent_id = path.steps[i - 1].node;
            let idx_in_parent = path.steps[i - 1].child_idx;
            lost_child = self.fix_internal_underflow(parent_id, idx_in_parent);
        }

        self.collapse_root_if_needed();
    }

    /// Check the leaf at `parent`'s child `idx` against the minimum leaf
    /// occupancy, stealing from a sibling or merging as needed. Returns
    /// `true` if `parent` lost a child (a merge happened).
    fn fix_leaf_underflow(&mut self, parent: Id, idx: usize) -> bool {
        let leaf_id = self.nodes.get(parent).get_child(idx);
        let min_len = self.config.l_max / 2;
        if self.leaves.get(leaf_id).len() >= min_len {
            return false;
        }
        let degree = self.nodes.get(parent).degree();

        if idx > 0 {
            let left_id = self.nodes.get(parent).get_child(idx - 1);
            if self.leaves.get(left_id).len() > min_len {
                let moved = self.leaves.get_mut(left_id).pop_back(1);
                self.leaves.get_mut(leaf_id).push_many_front(&moved);
                for &v in &moved {
                    self.moved.push((v, left_id, leaf_id));
                }
                self.resync_leaf_child(parent, idx - 1);
                self.resync_leaf_child(parent, idx);
                return false;
            }
        }
        if idx + 1 < degree {
            let right_id = self.nodes.get(parent).get_child(idx + 1);
            if self.leaves.get(right_id).len() > min_len {
                let moved = self.leaves.get_mut(right_id).pop_front(1);
                self.leaves.get_mut(leaf_id).push_many_back(&moved);
                for &v in &moved {
                    self.moved.push((v, right_id, leaf_id));
                }
                self.resync_leaf_child(parent, idx);
                self.resync_leaf_child(parent, idx + 1);
                return false;
            }
        }

        if idx > 0 {
            let left_id = self.nodes.get(parent).get_child(idx - 1);
            let moved = self.leaves.get(leaf_id).to_values();
            self.leaves.get_mut(left_id).push_many_back(&moved);
            for &v in &moved {
                self.moved.push((v, leaf_id, left_id));
            }
            self.leaves.free(leaf_id);
            self.nodes.get_mut(parent).remove_child(idx);
            self.resync_leaf_child(parent, idx - 1);
            true
        } else if idx + 1 < degree {
            let right_id = self.nodes.get(parent).get_child(idx + 1);
            let moved = self.leaves.get(right_id).to_values();
            self.leaves.get_mut(leaf_id).push_many_back(&moved);
            for &v in &moved {
                self.moved.push((v, right_id, leaf_id));
            }
            self.leaves.free(right_id);
            self.nodes.get_mut(parent).remove_child(idx + 1);
            self.resync_leaf_child(parent, idx);
            true
        } else {
            // sole child of its parent (only possible directly under the root)
            false
        }
    }

    /// Same as [`Self::fix_leaf_underflow`] one level up: `parent`'s child
    /// `idx` is itself an internal node, checked against the minimum degree.
    fn fix_internal_underflow(&mut self, parent: Id, idx: usize) -> bool {
        let node_id = self.nodes.get(parent).get_child(idx);
        let min_degree = self.config.d_max / 2;
        if self.nodes.get(node_id).degree() >= min_degree {
            return false;
        }
        let degree = self.nodes.get(parent).degree();

        if idx > 0 {
            let left_id = self.nodes.get(parent).get_child(idx - 1);
            if self.nodes.get(left_id).degree() > min_degree {
                let (moved_child, moved_count, moved_sum) = {
                    let left = self.nodes.get_mut(left_id);
                    let child = left.children.pop().unwrap();
                    let count = left.count.pop().unwrap();
                    let sum = left.sum.as_mut().map(|s| s.pop().unwrap()).unwrap_or(0);
                    (child, count, sum)
                };
                self.nodes
                    .get_mut(node_id)
                    .insert_child(0, moved_child, moved_count, moved_sum);
                self.reparent_single_child(node_id, moved_child);
                self.resync_internal_child(parent, idx - 1);
                self.resync_internal_child(parent, idx);
                return false;
            }
        }
        if idx + 1 < degree {
            let right_id = self.nodes.get(parent).get_child(idx + 1);
            if self.nodes.get(right_id).degree() > min_degree {
                let (moved_child, moved_count, moved_sum) = {
                    let right = self.nodes.get_mut(right_id);
                    let child = right.children.remove(0);
                    let count = right.count.remove(0);
                    let sum = right.sum.as_mut().map(|s| s.remove(0)).unwrap_or(0);
                    (child, count, sum)
                };
                self.nodes
                    .get_mut(node_id)
                    .append_child(moved_child, moved_count, moved_sum);
                self.reparent_single_child(node_id, moved_child);
                self.resync_internal_child(parent, idx);
                self.resync_internal_child(parent, idx + 1);
                return false;
            }
        }

        if idx > 0 {
            let left_id = self.nodes.get(parent).get_child(idx - 1);
            self.merge_internal_into(left_id, node_id);
            self.nodes.get_mut(parent).remove_child(idx);
            self.resync_internal_child(parent, idx - 1);
            true
        } else if idx + 1 < degree {
            let right_id = self.nodes.get(parent).get_child(idx + 1);
            self.merge_internal_into(node_id, right_id);
            self.nodes.get_mut(parent).remove_child(idx + 1);
            self.resync_internal_child(parent, idx);
            true
        } else {
            false
        }
    }

    /// Absorb `src`'s children onto the end of `dest`'s arrays and retire `src`.
    fn merge_internal_into(&mut self, dest: Id, src: Id) {
        let (src_children, src_count, src_sum) = {
            let src_node = self.nodes.get_mut(src);
            (
                std::mem::take(&mut src_node.children),
                std::mem::take(&mut src_node.count),
                src_node.sum.as_mut().map(std::mem::take),
            )
        };
        {
            let dest_node = self.nodes.get_mut(dest);
            dest_node.children.extend(src_children.iter().copied());
            dest_node.count.extend(src_count);
            if let (Some(d), Some(s)) = (dest_node.sum.as_mut(), src_sum) {
                d.extend(s);
            }
        }
        for child in &src_children {
            self.reparent_single_child(dest, *child);
        }
        self.nodes.free(src);
    }

    fn reparent_single_child(&mut self, parent: Id, child: Id) {
        if self.nodes.get(parent).is_parent_of_leaves {
            self.set_leaf_parent(child, parent);
        } else if self.config.track_parent {
            self.nodes.get_mut(child).parent = Some(parent);
        }
    }

    fn resync_leaf_child(&mut self, parent: Id, idx: usize) {
        let child = self.nodes.get(parent).get_child(idx);
        let count = self.leaves.get(child).len() as u64;
        let sum = self.leaf_weight(child);
        let node = self.nodes.get_mut(parent);
        node.count[idx] = count;
        if let Some(s) = node.sum.as_mut() {
            s[idx] = sum;
        }
    }

    fn resync_internal_child(&mut self, parent: Id, idx: usize) {
        let child = self.nodes.get(parent).get_child(idx);
        let count = self.nodes.get(child).total_count();
        let sum = self.nodes.get(child).total_sum();
        let node = self.nodes.get_mut(parent);
        node.count[idx] = count;
        if let Some(s) = node.sum.as_mut() {
            s[idx] = sum;
        }
    }

    /// Shrink the tree by one level when the root's degree has dropped to 1.
    fn collapse_root_if_needed(&mut self) {
        if let Root::Internal(root_id) = self.root {
            if self.nodes.get(root_id).degree() == 1 {
                let only_child = self.nodes.get(root_id).get_child(0);
                let is_parent_of_leaves = self.nodes.get(root_id).is_parent_of_leaves;
                self.nodes.free(root_id);
                self.height -= 1;
                if is_parent_of_leaves {
                    self.root = Root::Leaf(only_child);
                } else {
                    self.root = Root::Internal(only_child);
                    if self.config.track_parent {
                        self.nodes.get_mut(only_child).parent = None;
                    }
                }
            }
        }
    }

    fn collapse_empty_leaf_root(&mut self) {
        if let Root::Leaf(leaf_id) = self.root {
            if self.leaves.get(leaf_id).is_empty() {
                self.leaves.free(leaf_id);
                self.root = Root::Empty;
            }
        }
    }
}
