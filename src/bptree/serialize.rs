//! On-disk format for one tree: a small config header followed by every
//! leaf, in left-to-right logical order, each serialised with its own
//! [`LeafContainer::serialize`]. `load` re-derives the internal-node levels
//! with the same chunking [`BpTree::assemble_from_leaves`] uses for bulk
//! build, rather than storing internal nodes directly — counts and sums are
//! cheap to recompute and storing them would just be redundant, recomputable
//! bytes on disk.
//!
//! Every routine is cursor-based (`&mut usize pos`) rather than
//! slice-at-zero, so a façade that concatenates several tree blobs (`DWT`'s
//! per-node levels, `DP`'s `T_π`/`T_π⁻¹` pair, `DRR`'s per-level DBS+DPS
//! pairs) can resume deserialising the next blob at the offset this one
//! stopped at, per spec.md §4.3.8 "self-delimited region".

use super::arena::Id;
use super::leaf::ds64::{read_u64, read_u8};
use super::leaf::LeafContainer;
use super::{BpConfig, BpTree};

use crate::error::{Error, Result};

impl<L: LeafContainer> BpTree<L> {
    /// Append this tree's serialised form to `out`.
    pub fn store_into(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&(self.config.d_max as u64).to_le_bytes());
        out.extend_from_slice(&(self.config.l_max as u64).to_le_bytes());
        out.push(self.has_sum as u8);
        out.push(self.config.track_parent as u8);
        out.push(self.config.super_left_push_mode as u8);

        let leaves = self.collect_leaves_in_order();
        out.extend_from_slice(&(leaves.len() as u64).to_le_bytes());
        for leaf_id in leaves {
            self.leaves.get(leaf_id).serialize(out);
        }
    }

    pub fn store(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.store_into(&mut out);
        out
    }

    /// Deserialise a tree starting at `buf[*pos..]`, advancing `pos` past
    /// exactly the bytes consumed.
    pub fn load_from(buf: &[u8], pos: &mut usize, weight_fn: fn(L::Value) -> u64) -> Result<Self> {
        if buf.len() < *pos + 8 + 8 + 1 + 1 + 1 + 8 {
            return Err(Error::Corrupt("buffer shorter than the tree header"));
        }
        let d_max = read_u64(buf, pos) as usize;
        let l_max = read_u64(buf, pos) as usize;
        let has_sum = read_u8(buf, pos) != 0;
        let track_parent = read_u8(buf, pos) != 0;
        let super_left_push_mode = read_u8(buf, pos) != 0;
        let leaf_count = read_u64(buf, pos) as usize;

        let mut config = BpConfig::new(d_max, l_max)?;
        config.track_parent = track_parent;
        config.super_left_push_mode = super_left_push_mode;

        let mut tree = BpTree::new(config, has_sum).with_weight_fn(weight_fn);
        let mut leaf_ids = Vec::with_capacity(leaf_count);
        for _ in 0..leaf_count {
            let leaf = L::deserialize(buf, pos);
            leaf_ids.push(tree.alloc_leaf(leaf, Id::NIL));
        }
        if !leaf_ids.is_empty() {
            tree.assemble_from_leaves(leaf_ids);
        }
        Ok(tree)
    }

    pub fn load(buf: &[u8], weight_fn: fn(L::Value) -> u64) -> Result<Self> {
        let mut pos = 0usize;
        Self::load_from(buf, &mut pos, weight_fn)
    }
}
