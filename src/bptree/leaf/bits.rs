//! Bit container leaf backing `DBS` (spec.md §4.1, §4.5): up to `L_max` bits
//! packed into 64-bit words, with local rank via popcount and select via a
//! linear scan — the multi-word generalisation of the teacher's single-word
//! `Leaf::rank`/`Leaf::select` (`src/leaf/mod.rs`, `src/primitive_static.rs`).

use super::bitbuf::BitBuf;
use super::ds64::read_u64;
use super::{BitOps, LeafContainer};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BitLeaf {
    bits: BitBuf,
}

impl LeafContainer for BitLeaf {
    type Value = bool;

    fn len(&self) -> usize {
        self.bits.len()
    }

    fn at(&self, i: usize) -> bool {
        self.bits.get(i)
    }

    fn insert(&mut self, i: usize, v: bool) {
        self.bits.insert_bit(i, v);
    }

    fn remove(&mut self, i: usize) -> bool {
        self.bits.remove_bit(i)
    }

    fn byte_size(&self) -> usize {
        self.bits.byte_size()
    }

    fn serialize(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&(self.bits.len() as u64).to_le_bytes());
        let words = self.bits.words();
        out.extend_from_slice(&(words.len() as u64).to_le_bytes());
        for w in words {
            out.extend_from_slice(&w.to_le_bytes());
        }
    }

    fn deserialize(buf: &[u8], pos: &mut usize) -> Self {
        let len = read_u64(buf, pos) as usize;
        let nwords = read_u64(buf, pos) as usize;
        let mut words = Vec::with_capacity(nwords);
        for _ in 0..nwords {
            words.push(read_u64(buf, pos));
        }
        BitLeaf {
            bits: BitBuf::from_words(words, len),
        }
    }
}

impl BitOps for BitLeaf {
    fn rank1(&self, i: usize) -> usize {
        self.bits.popcount_prefix(i)
    }

    fn select1(&self, n: usize) -> isize {
        let mut seen = 0usize;
        for i in 0..self.bits.len() {
            if self.bits.get(i) {
                if seen == n {
                    return i as isize;
                }
                seen += 1;
            }
        }
        -1
    }

    fn select0(&self, n: usize) -> isize {
        let mut seen = 0usize;
        for i in 0..self.bits.len() {
            if !self.bits.get(i) {
                if seen == n {
                    return i as isize;
                }
                seen += 1;
            }
        }
        -1
    }

    fn flip(&mut self, i: usize) {
        let cur = self.bits.get(i);
        self.bits.remove_bit(i);
        self.bits.insert_bit(i, !cur);
    }
}
