//! Variable-length-code deque leaf: the default `DPS` leaf (spec.md §4.1,
//! §4.4). Each value is packed using its minimal bit width; a parallel
//! "directory" of per-value widths lets the leaf recover offsets and answer
//! a local prefix-sum in O(`L_max`), matching
//! `original_source/include/prefix_sum/plain_spsi_container.hpp`.

use super::bitbuf::BitBuf;
use super::ds64::{read_u64, read_u8};
use super::{LeafContainer, SumLeaf};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VlcLeaf {
    widths: Vec<u8>,
    bits: BitBuf,
}

#[inline]
fn bit_width(v: u64) -> u8 {
    (64 - v.leading_zeros()) as u8
}

impl VlcLeaf {
    fn offset_of(&self, i: usize) -> usize {
        self.widths[..i].iter().map(|&w| w as usize).sum()
    }
}

impl LeafContainer for VlcLeaf {
    type Value = u64;

    fn len(&self) -> usize {
        self.widths.len()
    }

    fn at(&self, i: usize) -> u64 {
        let start = self.offset_of(i);
        let w = self.widths[i] as usize;
        if w == 0 {
            0
        } else {
            self.bits.get_range(start, w)
        }
    }

    fn insert(&mut self, i: usize, v: u64) {
        let start = self.offset_of(i);
        let w = bit_width(v);
        if w > 0 {
            self.bits.insert_range(start, w as usize, v);
        }
        self.widths.insert(i, w);
    }

    fn remove(&mut self, i: usize) -> u64 {
        let start = self.offset_of(i);
        let w = self.widths.remove(i) as usize;
        if w == 0 {
            0
        } else {
            self.bits.remove_range(start, w)
        }
    }

    fn byte_size(&self) -> usize {
        8 + self.widths.len() + self.bits.byte_size()
    }

    fn serialize(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&(self.widths.len() as u64).to_le_bytes());
        out.extend(self.widths.iter().copied());
        let words = self.bits.words();
        out.extend_from_slice(&(words.len() as u64).to_le_bytes());
        for w in words {
            out.extend_from_slice(&w.to_le_bytes());
        }
    }

    fn deserialize(buf: &[u8], pos: &mut usize) -> Self {
        let n = read_u64(buf, pos) as usize;
        let mut widths = Vec::with_capacity(n);
        for _ in 0..n {
            widths.push(read_u8(buf, pos));
        }
        let nwords = read_u64(buf, pos) as usize;
        let mut words = Vec::with_capacity(nwords);
        for _ in 0..nwords {
            words.push(read_u64(buf, pos));
        }
        let len_bits: usize = widths.iter().map(|&w| w as usize).sum();
        VlcLeaf {
            widths,
            bits: BitBuf::from_words(words, len_bits),
        }
    }
}

impl SumLeaf for VlcLeaf {
    fn psum(&self, i: usize) -> u64 {
        (0..=i).map(|k| self.at(k)).sum()
    }

    fn set(&mut self, i: usize, v: u64) {
        self.remove(i);
        self.insert(i, v);
    }
}
