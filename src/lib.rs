//! Dynamic succinct data structures: a shared B+ tree engine plus six
//! façades built on top of it — prefix-sum sequences, bit sequences,
//! plain `u64` sequences, wavelet trees, permutations and a range-reporting
//! tree for 2-D point queries.
//!
//! Every façade shares the same shape: `new`/`build` construct it,
//! `size`/`size_in_bytes`/`at` inspect it, domain queries and point
//! updates mutate or read it, and `store_to_*`/`load_from_*` round-trip it
//! to bytes.

pub mod bptree;
pub mod commands;
pub mod config;
pub mod dbs;
pub mod dp;
pub mod dps;
pub mod drr;
pub mod ds64;
pub mod dwt;
pub mod error;
pub mod io;
pub mod memory;

pub use config::Config;
pub use dbs::DynamicBitSequence;
pub use dp::DynamicPermutation;
pub use dps::DynamicPrefixSum;
pub use drr::DynamicRangeReportingTree;
pub use ds64::DynamicSequence64;
pub use dwt::DynamicWaveletTree;
pub use error::{Error, Result};
pub use memory::MemoryUsage;
