//! Thin demonstration binary support: reads newline-separated input into one
//! of the library's façades, prints a size/memory summary and writes the
//! serialised structure to a file. Exercises the public façade surface
//! (`build`/`size`/`store_to_file`) but specifies nothing about it — see
//! `config.rs` for the handful of CLI parameters this accepts.

use crate::config::Config;
use crate::dbs::DynamicBitSequence;
use crate::dp::DynamicPermutation;
use crate::drr::DynamicRangeReportingTree;
use crate::dps::DynamicPrefixSum;
use crate::ds64::DynamicSequence64;
use crate::dwt::DynamicWaveletTree;
use std::fs::File;
use std::io::{self, BufRead};
use std::path::Path;

const D_MAX: usize = 4;
const L_MAX: usize = 64;

/// Read large files line by line
/// <https://stackoverflow.com/questions/45882329/read-large-files-line-by-line-in-rust>
///
/// Returns an Iterator over the lines of the file, each wrapped in a
/// `Result` so the caller can surface a read error mid-stream.
pub fn read_lines<P>(filename: P) -> io::Result<io::Lines<io::BufReader<File>>>
where
    P: AsRef<Path>,
{
    let file = File::open(filename)?;
    Ok(io::BufReader::new(file).lines())
}

fn read_values(path: &str) -> io::Result<Vec<u64>> {
    let mut values = Vec::new();
    for line in read_lines(path)? {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Ok(v) = trimmed.parse::<u64>() {
            values.push(v);
        }
    }
    Ok(values)
}

/// Build the façade named by `config.index_name` from `config.file_in` and
/// write its serialised form to `config.file_out`, printing a one-line
/// summary. Returns the byte size written.
pub fn run(config: &Config) -> Result<usize, String> {
    let values = read_values(&config.file_in).map_err(|e| e.to_string())?;

    let bytes = match config.index_name.as_str() {
        "dps" => {
            let dps = DynamicPrefixSum::build(D_MAX, L_MAX, &values).map_err(|e| e.to_string())?;
            dps.store_to_file(&config.file_out).map_err(|e| e.to_string())?;
            println!("dps: {} elements, {} bytes", dps.size(), dps.size_in_bytes());
            dps.size_in_bytes()
        }
        "ds64" => {
            let ds = DynamicSequence64::build(D_MAX, L_MAX, &values).map_err(|e| e.to_string())?;
            ds.store_to_file(&config.file_out).map_err(|e| e.to_string())?;
            println!("ds64: {} elements, {} bytes", ds.size(), ds.size_in_bytes());
            ds.size_in_bytes()
        }
        "dbs" => {
            let bits: Vec<bool> = values.iter().map(|&v| v != 0).collect();
            let dbs = DynamicBitSequence::build(D_MAX, L_MAX, &bits).map_err(|e| e.to_string())?;
            dbs.store_to_file(&config.file_out).map_err(|e| e.to_string())?;
            println!("dbs: {} bits, {} bytes", dbs.size(), dbs.size_in_bytes());
            dbs.size_in_bytes()
        }
        "dwt" => {
            let text: Vec<u8> = values.iter().map(|&v| v as u8).collect();
            let mut alphabet: Vec<u8> = text.clone();
            alphabet.sort_unstable();
            alphabet.dedup();
            if alphabet.is_empty() {
                alphabet.push(0);
            }
            let dwt = DynamicWaveletTree::build(D_MAX, L_MAX, &text, &alphabet).map_err(|e| e.to_string())?;
            dwt.store_to_file(&config.file_out).map_err(|e| e.to_string())?;
            println!("dwt: {} symbols, {} bytes", dwt.size(), dwt.size_in_bytes());
            dwt.size_in_bytes()
        }
        "dp" => {
            let perm: Vec<usize> = values.iter().map(|&v| v as usize).collect();
            let dp = DynamicPermutation::build(D_MAX, L_MAX, &perm).map_err(|e| e.to_string())?;
            dp.store_to_file(&config.file_out).map_err(|e| e.to_string())?;
            println!("dp: {} elements, {} bytes", dp.size(), dp.size_in_bytes());
            dp.size_in_bytes()
        }
        "drr" => {
            let r: Vec<usize> = values.iter().map(|&v| v as usize).collect();
            let drr = DynamicRangeReportingTree::build(D_MAX, L_MAX, &r).map_err(|e| e.to_string())?;
            drr.store_to_file(&config.file_out).map_err(|e| e.to_string())?;
            println!("drr: {} points, {} bytes", drr.size(), drr.size_in_bytes());
            drr.size_in_bytes()
        }
        other => return Err(format!("unknown index_name: {other}")),
    };

    Ok(bytes)
}
