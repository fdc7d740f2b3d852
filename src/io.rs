//! `store_to_file`/`load_from_file` helpers shared by every façade (spec.md
//! §6): each façade already knows how to turn itself into bytes
//! (`store_to_bytes`) and back (`load_from_bytes`); these two free functions
//! just stream those bytes through a file so the byte-level format stays the
//! single source of truth.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use crate::error::Result;

pub fn write_bytes(path: impl AsRef<Path>, bytes: &[u8]) -> Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    Ok(())
}

pub fn read_bytes(path: impl AsRef<Path>) -> Result<Vec<u8>> {
    let mut file = File::open(path)?;
    let mut buf = Vec::new();
    file.read_to_end(&mut buf)?;
    Ok(buf)
}
