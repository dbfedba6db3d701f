//! Content hashing
//!
//! SHA-256 over the exact bytes, rendered as 64 lowercase hex characters.
//! Used as an identity/integrity fingerprint, not for provenance.

use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

const CHUNK_SIZE: usize = 65536;

pub fn content_hash(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Streaming variant of [`content_hash`].
pub fn hash_reader<R: Read>(mut reader: R) -> io::Result<String> {
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; CHUNK_SIZE];
    loop {
        let count = reader.read(&mut buffer)?;
        if count == 0 {
            break;
        }
        hasher.update(&buffer[..count]);
    }
    Ok(hex::encode(hasher.finalize()))
}

pub fn hash_file(path: impl AsRef<Path>) -> io::Result<String> {
    let file = File::open(path.as_ref())?;
    hash_reader(file)
}
