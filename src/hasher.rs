// src/hasher.rs

//! Streaming SHA-256 of remote artifacts
//!
//! Artifacts can be hundreds of megabytes, so the body is hashed in fixed
//! chunks as it arrives and never buffered whole.

use crate::error::{Error, Result};
use crate::repository::Fetcher;
use sha2::{Digest, Sha256};
use std::io::{self, Read};
use tracing::{debug, info};

/// Read chunk size
pub const CHUNK_SIZE: usize = 8192;

/// Hash everything readable from `reader`, returning lowercase hex
pub fn hash_reader<R: Read>(mut reader: R) -> io::Result<String> {
    let mut hasher = Sha256::new();
    let mut buf = [0u8; CHUNK_SIZE];
    let mut total: u64 = 0;

    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buf[..n]);
        total += n as u64;
    }

    debug!("Hashed {} bytes", total);
    Ok(format!("{:x}", hasher.finalize()))
}

/// Computes artifact digests through a [`Fetcher`]
pub struct ArtifactHasher<'a> {
    fetcher: &'a dyn Fetcher,
}

impl<'a> ArtifactHasher<'a> {
    pub fn new(fetcher: &'a dyn Fetcher) -> Self {
        Self { fetcher }
    }

    /// Download `url` and return its SHA-256
    ///
    /// Any failure part-way through discards the digest.
    pub fn hash_url(&self, url: &str) -> Result<String> {
        info!("Computing SHA256 for {}", url);

        let reader = self.fetcher.open_artifact(url)?;
        hash_reader(reader).map_err(|e| Error::HashCompute {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::fixtures::FixtureFetcher;
    use std::io::Cursor;

    const EMPTY_SHA256: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

    /// Yields some bytes, then fails
    struct BrokenReader {
        sent: bool,
    }

    impl Read for BrokenReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.sent {
                return Err(io::Error::new(io::ErrorKind::ConnectionReset, "connection reset"));
            }
            self.sent = true;
            buf[..4].copy_from_slice(b"rpm!");
            Ok(4)
        }
    }

    #[test]
    fn test_hash_empty_input() {
        assert_eq!(hash_reader(io::empty()).unwrap(), EMPTY_SHA256);
    }

    #[test]
    fn test_hash_known_vector() {
        assert_eq!(
            hash_reader(Cursor::new(b"abc")).unwrap(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_hash_spans_multiple_chunks() {
        let data = vec![0x5au8; CHUNK_SIZE * 3 + 17];
        let expected = format!("{:x}", Sha256::digest(&data));
        assert_eq!(hash_reader(Cursor::new(data)).unwrap(), expected);
    }

    #[test]
    fn test_read_error_aborts_hash() {
        assert!(hash_reader(BrokenReader { sent: false }).is_err());
    }

    #[test]
    fn test_hash_url() {
        let fetcher = FixtureFetcher::default().with("https://example.com/empty.rpm", Vec::new());
        let hasher = ArtifactHasher::new(&fetcher);

        assert_eq!(hasher.hash_url("https://example.com/empty.rpm").unwrap(), EMPTY_SHA256);
        assert!(matches!(
            hasher.hash_url("https://example.com/missing.rpm"),
            Err(Error::ArtifactFetch { .. })
        ));
    }
}
