//! Content fingerprints.
//!
//! A fingerprint is the SHA-256 of a file's bytes, or [`Fingerprint::Absent`]
//! when there is no file at all. `Absent` is a separate variant so a missing
//! image never compares equal to a real empty one.

use std::fmt;
use std::io::{self, Read};

use serde::{Serialize, Serializer};
use sha2::{Digest, Sha256};

/// Digest length in bytes.
pub const DIGEST_LEN: usize = 32;

const CHUNK_SIZE: usize = 64 * 1024;

/// Identity of a file's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fingerprint {
    /// No file exists at the inspected path.
    Absent,
    /// SHA-256 of the content.
    Sha256([u8; DIGEST_LEN]),
}

impl Fingerprint {
    /// Digest the whole stream in fixed-size chunks.
    ///
    /// # Errors
    ///
    /// Returns the first read error from `reader`.
    pub fn from_reader(reader: &mut impl Read) -> io::Result<Self> {
        let mut hasher = Sha256::new();
        let mut buf = vec![0u8; CHUNK_SIZE];
        loop {
            let n = match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            hasher.update(&buf[..n]);
        }
        Ok(Self::Sha256(hasher.finalize().into()))
    }

    /// Digest an in-memory buffer.
    #[must_use]
    pub fn of_bytes(bytes: &[u8]) -> Self {
        Self::Sha256(Sha256::digest(bytes).into())
    }

    #[must_use]
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => f.write_str("none"),
            Self::Sha256(digest) => f.write_str(&hex_encode(digest)),
        }
    }
}

impl Serialize for Fingerprint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Absent => serializer.serialize_none(),
            Self::Sha256(_) => serializer.serialize_str(&self.to_string()),
        }
    }
}

/// Lowercase hex encoding.
#[must_use]
pub fn hex_encode(bytes: &[u8]) -> String {
    use fmt::Write as _;
    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut s, b| {
        let _ = write!(s, "{b:02x}");
        s
    })
}
