use std::fmt;
use std::io;
use std::path::Path;

use sha1::{Digest, Sha1};

/// Git blob hash of a file's content.
///
/// The digest is computed over the git object framing
/// `blob {len}\0{content}`, not over the raw bytes, so that it lines up
/// with the `sha` values the upstream listing reports.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct BlobHash([u8; 20]);

impl BlobHash {
    /// Hash a byte slice with git blob framing.
    pub fn from_bytes(data: &[u8]) -> Self {
        let mut hasher = Sha1::new();
        hasher.update(b"blob ");
        hasher.update(data.len().to_string().as_bytes());
        hasher.update([0u8]);
        hasher.update(data);
        Self(hasher.finalize().into())
    }

    /// Hash a file by path. Returns `Ok(None)` if the path does not exist.
    pub fn from_file(path: &Path) -> io::Result<Option<Self>> {
        let data = match std::fs::read(path) {
            Ok(data) => data,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err),
        };
        Ok(Some(Self::from_bytes(&data)))
    }

    /// Lowercase hex digest.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Compare against a hex digest string as reported by the listing API.
    pub fn matches(&self, digest: &str) -> bool {
        self.to_hex() == digest
    }
}

impl fmt::Display for BlobHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for BlobHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlobHash({})", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // `echo -n hello | git hash-object --stdin`
    #[test]
    fn digest_uses_git_blob_framing() {
        let hash = BlobHash::from_bytes(b"hello");
        assert_eq!(hash.to_hex(), "b6fc4c620b67d95f953a5c1c1230aaab5db5a1b0");
    }

    #[test]
    fn empty_content_hashes_to_the_empty_blob() {
        let hash = BlobHash::from_bytes(b"");
        assert_eq!(hash.to_hex(), "e69de29bb2d1d6434b8b29ae775ad8c2e48c5391");
    }

    #[test]
    fn missing_file_hashes_to_none() {
        let dir = tempfile::tempdir().unwrap();
        let hash = BlobHash::from_file(&dir.path().join("nope.cpp")).unwrap();
        assert!(hash.is_none());
    }

    #[test]
    fn file_digest_equals_bytes_digest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kernel.cpp");
        std::fs::write(&path, b"void kernel();\n").unwrap();
        let from_file = BlobHash::from_file(&path).unwrap().unwrap();
        assert_eq!(from_file, BlobHash::from_bytes(b"void kernel();\n"));
        assert!(from_file.matches(&from_file.to_hex()));
    }
}
