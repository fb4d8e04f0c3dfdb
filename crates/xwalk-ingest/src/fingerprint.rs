use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::Digest;

use crate::error::{IngestError, Result};

pub fn sha256_hex(bytes: &[u8]) -> String {
    let digest = sha2::Sha256::digest(bytes);
    hex::encode(digest)
}

/// Content hash of one input file, recorded in the audit report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputFingerprint {
    /// What the file feeds (e.g., "usage", "task_statements").
    pub role: String,
    pub path: PathBuf,
    pub sha256: String,
    pub bytes: u64,
}

pub fn fingerprint_file(role: &str, path: &Path) -> Result<InputFingerprint> {
    let bytes = std::fs::read(path).map_err(|e| IngestError::io(path, e))?;
    Ok(InputFingerprint {
        role: role.to_string(),
        path: path.to_path_buf(),
        sha256: sha256_hex(&bytes),
        bytes: bytes.len() as u64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn sha256_of_known_input() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn fingerprint_records_size_and_role() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "abc").unwrap();
        let fp = fingerprint_file("usage", file.path()).unwrap();
        assert_eq!(fp.role, "usage");
        assert_eq!(fp.bytes, 3);
        assert_eq!(fp.sha256, sha256_hex(b"abc"));
    }
}
