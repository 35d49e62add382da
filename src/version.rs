//! Asset version helpers, computed once at configuration time.

use std::path::Path;

use sha2::{Digest, Sha256};

/// Hex SHA-256 of arbitrary bytes.
pub fn hash_version(bytes: impl AsRef<[u8]>) -> String {
    hex::encode(Sha256::digest(bytes.as_ref()))
}

/// Version derived from an asset URL string.
pub fn version_from_url(url: &str) -> String {
    hash_version(url)
}

/// Version derived from the contents of a build manifest.
pub fn version_from_file(path: impl AsRef<Path>) -> std::io::Result<String> {
    std::fs::read(path).map(hash_version)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_hash_is_stable_hex() {
        let version = version_from_url("https://cdn.example.com/build");
        assert_eq!(version.len(), 64);
        assert_eq!(version, version_from_url("https://cdn.example.com/build"));
        assert_ne!(version, version_from_url("https://cdn.example.com/build2"));
        assert_eq!(
            hash_version(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_file_version_tracks_contents() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"{"app.js":"app-1a2b.js"}"#).unwrap();

        let version = version_from_file(file.path()).unwrap();
        assert_eq!(version, hash_version(br#"{"app.js":"app-1a2b.js"}"#));
        assert!(version_from_file("/nonexistent/manifest.json").is_err());
    }
}
