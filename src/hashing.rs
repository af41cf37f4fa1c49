//! Hashing System - MD5 for Buildpack Directories
//!
//! Buildpack identifiers may be URLs or contain slashes, so each one is
//! stored on disk under the hex digest of its identifier.

use md5::{Digest, Md5};

/// Compute MD5 hash of bytes, return lowercase hex string (32 chars)
pub fn md5_hex(data: &[u8]) -> String {
    let mut hasher = Md5::new();
    hasher.update(data);
    let result = hasher.finalize();
    hex::encode(result)
}

/// Directory name a buildpack identifier is unpacked under
pub fn buildpack_dir_name(identifier: &str) -> String {
    md5_hex(identifier.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_md5_known_vector() {
        assert_eq!(md5_hex(b""), "d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(md5_hex(b"abc"), "900150983cd24fb0d6963f7d28e17f72");
    }

    #[test]
    fn test_hash_deterministic() {
        let h1 = buildpack_dir_name("ruby");
        let h2 = buildpack_dir_name("ruby");
        assert_eq!(h1, h2);
    }

    #[test]
    fn test_dir_name_is_fixed_length_lowercase_hex() {
        let name = buildpack_dir_name("https://github.com/cloudfoundry/ruby-buildpack.git");
        assert_eq!(name.len(), 32);
        assert!(name.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert!(!name.contains('/'));
    }
}
