//! Cache keys and cache file naming.

use crate::error::{CacheError, CacheResult};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Label used in the file name when no model name is given.
pub const UNNAMED_LABEL: &str = "model";

const FILE_PREFIX: &str = "cached-";

/// Bytes of the SHA-256 digest kept in the key (128 bits, MD5-sized).
const CODE_HASH_BYTES: usize = 16;

/// Length of a hex-encoded cache key.
pub const CODE_HASH_LEN: usize = CODE_HASH_BYTES * 2;

/// Stable identifier for a model source (content hash).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey(pub String);

impl CacheKey {
    /// Hash the raw bytes of `model_source`.
    ///
    /// The key is the first 128 bits of the SHA-256 digest, hex encoded. The text
    /// is not normalised: any byte difference yields a different key.
    #[must_use]
    pub fn for_source(model_source: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(model_source.as_bytes());
        let digest = hasher.finalize();
        Self(hex::encode(&digest[..CODE_HASH_BYTES]))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Reject names that cannot be used as a single path component.
pub fn validate_model_name(name: &str) -> CacheResult<()> {
    if name.is_empty() {
        return Err(CacheError::InvalidModelName("model name must not be empty".to_string()));
    }
    if name == "." || name == ".." {
        return Err(CacheError::InvalidModelName(format!("reserved path component: {name}")));
    }
    if name.chars().any(|c| c == '/' || c == '\\' || c == '\0') {
        return Err(CacheError::InvalidModelName(format!(
            "model name must not contain path separators: {name}"
        )));
    }
    Ok(())
}

/// Build the cache file name for a key.
///
/// `cached-{name}-{hash}.{ext}` when a name is given, `cached-model-{hash}.{ext}` otherwise.
#[must_use]
pub fn cache_file_name(key: &CacheKey, model_name: Option<&str>, extension: &str) -> String {
    let label = model_name.unwrap_or(UNNAMED_LABEL);
    format!("{FILE_PREFIX}{label}-{key}.{extension}")
}

/// Split a cache file name back into `(label, code_hash)`.
///
/// Returns `None` for anything that does not follow the naming pattern.
#[must_use]
pub fn parse_cache_file_name(file_name: &str, extension: &str) -> Option<(String, CacheKey)> {
    let stem = file_name.strip_suffix(extension)?.strip_suffix('.')?;
    let rest = stem.strip_prefix(FILE_PREFIX)?;
    let (label, hash) = rest.rsplit_once('-')?;

    if label.is_empty() || !is_code_hash(hash) {
        return None;
    }

    Some((label.to_string(), CacheKey(hash.to_string())))
}

fn is_code_hash(s: &str) -> bool {
    s.len() == CODE_HASH_LEN && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_stable_for_same_source() {
        let a = CacheKey::for_source("model { y ~ normal(0, 1); }");
        let b = CacheKey::for_source("model { y ~ normal(0, 1); }");
        assert_eq!(a, b);
        assert_eq!(a.as_str().len(), CODE_HASH_LEN);
    }

    #[test]
    fn test_cache_key_differs_by_one_byte() {
        let a = CacheKey::for_source("model { y ~ normal(0, 1); }");
        let b = CacheKey::for_source("model { y ~ normal(0, 2); }");
        assert_ne!(a, b);
    }

    #[test]
    fn test_cache_key_known_digest() {
        // leading half of sha256("abc")
        let key = CacheKey::for_source("abc");
        assert_eq!(key.as_str(), "ba7816bf8f01cfea414140de5dae2223");
        assert_eq!(key.as_str().len(), 32);
    }

    #[test]
    fn test_cache_file_name_patterns() {
        let key = CacheKey::for_source("abc");
        assert_eq!(
            cache_file_name(&key, None, "json"),
            format!("cached-model-{key}.json")
        );
        assert_eq!(
            cache_file_name(&key, Some("mymodel"), "json"),
            format!("cached-mymodel-{key}.json")
        );
    }

    #[test]
    fn test_validate_model_name() {
        assert!(validate_model_name("eight-schools").is_ok());
        assert!(validate_model_name("").is_err());
        assert!(validate_model_name("..").is_err());
        assert!(validate_model_name("a/b").is_err());
        assert!(validate_model_name("a\\b").is_err());
    }

    #[test]
    fn test_parse_cache_file_name() {
        let key = CacheKey::for_source("abc");
        let name = cache_file_name(&key, Some("eight-schools"), "json");

        let (label, parsed) = parse_cache_file_name(&name, "json").unwrap();
        assert_eq!(label, "eight-schools");
        assert_eq!(parsed, key);

        assert!(parse_cache_file_name("cached-model-xyz.json", "json").is_none());
        assert!(parse_cache_file_name(&name, "bin").is_none());
        assert!(parse_cache_file_name("notes.json", "json").is_none());
    }
}
