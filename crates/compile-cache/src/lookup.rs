//! Reading a single cache entry.
//!
//! Every way a read can fail collapses into [`CacheLookup::Miss`]; the reason is
//! kept for logging only and never changes what the loader does next.

use crate::codec::ArtifactCodec;
use std::path::Path;

/// Why an entry could not be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MissReason {
    /// No file at the expected path.
    NotFound,
    /// The file exists but could not be read.
    Unreadable(String),
    /// The file was read but did not decode into a model.
    Corrupt(String),
}

impl std::fmt::Display for MissReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound => f.write_str("not found"),
            Self::Unreadable(e) => write!(f, "unreadable: {e}"),
            Self::Corrupt(e) => write!(f, "corrupt: {e}"),
        }
    }
}

#[derive(Debug)]
pub enum CacheLookup<M> {
    Hit(M),
    Miss(MissReason),
}

impl<M> CacheLookup<M> {
    #[must_use]
    pub fn is_hit(&self) -> bool {
        matches!(self, Self::Hit(_))
    }

    pub fn into_hit(self) -> Option<M> {
        match self {
            Self::Hit(model) => Some(model),
            Self::Miss(_) => None,
        }
    }
}

/// Try to load a compiled model from `path`.
pub fn lookup_entry<M, S>(path: &Path, codec: &S) -> CacheLookup<M>
where
    S: ArtifactCodec<M> + ?Sized,
{
    let bytes = match std::fs::read(path) {
        Ok(b) => b,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return CacheLookup::Miss(MissReason::NotFound);
        }
        Err(e) => return CacheLookup::Miss(MissReason::Unreadable(e.to_string())),
    };

    match codec.decode(&bytes) {
        Ok(model) => CacheLookup::Hit(model),
        Err(e) => CacheLookup::Miss(MissReason::Corrupt(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::JsonCodec;
    use tempfile::TempDir;

    #[test]
    fn test_lookup_missing_file() {
        let temp = TempDir::new().unwrap();
        let result: CacheLookup<Vec<u32>> = lookup_entry(&temp.path().join("nope.json"), &JsonCodec);
        assert!(matches!(result, CacheLookup::Miss(MissReason::NotFound)));
    }

    #[test]
    fn test_lookup_corrupt_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bad.json");
        std::fs::write(&path, b"\x00\x01garbage").unwrap();

        let result: CacheLookup<Vec<u32>> = lookup_entry(&path, &JsonCodec);
        assert!(matches!(result, CacheLookup::Miss(MissReason::Corrupt(_))));
    }

    #[test]
    fn test_lookup_directory_is_unreadable() {
        let temp = TempDir::new().unwrap();
        let result: CacheLookup<Vec<u32>> = lookup_entry(temp.path(), &JsonCodec);
        assert!(matches!(result, CacheLookup::Miss(MissReason::Unreadable(_))));
    }

    #[test]
    fn test_lookup_hit() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("ok.json");
        std::fs::write(&path, b"[1,2,3]").unwrap();

        let result: CacheLookup<Vec<u32>> = lookup_entry(&path, &JsonCodec);
        assert_eq!(result.into_hit(), Some(vec![1, 2, 3]));
    }
}
