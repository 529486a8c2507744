use crate::error::CacheResult;
use crate::key::{parse_cache_file_name, CacheKey};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

/// A cache entry found on disk.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Model name, or `model` for entries written without one.
    pub label: String,
    pub code_hash: CacheKey,
    pub path: PathBuf,
    pub size_bytes: u64,
    pub modified_at: Option<DateTime<Utc>>,
}

/// List the cache entries in `dir` written with the given file extension.
///
/// Only lists; entries are never removed or validated here.
pub fn discover_cache_entries(dir: &Path, extension: &str) -> CacheResult<Vec<CacheEntry>> {
    let mut out = Vec::new();

    let read_dir = match std::fs::read_dir(dir) {
        Ok(d) => d,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(out),
        Err(e) => return Err(e.into()),
    };

    for entry in read_dir {
        let entry = entry?;
        let path = entry.path();
        let Some((label, code_hash)) = entry
            .file_name()
            .to_str()
            .and_then(|name| parse_cache_file_name(name, extension))
        else {
            continue;
        };

        let metadata = entry.metadata()?;
        if !metadata.is_file() {
            continue;
        }

        out.push(CacheEntry {
            label,
            code_hash,
            path,
            size_bytes: metadata.len(),
            modified_at: metadata.modified().ok().map(DateTime::<Utc>::from),
        });
    }

    out.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(out)
}
