use crate::key::CacheKey;
use std::path::PathBuf;

/// Informational notices emitted by the loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheNotice {
    /// A compiled model was loaded from an existing cache entry.
    Hit {
        path: PathBuf,
        code_hash: CacheKey,
        model_name: Option<String>,
    },
}

impl std::fmt::Display for CacheNotice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hit { path, .. } => write!(f, "Using cached model from {}", path.display()),
        }
    }
}

pub trait NoticeSink: Send + Sync {
    fn on_notice(&self, notice: &CacheNotice);
}

#[derive(Debug, Default)]
pub struct StdoutNoticeSink;

impl NoticeSink for StdoutNoticeSink {
    fn on_notice(&self, notice: &CacheNotice) {
        println!("{notice}");
    }
}

/// Routes notices into `tracing` instead of stdout.
#[derive(Debug, Default)]
pub struct TracingNoticeSink;

impl NoticeSink for TracingNoticeSink {
    fn on_notice(&self, notice: &CacheNotice) {
        match notice {
            CacheNotice::Hit { path, code_hash, model_name } => tracing::info!(
                path = %path.display(),
                code_hash = %code_hash,
                model_name = model_name.as_deref().unwrap_or("-"),
                "{notice}"
            ),
        }
    }
}
