//! The on-disk compile cache.

use crate::codec::{ArtifactCodec, JsonCodec};
use crate::compiler::ModelCompiler;
use crate::config::{LoaderConfig, PersistFailurePolicy, WriteMode};
use crate::error::{CacheError, CacheResult};
use crate::key::{cache_file_name, validate_model_name, CacheKey};
use crate::lookup::{lookup_entry, CacheLookup};
use crate::notice::{CacheNotice, NoticeSink, StdoutNoticeSink};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info, warn};

/// Loader statistics for observability.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoaderStats {
    pub hits: u64,
    pub misses: u64,
    pub builds: u64,
    pub persist_failures: u64,
}

#[derive(Debug, Default)]
struct StatCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    builds: AtomicU64,
    persist_failures: AtomicU64,
}

impl StatCounters {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> LoaderStats {
        LoaderStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            builds: self.builds.load(Ordering::Relaxed),
            persist_failures: self.persist_failures.load(Ordering::Relaxed),
        }
    }
}

/// Returns compiled models, compiling each distinct source at most once per cache entry.
///
/// Entries live in `config.cache_dir` and survive process restarts. No locking is
/// done: two callers racing on the same key may both compile, and the last write wins.
pub struct ModelCacheLoader<C, S = JsonCodec> {
    compiler: C,
    codec: S,
    config: LoaderConfig,
    notices: Box<dyn NoticeSink>,
    stats: StatCounters,
}

impl<C> ModelCacheLoader<C, JsonCodec>
where
    C: ModelCompiler,
    C::Model: Serialize + DeserializeOwned,
{
    /// Create a loader that stores entries as JSON.
    pub fn new(compiler: C, config: LoaderConfig) -> CacheResult<Self> {
        Self::with_codec(compiler, JsonCodec, config)
    }
}

impl<C, S> ModelCacheLoader<C, S>
where
    C: ModelCompiler,
    S: ArtifactCodec<C::Model>,
{
    pub fn with_codec(compiler: C, codec: S, config: LoaderConfig) -> CacheResult<Self> {
        config.validate()?;

        Ok(Self {
            compiler,
            codec,
            config,
            notices: Box::new(StdoutNoticeSink),
            stats: StatCounters::default(),
        })
    }

    /// Replace the sink that receives cache-hit notices (stdout by default).
    #[must_use]
    pub fn with_notice_sink(mut self, sink: impl NoticeSink + 'static) -> Self {
        self.notices = Box::new(sink);
        self
    }

    /// Path of the cache entry for this source and name.
    pub fn cache_path(&self, model_source: &str, model_name: Option<&str>) -> CacheResult<PathBuf> {
        self.resolve(model_source, model_name).map(|(path, _)| path)
    }

    /// Read the cache entry without compiling or writing anything.
    pub fn lookup(
        &self,
        model_source: &str,
        model_name: Option<&str>,
    ) -> CacheResult<CacheLookup<C::Model>> {
        let (path, _) = self.resolve(model_source, model_name)?;
        Ok(lookup_entry(&path, &self.codec))
    }

    /// Get a compiled model from the cache, or compile and cache it.
    ///
    /// Any failure to read the existing entry (missing, unreadable, corrupt) leads
    /// to a rebuild. A hit emits one notice to the notice sink.
    ///
    /// # Errors
    /// Invalid input, a compiler failure, or (under
    /// [`PersistFailurePolicy::Propagate`]) a failure to write the new entry.
    pub fn get_or_build(&self, model_source: &str, model_name: Option<&str>) -> CacheResult<C::Model> {
        let (path, code_hash) = self.resolve(model_source, model_name)?;

        match lookup_entry(&path, &self.codec) {
            CacheLookup::Hit(model) => {
                StatCounters::bump(&self.stats.hits);
                self.notices.on_notice(&CacheNotice::Hit {
                    path,
                    code_hash,
                    model_name: model_name.map(str::to_string),
                });
                return Ok(model);
            }
            CacheLookup::Miss(reason) => {
                StatCounters::bump(&self.stats.misses);
                debug!(
                    path = %path.display(),
                    code_hash = %code_hash,
                    %reason,
                    "Cache miss, compiling model"
                );
            }
        }

        let model = self
            .compiler
            .compile(model_source)
            .map_err(CacheError::Compilation)?;
        StatCounters::bump(&self.stats.builds);

        match self.persist(&path, &model) {
            Ok(()) => {
                info!(
                    compiler = self.compiler.id(),
                    path = %path.display(),
                    code_hash = %code_hash,
                    "Compiled model cached"
                );
            }
            Err(e) => {
                StatCounters::bump(&self.stats.persist_failures);
                match self.config.on_persist_failure {
                    PersistFailurePolicy::Propagate => return Err(e),
                    PersistFailurePolicy::Warn => {
                        warn!(
                            path = %path.display(),
                            error = %e,
                            "Failed to persist compiled model, returning it uncached"
                        );
                    }
                }
            }
        }

        Ok(model)
    }

    #[must_use]
    pub fn stats(&self) -> LoaderStats {
        self.stats.snapshot()
    }

    #[must_use]
    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    #[must_use]
    pub fn compiler(&self) -> &C {
        &self.compiler
    }

    fn resolve(&self, model_source: &str, model_name: Option<&str>) -> CacheResult<(PathBuf, CacheKey)> {
        if model_source.is_empty() {
            return Err(CacheError::EmptySource);
        }
        if let Some(name) = model_name {
            validate_model_name(name)?;
        }

        let key = CacheKey::for_source(model_source);
        let file_name = cache_file_name(&key, model_name, self.codec.extension());
        Ok((self.config.cache_dir.join(file_name), key))
    }

    fn persist(&self, path: &Path, model: &C::Model) -> CacheResult<()> {
        let bytes = self.codec.encode(model)?;
        let persist_err = |source: std::io::Error| CacheError::Persist { path: path.to_path_buf(), source };

        if self.config.create_dir {
            std::fs::create_dir_all(&self.config.cache_dir).map_err(persist_err)?;
        }

        match self.config.write_mode {
            WriteMode::Direct => write_entry(path, &bytes),
            WriteMode::AtomicRename => write_entry_atomic(path, &bytes),
        }
        .map_err(persist_err)
    }
}

impl<C, S> std::fmt::Debug for ModelCacheLoader<C, S>
where
    C: ModelCompiler,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelCacheLoader")
            .field("compiler", &self.compiler.id())
            .field("config", &self.config)
            .field("stats", &self.stats.snapshot())
            .finish_non_exhaustive()
    }
}

fn write_entry(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

/// Each call writes its own uniquely named temp file, so concurrent writers of
/// one key never share a temp path; the last rename wins.
fn write_entry_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut tmp = tempfile::Builder::new()
        .prefix(".cached-")
        .suffix(".tmp")
        .tempfile_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map(|_| ()).map_err(|e| e.error)
}

/// Compile-or-load with the default configuration.
///
/// Entries go to the working directory as JSON and a hit is announced on stdout.
pub fn get_or_build<C>(compiler: C, model_source: &str, model_name: Option<&str>) -> CacheResult<C::Model>
where
    C: ModelCompiler,
    C::Model: Serialize + DeserializeOwned,
{
    ModelCacheLoader::new(compiler, LoaderConfig::default())?.get_or_build(model_source, model_name)
}
