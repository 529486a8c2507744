//! Compile Cache
//!
//! Disk cache for compiled model artifacts:
//! - Keying compiled models by a content hash of their source (`CacheKey`)
//! - Loading a cached artifact or compiling and persisting a new one (`ModelCacheLoader`)
//! - Plugging in the external compiler (`ModelCompiler`) and serializer (`ArtifactCodec`)
//! - Listing entries already on disk

pub mod codec;
pub mod compiler;
pub mod config;
pub mod error;
pub mod key;
pub mod loader;
pub mod lookup;
pub mod notice;
pub mod registry;

pub use codec::{ArtifactCodec, JsonCodec};
pub use compiler::ModelCompiler;
pub use config::{ConfigError, LoaderConfig, PersistFailurePolicy, WriteMode};
pub use error::{CacheError, CacheResult};
pub use key::{cache_file_name, parse_cache_file_name, validate_model_name, CacheKey};
pub use loader::{get_or_build, LoaderStats, ModelCacheLoader};
pub use lookup::{lookup_entry, CacheLookup, MissReason};
pub use notice::{CacheNotice, NoticeSink, StdoutNoticeSink, TracingNoticeSink};
pub use registry::{discover_cache_entries, CacheEntry};
