use crate::error::{CacheError, CacheResult};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Serializes compiled models to and from cache file bytes.
///
/// `decode(encode(m))` must yield a model usable exactly like `m`.
pub trait ArtifactCodec<M> {
    /// File extension for entries written with this codec (without the dot).
    fn extension(&self) -> &str;

    fn encode(&self, model: &M) -> CacheResult<Vec<u8>>;

    fn decode(&self, bytes: &[u8]) -> CacheResult<M>;
}

/// Default codec: compact JSON via `serde_json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl<M> ArtifactCodec<M> for JsonCodec
where
    M: Serialize + DeserializeOwned,
{
    fn extension(&self) -> &str {
        "json"
    }

    fn encode(&self, model: &M) -> CacheResult<Vec<u8>> {
        serde_json::to_vec(model).map_err(|e| CacheError::Codec(format!("encode failed: {e}")))
    }

    fn decode(&self, bytes: &[u8]) -> CacheResult<M> {
        serde_json::from_slice(bytes).map_err(|e| CacheError::Codec(format!("decode failed: {e}")))
    }
}
