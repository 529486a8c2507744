use std::path::PathBuf;
use thiserror::Error;

use crate::config::ConfigError;

pub type CacheResult<T> = std::result::Result<T, CacheError>;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("model source must not be empty")]
    EmptySource,

    #[error("invalid model name: {0}")]
    InvalidModelName(String),

    /// The compiler's own error, kept intact for the caller to inspect or downcast.
    #[error("model compilation failed: {0}")]
    Compilation(anyhow::Error),

    #[error("codec error: {0}")]
    Codec(String),

    #[error("failed to persist cache entry {}: {source}", path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_compilation_error_chain_names_cause_once() {
        let err = CacheError::Compilation(anyhow::anyhow!("unexpected token 'modle'"));

        let mut rendered = err.to_string();
        let mut source = err.source();
        while let Some(cause) = source {
            rendered.push_str(": ");
            rendered.push_str(&cause.to_string());
            source = cause.source();
        }

        assert_eq!(rendered, "model compilation failed: unexpected token 'modle'");
    }
}
