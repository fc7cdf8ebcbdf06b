use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the batchboard crates.
#[derive(Error, Debug)]
pub enum BoardError {
    /// Raw input could not be decoded into the expected shape.
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// A report was requested but the store holds no batches.
    #[error("No data found")]
    NoData,

    /// The storage key derived for a batch is already taken.
    #[error("Storage key already exists: {0}")]
    DuplicateKey(String),

    /// The persistence backend could not be read or written.
    #[error("Storage failure at {path}: {source}")]
    StorageFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A persisted unit exists but its contents are not a valid batch.
    #[error("Corrupt store file {path}: {reason}")]
    CorruptStore { path: PathBuf, reason: String },

    /// A JSON document could not be parsed or produced.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// A report artifact could not be rendered.
    #[error("Render error: {0}")]
    Render(String),

    /// A network-sourced input could not be fetched.
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BoardError {
    /// Wrap an I/O error raised while touching `path` in the store.
    pub fn storage(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BoardError::StorageFailure {
            path: path.into(),
            source,
        }
    }

    /// `true` when the caller supplied input that cannot be ingested.
    pub fn is_input_error(&self) -> bool {
        matches!(self, BoardError::MalformedInput(_))
    }

    /// `true` when the persistence backend is at fault rather than the input.
    pub fn is_storage_error(&self) -> bool {
        matches!(
            self,
            BoardError::StorageFailure { .. }
                | BoardError::CorruptStore { .. }
                | BoardError::DuplicateKey(_)
                | BoardError::Io(_)
        )
    }

    /// `true` when retrying the same call after a delay may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, BoardError::DuplicateKey(_))
    }
}

/// Convenience alias used throughout the batchboard crates.
pub type Result<T> = std::result::Result<T, BoardError>;
