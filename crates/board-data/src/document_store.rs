//! Unbounded headline history: one JSON document per batch.
//!
//! Documents are named `headlines_<YYYY-mm-dd_HH-MM-SS>.json` after the
//! batch's ingestion time, so name order is chronological order.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock, PoisonError};

use board_core::error::{BoardError, Result};
use board_core::models::Records;
use board_core::time_utils;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::batch::Batch;
use crate::store::{RetentionPolicy, RetentionStore};

/// File name prefix of stored documents.
pub const DOCUMENT_PREFIX: &str = "headlines_";

// ── Persisted layout ──────────────────────────────────────────────────────────

/// Metadata block of a stored document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub timestamp: String,
    #[serde(default)]
    pub keyword_used: String,
    pub count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// The on-disk shape of one headline batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadlineDocument {
    pub metadata: DocumentMetadata,
    // Older tooling wrote the list under "headlines".
    #[serde(alias = "headlines")]
    pub records: Vec<String>,
}

impl HeadlineDocument {
    /// Build the document for a headline batch.
    pub fn from_batch(batch: &Batch) -> Result<Self> {
        let Records::Headlines(items) = batch.records() else {
            return Err(BoardError::MalformedInput(format!(
                "headline documents only store markup batches, got {}",
                batch.kind()
            )));
        };
        Ok(Self {
            metadata: DocumentMetadata {
                timestamp: batch.storage_key(),
                keyword_used: batch.context().unwrap_or_default().to_string(),
                count: batch.item_count(),
                source: Some(batch.source_name().to_string()),
            },
            records: items.clone(),
        })
    }

    /// Rebuild the batch. `fallback_key` (from the file name) is used when
    /// the metadata timestamp cannot be parsed.
    fn into_batch(self, fallback_key: &str) -> Option<Batch> {
        let created_at = time_utils::parse_storage_key(&self.metadata.timestamp)
            .or_else(|| time_utils::parse_storage_key(fallback_key))?;
        let source = self
            .metadata
            .source
            .unwrap_or_else(|| format!("{}{}", DOCUMENT_PREFIX, fallback_key));
        if self.metadata.count != self.records.len() {
            warn!(
                "Document {} declares {} records but holds {}",
                fallback_key,
                self.metadata.count,
                self.records.len()
            );
        }
        Some(Batch::assemble(
            source,
            Some(self.metadata.keyword_used),
            Records::Headlines(self.records),
            created_at,
        ))
    }
}

fn document_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^headlines_(\d{4}-\d{2}-\d{2}_\d{2}-\d{2}-\d{2})\.json$")
            .expect("regex is valid")
    })
}

/// Storage key embedded in a document file name, if it is one.
pub fn document_key(file_name: &str) -> Option<&str> {
    document_name_pattern()
        .captures(file_name)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

// ── DocumentStore ─────────────────────────────────────────────────────────────

/// Directory-backed store with an unbounded retention policy.
pub struct DocumentStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl DocumentStore {
    /// Open the store rooted at `dir`, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| BoardError::storage(&dir, e))?;
        Ok(Self {
            dir,
            write_lock: Mutex::new(()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path a batch with `key` is written to.
    pub fn document_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}{}.json", DOCUMENT_PREFIX, key))
    }

    /// Stored document files, sorted by name (oldest first).
    pub fn find_documents(&self) -> Vec<PathBuf> {
        if !self.dir.exists() {
            warn!("Document directory does not exist: {}", self.dir.display());
            return Vec::new();
        }

        let mut files: Vec<PathBuf> = walkdir::WalkDir::new(&self.dir)
            .max_depth(1)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| {
                entry.file_type().is_file()
                    && entry
                        .file_name()
                        .to_str()
                        .map(|name| document_key(name).is_some())
                        .unwrap_or(false)
            })
            .map(|entry| entry.into_path())
            .collect();

        files.sort();
        files
    }

    fn load_document(path: &Path) -> Option<Batch> {
        let key = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(document_key)?
            .to_string();

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                warn!("Failed to read document {}: {}", path.display(), e);
                return None;
            }
        };
        let document: HeadlineDocument = match serde_json::from_str(&content) {
            Ok(d) => d,
            Err(e) => {
                warn!("Skipping unparseable document {}: {}", path.display(), e);
                return None;
            }
        };
        document.into_batch(&key)
    }
}

impl RetentionStore for DocumentStore {
    fn policy(&self) -> RetentionPolicy {
        RetentionPolicy::Unbounded
    }

    fn put(&self, batch: Batch) -> Result<()> {
        let document = HeadlineDocument::from_batch(&batch)?;
        let json = serde_json::to_vec_pretty(&document)?;
        let path = self.document_path(&document.metadata.timestamp);

        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut file = match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
        {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default();
                return Err(BoardError::DuplicateKey(name));
            }
            Err(e) => return Err(BoardError::storage(&path, e)),
        };

        if let Err(e) = file.write_all(&json).and_then(|_| file.sync_all()) {
            drop(file);
            // Leave no partial document behind.
            let _ = std::fs::remove_file(&path);
            return Err(BoardError::storage(&path, e));
        }

        debug!(
            "Saved {} headlines to {}",
            document.metadata.count,
            path.display()
        );
        Ok(())
    }

    fn list_all(&self) -> Result<Vec<Batch>> {
        let mut batches: Vec<Batch> = self
            .find_documents()
            .iter()
            .filter_map(|path| Self::load_document(path))
            .collect();
        // Names sort chronologically already; keep ties in name order.
        batches.sort_by_key(|b| b.created_at());
        Ok(batches)
    }
}
