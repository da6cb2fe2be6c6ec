//! Indexing sink boundary
//!
//! The crawler core reports every discovered file to a [`FileIndex`]. The
//! production sink is an external search backend and out of scope here; this
//! module defines the contract it must honor and ships [`MemoryIndex`], an
//! in-process implementation of that contract.
//!
//! Contract: a file is identified by its (filename, size) pair. Reporting an
//! already-known file merges the new server location into the existing
//! record's server list without duplication and refreshes its last-seen
//! time; anything else creates a new record. The merge must be safe under
//! concurrent calls, since independent crawl targets can discover the same
//! file at the same time.

use chrono::{DateTime, Utc};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Mutex;
use thiserror::Error;

/// Errors that can occur while indexing a discovered file
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("Index store lock poisoned")]
    Poisoned,

    #[error("Indexing backend error: {0}")]
    Backend(String),
}

/// Result type for indexing operations
pub type IndexResult<T> = Result<T, IndexError>;

/// One server/path pair where a file was found
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerLocation {
    /// Entry URL of the server
    pub url: String,

    /// Path of the file on that server
    pub path: String,
}

/// A discovered file as reported to the sink
#[derive(Debug, Clone)]
pub struct FileEntry {
    /// Base name of the file
    pub filename: String,

    /// Size in bytes (0 if unknown)
    pub size: u64,

    /// Best-effort MIME type (may be empty)
    pub mime_type: String,

    /// Last modification time, if known
    pub modified: Option<DateTime<Utc>>,

    /// Where the file was found (one location per report)
    pub servers: Vec<ServerLocation>,
}

/// The indexing sink consumed by the crawler core
///
/// Implementations are invoked concurrently by every crawl target's task and
/// must serialize the read-modify-write of each logical file record.
pub trait FileIndex: Send + Sync {
    /// Records a discovered file, merging per the (filename, size) contract
    fn add_file_entry(&self, entry: FileEntry) -> IndexResult<()>;
}

/// A stored file record
#[derive(Debug, Clone)]
pub struct IndexedFile {
    pub filename: String,
    pub size: u64,
    pub mime_type: String,
    pub modified: Option<DateTime<Utc>>,
    pub last_seen: DateTime<Utc>,
    pub servers: Vec<ServerLocation>,
}

/// In-memory [`FileIndex`] implementation
///
/// The mutex serializes the whole lookup-then-merge sequence, which is what
/// makes concurrent reports of the same file safe.
#[derive(Default)]
pub struct MemoryIndex {
    files: Mutex<HashMap<(String, u64), IndexedFile>>,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct file records
    pub fn file_count(&self) -> usize {
        self.files.lock().map(|files| files.len()).unwrap_or(0)
    }

    /// Looks up a record by its identity pair
    pub fn get(&self, filename: &str, size: u64) -> Option<IndexedFile> {
        self.files
            .lock()
            .ok()?
            .get(&(filename.to_string(), size))
            .cloned()
    }
}

impl FileIndex for MemoryIndex {
    fn add_file_entry(&self, entry: FileEntry) -> IndexResult<()> {
        let mut files = self.files.lock().map_err(|_| IndexError::Poisoned)?;
        let now = Utc::now();

        match files.entry((entry.filename.clone(), entry.size)) {
            Entry::Occupied(mut occupied) => {
                let record = occupied.get_mut();
                record.last_seen = now;
                for server in entry.servers {
                    if !record.servers.contains(&server) {
                        record.servers.push(server);
                    }
                }
            }
            Entry::Vacant(vacant) => {
                vacant.insert(IndexedFile {
                    filename: entry.filename,
                    size: entry.size,
                    mime_type: entry.mime_type,
                    modified: entry.modified,
                    last_seen: now,
                    servers: entry.servers,
                });
            }
        }

        Ok(())
    }
}
