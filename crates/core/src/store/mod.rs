//! Document store.
//!
//! Patient records are written to a small file-backed document store:
//!
//! ```text
//! <data_dir>/
//!   <database>/
//!     <collection>/
//!       <document id>.json
//! ```
//!
//! The store handle is an explicitly constructed value. Open it with
//! [`DocumentStore::connect`] before use and pass it (or its collections) to whatever needs it.
//! A [`Collection`] is a standalone handle on its directory and does not borrow the store, so
//! it stays usable after [`DocumentStore::close`] ends the session.
//!
//! Ingestion only depends on the [`PatientSink`] trait: clear everything, then bulk insert.

mod collection;
mod memory;

pub use collection::Collection;
pub use memory::MemoryCollection;

use crate::config::CoreConfig;
use crate::constants::PING_FILENAME;
use crate::PatientRecord;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// One record that could not be written during a bulk insert.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WriteFailure {
    /// Position of the record in the batch passed to `insert_many`.
    pub index: usize,
    /// Document id of the failed record.
    pub id: String,
    pub message: String,
}

impl fmt::Display for WriteFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} ({}): {}", self.index, self.id, self.message)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("document store unavailable at {}: {source}", path.display())]
    Unavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid collection name: {0}")]
    InvalidCollectionName(String),
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to remove {}: {source}", path.display())]
    Remove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode document {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("bulk write error: {inserted} inserted, {} failed", failures.len())]
    BulkWrite {
        inserted: usize,
        failures: Vec<WriteFailure>,
    },
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Destination of assembled patient records.
pub trait PatientSink {
    /// Remove every record, returning how many were removed.
    fn clear(&mut self) -> StoreResult<u64>;

    /// Write all `records`, returning how many were written.
    ///
    /// Implementations attempt every record. If any fail, they return
    /// [`StoreError::BulkWrite`] listing each failure alongside the number that succeeded.
    fn insert_many(&mut self, records: &[PatientRecord]) -> StoreResult<usize>;
}

/// An open connection to the document store.
#[derive(Debug)]
pub struct DocumentStore {
    database: String,
    database_dir: PathBuf,
}

impl DocumentStore {
    /// Connect to the store described by `cfg`.
    ///
    /// The data directory must already exist. The database directory is created on first use,
    /// then a ping write confirms the store is usable.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the data directory is missing or the database
    /// directory cannot be created or written to.
    pub fn connect(cfg: &CoreConfig) -> StoreResult<Self> {
        let data_dir = cfg.data_dir();
        if !data_dir.is_dir() {
            return Err(StoreError::Unavailable {
                path: data_dir.to_path_buf(),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "data directory does not exist",
                ),
            });
        }

        let database_dir = cfg.database_dir();
        fs::create_dir_all(&database_dir).map_err(|source| StoreError::Unavailable {
            path: database_dir.clone(),
            source,
        })?;

        let store = Self {
            database: cfg.database().to_string(),
            database_dir,
        };
        store.ping()?;

        tracing::info!(
            "connected to document store database '{}' at {}",
            store.database,
            store.database_dir.display()
        );
        Ok(store)
    }

    /// Check that the database directory is still writable.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the ping file cannot be written or removed.
    pub fn ping(&self) -> StoreResult<()> {
        let ping_path = self.database_dir.join(PING_FILENAME);
        let unavailable = |source| StoreError::Unavailable {
            path: ping_path.clone(),
            source,
        };
        fs::write(&ping_path, b"ok").map_err(unavailable)?;
        fs::remove_file(&ping_path).map_err(unavailable)
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn database_dir(&self) -> &Path {
        &self.database_dir
    }

    /// Open (creating if needed) a collection of this database.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidCollectionName`] for names that are not a single plain
    /// path component, and [`StoreError::Unavailable`] if the directory cannot be created.
    pub fn collection(&self, name: &str) -> StoreResult<Collection> {
        if !is_plain_name(name) {
            return Err(StoreError::InvalidCollectionName(name.to_string()));
        }
        Collection::open(self.database_dir.join(name), name)
    }

    /// End the session and log it.
    ///
    /// There is no pooled resource to release. Collections opened earlier keep working.
    pub fn close(self) {
        tracing::info!("document store connection to '{}' closed", self.database);
    }
}

/// Names used as file or directory names: non-empty, no separators, not hidden.
pub(crate) fn is_plain_name(name: &str) -> bool {
    !name.trim().is_empty()
        && !name.starts_with('.')
        && !name.contains(['/', '\\', '\0'])
}
