//! Core runtime configuration.
//!
//! This module defines configuration that should be resolved once at process startup and then
//! passed into core services. Library code never reads process-wide environment variables;
//! binaries resolve them and hand a `CoreConfig` down.

use crate::constants::{DEFAULT_BUNDLE_DIR, DEFAULT_DATABASE_NAME, DEFAULT_DATA_DIR, PATIENTS_COLLECTION};
use crate::{IngestError, IngestResult};
use std::path::{Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CoreConfig {
    data_dir: PathBuf,
    database: String,
    collection: String,
    bundle_dir: PathBuf,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::InvalidInput`] if the database or collection name is blank or
    /// is not a plain single path component.
    pub fn new(
        data_dir: PathBuf,
        database: String,
        collection: String,
        bundle_dir: PathBuf,
    ) -> IngestResult<Self> {
        validate_name("database", &database)?;
        validate_name("collection", &collection)?;

        Ok(Self {
            data_dir,
            database,
            collection,
            bundle_dir,
        })
    }

    /// Build a configuration from optional raw values, substituting defaults for anything
    /// missing or blank.
    ///
    /// # Errors
    ///
    /// See [`CoreConfig::new`].
    pub fn from_values(
        data_dir: Option<String>,
        database: Option<String>,
        collection: Option<String>,
        bundle_dir: Option<String>,
    ) -> IngestResult<Self> {
        fn or_default(value: Option<String>, default: &str) -> String {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        }

        Self::new(
            PathBuf::from(or_default(data_dir, DEFAULT_DATA_DIR)),
            or_default(database, DEFAULT_DATABASE_NAME),
            or_default(collection, PATIENTS_COLLECTION),
            PathBuf::from(or_default(bundle_dir, DEFAULT_BUNDLE_DIR)),
        )
    }

    /// Root directory of the document store.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Directory holding the bundle files to ingest.
    pub fn bundle_dir(&self) -> &Path {
        &self.bundle_dir
    }

    /// Directory holding the configured database.
    pub fn database_dir(&self) -> PathBuf {
        self.data_dir.join(&self.database)
    }
}

fn validate_name(kind: &str, name: &str) -> IngestResult<()> {
    if name.trim().is_empty() {
        return Err(IngestError::InvalidInput(format!("{kind} name cannot be empty")));
    }
    if name.contains(['/', '\\']) || name.starts_with('.') {
        return Err(IngestError::InvalidInput(format!(
            "{kind} name must be a plain directory name: {name}"
        )));
    }
    Ok(())
}
