//! File-backed collection: one pretty-printed JSON document per record.

use super::{is_plain_name, PatientSink, StoreError, StoreResult, WriteFailure};
use crate::constants::DOCUMENT_FILE_EXTENSION;
use crate::PatientRecord;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// A named collection of patient documents.
#[derive(Clone, Debug)]
pub struct Collection {
    name: String,
    dir: PathBuf,
}

impl Collection {
    pub(super) fn open(dir: PathBuf, name: &str) -> StoreResult<Self> {
        fs::create_dir_all(&dir).map_err(|source| StoreError::Unavailable {
            path: dir.clone(),
            source,
        })?;
        Ok(Self {
            name: name.to_string(),
            dir,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn document_path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.{DOCUMENT_FILE_EXTENSION}"))
    }

    /// Paths of all documents, sorted by file name.
    fn document_paths(&self) -> StoreResult<Vec<PathBuf>> {
        let read_err = |source| StoreError::Read {
            path: self.dir.clone(),
            source,
        };

        let mut paths = Vec::new();
        for entry in fs::read_dir(&self.dir).map_err(read_err)? {
            let path = entry.map_err(read_err)?.path();
            let is_document = path
                .extension()
                .is_some_and(|ext| ext == DOCUMENT_FILE_EXTENSION);
            if is_document && path.is_file() {
                paths.push(path);
            }
        }
        paths.sort();
        Ok(paths)
    }

    /// Number of documents in the collection.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Read`] if the collection directory cannot be listed.
    pub fn count(&self) -> StoreResult<u64> {
        Ok(self.document_paths()?.len() as u64)
    }

    /// All documents, ordered by id.
    ///
    /// Documents that cannot be decoded are logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Read`] if the collection directory or a document cannot be read.
    pub fn find_all(&self) -> StoreResult<Vec<PatientRecord>> {
        let mut records = Vec::new();
        for path in self.document_paths()? {
            match read_document(&path) {
                Ok(record) => records.push(record),
                Err(StoreError::Decode { path, source }) => {
                    tracing::warn!("failed to decode document: {} - {}", path.display(), source);
                }
                Err(e) => return Err(e),
            }
        }
        records.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(records)
    }

    /// Look up one document by id.
    ///
    /// Ids that could never have been stored (blank, path-like) simply return `None`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Read`] or [`StoreError::Decode`] if the document exists but
    /// cannot be read.
    pub fn find_one(&self, id: &str) -> StoreResult<Option<PatientRecord>> {
        if !is_plain_name(id) {
            return Ok(None);
        }
        let path = self.document_path(id);
        if !path.is_file() {
            return Ok(None);
        }
        read_document(&path).map(Some)
    }

    fn insert_one(&self, record: &PatientRecord) -> Result<(), String> {
        if !is_plain_name(&record.id) {
            return Err(format!("invalid document id '{}'", record.id));
        }

        let body = serde_json::to_vec_pretty(record).map_err(|e| e.to_string())?;
        let path = self.document_path(&record.id);

        let mut file = match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
        {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(format!("duplicate key: _id '{}'", record.id));
            }
            Err(e) => return Err(e.to_string()),
        };

        if let Err(e) = file.write_all(&body) {
            // Leave no half-written document behind.
            let _ = fs::remove_file(&path);
            return Err(e.to_string());
        }
        Ok(())
    }
}

fn read_document(path: &Path) -> StoreResult<PatientRecord> {
    let contents = fs::read_to_string(path).map_err(|source| StoreError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| StoreError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

impl PatientSink for Collection {
    fn clear(&mut self) -> StoreResult<u64> {
        let mut removed = 0;
        for path in self.document_paths()? {
            fs::remove_file(&path).map_err(|source| StoreError::Remove {
                path: path.clone(),
                source,
            })?;
            removed += 1;
        }
        tracing::debug!("cleared {removed} documents from '{}'", self.name);
        Ok(removed)
    }

    fn insert_many(&mut self, records: &[PatientRecord]) -> StoreResult<usize> {
        let mut inserted = 0;
        let mut failures = Vec::new();

        for (index, record) in records.iter().enumerate() {
            match self.insert_one(record) {
                Ok(()) => inserted += 1,
                Err(message) => failures.push(WriteFailure {
                    index,
                    id: record.id.clone(),
                    message,
                }),
            }
        }

        if failures.is_empty() {
            Ok(inserted)
        } else {
            Err(StoreError::BulkWrite { inserted, failures })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CoreConfig;
    use crate::store::DocumentStore;
    use tempfile::TempDir;

    fn record(id: &str) -> PatientRecord {
        PatientRecord {
            id: id.into(),
            name: format!("Patient {id}"),
            gender: "female".into(),
            birth_date: "1980-01-01".into(),
            conditions: vec!["Hypertension".into()],
            medications: vec![],
            reports_text: vec![],
        }
    }

    fn open_collection(temp_dir: &TempDir) -> Collection {
        let cfg = CoreConfig::from_values(
            Some(temp_dir.path().to_string_lossy().into_owned()),
            None,
            None,
            None,
        )
        .expect("valid config");
        let store = DocumentStore::connect(&cfg).expect("connect");
        let collection = store.collection("patients").expect("collection");
        store.close();
        collection
    }

    #[test]
    fn test_insert_then_find_all_sorted_by_id() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let mut collection = open_collection(&temp_dir);

        let inserted = collection
            .insert_many(&[record("p2"), record("p1")])
            .expect("insert should succeed");
        assert_eq!(inserted, 2);
        assert_eq!(collection.count().expect("count"), 2);

        let ids: Vec<_> = collection
            .find_all()
            .expect("find_all")
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec!["p1", "p2"]);
        assert_eq!(
            collection.find_one("p1").expect("find_one"),
            Some(record("p1"))
        );
        assert_eq!(collection.find_one("missing").expect("find_one"), None);
        assert_eq!(collection.find_one("../p1").expect("find_one"), None);
    }

    #[test]
    fn test_partial_failure_reports_each_failed_record() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let mut collection = open_collection(&temp_dir);
        collection.insert_many(&[record("p1")]).expect("seed");

        let err = collection
            .insert_many(&[record("p0"), record("p1"), record("a/b")])
            .expect_err("duplicate and invalid ids should fail");

        let StoreError::BulkWrite { inserted, failures } = err else {
            panic!("expected a bulk write error");
        };
        assert_eq!(inserted, 1);
        assert_eq!(failures.len(), 2);
        assert_eq!((failures[0].index, failures[0].id.as_str()), (1, "p1"));
        assert!(failures[0].message.starts_with("duplicate key"));
        assert_eq!((failures[1].index, failures[1].id.as_str()), (2, "a/b"));
        assert_eq!(collection.count().expect("count"), 2);
    }

    #[test]
    fn test_clear_removes_documents_and_reports_count() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let mut collection = open_collection(&temp_dir);
        collection
            .insert_many(&[record("p1"), record("p2"), record("p3")])
            .expect("insert");
        fs::write(collection.dir().join("README.txt"), "not a document").expect("write");

        assert_eq!(collection.clear().expect("clear"), 3);
        assert_eq!(collection.count().expect("count"), 0);
        assert!(collection.dir().join("README.txt").exists());
        assert_eq!(collection.clear().expect("clear empty"), 0);
    }

    #[test]
    fn test_find_all_skips_undecodable_documents() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let mut collection = open_collection(&temp_dir);
        collection.insert_many(&[record("p1")]).expect("insert");
        fs::write(collection.dir().join("broken.json"), "{").expect("write");

        let records = collection.find_all().expect("find_all");
        assert_eq!(records, vec![record("p1")]);
    }
}
