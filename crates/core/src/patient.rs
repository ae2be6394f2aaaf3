//! Patient read access.
//!
//! Read-only queries over the patient collection written by ingestion. Used by the REST API
//! and the CLI; neither touches the store layout directly.

use crate::store::{Collection, StoreResult};
use crate::PatientRecord;

/// Pure patient data operations over one collection - no API concerns.
#[derive(Clone, Debug)]
pub struct PatientService {
    collection: Collection,
}

impl PatientService {
    /// Creates a new `PatientService` reading from `collection`.
    pub fn new(collection: Collection) -> Self {
        Self { collection }
    }

    pub fn collection(&self) -> &Collection {
        &self.collection
    }

    /// Lists every stored patient record, ordered by id.
    ///
    /// Documents that cannot be decoded are logged as warnings and skipped.
    ///
    /// # Errors
    ///
    /// Returns a [`crate::store::StoreError`] if the collection cannot be read.
    pub fn list_patients(&self) -> StoreResult<Vec<PatientRecord>> {
        let patients = self.collection.find_all()?;
        tracing::debug!("listed {} patients", patients.len());
        Ok(patients)
    }

    /// Fetches a single patient record by id.
    ///
    /// # Errors
    ///
    /// Returns a [`crate::store::StoreError`] if the document exists but cannot be read.
    pub fn get_patient(&self, id: &str) -> StoreResult<Option<PatientRecord>> {
        self.collection.find_one(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CoreConfig;
    use crate::store::{DocumentStore, PatientSink};
    use tempfile::TempDir;

    fn service(temp_dir: &TempDir) -> PatientService {
        let cfg = CoreConfig::from_values(
            Some(temp_dir.path().to_string_lossy().into_owned()),
            None,
            None,
            None,
        )
        .expect("valid config");
        let store = DocumentStore::connect(&cfg).expect("connect");
        let collection = store.collection(cfg.collection()).expect("collection");
        store.close();
        PatientService::new(collection)
    }

    #[test]
    fn test_list_patients_empty_collection() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let service = service(&temp_dir);

        let patients = service.list_patients().expect("list should succeed");
        assert!(patients.is_empty());
    }

    #[test]
    fn test_list_and_get_patients() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let service = service(&temp_dir);

        let mut collection = service.collection().clone();
        collection
            .insert_many(&[
                PatientRecord {
                    id: "p2".into(),
                    name: "John Roe".into(),
                    ..PatientRecord::default()
                },
                PatientRecord {
                    id: "p1".into(),
                    name: "Jane Doe".into(),
                    conditions: vec!["Hypertension".into()],
                    ..PatientRecord::default()
                },
            ])
            .expect("insert should succeed");

        let patients = service.list_patients().expect("list should succeed");
        let names: Vec<_> = patients.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Jane Doe", "John Roe"]);

        let jane = service
            .get_patient("p1")
            .expect("get should succeed")
            .expect("patient should exist");
        assert_eq!(jane.conditions, vec!["Hypertension"]);
        assert!(service.get_patient("p9").expect("get should succeed").is_none());
    }
}
