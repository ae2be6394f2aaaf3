//! Constants used throughout the core crate.
//!
//! Default locations and names are kept here so the binaries, the CLI and the tests all agree
//! on them.

/// Default root directory for the document store when none is configured.
pub const DEFAULT_DATA_DIR: &str = "patient_data";

/// Default database name inside the document store root.
pub const DEFAULT_DATABASE_NAME: &str = "healthcare_assistant_db";

/// Collection holding assembled patient records.
pub const PATIENTS_COLLECTION: &str = "patients";

/// Default directory Synthea writes FHIR bundles to.
pub const DEFAULT_BUNDLE_DIR: &str = "synthea/output/fhir";

/// File extension of bundle files.
pub const BUNDLE_FILE_EXTENSION: &str = "json";

/// File extension of stored documents.
pub const DOCUMENT_FILE_EXTENSION: &str = "json";

/// Name of the ping file written when a store connection is opened.
pub const PING_FILENAME: &str = ".ping";
