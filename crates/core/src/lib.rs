//! # HCA Core
//!
//! Core business logic for the healthcare assistant.
//!
//! This crate contains pure data operations:
//! - Ingestion of FHIR bundle files into flat per-patient records
//! - A file-backed document store under the configured data directory
//! - Read access to stored patients
//!
//! **No API concerns**: HTTP servers, model clients, or command-line handling belong in
//! `api-rest`, `hca-summarizer`, or `hca-cli`.

pub mod config;
pub mod constants;
pub mod error;
pub mod ingest;
pub mod patient;
pub mod record;
pub mod store;

pub use config::CoreConfig;
pub use error::{IngestError, IngestResult};
pub use ingest::{collect_records, ingest, run_ingest, IngestReport};
pub use patient::PatientService;
pub use record::PatientRecord;
pub use store::{
    Collection, DocumentStore, MemoryCollection, PatientSink, StoreError, StoreResult,
    WriteFailure,
};

pub use hca_types::{NonEmptyText, TextError};
