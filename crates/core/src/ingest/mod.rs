//! Bundle ingestion.
//!
//! One ingestion run flows strictly one way:
//!
//! ```text
//! bundle files -> entries -> fragments -> per-patient accumulator -> records -> sink
//! ```
//!
//! - [`reader`] lists and parses bundle files
//! - [`extract`] turns one typed resource into a fragment
//! - [`aggregate`] accumulates fragments across every file of the run
//! - [`assemble`] joins the accumulated pieces into flat [`PatientRecord`]s
//!
//! The sink is replaced wholesale: `clear()` then `insert_many()`. When a run finds no bundle
//! files, or assembles no records, the sink is left untouched.

pub mod aggregate;
pub mod assemble;
pub mod extract;
pub mod reader;

pub use aggregate::{AggregateStats, Aggregator};
pub use extract::{extract, Fragment, PatientFragment, Provenance, Subject};
pub use reader::{read_bundle, BundleReader, SourceBundle};

use crate::config::CoreConfig;
use crate::store::{DocumentStore, PatientSink};
use crate::{IngestResult, PatientRecord};
use serde::Serialize;
use std::path::Path;

/// Summary of one ingestion run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    /// Bundle files found in the directory.
    pub files_found: usize,
    /// Bundle files without an `entry` list.
    pub files_skipped: usize,
    pub entries_seen: usize,
    pub undecodable_entries: usize,
    pub records_assembled: usize,
    /// Records removed from the sink before inserting.
    pub cleared: u64,
    pub inserted: usize,
}

/// Read every bundle in `dir` and assemble patient records without writing anywhere.
///
/// # Errors
///
/// Returns an [`crate::IngestError`] if the directory is missing or a bundle file cannot be
/// read or parsed.
pub fn collect_records(dir: &Path) -> IngestResult<(Vec<PatientRecord>, IngestReport)> {
    let reader = BundleReader::open(dir)?;
    let mut report = IngestReport {
        files_found: reader.files().len(),
        ..IngestReport::default()
    };
    tracing::info!(
        "found {} JSON files to process in {}",
        report.files_found,
        dir.display()
    );

    let mut aggregator = Aggregator::new();
    for source in reader.bundles() {
        let source = source?;
        if !source.bundle.has_entries() {
            tracing::info!("skipping {}: no entry list", source.file_name);
            report.files_skipped += 1;
            continue;
        }
        aggregator.add_bundle(&source.file_name, &source.bundle);
    }

    let stats = aggregator.stats().clone();
    report.entries_seen = stats.entries_seen;
    report.undecodable_entries = stats.undecodable_entries;
    tracing::debug!("aggregation finished: {stats:?}");

    let records = aggregator.assemble();
    report.records_assembled = records.len();
    Ok((records, report))
}

/// Run a full ingestion of `dir` into `sink`.
///
/// # Errors
///
/// Returns an [`crate::IngestError`] if reading fails (nothing is written in that case) or if
/// the sink fails. A partial bulk insert surfaces as
/// [`crate::store::StoreError::BulkWrite`] wrapped in [`crate::IngestError::Store`].
pub fn ingest(dir: &Path, sink: &mut dyn PatientSink) -> IngestResult<IngestReport> {
    let (records, mut report) = collect_records(dir)?;

    if records.is_empty() {
        tracing::info!("no patient records assembled; leaving the collection untouched");
        return Ok(report);
    }

    tracing::info!("attempting to insert {} patient records", records.len());
    report.cleared = sink.clear()?;
    tracing::info!("cleared {} existing patient records", report.cleared);

    report.inserted = sink.insert_many(&records)?;
    tracing::info!("inserted {} patient records", report.inserted);

    Ok(report)
}

/// Connect to the configured store, ingest the configured bundle directory into the
/// configured collection, and close the store again on every path.
///
/// # Errors
///
/// Returns an [`crate::IngestError`] if the store is unavailable or the ingestion fails.
pub fn run_ingest(cfg: &CoreConfig) -> IngestResult<IngestReport> {
    let store = DocumentStore::connect(cfg)?;

    let result = store
        .collection(cfg.collection())
        .map_err(Into::into)
        .and_then(|mut collection| ingest(cfg.bundle_dir(), &mut collection));

    store.close();
    result
}
