//! Record Assembler.
//!
//! Produces one [`PatientRecord`] per declared patient by joining the accumulated lists.
//! Keys that were only ever referenced, never declared by a Patient entry, are not assembled.

use super::aggregate::{Accumulated, Aggregator};
use crate::PatientRecord;

impl Aggregator {
    /// Consume the accumulator and build the final records, sorted by patient id.
    ///
    /// Each list is ordered by fragment provenance so the result is identical for any order in
    /// which bundles were added.
    pub fn assemble(self) -> Vec<PatientRecord> {
        let Aggregator {
            demographics,
            mut conditions,
            mut medications,
            mut reports,
            ..
        } = self;

        let mut records: Vec<PatientRecord> = demographics
            .into_iter()
            .map(|(id, (_, patient))| PatientRecord {
                conditions: take_sorted(&mut conditions, &id),
                medications: take_sorted(&mut medications, &id),
                reports_text: take_sorted(&mut reports, &id),
                name: patient.name,
                gender: patient.gender,
                birth_date: patient.birth_date,
                id,
            })
            .collect();

        let orphaned = conditions.len() + medications.len() + reports.len();
        if orphaned > 0 {
            tracing::debug!("{orphaned} referenced patient keys were never declared");
        }

        records.sort_by(|a, b| a.id.cmp(&b.id));
        records
    }
}

fn take_sorted(map: &mut Accumulated, id: &str) -> Vec<String> {
    let mut items = map.remove(id).unwrap_or_default();
    items.sort();
    items.into_iter().map(|(_, text)| text).collect()
}
