//! Cross-File Aggregator.
//!
//! Accumulates fragments from every bundle of a run into per-patient mappings keyed by
//! patient id. A patient's entries may be spread over several files and appear in any order,
//! so fragments are accumulated under their key whether or not the Patient entry for that key
//! has been seen yet.
//!
//! ## Linkage policy
//!
//! - Reports are linked only through an explicit subject reference.
//! - Conditions and medications use their explicit subject reference when present. Without
//!   one they are attributed to the bundle's patient, but only if the bundle declares exactly
//!   one patient id (anywhere in the bundle). Otherwise they are dropped.
//! - A subject reference that is present but does not resolve to a patient drops the entry.
//!
//! Each bundle is handled in two passes (extract everything, then route) so the fallback does
//! not depend on whether the Patient entry precedes the condition.

use super::extract::{extract, Fragment, PatientFragment, Provenance, Subject};
use fhir::Bundle;
use std::collections::hash_map::Entry;
use std::collections::{BTreeSet, HashMap};

pub(super) type Accumulated = HashMap<String, Vec<(Provenance, String)>>;

/// Counters describing what the aggregator saw.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AggregateStats {
    /// Raw entries inspected.
    pub entries_seen: usize,
    /// Entries whose recognised resource failed to decode.
    pub undecodable_entries: usize,
    /// Entries that produced no fragment (unknown type, missing fields).
    pub ignored_entries: usize,
    /// Patient entries accepted.
    pub patient_entries: usize,
    /// Condition, medication and report fragments attached to a patient key.
    pub linked_fragments: usize,
    /// Condition and medication fragments that could not be linked.
    pub unlinked_fragments: usize,
}

/// Per-run accumulator state.
#[derive(Debug, Default)]
pub struct Aggregator {
    pub(super) demographics: HashMap<String, (Provenance, PatientFragment)>,
    pub(super) conditions: Accumulated,
    pub(super) medications: Accumulated,
    pub(super) reports: Accumulated,
    stats: AggregateStats,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> &AggregateStats {
        &self.stats
    }

    /// Number of distinct patients declared so far.
    pub fn patient_count(&self) -> usize {
        self.demographics.len()
    }

    /// Decode, extract and accumulate every entry of one bundle.
    pub fn add_bundle(&mut self, file_name: &str, bundle: &Bundle) {
        let mut fragments = Vec::with_capacity(bundle.len());

        for (index, decoded) in bundle.resources().enumerate() {
            self.stats.entries_seen += 1;
            match decoded {
                Ok(Some(resource)) => match extract(&resource) {
                    Some(fragment) => fragments.push((Provenance::new(file_name, index), fragment)),
                    None => {
                        tracing::debug!(
                            "skipping {} entry {file_name}#{index}",
                            resource.resource_type()
                        );
                        self.stats.ignored_entries += 1;
                    }
                },
                Ok(None) => self.stats.ignored_entries += 1,
                Err(e) => {
                    tracing::warn!("failed to decode entry {file_name}#{index}: {e}");
                    self.stats.undecodable_entries += 1;
                }
            }
        }

        self.add_fragments(fragments);
    }

    /// Accumulate fragments that all belong to the same bundle.
    pub fn add_fragments(&mut self, fragments: Vec<(Provenance, Fragment)>) {
        let bundle_patient = sole_patient_id(&fragments);

        for (provenance, fragment) in fragments {
            match fragment {
                Fragment::Patient(patient) => self.add_patient(provenance, patient),
                Fragment::Condition { text, subject } => {
                    if let Some(id) = self.link(&provenance, subject, bundle_patient.as_deref()) {
                        push(&mut self.conditions, id, provenance, text);
                    }
                }
                Fragment::Medication { text, subject } => {
                    if let Some(id) = self.link(&provenance, subject, bundle_patient.as_deref()) {
                        push(&mut self.medications, id, provenance, text);
                    }
                }
                Fragment::Report { patient_id, text } => {
                    self.stats.linked_fragments += 1;
                    push(&mut self.reports, patient_id, provenance, text);
                }
            }
        }
    }

    fn add_patient(&mut self, provenance: Provenance, patient: PatientFragment) {
        self.stats.patient_entries += 1;
        match self.demographics.entry(patient.id.as_str().to_string()) {
            Entry::Vacant(slot) => {
                slot.insert((provenance, patient));
            }
            // Duplicate declarations resolve to the earliest provenance.
            Entry::Occupied(mut slot) => {
                if provenance < slot.get().0 {
                    slot.insert((provenance, patient));
                }
            }
        }
    }

    fn link(
        &mut self,
        provenance: &Provenance,
        subject: Subject,
        bundle_patient: Option<&str>,
    ) -> Option<String> {
        let linked = match subject {
            Subject::Linked(id) => Some(id),
            Subject::Missing => bundle_patient.map(str::to_string),
            Subject::Unresolvable(reason) => {
                tracing::debug!(
                    "unresolvable subject ({reason}) at {}#{}",
                    provenance.file_name,
                    provenance.index
                );
                None
            }
        };

        if linked.is_some() {
            self.stats.linked_fragments += 1;
        } else {
            self.stats.unlinked_fragments += 1;
        }
        linked
    }
}

fn push(map: &mut Accumulated, id: String, provenance: Provenance, text: String) {
    map.entry(id).or_default().push((provenance, text));
}

fn sole_patient_id(fragments: &[(Provenance, Fragment)]) -> Option<String> {
    let ids: BTreeSet<&str> = fragments
        .iter()
        .filter_map(|(_, fragment)| match fragment {
            Fragment::Patient(patient) => Some(patient.id.as_str()),
            _ => None,
        })
        .collect();

    if ids.len() == 1 {
        ids.into_iter().next().map(str::to_string)
    } else {
        None
    }
}
