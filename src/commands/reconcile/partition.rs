use std::collections::BTreeMap;

use crate::model::{CleanEntity, PartitionSet, RawRecord, ResolvedRecord};

use super::consistency::{ReconcileOptions, reconcile_entity};
use super::normalize::{RecordNormalizer, is_single_valued};

#[derive(Debug, Default)]
pub struct PipelineStats {
    pub entities_single_identifier: usize,
    pub entities_ambiguous_identifier: usize,
    pub report_strings_seen: usize,
    pub multi_valued_strings_skipped: usize,
    pub readings_extracted: usize,
    pub groups_accepted: usize,
    pub groups_rejected: usize,
}

#[derive(Debug, Default)]
pub struct PipelineOutcome {
    pub partitions: PartitionSet,
    pub stats: PipelineStats,
}

pub fn run_pipeline(
    records: &BTreeMap<String, RawRecord>,
    normalizer: &RecordNormalizer,
    options: &ReconcileOptions,
) -> PipelineOutcome {
    let mut outcome = PipelineOutcome::default();

    for (name, record) in records {
        if record.identifiers.len() != 1 {
            outcome.stats.entities_ambiguous_identifier += 1;
            outcome
                .partitions
                .ambiguous_identifier
                .insert(name.clone(), record.clone());
            continue;
        }

        outcome.stats.entities_single_identifier += 1;
        let resolved = ResolvedRecord {
            identifier: record.identifiers[0],
            reports: record.reports.clone(),
        };

        outcome.stats.report_strings_seen += resolved.reports.len();
        outcome.stats.multi_valued_strings_skipped += resolved
            .reports
            .iter()
            .filter(|report| !is_single_valued(report))
            .count();

        let readings = normalizer.normalize(&resolved.reports);
        outcome.stats.readings_extracted += readings.len();

        if readings.is_empty() {
            outcome.partitions.unparsable.insert(name.clone(), resolved);
            continue;
        }

        let reconciliation = reconcile_entity(&readings, options);
        outcome.stats.groups_accepted += reconciliation.accepted.len();
        outcome.stats.groups_rejected +=
            reconciliation.groups_total - reconciliation.accepted.len();

        if reconciliation.accepted.is_empty() {
            outcome
                .partitions
                .inconsistent
                .insert(name.clone(), resolved);
        } else {
            outcome.partitions.clean.insert(
                name.clone(),
                CleanEntity {
                    identifier: resolved.identifier,
                    readings: reconciliation.accepted,
                },
            );
        }
    }

    outcome
}
