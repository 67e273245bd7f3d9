use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub reports: Vec<String>,
    pub identifiers: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedRecord {
    pub identifier: i64,
    pub reports: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReconciledReading {
    pub temperature_c: f64,
    pub pressure_atm: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanEntity {
    pub identifier: i64,
    pub readings: Vec<ReconciledReading>,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorReason {
    MissingValueField,
    MissingIdentifier,
    DuplicateName,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceError {
    pub entity_name: String,
    pub page: u32,
    pub record_index: usize,
    pub reason: ErrorReason,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartitionSet {
    pub clean: BTreeMap<String, CleanEntity>,
    pub ambiguous_identifier: BTreeMap<String, RawRecord>,
    pub unparsable: BTreeMap<String, ResolvedRecord>,
    pub inconsistent: BTreeMap<String, ResolvedRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchManifest {
    pub manifest_version: u32,
    pub generated_at: String,
    pub annotation: String,
    pub heading_type: String,
    pub base_url: String,
    pub page_count: usize,
    pub record_count: usize,
    pub raw_pages_path: String,
    pub raw_pages_sha256: String,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcileOptionsEcho {
    pub max_std_dev: f64,
    pub grouping: String,
    pub multi_record: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcilePaths {
    pub cache_root: String,
    pub manifest_dir: String,
    pub raw_pages_path: String,
    pub output_dir: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReconcileCounts {
    pub pages: usize,
    pub wire_records: usize,
    pub entities_aggregated: usize,
    pub entities_single_identifier: usize,
    pub entities_ambiguous_identifier: usize,
    pub entities_clean: usize,
    pub entities_unparsable: usize,
    pub entities_inconsistent: usize,
    pub report_strings_seen: usize,
    pub multi_valued_strings_skipped: usize,
    pub readings_extracted: usize,
    pub groups_accepted: usize,
    pub groups_rejected: usize,
    pub source_errors: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcileRunManifest {
    pub manifest_version: u32,
    pub run_id: String,
    pub status: String,
    pub started_at: String,
    pub updated_at: String,
    pub options: ReconcileOptionsEcho,
    pub paths: ReconcilePaths,
    pub raw_pages_sha256: String,
    pub counts: ReconcileCounts,
    pub warnings: Vec<String>,
}
