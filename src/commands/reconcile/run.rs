use anyhow::{Result, bail};
use chrono::Utc;
use tracing::info;

use crate::cli::ReconcileArgs;
use crate::model::{
    ReconcileCounts, ReconcileOptionsEcho, ReconcilePaths, ReconcileRunManifest,
};
use crate::source::{AnnotationPage, aggregate_pages};
use crate::util::{
    ensure_directory, now_utc_string, read_json, sha256_file, utc_compact_string,
    write_json_pretty,
};

use super::consistency::ReconcileOptions;
use super::normalize::RecordNormalizer;
use super::partition::run_pipeline;

pub fn run(args: ReconcileArgs) -> Result<()> {
    let started_ts = Utc::now();
    let started_at = now_utc_string();
    let run_id = format!("run-{}", utc_compact_string(started_ts));

    let cache_root = args.cache_root.clone();
    let manifest_dir = cache_root.join("manifests");
    ensure_directory(&manifest_dir)?;

    let raw_pages_path = args
        .raw_pages_path
        .clone()
        .unwrap_or_else(|| cache_root.join("raw").join("annotation_pages.json"));
    let output_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| cache_root.join("partitions"));
    let run_manifest_path = args.run_manifest_path.clone().unwrap_or_else(|| {
        manifest_dir.join(format!(
            "reconcile_run_{}.json",
            utc_compact_string(started_ts)
        ))
    });

    info!(cache_root = %cache_root.display(), run_id = %run_id, "starting reconcile");

    if !raw_pages_path.exists() {
        bail!(
            "raw pages artifact missing: {} (run the fetch command first)",
            raw_pages_path.display()
        );
    }

    let pages: Vec<AnnotationPage> = read_json(&raw_pages_path)?;
    let raw_pages_sha256 = sha256_file(&raw_pages_path)?;
    let wire_records = pages
        .iter()
        .map(|page| page.annotations.records.len())
        .sum::<usize>();

    let aggregation = aggregate_pages(&pages, args.multi_record);
    info!(
        pages = pages.len(),
        wire_records,
        entities = aggregation.records.len(),
        source_errors = aggregation.errors.len(),
        "aggregated annotation records"
    );

    let normalizer = RecordNormalizer::new()?;
    let options = ReconcileOptions {
        max_group_std_dev: args.max_std_dev,
        grouping: args.grouping,
    };
    let outcome = run_pipeline(&aggregation.records, &normalizer, &options);

    ensure_directory(&output_dir)?;
    write_json_pretty(&output_dir.join("clean.json"), &outcome.partitions.clean)?;
    write_json_pretty(
        &output_dir.join("ambiguous_identifier.json"),
        &outcome.partitions.ambiguous_identifier,
    )?;
    write_json_pretty(
        &output_dir.join("unparsable.json"),
        &outcome.partitions.unparsable,
    )?;
    write_json_pretty(
        &output_dir.join("inconsistent.json"),
        &outcome.partitions.inconsistent,
    )?;
    write_json_pretty(&output_dir.join("errors.json"), &aggregation.errors)?;

    let updated_at = now_utc_string();
    let manifest = ReconcileRunManifest {
        manifest_version: 1,
        run_id: run_id.clone(),
        status: "completed".to_string(),
        started_at,
        updated_at,
        options: ReconcileOptionsEcho {
            max_std_dev: args.max_std_dev,
            grouping: args.grouping.as_str().to_string(),
            multi_record: args.multi_record.as_str().to_string(),
        },
        paths: ReconcilePaths {
            cache_root: cache_root.display().to_string(),
            manifest_dir: manifest_dir.display().to_string(),
            raw_pages_path: raw_pages_path.display().to_string(),
            output_dir: output_dir.display().to_string(),
        },
        raw_pages_sha256,
        counts: ReconcileCounts {
            pages: pages.len(),
            wire_records,
            entities_aggregated: aggregation.records.len(),
            entities_single_identifier: outcome.stats.entities_single_identifier,
            entities_ambiguous_identifier: outcome.stats.entities_ambiguous_identifier,
            entities_clean: outcome.partitions.clean.len(),
            entities_unparsable: outcome.partitions.unparsable.len(),
            entities_inconsistent: outcome.partitions.inconsistent.len(),
            report_strings_seen: outcome.stats.report_strings_seen,
            multi_valued_strings_skipped: outcome.stats.multi_valued_strings_skipped,
            readings_extracted: outcome.stats.readings_extracted,
            groups_accepted: outcome.stats.groups_accepted,
            groups_rejected: outcome.stats.groups_rejected,
            source_errors: aggregation.errors.len(),
        },
        warnings: Vec::new(),
    };

    write_json_pretty(&run_manifest_path, &manifest)?;

    info!(path = %run_manifest_path.display(), "wrote reconcile run manifest");
    info!(
        clean = outcome.partitions.clean.len(),
        ambiguous_identifier = outcome.partitions.ambiguous_identifier.len(),
        unparsable = outcome.partitions.unparsable.len(),
        inconsistent = outcome.partitions.inconsistent.len(),
        source_errors = aggregation.errors.len(),
        "reconcile completed"
    );

    Ok(())
}
