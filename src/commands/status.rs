use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::cli::StatusArgs;
use crate::model::{FetchManifest, ReconcileRunManifest};
use crate::util::read_json;

pub fn run(args: StatusArgs) -> Result<()> {
    let manifest_dir = args.cache_root.join("manifests");
    let fetch_manifest_path = manifest_dir.join("fetch_manifest.json");

    info!(cache_root = %args.cache_root.display(), "status requested");

    if fetch_manifest_path.exists() {
        let manifest: FetchManifest = read_json(&fetch_manifest_path)?;

        info!(
            generated_at = %manifest.generated_at,
            annotation = %manifest.annotation,
            heading_type = %manifest.heading_type,
            pages = manifest.page_count,
            records = manifest.record_count,
            raw_pages_path = %manifest.raw_pages_path,
            raw_pages_sha256 = %manifest.raw_pages_sha256,
            "loaded fetch manifest"
        );
    } else {
        warn!(path = %fetch_manifest_path.display(), "fetch manifest missing");
    }

    match latest_reconcile_manifest(&manifest_dir)? {
        Some(path) => {
            let manifest: ReconcileRunManifest = read_json(&path)?;

            info!(
                run_id = %manifest.run_id,
                status = %manifest.status,
                started_at = %manifest.started_at,
                updated_at = %manifest.updated_at,
                max_std_dev = manifest.options.max_std_dev,
                grouping = %manifest.options.grouping,
                multi_record = %manifest.options.multi_record,
                entities = manifest.counts.entities_aggregated,
                clean = manifest.counts.entities_clean,
                ambiguous_identifier = manifest.counts.entities_ambiguous_identifier,
                unparsable = manifest.counts.entities_unparsable,
                inconsistent = manifest.counts.entities_inconsistent,
                source_errors = manifest.counts.source_errors,
                "loaded reconcile run manifest"
            );
        }
        None => {
            warn!(dir = %manifest_dir.display(), "no reconcile run manifest found");
        }
    }

    Ok(())
}

fn latest_reconcile_manifest(manifest_dir: &Path) -> Result<Option<PathBuf>> {
    if !manifest_dir.exists() {
        return Ok(None);
    }

    let mut manifests = Vec::new();

    let entries = fs::read_dir(manifest_dir)
        .with_context(|| format!("failed to read {}", manifest_dir.display()))?;

    for entry in entries {
        let entry = entry
            .with_context(|| format!("failed to read entry in {}", manifest_dir.display()))?;
        let path = entry.path();

        let is_run_manifest = path
            .file_name()
            .and_then(|name| name.to_str())
            .map(|name| name.starts_with("reconcile_run_") && name.ends_with(".json"))
            .unwrap_or(false);

        if is_run_manifest {
            manifests.push(path);
        }
    }

    manifests.sort();
    Ok(manifests.pop())
}
