use std::time::Duration;

use anyhow::{Result, bail};
use tracing::{info, warn};

use crate::cli::FetchArgs;
use crate::model::FetchManifest;
use crate::source::{AnnotationSource, HttpAnnotationSource};
use crate::util::{ensure_directory, now_utc_string, sha256_file, write_json_pretty};

pub fn run(args: FetchArgs) -> Result<()> {
    let cache_root = args.cache_root.clone();
    let manifest_dir = cache_root.join("manifests");
    ensure_directory(&manifest_dir)?;

    let raw_pages_path = args
        .raw_pages_path
        .clone()
        .unwrap_or_else(|| cache_root.join("raw").join("annotation_pages.json"));

    info!(
        annotation = %args.annotation,
        heading_type = %args.heading_type,
        cache_root = %cache_root.display(),
        "starting fetch"
    );

    let source = HttpAnnotationSource::new(
        &args.base_url,
        &args.annotation,
        &args.heading_type,
        Duration::from_secs(args.timeout_secs),
    )?;

    let total_pages = source.total_pages()?;
    if total_pages == 0 {
        bail!(
            "annotation service reported zero pages for {}",
            args.annotation
        );
    }

    let page_limit = match args.max_pages {
        Some(limit) => total_pages.min(limit),
        None => total_pages,
    };
    info!(total_pages, page_limit, "fetching annotation pages");

    let mut pages = Vec::with_capacity(page_limit as usize);
    let mut warnings = Vec::new();

    for page_no in 1..=page_limit {
        let page = source.page(page_no)?;

        if page.annotations.records.is_empty() {
            warn!(page = page_no, "annotation page contained no records");
            warnings.push(format!("page {page_no} contained no records"));
        }

        pages.push(page);
    }

    let record_count = pages
        .iter()
        .map(|page| page.annotations.records.len())
        .sum::<usize>();

    write_json_pretty(&raw_pages_path, &pages)?;
    let raw_pages_sha256 = sha256_file(&raw_pages_path)?;

    let manifest = FetchManifest {
        manifest_version: 1,
        generated_at: now_utc_string(),
        annotation: args.annotation.clone(),
        heading_type: args.heading_type.clone(),
        base_url: args.base_url.clone(),
        page_count: pages.len(),
        record_count,
        raw_pages_path: raw_pages_path.display().to_string(),
        raw_pages_sha256,
        warnings,
    };

    let manifest_path = manifest_dir.join("fetch_manifest.json");
    write_json_pretty(&manifest_path, &manifest)?;

    info!(path = %manifest_path.display(), "wrote fetch manifest");
    info!(
        pages = manifest.page_count,
        records = manifest.record_count,
        path = %raw_pages_path.display(),
        "fetch completed"
    );

    Ok(())
}
