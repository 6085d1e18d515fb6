//! `ingest` command: runs the bulk-upload pipeline against a local file.
//!
//! The pipeline deletes the file it is given, so the command always stages a
//! private copy first.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use kirana_core::{StoreProfiles, StoreType};
use kirana_ingest::UploadRequest;
use tempfile::TempPath;

#[derive(Debug)]
pub(crate) struct IngestArgs {
    pub file: PathBuf,
    pub store_id: i64,
    pub vendor_id: i64,
    pub store_type: Option<String>,
    pub profiles: Option<PathBuf>,
}

/// Normalizes the file and prints the preview as JSON. Needs no database.
///
/// # Errors
///
/// Returns an error if the profiles or the sheet cannot be loaded.
pub(crate) async fn run_ingest_dry_run(args: &IngestArgs) -> anyhow::Result<()> {
    let profiles = load_profiles(args.profiles.as_deref())?;
    let store_type = args
        .store_type
        .as_deref()
        .map_or(StoreType::General, StoreType::from_declared);

    let request = UploadRequest {
        file: stage_copy(&args.file)?,
        store_type,
        store_id: args.store_id,
        vendor_id: args.vendor_id,
    };
    let preview = kirana_ingest::preview_bulk_upload(Arc::new(profiles), request).await?;

    println!("{}", serde_json::to_string_pretty(&preview)?);
    Ok(())
}

/// Commits the file to the store's catalog and prints the summary as JSON.
///
/// # Errors
///
/// Returns an error if the store does not exist or belong to the vendor, or
/// if loading or committing fails. Individual bad rows are reported in the
/// summary, not propagated.
pub(crate) async fn run_ingest(args: &IngestArgs) -> anyhow::Result<()> {
    let profiles = load_profiles(args.profiles.as_deref())?;
    let pool = crate::connect().await?;

    let store = kirana_db::get_store_by_id(&pool, args.store_id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("store {} not found", args.store_id))?;
    if store.vendor_id != args.vendor_id {
        anyhow::bail!(
            "store {} does not belong to vendor {}",
            args.store_id,
            args.vendor_id
        );
    }

    let store_type = args
        .store_type
        .as_deref()
        .map_or_else(|| store.store_type(), StoreType::from_declared);

    let request = UploadRequest {
        file: stage_copy(&args.file)?,
        store_type,
        store_id: store.id,
        vendor_id: args.vendor_id,
    };
    let summary = kirana_ingest::run_bulk_upload(&pool, Arc::new(profiles), request).await?;
    println!("{}", serde_json::to_string_pretty(&summary)?);

    let total = kirana_db::count_catalog_entries(&pool, store.id).await?;
    println!("store {} now has {total} active catalog entries", store.id);
    Ok(())
}

fn load_profiles(path: Option<&Path>) -> anyhow::Result<StoreProfiles> {
    match path {
        Some(path) => Ok(kirana_core::load_store_profiles(path)?),
        None => Ok(StoreProfiles::builtin()),
    }
}

/// Copies `source` into a temp file that keeps its extension, so the sheet
/// loader picks the same format.
pub(crate) fn stage_copy(source: &Path) -> anyhow::Result<TempPath> {
    let suffix = source
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{ext}"))
        .unwrap_or_default();

    let mut staged = tempfile::Builder::new()
        .prefix("kirana-ingest-")
        .suffix(&suffix)
        .tempfile()?;
    let mut original = std::fs::File::open(source)
        .with_context(|| format!("failed to open {}", source.display()))?;
    std::io::copy(&mut original, &mut staged)?;

    Ok(staged.into_temp_path())
}
