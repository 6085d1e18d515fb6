use std::path::PathBuf;

use kirana_core::{StoreProfiles, TemplateKind};

/// Writes the template for `kind` to `out`, or `<kind>-template.xlsx` in the
/// working directory.
///
/// # Errors
///
/// Returns an error for an unknown template type or if the workbook cannot
/// be generated or written.
pub(crate) fn run_template(kind: &str, out: Option<PathBuf>) -> anyhow::Result<()> {
    let kind = TemplateKind::parse(kind).ok_or_else(|| {
        anyhow::anyhow!(
            "unknown template type {kind:?}; expected general, grocery, medical or restaurant"
        )
    })?;

    let bytes = kirana_ingest::generate_template(kind, &StoreProfiles::builtin())?;
    let out = out.unwrap_or_else(|| PathBuf::from(kind.file_name()));
    std::fs::write(&out, &bytes)?;

    println!("wrote {} ({} bytes)", out.display(), bytes.len());
    Ok(())
}
