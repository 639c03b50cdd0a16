//! Package (.pck) unpacking

use crate::output::OutputSet;
use anyhow::{Context, Result};
use std::path::Path;
use vato_formats::package::extract;

/// Member files of a package, placed in `dir`
///
/// `stem` is the package file name without its extension and names flat
/// members `{stem}_{index}.{ext}`.
pub fn export_package(data: &[u8], stem: &str, dir: &Path) -> Result<OutputSet> {
    let files = extract(data, stem).with_context(|| format!("Failed to unpack {stem}.pck"))?;
    tracing::info!("Unpacking {stem}.pck ({} files)", files.len());

    let mut outputs = OutputSet::new();
    for file in files {
        outputs.add(dir.join(&file.path), file.data.to_vec());
    }
    Ok(outputs)
}
