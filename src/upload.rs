//! The upload boundary: persists new monthly workbooks into the data
//! directory ahead of the next reload.

use crate::Result;
use anyhow::{bail, Context};
use std::path::{Path, PathBuf};
use tracing::info;

const XLSX_EXT: &str = "xlsx";

/// Stores one uploaded payload under its original filename.
///
/// Only `.xlsx` payloads are accepted; anything else is rejected without
/// touching the filesystem. The write replaces any existing file of the same
/// name, which is how a corrected month re-upload works.
pub fn store_upload(data_dir: &Path, filename: &str, contents: &[u8]) -> Result<PathBuf> {
    let name = Path::new(filename);
    if name.extension().map(|e| e == XLSX_EXT) != Some(true) {
        bail!("{filename} is not an Excel file. Only .xlsx files are supported.");
    }
    // Uploads land directly in the data directory; a path-carrying filename
    // must not escape it.
    let Some(base) = name.file_name() else {
        bail!("{filename} is not a valid file name");
    };

    let destination = data_dir.join(base);
    std::fs::write(&destination, contents)
        .with_context(|| format!("Unable to save upload to {}", destination.display()))?;
    info!("Uploaded: {}", destination.display());
    Ok(destination)
}

/// Stores a batch of uploads. Each file is accepted or rejected on its own;
/// one bad payload never blocks its siblings. Returns one message per file.
pub fn store_uploads(data_dir: &Path, files: &[(String, Vec<u8>)]) -> Vec<String> {
    files
        .iter()
        .map(|(filename, contents)| match store_upload(data_dir, filename, contents) {
            Ok(_) => format!("Uploaded: {filename}"),
            Err(e) => format!("Error processing {filename}: {e:#}"),
        })
        .collect()
}
