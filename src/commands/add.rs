//! Add command handler.

use crate::args::AddArgs;
use crate::commands::Out;
use crate::upload::store_uploads;
use crate::{Config, Result};
use anyhow::Context;

/// Copies workbook files into the data directory through the upload
/// boundary. Each file is accepted or rejected on its own; the next
/// `budget load` picks up whatever was accepted.
///
/// # Errors
///
/// - Returns an error if a source file cannot be read at all. Rejections
///   (wrong extension) are reported in the output, not raised.
pub fn add(config: Config, args: AddArgs) -> Result<Out<Vec<String>>> {
    let mut files = Vec::with_capacity(args.files().len());
    for path in args.files() {
        let contents = std::fs::read(path)
            .with_context(|| format!("Unable to read {}", path.display()))?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        files.push((filename, contents));
    }

    let messages = store_uploads(config.data_dir(), &files);
    let accepted = messages.iter().filter(|m| m.starts_with("Uploaded")).count();
    let message = format!(
        "Added {} of {} file{} to {}",
        accepted,
        messages.len(),
        if messages.len() == 1 { "" } else { "s" },
        config.data_dir().display()
    );
    Ok(Out::new(message, messages))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::test_config;

    #[test]
    fn test_add_copies_and_rejects_per_file() {
        let (dir, config) = test_config();
        let good = dir.path().join("Jan.xlsx");
        let bad = dir.path().join("Feb.csv");
        std::fs::write(&good, b"workbook bytes").unwrap();
        std::fs::write(&bad, b"csv bytes").unwrap();

        let out = add(config.clone(), AddArgs::new(vec![good, bad])).unwrap();
        assert!(out.message().contains("Added 1 of 2 files"));
        assert!(config.data_dir().join("Jan.xlsx").is_file());
        assert!(!config.data_dir().join("Feb.csv").exists());

        let messages = out.structure().unwrap();
        assert!(messages[1].contains("Only .xlsx files are supported"));
    }

    #[test]
    fn test_add_missing_source_is_an_error() {
        let (dir, config) = test_config();
        let result = add(config, AddArgs::new(vec![dir.path().join("nope.xlsx")]));
        assert!(result.is_err());
    }
}
