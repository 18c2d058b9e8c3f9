//! Init command handler.

use crate::commands::Out;
use crate::{Config, Result};
use std::path::Path;

/// Creates the budget home directory, its data directory, and an initial
/// `config.json` with default policy settings.
///
/// # Errors
///
/// - Returns an error if the directories or the config file cannot be
///   created.
pub fn init(home: &Path) -> Result<Out<()>> {
    let config = Config::create(home)?;
    Ok(Out::new_message(format!(
        "Initialized budget home at {}. Drop monthly .xlsx files into {} and run 'budget load'.",
        config.root().display(),
        config.data_dir().display()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_creates_home() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("budget_home");
        let out = init(&home).unwrap();
        assert!(out.message().contains("Initialized budget home"));
        assert!(home.join("config.json").is_file());
        assert!(home.join("data").is_dir());
    }
}
