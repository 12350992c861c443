//! Config command implementation.

use crate::cli::{ConfigAction, Output};
use crate::config::Settings;
use anyhow::Result;
use std::path::Path;

/// Run the config command against the file at `config_path`.
///
/// Only `show` parses the file, so `path` and `init --force` still work when it is malformed.
pub fn run_config(action: &ConfigAction, config_path: &Path) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let settings = Settings::load_from(Some(config_path))?;
            let toml_str = toml::to_string_pretty(&settings)
                .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;
            println!("{}", toml_str);
        }

        ConfigAction::Path => {
            println!("{}", config_path.display());
        }

        ConfigAction::Init { force } => {
            if config_path.exists() && !force {
                Output::warning(&format!(
                    "Config already exists at {}. Use --force to overwrite.",
                    config_path.display()
                ));
                return Ok(());
            }
            Settings::default().save_to(config_path)?;
            Output::success(&format!("Wrote default config to {}", config_path.display()));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_writes_loadable_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        run_config(&ConfigAction::Init { force: false }, &path).unwrap();
        let loaded = Settings::load_from(Some(path.as_path())).unwrap();
        assert_eq!(loaded.model.default_model, Settings::default().model.default_model);
    }

    #[test]
    fn test_init_keeps_existing_file_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[agent]\nmax_turns = 3\n").unwrap();

        run_config(&ConfigAction::Init { force: false }, &path).unwrap();
        assert_eq!(Settings::load_from(Some(path.as_path())).unwrap().agent.max_turns, 3);

        run_config(&ConfigAction::Init { force: true }, &path).unwrap();
        assert_eq!(Settings::load_from(Some(path.as_path())).unwrap().agent.max_turns, 10);
    }

    #[test]
    fn test_init_force_replaces_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "this is [not toml\n").unwrap();

        assert!(run_config(&ConfigAction::Show, &path).is_err());
        run_config(&ConfigAction::Path, &path).unwrap();
        run_config(&ConfigAction::Init { force: true }, &path).unwrap();

        let loaded = Settings::load_from(Some(path.as_path())).unwrap();
        assert_eq!(loaded.agent.max_turns, 10);
    }
}
