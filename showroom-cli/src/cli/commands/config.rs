//! `config` command: show, locate or create the config file

use std::fs;
use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use colored::*;

use crate::cli::ConfigCommands;
use crate::config::Config;

pub fn handle_config_command(command: ConfigCommands, explicit: Option<&Path>) -> Result<ExitCode> {
    match command {
        ConfigCommands::Show => {
            let config = Config::load(explicit)?;
            print!("{}", config.to_toml()?);
        }
        ConfigCommands::Path => {
            let path = resolve_path(explicit)?;
            let status = if path.exists() {
                "exists".green()
            } else {
                "not created".yellow()
            };
            println!("{} ({})", path.display(), status);
        }
        ConfigCommands::Init { force } => {
            let path = resolve_path(explicit)?;
            init_config(&path, force)?;
            println!("{} {}", "Wrote".green(), path.display());
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn resolve_path(explicit: Option<&Path>) -> Result<std::path::PathBuf> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => Config::default_path().context("Could not determine the config directory"),
    }
}

/// Write a default config to `path`, creating parent directories
pub fn init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    fs::write(path, Config::default().to_toml()?)
        .with_context(|| format!("Failed to write config file: {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_writes_loadable_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        init_config(&path, false).unwrap();
        assert_eq!(Config::from_file(&path).unwrap(), Config::default());

        assert!(init_config(&path, false).is_err());
        init_config(&path, true).unwrap();
    }
}
