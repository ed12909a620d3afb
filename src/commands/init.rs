//! Init command - write a configuration file with the default settings.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;

use veilvault::VaultConfig;

use super::CommandExecutor;

/// Write a configuration file holding the default settings.
#[derive(Args, Debug)]
pub struct InitCommand {
    /// Where to write the file (default: ~/.veilvault/config.toml)
    pub path: Option<PathBuf>,

    /// Overwrite an existing file
    #[arg(short, long)]
    pub force: bool,
}

impl CommandExecutor for InitCommand {
    fn execute(&self, config: &VaultConfig) -> Result<()> {
        let target = match &self.path {
            Some(path) => path.clone(),
            None => VaultConfig::config_path().context("Failed to locate config directory")?,
        };

        if target.exists() && !self.force {
            bail!(
                "Config file already exists: {} (use --force to overwrite)",
                target.display()
            );
        }

        match &self.path {
            Some(path) => config.save_to(path),
            None => config.save(),
        }
        .with_context(|| format!("Failed to write config to {}", target.display()))?;

        println!("Configuration written to {}", target.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_writes_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("veilvault").join("config.toml");
        let cmd = InitCommand {
            path: Some(path.clone()),
            force: false,
        };
        cmd.execute(&VaultConfig::default()).unwrap();

        assert_eq!(VaultConfig::load_from(&path).unwrap(), VaultConfig::default());
    }

    #[test]
    fn test_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "width = 64\n").unwrap();

        let cmd = InitCommand {
            path: Some(path.clone()),
            force: false,
        };
        assert!(cmd.execute(&VaultConfig::default()).is_err());
        assert_eq!(VaultConfig::load_from(&path).unwrap().width, 64);

        let cmd = InitCommand {
            path: Some(path.clone()),
            force: true,
        };
        cmd.execute(&VaultConfig::default()).unwrap();
        assert_eq!(VaultConfig::load_from(&path).unwrap().width, 256);
    }
}
