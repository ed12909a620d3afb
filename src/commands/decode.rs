//! Decode command - restore a directory from a PNG image.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use veilvault::{decode_image, VaultConfig};

use super::CommandExecutor;

/// Decode a PNG file back into a directory.
#[derive(Args, Debug)]
pub struct DecodeCommand {
    /// PNG image produced by `encode`
    pub image: PathBuf,

    /// Directory to restore into (created if missing)
    pub output: PathBuf,

    /// Password (accepted for compatibility, no decryption is applied)
    #[arg(short, long)]
    pub password: Option<String>,
}

impl CommandExecutor for DecodeCommand {
    fn execute(&self, _config: &VaultConfig) -> Result<()> {
        let report = decode_image(&self.image, &self.output, self.password.as_deref())
            .with_context(|| format!("Error decoding PNG file {}", self.image.display()))?;

        println!("PNG file decoded successfully into directory!");
        println!("  Label:    {}", report.label);
        println!("  Archive:  {} bytes", report.archive_len);
        println!(
            "  Restored: {} files, {} directories into {}",
            report.files,
            report.directories,
            self.output.display()
        );

        Ok(())
    }
}
