//! Inspect command - show the header of an encoded image.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use veilvault::{inspect_image, VaultConfig};

use super::CommandExecutor;

/// Show the header and payload size of an encoded PNG without extracting it.
#[derive(Args, Debug)]
pub struct InspectCommand {
    /// PNG image produced by `encode`
    pub image: PathBuf,
}

impl CommandExecutor for InspectCommand {
    fn execute(&self, _config: &VaultConfig) -> Result<()> {
        let info = inspect_image(&self.image)
            .with_context(|| format!("Failed to inspect {}", self.image.display()))?;

        println!("Image:     {}", self.image.display());
        println!("  Grid:      {}x{} pixels", info.width, info.height);
        println!("  Label:     {}", info.label);
        println!("  Declared:  {} bytes", info.declared_len);
        println!("  Recovered: {} bytes", info.recovered_len);
        if !info.is_consistent() {
            println!("  WARNING: payload length does not match the header");
        }

        Ok(())
    }
}
