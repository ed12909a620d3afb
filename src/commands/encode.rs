//! Encode command - hide a directory inside a PNG image.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use veilvault::{encode_dir, EncodeOptions, VaultConfig};

use super::CommandExecutor;

/// Encode a directory into a PNG file.
///
/// The directory is archived as ZIP and the archive bytes are stored in the
/// pixels of the image. Keep the image lossless: re-saving it as JPEG or
/// through a service that recompresses images destroys the payload.
#[derive(Args, Debug)]
pub struct EncodeCommand {
    /// Directory to encode
    pub dir: PathBuf,

    /// Output PNG image
    pub image: PathBuf,

    /// Password (accepted for compatibility, no encryption is applied)
    #[arg(short, long)]
    pub password: Option<String>,

    /// Leave out entries whose relative path starts with this prefix (repeatable)
    #[arg(short, long = "exclude", value_name = "PREFIX")]
    pub excludes: Vec<String>,

    /// Grid width in pixels (overrides the config file)
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
    pub width: Option<u32>,

    /// Label stored in the image header (overrides the config file)
    #[arg(short, long)]
    pub label: Option<String>,

    /// DEFLATE level 1-9, 0 stores uncompressed (overrides the config file)
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=9))]
    pub level: Option<u8>,
}

impl CommandExecutor for EncodeCommand {
    fn execute(&self, config: &VaultConfig) -> Result<()> {
        let options = self.options(config);

        let report = encode_dir(&self.dir, &self.image, &options).with_context(|| {
            format!(
                "Error encoding directory {} into {}",
                self.dir.display(),
                self.image.display()
            )
        })?;

        println!("Directory encoded successfully into PNG!");
        println!("  Image:    {}", report.image_path.display());
        println!("  Entries:  {} ({} excluded)", report.entries, report.excluded);
        println!("  Archive:  {} bytes", report.archive_len);
        println!("  Grid:     {}x{} pixels", report.width, report.height);

        Ok(())
    }
}

impl EncodeCommand {
    /// Merges command-line flags over the configuration.
    fn options(&self, config: &VaultConfig) -> EncodeOptions {
        let mut options = EncodeOptions::from_config(config);

        if let Some(width) = self.width {
            options.width = width;
        }
        if let Some(label) = &self.label {
            options.label = label.clone();
        }
        if let Some(level) = self.level {
            options.archive.compression_level = level;
        }
        options.archive.exclude.extend(self.excludes.iter().cloned());
        options.password = self.password.clone();

        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command() -> EncodeCommand {
        EncodeCommand {
            dir: PathBuf::from("src"),
            image: PathBuf::from("out.png"),
            password: None,
            excludes: vec!["target".to_string()],
            width: None,
            label: None,
            level: None,
        }
    }

    #[test]
    fn test_config_values_used_by_default() {
        let config = VaultConfig {
            width: 128,
            exclude: vec![".git".to_string()],
            ..Default::default()
        };
        let options = command().options(&config);
        assert_eq!(options.width, 128);
        assert_eq!(options.label, "any-file.zip");
        assert_eq!(options.archive.exclude, vec![".git", "target"]);
    }

    #[test]
    fn test_flags_override_config() {
        let cmd = EncodeCommand {
            width: Some(64),
            label: Some("photos.zip".to_string()),
            level: Some(1),
            ..command()
        };
        let options = cmd.options(&VaultConfig::default());
        assert_eq!(options.width, 64);
        assert_eq!(options.label, "photos.zip");
        assert_eq!(options.archive.compression_level, 1);
    }
}
