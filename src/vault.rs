//! Directory ↔ PNG pipeline.
//!
//! Encoding: archive the directory, pack the archive bytes into a grid,
//! write the grid as PNG. Decoding: read the PNG, unpack the grid, check the
//! recovered length against the header, extract the archive.
//!
//! A password is accepted for command-line compatibility only. Nothing is
//! encrypted.

use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use thiserror::Error;

use crate::archive::{build_archive, extract_archive, ArchiveError, ArchiveOptions};
use crate::config::VaultConfig;
use crate::decoder::{unpack, DecodeError};
use crate::encoder::{pack, EncodeError};
use crate::raster::{load_png, save_png, RasterError};

/// Errors that can occur in the end-to-end pipeline.
#[derive(Error, Debug)]
pub enum VaultError {
    #[error("Archive error: {0}")]
    Archive(#[from] ArchiveError),

    #[error("Encoding error: {0}")]
    Encode(#[from] EncodeError),

    #[error("Decoding error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Image error: {0}")]
    Raster(#[from] RasterError),

    #[error("Payload length mismatch: header declares {declared} bytes, image holds {recovered}")]
    LengthMismatch { declared: usize, recovered: usize },
}

/// Options for [`encode_dir`].
#[derive(Debug, Clone)]
pub struct EncodeOptions {
    /// Grid width in pixels.
    pub width: u32,
    /// Label written into the header row.
    pub label: String,
    /// Archive settings.
    pub archive: ArchiveOptions,
    /// Accepted and ignored.
    pub password: Option<String>,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self::from_config(&VaultConfig::default())
    }
}

impl EncodeOptions {
    pub fn from_config(config: &VaultConfig) -> Self {
        Self {
            width: config.width,
            label: config.label.clone(),
            archive: config.archive_options(),
            password: None,
        }
    }
}

/// Summary of an encode run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeReport {
    pub image_path: PathBuf,
    /// Archive size in bytes.
    pub archive_len: usize,
    /// Archived files and directories.
    pub entries: usize,
    /// Entries left out by the exclude filter.
    pub excluded: usize,
    pub width: u32,
    pub height: u32,
}

/// Summary of a decode run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeReport {
    pub label: String,
    /// Archive size in bytes.
    pub archive_len: usize,
    pub files: usize,
    pub directories: usize,
}

/// Header and payload facts about an encoded image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub label: String,
    pub declared_len: usize,
    pub recovered_len: usize,
}

impl ImageInfo {
    /// True if the recovered payload has the declared length.
    pub fn is_consistent(&self) -> bool {
        self.declared_len == self.recovered_len
    }
}

/// Encodes the directory `dir` into the PNG image `image_path`.
pub fn encode_dir(
    dir: &Path,
    image_path: &Path,
    options: &EncodeOptions,
) -> Result<EncodeReport, VaultError> {
    warn_unused_password(options.password.as_deref());

    let archive = build_archive(dir, &options.archive)?;
    info!(
        "archived {} entries ({} bytes) from {}",
        archive.entries,
        archive.bytes.len(),
        dir.display()
    );

    let grid = pack(&options.label, &archive.bytes, options.width)?;
    save_png(&grid, image_path)?;
    debug!("wrote {}x{} image to {}", grid.width(), grid.height(), image_path.display());

    Ok(EncodeReport {
        image_path: image_path.to_path_buf(),
        archive_len: archive.bytes.len(),
        entries: archive.entries,
        excluded: archive.excluded,
        width: grid.width(),
        height: grid.height(),
    })
}

/// Decodes the PNG image `image_path` into the directory `out_dir`.
pub fn decode_image(
    image_path: &Path,
    out_dir: &Path,
    password: Option<&str>,
) -> Result<DecodeReport, VaultError> {
    warn_unused_password(password);

    let grid = load_png(image_path)?;
    debug!("read {}x{} image from {}", grid.width(), grid.height(), image_path.display());

    let unpacked = unpack(&grid)?;
    if unpacked.payload.len() != unpacked.declared_len {
        return Err(VaultError::LengthMismatch {
            declared: unpacked.declared_len,
            recovered: unpacked.payload.len(),
        });
    }

    let summary = extract_archive(&unpacked.payload, out_dir)?;
    info!(
        "restored {} files and {} directories from '{}'",
        summary.files, summary.directories, unpacked.label
    );

    Ok(DecodeReport {
        label: unpacked.label,
        archive_len: unpacked.payload.len(),
        files: summary.files,
        directories: summary.directories,
    })
}

/// Reads the header and payload of an encoded image without extracting it.
pub fn inspect_image(image_path: &Path) -> Result<ImageInfo, VaultError> {
    let grid = load_png(image_path)?;
    let unpacked = unpack(&grid)?;

    Ok(ImageInfo {
        width: grid.width(),
        height: grid.height(),
        label: unpacked.label,
        declared_len: unpacked.declared_len,
        recovered_len: unpacked.payload.len(),
    })
}

fn warn_unused_password(password: Option<&str>) {
    if password.is_some_and(|p| !p.is_empty()) {
        warn!("password given but not used: images are not encrypted");
    }
}
