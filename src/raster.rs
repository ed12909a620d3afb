//! PNG serialization of pixel grids.
//!
//! Grids are written as 8-bit RGBA PNG. PNG is lossless and stores straight
//! (non-premultiplied) alpha, so every channel value survives a round trip,
//! including the RGB of fully transparent pixels.

use std::fs;
use std::io::Cursor;
use std::path::Path;

use image::ImageFormat;
use thiserror::Error;

use crate::grid::{GridError, PixelGrid};

/// Errors that can occur while reading or writing PNG images.
#[derive(Error, Debug)]
pub enum RasterError {
    #[error("Image load error: {0}")]
    Load(String),

    #[error("Image save error: {0}")]
    Save(String),

    #[error("Invalid grid: {0}")]
    Grid(#[from] GridError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Writes `grid` to `path` as PNG, whatever the file extension.
pub fn save_png<P: AsRef<Path>>(grid: &PixelGrid, path: P) -> Result<(), RasterError> {
    let bytes = to_png_bytes(grid)?;
    fs::write(path, bytes)?;
    Ok(())
}

/// Encodes `grid` as PNG bytes.
pub fn to_png_bytes(grid: &PixelGrid) -> Result<Vec<u8>, RasterError> {
    let mut bytes = Vec::new();
    grid.image()
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|e| RasterError::Save(e.to_string()))?;
    Ok(bytes)
}

/// Reads a PNG file into a grid.
pub fn load_png<P: AsRef<Path>>(path: P) -> Result<PixelGrid, RasterError> {
    let bytes = fs::read(path)?;
    from_png_bytes(&bytes)
}

/// Decodes PNG bytes into a grid, converting other color types to RGBA8.
pub fn from_png_bytes(bytes: &[u8]) -> Result<PixelGrid, RasterError> {
    let image = image::load_from_memory_with_format(bytes, ImageFormat::Png)
        .map_err(|e| RasterError::Load(e.to_string()))?;
    Ok(PixelGrid::from_image(image.into_rgba8())?)
}
