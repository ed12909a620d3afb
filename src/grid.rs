//! Pixel grid shared by the packer and the unpacker.
//!
//! A grid is a dense RGBA8 raster. Row 0 is the header row carrying the
//! serialized [`Metadata`]; rows `1..height` carry the payload, three bytes
//! per pixel, with the alpha channel used as an end-of-payload sentinel.

use std::fmt;

use image::{Rgba, RgbaImage};
use thiserror::Error;

/// Row holding the metadata header.
pub const HEADER_ROW: u32 = 0;

/// Payload bytes carried by one pixel (R, G, B).
pub const BYTES_PER_PIXEL: usize = 3;

/// Alpha of a header pixel or of a payload pixel carrying three bytes.
pub const ALPHA_FULL: u8 = 255;

/// Alpha of the final payload pixel when only R and G carry bytes.
pub const ALPHA_TWO_BYTES: u8 = ALPHA_FULL - 1;

/// Alpha of the final payload pixel when only R carries a byte.
pub const ALPHA_ONE_BYTE: u8 = ALPHA_FULL - 2;

/// Alpha of padding pixels after the payload.
pub const ALPHA_PADDING: u8 = 0;

/// Header field separator.
pub const SEPARATOR: char = '|';

/// A single RGBA8 pixel.
pub type Pixel = Rgba<u8>;

/// Errors that can occur when building a grid.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    #[error("Grid must have at least one column and one row, got {width}x{height}")]
    Empty { width: u32, height: u64 },

    #[error("Grid of {width}x{height} pixels does not fit in memory")]
    TooLarge { width: u32, height: u64 },
}

/// Rectangular RGBA8 pixel grid with a fixed size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelGrid {
    image: RgbaImage,
}

impl PixelGrid {
    /// Allocates a zeroed grid with `payload_rows` payload rows below the header row.
    pub fn new(width: u32, payload_rows: u64) -> Result<Self, GridError> {
        let height = payload_rows.saturating_add(1);
        if width == 0 {
            return Err(GridError::Empty { width, height });
        }

        let too_large = GridError::TooLarge { width, height };
        let rows = u32::try_from(height).map_err(|_| too_large.clone())?;
        let bytes = u64::from(width)
            .checked_mul(height)
            .and_then(|pixels| pixels.checked_mul(4))
            .ok_or_else(|| too_large.clone())?;
        if usize::try_from(bytes).is_err() {
            return Err(too_large);
        }

        Ok(Self {
            image: RgbaImage::new(width, rows),
        })
    }

    /// Adopts a decoded RGBA image as a grid.
    pub fn from_image(image: RgbaImage) -> Result<Self, GridError> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(GridError::Empty {
                width,
                height: u64::from(height),
            });
        }
        Ok(Self { image })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Total height including the header row.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Number of rows below the header row.
    pub fn payload_rows(&self) -> u32 {
        self.height() - 1
    }

    /// Channel-triplet capacity of the whole grid, header row included.
    pub fn channel_capacity(&self) -> u64 {
        u64::from(self.width()) * u64::from(self.height()) * BYTES_PER_PIXEL as u64
    }

    /// Returns the pixel at column `x`, row `y`.
    ///
    /// Panics if the coordinates are out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> &Pixel {
        self.image.get_pixel(x, y)
    }

    /// Overwrites the pixel at column `x`, row `y`.
    ///
    /// Panics if the coordinates are out of bounds.
    pub fn set_pixel(&mut self, x: u32, y: u32, pixel: Pixel) {
        self.image.put_pixel(x, y, pixel);
    }

    /// Iterates over the pixels of row `y` from left to right.
    pub fn row(&self, y: u32) -> impl Iterator<Item = &Pixel> + '_ {
        (0..self.width()).map(move |x| self.pixel(x, y))
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }
}

/// Header record stored in row 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    /// Name label, conventionally the archive file name.
    pub label: String,
    /// Payload length in bytes as written by the packer.
    pub payload_len: usize,
}

impl Metadata {
    pub fn new(label: impl Into<String>, payload_len: usize) -> Self {
        Self {
            label: label.into(),
            payload_len,
        }
    }
}

impl fmt::Display for Metadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.label, SEPARATOR, self.payload_len)
    }
}
