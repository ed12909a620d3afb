//! # VeilVault - hide a directory inside a PNG
//!
//! VeilVault archives a directory as ZIP and stores the archive bytes in the
//! pixel channels of a PNG image. Decoding reads the bytes back out of the
//! image and restores the directory.
//!
//! ## Pixel layout
//!
//! - Row 0 is a header holding `"<label>|<length>"`, three bytes per pixel
//!   in R, G, B with alpha 255.
//! - Rows `1..` hold the payload, three bytes per pixel with alpha 255.
//! - The last payload pixel flags a partial fill: alpha 254 when only R and
//!   G carry bytes, alpha 253 when only R does.
//! - Padding pixels after the payload are `(0, 0, 0, 0)`.
//! - A grid `W` pixels wide has `ceil(len / W) + 1` rows.
//!
//! Images must travel losslessly. Any re-encoding that changes channel
//! values corrupts the payload, and nothing detects it beyond a length
//! check against the header.
//!
//! ## Example
//!
//! ```rust
//! use veilvault::{pack, unpack};
//!
//! let payload = b"PK\x03\x04 archive bytes";
//! let grid = pack("backup.zip", payload, 256).unwrap();
//! assert_eq!(grid.height(), 2);
//!
//! let unpacked = unpack(&grid).unwrap();
//! assert_eq!(unpacked.label, "backup.zip");
//! assert_eq!(unpacked.declared_len, payload.len());
//! assert_eq!(unpacked.payload, payload);
//! ```
//!
//! ## Modules
//!
//! - [`grid`]: Pixel grid and header record
//! - [`encoder`]: Packing bytes into a grid
//! - [`decoder`]: Unpacking a grid into bytes
//! - [`raster`]: PNG reading and writing
//! - [`archive`]: ZIP archives of directory trees
//! - [`config`]: `~/.veilvault/config.toml`
//! - [`vault`]: Directory ↔ PNG pipeline

/// Default grid width in pixels.
pub const DEFAULT_WIDTH: u32 = 256;

/// Default header label.
pub const DEFAULT_LABEL: &str = "any-file.zip";

pub mod archive;
pub mod config;
pub mod decoder;
pub mod encoder;
pub mod grid;
pub mod raster;
pub mod vault;

// Re-export commonly used types at the crate root
pub use archive::{build_archive, extract_archive, ArchiveError, ArchiveOptions, ExcludeFilter};
pub use config::{ConfigError, VaultConfig};
pub use decoder::{read_header, unpack, unpack_payload, DecodeError, Unpacked};
pub use encoder::{pack, EncodeError};
pub use grid::{GridError, Metadata, PixelGrid};
pub use raster::{from_png_bytes, load_png, save_png, to_png_bytes, RasterError};
pub use vault::{
    decode_image, encode_dir, inspect_image, DecodeReport, EncodeOptions, EncodeReport, ImageInfo,
    VaultError,
};
