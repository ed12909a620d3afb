//! Packing of a byte stream into a pixel grid.
//!
//! Layout:
//! 1. Row 0 holds the header text `"<label>|<len>"`, three bytes per pixel
//!    (R, G, B) with alpha 255. Columns past the header are left zero.
//! 2. Rows `1..=H` hold the payload, three bytes per pixel with alpha 255.
//!    The final pixel marks a partial fill with alpha 254 (R, G) or 253 (R).
//! 3. Every pixel after the payload is padding `(0, 0, 0, 0)`.
//!
//! The number of payload rows is `H = ceil(len / width)`, i.e. sized as if a
//! pixel carried a single byte. Grids are therefore about three times larger
//! than strictly needed; the unpacker relies on the padding that follows.

use image::Rgba;
use log::debug;
use thiserror::Error;

use crate::grid::{
    GridError, Metadata, PixelGrid, ALPHA_FULL, ALPHA_ONE_BYTE, ALPHA_TWO_BYTES, BYTES_PER_PIXEL,
    HEADER_ROW,
};

/// Errors that can occur during packing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("Grid width must be at least 1")]
    ZeroWidth,

    #[error("Grid error: {0}")]
    Grid(#[from] GridError),
}

/// Number of payload rows for `len` bytes at `width` columns.
///
/// Returns `None` if `width` is zero.
pub fn payload_rows(len: usize, width: u32) -> Option<u64> {
    let width = u64::from(width);
    if width == 0 {
        return None;
    }
    Some((len as u64).div_ceil(width))
}

/// Packs `payload` under `label` into a grid `width` pixels wide.
///
/// The header is written as-is: a label containing `|`, or a header longer
/// than `width * 3` bytes, produces a grid whose header does not read back
/// intact. Neither case is reported.
///
/// # Errors
/// Returns [`EncodeError::ZeroWidth`] for a zero width and
/// [`EncodeError::Grid`] when the derived grid cannot be allocated.
pub fn pack(label: &str, payload: &[u8], width: u32) -> Result<PixelGrid, EncodeError> {
    let rows = payload_rows(payload.len(), width).ok_or(EncodeError::ZeroWidth)?;
    let mut grid = PixelGrid::new(width, rows)?;

    debug!(
        "packing {} bytes as '{}' into a {}x{} grid",
        payload.len(),
        label,
        grid.width(),
        grid.height()
    );

    write_header(&mut grid, &Metadata::new(label, payload.len()));
    write_payload(&mut grid, payload);

    Ok(grid)
}

/// Writes the header text into row 0, truncating at the grid width.
fn write_header(grid: &mut PixelGrid, meta: &Metadata) {
    let text = meta.to_string();
    let columns = text.as_bytes().chunks(BYTES_PER_PIXEL).take(grid.width() as usize);

    for (x, chunk) in (0u32..).zip(columns) {
        let mut rgb = [0u8; BYTES_PER_PIXEL];
        rgb[..chunk.len()].copy_from_slice(chunk);
        grid.set_pixel(x, HEADER_ROW, Rgba([rgb[0], rgb[1], rgb[2], ALPHA_FULL]));
    }
}

/// Writes the payload row-major from row 1. Padding pixels are left zeroed.
fn write_payload(grid: &mut PixelGrid, payload: &[u8]) {
    let mut chunks = payload.chunks(BYTES_PER_PIXEL);

    'rows: for y in 1..grid.height() {
        for x in 0..grid.width() {
            let Some(chunk) = chunks.next() else {
                break 'rows;
            };
            grid.set_pixel(x, y, payload_pixel(chunk));
        }
    }
}

/// Maps up to three payload bytes onto one pixel, flagging partial fills in alpha.
fn payload_pixel(chunk: &[u8]) -> Rgba<u8> {
    match *chunk {
        [r, g, b] => Rgba([r, g, b, ALPHA_FULL]),
        [r, g] => Rgba([r, g, 0, ALPHA_TWO_BYTES]),
        [r] => Rgba([r, 0, 0, ALPHA_ONE_BYTE]),
        _ => Rgba([0, 0, 0, 0]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::ALPHA_PADDING;

    #[test]
    fn test_payload_rows_rounds_up() {
        assert_eq!(payload_rows(0, 256), Some(0));
        assert_eq!(payload_rows(1, 256), Some(1));
        assert_eq!(payload_rows(256, 256), Some(1));
        assert_eq!(payload_rows(257, 256), Some(2));
        assert_eq!(payload_rows(10, 0), None);
    }

    #[test]
    fn test_zero_width() {
        assert_eq!(pack("x", b"abc", 0), Err(EncodeError::ZeroWidth));
    }

    #[test]
    fn test_grid_height_matches_byte_per_column_rule() {
        let data = vec![7u8; 1000];
        let grid = pack("any-file.zip", &data, 256).unwrap();
        assert_eq!(grid.width(), 256);
        assert_eq!(grid.height(), 4 + 1);
    }

    #[test]
    fn test_empty_payload_has_only_header_row() {
        let grid = pack("empty.zip", &[], 16).unwrap();
        assert_eq!(grid.height(), 1);
    }

    #[test]
    fn test_header_row_layout() {
        let grid = pack("a.txt", &[0x41, 0x42, 0x43, 0x44], 4).unwrap();
        // "a.txt|4"
        assert_eq!(grid.pixel(0, 0).0, [b'a', b'.', b't', 255]);
        assert_eq!(grid.pixel(1, 0).0, [b'x', b't', b'|', 255]);
        assert_eq!(grid.pixel(2, 0).0, [b'4', 0, 0, 255]);
        assert_eq!(grid.pixel(3, 0).0, [0, 0, 0, 0]);
    }

    #[test]
    fn test_header_truncated_at_width() {
        let grid = pack("a.txt", &[0x41, 0x42, 0x43, 0x44], 2).unwrap();
        assert_eq!(grid.height(), 3);
        assert_eq!(grid.pixel(0, 0).0, [b'a', b'.', b't', 255]);
        assert_eq!(grid.pixel(1, 0).0, [b'x', b't', b'|', 255]);
    }

    #[test]
    fn test_reference_layout() {
        let grid = pack("a.txt", &[0x41, 0x42, 0x43, 0x44], 2).unwrap();
        assert_eq!(grid.pixel(0, 1).0, [0x41, 0x42, 0x43, 255]);
        assert_eq!(grid.pixel(1, 1).0, [0x44, 0, 0, 253]);
        assert_eq!(grid.pixel(0, 2).0, [0, 0, 0, 0]);
        assert_eq!(grid.pixel(1, 2).0, [0, 0, 0, 0]);
    }

    #[test]
    fn test_sentinel_alpha_by_remainder() {
        for (len, alpha) in [(3, ALPHA_FULL), (4, ALPHA_ONE_BYTE), (5, ALPHA_TWO_BYTES)] {
            let data: Vec<u8> = (1..=len as u8).collect();
            let grid = pack("f", &data, 8).unwrap();
            let last = (len - 1) / 3;
            let pixel = grid.pixel(last as u32, 1);
            assert_eq!(pixel.0[3], alpha, "len {}", len);
            assert_ne!(pixel.0[0], 0);
            match alpha {
                ALPHA_ONE_BYTE => assert_eq!(&pixel.0[1..3], &[0, 0]),
                ALPHA_TWO_BYTES => {
                    assert_ne!(pixel.0[1], 0);
                    assert_eq!(pixel.0[2], 0);
                }
                _ => {}
            }
            assert_eq!(grid.pixel(last as u32 + 1, 1).0[3], ALPHA_PADDING);
        }
    }

    #[test]
    fn test_padding_after_payload_is_zero() {
        let data = vec![0xAAu8; 30];
        let grid = pack("pad", &data, 10).unwrap();
        // 30 bytes -> 10 pixels -> exactly row 1; rows 2 and 3 are padding
        assert_eq!(grid.height(), 4);
        assert!(grid.row(1).all(|p| p.0 == [0xAA, 0xAA, 0xAA, 255]));
        for y in 2..grid.height() {
            assert!(grid.row(y).all(|p| p.0 == [0, 0, 0, 0]));
        }
    }

    #[test]
    fn test_payload_spans_rows() {
        let data: Vec<u8> = (0..=20).collect();
        let grid = pack("span", &data, 3).unwrap();
        // 21 bytes -> 7 pixels over rows 1..=3
        assert_eq!(grid.pixel(0, 2).0, [9, 10, 11, 255]);
        assert_eq!(grid.pixel(0, 3).0, [18, 19, 20, 255]);
        assert_eq!(grid.pixel(1, 3).0, [0, 0, 0, 0]);
    }
}
