//! Unpacking of a pixel grid back into a byte stream.
//!
//! This module reverses [`crate::encoder::pack`]:
//! 1. Read R, G, B of every row-0 pixel and parse `"<label>|<len>"`
//! 2. Scan rows `1..` left to right, three bytes per pixel
//! 3. Stop the whole scan at the first pixel whose alpha is below 255
//!
//! A malformed header is the only reported failure. A short, garbled or
//! mismatched payload comes back as-is; comparing its length with the
//! declared length is left to the caller.

use log::debug;
use thiserror::Error;

use crate::grid::{
    Metadata, PixelGrid, ALPHA_FULL, ALPHA_ONE_BYTE, ALPHA_TWO_BYTES, BYTES_PER_PIXEL, HEADER_ROW,
    SEPARATOR,
};

/// Errors that can occur during unpacking.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Malformed header: {0}")]
    MalformedHeader(String),
}

/// Result of unpacking a grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unpacked {
    /// Label read from the header row.
    pub label: String,
    /// Payload length declared in the header row.
    pub declared_len: usize,
    /// Payload bytes recovered from the payload rows.
    pub payload: Vec<u8>,
}

/// Unpacks the header and the payload of `grid`.
///
/// # Errors
/// Returns [`DecodeError::MalformedHeader`] if row 0 does not hold a
/// `label|length` header.
pub fn unpack(grid: &PixelGrid) -> Result<Unpacked, DecodeError> {
    let meta = read_header(grid)?;
    let payload = unpack_payload(grid);

    if payload.len() != meta.payload_len {
        debug!(
            "recovered {} bytes, header declares {}",
            payload.len(),
            meta.payload_len
        );
    }

    Ok(Unpacked {
        label: meta.label,
        declared_len: meta.payload_len,
        payload,
    })
}

/// Parses the header row.
///
/// The label is the text before the first `|`. The length field is the text
/// up to the next `|` with every non-digit removed, which also drops the NUL
/// bytes of unwritten header columns.
pub fn read_header(grid: &PixelGrid) -> Result<Metadata, DecodeError> {
    let mut raw = Vec::with_capacity(grid.width() as usize * BYTES_PER_PIXEL);
    for pixel in grid.row(HEADER_ROW) {
        raw.extend_from_slice(&pixel.0[..BYTES_PER_PIXEL]);
    }
    parse_header(&String::from_utf8_lossy(&raw))
}

fn parse_header(text: &str) -> Result<Metadata, DecodeError> {
    let (label, rest) = text
        .split_once(SEPARATOR)
        .ok_or_else(|| DecodeError::MalformedHeader("missing '|' separator".to_string()))?;
    let field = rest.split_once(SEPARATOR).map_or(rest, |(field, _)| field);

    let digits: String = field.chars().filter(char::is_ascii_digit).collect();
    let payload_len = digits.parse::<usize>().map_err(|e| {
        DecodeError::MalformedHeader(format!("invalid length field {:?}: {}", digits, e))
    })?;

    Ok(Metadata::new(label, payload_len))
}

/// Scans the payload rows and returns the recovered bytes.
///
/// The scan ends for the whole grid at the first payload pixel with alpha
/// below 255. A sentinel pixel written by the packer still contributes its
/// partial bytes (R and G for alpha 254, R for alpha 253); any other low
/// alpha contributes nothing. This holds wherever the pixel sits, so a
/// sentinel placed mid-grid keeps its partial bytes too.
///
/// Images from older versions of this tool mark a one-byte final pixel
/// with alpha 252. That value is not a sentinel here, so such images lose
/// their last byte and fail the declared-length check in [`crate::vault`].
///
/// G and B are gated on the pixel's flattened channel index being below the
/// channel capacity of the whole grid, not below the declared payload
/// length. Inside the grid that bound always holds, so truncation comes
/// from the alpha sentinel alone.
pub fn unpack_payload(grid: &PixelGrid) -> Vec<u8> {
    let width = u64::from(grid.width());
    let capacity = grid.channel_capacity();

    // The packer never writes more than one byte per payload pixel on average.
    let hint = u64::from(grid.payload_rows()) * width;
    let mut payload = Vec::with_capacity(usize::try_from(hint).unwrap_or(0));

    'scan: for y in 1..grid.height() {
        for x in 0..grid.width() {
            let [r, g, b, a] = grid.pixel(x, y).0;
            let index = (u64::from(x) + u64::from(y) * width) * BYTES_PER_PIXEL as u64;

            if a < ALPHA_FULL && y != HEADER_ROW {
                match a {
                    ALPHA_TWO_BYTES => {
                        payload.push(r);
                        if index + 1 < capacity {
                            payload.push(g);
                        }
                    }
                    ALPHA_ONE_BYTE => payload.push(r),
                    _ => {}
                }
                debug!("payload scan ended at ({}, {}) with alpha {}", x, y, a);
                break 'scan;
            }

            payload.push(r);
            if index + 1 < capacity {
                payload.push(g);
            }
            if index + 2 < capacity {
                payload.push(b);
            }
        }
    }

    payload
}
