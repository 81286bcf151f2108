//! ICO container layout
//!
//! Layout (all little-endian):
//! - Header, 6 bytes: reserved (0), type (1 = icon), frame count
//! - One 16-byte directory entry per frame
//! - Frame payloads, in directory order
//!
//! Every frame written here is a PNG. The width/height bytes of an entry
//! can only express 1..=255, with 0 standing for "256 or larger", so the
//! real dimensions of big frames live in the PNG header.

use std::io::Cursor;

use image::{ImageFormat, ImageReader};

use crate::error::{IcoFormatError, IconError};

const HEADER_LEN: usize = 6;
const ENTRY_LEN: usize = 16;
const ICON_TYPE: u16 = 1;
const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// One square, PNG-compressed frame
#[derive(Debug, Clone)]
pub struct IconFrame {
    /// Edge length in pixels
    pub size: u32,
    /// Encoded PNG bytes
    pub png: Vec<u8>,
}

/// An icon directory being assembled in memory
#[derive(Debug, Default)]
pub struct IconDir {
    frames: Vec<IconFrame>,
}

/// A frame as found in an existing ICO file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameInfo {
    pub width: u32,
    pub height: u32,
    pub bit_count: u16,
    pub is_png: bool,
    pub offset: u32,
    pub length: u32,
}

impl IconDir {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, frame: IconFrame) {
        self.frames.push(frame);
    }

    /// Serialize header, directory and payloads into one buffer
    pub fn to_bytes(&self) -> Result<Vec<u8>, IconError> {
        let count = u16::try_from(self.frames.len())
            .map_err(|_| IconError::TooManyFrames(self.frames.len()))?;

        let payload_len: usize = self.frames.iter().map(|f| f.png.len()).sum();
        let mut out = Vec::with_capacity(HEADER_LEN + ENTRY_LEN * self.frames.len() + payload_len);

        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(&ICON_TYPE.to_le_bytes());
        out.extend_from_slice(&count.to_le_bytes());

        // Payloads start right after the directory
        let mut offset = HEADER_LEN + ENTRY_LEN * self.frames.len();
        for frame in &self.frames {
            let edge = dir_byte(frame.size);
            out.push(edge); // width
            out.push(edge); // height
            out.push(0); // palette colors
            out.push(0); // reserved
            out.extend_from_slice(&1u16.to_le_bytes()); // planes
            out.extend_from_slice(&32u16.to_le_bytes()); // bits per pixel
            out.extend_from_slice(&dword(frame.png.len())?.to_le_bytes());
            out.extend_from_slice(&dword(offset)?.to_le_bytes());
            offset += frame.png.len();
        }

        for frame in &self.frames {
            out.extend_from_slice(&frame.png);
        }

        Ok(out)
    }

    /// Read the directory of an existing ICO file
    pub fn parse(bytes: &[u8]) -> Result<Vec<FrameInfo>, IcoFormatError> {
        ensure_len(bytes, HEADER_LEN)?;
        let reserved = read_u16(bytes, 0);
        let kind = read_u16(bytes, 2);
        if reserved != 0 || kind != ICON_TYPE {
            return Err(IcoFormatError::BadHeader { reserved, kind });
        }

        let count = read_u16(bytes, 4) as usize;
        ensure_len(bytes, HEADER_LEN + ENTRY_LEN * count)?;

        let mut frames = Vec::with_capacity(count);
        for index in 0..count {
            let entry = HEADER_LEN + ENTRY_LEN * index;
            let bit_count = read_u16(bytes, entry + 6);
            let length = read_u32(bytes, entry + 8);
            let offset = read_u32(bytes, entry + 12);

            let end = offset as usize + length as usize;
            if end > bytes.len() {
                return Err(IcoFormatError::FrameOutOfBounds { index, offset, length });
            }
            let data = &bytes[offset as usize..end];

            let is_png = data.starts_with(&PNG_SIGNATURE);
            let (width, height) = if is_png {
                ImageReader::with_format(Cursor::new(data), ImageFormat::Png)
                    .into_dimensions()
                    .map_err(|source| IcoFormatError::BadFrame { index, source })?
            } else {
                (edge_from_byte(bytes[entry]), edge_from_byte(bytes[entry + 1]))
            };

            frames.push(FrameInfo {
                width,
                height,
                bit_count,
                is_png,
                offset,
                length,
            });
        }

        Ok(frames)
    }
}

/// Lengths and offsets are stored as 32-bit fields
fn dword(value: usize) -> Result<u32, IconError> {
    u32::try_from(value).map_err(|_| IconError::ContainerTooLarge(value))
}

/// Directory byte for an edge length (0 means 256 or more)
fn dir_byte(edge: u32) -> u8 {
    if edge >= 256 {
        0
    } else {
        edge as u8
    }
}

fn edge_from_byte(b: u8) -> u32 {
    if b == 0 {
        256
    } else {
        b as u32
    }
}

fn ensure_len(bytes: &[u8], needed: usize) -> Result<(), IcoFormatError> {
    if bytes.len() < needed {
        return Err(IcoFormatError::Truncated {
            needed,
            available: bytes.len(),
        });
    }
    Ok(())
}

fn read_u16(bytes: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([bytes[at], bytes[at + 1]])
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}
