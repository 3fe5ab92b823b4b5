//! Poster header probing.
//!
//! Recognises PNG, GIF and JPEG data and reads the pixel dimensions from the
//! header. This is all the terminal front end needs to decide between a real
//! poster and the placeholder.

use std::fmt;

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Supported poster encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Png,
    Gif,
    Jpeg,
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageFormat::Png => write!(f, "png"),
            ImageFormat::Gif => write!(f, "gif"),
            ImageFormat::Jpeg => write!(f, "jpeg"),
        }
    }
}

/// Format and dimensions read from an image header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
}

/// Probe `bytes` for a known image header. Returns `None` for anything that
/// is not a well-formed PNG, GIF or JPEG with non-zero dimensions.
pub fn probe(bytes: &[u8]) -> Option<ImageInfo> {
    let info = if bytes.starts_with(&PNG_SIGNATURE) {
        probe_png(bytes)
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        probe_gif(bytes)
    } else if bytes.starts_with(&[0xFF, 0xD8]) {
        probe_jpeg(bytes)
    } else {
        None
    }?;

    (info.width > 0 && info.height > 0).then_some(info)
}

fn probe_png(bytes: &[u8]) -> Option<ImageInfo> {
    if bytes.get(12..16)? != b"IHDR" {
        return None;
    }
    Some(ImageInfo {
        format: ImageFormat::Png,
        width: read_u32_be(bytes, 16)?,
        height: read_u32_be(bytes, 20)?,
    })
}

fn probe_gif(bytes: &[u8]) -> Option<ImageInfo> {
    let width = u16::from_le_bytes([*bytes.get(6)?, *bytes.get(7)?]);
    let height = u16::from_le_bytes([*bytes.get(8)?, *bytes.get(9)?]);
    Some(ImageInfo {
        format: ImageFormat::Gif,
        width: width.into(),
        height: height.into(),
    })
}

fn probe_jpeg(bytes: &[u8]) -> Option<ImageInfo> {
    // Walk the marker segments after SOI until a start-of-frame marker.
    let mut pos = 2;
    loop {
        if *bytes.get(pos)? != 0xFF {
            return None;
        }
        while *bytes.get(pos)? == 0xFF {
            pos += 1;
        }
        let marker = *bytes.get(pos)?;
        match marker {
            0xD8 | 0x01 | 0xD0..=0xD7 => {
                pos += 1;
                continue;
            }
            // EOI or start of scan before any frame header.
            0xD9 | 0xDA => return None,
            _ => {}
        }

        let length = usize::from(read_u16_be(bytes, pos + 1)?);
        if length < 2 {
            return None;
        }

        let is_frame = matches!(marker, 0xC0..=0xCF) && !matches!(marker, 0xC4 | 0xC8 | 0xCC);
        if is_frame {
            return Some(ImageInfo {
                format: ImageFormat::Jpeg,
                height: read_u16_be(bytes, pos + 4)?.into(),
                width: read_u16_be(bytes, pos + 6)?.into(),
            });
        }
        pos += 1 + length;
    }
}

fn read_u16_be(bytes: &[u8], at: usize) -> Option<u16> {
    let slice = bytes.get(at..at + 2)?;
    Some(u16::from_be_bytes([slice[0], slice[1]]))
}

fn read_u32_be(bytes: &[u8], at: usize) -> Option<u32> {
    let slice = bytes.get(at..at + 4)?;
    Some(u32::from_be_bytes([slice[0], slice[1], slice[2], slice[3]]))
}
