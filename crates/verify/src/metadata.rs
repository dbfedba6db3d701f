//! Metadata block discovery for JPEG and PNG containers.
//!
//! Walks marker segments / chunks without decoding pixels. Unknown containers
//! yield no blocks.

use serde::{Deserialize, Serialize};

const JPEG_SOI: [u8; 2] = [0xFF, 0xD8];
const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

const EXIF_HEADER: &[u8] = b"Exif\0\0";
const XMP_HEADER: &[u8] = b"http://ns.adobe.com/xap/1.0/";
const ICC_HEADER: &[u8] = b"ICC_PROFILE\0";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetadataKind {
    Exif,
    Xmp,
    Icc,
    Iptc,
    Comment,
    Text,
    Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataBlock {
    pub kind: MetadataKind,
    /// Offset of the segment/chunk header
    pub offset: usize,
    /// Payload length
    pub length: usize,
}

pub fn scan_image_metadata(bytes: &[u8]) -> Vec<MetadataBlock> {
    if bytes.starts_with(&PNG_SIGNATURE) {
        scan_png(bytes)
    } else if bytes.starts_with(&JPEG_SOI) {
        scan_jpeg(bytes)
    } else {
        Vec::new()
    }
}

fn scan_jpeg(bytes: &[u8]) -> Vec<MetadataBlock> {
    let mut blocks = Vec::new();
    let mut pos = JPEG_SOI.len();

    while pos + 1 < bytes.len() {
        if bytes[pos] != 0xFF {
            break;
        }
        let marker = bytes[pos + 1];
        // fill bytes
        if marker == 0xFF {
            pos += 1;
            continue;
        }
        // start of scan / end of image: no more header segments
        if marker == 0xDA || marker == 0xD9 {
            break;
        }
        // standalone markers carry no length
        if marker == 0x01 || (0xD0..=0xD7).contains(&marker) {
            pos += 2;
            continue;
        }
        if pos + 4 > bytes.len() {
            break;
        }

        let length = u16::from_be_bytes([bytes[pos + 2], bytes[pos + 3]]) as usize;
        if length < 2 {
            break;
        }
        let data_start = pos + 4;
        let data_end = (pos + 2 + length).min(bytes.len());
        let data = &bytes[data_start.min(data_end)..data_end];

        let kind = match marker {
            0xE1 if data.starts_with(EXIF_HEADER) => Some(MetadataKind::Exif),
            0xE1 if data.starts_with(XMP_HEADER) => Some(MetadataKind::Xmp),
            0xE2 if data.starts_with(ICC_HEADER) => Some(MetadataKind::Icc),
            0xED => Some(MetadataKind::Iptc),
            0xFE => Some(MetadataKind::Comment),
            _ => None,
        };
        if let Some(kind) = kind {
            blocks.push(MetadataBlock {
                kind,
                offset: pos,
                length: length - 2,
            });
        }

        pos += 2 + length;
    }

    blocks
}

fn scan_png(bytes: &[u8]) -> Vec<MetadataBlock> {
    let mut blocks = Vec::new();
    let mut pos = PNG_SIGNATURE.len();

    // length(4) + type(4) + data + crc(4)
    while pos + 8 <= bytes.len() {
        let length =
            u32::from_be_bytes([bytes[pos], bytes[pos + 1], bytes[pos + 2], bytes[pos + 3]])
                as usize;
        let chunk_type = &bytes[pos + 4..pos + 8];

        let kind = match chunk_type {
            b"eXIf" => Some(MetadataKind::Exif),
            b"iCCP" => Some(MetadataKind::Icc),
            b"tEXt" | b"iTXt" | b"zTXt" => Some(MetadataKind::Text),
            b"tIME" => Some(MetadataKind::Timestamp),
            _ => None,
        };
        if let Some(kind) = kind {
            blocks.push(MetadataBlock {
                kind,
                offset: pos,
                length,
            });
        }

        if chunk_type == b"IEND" {
            break;
        }
        pos = match pos.checked_add(12 + length) {
            Some(next) => next,
            None => break,
        };
    }

    blocks
}
