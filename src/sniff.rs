//! Header-level dimension sniffing for GIF, PNG, JPEG, and SVG buffers.
//!
//! Each sniffer is a pure function over a byte prefix — no file I/O, no
//! shared state. They read only the minimal fields needed for width/height
//! and deliberately skip full-format validation:
//!
//! | Format | What is read | What is *not* checked |
//! |---|---|---|
//! | GIF | single bytes at offsets 6 and 8 | signature, full u16 LE fields |
//! | PNG | u32 BE at offsets 16 and 20 | signature, IHDR chunk type, CRC |
//! | JPEG | SOI check + marker scan to first SOF | segment contents, EOI |
//! | SVG | first `width="…"`/`height="…"` text match | XML structure, units |
//!
//! A `None` return means "not recognized in this prefix" — for JPEG the
//! buffer is a bounded prefix of the file, so `None` can also mean the SOF
//! marker lives past the prefix and the caller simply has insufficient
//! data. A `Some` return is **not** proof the buffer is a valid image:
//! GIF and PNG perform no signature check at all and will happily return
//! whatever bytes sit at those offsets.

use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

/// Pixel dimensions extracted from an image header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Prefix bound for JPEG sniffing. SOF markers can sit after large
/// metadata segments (EXIF, ICC profiles), so the bound is generous.
pub const JPEG_PREFIX_BYTES: usize = 40_000;

/// Prefix bound for GIF/PNG sniffing — both store dimensions within the
/// first 24 bytes.
pub const HEADER_PREFIX_BYTES: usize = 24;

/// Prefix bound for the SVG text heuristic. Width/height attributes on the
/// root element sit near the top of the document.
pub const SVG_PREFIX_BYTES: usize = 4_096;

/// Prefix length needed to sniff a file with the given extension
/// (lowercase, no dot), or `None` if the extension is unsupported.
pub fn prefix_len(ext: &str) -> Option<usize> {
    match ext {
        "jpg" | "jpeg" => Some(JPEG_PREFIX_BYTES),
        "gif" | "png" => Some(HEADER_PREFIX_BYTES),
        "svg" => Some(SVG_PREFIX_BYTES),
        _ => None,
    }
}

/// Dispatch to the sniffer matching the extension. Returns `None` for both
/// "unsupported extension" and "not recognized"; callers that need to tell
/// the two apart check [`prefix_len`] first.
pub fn sniff(ext: &str, buf: &[u8]) -> Option<Dimensions> {
    match ext {
        "jpg" | "jpeg" => sniff_jpeg(buf),
        "gif" => sniff_gif(buf),
        "png" => sniff_png(buf),
        "svg" => sniff_svg(buf),
        _ => None,
    }
}

// =========================================================================
// GIF
// =========================================================================

/// Read GIF dimensions as single bytes at offsets 6 and 8.
///
/// The format stores width/height as u16 LE at offsets 6–7 and 8–9; this
/// reads only the low byte and silently truncates dimensions ≥ 256. Kept
/// for parity with the historical behavior (see DESIGN.md).
pub fn sniff_gif(buf: &[u8]) -> Option<Dimensions> {
    Some(Dimensions {
        width: *buf.get(6)? as u32,
        height: *buf.get(8)? as u32,
    })
}

// =========================================================================
// PNG
// =========================================================================

/// Read PNG dimensions as u32 BE at offsets 16 and 20.
///
/// Offsets skip the 8-byte signature plus the first chunk's length and
/// type fields, which for a well-formed PNG is IHDR. Neither the signature
/// nor the chunk type is verified; a non-PNG prefix yields garbage
/// dimensions, not `None`.
pub fn sniff_png(buf: &[u8]) -> Option<Dimensions> {
    Some(Dimensions {
        width: read_u32_be(buf, 16)?,
        height: read_u32_be(buf, 20)?,
    })
}

// =========================================================================
// JPEG
// =========================================================================

/// Scan a JPEG prefix for the first Start-Of-Frame marker and read the
/// frame dimensions from it.
///
/// Layout at a SOF marker byte `m`: length at `m+1`, sample precision at
/// `m+3`, height u16 BE at `m+4`, width u16 BE at `m+6`. Non-SOF segments
/// are skipped via their length field (which includes itself). Running off
/// the prefix at any point returns `None`.
pub fn sniff_jpeg(buf: &[u8]) -> Option<Dimensions> {
    if buf.len() < 2 || buf[0] != 0xFF || buf[1] != 0xD8 {
        return None;
    }

    let mut pos = 2;
    loop {
        // Seek the next marker: skip to a 0xFF, then past any 0xFF fill
        // bytes, landing on the marker-type byte.
        while *buf.get(pos)? != 0xFF {
            pos += 1;
        }
        while buf.get(pos) == Some(&0xFF) {
            pos += 1;
        }

        let marker = *buf.get(pos)?;
        if is_sof_marker(marker) {
            return Some(Dimensions {
                height: read_u16_be(buf, pos + 4)? as u32,
                width: read_u16_be(buf, pos + 6)? as u32,
            });
        }

        // Not a frame header: hop over the segment. The length field
        // counts itself, so marker-pos + 1 + length lands on the byte
        // after the segment.
        pos += 1 + read_u16_be(buf, pos + 1)? as usize;
    }
}

/// Start-Of-Frame marker types: C0–CF excluding DHT (C4), the JPG
/// extension (C8), and DAC (CC).
fn is_sof_marker(marker: u8) -> bool {
    matches!(marker, 0xC0..=0xC3 | 0xC5..=0xC7 | 0xC9..=0xCB | 0xCD..=0xCF)
}

fn read_u16_be(buf: &[u8], pos: usize) -> Option<u16> {
    Some(u16::from_be_bytes([*buf.get(pos)?, *buf.get(pos + 1)?]))
}

fn read_u32_be(buf: &[u8], pos: usize) -> Option<u32> {
    Some(u32::from_be_bytes([
        *buf.get(pos)?,
        *buf.get(pos + 1)?,
        *buf.get(pos + 2)?,
        *buf.get(pos + 3)?,
    ]))
}

// =========================================================================
// SVG
// =========================================================================

static DIM_ATTR: OnceLock<Regex> = OnceLock::new();

fn dim_attr() -> &'static Regex {
    // ASCII digit class: the crate is built without Unicode tables, and
    // dimension attributes are ASCII by definition.
    DIM_ATTR.get_or_init(|| Regex::new(r#"(width|height)="([0-9]+)""#).unwrap())
}

/// Text-scan an SVG buffer for `width="…"` and `height="…"` attributes.
///
/// This is a heuristic, not an XML parse: attributes match on any element,
/// anywhere in the document, first occurrence wins, and scanning stops
/// once both are found. A missing or unparsable attribute defaults to 0;
/// `None` only when neither attribute appears at all.
pub fn sniff_svg(buf: &[u8]) -> Option<Dimensions> {
    let text = String::from_utf8_lossy(buf);

    let mut width = 0u32;
    let mut height = 0u32;
    let mut matched = false;

    for caps in dim_attr().captures_iter(&text) {
        matched = true;
        if width > 0 && height > 0 {
            break;
        }
        let value = caps[2].parse::<u32>().unwrap_or(0);
        match &caps[1] {
            "width" if width == 0 => width = value,
            "height" if height == 0 => height = value,
            _ => {}
        }
    }

    if !matched {
        return None;
    }
    Some(Dimensions { width, height })
}
