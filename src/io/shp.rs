//! Decoder for the `.shp` geometry stream.
//!
//! Record headers (record number, content length) are big-endian; shape
//! payloads (type tag, boxes, counts, coordinates) are little-endian. Content
//! lengths are stored in 16-bit words.
//!
//! Corruption confined to one record degrades that record to an empty shape
//! and keeps loading; corruption that loses the record framing (a header or
//! declared content overrunning the file) is fatal.

use geo::{Coord, LineString};
use smallvec::SmallVec;

use crate::error::MalformedGeometry;
use crate::io::shx::RecordSpan;
use crate::io::{FILE_CODE, FILE_HEADER_LEN, f64_le, i32_be, i32_le};

const SHAPE_NULL: i32 = 0;
const SHAPE_POLYGON: i32 = 5;
const SHAPE_POLYGON_Z: i32 = 15;
const SHAPE_POLYGON_M: i32 = 25;

/// All records of a geometry stream, in file order, plus the byte span of
/// each record (recorded during the scan when no usable index was supplied).
pub(crate) struct DecodedShapes {
    pub(crate) shapes: Vec<Vec<LineString<f64>>>,
    pub(crate) spans: Vec<RecordSpan>,
    pub(crate) warnings: Vec<String>,
}

/// Decode the full geometry stream.
///
/// With `index` spans from a `.shx` file, records are read by random access;
/// if the index turns out to disagree with the stream the decoder falls back
/// to the sequential scan, which must produce identical output.
pub(crate) fn decode(
    bytes: &[u8],
    index: Option<&[RecordSpan]>,
) -> Result<DecodedShapes, MalformedGeometry> {
    let mut warnings = Vec::new();
    validate_header(bytes, &mut warnings)?;

    if let Some(spans) = index {
        let mut indexed_warnings = Vec::new();
        if let Some(shapes) = decode_indexed(bytes, spans, &mut indexed_warnings) {
            warnings.append(&mut indexed_warnings);
            return Ok(DecodedShapes { shapes, spans: spans.to_vec(), warnings });
        }
        tracing::warn!("shape index disagrees with the geometry stream, scanning sequentially");
        warnings.push("shape index disagrees with the geometry stream; fell back to a sequential scan".into());
    }

    decode_sequential(bytes, warnings)
}

fn validate_header(bytes: &[u8], warnings: &mut Vec<String>) -> Result<(), MalformedGeometry> {
    if bytes.len() < FILE_HEADER_LEN {
        return Err(MalformedGeometry::TruncatedHeader {
            expected: FILE_HEADER_LEN,
            actual: bytes.len(),
        });
    }
    let code = i32_be(bytes, 0);
    if code != FILE_CODE {
        return Err(MalformedGeometry::BadFileCode(code));
    }
    // File length lives at byte 24, big-endian, in 16-bit words. A mismatch
    // is suspicious but not fatal: the record framing is still recoverable.
    let declared = i32_be(bytes, 24) as i64 * 2;
    if declared != bytes.len() as i64 {
        warnings.push(format!(
            "geometry header declares {declared} bytes but the file has {}",
            bytes.len()
        ));
    }
    Ok(())
}

/// Forward-only scan, recording each record's span as it goes.
fn decode_sequential(
    bytes: &[u8],
    mut warnings: Vec<String>,
) -> Result<DecodedShapes, MalformedGeometry> {
    let mut shapes = Vec::new();
    let mut spans = Vec::new();

    let mut pos = FILE_HEADER_LEN;
    while pos + 8 <= bytes.len() {
        let record = shapes.len();
        let content_words = i32_be(bytes, pos + 4);
        if content_words < 0 {
            return Err(MalformedGeometry::TruncatedRecord { record, offset: pos as u64 });
        }
        let content_len = content_words as usize * 2;
        let start = pos + 8;
        let Some(end) = start.checked_add(content_len).filter(|&end| end <= bytes.len()) else {
            return Err(MalformedGeometry::TruncatedRecord { record, offset: pos as u64 });
        };

        shapes.push(decode_content(record, &bytes[start..end], &mut warnings));
        spans.push(RecordSpan { offset: pos as u64, content_len });
        pos = end;
    }
    if pos != bytes.len() {
        warnings.push(format!(
            "{} trailing bytes after the last geometry record",
            bytes.len() - pos
        ));
    }

    Ok(DecodedShapes { shapes, spans, warnings })
}

/// Random-access read driven by index spans. Returns `None` when the index
/// contradicts the stream, so the caller can rescan sequentially.
///
/// The spans must tile the stream exactly: first record right after the file
/// header, each record contiguous with the next, last record ending at the
/// end of the file. An index covering only a prefix of the stream would
/// otherwise decode fewer records than a sequential scan.
fn decode_indexed(
    bytes: &[u8],
    spans: &[RecordSpan],
    warnings: &mut Vec<String>,
) -> Option<Vec<Vec<LineString<f64>>>> {
    let mut shapes = Vec::with_capacity(spans.len());
    let mut expected = FILE_HEADER_LEN;
    for (record, span) in spans.iter().enumerate() {
        let start = usize::try_from(span.offset).ok()?;
        if start != expected {
            return None;
        }
        let content_start = start.checked_add(8)?;
        let end = content_start.checked_add(span.content_len)?;
        if end > bytes.len() {
            return None;
        }
        // The record's own header must agree with the index entry.
        let content_words = i32_be(bytes, start + 4);
        if content_words < 0 || content_words as usize * 2 != span.content_len {
            return None;
        }
        shapes.push(decode_content(record, &bytes[content_start..end], warnings));
        expected = end;
    }
    if expected != bytes.len() {
        return None;
    }
    Some(shapes)
}

/// Decode one record's content section into rings. Unknown shape types and
/// record-local corruption degrade to an empty ring set.
fn decode_content(record: usize, buf: &[u8], warnings: &mut Vec<String>) -> Vec<LineString<f64>> {
    if buf.len() < 4 {
        tracing::warn!(record, "record content too short for a shape type tag");
        warnings.push(format!("record {record}: content too short for a shape type tag"));
        return Vec::new();
    }
    match i32_le(buf, 0) {
        SHAPE_NULL => Vec::new(),
        tag @ (SHAPE_POLYGON | SHAPE_POLYGON_Z | SHAPE_POLYGON_M) => {
            match parse_polygon(record, tag, buf) {
                Ok(rings) => rings,
                Err(err) => {
                    tracing::warn!(record, %err, "degrading malformed geometry record");
                    warnings.push(err.to_string());
                    Vec::new()
                }
            }
        }
        other => {
            tracing::warn!(record, shape_type = other, "unsupported shape type, decoded as empty");
            warnings.push(format!("record {record}: unsupported shape type {other}, decoded as empty"));
            Vec::new()
        }
    }
}

/// Parse a polygon payload: box, part count, point count, part-offset table,
/// then the flat little-endian point array partitioned into rings.
fn parse_polygon(record: usize, tag: i32, buf: &[u8]) -> Result<Vec<LineString<f64>>, MalformedGeometry> {
    // Tag (4) + box (32) + part count (4) + point count (4).
    const FIXED: usize = 44;
    if buf.len() < FIXED {
        return Err(MalformedGeometry::CountOverflow { record });
    }
    let num_parts = i32_le(buf, 36);
    let num_points = i32_le(buf, 40);
    if num_parts < 0 || num_points < 0 {
        return Err(MalformedGeometry::NegativeCount { record });
    }
    let (num_parts, num_points) = (num_parts as usize, num_points as usize);

    let required = FIXED as u64 + 4 * num_parts as u64 + 16 * num_points as u64;
    if required > buf.len() as u64 {
        return Err(MalformedGeometry::CountOverflow { record });
    }
    // Plain polygons must consume their content exactly; Z and M variants
    // carry trailing measure sections that are skipped.
    if tag == SHAPE_POLYGON && required != buf.len() as u64 {
        return Err(MalformedGeometry::LengthMismatch {
            record,
            declared: buf.len(),
            actual: required as usize,
        });
    }

    let mut parts: SmallVec<[usize; 8]> = SmallVec::with_capacity(num_parts + 1);
    for i in 0..num_parts {
        let part = i32_le(buf, FIXED + 4 * i);
        if part < 0
            || part as usize > num_points
            || parts.last().is_some_and(|&prev| (part as usize) < prev)
        {
            return Err(MalformedGeometry::BadPartTable { record });
        }
        parts.push(part as usize);
    }
    parts.push(num_points);

    let points_base = FIXED + 4 * num_parts;
    let mut rings = Vec::with_capacity(num_parts);
    for window in parts.windows(2) {
        let (start, end) = (window[0], window[1]);
        let mut coords = Vec::with_capacity(end - start + 1);
        for point in start..end {
            let at = points_base + 16 * point;
            coords.push(Coord { x: f64_le(buf, at), y: f64_le(buf, at + 8) });
        }
        ensure_closed(&mut coords);
        rings.push(LineString::new(coords));
    }
    Ok(rings)
}

/// Close a ring if its first and last coordinates differ.
fn ensure_closed(coords: &mut Vec<Coord<f64>>) {
    if let Some((&first, &last)) = coords.first().zip(coords.last()) {
        if first != last {
            coords.push(first);
        }
    }
}
