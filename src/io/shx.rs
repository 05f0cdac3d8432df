//! Reader for the `.shx` offset index: one (offset, length) pair per record,
//! enabling random access into the geometry stream.
//!
//! The index is optional. Any structural problem here surfaces as an error
//! the loader downgrades to a sequential scan; it never fails a load.

use crate::error::MalformedGeometry;
use crate::io::{FILE_CODE, FILE_HEADER_LEN, i32_be};

/// Byte extent of one geometry record: absolute offset of its record header
/// and the length of its content section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RecordSpan {
    pub(crate) offset: u64,
    pub(crate) content_len: usize,
}

/// Decode the index into record spans, in record order.
///
/// Offsets and lengths are stored big-endian, in 16-bit words.
pub(crate) fn decode(bytes: &[u8]) -> Result<Vec<RecordSpan>, MalformedGeometry> {
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

    let body = &bytes[FILE_HEADER_LEN..];
    if body.len() % 8 != 0 {
        return Err(MalformedGeometry::TruncatedRecord {
            record: body.len() / 8,
            offset: bytes.len() as u64,
        });
    }

    let mut spans = Vec::with_capacity(body.len() / 8);
    for (record, entry) in body.chunks_exact(8).enumerate() {
        let offset_words = i32_be(entry, 0);
        let content_words = i32_be(entry, 4);
        if offset_words < 0 || content_words < 0 {
            return Err(MalformedGeometry::NegativeCount { record });
        }
        spans.push(RecordSpan {
            offset: offset_words as u64 * 2,
            content_len: content_words as usize * 2,
        });
    }
    Ok(spans)
}
