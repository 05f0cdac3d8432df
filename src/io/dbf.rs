//! Decoder for the `.dbf` (dBase III) attribute table.
//!
//! The header declares a field schema and a record count; every row is a
//! fixed-width byte run prefixed by a deletion flag. Soft-deleted rows are
//! kept (flagged) so row indices stay aligned with the geometry stream.
//!
//! Text decodes under one codec for the whole file, chosen from the header's
//! language-driver byte. A cell that does not decode under that codec is an
//! error, never a silent replacement.

use encoding_rs::Encoding;

use crate::attr::{AttributeTable, AttributeValue, Date, FieldInfo, FieldType, Row};
use crate::error::{EncodingError, LoadError, MalformedAttributes};
use crate::io::{u16_le, u32_le};

const HEADER_LEN: usize = 32;
const DESCRIPTOR_LEN: usize = 32;
const FIELD_TERMINATOR: u8 = 0x0D;
const FLAG_DELETED: u8 = b'*';

#[derive(Debug)]
pub(crate) struct DecodedTable {
    pub(crate) table: AttributeTable,
    pub(crate) warnings: Vec<String>,
}

pub(crate) fn decode(bytes: &[u8]) -> Result<DecodedTable, LoadError> {
    if bytes.len() < HEADER_LEN {
        return Err(MalformedAttributes::TruncatedHeader(bytes.len()).into());
    }
    let record_count = u32_le(bytes, 4) as usize;
    let header_size = u16_le(bytes, 8) as usize;
    let record_size = u16_le(bytes, 10) as usize;
    let encoding = codepage(bytes[29]);

    if header_size <= HEADER_LEN || header_size > bytes.len() {
        return Err(MalformedAttributes::BadHeaderSize { header_size, file_len: bytes.len() }.into());
    }

    // Field descriptors run from byte 32 to the 0x0D terminator.
    let mut fields = Vec::new();
    let mut pos = HEADER_LEN;
    loop {
        if pos >= header_size {
            return Err(MalformedAttributes::UnterminatedFields.into());
        }
        if bytes[pos] == FIELD_TERMINATOR {
            break;
        }
        if pos + DESCRIPTOR_LEN > header_size {
            return Err(MalformedAttributes::UnterminatedFields.into());
        }
        fields.push(parse_descriptor(fields.len(), &bytes[pos..pos + DESCRIPTOR_LEN], encoding)?);
        pos += DESCRIPTOR_LEN;
    }

    let row_width = fields.iter().map(|field| field.width).sum::<usize>() + 1;
    if row_width != record_size {
        return Err(MalformedAttributes::RowWidthMismatch { fields: row_width, declared: record_size }.into());
    }

    // A trailing 0x1A end-of-file marker after the last record is tolerated.
    let body = &bytes[header_size..];
    let available = body.len() / record_size;
    if record_count > available {
        return Err(MalformedAttributes::RecordCountMismatch { declared: record_count, available }.into());
    }

    let mut warnings = Vec::new();
    let mut rows = Vec::with_capacity(record_count);
    for record in 0..record_count {
        let raw = &body[record * record_size..(record + 1) * record_size];
        let deleted = raw[0] == FLAG_DELETED;
        let mut values = Vec::with_capacity(fields.len());
        let mut at = 1;
        for field in &fields {
            values.push(parse_value(record, field, &raw[at..at + field.width], encoding, &mut warnings)?);
            at += field.width;
        }
        rows.push(Row { deleted, values });
    }

    tracing::debug!(
        records = rows.len(),
        fields = fields.len(),
        encoding = encoding.name(),
        "decoded attribute table"
    );
    Ok(DecodedTable { table: AttributeTable::new(fields, rows), warnings })
}

fn parse_descriptor(
    index: usize,
    descriptor: &[u8],
    encoding: &'static Encoding,
) -> Result<FieldInfo, MalformedAttributes> {
    let name_len = descriptor[..11].iter().position(|&b| b == 0).unwrap_or(11);
    let (name, had_errors) = encoding.decode_without_bom_handling(&descriptor[..name_len]);
    if had_errors || name.trim().is_empty() {
        return Err(MalformedAttributes::BadFieldName { index });
    }
    Ok(FieldInfo {
        name: name.trim().to_string(),
        field_type: FieldType::from_tag(descriptor[11]),
        width: descriptor[16] as usize,
        decimals: descriptor[17] as usize,
    })
}

/// Decode one fixed-width cell into its typed value. Undecodable bytes fail;
/// unparseable-but-decodable content degrades to `Null` with a warning.
fn parse_value(
    record: usize,
    field: &FieldInfo,
    cell: &[u8],
    encoding: &'static Encoding,
    warnings: &mut Vec<String>,
) -> Result<AttributeValue, EncodingError> {
    let (text, had_errors) = encoding.decode_without_bom_handling(cell);
    if had_errors {
        return Err(EncodingError {
            record,
            field: field.name.clone(),
            encoding: encoding.name(),
        });
    }

    let mut degrade = |what: &str| {
        tracing::warn!(record, field = %field.name, "unparseable {what} cell");
        warnings.push(format!("record {record}, field '{}': unparseable {what} cell", field.name));
        AttributeValue::Null
    };

    Ok(match field.field_type {
        FieldType::Character => {
            let trimmed = text.trim_end_matches([' ', '\0']);
            if trimmed.is_empty() {
                AttributeValue::Null
            } else {
                AttributeValue::Character(trimmed.to_string())
            }
        }
        FieldType::Numeric => {
            let trimmed = text.trim();
            if trimmed.is_empty() || trimmed.bytes().all(|b| b == b'*') {
                AttributeValue::Null
            } else if field.decimals == 0 {
                match trimmed.parse::<i64>() {
                    Ok(n) => AttributeValue::Integer(n),
                    Err(_) => match trimmed.parse::<f64>() {
                        Ok(x) => AttributeValue::Numeric(x),
                        Err(_) => degrade("numeric"),
                    },
                }
            } else {
                match trimmed.parse::<f64>() {
                    Ok(x) => AttributeValue::Numeric(x),
                    Err(_) => degrade("numeric"),
                }
            }
        }
        FieldType::Float => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                AttributeValue::Null
            } else {
                match trimmed.parse::<f64>() {
                    Ok(x) => AttributeValue::Numeric(x),
                    Err(_) => degrade("float"),
                }
            }
        }
        FieldType::Logical => match text.trim().bytes().next() {
            Some(b'Y' | b'y' | b'T' | b't') => AttributeValue::Logical(true),
            Some(b'N' | b'n' | b'F' | b'f') => AttributeValue::Logical(false),
            Some(b'?') | None => AttributeValue::Null,
            Some(_) => degrade("logical"),
        },
        FieldType::Date => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                AttributeValue::Null
            } else {
                match parse_date(trimmed) {
                    Some(date) => AttributeValue::Date(date),
                    None => degrade("date"),
                }
            }
        }
    })
}

/// `YYYYMMDD` with plausible month and day ranges.
fn parse_date(text: &str) -> Option<Date> {
    if text.len() != 8 || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year = text[0..4].parse().ok()?;
    let month = text[4..6].parse().ok()?;
    let day = text[6..8].parse().ok()?;
    ((1..=12).contains(&month) && (1..=31).contains(&day)).then_some(Date { year, month, day })
}

/// Map the header's language-driver byte to a codec. The common ANSI tags
/// (and anything unrecognized) resolve to windows-1252.
fn codepage(ldid: u8) -> &'static Encoding {
    match ldid {
        0x13 => encoding_rs::SHIFT_JIS,
        0x4D => encoding_rs::GBK,
        0x4E => encoding_rs::EUC_KR,
        0x4F => encoding_rs::BIG5,
        0x65 => encoding_rs::IBM866,
        0xC8 => encoding_rs::WINDOWS_1250,
        0xC9 => encoding_rs::WINDOWS_1251,
        0xCA => encoding_rs::WINDOWS_1254,
        0xCB => encoding_rs::WINDOWS_1253,
        0xCC => encoding_rs::WINDOWS_1257,
        _ => encoding_rs::WINDOWS_1252,
    }
}
