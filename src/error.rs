use std::path::PathBuf;

use thiserror::Error;

/// Structural corruption in the `.shp` geometry stream.
///
/// Record-level variants are non-fatal when the next record boundary can
/// still be located from the declared content length: the offending record
/// degrades to an empty shape and loading continues.
#[derive(Debug, Error)]
pub enum MalformedGeometry {
    #[error("geometry file is shorter than the {expected}-byte header ({actual} bytes)")]
    TruncatedHeader { expected: usize, actual: usize },

    #[error("bad geometry file code: expected 9994, found {0}")]
    BadFileCode(i32),

    #[error("record {record}: header or content at byte {offset} overruns the file")]
    TruncatedRecord { record: usize, offset: u64 },

    #[error(
        "record {record}: declared content length of {declared} bytes \
         does not match decoded payload of {actual} bytes"
    )]
    LengthMismatch {
        record: usize,
        declared: usize,
        actual: usize,
    },

    #[error("record {record}: negative part or point count")]
    NegativeCount { record: usize },

    #[error("record {record}: part or point counts overflow the declared content length")]
    CountOverflow { record: usize },

    #[error("record {record}: ring part table is not monotonically increasing")]
    BadPartTable { record: usize },
}

/// Structural corruption in the `.dbf` attribute table.
#[derive(Debug, Error)]
pub enum MalformedAttributes {
    #[error("attribute file is shorter than the 32-byte header ({0} bytes)")]
    TruncatedHeader(usize),

    #[error("attribute header size {header_size} is inconsistent with file size {file_len}")]
    BadHeaderSize { header_size: usize, file_len: usize },

    #[error("field descriptor block is not terminated")]
    UnterminatedFields,

    #[error("field descriptor {index} has an undecodable name")]
    BadFieldName { index: usize },

    #[error("field widths sum to {fields} bytes but declared record size is {declared}")]
    RowWidthMismatch { fields: usize, declared: usize },

    #[error("header declares {declared} records but the file has room for {available}")]
    RecordCountMismatch { declared: usize, available: usize },
}

/// An attribute field whose bytes do not decode under the table's codec.
///
/// Raised instead of substituting replacement characters, so a corrupt file
/// is distinguishable from one that merely contains odd data.
#[derive(Debug, Error)]
#[error("record {record}, field '{field}': bytes are not valid {encoding} text")]
pub struct EncodingError {
    pub record: usize,
    pub field: String,
    pub encoding: &'static str,
}

/// Umbrella error returned by [`ShapeDataset::load`](crate::ShapeDataset::load).
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("missing file: {path}")]
    MissingFile { path: PathBuf },

    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Geometry(#[from] MalformedGeometry),

    #[error(transparent)]
    Attributes(#[from] MalformedAttributes),

    #[error(transparent)]
    Encoding(#[from] EncodingError),

    #[error("dataset has {shapes} geometry records but {rows} attribute rows")]
    CountMismatch { shapes: usize, rows: usize },
}
