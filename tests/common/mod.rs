//! Fixture builders: emit minimal valid shapefile triples on disk.
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

pub const FILE_CODE: i32 = 9994;
pub const FILE_HEADER_LEN: usize = 100;
pub const SHAPE_POLYGON: i32 = 5;

/// A clockwise (exterior) square ring, closed.
pub fn square(x0: f64, y0: f64, size: f64) -> Vec<(f64, f64)> {
    vec![
        (x0, y0),
        (x0, y0 + size),
        (x0 + size, y0 + size),
        (x0 + size, y0),
        (x0, y0),
    ]
}

/// A counter-clockwise (hole) square ring, closed.
pub fn hole(x0: f64, y0: f64, size: f64) -> Vec<(f64, f64)> {
    vec![
        (x0, y0),
        (x0 + size, y0),
        (x0 + size, y0 + size),
        (x0, y0 + size),
        (x0, y0),
    ]
}

/// Content section of one polygon record.
pub fn polygon_record(rings: &[Vec<(f64, f64)>]) -> Vec<u8> {
    let mut content = Vec::new();
    content.extend_from_slice(&SHAPE_POLYGON.to_le_bytes());
    content.extend_from_slice(&[0u8; 32]); // box, unread by the decoder
    let num_points: i32 = rings.iter().map(|ring| ring.len() as i32).sum();
    content.extend_from_slice(&(rings.len() as i32).to_le_bytes());
    content.extend_from_slice(&num_points.to_le_bytes());
    let mut start = 0i32;
    for ring in rings {
        content.extend_from_slice(&start.to_le_bytes());
        start += ring.len() as i32;
    }
    for ring in rings {
        for &(x, y) in ring {
            content.extend_from_slice(&x.to_le_bytes());
            content.extend_from_slice(&y.to_le_bytes());
        }
    }
    content
}

/// Content section of a null-shape record.
pub fn null_record() -> Vec<u8> {
    0i32.to_le_bytes().to_vec()
}

fn file_header(total_len: usize) -> Vec<u8> {
    let mut header = vec![0u8; FILE_HEADER_LEN];
    header[0..4].copy_from_slice(&FILE_CODE.to_be_bytes());
    header[24..28].copy_from_slice(&((total_len / 2) as i32).to_be_bytes());
    header[28..32].copy_from_slice(&1000i32.to_le_bytes());
    header[32..36].copy_from_slice(&SHAPE_POLYGON.to_le_bytes());
    header
}

/// Assemble a `.shp` stream from record content sections.
pub fn build_shp(contents: &[Vec<u8>]) -> Vec<u8> {
    let total = FILE_HEADER_LEN + contents.iter().map(|c| 8 + c.len()).sum::<usize>();
    let mut bytes = file_header(total);
    for (record, content) in contents.iter().enumerate() {
        bytes.extend_from_slice(&(record as i32 + 1).to_be_bytes());
        bytes.extend_from_slice(&((content.len() / 2) as i32).to_be_bytes());
        bytes.extend_from_slice(content);
    }
    bytes
}

/// Assemble the matching `.shx` index for the same record contents.
pub fn build_shx(contents: &[Vec<u8>]) -> Vec<u8> {
    let total = FILE_HEADER_LEN + contents.len() * 8;
    let mut bytes = file_header(total);
    let mut offset = FILE_HEADER_LEN;
    for content in contents {
        bytes.extend_from_slice(&((offset / 2) as i32).to_be_bytes());
        bytes.extend_from_slice(&((content.len() / 2) as i32).to_be_bytes());
        offset += 8 + content.len();
    }
    bytes
}

/// Assemble a `.dbf` table. Each row is a deletion flag (0x20 live, b'*'
/// deleted) plus one raw cell per field, padded or truncated to field width.
pub fn build_dbf(fields: &[(&str, u8, u8, u8)], rows: &[(u8, Vec<Vec<u8>>)], ldid: u8) -> Vec<u8> {
    let header_size = 32 + fields.len() * 32 + 1;
    let record_size = 1 + fields.iter().map(|&(_, _, width, _)| width as usize).sum::<usize>();

    let mut bytes = vec![0u8; 32];
    bytes[0] = 0x03;
    bytes[4..8].copy_from_slice(&(rows.len() as u32).to_le_bytes());
    bytes[8..10].copy_from_slice(&(header_size as u16).to_le_bytes());
    bytes[10..12].copy_from_slice(&(record_size as u16).to_le_bytes());
    bytes[29] = ldid;

    for &(name, tag, width, decimals) in fields {
        let mut descriptor = [0u8; 32];
        descriptor[..name.len()].copy_from_slice(name.as_bytes());
        descriptor[11] = tag;
        descriptor[16] = width;
        descriptor[17] = decimals;
        bytes.extend_from_slice(&descriptor);
    }
    bytes.push(0x0D);

    for (flag, cells) in rows {
        bytes.push(*flag);
        for (cell, &(_, _, width, _)) in cells.iter().zip(fields) {
            let mut padded = cell.clone();
            padded.resize(width as usize, b' ');
            bytes.extend_from_slice(&padded);
        }
    }
    bytes.push(0x1A);
    bytes
}

/// A one-character-field table with one live row per name.
pub fn name_dbf(names: &[&str]) -> Vec<u8> {
    let rows: Vec<(u8, Vec<Vec<u8>>)> = names
        .iter()
        .map(|name| (0x20, vec![name.as_bytes().to_vec()]))
        .collect();
    build_dbf(&[("NAME", b'C', 10, 0)], &rows, 0x57)
}

/// Write the triple under `dir` and return the extensionless base path.
pub fn write_dataset(
    dir: &Path,
    name: &str,
    shp: &[u8],
    shx: Option<&[u8]>,
    dbf: &[u8],
) -> PathBuf {
    let base = dir.join(name);
    fs::write(base.with_extension("shp"), shp).unwrap();
    if let Some(shx) = shx {
        fs::write(base.with_extension("shx"), shx).unwrap();
    }
    fs::write(base.with_extension("dbf"), dbf).unwrap();
    base
}

/// Two disjoint unit squares: record 0 at (0,0)..(1,1), record 1 at
/// (3,0)..(4,1), with NAME attributes "alpha" and "beta".
pub fn two_squares(dir: &Path) -> PathBuf {
    let contents = vec![
        polygon_record(&[square(0.0, 0.0, 1.0)]),
        polygon_record(&[square(3.0, 0.0, 1.0)]),
    ];
    write_dataset(
        dir,
        "squares",
        &build_shp(&contents),
        Some(&build_shx(&contents)),
        &name_dbf(&["alpha", "beta"]),
    )
}
