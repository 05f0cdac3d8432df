//! Binary decoders for the shapefile triple: `.shp` geometry, `.dbf`
//! attribute table, `.shx` offset index.
//!
//! The `.shp`/`.shx` formats mix byte orders: record and file headers are
//! big-endian while shape payloads are little-endian. Every reader below is
//! explicit about which order it applies to which field group.

pub(crate) mod dbf;
pub(crate) mod shp;
pub(crate) mod shx;

/// Magic number at the start of `.shp` and `.shx` files.
pub(crate) const FILE_CODE: i32 = 9994;

/// Length of the fixed `.shp`/`.shx` file header.
pub(crate) const FILE_HEADER_LEN: usize = 100;

// Fixed-width reads below index into pre-validated slices; every caller
// bounds-checks before reading.

#[inline]
pub(crate) fn i32_be(bytes: &[u8], at: usize) -> i32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&bytes[at..at + 4]);
    i32::from_be_bytes(buf)
}

#[inline]
pub(crate) fn i32_le(bytes: &[u8], at: usize) -> i32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&bytes[at..at + 4]);
    i32::from_le_bytes(buf)
}

#[inline]
pub(crate) fn u16_le(bytes: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([bytes[at], bytes[at + 1]])
}

#[inline]
pub(crate) fn u32_le(bytes: &[u8], at: usize) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&bytes[at..at + 4]);
    u32::from_le_bytes(buf)
}

#[inline]
pub(crate) fn f64_le(bytes: &[u8], at: usize) -> f64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&bytes[at..at + 8]);
    f64::from_le_bytes(buf)
}
