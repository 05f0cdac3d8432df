/// dBase field type tag.
///
/// Unknown tags decode as [`FieldType::Character`] so a row is never lost to
/// an exotic writer; the raw text is preserved as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Character,
    Numeric,
    Float,
    Logical,
    Date,
}

impl FieldType {
    pub(crate) fn from_tag(tag: u8) -> Self {
        match tag {
            b'N' => FieldType::Numeric,
            b'F' => FieldType::Float,
            b'L' => FieldType::Logical,
            b'D' => FieldType::Date,
            _ => FieldType::Character,
        }
    }
}

/// One field definition from the attribute table header, fixed for the whole
/// dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldInfo {
    pub name: String,
    pub field_type: FieldType,
    pub width: usize,
    pub decimals: usize,
}
