use ahash::AHashMap;

use crate::attr::{AttributeValue, FieldInfo};

/// One decoded attribute row. Soft-deleted rows are kept, flagged, so row
/// indices stay aligned with the geometry stream.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Row {
    pub(crate) deleted: bool,
    pub(crate) values: Vec<AttributeValue>,
}

/// The decoded attribute table: one fixed field schema plus all rows.
#[derive(Debug, Clone)]
pub(crate) struct AttributeTable {
    fields: Vec<FieldInfo>,
    by_name: AHashMap<String, usize>,
    rows: Vec<Row>,
}

impl AttributeTable {
    pub(crate) fn new(fields: Vec<FieldInfo>, rows: Vec<Row>) -> Self {
        let by_name = fields
            .iter()
            .enumerate()
            .map(|(i, field)| (field.name.clone(), i))
            .collect();
        Self { fields, by_name, rows }
    }

    #[inline] pub(crate) fn len(&self) -> usize { self.rows.len() }

    #[inline] pub(crate) fn fields(&self) -> &[FieldInfo] { &self.fields }

    /// Row view by index. Panics if out of range; the dataset only hands out
    /// indices it owns.
    #[inline]
    pub(crate) fn record(&self, row: usize) -> AttributeRecord<'_> {
        debug_assert!(row < self.rows.len(), "row out of range");
        AttributeRecord { table: self, row }
    }
}

/// A borrowed view of one attribute row, handed to predicates and iterators.
#[derive(Debug, Clone, Copy)]
pub struct AttributeRecord<'a> {
    table: &'a AttributeTable,
    row: usize,
}

impl<'a> AttributeRecord<'a> {
    /// Look up a value by field name (dBase names are stored uppercase and
    /// matched exactly).
    pub fn get(&self, name: &str) -> Option<&'a AttributeValue> {
        let col = *self.table.by_name.get(name)?;
        Some(&self.table.rows[self.row].values[col])
    }

    /// Iterate (field name, value) pairs in file field order.
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a AttributeValue)> {
        let row = &self.table.rows[self.row];
        self.table
            .fields
            .iter()
            .zip(row.values.iter())
            .map(|(field, value)| (field.name.as_str(), value))
    }

    /// True for a soft-deleted row preserved for index alignment.
    #[inline]
    pub fn is_deleted(&self) -> bool {
        self.table.rows[self.row].deleted
    }
}
