mod field;
mod table;
mod value;

pub use field::{FieldInfo, FieldType};
pub use table::AttributeRecord;
pub use value::{AttributeValue, Date};

pub(crate) use table::{AttributeTable, Row};
