use std::fmt;

/// A calendar date as stored in a dBase `D` field (`YYYYMMDD`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Date {
    pub year: i32,
    pub month: u8,
    pub day: u8,
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

/// One typed attribute cell.
///
/// The variant set is fixed per field for a whole dataset: a numeric field
/// with zero decimals always yields `Integer`, one with decimals yields
/// `Numeric`, and so on. Blank cells of any field type decode to `Null`.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Character(String),
    Integer(i64),
    Numeric(f64),
    Logical(bool),
    Date(Date),
    Null,
}

impl AttributeValue {
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, AttributeValue::Null)
    }

    /// Text content of a character cell.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::Character(s) => Some(s),
            _ => None,
        }
    }

    /// Integer content of an integer cell.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            AttributeValue::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Numeric content of an integer or float cell.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttributeValue::Integer(n) => Some(*n as f64),
            AttributeValue::Numeric(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttributeValue::Logical(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<Date> {
        match self {
            AttributeValue::Date(d) => Some(*d),
            _ => None,
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Character(s) => f.write_str(s),
            AttributeValue::Integer(n) => write!(f, "{n}"),
            AttributeValue::Numeric(x) => write!(f, "{x}"),
            AttributeValue::Logical(b) => write!(f, "{b}"),
            AttributeValue::Date(d) => write!(f, "{d}"),
            AttributeValue::Null => f.write_str(""),
        }
    }
}
