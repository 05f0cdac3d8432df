//! A read-only query engine over shapefile triples (`.shp` geometry,
//! `.dbf` attribute table, `.shx` offset index).
//!
//! A [`ShapeDataset`] is loaded once from a base path and is immutable
//! afterwards; every query is a pure read, so a loaded dataset can be shared
//! freely across threads.

mod attr;
mod dataset;
mod error;
mod geom;
mod io;

#[doc(inline)]
pub use attr::{AttributeRecord, AttributeValue, Date, FieldInfo, FieldType};

#[doc(inline)]
pub use dataset::{IndexSet, ShapeDataset};

#[doc(inline)]
pub use error::{EncodingError, LoadError, MalformedAttributes, MalformedGeometry};

#[doc(inline)]
pub use geom::ShapeRecord;
