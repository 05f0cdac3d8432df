use std::collections::BTreeSet;
use std::io::ErrorKind;
use std::path::Path;

use geo::Point;
use rstar::{AABB, RTree};

use crate::attr::{AttributeRecord, AttributeTable, FieldInfo};
use crate::error::LoadError;
use crate::geom::{BoundingBox, ShapeRecord};
use crate::io::{dbf, shp, shx};

/// Sorted, duplicate-free set of record positions returned by every query.
pub type IndexSet = BTreeSet<usize>;

/// A loaded shapefile triple: parallel geometry and attribute records plus a
/// bounding-box R-tree over the geometry.
///
/// Immutable after [`load`](Self::load); all queries are pure reads, so a
/// dataset can be queried concurrently from any number of threads.
#[derive(Debug, Clone)]
pub struct ShapeDataset {
    base_name: String,
    records: Vec<ShapeRecord>,
    table: AttributeTable,
    rtree: RTree<BoundingBox>,
    last_error: Option<String>,
}

impl ShapeDataset {
    /// Load the dataset at `base` (path without extension, or with any
    /// extension, which is replaced): `base.shp` and `base.dbf` are required,
    /// `base.shx` is used for random access when present and usable.
    ///
    /// All three files are read and released before this returns; no handle
    /// is held across queries. Per-record decode problems degrade that record
    /// and are reported through [`last_error_message`](Self::last_error_message);
    /// only structural corruption or a missing required file fails the load.
    pub fn load(base: impl AsRef<Path>) -> Result<Self, LoadError> {
        let base = base.as_ref();
        let shp_bytes = read_required(&base.with_extension("shp"))?;
        let dbf_bytes = read_required(&base.with_extension("dbf"))?;

        let mut warnings = Vec::new();
        let shx_path = base.with_extension("shx");
        let index = match std::fs::read(&shx_path) {
            Ok(bytes) => match shx::decode(&bytes) {
                Ok(spans) => Some(spans),
                Err(err) => {
                    tracing::warn!(%err, "unreadable shape index, scanning sequentially");
                    warnings.push(format!("unreadable shape index: {err}"));
                    None
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tracing::debug!("no shape index present, scanning sequentially");
                None
            }
            Err(err) => {
                tracing::warn!(path = %shx_path.display(), %err, "failed to read shape index");
                warnings.push(format!("failed to read shape index: {err}"));
                None
            }
        };

        let decoded = shp::decode(&shp_bytes, index.as_deref())?;
        let attributes = dbf::decode(&dbf_bytes)?;

        if decoded.shapes.len() != attributes.table.len() {
            return Err(LoadError::CountMismatch {
                shapes: decoded.shapes.len(),
                rows: attributes.table.len(),
            });
        }

        warnings.extend(decoded.warnings);
        warnings.extend(attributes.warnings);

        let records: Vec<ShapeRecord> =
            decoded.shapes.into_iter().map(ShapeRecord::from_rings).collect();
        let rtree = RTree::bulk_load(
            records
                .iter()
                .enumerate()
                .filter_map(|(i, record)| record.bbox().map(|bbox| BoundingBox::new(i, bbox)))
                .collect(),
        );

        let base_name = base
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();

        tracing::debug!(
            dataset = %base_name,
            records = records.len(),
            warnings = warnings.len(),
            "loaded shape dataset"
        );

        Ok(Self {
            base_name,
            records,
            table: attributes.table,
            rtree,
            last_error: (!warnings.is_empty()).then(|| warnings.join("; ")),
        })
    }

    /// Number of records (geometry and attribute counts always agree).
    #[inline] pub fn len(&self) -> usize { self.records.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.records.is_empty() }

    /// The dataset's identifying base name (file stem of the base path).
    #[inline] pub fn base_name(&self) -> &str { &self.base_name }

    /// The attribute field schema, fixed for the dataset's lifetime.
    #[inline] pub fn fields(&self) -> &[FieldInfo] { self.table.fields() }

    /// Human-readable summary of non-fatal decode problems from the load, or
    /// `None` for a clean load. A log line, not a structured error channel.
    pub fn last_error_message(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// All records in file order, geometry paired with attributes. Lazy and
    /// restartable; no copy of the dataset is made.
    pub fn records(&self) -> impl Iterator<Item = (&ShapeRecord, AttributeRecord<'_>)> {
        self.records
            .iter()
            .enumerate()
            .map(|(i, record)| (record, self.table.record(i)))
    }

    /// All attribute rows in file order, without geometry.
    pub fn shapes(&self) -> impl Iterator<Item = AttributeRecord<'_>> {
        (0..self.table.len()).map(|i| self.table.record(i))
    }

    /// Indices of records whose attributes satisfy `predicate`.
    ///
    /// Every row is visited exactly once, in file order, deleted rows
    /// included (filter via [`AttributeRecord::is_deleted`] if needed). A
    /// panicking predicate propagates to the caller.
    pub fn matching<F>(&self, mut predicate: F) -> IndexSet
    where
        F: FnMut(AttributeRecord<'_>) -> bool,
    {
        (0..self.table.len())
            .filter(|&i| predicate(self.table.record(i)))
            .collect()
    }

    /// Indices of every record whose geometry contains `point`.
    ///
    /// Bounding boxes prefilter candidates via the R-tree; survivors get the
    /// exact crossing-number test. Overlapping records all match, with no
    /// early exit on the first hit.
    pub fn containing(&self, point: Point<f64>) -> IndexSet {
        let envelope = AABB::from_point([point.x(), point.y()]);
        self.rtree
            .locate_in_envelope_intersecting(&envelope)
            .filter(|bbox| self.records[bbox.idx()].contains(point))
            .map(|bbox| bbox.idx())
            .collect()
    }

    /// [`containing`](Self::containing), falling back to the record(s) whose
    /// ring boundary is nearest to `point` when nothing contains it.
    ///
    /// Distance is to the nearest edge segment, not to a centroid, and every
    /// index achieving the global minimum is returned. Candidates arrive in
    /// box-distance order; the box distance is a lower bound on the boundary
    /// distance, so the scan stops once it exceeds the best exact distance.
    pub fn containing_or_closest(&self, point: Point<f64>) -> IndexSet {
        let containing = self.containing(point);
        if !containing.is_empty() {
            return containing;
        }

        let mut best = f64::INFINITY;
        let mut closest = IndexSet::new();
        for (bbox, box_distance_2) in self
            .rtree
            .nearest_neighbor_iter_with_distance_2(&[point.x(), point.y()])
        {
            if box_distance_2 > best {
                break;
            }
            let Some(distance_2) = self.records[bbox.idx()].boundary_distance_2(point) else {
                continue;
            };
            if distance_2 < best {
                best = distance_2;
                closest.clear();
                closest.insert(bbox.idx());
            } else if distance_2 == best {
                closest.insert(bbox.idx());
            }
        }
        closest
    }

    /// Geometry records for an index set, in ascending index order.
    pub fn polygons<'a>(&'a self, indices: &'a IndexSet) -> impl Iterator<Item = &'a ShapeRecord> {
        indices.iter().filter_map(|&i| self.records.get(i))
    }
}

fn read_required(path: &Path) -> Result<Vec<u8>, LoadError> {
    std::fs::read(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => LoadError::MissingFile { path: path.to_path_buf() },
        _ => LoadError::Io { path: path.to_path_buf(), source },
    })
}
