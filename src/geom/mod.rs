mod algorithm;
mod bbox;

pub(crate) use bbox::BoundingBox;

use geo::{Coord, LineString, MultiPolygon, Point, Polygon, Rect};

/// One decoded geometry record: rings grouped into polygons plus the tight
/// axis-aligned envelope of every ring point, computed once at load time.
///
/// An empty ring set marks a null or degraded record; such records contain
/// no point and have no bounding box.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeRecord {
    shape: MultiPolygon<f64>,
    bbox: Option<Rect<f64>>,
}

impl ShapeRecord {
    /// Build a record from raw file-order rings. Rings are assumed closed;
    /// the envelope covers every ring point, including any orphan hole a
    /// malformed record may carry.
    pub(crate) fn from_rings(rings: Vec<LineString<f64>>) -> Self {
        Self {
            bbox: envelope(&rings),
            shape: group_rings(rings),
        }
    }

    /// The record's polygons (holes attached to their exterior rings).
    #[inline] pub fn shape(&self) -> &MultiPolygon<f64> { &self.shape }

    /// Tight bounding box, or `None` for a null/degraded record.
    #[inline] pub fn bbox(&self) -> Option<Rect<f64>> { self.bbox }

    /// True for a null or degraded record with no rings.
    #[inline] pub fn is_empty(&self) -> bool { self.shape.0.is_empty() }

    /// Crossing-number containment over all polygons of the record.
    pub fn contains(&self, point: Point<f64>) -> bool {
        self.shape
            .0
            .iter()
            .any(|polygon| algorithm::polygon_contains(polygon, point.0))
    }

    /// Minimum squared distance from `point` to any ring edge of the record,
    /// or `None` for a record with no edges.
    pub fn boundary_distance_2(&self, point: Point<f64>) -> Option<f64> {
        self.shape
            .0
            .iter()
            .flat_map(|polygon| {
                std::iter::once(polygon.exterior()).chain(polygon.interiors())
            })
            .filter_map(|ring| algorithm::ring_distance_2(ring, point.0))
            .reduce(f64::min)
    }
}

/// Tight envelope of all ring points.
fn envelope(rings: &[LineString<f64>]) -> Option<Rect<f64>> {
    let mut coords = rings.iter().flat_map(|ring| ring.coords().copied());
    let first = coords.next()?;
    let (min, max) = coords.fold((first, first), |(min, max), c| {
        (
            Coord { x: min.x.min(c.x), y: min.y.min(c.y) },
            Coord { x: max.x.max(c.x), y: max.y.max(c.y) },
        )
    });
    Some(Rect::new(min, max))
}

/// Get the signed area of a ring (negative for clockwise winding).
fn signed_area(ring: &LineString<f64>) -> f64 {
    let mut a = 0.0;
    for w in ring.0.windows(2) {
        a += w[0].x * w[1].y - w[1].x * w[0].y;
    }
    a / 2.0
}

/// Group file-order rings into polygons. Shapefiles wind exterior rings
/// clockwise and store each exterior's holes immediately after it; holes
/// that precede any exterior attach to the next one.
fn group_rings(rings: Vec<LineString<f64>>) -> MultiPolygon<f64> {
    let mut polygons: Vec<Polygon<f64>> = Vec::new();
    let mut current_exterior: Option<LineString<f64>> = None;
    let mut current_holes: Vec<LineString<f64>> = Vec::new();

    for ring in rings {
        let is_exterior = signed_area(&ring) < 0.0;
        if is_exterior {
            if let Some(exterior) = current_exterior.take() {
                polygons.push(Polygon::new(exterior, std::mem::take(&mut current_holes)));
            }
            current_exterior = Some(ring);
        } else {
            current_holes.push(ring);
        }
    }
    if let Some(exterior) = current_exterior {
        polygons.push(Polygon::new(exterior, current_holes));
    }

    MultiPolygon(polygons)
}
