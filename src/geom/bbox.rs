use geo::{Coord, Rect};
use rstar::{AABB, PointDistance, RTreeObject};

use crate::geom::algorithm::rect_distance_2;

/// A bounding box in an R-tree, associated with a shape record by index.
#[derive(Debug, Clone)]
pub(crate) struct BoundingBox {
    idx: usize, // Index of the corresponding record in the dataset
    bbox: Rect<f64>,
}

impl BoundingBox {
    pub(crate) fn new(idx: usize, bbox: Rect<f64>) -> Self {
        Self { idx, bbox }
    }

    /// Get the index of the corresponding record.
    pub(crate) fn idx(&self) -> usize { self.idx }
}

impl RTreeObject for BoundingBox {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.bbox.min().into(), self.bbox.max().into())
    }
}

impl PointDistance for BoundingBox {
    /// Squared distance from a query point to the box, a lower bound on the
    /// boundary distance of the record it encloses.
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        rect_distance_2(&self.bbox, Coord { x: point[0], y: point[1] })
    }
}
