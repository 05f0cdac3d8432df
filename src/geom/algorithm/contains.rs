use geo::{Coord, LineString, Polygon};

/// Count how many ring edges a horizontal ray from `point` toward +infinity
/// crosses.
///
/// The ring is assumed closed (first coordinate repeated last). An edge is
/// counted only when exactly one endpoint lies strictly above the ray and the
/// intersection is strictly right of the point. This half-open rule makes the
/// on-edge convention deterministic and independent of ring direction or
/// vertex order: a point exactly on a bottom or left edge is inside, a point
/// exactly on a top or right edge is outside.
pub(crate) fn ray_crossings(ring: &LineString<f64>, point: Coord<f64>) -> usize {
    let mut crossings = 0;
    for edge in ring.lines() {
        let (a, b) = (edge.start, edge.end);
        if (a.y > point.y) != (b.y > point.y) {
            let t = (point.y - a.y) / (b.y - a.y);
            if a.x + t * (b.x - a.x) > point.x {
                crossings += 1;
            }
        }
    }
    crossings
}

/// Crossing-number test: odd crossings means the point is inside the ring.
#[inline]
pub(crate) fn ring_contains(ring: &LineString<f64>, point: Coord<f64>) -> bool {
    ray_crossings(ring, point) % 2 == 1
}

/// A polygon contains a point when its exterior ring does and no hole does.
pub(crate) fn polygon_contains(polygon: &Polygon<f64>, point: Coord<f64>) -> bool {
    ring_contains(polygon.exterior(), point)
        && !polygon
            .interiors()
            .iter()
            .any(|hole| ring_contains(hole, point))
}
