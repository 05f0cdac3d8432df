use geo::{Coord, LineString, Rect};

/// Squared Euclidean distance from `point` to the segment `start`..`end`.
pub(crate) fn segment_distance_2(point: Coord<f64>, start: Coord<f64>, end: Coord<f64>) -> f64 {
    let dx = end.x - start.x;
    let dy = end.y - start.y;
    let len_2 = dx * dx + dy * dy;

    // Degenerate segments collapse to point distance.
    let t = if len_2 == 0.0 {
        0.0
    } else {
        (((point.x - start.x) * dx + (point.y - start.y) * dy) / len_2).clamp(0.0, 1.0)
    };

    let px = start.x + t * dx - point.x;
    let py = start.y + t * dy - point.y;
    px * px + py * py
}

/// Minimum squared distance from `point` to any edge of the ring, or `None`
/// for a ring with no edges.
pub(crate) fn ring_distance_2(ring: &LineString<f64>, point: Coord<f64>) -> Option<f64> {
    ring.lines()
        .map(|edge| segment_distance_2(point, edge.start, edge.end))
        .reduce(f64::min)
}

/// Squared distance from `point` to the axis-aligned rectangle (zero inside).
///
/// This is a lower bound on the boundary distance of any geometry the
/// rectangle encloses, which is what makes it usable for pruning.
pub(crate) fn rect_distance_2(rect: &Rect<f64>, point: Coord<f64>) -> f64 {
    let dx = (rect.min().x - point.x).max(0.0).max(point.x - rect.max().x);
    let dy = (rect.min().y - point.y).max(0.0).max(point.y - rect.max().y);
    dx * dx + dy * dy
}
