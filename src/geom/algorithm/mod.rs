mod contains;
mod distance;

pub(crate) use contains::polygon_contains;
pub(crate) use distance::{rect_distance_2, ring_distance_2};
