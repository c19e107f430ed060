use geo::{Area, Buffer, MultiPolygon};

/// Keep only the largest-area polygon of a boundary, dropping islets.
/// An empty boundary is returned as is.
pub fn largest_part(boundary: &MultiPolygon<f64>) -> MultiPolygon<f64> {
    boundary.0.iter()
        .max_by(|a, b| a.unsigned_area().total_cmp(&b.unsigned_area()))
        .map(|largest| MultiPolygon::new(vec![largest.clone()]))
        .unwrap_or_else(|| boundary.clone())
}

/// Dilate a lon/lat boundary by `distance` degrees for the road fetch.
#[inline]
pub fn fetch_area(boundary: &MultiPolygon<f64>, distance: f64) -> MultiPolygon<f64> {
    boundary.buffer(distance)
}
