use geo::{BooleanOps, LineString, MultiLineString, MultiPolygon, PreparedGeometry, Relate};

use crate::source::HighwayTag;

/// A road in planar coordinates. Clipping may split one edge into several parts.
#[derive(Clone, Debug, PartialEq)]
pub struct Road {
    pub highway: HighwayTag,
    pub geometry: MultiLineString<f64>,
}

/// True when a part still has length: at least two distinct coordinates.
#[inline]
pub fn is_line(line: &LineString<f64>) -> bool {
    line.0.windows(2).any(|pair| pair[0] != pair[1])
}

/// Restrict roads to `boundary`, dropping anything that collapses to a point.
///
/// Roads wholly inside are kept untouched and disjoint roads are dropped without
/// running the overlay; only roads crossing the boundary are clipped.
pub fn clip_roads(roads: Vec<Road>, boundary: &MultiPolygon<f64>) -> Vec<Road> {
    let prepared: PreparedGeometry<'_, _, f64> = PreparedGeometry::from(boundary);

    roads.into_iter()
        .filter_map(|road| {
            let matrix = prepared.relate(&road.geometry);
            let geometry = if matrix.is_contains() {
                road.geometry
            } else if matrix.is_disjoint() {
                return None;
            } else {
                boundary.clip(&road.geometry, false)
            };

            let parts: Vec<_> = geometry.0.into_iter().filter(is_line).collect();
            (!parts.is_empty()).then(|| Road { highway: road.highway, geometry: MultiLineString::new(parts) })
        })
        .collect()
}
