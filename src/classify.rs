//! Per-road attributes for styling: ordinal highway class and distance-scaled width.

use geo::{Distance, Euclidean, Point};

use crate::{geom::Road, source::HighwayTag};

/// Index of the road's primary `highway` value in `order`, or `order.len()` ("other").
pub fn highway_class(tag: &HighwayTag, order: &[String]) -> usize {
    tag.primary()
        .and_then(|value| order.iter().position(|known| known == value))
        .unwrap_or(order.len())
}

/// Planar distance from a road (any of its parts) to `center`.
pub fn distance_to(road: &Road, center: &Point<f64>) -> f64 {
    road.geometry.0.iter()
        .map(|line| Euclidean.distance(center, line))
        .fold(f64::INFINITY, f64::min)
}

/// Map distances to line widths: `exp(-d / decay)` rescaled linearly onto `range`,
/// so the nearest road gets `range.1` and the farthest `range.0`.
/// Equal distances all get the midpoint of `range`.
pub fn scaled_widths(distances: &[f64], decay: f64, range: (f64, f64)) -> Vec<f64> {
    let raw: Vec<f64> = distances.iter().map(|d| (-d / decay).exp()).collect();

    let (min, max) = raw.iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    let (lo, hi) = range;

    if max > min {
        raw.iter().map(|v| lo + (v - min) / (max - min) * (hi - lo)).collect()
    } else {
        vec![(lo + hi) / 2.0; raw.len()]
    }
}

/// Styling attributes of one road.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RoadStyle {
    pub class: usize,
    pub distance: f64,
    pub width: f64,
}

/// Classify every road and compute its distance-scaled width.
pub fn style_roads(roads: &[Road], center: &Point<f64>, order: &[String], decay: f64, range: (f64, f64)) -> Vec<RoadStyle> {
    let distances: Vec<f64> = roads.iter().map(|road| distance_to(road, center)).collect();
    let widths = scaled_widths(&distances, decay, range);

    roads.iter().zip(distances).zip(widths)
        .map(|((road, distance), width)| RoadStyle {
            class: highway_class(&road.highway, order),
            distance,
            width,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HIGHWAY_ORDER;
    use geo::{MultiLineString, line_string};

    fn order() -> Vec<String> { HIGHWAY_ORDER.iter().map(|s| s.to_string()).collect() }

    #[test]
    fn classifies_known_list_and_unknown_tags() {
        let order = order();
        assert_eq!(highway_class(&HighwayTag::from("primary"), &order), 2);
        assert_eq!(highway_class(&HighwayTag::from(&["residential", "service"][..]), &order), 6);
        assert_eq!(highway_class(&HighwayTag::from("footway"), &order), 8);
        assert_eq!(highway_class(&HighwayTag::Many(vec![]), &order), 8);
    }

    #[test]
    fn nearest_is_widest_and_farthest_is_thinnest() {
        let widths = scaled_widths(&[0.0, 250_000.0, 1_000_000.0, 3_000_000.0], 1e6, (0.05, 0.9));

        assert!((widths[0] - 0.9).abs() < 1e-12);
        assert!((widths[3] - 0.05).abs() < 1e-12);
        assert!(widths.windows(2).all(|w| w[0] > w[1]));
        assert!(widths.iter().all(|&w| (0.05..=0.9).contains(&w)));
    }

    #[test]
    fn equal_distances_get_the_midpoint() {
        let widths = scaled_widths(&[42.0, 42.0, 42.0], 1e6, (0.05, 0.9));
        assert_eq!(widths.len(), 3);
        assert!(widths.iter().all(|w| (w - 0.475).abs() < 1e-12));
        assert!((scaled_widths(&[7.0], 1e6, (0.05, 0.9))[0] - 0.475).abs() < 1e-12);
        assert!(scaled_widths(&[], 1e6, (0.05, 0.9)).is_empty());
    }

    #[test]
    fn distance_uses_the_closest_part() {
        let road = Road {
            highway: HighwayTag::from("trunk"),
            geometry: MultiLineString::new(vec![
                line_string![(x: 10.0, y: -5.0), (x: 10.0, y: 5.0)],
                line_string![(x: 3.0, y: -5.0), (x: 3.0, y: 5.0)],
            ]),
        };
        assert!((distance_to(&road, &Point::new(0.0, 0.0)) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn style_roads_pairs_class_and_width() {
        let roads = vec![
            Road { highway: HighwayTag::from("motorway"), geometry: MultiLineString::new(vec![line_string![(x: 1.0, y: 0.0), (x: 2.0, y: 0.0)]]) },
            Road { highway: HighwayTag::from("track"), geometry: MultiLineString::new(vec![line_string![(x: 500_000.0, y: 0.0), (x: 600_000.0, y: 0.0)]]) },
        ];
        let styles = style_roads(&roads, &Point::new(0.0, 0.0), &order(), 1e6, (0.05, 0.9));

        assert_eq!(styles[0].class, 0);
        assert_eq!(styles[1].class, 8);
        assert!((styles[0].width - 0.9).abs() < 1e-12);
        assert!((styles[1].width - 0.05).abs() < 1e-12);
    }
}
