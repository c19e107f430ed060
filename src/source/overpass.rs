//! Overpass road-network download.
//!
//! Large areas are split on a regular grid and fetched piecewise, the way OSMnx keeps each
//! sub-query under the public server's limits.

use std::{collections::HashMap, thread, time::Duration};

use ahash::AHashSet;
use anyhow::{Context, Result};
use geo::{BooleanOps, BoundingRect, Coord, MultiPolygon, Polygon, Rect, Simplify};
use reqwest::blocking::Client;
use serde::Deserialize;

use crate::{
    common,
    config::ServiceConfig,
    source::{OsmWay, RoadEdge, RoadSource, simplify_ways},
};

/// Overpass tag filter equivalent to OSMnx's "drive" network type.
const DRIVE_FILTER: &str = concat!(
    r#"["highway"]["area"!~"yes"]["access"!~"private"]"#,
    r#"["highway"!~"abandoned|bridleway|bus_guideway|construction|corridor|cycleway|elevator|"#,
    r#"escalator|footway|path|pedestrian|planned|platform|proposed|raceway|service|steps|track"]"#,
    r#"["motor_vehicle"!~"no"]["motorcar"!~"no"]"#,
    r#"["service"!~"alley|driveway|emergency_access|parking|parking_aisle|private"]"#,
);

/// Drivable roads from an Overpass API instance.
pub struct OverpassRoads {
    client: Client,
    url: String,
    cell_deg: f64,
    simplify_deg: f64,
    pause: Duration,
    timeout_s: u64,
}

impl OverpassRoads {
    pub fn new(service: &ServiceConfig) -> Result<Self> {
        Ok(Self {
            client: common::build_client(&service.user_agent, Duration::from_secs(service.overpass_timeout_s + 60))?,
            url: service.overpass_url.clone(),
            cell_deg: service.query_cell_deg,
            simplify_deg: service.query_simplify_deg,
            pause: Duration::from_millis(service.pause_ms),
            timeout_s: service.overpass_timeout_s,
        })
    }
}

impl RoadSource for OverpassRoads {
    fn roads(&mut self, area: &MultiPolygon<f64>) -> Result<Vec<RoadEdge>> {
        let pieces = subdivide(area, self.cell_deg);
        log::debug!("[overpass] {} sub-queries", pieces.len());

        let mut seen: AHashSet<i64> = AHashSet::new();
        let mut ways = Vec::new();
        for (i, piece) in pieces.iter().enumerate() {
            if i > 0 { thread::sleep(self.pause) }

            let query = cell_query(piece, self.simplify_deg, self.timeout_s);
            let body = common::post_form(&self.client, &self.url, &[("data", query.as_str())])?;
            let fetched = parse_ways(&body)
                .with_context(|| format!("[overpass] bad response for sub-query {}/{}", i + 1, pieces.len()))?;

            log::trace!("[overpass] sub-query {}/{}: {} ways", i + 1, pieces.len(), fetched.len());
            ways.extend(fetched.into_iter().filter(|way| seen.insert(way.id)));
        }

        let edges = simplify_ways(&ways);
        log::debug!("[overpass] {} ways -> {} edges", ways.len(), edges.len());
        Ok(edges)
    }
}

/// Cut `area` into the non-empty polygons of its intersection with a `cell_deg` grid.
fn subdivide(area: &MultiPolygon<f64>, cell_deg: f64) -> Vec<Polygon<f64>> {
    let Some(bounds) = area.bounding_rect() else { return Vec::new() };

    let cols = (bounds.width() / cell_deg).ceil().max(1.0) as usize;
    let rows = (bounds.height() / cell_deg).ceil().max(1.0) as usize;
    if cols * rows == 1 { return area.0.clone() }

    let mut pieces = Vec::new();
    for row in 0..rows {
        for col in 0..cols {
            let min = Coord {
                x: bounds.min().x + col as f64 * cell_deg,
                y: bounds.min().y + row as f64 * cell_deg,
            };
            let cell = Rect::new(min, Coord { x: min.x + cell_deg, y: min.y + cell_deg });
            let clipped = area.intersection(&MultiPolygon::new(vec![cell.to_polygon()]));
            pieces.extend(clipped.0);
        }
    }
    pieces
}

/// Overpass `poly:` filter value: space separated "lat lon" pairs of the exterior ring.
fn poly_filter(polygon: &Polygon<f64>) -> String {
    polygon.exterior().0.iter()
        .map(|c| format!("{:.6} {:.6}", c.y, c.x))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Query for one grid piece, simplified to keep the request small.
#[inline]
fn cell_query(piece: &Polygon<f64>, simplify_deg: f64, timeout_s: u64) -> String {
    build_query(&piece.simplify(simplify_deg), timeout_s)
}

fn build_query(polygon: &Polygon<f64>, timeout_s: u64) -> String {
    format!(
        r#"[out:json][timeout:{timeout_s}];(way{DRIVE_FILTER}(poly:"{}"););out body geom;"#,
        poly_filter(polygon),
    )
}

#[derive(Deserialize)]
struct OverpassResponse {
    elements: Vec<Element>,
}

#[derive(Deserialize)]
struct Element {
    #[serde(rename = "type")]
    kind: String,
    id: i64,
    #[serde(default)]
    nodes: Vec<i64>,
    #[serde(default)]
    geometry: Vec<Option<LatLon>>,
    #[serde(default)]
    tags: HashMap<String, String>,
}

#[derive(Deserialize)]
struct LatLon {
    lat: f64,
    lon: f64,
}

/// Parse the ways of an Overpass JSON response. Ways with missing node coordinates are dropped.
fn parse_ways(body: &str) -> Result<Vec<OsmWay>> {
    let response: OverpassResponse = serde_json::from_str(body)
        .context("response is not Overpass JSON")?;

    Ok(response.elements.into_iter()
        .filter(|element| element.kind == "way")
        .filter_map(|element| {
            let coords = element.geometry.into_iter()
                .map(|point| point.map(|p| Coord { x: p.lon, y: p.lat }))
                .collect::<Option<Vec<_>>>()?;
            Some(OsmWay { id: element.id, nodes: element.nodes, coords, tags: element.tags })
        })
        .collect())
}
