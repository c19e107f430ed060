//! Collaborators that supply boundaries and road networks.

mod network;
#[cfg(feature = "download")]
mod nominatim;
#[cfg(feature = "download")]
mod overpass;

use anyhow::Result;
use geo::{LineString, MultiPolygon};

pub use network::{OsmWay, simplify_ways};
#[cfg(feature = "download")]
pub use nominatim::NominatimBoundaries;
#[cfg(feature = "download")]
pub use overpass::OverpassRoads;

/// The `highway` tag of a road: usually one value, a list when edges were merged.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HighwayTag {
    One(String),
    Many(Vec<String>),
}

impl HighwayTag {
    /// The value used for classification (first element of a list).
    pub fn primary(&self) -> Option<&str> {
        match self {
            HighwayTag::One(value) => Some(value),
            HighwayTag::Many(values) => values.first().map(String::as_str),
        }
    }
}

impl From<&str> for HighwayTag {
    fn from(value: &str) -> Self { HighwayTag::One(value.to_string()) }
}

impl From<&[&str]> for HighwayTag {
    fn from(values: &[&str]) -> Self { HighwayTag::Many(values.iter().map(|v| v.to_string()).collect()) }
}

/// One edge of the simplified road graph, in lon/lat. Merged edges keep the id of
/// their first way.
#[derive(Clone, Debug, PartialEq)]
pub struct RoadEdge {
    pub way_id: i64,
    pub highway: HighwayTag,
    pub geometry: LineString<f64>,
    /// Traversable only in the geometry's direction.
    pub oneway: bool,
}

/// Resolves a free-text place query to its administrative boundary (lon/lat).
pub trait BoundarySource {
    fn boundary(&mut self, query: &str) -> Result<MultiPolygon<f64>>;
}

/// Fetches the drivable road network inside an area (lon/lat).
pub trait RoadSource {
    fn roads(&mut self, area: &MultiPolygon<f64>) -> Result<Vec<RoadEdge>>;
}
