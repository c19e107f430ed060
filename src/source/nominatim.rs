//! Nominatim boundary lookup.
//!
//! See <https://nominatim.org/release-docs/develop/api/Search/>

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use geo::{Geometry, MultiPolygon};
use reqwest::blocking::Client;
use serde_json::Value;

use crate::{common, config::ServiceConfig, source::BoundarySource};

/// Boundary polygons from the Nominatim search endpoint.
pub struct NominatimBoundaries {
    client: Client,
    search_url: String,
}

impl NominatimBoundaries {
    pub fn new(service: &ServiceConfig) -> Result<Self> {
        Ok(Self {
            client: common::build_client(&service.user_agent, Duration::from_secs(60))?,
            search_url: format!("{}/search", service.nominatim_url.trim_end_matches('/')),
        })
    }
}

impl BoundarySource for NominatimBoundaries {
    fn boundary(&mut self, query: &str) -> Result<MultiPolygon<f64>> {
        log::debug!("[nominatim] query {query:?}");
        let body = common::get_text(&self.client, &self.search_url, &[
            ("q", query),
            ("format", "json"),
            ("polygon_geojson", "1"),
            ("limit", "50"),
        ])?;

        parse_boundary(&body)
            .with_context(|| format!("[nominatim] bad response for {query:?}"))?
            .ok_or_else(|| anyhow!("[nominatim] no polygon boundary found for {query:?}"))
    }
}

/// Take the first result whose geometry is polygonal; Polygons become one-part MultiPolygons.
fn parse_boundary(body: &str) -> Result<Option<MultiPolygon<f64>>> {
    let results: Vec<Value> = serde_json::from_str(body)
        .context("response is not a JSON array")?;

    for result in results {
        let Some(json) = result.get("geojson").cloned() else { continue };
        let geometry = geojson::Geometry::from_json_value(json)
            .context("invalid GeoJSON geometry")?;

        match Geometry::<f64>::try_from(geometry).context("unsupported GeoJSON geometry")? {
            Geometry::Polygon(polygon) => return Ok(Some(MultiPolygon::new(vec![polygon]))),
            Geometry::MultiPolygon(multi) => return Ok(Some(multi)),
            other => log::debug!("[nominatim] skipping non-polygonal result: {other:?}"),
        }
    }

    Ok(None)
}
