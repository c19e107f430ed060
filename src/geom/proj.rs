use anyhow::{Context, Result, anyhow};
use geo::{Coord, MapCoords};
use proj4rs::{proj::Proj as Proj4, transform::transform};

/// Geographic WGS84 (EPSG:4326).
const WGS84_PROJ4: &str = "+proj=longlat +datum=WGS84 +no_defs +type=crs";

/// Spherical Web Mercator (EPSG:3857), metres.
const WEB_MERCATOR_PROJ4: &str =
    "+proj=merc +a=6378137 +b=6378137 +lat_ts=0 +lon_0=0 +x_0=0 +y_0=0 +k=1 +units=m +no_defs +type=crs";

/// Reprojects lon/lat geometries into a planar CRS.
pub struct Projector {
    from: Proj4,
    to: Proj4,
}

impl Projector {
    /// Lon/lat → EPSG:3857.
    pub fn web_mercator() -> Result<Self> {
        Self::from_proj_strings(WGS84_PROJ4, WEB_MERCATOR_PROJ4)
    }

    fn from_proj_strings(from: &str, to: &str) -> Result<Self> {
        Ok(Self {
            from: Proj4::from_proj_string(from)
                .with_context(|| anyhow!("failed to build source PROJ.4: {from}"))?,
            to: Proj4::from_proj_string(to)
                .with_context(|| anyhow!("failed to build target PROJ.4: {to}"))?,
        })
    }

    /// Project a single lon/lat coordinate (degrees in, target units out).
    pub fn project_coord(&self, coord: Coord<f64>) -> Result<Coord<f64>> {
        let mut point = (coord.x.to_radians(), coord.y.to_radians(), 0.0);
        transform(&self.from, &self.to, &mut point)
            .with_context(|| format!("[proj] transform failed at ({}, {})", coord.x, coord.y))?;
        Ok(Coord { x: point.0, y: point.1 })
    }

    /// Project every coordinate of a geometry.
    pub fn project<G: MapCoords<f64, f64>>(&self, geometry: &G) -> Result<G::Output> {
        geometry.try_map_coords(|coord| self.project_coord(coord))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{LineString, line_string};

    #[test]
    fn origin_maps_to_origin() {
        let proj = Projector::web_mercator().unwrap();
        let out = proj.project_coord(Coord { x: 0.0, y: 0.0 }).unwrap();
        assert!(out.x.abs() < 1e-6 && out.y.abs() < 1e-6);
    }

    #[test]
    fn antimeridian_is_half_the_world_width() {
        let proj = Projector::web_mercator().unwrap();
        let out = proj.project_coord(Coord { x: 180.0, y: 0.0 }).unwrap();
        assert!((out.x - 20_037_508.342789244).abs() < 1.0, "{}", out.x);
    }

    #[test]
    fn projects_whole_geometries_symmetrically() {
        let proj = Projector::web_mercator().unwrap();
        let line: LineString<f64> = line_string![(x: -100.0, y: 20.0), (x: -100.0, y: -20.0)];
        let out = proj.project(&line).unwrap();
        assert!(out.0[0].x < 0.0);
        assert!(out.0[0].y > 2_000_000.0);
        assert!((out.0[0].y + out.0[1].y).abs() < 1e-6);
    }
}
