//! Constants for a batch run, gathered into plain structs so the pipeline can be driven
//! with a different state table, buffers or render settings in tests.

use std::path::PathBuf;

/// A state of the federation: two-digit INEGI code and display name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StateRecord {
    pub code: String,
    pub name: String,
}

impl StateRecord {
    pub fn new(code: &str, name: &str) -> Self {
        Self { code: code.to_string(), name: name.to_string() }
    }
}

/// Per-state exceptions to the default processing.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StateOverride {
    /// Fetch-time buffer (degrees) replacing the default.
    pub buffer_deg: Option<f64>,
    /// Keep only the largest polygon of the boundary (drops offshore islets).
    pub keep_largest_part: bool,
}

/// Road classes in decreasing order of importance. Anything else falls into "other".
pub const HIGHWAY_ORDER: [&str; 8] = [
    "motorway", "trunk", "primary", "secondary",
    "tertiary", "unclassified", "residential", "service",
];

/// INEGI codes and state names, in processing order.
const STATES: [(&str, &str); 32] = [
    ("01", "Aguascalientes"), ("02", "Baja California"), ("03", "Baja California Sur"),
    ("04", "Campeche"), ("05", "Coahuila"), ("06", "Colima"), ("07", "Chiapas"),
    ("08", "Chihuahua"), ("09", "Mexico City"), ("10", "Durango"), ("11", "Guanajuato"),
    ("12", "Guerrero"), ("13", "Hidalgo"), ("14", "Jalisco"), ("15", "Estado de México"),
    ("16", "Michoacán"), ("17", "Morelos"), ("18", "Nayarit"), ("19", "Nuevo León"),
    ("20", "Oaxaca"), ("21", "Puebla"), ("22", "Querétaro"), ("23", "Quintana Roo"),
    ("24", "San Luis Potosí"), ("25", "Sinaloa"), ("26", "Sonora"), ("27", "Tabasco"),
    ("28", "Tamaulipas"), ("29", "Tlaxcala"), ("30", "Veracruz"),
    ("31", "Yucatán"), ("32", "Zacatecas"),
];

/// Default fetch buffer (~2 km).
pub const DEFAULT_BUFFER_DEG: f64 = 0.02;

/// Larger fetch buffer for states whose fringe roads are otherwise missed.
pub const SPECIAL_BUFFER_DEG: f64 = 0.1;

/// Settings for the three map renderers.
#[derive(Clone, Debug)]
pub struct RenderConfig {
    /// Figure size in inches (square).
    pub figure_inches: f64,
    pub dpi: f64,
    /// Fraction of the boundary's bbox added on every side of the view.
    pub margin_frac: f64,
    /// Axes box as fractions of the figure: (left, right, bottom, top).
    pub axes_box: (f64, f64, f64, f64),
    /// Road width (points) for the basic and type maps.
    pub road_width_pt: f64,
    /// Boundary outline width (points).
    pub boundary_width_pt: f64,
    /// Road opacity on the coloured maps.
    pub road_alpha: f64,
    /// Output range of the distance-scaled widths (points).
    pub width_range: (f64, f64),
    /// Distance (planar units) over which the raw width decays by 1/e.
    pub decay_distance: f64,
    /// TrueType font for legend labels; system locations are tried when unset.
    pub legend_font: Option<PathBuf>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            figure_inches: 8.0,
            dpi: 300.0,
            margin_frac: 0.05,
            axes_box: (0.125, 0.9, 0.11, 0.88),
            road_width_pt: 0.05,
            boundary_width_pt: 0.5,
            road_alpha: 0.8,
            width_range: (0.05, 0.9),
            decay_distance: 1e6,
            legend_font: None,
        }
    }
}

impl RenderConfig {
    /// Figure side length in pixels.
    #[inline] pub fn pixels(&self) -> u32 { (self.figure_inches * self.dpi).round().max(1.0) as u32 }

    /// Convert a width in points to pixels.
    #[inline] pub fn pt_to_px(&self, pt: f64) -> f64 { pt * self.dpi / 72.0 }
}

/// Remote endpoints and request settings.
#[derive(Clone, Debug)]
pub struct ServiceConfig {
    pub nominatim_url: String,
    pub overpass_url: String,
    pub user_agent: String,
    /// Country qualifier appended to every boundary query.
    pub country: String,
    /// Side length (degrees) of the grid used to split large Overpass queries.
    pub query_cell_deg: f64,
    /// Simplification tolerance (degrees) for Overpass `poly:` filters.
    pub query_simplify_deg: f64,
    /// Pause between consecutive Overpass requests.
    pub pause_ms: u64,
    /// Overpass server-side timeout (seconds).
    pub overpass_timeout_s: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            nominatim_url: "https://nominatim.openstreetmap.org".to_string(),
            overpass_url: "https://overpass-api.de/api/interpreter".to_string(),
            user_agent: format!("mxroads/{} (batch road maps of Mexican states)", env!("CARGO_PKG_VERSION")),
            country: "Mexico".to_string(),
            query_cell_deg: 0.5,
            query_simplify_deg: 0.001,
            pause_ms: 1000,
            overpass_timeout_s: 180,
        }
    }
}

/// Everything a batch run needs besides the data sources.
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    pub states: Vec<StateRecord>,
    pub default_buffer_deg: f64,
    /// Exceptions keyed by state name.
    pub overrides: Vec<(String, StateOverride)>,
    pub highway_order: Vec<String>,
    pub output_dir: PathBuf,
    pub render: RenderConfig,
    pub service: ServiceConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            states: STATES.iter().map(|&(code, name)| StateRecord::new(code, name)).collect(),
            default_buffer_deg: DEFAULT_BUFFER_DEG,
            overrides: vec![
                ("Jalisco".to_string(), StateOverride { buffer_deg: Some(SPECIAL_BUFFER_DEG), ..Default::default() }),
                ("Tabasco".to_string(), StateOverride { buffer_deg: Some(SPECIAL_BUFFER_DEG), ..Default::default() }),
                ("Colima".to_string(), StateOverride { keep_largest_part: true, ..Default::default() }),
            ],
            highway_order: HIGHWAY_ORDER.iter().map(|s| s.to_string()).collect(),
            output_dir: PathBuf::from("output"),
            render: RenderConfig::default(),
            service: ServiceConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Look up the exceptions for a state; states without an entry get the defaults.
    pub fn override_for(&self, name: &str) -> StateOverride {
        self.overrides.iter()
            .find(|(key, _)| key == name)
            .map(|&(_, over)| over)
            .unwrap_or_default()
    }

    /// Fetch-time buffer distance (degrees) for a state.
    pub fn buffer_for(&self, name: &str) -> f64 {
        self.override_for(name).buffer_deg.unwrap_or(self.default_buffer_deg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_table_has_all_32_codes_in_order() {
        let config = PipelineConfig::default();
        assert_eq!(config.states.len(), 32);
        for (i, state) in config.states.iter().enumerate() {
            assert_eq!(state.code, format!("{:02}", i + 1));
        }
    }

    #[test]
    fn jalisco_and_tabasco_get_the_large_buffer() {
        let config = PipelineConfig::default();
        for state in &config.states {
            let expected = match state.name.as_str() {
                "Jalisco" | "Tabasco" => 0.1,
                _ => 0.02,
            };
            assert_eq!(config.buffer_for(&state.name), expected, "{}", state.name);
        }
    }

    #[test]
    fn only_colima_keeps_largest_part() {
        let config = PipelineConfig::default();
        let flagged: Vec<_> = config.states.iter()
            .filter(|state| config.override_for(&state.name).keep_largest_part)
            .map(|state| state.name.as_str())
            .collect();
        assert_eq!(flagged, vec!["Colima"]);
    }

    #[test]
    fn default_figure_is_2400_pixels() {
        let render = RenderConfig::default();
        assert_eq!(render.pixels(), 2400);
        assert!((render.pt_to_px(72.0) - 300.0).abs() < 1e-9);
    }
}
