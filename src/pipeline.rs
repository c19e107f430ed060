//! The per-state pipeline: boundary → buffer → roads → clip → classify → render.

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use geo::{Centroid, MultiLineString, MultiPolygon};

use crate::{
    classify::style_roads,
    common::ensure_dir_exists,
    config::{PipelineConfig, StateRecord},
    geom::{Projector, Road, clip_roads, fetch_area, largest_part},
    render::{MapData, Renderer},
    source::{BoundarySource, RoadSource},
};

/// What one state produced.
#[derive(Clone, Debug)]
pub struct StateOutcome {
    pub code: String,
    pub roads: usize,
    pub files: Vec<PathBuf>,
}

/// Lon/lat boundary after the state's exceptions are applied.
pub fn clean_boundary(config: &PipelineConfig, name: &str, raw: MultiPolygon<f64>) -> MultiPolygon<f64> {
    if config.override_for(name).keep_largest_part {
        log::debug!("[pipeline] {name}: keeping largest of {} parts", raw.0.len());
        largest_part(&raw)
    } else {
        raw
    }
}

/// Run one state end to end.
pub fn process_state(
    config: &PipelineConfig,
    state: &StateRecord,
    boundaries: &mut impl BoundarySource,
    roads: &mut impl RoadSource,
    projector: &Projector,
    renderer: &Renderer,
) -> Result<StateOutcome> {
    let name = state.name.as_str();
    let query = format!("{name}, {}", config.service.country);

    let raw = boundaries.boundary(&query)
        .with_context(|| format!("[pipeline] boundary lookup failed for {name}"))?;
    let boundary = clean_boundary(config, name, raw);

    let buffer = config.buffer_for(name);
    let edges = {
        let area = fetch_area(&boundary, buffer);
        log::debug!("[pipeline] {name}: fetching roads with a {buffer}° buffer");
        roads.roads(&area)
            .with_context(|| format!("[pipeline] road fetch failed for {name}"))?
    };

    let boundary = projector.project(&boundary)?;
    let planar = edges.into_iter()
        .map(|edge| -> Result<Road> {
            Ok(Road {
                highway: edge.highway,
                geometry: MultiLineString::new(vec![projector.project(&edge.geometry)?]),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let fetched = planar.len();
    let clipped = clip_roads(planar, &boundary);
    log::debug!("[pipeline] {name}: {fetched} edges fetched, {} after clipping", clipped.len());

    let center = boundary.centroid()
        .ok_or_else(|| anyhow!("[pipeline] {name}: boundary has no centroid"))?;
    let styles = style_roads(&clipped, &center, &config.highway_order,
        config.render.decay_distance, config.render.width_range);

    let data = MapData {
        boundary: &boundary,
        roads: &clipped,
        styles: &styles,
        class_labels: &config.highway_order,
    };
    let files = renderer.render_all(&config.output_dir, &state.code, name, &data)?;

    Ok(StateOutcome { code: state.code.clone(), roads: clipped.len(), files })
}

/// Process every state in table order, stopping at the first failure.
pub fn run(config: &PipelineConfig, boundaries: &mut impl BoundarySource, roads: &mut impl RoadSource) -> Result<Vec<StateOutcome>> {
    ensure_dir_exists(&config.output_dir)?;

    let projector = Projector::web_mercator()?;
    let renderer = Renderer::new(config.render.clone())?;

    let mut outcomes = Vec::with_capacity(config.states.len());
    for state in &config.states {
        println!("▶ Processing {} — {}", state.code, state.name);
        let outcome = process_state(config, state, &mut *boundaries, &mut *roads, &projector, &renderer)?;
        log::info!("[pipeline] {} {}: {} roads, {} maps", state.code, state.name, outcome.roads, outcome.files.len());
        outcomes.push(outcome);
    }

    let maps: usize = outcomes.iter().map(|o| o.files.len()).sum();
    println!("✅ All {} states processed; {maps} maps written to {}", outcomes.len(), config.output_dir.display());
    Ok(outcomes)
}
