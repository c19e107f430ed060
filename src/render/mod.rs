//! Raster map output: three PNG variants per state.

mod canvas;
mod color;
mod legend;

use std::path::{Path, PathBuf};

use ab_glyph::FontVec;
use anyhow::{Result, anyhow};
use geo::{BoundingRect, MultiPolygon};

use crate::{classify::RoadStyle, common::map_file_name, config::RenderConfig, geom::Road};
use canvas::{Canvas, padded_extent};
use color::{class_color, hex};
use legend::{LegendEntry, draw_legend, load_font};

/// The three map styles written for every state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MapVariant {
    /// Black roads on white.
    Basic,
    /// Roads coloured by highway class, with a legend.
    TypeMap,
    /// Coloured by class, width scaled by distance from the centroid.
    DistMap,
}

impl MapVariant {
    pub const ALL: [MapVariant; 3] = [MapVariant::Basic, MapVariant::TypeMap, MapVariant::DistMap];

    /// File name prefix.
    pub fn prefix(&self) -> &'static str {
        match self {
            MapVariant::Basic => "basic",
            MapVariant::TypeMap => "typemap",
            MapVariant::DistMap => "distmap",
        }
    }
}

/// One state's planar data, ready to draw.
pub struct MapData<'a> {
    pub boundary: &'a MultiPolygon<f64>,
    pub roads: &'a [Road],
    pub styles: &'a [RoadStyle],
    /// Labels of the named classes, in class order; the last bucket is "other".
    pub class_labels: &'a [String],
}

/// Draws map variants with a fixed configuration. Holds the legend font across states.
pub struct Renderer {
    config: RenderConfig,
    font: FontVec,
}

impl Renderer {
    pub fn new(config: RenderConfig) -> Result<Self> {
        let font = load_font(&config)?;
        Ok(Self { config, font })
    }

    /// Render every variant for one state into `out_dir`, returning the written paths.
    pub fn render_all(&self, out_dir: &Path, code: &str, name: &str, data: &MapData) -> Result<Vec<PathBuf>> {
        MapVariant::ALL.iter()
            .map(|&variant| {
                let path = out_dir.join(map_file_name(variant.prefix(), code, name));
                self.render(variant, data)?.save_png(&path)?;
                log::debug!("[render] wrote {}", path.display());
                Ok(path)
            })
            .collect()
    }

    fn render(&self, variant: MapVariant, data: &MapData) -> Result<Canvas> {
        let bounds = data.boundary.bounding_rect()
            .ok_or_else(|| anyhow!("[render] empty boundary; nothing to frame"))?;
        let extent = padded_extent(bounds, self.config.margin_frac);
        let steps = data.class_labels.len() + 1;
        let config = &self.config;

        let canvas = match variant {
            MapVariant::Basic => {
                let mut canvas = Canvas::new(config, hex("#ffffff"), extent);
                for road in data.roads {
                    canvas.stroke_lines(&road.geometry, hex("#000000"), config.road_width_pt);
                }
                canvas.stroke_outline(data.boundary, hex("#000000"), config.boundary_width_pt);
                canvas
            }
            MapVariant::TypeMap | MapVariant::DistMap => {
                let mut canvas = Canvas::new(config, hex("#090909"), extent);
                for (road, style) in data.roads.iter().zip(data.styles) {
                    let width = if variant == MapVariant::DistMap { style.width } else { config.road_width_pt };
                    canvas.stroke_lines(&road.geometry, class_color(style.class, steps, config.road_alpha), width);
                }
                canvas.stroke_outline(data.boundary, hex("#ffffff"), config.boundary_width_pt);

                if variant == MapVariant::TypeMap {
                    let entries: Vec<_> = data.class_labels.iter().map(String::as_str)
                        .chain(["other"])
                        .enumerate()
                        .map(|(i, label)| LegendEntry { label: label.to_string(), color: class_color(i, steps, 1.0) })
                        .collect();
                    let anchor = canvas.project(extent.min());
                    let inset = (
                        anchor.0 + 0.02 * (canvas.project(extent.max()).0 - anchor.0),
                        anchor.1 - 0.02 * (anchor.1 - canvas.project(extent.max()).1),
                    );
                    draw_legend(&mut canvas, inset, "Road type", &entries, &self.font);
                }
                canvas
            }
        };

        Ok(canvas)
    }
}
