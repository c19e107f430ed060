use std::path::{Path, PathBuf};

use ab_glyph::{FontVec, PxScale};
use anyhow::{Context, Result};
use image::Rgba;
use imageproc::drawing::{draw_text_mut, text_size};

use crate::{config::RenderConfig, render::{canvas::Canvas, color::hex}};

/// Common font locations tried when no legend font is configured.
const SYSTEM_FONTS: [&str; 6] = [
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// DejaVu Sans, shipped with the crate (Bitstream Vera license, see assets/fonts).
const BUNDLED_FONT: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");

/// Legend font size in points.
const FONT_PT: f64 = 10.0;

/// Load the legend font: the configured one first, then system locations, then the
/// bundled DejaVu Sans.
pub(crate) fn load_font(config: &RenderConfig) -> Result<FontVec> {
    let candidates = config.legend_font.iter().cloned()
        .chain(SYSTEM_FONTS.iter().map(PathBuf::from));

    for path in candidates {
        if let Some(font) = read_font(&path) {
            log::debug!("[legend] using font {}", path.display());
            return Ok(font);
        }
    }
    if let Some(path) = &config.legend_font {
        log::warn!("[legend] could not load {}; using the bundled font", path.display());
    }
    FontVec::try_from_vec(BUNDLED_FONT.to_vec())
        .context("[legend] bundled font is not a valid TrueType font")
}

fn read_font(path: &Path) -> Option<FontVec> {
    let bytes = std::fs::read(path).ok()?;
    FontVec::try_from_vec(bytes).ok()
}

pub(crate) struct LegendEntry {
    pub(crate) label: String,
    pub(crate) color: Rgba<u8>,
}

/// Draw a framed legend whose lower-left corner sits at `anchor` (pixels), inset by half
/// an em: a centered title, then one swatch and label per entry.
pub(crate) fn draw_legend(canvas: &mut Canvas, anchor: (f64, f64), title: &str, entries: &[LegendEntry], font: &FontVec) {
    let em = FONT_PT * canvas.px_per_pt();
    let scale = PxScale::from(em as f32);
    let width_of = |text: &str| text_size(scale, font, text).0 as f64;

    let (pad, spacing, handle, handle_h, text_pad) = (0.4 * em, 0.5 * em, 2.0 * em, 0.7 * em, 0.8 * em);
    let rows = 1 + entries.len();

    let label_w = entries.iter().map(|e| width_of(&e.label)).fold(0.0, f64::max);
    let content_w = (handle + text_pad + label_w).max(width_of(title));
    let box_w = content_w + 2.0 * pad;
    let box_h = 2.0 * pad + rows as f64 * em + (rows - 1) as f64 * spacing;

    let left = anchor.0 + spacing;
    let top = anchor.1 - spacing - box_h;
    canvas.framed_rect(left.round() as i32, top.round() as i32, box_w.round() as u32, box_h.round() as u32,
        Rgba([0x22, 0x22, 0x22, 204]), hex("#ffffff"));

    let mut row_top = top + pad;
    let x = left + (box_w - width_of(title)) / 2.0;
    draw_text_mut(canvas.image_mut(), hex("#ffffff"), x.round() as i32, row_top.round() as i32, scale, font, title);
    row_top += em + spacing;

    for entry in entries {
        let x = left + pad;
        canvas.fill_rect(x.round() as i32, (row_top + (em - handle_h) / 2.0).round() as i32,
            handle.round() as u32, handle_h.round() as u32, entry.color);
        draw_text_mut(canvas.image_mut(), hex("#ffffff"), (x + handle + text_pad).round() as i32,
            row_top.round() as i32, scale, font, &entry.label);
        row_top += em + spacing;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{Coord, Rect};

    #[test]
    fn missing_configured_font_falls_back_to_a_usable_font() {
        let config = RenderConfig { legend_font: Some(PathBuf::from("/nonexistent/font.ttf")), ..Default::default() };
        let font = load_font(&config).unwrap();
        assert!(text_size(PxScale::from(20.0), &font, "Road type").0 > 0);
    }

    #[test]
    fn bundled_font_parses() {
        assert!(FontVec::try_from_vec(BUNDLED_FONT.to_vec()).is_ok());
    }

    fn draw(labels: [&str; 2], font: &FontVec) -> image::RgbaImage {
        let config = RenderConfig { figure_inches: 4.0, dpi: 100.0, ..Default::default() };
        let extent = Rect::new(Coord { x: 0.0, y: 0.0 }, Coord { x: 1.0, y: 1.0 });
        let mut canvas = Canvas::new(&config, hex("#090909"), extent);

        let entries = vec![
            LegendEntry { label: labels[0].to_string(), color: Rgba([255, 0, 0, 255]) },
            LegendEntry { label: labels[1].to_string(), color: Rgba([0, 0, 255, 255]) },
        ];
        draw_legend(&mut canvas, (10.0, 390.0), "Road type", &entries, font);
        canvas.image_mut().0.clone()
    }

    #[test]
    fn legend_draws_swatches_and_labels() {
        let font = FontVec::try_from_vec(BUNDLED_FONT.to_vec()).unwrap();
        let bright = |image: &image::RgbaImage| image.pixels().filter(|p| p[0] > 200 && p[1] > 200 && p[2] > 200).count();

        let labeled = draw(["motorway", "other"], &font);
        let unlabeled = draw(["", ""], &font);

        assert!(labeled.pixels().any(|p| *p == Rgba([255, 0, 0, 255])));
        assert!(labeled.pixels().any(|p| *p == Rgba([0, 0, 255, 255])));
        assert!(bright(&labeled) > bright(&unlabeled));
    }
}
