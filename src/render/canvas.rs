use std::path::Path;

use anyhow::{Context, Result, anyhow};
use geo::{Coord, LineString, MultiLineString, MultiPolygon, Rect};
use image::{ImageFormat, Rgba, RgbaImage};
use imageproc::{
    drawing::{Blend, draw_antialiased_line_segment_mut, draw_filled_rect_mut, draw_hollow_rect_mut, draw_polygon_mut},
    point::Point,
    rect::Rect as PixelRect,
};

use crate::{common::PendingWrite, config::RenderConfig, render::color::composite};

/// Maps planar coordinates into the figure's axes box, preserving aspect (Y up → Y down).
#[derive(Clone, Copy, Debug)]
pub(crate) struct View {
    scale: f64,
    center: Coord<f64>,
    origin: (f64, f64),
}

impl View {
    /// Fit `extent` into the axes box of a `size`×`size` pixel figure, centered.
    pub(crate) fn fit(extent: Rect<f64>, size: u32, axes_box: (f64, f64, f64, f64)) -> Self {
        let (left, right, bottom, top) = axes_box;
        let size = size as f64;
        let (box_w, box_h) = ((right - left) * size, (top - bottom) * size);

        let scale = match (extent.width() > 0.0, extent.height() > 0.0) {
            (true, true) => (box_w / extent.width()).min(box_h / extent.height()),
            (true, false) => box_w / extent.width(),
            (false, true) => box_h / extent.height(),
            (false, false) => 1.0,
        };

        Self {
            scale,
            center: extent.center(),
            origin: ((left + right) / 2.0 * size, (1.0 - (top + bottom) / 2.0) * size),
        }
    }

    #[inline]
    pub(crate) fn project(&self, coord: Coord<f64>) -> (f64, f64) {
        (
            self.origin.0 + (coord.x - self.center.x) * self.scale,
            self.origin.1 - (coord.y - self.center.y) * self.scale, // invert vertically
        )
    }
}

/// Boundary bbox expanded by `frac` of its size on every side.
pub(crate) fn padded_extent(bounds: Rect<f64>, frac: f64) -> Rect<f64> {
    let (dx, dy) = (frac * bounds.width(), frac * bounds.height());
    Rect::new(
        Coord { x: bounds.min().x - dx, y: bounds.min().y - dy },
        Coord { x: bounds.max().x + dx, y: bounds.max().y + dy },
    )
}

/// A square RGBA figure that strokes planar geometries through a [`View`].
pub(crate) struct Canvas {
    image: Blend<RgbaImage>,
    view: View,
    px_per_pt: f64,
}

impl Canvas {
    pub(crate) fn new(config: &RenderConfig, background: Rgba<u8>, extent: Rect<f64>) -> Self {
        let size = config.pixels();
        Self {
            image: Blend(RgbaImage::from_pixel(size, size, background)),
            view: View::fit(extent, size, config.axes_box),
            px_per_pt: config.pt_to_px(1.0),
        }
    }

    #[inline] pub(crate) fn px_per_pt(&self) -> f64 { self.px_per_pt }

    /// Pixel position of a planar coordinate.
    #[inline] pub(crate) fn project(&self, coord: Coord<f64>) -> (f64, f64) { self.view.project(coord) }

    #[cfg(test)]
    pub(crate) fn pixel(&self, x: u32, y: u32) -> Rgba<u8> { *self.image.0.get_pixel(x, y) }

    /// Stroke a line string `width_pt` points wide.
    pub(crate) fn stroke_line(&mut self, line: &LineString<f64>, color: Rgba<u8>, width_pt: f64) {
        let width = width_pt * self.px_per_pt;
        for segment in line.lines() {
            let a = self.view.project(segment.start);
            let b = self.view.project(segment.end);
            self.stroke_segment(a, b, color, width);
        }
    }

    pub(crate) fn stroke_lines(&mut self, lines: &MultiLineString<f64>, color: Rgba<u8>, width_pt: f64) {
        for line in lines { self.stroke_line(line, color, width_pt) }
    }

    /// Stroke the rings (exteriors and holes) of a boundary.
    pub(crate) fn stroke_outline(&mut self, shape: &MultiPolygon<f64>, color: Rgba<u8>, width_pt: f64) {
        for polygon in shape {
            self.stroke_line(polygon.exterior(), color, width_pt);
            for interior in polygon.interiors() {
                self.stroke_line(interior, color, width_pt);
            }
        }
    }

    /// Segments thinner than a pixel are drawn anti-aliased with opacity scaled by their
    /// width; thicker ones are filled as quads.
    fn stroke_segment(&mut self, a: (f64, f64), b: (f64, f64), color: Rgba<u8>, width: f64) {
        let (dx, dy) = (b.0 - a.0, b.1 - a.1);
        let length = (dx * dx + dy * dy).sqrt();

        if width > 1.0 && length > 0.0 {
            let (nx, ny) = (-dy / length * width / 2.0, dx / length * width / 2.0);
            let quad = [
                Point::new((a.0 + nx).round() as i32, (a.1 + ny).round() as i32),
                Point::new((b.0 + nx).round() as i32, (b.1 + ny).round() as i32),
                Point::new((b.0 - nx).round() as i32, (b.1 - ny).round() as i32),
                Point::new((a.0 - nx).round() as i32, (a.1 - ny).round() as i32),
            ];
            if quad[0] != quad[3] {
                draw_polygon_mut(&mut self.image, &quad, color);
                return;
            }
        }

        let coverage = width.clamp(0.0, 1.0) as f32;
        draw_antialiased_line_segment_mut(
            &mut self.image.0,
            (a.0.round() as i32, a.1.round() as i32),
            (b.0.round() as i32, b.1.round() as i32),
            color,
            |line, bg, weight| composite(line, bg, weight * coverage),
        );
    }

    /// Filled rectangle with an outline, in pixel coordinates.
    pub(crate) fn framed_rect(&mut self, x: i32, y: i32, w: u32, h: u32, fill: Rgba<u8>, edge: Rgba<u8>) {
        let rect = PixelRect::at(x, y).of_size(w.max(1), h.max(1));
        draw_filled_rect_mut(&mut self.image, rect, fill);
        draw_hollow_rect_mut(&mut self.image, rect, edge);
    }

    pub(crate) fn fill_rect(&mut self, x: i32, y: i32, w: u32, h: u32, fill: Rgba<u8>) {
        draw_filled_rect_mut(&mut self.image, PixelRect::at(x, y).of_size(w.max(1), h.max(1)), fill);
    }

    pub(crate) fn image_mut(&mut self) -> &mut Blend<RgbaImage> { &mut self.image }

    /// Encode as PNG and atomically move into place. Consumes the canvas so its buffer is
    /// released as soon as the file is written.
    pub(crate) fn save_png(self, path: &Path) -> Result<()> {
        let mut sink = PendingWrite::open(path)?;
        self.image.0.write_to(&mut sink, ImageFormat::Png)
            .map_err(|e| anyhow!("[render] failed to encode {}: {e}", path.display()))?;
        sink.finalize()
            .with_context(|| format!("[render] failed to write {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::color::hex;
    use geo::line_string;

    fn small_config() -> RenderConfig {
        RenderConfig { figure_inches: 1.0, dpi: 100.0, ..Default::default() }
    }

    #[test]
    fn view_centers_extent_in_axes_box() {
        let extent = Rect::new(Coord { x: 0.0, y: 0.0 }, Coord { x: 10.0, y: 20.0 });
        let view = View::fit(extent, 1000, (0.125, 0.9, 0.11, 0.88));

        // Height limits the scale: 770 px for 20 units.
        let (x0, y0) = view.project(Coord { x: 0.0, y: 20.0 });
        let (x1, y1) = view.project(Coord { x: 10.0, y: 0.0 });
        assert!(((y1 - y0) - 770.0).abs() < 1e-9);
        assert!(((x1 - x0) - 385.0).abs() < 1e-9);
        assert!((((x0 + x1) / 2.0) - 512.5).abs() < 1e-9);
        assert!(y0 < y1);
    }

    #[test]
    fn padded_extent_adds_margin_on_every_side() {
        let bounds = Rect::new(Coord { x: 0.0, y: 0.0 }, Coord { x: 100.0, y: 50.0 });
        let extent = padded_extent(bounds, 0.05);
        assert_eq!(extent.min(), Coord { x: -5.0, y: -2.5 });
        assert_eq!(extent.max(), Coord { x: 105.0, y: 52.5 });
    }

    #[test]
    fn strokes_change_pixels_along_the_line() {
        let config = small_config();
        let extent = Rect::new(Coord { x: 0.0, y: 0.0 }, Coord { x: 10.0, y: 10.0 });
        let mut canvas = Canvas::new(&config, hex("#ffffff"), extent);
        canvas.stroke_line(&line_string![(x: 0.0, y: 5.0), (x: 10.0, y: 5.0)], hex("#000000"), 5.0);

        let size = canvas.image.0.width();
        let dark = canvas.image.0.pixels().filter(|p| p[0] < 128).count();
        assert!(dark > 0);
        assert!(dark < (size * size) as usize / 2);
    }

    #[test]
    fn hairlines_are_faint() {
        let config = small_config();
        let extent = Rect::new(Coord { x: 0.0, y: 0.0 }, Coord { x: 10.0, y: 10.0 });
        let mut canvas = Canvas::new(&config, hex("#ffffff"), extent);
        canvas.stroke_line(&line_string![(x: 0.0, y: 5.0), (x: 10.0, y: 5.0)], hex("#000000"), 0.05);

        assert!(canvas.image.0.pixels().all(|p| p[0] > 128));
        assert!(canvas.image.0.pixels().any(|p| p[0] < 255));
    }

    #[test]
    fn save_png_writes_a_decodable_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("map.png");
        let extent = Rect::new(Coord { x: 0.0, y: 0.0 }, Coord { x: 1.0, y: 1.0 });
        Canvas::new(&small_config(), hex("#090909"), extent).save_png(&path).unwrap();

        let decoded = image::open(&path).unwrap();
        assert_eq!(decoded.width(), 100);
        assert_eq!(decoded.height(), 100);
    }
}
