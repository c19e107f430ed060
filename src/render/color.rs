//! Colour utilities for the raster maps.

use image::Rgba;

/// Stops of the *inferno* colormap at t = 0, 1/8, ..., 1.
const INFERNO: [[u8; 3]; 9] = [
    [0x00, 0x00, 0x04], [0x1f, 0x0c, 0x48], [0x55, 0x0f, 0x6d],
    [0x88, 0x22, 0x6a], [0xba, 0x36, 0x55], [0xe3, 0x59, 0x33],
    [0xf9, 0x8e, 0x09], [0xf9, 0xcb, 0x35], [0xfc, 0xff, 0xa4],
];

/// Parse "#rrggbb" into an opaque colour.
pub(crate) fn hex(code: &str) -> Rgba<u8> {
    let code = code.trim_start_matches('#');
    let channel = |i: usize| code.get(i..i + 2)
        .and_then(|c| u8::from_str_radix(c, 16).ok())
        .unwrap_or(0);
    Rgba([channel(0), channel(2), channel(4), 255])
}

/// Sample inferno at `t` in [0, 1] by linear interpolation between stops.
pub(crate) fn inferno(t: f64) -> [u8; 3] {
    let x = t.clamp(0.0, 1.0) * (INFERNO.len() - 1) as f64;
    let i = (x.floor() as usize).min(INFERNO.len() - 2);
    let f = x - i as f64;

    let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * f).round().clamp(0.0, 255.0) as u8;
    let (a, b) = (INFERNO[i], INFERNO[i + 1]);
    [lerp(a[0], b[0]), lerp(a[1], b[1]), lerp(a[2], b[2])]
}

/// Colour of bucket `index` out of `steps` on the reversed inferno ramp
/// (bucket 0 brightest, last bucket darkest).
pub(crate) fn class_color(index: usize, steps: usize, alpha: f64) -> Rgba<u8> {
    let t = if steps > 1 { index.min(steps - 1) as f64 / (steps - 1) as f64 } else { 0.0 };
    let [r, g, b] = inferno(1.0 - t);
    Rgba([r, g, b, (alpha.clamp(0.0, 1.0) * 255.0).round() as u8])
}

/// Alpha-composite `fg` over `bg`, with `fg`'s opacity scaled by `weight`.
pub(crate) fn composite(fg: Rgba<u8>, bg: Rgba<u8>, weight: f32) -> Rgba<u8> {
    let a = (fg[3] as f32 / 255.0) * weight.clamp(0.0, 1.0);
    let mix = |f: u8, b: u8| (f as f32 * a + b as f32 * (1.0 - a)).round().clamp(0.0, 255.0) as u8;
    let out_alpha = (255.0 * a + bg[3] as f32 * (1.0 - a)).round().clamp(0.0, 255.0) as u8;
    Rgba([mix(fg[0], bg[0]), mix(fg[1], bg[1]), mix(fg[2], bg[2]), out_alpha])
}
