// overlay.rs — 视口叠加层：中心十字线与经纬网
//
// The GUI paints these with egui; `render_overlay` rasterises the same
// geometry into an image for export.

use std::path::Path;

use image::{Rgba, RgbaImage};

use crate::error::Result;
use crate::graticule::{GraticuleLine, LineKind};
use crate::projector::PixelCoordinate;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub from: PixelCoordinate,
    pub to: PixelCoordinate,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayStyle {
    pub background: Rgba<u8>,
    pub crosshair: Rgba<u8>,
    pub meridian: Rgba<u8>,
    pub parallel: Rgba<u8>,
    pub horizon: Rgba<u8>,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            background: Rgba([26, 26, 26, 255]),
            crosshair: Rgba([255, 255, 0, 255]),
            meridian: Rgba([90, 140, 200, 255]),
            parallel: Rgba([90, 180, 120, 255]),
            horizon: Rgba([230, 120, 60, 255]),
        }
    }
}

impl OverlayStyle {
    pub fn line_color(&self, kind: LineKind) -> Rgba<u8> {
        match kind {
            LineKind::Meridian(_) => self.meridian,
            LineKind::Parallel(p) if p == 0.0 => self.horizon,
            LineKind::Parallel(_) => self.parallel,
        }
    }
}

/// Horizontal and vertical lines through the viewport centre.
pub fn crosshair_segments(width: u32, height: u32) -> [Segment; 2] {
    let w = width as f64;
    let h = height as f64;
    [
        Segment {
            from: PixelCoordinate::new(0.0, h / 2.0),
            to: PixelCoordinate::new(w, h / 2.0),
        },
        Segment {
            from: PixelCoordinate::new(w / 2.0, 0.0),
            to: PixelCoordinate::new(w / 2.0, h),
        },
    ]
}

pub fn draw_crosshair(img: &mut RgbaImage, color: Rgba<u8>) {
    let (w, h) = img.dimensions();
    if w == 0 || h == 0 {
        return;
    }
    let (cx, cy) = (w / 2, h / 2);
    for x in 0..w {
        img.put_pixel(x, cy, color);
    }
    for y in 0..h {
        img.put_pixel(cx, y, color);
    }
}

/// Liang–Barsky clip of `a -> b` against `[0, w] x [0, h]`.
fn clip(a: PixelCoordinate, b: PixelCoordinate, w: f64, h: f64) -> Option<Segment> {
    let (dx, dy) = (b.u - a.u, b.v - a.v);
    let mut t0 = 0.0_f64;
    let mut t1 = 1.0_f64;

    for (p, q) in [(-dx, a.u), (dx, w - a.u), (-dy, a.v), (dy, h - a.v)] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            t0 = t0.max(r);
        } else {
            t1 = t1.min(r);
        }
        if t0 > t1 {
            return None;
        }
    }

    Some(Segment {
        from: PixelCoordinate::new(a.u + t0 * dx, a.v + t0 * dy),
        to: PixelCoordinate::new(a.u + t1 * dx, a.v + t1 * dy),
    })
}

pub fn draw_segment(img: &mut RgbaImage, a: PixelCoordinate, b: PixelCoordinate, color: Rgba<u8>) {
    if !a.is_finite() || !b.is_finite() {
        return;
    }
    let (w, h) = img.dimensions();
    if w == 0 || h == 0 {
        return;
    }
    let Some(seg) = clip(a, b, w as f64, h as f64) else {
        return;
    };

    let (dx, dy) = (seg.to.u - seg.from.u, seg.to.v - seg.from.v);
    let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as u32;
    for i in 0..=steps {
        let t = i as f64 / steps as f64;
        let x = (seg.from.u + t * dx).floor();
        let y = (seg.from.v + t * dy).floor();
        // 裁剪保留远端边界，比最后一个像素多一
        let x = (x as u32).min(w - 1);
        let y = (y as u32).min(h - 1);
        img.put_pixel(x, y, color);
    }
}

pub fn draw_polyline(img: &mut RgbaImage, points: &[PixelCoordinate], color: Rgba<u8>) {
    for pair in points.windows(2) {
        draw_segment(img, pair[0], pair[1], color);
    }
}

/// Background, graticule and crosshair for a `width` x `height` viewport.
pub fn render_overlay(
    width: u32,
    height: u32,
    lines: &[GraticuleLine],
    style: &OverlayStyle,
) -> RgbaImage {
    let mut img = RgbaImage::from_pixel(width, height, style.background);
    if width == 0 || height == 0 {
        return img;
    }
    for line in lines {
        draw_polyline(&mut img, &line.points, style.line_color(line.kind));
    }
    draw_crosshair(&mut img, style.crosshair);
    img
}

/// Renders the overlay and writes it to `path`; the format follows the extension.
pub fn export_overlay(
    path: &Path,
    width: u32,
    height: u32,
    lines: &[GraticuleLine],
    style: &OverlayStyle,
) -> Result<()> {
    render_overlay(width, height, lines, style).save(path)?;
    log::info!("overlay written to {}", path.display());
    Ok(())
}
