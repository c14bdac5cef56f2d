//! Static raster rendering of an impact zone.
//!
//! Draws on a plain white figure with no axes: the buffer polygon filled red
//! with a dark red edge, the entrance as a black dot with an "Entrance"
//! callout, and the campus name as the title.

use geo::{BoundingRect, Contains, Point};
use image::{ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;

use super::glyphs::{draw_text, text_width, GLYPH_HEIGHT};
use super::{RenderedMap, Renderer, RendererKind};
use crate::config::StaticMapConfig;
use crate::error::Result;
use crate::models::{Campus, ImpactZone};

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
const DARK_RED: Rgba<u8> = Rgba([139, 0, 0, 255]);

const FILL_ALPHA: f64 = 0.5;
const TITLE_BAND: u32 = 56;
const MARGIN: u32 = 24;
/// View extent relative to the buffer diameter
const PADDING: f64 = 1.35;
const MARKER_RADIUS: i32 = 6;
const CALLOUT_OFFSET: (i32, i32) = (48, -64);

/// Maps lon/lat onto figure pixels with a cos(lat) aspect correction
#[derive(Debug, Clone, Copy)]
struct Frame {
    lon0: f64,
    lat0: f64,
    cos_lat: f64,
    /// Pixels per degree of latitude
    scale: f64,
    cx: f64,
    cy: f64,
}

impl Frame {
    fn to_pixel(&self, lon: f64, lat: f64) -> (f64, f64) {
        (
            self.cx + (lon - self.lon0) * self.cos_lat * self.scale,
            self.cy - (lat - self.lat0) * self.scale,
        )
    }

    fn to_lon_lat(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.lon0 + (x - self.cx) / (self.cos_lat * self.scale),
            self.lat0 - (y - self.cy) / self.scale,
        )
    }
}

/// Renders the impact zone as a PNG figure
#[derive(Debug, Clone, Default)]
pub struct StaticRenderer {
    config: StaticMapConfig,
}

impl StaticRenderer {
    pub fn new(config: StaticMapConfig) -> Self {
        Self { config }
    }

    fn size(&self) -> (u32, u32) {
        // Leave room for the title band and margins
        (
            self.config.width.max(2 * MARGIN + 64),
            self.config.height.max(TITLE_BAND + MARGIN + 64),
        )
    }

    fn frame(&self, zone: &ImpactZone) -> Frame {
        let (width, height) = self.size();
        let lon0 = zone.center.x();
        let lat0 = zone.center.y();
        let cos_lat = lat0.to_radians().cos().max(1e-6);

        let plot_w = (width - 2 * MARGIN) as f64;
        let plot_h = (height - TITLE_BAND - MARGIN) as f64;

        // Largest half-extent of the buffer in aspect-corrected degrees
        let half = zone
            .bbox()
            .map(|r| {
                let dx = (r.max().x - lon0).abs().max((r.min().x - lon0).abs()) * cos_lat;
                let dy = (r.max().y - lat0).abs().max((r.min().y - lat0).abs());
                dx.max(dy)
            })
            .filter(|h| *h > 0.0)
            .unwrap_or(1e-3);

        Frame {
            lon0,
            lat0,
            cos_lat,
            scale: plot_w.min(plot_h) / (2.0 * half * PADDING),
            cx: MARGIN as f64 + plot_w / 2.0,
            cy: TITLE_BAND as f64 + plot_h / 2.0,
        }
    }

    /// Draw the figure
    pub fn draw(&self, campus: &Campus, zone: &ImpactZone) -> RgbaImage {
        let (width, height) = self.size();
        let mut image = RgbaImage::from_pixel(width, height, WHITE);
        let frame = self.frame(zone);

        fill_zone(&mut image, &frame, zone);

        let ring: Vec<(f64, f64)> = zone
            .polygon
            .exterior()
            .coords()
            .map(|c| frame.to_pixel(c.x, c.y))
            .collect();
        for pair in ring.windows(2) {
            draw_line(&mut image, pair[0], pair[1], 1, DARK_RED);
        }

        let (px, py) = frame.to_pixel(zone.center.x(), zone.center.y());
        let point = (px.round() as i32, py.round() as i32);
        draw_callout(&mut image, point, "Entrance");
        fill_disc(&mut image, point, MARKER_RADIUS, BLACK);

        let title = format!("{} - {} m impact zone", campus.label, zone.radius.meters());
        draw_title(&mut image, &title);

        image
    }
}

impl Renderer for StaticRenderer {
    fn kind(&self) -> RendererKind {
        RendererKind::Static
    }

    fn render(&self, campus: &Campus, zone: &ImpactZone) -> Result<RenderedMap> {
        let image = self.draw(campus, zone);
        let mut bytes = Vec::new();
        image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(RenderedMap::Png(bytes))
    }
}

fn blend(under: Rgba<u8>, over: Rgba<u8>, alpha: f64) -> Rgba<u8> {
    let mix = |a: u8, b: u8| (a as f64 * (1.0 - alpha) + b as f64 * alpha).round() as u8;
    Rgba([
        mix(under[0], over[0]),
        mix(under[1], over[1]),
        mix(under[2], over[2]),
        255,
    ])
}

/// Fill every pixel whose center falls inside the degree polygon
fn fill_zone(image: &mut RgbaImage, frame: &Frame, zone: &ImpactZone) {
    let Some(bbox) = zone.polygon.bounding_rect() else {
        return;
    };
    let (x0, y0) = frame.to_pixel(bbox.min().x, bbox.max().y);
    let (x1, y1) = frame.to_pixel(bbox.max().x, bbox.min().y);

    let x_start = (x0.floor().max(0.0)) as u32;
    let y_start = (y0.floor().max(0.0)) as u32;
    let x_end = (x1.ceil() as u32).min(image.width());
    let y_end = (y1.ceil() as u32).min(image.height());

    for y in y_start..y_end {
        for x in x_start..x_end {
            let (lon, lat) = frame.to_lon_lat(x as f64 + 0.5, y as f64 + 0.5);
            if zone.polygon.contains(&Point::new(lon, lat)) {
                let under = *image.get_pixel(x, y);
                image.put_pixel(x, y, blend(under, RED, FILL_ALPHA));
            }
        }
    }
}

fn put_brush(image: &mut RgbaImage, x: i32, y: i32, half: i32, color: Rgba<u8>) {
    for dy in -half..=half {
        for dx in -half..=half {
            let px = x + dx;
            let py = y + dy;
            if px >= 0 && py >= 0 && (px as u32) < image.width() && (py as u32) < image.height() {
                image.put_pixel(px as u32, py as u32, color);
            }
        }
    }
}

/// Bresenham line with a square brush of side `2 * half + 1`
fn draw_line(image: &mut RgbaImage, from: (f64, f64), to: (f64, f64), half: i32, color: Rgba<u8>) {
    let (mut x0, mut y0) = (from.0.round() as i32, from.1.round() as i32);
    let (x1, y1) = (to.0.round() as i32, to.1.round() as i32);
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        put_brush(image, x0, y0, half, color);
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

fn fill_disc(image: &mut RgbaImage, center: (i32, i32), radius: i32, color: Rgba<u8>) {
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy <= radius * radius {
                put_brush(image, center.0 + dx, center.1 + dy, 0, color);
            }
        }
    }
}

fn fill_rect(image: &mut RgbaImage, x0: i32, y0: i32, x1: i32, y1: i32, color: Rgba<u8>) {
    for y in y0.max(0)..y1.min(image.height() as i32) {
        for x in x0.max(0)..x1.min(image.width() as i32) {
            image.put_pixel(x as u32, y as u32, color);
        }
    }
}

/// Text label offset from the point with an arrow pointing back at it
fn draw_callout(image: &mut RgbaImage, point: (i32, i32), text: &str) {
    let scale = 2;
    let text_w = text_width(text, scale) as i32;
    let text_h = (GLYPH_HEIGHT * scale) as i32;
    let pad = 4;

    let tx = point.0 + CALLOUT_OFFSET.0;
    let ty = point.1 + CALLOUT_OFFSET.1 - text_h;

    fill_rect(image, tx - pad, ty - pad, tx + text_w + pad, ty + text_h + pad, WHITE);
    draw_text(image, tx, ty, text, scale, BLACK);

    // Arrow from the box corner to just short of the marker
    let start = ((tx - pad) as f64, (ty + text_h + pad) as f64);
    let (vx, vy) = (point.0 as f64 - start.0, point.1 as f64 - start.1);
    let len = (vx * vx + vy * vy).sqrt().max(1.0);
    let (ux, uy) = (vx / len, vy / len);
    let stop = MARKER_RADIUS as f64 + 3.0;
    let tip = (point.0 as f64 - ux * stop, point.1 as f64 - uy * stop);
    draw_line(image, start, tip, 0, BLACK);

    let head = 10.0;
    let spread = 0.45_f64;
    for side in [-1.0, 1.0] {
        let (s, c) = (spread * side).sin_cos();
        let bx = -(ux * c - uy * s);
        let by = -(ux * s + uy * c);
        draw_line(image, tip, (tip.0 + bx * head, tip.1 + by * head), 0, BLACK);
    }
}

/// Centered title, shrunk and truncated to fit the figure width
fn draw_title(image: &mut RgbaImage, title: &str) {
    let max_width = image.width().saturating_sub(MARGIN);
    let mut scale = 2;
    if text_width(title, scale) > max_width {
        scale = 1;
    }

    let mut text = title.to_string();
    if text_width(&text, scale) > max_width {
        let mut chars: Vec<char> = title.chars().collect();
        loop {
            text = format!("{}...", chars.iter().collect::<String>());
            if chars.is_empty() || text_width(&text, scale) <= max_width {
                break;
            }
            chars.pop();
        }
    }

    let x = (image.width() as i32 - text_width(&text, scale) as i32) / 2;
    let y = (TITLE_BAND as i32 - (GLYPH_HEIGHT * scale) as i32) / 2;
    draw_text(image, x.max(0), y, &text, scale, BLACK);
}
