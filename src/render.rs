//! Frame composition
//!
//! Back to front: background fill, assets in manifest order, the active
//! curve and the trail, the cursor with its guides and window bar, then the
//! score and the optional statistics line.
//!
//! The curve and the trail share a transparent layer. It is the grid plus a
//! margin of one stroke width on every side, so strokes centered on the grid
//! edges are not cut in half.

use crate::assets::AssetSet;
use crate::config::Config;
use crate::display::{draw_text, draw_text_scaled, PixelBuffer, Rgb, GLYPH_HEIGHT};
use crate::exhibit::Exhibit;
use crate::plot::CoordinateMapper;

pub struct Compositor {
    frame: PixelBuffer,
    layer: PixelBuffer,
    /// Margin around the grid inside `layer`
    pad: i32,
    /// Maps into the grid as placed inside `layer`
    layer_mapper: CoordinateMapper,
    mapper: CoordinateMapper,
    background: Rgb,
    score_color: Rgb,
    score_position: (i32, i32),
    score_scale: u32,
}

impl Compositor {
    /// `mapper` places the tracker's domain onto the grid region
    pub fn new(viewport: (u32, u32), mapper: CoordinateMapper, config: &Config) -> Self {
        let region = mapper.region();
        let pad = stroke_margin(config);
        let layer_mapper = mapper.with_region(region.moved_to(pad, pad));
        let pad_px = 2 * pad as u32;
        Self {
            frame: PixelBuffer::with_size(viewport.0, viewport.1),
            layer: PixelBuffer::with_size(region.width() + pad_px, region.height() + pad_px),
            pad,
            layer_mapper,
            mapper,
            background: config.colors.background,
            score_color: config.colors.score_text,
            score_position: config.display.score_position,
            score_scale: config.display.score_scale.max(1),
        }
    }

    pub fn render(&mut self, assets: &AssetSet, exhibit: &Exhibit, stats: Option<&str>) -> &PixelBuffer {
        let (r, g, b) = self.background;
        self.frame.clear(r, g, b);
        for asset in assets.iter() {
            let (x, y) = asset.position;
            self.frame.composite(&asset.image, x, y);
        }

        let tracker = exhibit.tracker();
        self.layer.clear_rgba(0, 0, 0, 0);
        exhibit
            .active_curve()
            .draw(&mut self.layer, self.layer_mapper.region());
        tracker.draw_trail(&mut self.layer, &self.layer_mapper);
        let (ox, oy) = self.mapper.region().origin();
        self.frame.composite(&self.layer, ox - self.pad, oy - self.pad);

        tracker.draw_cursor_and_guides(&mut self.frame, &self.mapper);

        let (sx, sy) = self.score_position;
        let (r, g, b) = self.score_color;
        let text = format!("SCORE: {}", tracker.score());
        draw_text_scaled(&mut self.frame, sx, sy, &text, self.score_scale, r, g, b);

        if let Some(line) = stats {
            // Bottom left with a drop shadow
            let y = self.frame.height() as i32 - GLYPH_HEIGHT as i32 - 4;
            draw_text(&mut self.frame, 5, y + 1, line, 0, 0, 0);
            draw_text(&mut self.frame, 4, y, line, 255, 255, 0);
        }

        &self.frame
    }
}

/// Widest curve or trail stroke
fn stroke_margin(config: &Config) -> i32 {
    config
        .curves
        .iter()
        .map(|c| c.line_width)
        .chain(std::iter::once(config.tracker.line_width))
        .max()
        .unwrap_or(1)
        .max(1)
}
