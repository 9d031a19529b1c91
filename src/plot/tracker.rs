//! The visitor-controlled point and its scoring
//!
//! The tracker walks left to right across its x range at a fixed step per
//! frame while the visitor nudges it up and down. Every frame the current
//! position is appended to the trail; the trailing window of the trail is
//! compared against the active reference curve to produce a score.
//!
//! Running past the right edge is a *lap*: x returns to the left edge and
//! the trail is wiped. There is no terminal state.

use super::{positive_step, CoordinateMapper, CurveFn, DomainRange, GeometryError, Point};
use crate::display::{PixelBuffer, Rgb};
use std::collections::VecDeque;

/// Vertical nudge direction. `Up` decreases domain y, which is also up on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// Validated tracker geometry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackerSettings {
    pub x_range: DomainRange,
    pub y_range: DomainRange,
    pub x_step: f64,
    pub y_step: f64,
    pub max_history_for_score: usize,
}

impl TrackerSettings {
    pub fn new(
        x_range: DomainRange,
        y_range: DomainRange,
        x_step: f64,
        y_step: f64,
        max_history_for_score: usize,
    ) -> Result<Self, GeometryError> {
        if max_history_for_score == 0 {
            return Err(GeometryError::ZeroWindow);
        }
        Ok(Self {
            x_range,
            y_range,
            x_step: positive_step("x_step", x_step)?,
            y_step: positive_step("y_step", y_step)?,
            max_history_for_score,
        })
    }

    /// Points recorded in one lap when one point is recorded per advance
    fn lap_len(&self) -> usize {
        (self.x_range.span() / self.x_step).floor() as usize + 1
    }
}

/// Colors and stroke widths for the trail and cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackerStyle {
    pub trail: Rgb,
    pub window_bar: Rgb,
    pub line_width: i32,
    pub guide_width: i32,
    pub marker_radius: i32,
    pub window_bar_width: i32,
}

impl Default for TrackerStyle {
    fn default() -> Self {
        Self {
            trail: (0, 0, 255),
            window_bar: (128, 128, 128),
            line_width: 3,
            guide_width: 2,
            marker_radius: 5,
            window_bar_width: 10,
        }
    }
}

pub struct Tracker {
    settings: TrackerSettings,
    style: TrackerStyle,
    position: Point,
    /// Advances since the last reset; x is derived from it
    steps: u64,
    history: VecDeque<Point>,
    history_cap: usize,
    score: u32,
}

impl Tracker {
    /// Start at (x min, y max), the lower-left corner on screen
    pub fn new(settings: TrackerSettings) -> Self {
        // One lap plus slack; never smaller than the scoring window
        let history_cap = (settings.lap_len() + 1).max(settings.max_history_for_score);
        Self {
            settings,
            style: TrackerStyle::default(),
            position: Point::new(settings.x_range.min(), settings.y_range.max()),
            steps: 0,
            history: VecDeque::with_capacity(history_cap.min(4096)),
            history_cap,
            score: 0,
        }
    }

    pub fn with_style(mut self, style: TrackerStyle) -> Self {
        self.style = style;
        self
    }

    pub fn settings(&self) -> &TrackerSettings {
        &self.settings
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn history(&self) -> impl ExactSizeIterator<Item = &Point> + '_ {
        self.history.iter()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Last computed score, 0..=100
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Return to the left edge and wipe the trail. Y is kept.
    pub fn reset(&mut self) {
        self.steps = 0;
        self.position.x = self.settings.x_range.min();
        self.history.clear();
    }

    /// Step right by `x_step`. Returns true when this step ran past the
    /// right edge; the tracker has then already been reset.
    pub fn advance_x(&mut self) -> bool {
        self.steps += 1;
        self.position.x = self.settings.x_range.min() + self.steps as f64 * self.settings.x_step;
        if self.position.x > self.settings.x_range.max() {
            self.reset();
            return true;
        }
        false
    }

    /// Nudge by one `y_step`, saturating at the y range bounds
    pub fn move_vertical(&mut self, direction: Direction) {
        let delta = match direction {
            Direction::Up => -self.settings.y_step,
            Direction::Down => self.settings.y_step,
        };
        self.position.y = self.settings.y_range.clamp(self.position.y + delta);
    }

    /// Jump straight to `y`, clamped into the y range
    pub fn set_y(&mut self, y: f64) {
        if y.is_nan() {
            return;
        }
        self.position.y = self.settings.y_range.clamp(y);
    }

    /// Append the current position to the trail
    pub fn record_point(&mut self) {
        if self.history.len() == self.history_cap {
            self.history.pop_front();
        }
        self.history.push_back(self.position);
    }

    /// The points that take part in scoring: the newest `max_history_for_score`
    pub fn scoring_window(&self) -> impl ExactSizeIterator<Item = &Point> + '_ {
        let start = self
            .history
            .len()
            .saturating_sub(self.settings.max_history_for_score);
        self.history.range(start..)
    }

    /// X extent of the scoring window, from its oldest point to the cursor
    pub fn scoring_window_span(&self) -> Option<(f64, f64)> {
        self.scoring_window()
            .next()
            .map(|first| (first.x, self.position.x))
    }

    /// Mean squared vertical error of the scoring window against `curve`,
    /// mapped to 0..=100 with `max_error` as the zero point.
    ///
    /// Fewer than two recorded points score 0. The stored score is updated
    /// either way.
    pub fn compute_score<F>(&mut self, curve: &F, max_error: f64) -> u32
    where
        F: CurveFn + ?Sized,
    {
        let score = if self.history_len() < 2 {
            0
        } else {
            let window = self.scoring_window();
            let n = window.len() as f64;
            let mse = window
                .map(|p| {
                    let err = p.y - curve.evaluate(p.x);
                    err * err
                })
                .sum::<f64>()
                / n;
            score_from_mse(mse, max_error)
        };
        self.score = score;
        score
    }

    /// Connect the whole trail as one open polyline
    pub fn draw_trail(&self, surface: &mut PixelBuffer, mapper: &CoordinateMapper) {
        if self.history_len() < 2 {
            return;
        }
        let points: Vec<(i32, i32)> = self.history().map(|p| mapper.to_pixel(*p)).collect();
        let (r, g, b) = self.style.trail;
        surface.polyline(&points, self.style.line_width, r, g, b);
    }

    /// Marker at the cursor, crosshair guides to the left and bottom edges of
    /// the region, and a bar along the bottom edge under the scoring window.
    pub fn draw_cursor_and_guides(&self, surface: &mut PixelBuffer, mapper: &CoordinateMapper) {
        let style = &self.style;
        let region = mapper.region();
        let (cx, cy) = mapper.to_pixel(self.position());
        let (r, g, b) = style.trail;

        surface.fill_circle(cx, cy, style.marker_radius, r, g, b);
        surface.line_thick(cx, cy, region.left(), cy, style.guide_width, r, g, b);
        surface.line_thick(cx, cy, cx, region.bottom(), style.guide_width, r, g, b);

        if let Some((first_x, last_x)) = self.scoring_window_span() {
            let (r, g, b) = style.window_bar;
            let bottom = region.bottom();
            surface.line_thick(
                mapper.column(first_x),
                bottom,
                mapper.column(last_x),
                bottom,
                style.window_bar_width,
                r,
                g,
                b,
            );
        }
    }
}

/// `round(max(0, 100 * (1 - mse / max_error)))`
pub fn score_from_mse(mse: f64, max_error: f64) -> u32 {
    let raw = 100.0 * (1.0 - mse / max_error);
    if raw.is_nan() {
        return 0;
    }
    raw.max(0.0).round() as u32
}
