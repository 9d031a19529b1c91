//! Domain-space geometry shared by the reference curves and the tracker
//!
//! Curves and the tracker live in their own real-valued domain. Everything
//! that reaches the screen goes through a [`CoordinateMapper`], which maps a
//! domain point into the fixed pixel rectangle of the grid asset.

mod curve;
mod tracker;

pub use curve::{CurveFn, FunctionKind, ReferenceCurve};
pub use tracker::{Direction, Tracker, TrackerSettings, TrackerStyle};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Setup bugs caught at construction time
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("range must satisfy min < max, got ({min}, {max})")]
    EmptyRange { min: f64, max: f64 },
    #[error("range bounds must be finite, got ({min}, {max})")]
    NonFiniteRange { min: f64, max: f64 },
    #[error("sub-region must have positive size, got {width}x{height}")]
    DegenerateRegion { width: u32, height: u32 },
    #[error("{name} must be finite and > 0, got {value}")]
    NonPositiveStep { name: &'static str, value: f64 },
    #[error("scoring window must hold at least one point")]
    ZeroWindow,
}

/// A point in domain space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Valid extent along one axis. Always `min < max`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "(f64, f64)", into = "(f64, f64)")]
pub struct DomainRange {
    min: f64,
    max: f64,
}

impl DomainRange {
    pub fn new(min: f64, max: f64) -> Result<Self, GeometryError> {
        if !min.is_finite() || !max.is_finite() {
            return Err(GeometryError::NonFiniteRange { min, max });
        }
        if min >= max {
            return Err(GeometryError::EmptyRange { min, max });
        }
        Ok(Self { min, max })
    }

    #[inline]
    pub fn min(&self) -> f64 {
        self.min
    }

    #[inline]
    pub fn max(&self) -> f64 {
        self.max
    }

    #[inline]
    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// Inclusive on both ends
    #[inline]
    pub fn contains(&self, v: f64) -> bool {
        v >= self.min && v <= self.max
    }

    #[inline]
    pub fn clamp(&self, v: f64) -> f64 {
        v.clamp(self.min, self.max)
    }
}

impl TryFrom<(f64, f64)> for DomainRange {
    type Error = GeometryError;

    fn try_from((min, max): (f64, f64)) -> Result<Self, Self::Error> {
        Self::new(min, max)
    }
}

impl From<DomainRange> for (f64, f64) {
    fn from(range: DomainRange) -> Self {
        (range.min, range.max)
    }
}

/// Pixel rectangle that domain coordinates are mapped into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubRegion {
    origin_x: i32,
    origin_y: i32,
    width: u32,
    height: u32,
}

impl SubRegion {
    pub fn new(origin_x: i32, origin_y: i32, width: u32, height: u32) -> Result<Self, GeometryError> {
        if width == 0 || height == 0 {
            return Err(GeometryError::DegenerateRegion { width, height });
        }
        Ok(Self {
            origin_x,
            origin_y,
            width,
            height,
        })
    }

    #[inline]
    pub fn origin(&self) -> (i32, i32) {
        (self.origin_x, self.origin_y)
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Same size, anchored at `(x, y)`. Used for drawing into an offscreen layer.
    pub fn moved_to(&self, x: i32, y: i32) -> Self {
        Self {
            origin_x: x,
            origin_y: y,
            ..*self
        }
    }

    #[inline]
    pub fn left(&self) -> i32 {
        self.origin_x
    }

    #[inline]
    pub fn bottom(&self) -> i32 {
        self.origin_y + self.height as i32
    }
}

/// Maps domain points into a [`SubRegion`].
///
/// No clamping: points outside the ranges land outside the region.
/// Domain y grows towards the bottom of the screen, matching pixel rows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMapper {
    x_range: DomainRange,
    y_range: DomainRange,
    region: SubRegion,
}

impl CoordinateMapper {
    pub fn new(x_range: DomainRange, y_range: DomainRange, region: SubRegion) -> Self {
        Self {
            x_range,
            y_range,
            region,
        }
    }

    pub fn region(&self) -> SubRegion {
        self.region
    }

    /// Same ranges, mapping into `region` instead
    pub fn with_region(&self, region: SubRegion) -> Self {
        Self { region, ..*self }
    }

    /// Domain point to sub-pixel screen position
    #[inline]
    pub fn map(&self, p: Point) -> (f64, f64) {
        let px = self.region.origin_x as f64
            + (p.x - self.x_range.min) * self.region.width as f64 / self.x_range.span();
        let py = self.region.origin_y as f64
            + (p.y - self.y_range.min) * self.region.height as f64 / self.y_range.span();
        (px, py)
    }

    /// Domain point to integer pixel (truncated towards negative infinity)
    #[inline]
    pub fn to_pixel(&self, p: Point) -> (i32, i32) {
        let (px, py) = self.map(p);
        (px.floor() as i32, py.floor() as i32)
    }

    /// Inverse of [`map`](Self::map)
    #[cfg(test)]
    pub fn unmap(&self, px: f64, py: f64) -> Point {
        let x = self.x_range.min
            + (px - self.region.origin_x as f64) * self.x_range.span() / self.region.width as f64;
        let y = self.y_range.min
            + (py - self.region.origin_y as f64) * self.y_range.span() / self.region.height as f64;
        Point::new(x, y)
    }

    /// Screen column for a domain x value
    #[inline]
    pub fn column(&self, x: f64) -> i32 {
        self.to_pixel(Point::new(x, self.y_range.min)).0
    }
}

/// Validate a strictly positive, finite step size
pub fn positive_step(name: &'static str, value: f64) -> Result<f64, GeometryError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(GeometryError::NonPositiveStep { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapper() -> CoordinateMapper {
        CoordinateMapper::new(
            DomainRange::new(-10.0, 30.0).unwrap(),
            DomainRange::new(-500.0, 500.0).unwrap(),
            SubRegion::new(200, 150, 560, 420).unwrap(),
        )
    }

    #[test]
    fn test_range_rejects_empty_and_inverted() {
        assert_eq!(
            DomainRange::new(1.0, 1.0),
            Err(GeometryError::EmptyRange { min: 1.0, max: 1.0 })
        );
        assert!(DomainRange::new(2.0, 1.0).is_err());
        assert!(DomainRange::new(0.0, f64::INFINITY).is_err());
        assert!(DomainRange::new(f64::NAN, 1.0).is_err());
    }

    #[test]
    fn test_region_rejects_zero_size() {
        assert!(SubRegion::new(0, 0, 0, 10).is_err());
        assert!(SubRegion::new(0, 0, 10, 0).is_err());
        assert!(SubRegion::new(-5, -5, 1, 1).is_ok());
    }

    #[test]
    fn test_map_corners() {
        let m = mapper();
        assert_eq!(m.map(Point::new(-10.0, -500.0)), (200.0, 150.0));
        assert_eq!(m.map(Point::new(30.0, 500.0)), (760.0, 570.0));
        assert_eq!(m.map(Point::new(10.0, 0.0)), (480.0, 360.0));
    }

    #[test]
    fn test_map_does_not_clamp() {
        let m = mapper();
        let (px, py) = m.map(Point::new(70.0, -1500.0));
        assert!(px > 760.0);
        assert!(py < 150.0);
    }

    #[test]
    fn test_map_unmap_round_trip() {
        let m = mapper();
        for i in 1..40 {
            for j in 1..20 {
                let p = Point::new(-10.0 + i as f64 * 0.997, -500.0 + j as f64 * 49.3);
                let (px, py) = m.map(p);
                let back = m.unmap(px, py);
                assert!((back.x - p.x).abs() < 1e-9, "x drift at {:?}", p);
                assert!((back.y - p.y).abs() < 1e-9, "y drift at {:?}", p);
            }
        }
    }

    #[test]
    fn test_mapper_moved_region() {
        let m = mapper();
        let local = m.with_region(m.region().moved_to(3, 3));
        assert_eq!(local.map(Point::new(-10.0, -500.0)), (3.0, 3.0));
        assert_eq!(local.to_pixel(Point::new(30.0, 500.0)), (563, 423));
        assert_eq!(local.region().width(), 560);
    }

    #[test]
    fn test_positive_step() {
        assert_eq!(positive_step("x_step", 0.5), Ok(0.5));
        assert!(positive_step("x_step", 0.0).is_err());
        assert!(positive_step("x_step", -1.0).is_err());
        assert!(positive_step("x_step", f64::NAN).is_err());
    }

    #[test]
    fn test_range_deserializes_from_pair() {
        let r: DomainRange = serde_json::from_str("[0.0, 1000.0]").unwrap();
        assert_eq!((r.min(), r.max()), (0.0, 1000.0));
        assert!(serde_json::from_str::<DomainRange>("[5.0, 5.0]").is_err());
    }
}
