//! Reference curves the visitor tries to follow

use super::{positive_step, CoordinateMapper, DomainRange, GeometryError, Point, SubRegion};
use crate::display::{PixelBuffer, Rgb};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A scalar function of one real variable.
///
/// May return values outside any range, or NaN, for some inputs; callers
/// filter or score as appropriate.
pub trait CurveFn {
    fn evaluate(&self, x: f64) -> f64;
}

impl<F> CurveFn for F
where
    F: Fn(f64) -> f64,
{
    #[inline]
    fn evaluate(&self, x: f64) -> f64 {
        self(x)
    }
}

/// Built-in function shapes selectable from the config file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FunctionKind {
    Sine {
        amplitude: f64,
        frequency: f64,
        #[serde(default)]
        phase: f64,
        #[serde(default)]
        offset: f64,
    },
    Cosine {
        amplitude: f64,
        frequency: f64,
        #[serde(default)]
        phase: f64,
        #[serde(default)]
        offset: f64,
    },
    Linear {
        slope: f64,
        intercept: f64,
    },
    Constant {
        value: f64,
    },
    /// Coefficients in ascending order: c0 + c1*x + c2*x^2 + ...
    Polynomial {
        coefficients: Vec<f64>,
    },
}

impl CurveFn for FunctionKind {
    fn evaluate(&self, x: f64) -> f64 {
        match self {
            Self::Sine {
                amplitude,
                frequency,
                phase,
                offset,
            } => amplitude * (frequency * x + phase).sin() + offset,
            Self::Cosine {
                amplitude,
                frequency,
                phase,
                offset,
            } => amplitude * (frequency * x + phase).cos() + offset,
            Self::Linear { slope, intercept } => slope * x + intercept,
            Self::Constant { value } => *value,
            // Horner
            Self::Polynomial { coefficients } => {
                coefficients.iter().rev().fold(0.0, |acc, c| acc * x + c)
            },
        }
    }
}

/// An immutable function plus the window it is plotted in
pub struct ReferenceCurve {
    function: Box<dyn CurveFn>,
    x_range: DomainRange,
    y_range: DomainRange,
    sample_step: f64,
    color: Rgb,
    line_width: i32,
}

impl ReferenceCurve {
    pub fn new(
        function: impl CurveFn + 'static,
        x_range: DomainRange,
        y_range: DomainRange,
        sample_step: f64,
    ) -> Result<Self, GeometryError> {
        Ok(Self {
            function: Box::new(function),
            x_range,
            y_range,
            sample_step: positive_step("sample_step", sample_step)?,
            color: (255, 0, 0),
            line_width: 3,
        })
    }

    pub fn with_style(mut self, color: Rgb, line_width: i32) -> Self {
        self.color = color;
        self.line_width = line_width.max(1);
        self
    }

    #[inline]
    pub fn evaluate(&self, x: f64) -> f64 {
        self.function.evaluate(x)
    }

    #[cfg(test)]
    pub fn color(&self) -> Rgb {
        self.color
    }

    /// Points at x = min, min + step, ... while x < max, keeping only those
    /// whose y lies inside the y range. Recomputed on every call.
    pub fn sample(&self) -> impl Iterator<Item = Point> + '_ {
        let (min, max, step) = (self.x_range.min(), self.x_range.max(), self.sample_step);
        // Index-based so long domains do not accumulate step error
        (0u64..)
            .map(move |i| min + i as f64 * step)
            .take_while(move |&x| x < max)
            .map(move |x| Point::new(x, self.function.evaluate(x)))
            .filter(move |p| self.y_range.contains(p.y))
    }

    /// Draw the curve as an open polyline inside `region`.
    ///
    /// Fewer than two surviving samples draw nothing.
    pub fn draw(&self, surface: &mut PixelBuffer, region: SubRegion) {
        let mapper = CoordinateMapper::new(self.x_range, self.y_range, region);
        let points: Vec<(i32, i32)> = self.sample().map(|p| mapper.to_pixel(p)).collect();
        if points.len() < 2 {
            return;
        }
        let (r, g, b) = self.color;
        surface.polyline(&points, self.line_width, r, g, b);
    }
}

impl CurveFn for ReferenceCurve {
    #[inline]
    fn evaluate(&self, x: f64) -> f64 {
        ReferenceCurve::evaluate(self, x)
    }
}

impl fmt::Debug for ReferenceCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReferenceCurve")
            .field("x_range", &self.x_range)
            .field("y_range", &self.y_range)
            .field("sample_step", &self.sample_step)
            .field("color", &self.color)
            .field("line_width", &self.line_width)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(min: f64, max: f64) -> DomainRange {
        DomainRange::new(min, max).unwrap()
    }

    #[test]
    fn test_sample_is_half_open() {
        let curve = ReferenceCurve::new(|x: f64| x, range(0.0, 10.0), range(0.0, 100.0), 1.0).unwrap();
        let xs: Vec<f64> = curve.sample().map(|p| p.x).collect();
        assert_eq!(xs, (0..10).map(f64::from).collect::<Vec<_>>());
        assert!(curve.sample().all(|p| p.x == p.y));
    }

    #[test]
    fn test_sample_filters_out_of_range() {
        let curve = ReferenceCurve::new(|x: f64| x * x, range(-5.0, 5.0), range(0.0, 4.0), 1.0).unwrap();
        let xs: Vec<f64> = curve.sample().map(|p| p.x).collect();
        assert_eq!(xs, vec![-2.0, -1.0, 0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_sample_drops_nan() {
        let curve =
            ReferenceCurve::new(|x: f64| x.sqrt(), range(-3.0, 3.0), range(0.0, 10.0), 1.0).unwrap();
        assert_eq!(curve.sample().count(), 3);
    }

    #[test]
    fn test_sample_is_restartable() {
        let curve = ReferenceCurve::new(
            FunctionKind::Sine {
                amplitude: 100.0,
                frequency: 1.0,
                phase: 0.0,
                offset: 0.0,
            },
            range(-std::f64::consts::TAU, std::f64::consts::TAU),
            range(-200.0, 200.0),
            0.1,
        )
        .unwrap();
        let first: Vec<Point> = curve.sample().collect();
        let second: Vec<Point> = curve.sample().collect();
        assert_eq!(first, second);
        assert!(first.len() > 100);
    }

    #[test]
    fn test_rejects_bad_step() {
        assert!(ReferenceCurve::new(|x: f64| x, range(0.0, 1.0), range(0.0, 1.0), 0.0).is_err());
        assert!(ReferenceCurve::new(|x: f64| x, range(0.0, 1.0), range(0.0, 1.0), -0.1).is_err());
    }

    #[test]
    fn test_function_kinds() {
        let poly = FunctionKind::Polynomial {
            coefficients: vec![1.0, 2.0, 3.0],
        };
        assert_eq!(poly.evaluate(2.0), 1.0 + 4.0 + 12.0);
        let lin = FunctionKind::Linear {
            slope: 0.5,
            intercept: -3.0,
        };
        assert_eq!(lin.evaluate(10.0), 2.0);
        assert_eq!(FunctionKind::Constant { value: 7.0 }.evaluate(1e9), 7.0);
        let cos = FunctionKind::Cosine {
            amplitude: 2.0,
            frequency: 1.0,
            phase: 0.0,
            offset: 1.0,
        };
        assert!((cos.evaluate(0.0) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_reference_curve_evaluates_through_trait() {
        fn at<F: CurveFn + ?Sized>(f: &F, x: f64) -> f64 {
            f.evaluate(x)
        }
        let curve = ReferenceCurve::new(
            FunctionKind::Linear {
                slope: 2.0,
                intercept: 1.0,
            },
            range(0.0, 10.0),
            range(0.0, 10.0),
            1.0,
        )
        .unwrap();
        // Outside its own x range the function is still evaluated
        assert_eq!(at(&curve, 50.0), 101.0);
        let boxed: Box<dyn CurveFn> = Box::new(curve);
        assert_eq!(at(boxed.as_ref(), 2.0), 5.0);
    }

    #[test]
    fn test_function_kind_from_json() {
        let f: FunctionKind =
            serde_json::from_str(r#"{"kind": "sine", "amplitude": 3.0, "frequency": 0.5}"#).unwrap();
        assert_eq!(
            f,
            FunctionKind::Sine {
                amplitude: 3.0,
                frequency: 0.5,
                phase: 0.0,
                offset: 0.0
            }
        );
    }

    #[test]
    fn test_draw_single_point_is_noop() {
        // Only x = 0 survives the y filter
        let curve =
            ReferenceCurve::new(|x: f64| x * 100.0, range(0.0, 10.0), range(-1.0, 1.0), 1.0).unwrap();
        let mut surface = PixelBuffer::with_size(20, 20);
        surface.clear_rgba(0, 0, 0, 0);
        curve.draw(&mut surface, SubRegion::new(0, 0, 20, 20).unwrap());
        assert!(surface.as_bytes().chunks_exact(4).all(|px| px[0] == 0));
    }

    #[test]
    fn test_draw_marks_pixels_in_curve_color() {
        let curve = ReferenceCurve::new(|_x: f64| 5.0, range(0.0, 10.0), range(0.0, 10.0), 1.0)
            .unwrap()
            .with_style((0, 200, 0), 1);
        let mut surface = PixelBuffer::with_size(10, 10);
        surface.clear_rgba(0, 0, 0, 0);
        curve.draw(&mut surface, SubRegion::new(0, 0, 10, 10).unwrap());
        // Samples at x = 0..=9 map to columns 0..=9, y = 5 maps to row 5
        assert_eq!(surface.get_pixel_rgba(0, 5), Some((0, 200, 0, 255)));
        assert_eq!(surface.get_pixel_rgba(9, 5), Some((0, 200, 0, 255)));
        assert_eq!(surface.get_pixel_rgba(4, 2), Some((0, 0, 0, 0)));
    }
}
