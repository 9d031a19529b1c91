//! Per-frame game state: the tracker, the curve rotation and the score
//!
//! Nothing in here touches SDL. The frame loop collects [`Intent`]s, hands
//! them to [`Exhibit::step`] and renders whatever state results.

use crate::config::{Config, ConfigError};
use crate::input::Intent;
use crate::plot::{DomainRange, ReferenceCurve, Tracker};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameOutcome {
    /// The tracker ran off the right edge and the next curve is now active
    pub lapped: bool,
    pub quit: bool,
    pub toggle_stats: bool,
    pub score: u32,
}

pub struct Exhibit {
    tracker: Tracker,
    curves: Vec<ReferenceCurve>,
    active: usize,
    max_error: f64,
    laps: u64,
}

impl Exhibit {
    pub fn new(tracker: Tracker, curves: Vec<ReferenceCurve>, max_error: f64) -> Result<Self, ConfigError> {
        if curves.is_empty() {
            return Err(ConfigError::NoCurves);
        }
        Ok(Self {
            tracker,
            curves,
            active: 0,
            max_error,
            laps: 0,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let tracker = Tracker::new(config.tracker_settings()?).with_style(config.tracker_style());
        Self::new(tracker, config.build_curves()?, config.max_error()?)
    }

    pub fn tracker(&self) -> &Tracker {
        &self.tracker
    }

    pub fn active_curve(&self) -> &ReferenceCurve {
        &self.curves[self.active]
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn curve_count(&self) -> usize {
        self.curves.len()
    }

    pub fn laps(&self) -> u64 {
        self.laps
    }

    /// Advance one frame: apply moves, record, step right, rotate the curve
    /// on a lap, then rescore against the (possibly new) active curve.
    ///
    /// A frame that asks to quit changes nothing.
    pub fn step(&mut self, intents: &[Intent]) -> FrameOutcome {
        let mut outcome = FrameOutcome::default();
        for intent in intents {
            match *intent {
                Intent::Move(direction) => self.tracker.move_vertical(direction),
                Intent::SetLevel(level) => {
                    let y = level_to_y(level, self.tracker.settings().y_range);
                    self.tracker.set_y(y);
                },
                Intent::ToggleStats => outcome.toggle_stats = !outcome.toggle_stats,
                Intent::Quit => outcome.quit = true,
            }
        }
        if outcome.quit {
            outcome.score = self.tracker.score();
            return outcome;
        }

        self.tracker.record_point();
        let finished_score = self.tracker.score();
        if self.tracker.advance_x() {
            self.laps += 1;
            self.active = (self.active + 1) % self.curves.len();
            outcome.lapped = true;
            log::info!(
                "lap {} done, score {}; curve {}/{} now active",
                self.laps,
                finished_score,
                self.active_index() + 1,
                self.curves.len()
            );
        }

        outcome.score = self
            .tracker
            .compute_score(&self.curves[self.active], self.max_error);
        outcome
    }
}

/// Map a wheel level in [-1, 1] linearly onto `y_range`; -1 is `min`
pub fn level_to_y(level: f64, y_range: DomainRange) -> f64 {
    let t = (level.clamp(-1.0, 1.0) + 1.0) / 2.0;
    y_range.min() + t * y_range.span()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plot::{Direction, FunctionKind, TrackerSettings};

    fn range(min: f64, max: f64) -> DomainRange {
        DomainRange::new(min, max).unwrap()
    }

    fn constant(value: f64) -> ReferenceCurve {
        ReferenceCurve::new(
            FunctionKind::Constant { value },
            range(0.0, 1000.0),
            range(-500.0, 500.0),
            1.0,
        )
        .unwrap()
    }

    fn exhibit(x_max: f64, curves: Vec<ReferenceCurve>) -> Exhibit {
        let settings = TrackerSettings::new(range(0.0, x_max), range(-500.0, 500.0), 1.0, 10.0, 300).unwrap();
        Exhibit::new(Tracker::new(settings), curves, 100_000.0).unwrap()
    }

    #[test]
    fn test_lap_after_full_traverse() {
        let mut ex = exhibit(1000.0, vec![constant(0.0), constant(100.0)]);
        for frame in 1..=1000 {
            let out = ex.step(&[]);
            assert!(!out.lapped, "unexpected lap on frame {}", frame);
        }
        assert_eq!(ex.tracker().position().x, 1000.0);
        assert_eq!(ex.tracker().history_len(), 1000);

        let out = ex.step(&[]);
        assert!(out.lapped);
        assert_eq!(ex.laps(), 1);
        assert_eq!(ex.active_index(), 1);
        assert_eq!(ex.tracker().position().x, 0.0);
        assert_eq!(ex.tracker().history_len(), 0);
        assert_eq!(out.score, 0);
    }

    #[test]
    fn test_far_from_curve_scores_zero() {
        // y stays at 500 against a flat 0: mse 250000 > max_error
        let mut ex = exhibit(1000.0, vec![constant(0.0)]);
        for _ in 0..10 {
            ex.step(&[]);
        }
        assert_eq!(ex.tracker().position().y, 500.0);
        assert_eq!(ex.tracker().score(), 0);
    }

    #[test]
    fn test_on_curve_scores_hundred() {
        let mut ex = exhibit(1000.0, vec![constant(500.0)]);
        assert_eq!(ex.step(&[]).score, 0);
        assert_eq!(ex.step(&[]).score, 100);
    }

    #[test]
    fn test_curves_rotate_round_robin() {
        let settings = TrackerSettings::new(range(0.0, 10.0), range(-500.0, 500.0), 5.0, 10.0, 300).unwrap();
        let curves = vec![constant(0.0), constant(1.0), constant(2.0)];
        let mut ex = Exhibit::new(Tracker::new(settings), curves, 100_000.0).unwrap();

        let mut seen = Vec::new();
        for _ in 0..9 {
            if ex.step(&[]).lapped {
                seen.push(ex.active_index());
            }
        }
        assert_eq!(seen, vec![1, 2, 0]);
        assert_eq!(ex.laps(), 3);
    }

    #[test]
    fn test_moves_apply_before_record() {
        let mut ex = exhibit(1000.0, vec![constant(0.0)]);
        ex.step(&[Intent::Move(Direction::Up), Intent::Move(Direction::Up)]);
        let first = *ex.tracker().history().next().unwrap();
        assert_eq!(first.y, 480.0);
        assert_eq!(first.x, 0.0);
    }

    #[test]
    fn test_quit_leaves_state_alone() {
        let mut ex = exhibit(1000.0, vec![constant(0.0)]);
        let out = ex.step(&[Intent::Move(Direction::Up), Intent::Quit]);
        assert!(out.quit);
        assert_eq!(ex.tracker().history_len(), 0);
        assert_eq!(ex.tracker().position().x, 0.0);
    }

    #[test]
    fn test_toggle_stats_pairs_cancel() {
        let mut ex = exhibit(1000.0, vec![constant(0.0)]);
        assert!(ex.step(&[Intent::ToggleStats]).toggle_stats);
        assert!(!ex.step(&[Intent::ToggleStats, Intent::ToggleStats]).toggle_stats);
    }

    #[test]
    fn test_set_level_maps_onto_range() {
        let y = range(-300.0, 300.0);
        assert_eq!(level_to_y(-1.0, y), -300.0);
        assert_eq!(level_to_y(0.0, y), 0.0);
        assert_eq!(level_to_y(1.0, y), 300.0);
        assert_eq!(level_to_y(7.0, y), 300.0);

        let mut ex = exhibit(1000.0, vec![constant(0.0)]);
        ex.step(&[Intent::SetLevel(-0.5)]);
        assert_eq!(ex.tracker().history().next().unwrap().y, -250.0);
    }

    #[test]
    fn test_empty_catalogue_rejected() {
        let settings = TrackerSettings::new(range(0.0, 10.0), range(0.0, 10.0), 1.0, 1.0, 5).unwrap();
        assert!(matches!(
            Exhibit::new(Tracker::new(settings), Vec::new(), 1.0),
            Err(ConfigError::NoCurves)
        ));
    }

    #[test]
    fn test_from_default_config() {
        let ex = Exhibit::from_config(&Config::default()).unwrap();
        assert_eq!(ex.curve_count(), 4);
        assert_eq!(ex.active_index(), 0);
        assert_eq!(ex.tracker().position().y, 300.0);
    }
}
