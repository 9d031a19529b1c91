//! Frame pacing

use std::collections::VecDeque;
use std::thread;
use std::time::{Duration, Instant};

/// Fixed-rate frame clock with a rolling average of frame times
pub struct FrameClock {
    slot: Duration,
    frame_start: Instant,
    frame_times: VecDeque<f32>,
    sample_count: usize,
}

impl FrameClock {
    /// `target_fps` of 0 runs unpaced
    pub fn new(target_fps: u32, sample_count: usize) -> Self {
        let slot = if target_fps == 0 {
            Duration::ZERO
        } else {
            Duration::from_secs_f64(1.0 / target_fps as f64)
        };
        Self {
            slot,
            frame_start: Instant::now(),
            frame_times: VecDeque::with_capacity(sample_count),
            sample_count: sample_count.max(1),
        }
    }

    /// Sleep out the rest of the current slot and start the next one.
    /// Returns the frame's duration in seconds.
    pub fn tick(&mut self) -> f32 {
        let busy = self.frame_start.elapsed();
        if busy < self.slot {
            thread::sleep(self.slot - busy);
        }
        let now = Instant::now();
        let dt = (now - self.frame_start).as_secs_f32();
        self.frame_start = now;
        self.record(dt);
        dt
    }

    fn record(&mut self, dt: f32) {
        self.frame_times.push_back(dt);
        if self.frame_times.len() > self.sample_count {
            self.frame_times.pop_front();
        }
    }

    fn avg_dt(&self) -> f32 {
        if self.frame_times.is_empty() {
            return 0.0;
        }
        self.frame_times.iter().sum::<f32>() / self.frame_times.len() as f32
    }

    pub fn avg_fps(&self) -> f32 {
        let dt = self.avg_dt();
        if dt > 0.0 {
            1.0 / dt
        } else {
            0.0
        }
    }

    pub fn avg_frame_time_ms(&self) -> f32 {
        self.avg_dt() * 1000.0
    }

    /// (slowest, fastest) over the sample window
    pub fn min_max_fps(&self) -> (f32, f32) {
        if self.frame_times.is_empty() {
            return (0.0, 0.0);
        }
        let min_dt = self.frame_times.iter().copied().fold(f32::INFINITY, f32::min);
        let max_dt = self.frame_times.iter().copied().fold(0.0, f32::max);
        let max_fps = if min_dt > 0.0 { 1.0 / min_dt } else { 0.0 };
        let min_fps = if max_dt > 0.0 { 1.0 / max_dt } else { 0.0 };
        (min_fps, max_fps)
    }

    /// Overlay line, e.g. `FPS 60 MIN 58 MAX 61 MS 16.7`
    pub fn summary(&self) -> String {
        let (min, max) = self.min_max_fps();
        format!(
            "FPS {} MIN {} MAX {} MS {:.1}",
            self.avg_fps().round() as u32,
            min.round() as u32,
            max.round() as u32,
            self.avg_frame_time_ms()
        )
    }
}
