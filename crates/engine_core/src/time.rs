//! Time management for the frame loop.

use std::time::{Duration, Instant};

/// Manages frame timing for the animation clock.
///
/// Elapsed time is measured from construction and never resets, so shader
/// time uniforms advance continuously across frames.
#[derive(Debug)]
pub struct Time {
    /// Time when the clock started.
    start_time: Instant,
    /// Time of the last frame.
    last_frame: Instant,
    /// Total elapsed time since start.
    elapsed: Duration,
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

impl Time {
    /// Create a new time manager starting now.
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    /// Create a time manager with an explicit start instant.
    pub fn starting_at(start: Instant) -> Self {
        Self {
            start_time: start,
            last_frame: start,
            elapsed: Duration::ZERO,
        }
    }

    /// Update timing at the start of a new frame.
    pub fn update(&mut self) {
        self.update_at(Instant::now());
    }

    /// Update timing as if the frame started at `now`.
    ///
    /// Instants earlier than the previous frame are treated as the previous
    /// frame, so elapsed time never goes backwards.
    pub fn update_at(&mut self, now: Instant) {
        let now = now.max(self.last_frame);
        self.last_frame = now;
        self.elapsed = now - self.start_time;
    }

    /// Get total elapsed time in seconds.
    pub fn elapsed_seconds(&self) -> f32 {
        self.elapsed.as_secs_f32()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_accumulates_across_frames() {
        let start = Instant::now();
        let mut time = Time::starting_at(start);
        time.update_at(start + Duration::from_millis(500));
        assert!((time.elapsed_seconds() - 0.5).abs() < 1e-6);
        time.update_at(start + Duration::from_millis(1500));
        assert!((time.elapsed_seconds() - 1.5).abs() < 1e-6);
    }

    #[test]
    fn elapsed_never_goes_backwards() {
        let start = Instant::now();
        let mut time = Time::starting_at(start);
        time.update_at(start + Duration::from_secs(2));
        time.update_at(start + Duration::from_secs(1));
        assert!((time.elapsed_seconds() - 2.0).abs() < 1e-6);
        time.update_at(start + Duration::from_secs(3));
        assert!((time.elapsed_seconds() - 3.0).abs() < 1e-6);
    }
}
