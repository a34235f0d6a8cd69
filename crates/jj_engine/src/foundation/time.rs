//! Time management utilities

/// Frame timer driven by timestamps from the windowing backend
///
/// The clock never reads the system time itself. The owner feeds it the
/// backend's monotonic time in seconds, which keeps headless runs
/// deterministic.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last_frame: f64,
    delta_time: f32,
    total_time: f32,
    frame_count: u64,
}

impl FrameClock {
    /// Create a clock whose first delta is measured from `start`
    pub fn new(start: f64) -> Self {
        Self {
            last_frame: start,
            delta_time: 0.0,
            total_time: 0.0,
            frame_count: 0,
        }
    }

    /// Advance the clock to `now` (should be called once per frame)
    ///
    /// A timestamp older than the previous one yields a zero delta.
    pub fn tick(&mut self, now: f64) {
        let elapsed = (now - self.last_frame).max(0.0);
        self.delta_time = elapsed as f32;
        self.total_time += self.delta_time;
        self.last_frame = now;
        self.frame_count += 1;
    }

    /// Get the time since the last frame in seconds
    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    /// Get the total elapsed time since the clock started
    pub fn total_time(&self) -> f32 {
        self.total_time
    }

    /// Get the current frame count
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Get the average FPS since the clock started
    pub fn average_fps(&self) -> f32 {
        if self.total_time > 0.0 {
            self.frame_count as f32 / self.total_time
        } else {
            0.0
        }
    }

    /// Get the current FPS (based on last frame time)
    pub fn current_fps(&self) -> f32 {
        if self.delta_time > 0.0 {
            1.0 / self.delta_time
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_first_tick_measures_from_start() {
        let mut clock = FrameClock::new(10.0);
        clock.tick(10.5);
        assert_relative_eq!(clock.delta_time(), 0.5);
        assert_eq!(clock.frame_count(), 1);
    }

    #[test]
    fn test_fps() {
        let mut clock = FrameClock::new(0.0);
        assert_eq!(clock.current_fps(), 0.0);
        assert_eq!(clock.average_fps(), 0.0);

        clock.tick(0.25);
        clock.tick(0.5);
        assert_relative_eq!(clock.current_fps(), 4.0);
        assert_relative_eq!(clock.average_fps(), 4.0);
        assert_relative_eq!(clock.total_time(), 0.5);
    }

    #[test]
    fn test_backwards_time_clamps_to_zero() {
        let mut clock = FrameClock::new(5.0);
        clock.tick(4.0);
        assert_eq!(clock.delta_time(), 0.0);
    }
}
