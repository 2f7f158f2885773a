//! Time management for the frame-coupled simulation loop.

/// Frame clock. Simulation time advances by the frame delta, so stored
/// timestamps (dash start, stun start, ...) compare against `elapsed_seconds`.
#[derive(Debug)]
pub struct Time {
    /// Duration of the last frame in seconds.
    delta: f32,
    /// Total simulated time in seconds.
    elapsed: f32,
    /// Frame count since start.
    frame_count: u64,
    /// Upper bound on a single frame delta (hitches are clamped to this).
    max_delta: f32,
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

impl Time {
    /// Create a new time manager.
    pub fn new() -> Self {
        Self {
            delta: 0.0,
            elapsed: 0.0,
            frame_count: 0,
            max_delta: 0.25,
        }
    }

    /// Advance by an explicit frame delta.
    pub fn advance(&mut self, delta: f32) {
        let delta = if delta.is_finite() { delta } else { 0.0 };
        let clamped = delta.clamp(0.0, self.max_delta);
        if clamped != delta {
            log::debug!("Frame delta {:.4}s clamped to {:.4}s", delta, clamped);
        }
        self.delta = clamped;
        self.elapsed += clamped;
        self.frame_count += 1;
    }

    /// Get the delta time in seconds.
    pub fn delta_seconds(&self) -> f32 {
        self.delta
    }

    /// Get total elapsed time in seconds.
    pub fn elapsed_seconds(&self) -> f32 {
        self.elapsed
    }

    /// Get the current frame count.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Get the current FPS (averaged over last frame).
    pub fn fps(&self) -> f32 {
        if self.delta > 0.0 {
            1.0 / self.delta
        } else {
            0.0
        }
    }

    /// Set the largest delta a single frame may report.
    pub fn set_max_delta(&mut self, seconds: f32) {
        self.max_delta = seconds.max(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_accumulates() {
        let mut t = Time::new();
        t.advance(0.016);
        t.advance(0.020);
        assert_eq!(t.frame_count(), 2);
        assert!((t.elapsed_seconds() - 0.036).abs() < 1e-6);
    }

    #[test]
    fn hitches_are_clamped() {
        let mut t = Time::new();
        t.advance(3.0);
        assert_eq!(t.delta_seconds(), 0.25);
        t.advance(f32::NAN);
        assert_eq!(t.delta_seconds(), 0.0);
        t.advance(-1.0);
        assert_eq!(t.delta_seconds(), 0.0);
    }
}
