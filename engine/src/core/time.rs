use std::time::{Duration, Instant};

/// Fixed step of a 60 Hz clock.
pub const SIXTY_FPS: Duration = Duration::from_nanos(16_666_667);

/// A Time represents a specific amount of time elapsed within the engine for a single frame.
/// Each frame captures the delta since the previous frame, the total elapsed time and an
/// accumulator that decides how many fixed steps the frame owes. New frames are generated
/// from the previous one with [`next`](Time::next), or [`advance`](Time::advance) when the
/// caller supplies the delta.
#[derive(Debug, Copy, Clone)]
pub struct Time {
    // The instant this frame was created
    instant: Instant,
    /// Length of one fixed step
    pub fixed_step: Duration,
    /// The time delta since the last frame
    pub delta: Duration,
    /// The total elapsed time since the first frame
    pub elapsed: Duration,
    /// The total elapsed time, advanced only in whole fixed steps
    pub fixed_elapsed: Duration,
    /// Time owed to fixed steps
    accumulator: Duration,
}

impl Time {
    /// Construct a new `Time` with delta and elapsed set to zero.
    pub fn new(fixed_step: Duration) -> Self {
        Self {
            instant: Instant::now(),
            fixed_step,
            delta: Duration::ZERO,
            elapsed: Duration::ZERO,
            fixed_elapsed: Duration::ZERO,
            accumulator: Duration::ZERO,
        }
    }

    /// Construct a new `Time` whose fixed step runs `rate` times per second.
    ///
    /// # Panics
    /// If `rate` is not a positive finite number.
    pub fn from_rate(rate: f32) -> Self {
        Self::new(Duration::from_secs_f64(1.0 / f64::from(rate)))
    }

    /// Create the next frame, measuring the delta since this one was created.
    pub fn next(self) -> Self {
        let delta = self.instant.elapsed();
        self.advance(delta)
    }

    /// Create the next frame with an explicit delta.
    pub fn advance(self, delta: Duration) -> Self {
        Self {
            instant: Instant::now(),
            fixed_step: self.fixed_step,
            delta,
            elapsed: self.elapsed + delta,
            fixed_elapsed: self.fixed_elapsed,
            accumulator: self.accumulator + delta,
        }
    }

    /// Determine whether this frame has accumulated enough time for a fixed step.
    pub fn has_fixed(&self) -> bool {
        !self.fixed_step.is_zero() && self.accumulator >= self.fixed_step
    }

    /// Consume one fixed step from the accumulator.
    pub fn increment_fixed(&mut self) {
        self.fixed_elapsed += self.fixed_step;
        self.accumulator = self.accumulator.saturating_sub(self.fixed_step);
    }

    /// The frame delta in seconds.
    #[inline]
    pub fn delta_secs(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    /// The fixed step in seconds.
    #[inline]
    pub fn fixed_step_secs(&self) -> f32 {
        self.fixed_step.as_secs_f32()
    }

    /// Reset the clock to now with an empty accumulator, e.g. when a paused loop resumes.
    pub fn reset_now(&mut self) {
        self.instant = Instant::now();
        self.accumulator = Duration::ZERO;
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new(SIXTY_FPS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_accumulates_fixed_steps() {
        // Given
        let time = Time::new(Duration::from_millis(10));

        // When
        let mut time = time.advance(Duration::from_millis(25));

        // Then
        assert_eq!(time.delta, Duration::from_millis(25));
        assert_eq!(time.elapsed, Duration::from_millis(25));

        let mut steps = 0;
        while time.has_fixed() {
            time.increment_fixed();
            steps += 1;
        }
        assert_eq!(steps, 2);
        assert_eq!(time.fixed_elapsed, Duration::from_millis(20));

        // When - the remainder carries into the next frame
        let mut time = time.advance(Duration::from_millis(5));

        // Then
        assert!(time.has_fixed());
        time.increment_fixed();
        assert!(!time.has_fixed());
        assert_eq!(time.elapsed, Duration::from_millis(30));
    }

    #[test]
    fn from_rate_sets_the_step() {
        // Given
        let time = Time::from_rate(50.0);

        // Then
        assert_eq!(time.fixed_step, Duration::from_millis(20));
        assert!((time.fixed_step_secs() - 0.02).abs() < 1e-6);
    }

    #[test]
    fn reset_now_drops_owed_steps() {
        // Given
        let mut time = Time::new(Duration::from_millis(10)).advance(Duration::from_millis(100));
        assert!(time.has_fixed());

        // When
        time.reset_now();

        // Then
        assert!(!time.has_fixed());
        assert_eq!(time.elapsed, Duration::from_millis(100));
    }
}
