use glam::Vec3;

/// Time accumulator driving the light around the origin.
///
/// Each frame adds `speed` to `time`; the light then sits at
/// `x = radius * sin(time)`, `y = radius * cos(time)`. The z coordinate is
/// left where it was.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SunOrbit {
    time: f64,
    speed: f64,
    radius: f64,
}

impl Default for SunOrbit {
    fn default() -> Self {
        Self::new(1.0, 0.005, 30.0)
    }
}

impl SunOrbit {
    pub fn new(initial_time: f64, speed: f64, radius: f64) -> Self {
        Self {
            time: initial_time,
            speed,
            radius,
        }
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Step the accumulator once. Returns the new time.
    pub fn advance(&mut self) -> f64 {
        self.time += self.speed;
        self.time
    }

    /// Light position for `time`, keeping `current.z`.
    pub fn position_at(&self, time: f64, current: Vec3) -> Vec3 {
        Vec3::new(
            (self.radius * time.sin()) as f32,
            (self.radius * time.cos()) as f32,
            current.z,
        )
    }

    /// Light position for the current time.
    pub fn position(&self, current: Vec3) -> Vec3 {
        self.position_at(self.time, current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_one() {
        let sun = SunOrbit::default();
        assert_eq!(sun.time(), 1.0);
        assert_eq!(sun.speed(), 0.005);
        assert_eq!(sun.radius(), 30.0);
    }

    #[test]
    fn advance_accumulates_step() {
        let mut sun = SunOrbit::default();
        for _ in 0..1000 {
            sun.advance();
        }
        assert!((sun.time() - (1.0 + 0.005 * 1000.0)).abs() < 1e-9);
    }

    #[test]
    fn position_is_sin_cos_of_time() {
        let sun = SunOrbit::default();
        for t in [0.0_f64, 1.0, 1.005, 2.5, -3.0, 100.0] {
            let p = sun.position_at(t, Vec3::new(7.0, 7.0, 4.0));
            assert_eq!(p.x, (30.0 * t.sin()) as f32);
            assert_eq!(p.y, (30.0 * t.cos()) as f32);
            assert_eq!(p.z, 4.0);
        }
    }

    #[test]
    fn position_depends_only_on_time() {
        let mut a = SunOrbit::default();
        let mut b = SunOrbit::default();
        for _ in 0..37 {
            a.advance();
            b.advance();
        }
        assert_eq!(a.position(Vec3::ZERO), b.position(Vec3::ZERO));
    }
}
