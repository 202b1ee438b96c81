/// A closed range of `f64` values.
///
/// Holds the analytic bounds of fractal noise sums and the caller supplied
/// ranges those sums are remapped onto.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub min: f64,
    pub max: f64,
}

impl Interval {
    /// Create a new interval given min and max values.
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Returns the size of the interval (max - min).
    pub fn size(&self) -> f64 {
        self.max - self.min
    }

    /// Position of `x` inside the interval as a fraction in [0, 1].
    ///
    /// Values outside the interval are clamped. A zero sized interval maps
    /// everything to 0.
    pub fn normalize(&self, x: f64) -> f64 {
        let size = self.size();
        if size <= 0.0 {
            return 0.0;
        }
        ((x - self.min) / size).clamp(0.0, 1.0)
    }

    /// Linear interpolation from `min` (t = 0) to `max` (t = 1).
    pub fn lerp(&self, t: f64) -> f64 {
        self.min + t * (self.max - self.min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_size() {
        let interval = Interval::new(2.0, 7.0);
        assert_eq!(interval.size(), 5.0);

        let negative = Interval::new(-5.0, 5.0);
        assert_eq!(negative.size(), 10.0);
    }

    #[test]
    fn test_interval_normalize() {
        let interval = Interval::new(-2.0, 2.0);

        assert_eq!(interval.normalize(-2.0), 0.0);
        assert_eq!(interval.normalize(0.0), 0.5);
        assert_eq!(interval.normalize(2.0), 1.0);
        assert_eq!(interval.normalize(7.0), 1.0);
        assert_eq!(Interval::new(1.0, 1.0).normalize(1.0), 0.0);
    }

    #[test]
    fn test_interval_lerp() {
        let target = Interval::new(10.0, 20.0);

        assert_eq!(target.lerp(0.0), 10.0);
        assert_eq!(target.lerp(0.5), 15.0);
        assert_eq!(target.lerp(1.0), 20.0);
        // Normalizing then lerping carries a value between ranges
        assert_eq!(target.lerp(Interval::new(-1.0, 1.0).normalize(3.0)), 20.0);
    }
}
