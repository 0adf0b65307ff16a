//! Line segments making up piecewise-linear membership functions

use std::fmt;

/// A straight line `y = m·x + c` valid on `[start_x, end_x]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSegment {
    pub start_x: f64,
    pub end_x: f64,
    pub slope: f64,
    pub intercept: f64,
}

impl LineSegment {
    pub fn new(start_x: f64, end_x: f64, slope: f64, intercept: f64) -> Self {
        Self { start_x, end_x, slope, intercept }
    }

    /// Line through `(x0, y0)` and `(x1, y1)`, requires `x1 > x0`
    pub fn through(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        let slope = (y1 - y0) / (x1 - x0);
        let intercept = y0 - slope * x0;
        Self::new(x0, x1, slope, intercept)
    }

    pub fn contains(&self, x: f64) -> bool {
        x >= self.start_x && x <= self.end_x
    }

    pub fn compute(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

impl fmt::Display for LineSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "LineSegment[{}, {}] y = {}x + {}",
            self.start_x, self.end_x, self.slope, self.intercept
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_through_points() {
        let seg = LineSegment::through(0.0, 0.0, 10.0, 1.0);
        assert!((seg.compute(5.0) - 0.5).abs() < 1e-12);
        assert!(seg.contains(0.0));
        assert!(seg.contains(10.0));
        assert!(!seg.contains(10.5));
    }

    #[test]
    fn test_falling_segment() {
        let seg = LineSegment::through(100.0, 1.0, 300.0, 0.0);
        assert!((seg.compute(250.0) - 0.25).abs() < 1e-12);
    }
}
