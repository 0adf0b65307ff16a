//! Membership functions
//!
//! Piecewise-linear shapes mapping a crisp value to a degree in `[0, 1]`:
//! - Triangular `(a, b, c)` with `a <= b <= c`
//! - Trapezoidal `(a, b, c, d)` with `a <= b <= c <= d`
//!
//! Parameters are validated once at construction and never change afterwards.
//! Sloped regions are evaluated through their [`LineSegment`]; the plateau
//! returns 1 and everything outside the open support `(a, d)` returns 0 without
//! a lookup. The support edges are always 0, shoulder shapes (`a == b` or
//! `c == d`) included.

mod segment;

pub use segment::LineSegment;

use std::fmt;

use crate::error::{ErrorCode, FuzzyError, FuzzyResult};
use crate::fuzzy_ensure;

/// Shape parameters of a membership function
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    /// Triangular: (left, peak, right)
    Triangular { a: f64, b: f64, c: f64 },
    /// Trapezoidal: (left, left_top, right_top, right)
    Trapezoidal { a: f64, b: f64, c: f64, d: f64 },
}

/// An immutable membership function
#[derive(Debug, Clone, PartialEq)]
pub struct MembershipFunction {
    shape: Shape,
    segments: Vec<LineSegment>,
}

impl MembershipFunction {
    /// Triangular membership function, rejects `!(a <= b <= c)` and `a == b == c`
    pub fn triangular(a: f64, b: f64, c: f64) -> FuzzyResult<Self> {
        check_finite(&[a, b, c])?;
        fuzzy_ensure!(
            a <= b && b <= c,
            ErrorCode::InvalidShape,
            "Triangular MF requires a <= b <= c (got {}, {}, {})", a, b, c
        );
        fuzzy_ensure!(
            !(a == b && b == c),
            ErrorCode::InvalidShape,
            "Invalid triangular MF: all points equal ({})", a
        );

        let mut segments = Vec::with_capacity(2);
        if b > a {
            segments.push(LineSegment::through(a, 0.0, b, 1.0));
        }
        if c > b {
            segments.push(LineSegment::through(b, 1.0, c, 0.0));
        }

        Ok(Self {
            shape: Shape::Triangular { a, b, c },
            segments,
        })
    }

    /// Trapezoidal membership function, rejects `!(a <= b <= c <= d)` and `a == b == c == d`
    pub fn trapezoidal(a: f64, b: f64, c: f64, d: f64) -> FuzzyResult<Self> {
        check_finite(&[a, b, c, d])?;
        fuzzy_ensure!(
            a <= b && b <= c && c <= d,
            ErrorCode::InvalidShape,
            "Trapezoidal MF requires a <= b <= c <= d (got {}, {}, {}, {})", a, b, c, d
        );
        fuzzy_ensure!(
            !(a == b && b == c && c == d),
            ErrorCode::InvalidShape,
            "Invalid trapezoidal MF: all points equal ({})", a
        );

        let mut segments = Vec::with_capacity(2);
        if b > a {
            segments.push(LineSegment::through(a, 0.0, b, 1.0));
        }
        if d > c {
            segments.push(LineSegment::through(c, 1.0, d, 0.0));
        }

        Ok(Self {
            shape: Shape::Trapezoidal { a, b, c, d },
            segments,
        })
    }

    /// Build a membership function from a kind name and its parameters
    ///
    /// `kind` is matched case-insensitively: `"triangular"` takes 3 parameters,
    /// `"trapezoidal"` takes 4.
    pub fn create(kind: &str, params: &[f64]) -> FuzzyResult<Self> {
        match kind.to_lowercase().as_str() {
            "triangular" => match params {
                [a, b, c] => Self::triangular(*a, *b, *c),
                _ => Err(FuzzyError::invalid_shape(format!(
                    "Triangular MF requires 3 parameters (got {})",
                    params.len()
                ))),
            },
            "trapezoidal" => match params {
                [a, b, c, d] => Self::trapezoidal(*a, *b, *c, *d),
                _ => Err(FuzzyError::invalid_shape(format!(
                    "Trapezoidal MF requires 4 parameters (got {})",
                    params.len()
                ))),
            },
            _ => Err(FuzzyError::invalid_shape(format!("Invalid MF type: {}", kind))
                .with_hint("Supported types: triangular, trapezoidal")),
        }
    }

    /// Membership degree of `x`, always in `[0, 1]`
    pub fn compute(&self, x: f64) -> f64 {
        match self.shape {
            Shape::Triangular { a, b, c } => {
                if x <= a || x >= c {
                    return 0.0;
                }
                if x == b {
                    return 1.0;
                }
            }
            Shape::Trapezoidal { a, b, c, d } => {
                if x <= a || x >= d {
                    return 0.0;
                }
                if x >= b && x <= c {
                    return 1.0;
                }
            }
        }

        self.segments
            .iter()
            .find(|seg| seg.contains(x))
            .map(|seg| seg.compute(x).clamp(0.0, 1.0))
            .unwrap_or(0.0)
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn segments(&self) -> &[LineSegment] {
        &self.segments
    }

    /// Support interval (where membership can be > 0)
    pub fn support(&self) -> (f64, f64) {
        match self.shape {
            Shape::Triangular { a, c, .. } => (a, c),
            Shape::Trapezoidal { a, d, .. } => (a, d),
        }
    }

    /// Core interval (where membership = 1)
    pub fn core(&self) -> (f64, f64) {
        match self.shape {
            Shape::Triangular { b, .. } => (b, b),
            Shape::Trapezoidal { b, c, .. } => (b, c),
        }
    }

    /// Human-readable name, e.g. `Triangular(0,5,10)`
    pub fn name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for MembershipFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.shape {
            Shape::Triangular { a, b, c } => write!(f, "Triangular({},{},{})", a, b, c),
            Shape::Trapezoidal { a, b, c, d } => write!(f, "Trapezoidal({},{},{},{})", a, b, c, d),
        }
    }
}

fn check_finite(params: &[f64]) -> FuzzyResult<()> {
    if params.iter().all(|p| p.is_finite()) {
        Ok(())
    } else {
        Err(FuzzyError::invalid_shape(format!(
            "Membership function parameters must be finite: {:?}",
            params
        )))
    }
}
