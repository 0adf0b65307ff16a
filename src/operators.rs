//! Fuzzy operators
//!
//! - [`TNorm`] - fuzzy AND
//! - [`SNorm`] - fuzzy OR, also used to aggregate activations across rules
//! - [`Implication`] - combines a firing strength with a consequent degree
//! - [`LogicalOperator`] - the AND / OR connector between rule antecedents
//!
//! All operators are stateless, `Copy`, and dispatched by `match`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// T-norm types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TNorm {
    /// Minimum (Gödel) t-norm
    #[default]
    Min,
    /// Algebraic product t-norm
    Product,
    /// Łukasiewicz t-norm
    Lukasiewicz,
}

impl TNorm {
    pub fn apply(&self, a: f64, b: f64) -> f64 {
        match self {
            TNorm::Min => a.min(b),
            TNorm::Product => a * b,
            TNorm::Lukasiewicz => (a + b - 1.0).max(0.0),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TNorm::Min => "min",
            TNorm::Product => "product",
            TNorm::Lukasiewicz => "lukasiewicz",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "min" | "minimum" => Some(TNorm::Min),
            "product" | "prod" => Some(TNorm::Product),
            "lukasiewicz" | "bounded" => Some(TNorm::Lukasiewicz),
            _ => None,
        }
    }
}

/// S-norm (t-conorm) types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SNorm {
    /// Maximum
    #[default]
    Max,
    /// Sum clipped at 1
    BoundedSum,
    /// Probabilistic sum `a + b - a·b`
    ProbabilisticSum,
}

impl SNorm {
    pub fn apply(&self, a: f64, b: f64) -> f64 {
        match self {
            SNorm::Max => a.max(b),
            SNorm::BoundedSum => (a + b).min(1.0),
            SNorm::ProbabilisticSum => a + b - a * b,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SNorm::Max => "max",
            SNorm::BoundedSum => "bounded_sum",
            SNorm::ProbabilisticSum => "probabilistic_sum",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "max" | "maximum" => Some(SNorm::Max),
            "sum" | "bounded_sum" | "bounded-sum" => Some(SNorm::BoundedSum),
            "probabilistic_sum" | "probabilistic-sum" | "probor" => Some(SNorm::ProbabilisticSum),
            _ => None,
        }
    }
}

/// Implication operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Implication {
    /// Mamdani: min (clipping)
    #[default]
    Min,
    /// Larsen: product (scaling)
    Product,
}

impl Implication {
    pub fn apply(&self, strength: f64, degree: f64) -> f64 {
        match self {
            Implication::Min => strength.min(degree),
            Implication::Product => strength * degree,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Implication::Min => "min",
            Implication::Product => "product",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "min" | "mamdani" => Some(Implication::Min),
            "product" | "larsen" => Some(Implication::Product),
            _ => None,
        }
    }
}

/// Connector between two consecutive antecedents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalOperator {
    And,
    Or,
}

impl LogicalOperator {
    /// Case-insensitive keyword parse
    pub fn from_keyword(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("AND") {
            Some(LogicalOperator::And)
        } else if s.eq_ignore_ascii_case("OR") {
            Some(LogicalOperator::Or)
        } else {
            None
        }
    }

    /// Combine two degrees with the t-norm (AND) or s-norm (OR)
    pub fn combine(&self, t_norm: TNorm, s_norm: SNorm, a: f64, b: f64) -> f64 {
        match self {
            LogicalOperator::And => t_norm.apply(a, b),
            LogicalOperator::Or => s_norm.apply(a, b),
        }
    }
}

impl fmt::Display for LogicalOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalOperator::And => write!(f, "AND"),
            LogicalOperator::Or => write!(f, "OR"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_t_norms() {
        assert!((TNorm::Min.apply(0.6, 0.4) - 0.4).abs() < 0.001);
        assert!((TNorm::Product.apply(0.6, 0.4) - 0.24).abs() < 0.001);
        assert!((TNorm::Lukasiewicz.apply(0.6, 0.4) - 0.0).abs() < 0.001);
        assert!((TNorm::Lukasiewicz.apply(0.9, 0.8) - 0.7).abs() < 0.001);
    }

    #[test]
    fn test_s_norms() {
        assert!((SNorm::Max.apply(0.6, 0.4) - 0.6).abs() < 0.001);
        assert!((SNorm::BoundedSum.apply(0.6, 0.4) - 1.0).abs() < 0.001);
        assert!((SNorm::BoundedSum.apply(0.7, 0.6) - 1.0).abs() < 0.001);
        assert!((SNorm::BoundedSum.apply(0.2, 0.3) - 0.5).abs() < 0.001);
        assert!((SNorm::ProbabilisticSum.apply(0.6, 0.4) - 0.76).abs() < 0.001);
    }

    #[test]
    fn test_implications() {
        assert!((Implication::Min.apply(0.3, 1.0) - 0.3).abs() < 0.001);
        assert!((Implication::Product.apply(0.3, 0.5) - 0.15).abs() < 0.001);
    }

    #[test]
    fn test_commutativity() {
        let pairs = [(0.1, 0.9), (0.5, 0.5), (0.0, 1.0), (0.33, 0.71)];
        for (a, b) in pairs {
            for t in [TNorm::Min, TNorm::Product, TNorm::Lukasiewicz] {
                assert!((t.apply(a, b) - t.apply(b, a)).abs() < 1e-12);
            }
            for s in [SNorm::Max, SNorm::BoundedSum, SNorm::ProbabilisticSum] {
                assert!((s.apply(a, b) - s.apply(b, a)).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_from_str() {
        assert_eq!(TNorm::from_str("MIN"), Some(TNorm::Min));
        assert_eq!(SNorm::from_str("sum"), Some(SNorm::BoundedSum));
        assert_eq!(Implication::from_str("larsen"), Some(Implication::Product));
        assert_eq!(SNorm::from_str("xor"), None);
        assert_eq!(LogicalOperator::from_keyword("or"), Some(LogicalOperator::Or));
        assert_eq!(LogicalOperator::from_keyword("XOR"), None);
    }

    #[test]
    fn test_logical_combine() {
        let and = LogicalOperator::And.combine(TNorm::Min, SNorm::Max, 0.5, 0.25);
        let or = LogicalOperator::Or.combine(TNorm::Min, SNorm::Max, 0.5, 0.25);
        assert!((and - 0.25).abs() < 1e-12);
        assert!((or - 0.5).abs() < 1e-12);
    }
}
