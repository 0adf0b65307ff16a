use indexmap::IndexMap;

use super::Defuzzifier;
use crate::variable::{FuzzySet, LinguisticVariable};

/// Value used when the label has no table entry, and when nothing fired
pub const FALLBACK_VALUE: f64 = 50.0;

/// Weighted average over fixed crisp representatives of each set label
///
/// Ignores the variable's domain: labels map through a closed table and the
/// no-activation fallback is always 50.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SugenoWeightedAverage;

impl SugenoWeightedAverage {
    pub fn new() -> Self {
        Self
    }

    /// Crisp representative of a set label
    pub fn representative(label: &str) -> f64 {
        match label.to_lowercase().as_str() {
            "low" => 15.0,
            "medium" => 45.0,
            "high" => 70.0,
            "extreme" => 95.0,
            _ => FALLBACK_VALUE,
        }
    }
}

impl Defuzzifier for SugenoWeightedAverage {
    fn name(&self) -> &'static str {
        "weighted_average"
    }

    fn defuzzify(&self, _variable: &LinguisticVariable, activations: &IndexMap<FuzzySet, f64>) -> f64 {
        let (sum_wz, sum_w) = activations.iter().fold((0.0, 0.0), |(wz, w), (set, strength)| {
            (wz + strength * Self::representative(set.label()), w + strength)
        });

        if sum_w == 0.0 {
            FALLBACK_VALUE
        } else {
            sum_wz / sum_w
        }
    }
}
