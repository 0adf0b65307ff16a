//! Defuzzification of Mamdani outputs
//!
//! The sampling defuzzifiers rebuild the output surface with a fixed
//! clip-then-union (`max` over `min(strength, μ(x))`), whatever operators the
//! inference engine was configured with.

mod centroid;
mod mean_of_max;
mod weighted_average;

pub use centroid::CentroidDefuzzifier;
pub use mean_of_max::MeanOfMaxDefuzzifier;
pub use weighted_average::SugenoWeightedAverage;

use indexmap::IndexMap;

use crate::error::{FuzzyError, FuzzyResult};
use crate::inference::MamdaniOutput;
use crate::variable::{FuzzySet, LinguisticVariable};

/// Default number of domain samples
pub const DEFAULT_SAMPLES: usize = 1001;

/// Aggregated membership below this is treated as zero
pub(crate) const EPSILON: f64 = 1e-9;

/// Turns aggregated set activations into one crisp value
pub trait Defuzzifier: Send + Sync + std::fmt::Debug {
    fn name(&self) -> &'static str;

    /// Crisp value for one output variable
    fn defuzzify(&self, variable: &LinguisticVariable, activations: &IndexMap<FuzzySet, f64>) -> f64;

    /// Crisp value for every variable of a Mamdani output, keyed by variable name
    fn defuzzify_all(&self, output: &MamdaniOutput) -> IndexMap<String, f64> {
        output
            .iter()
            .map(|agg| {
                let value = self.defuzzify(agg.variable(), agg.activations());
                (agg.variable().name().to_string(), value)
            })
            .collect()
    }
}

/// Clip-then-union membership of the output surface at `x`
pub fn aggregated_membership(activations: &IndexMap<FuzzySet, f64>, x: f64) -> f64 {
    activations
        .iter()
        .map(|(set, strength)| strength.min(set.membership(x)))
        .fold(0.0, f64::max)
}

pub(crate) fn check_samples(samples: usize) -> FuzzyResult<usize> {
    if samples < 3 {
        Err(FuzzyError::invalid_samples(samples))
    } else {
        Ok(samples)
    }
}
