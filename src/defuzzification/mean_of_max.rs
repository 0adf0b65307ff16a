use indexmap::IndexMap;

use super::{aggregated_membership, check_samples, Defuzzifier, DEFAULT_SAMPLES, EPSILON};
use crate::error::FuzzyResult;
use crate::variable::{FuzzySet, LinguisticVariable};

/// Mean of the sample points where the aggregated membership peaks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeanOfMaxDefuzzifier {
    samples: usize,
}

impl MeanOfMaxDefuzzifier {
    /// Fails when `samples < 3`
    pub fn new(samples: usize) -> FuzzyResult<Self> {
        Ok(Self {
            samples: check_samples(samples)?,
        })
    }

    pub fn samples(&self) -> usize {
        self.samples
    }
}

impl Default for MeanOfMaxDefuzzifier {
    fn default() -> Self {
        Self {
            samples: DEFAULT_SAMPLES,
        }
    }
}

impl Defuzzifier for MeanOfMaxDefuzzifier {
    fn name(&self) -> &'static str {
        "mean_of_max"
    }

    fn defuzzify(&self, variable: &LinguisticVariable, activations: &IndexMap<FuzzySet, f64>) -> f64 {
        let peak = variable
            .sample_points(self.samples)
            .map(|x| aggregated_membership(activations, x))
            .fold(0.0, f64::max);

        if peak < EPSILON {
            return variable.midpoint();
        }

        let (sum, count) = variable
            .sample_points(self.samples)
            .filter(|&x| (aggregated_membership(activations, x) - peak).abs() < EPSILON)
            .fold((0.0, 0usize), |(sum, count), x| (sum + x, count + 1));

        if count == 0 {
            variable.midpoint()
        } else {
            sum / count as f64
        }
    }
}
