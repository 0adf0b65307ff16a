use indexmap::IndexMap;

use super::{aggregated_membership, check_samples, Defuzzifier, DEFAULT_SAMPLES, EPSILON};
use crate::error::FuzzyResult;
use crate::variable::{FuzzySet, LinguisticVariable};

/// Centre of gravity over `samples` evenly spaced domain points
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CentroidDefuzzifier {
    samples: usize,
}

impl CentroidDefuzzifier {
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

impl Default for CentroidDefuzzifier {
    fn default() -> Self {
        Self {
            samples: DEFAULT_SAMPLES,
        }
    }
}

impl Defuzzifier for CentroidDefuzzifier {
    fn name(&self) -> &'static str {
        "centroid"
    }

    fn defuzzify(&self, variable: &LinguisticVariable, activations: &IndexMap<FuzzySet, f64>) -> f64 {
        let mut numerator = 0.0;
        let mut denominator = 0.0;
        for x in variable.sample_points(self.samples) {
            let mu = aggregated_membership(activations, x);
            numerator += x * mu;
            denominator += mu;
        }

        if denominator.abs() < EPSILON {
            variable.midpoint()
        } else {
            numerator / denominator
        }
    }
}
