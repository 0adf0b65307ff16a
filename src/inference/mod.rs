//! Inference engines
//!
//! Both engines read the enabled rules of a [`RuleBase`] against fuzzified inputs.
//! Antecedent evaluation is shared; they differ in what a firing rule contributes:
//! - [`MamdaniInference`] aggregates implied activations per output fuzzy set,
//!   which a defuzzifier later turns into a crisp value
//! - [`SugenoInference`] accumulates a weighted average of crisp consequent values

mod antecedent;
mod mamdani;
mod sugeno;

pub use antecedent::{antecedent_degree, evaluate_antecedents, firing_strength};
pub use mamdani::{AggregatedVariable, MamdaniInference, MamdaniOutput};
pub use sugeno::{CrispOutput, SugenoInference, SugenoOutput};

use crate::error::{ErrorCode, FuzzyError, FuzzyResult};
use crate::fuzzification::FuzzifiedInputs;
use crate::rules::{Rule, RuleBase};

/// Result of an inference pass
#[derive(Debug, Clone)]
pub enum InferenceOutput {
    /// Mamdani: aggregated fuzzy activations, still to be defuzzified
    Fuzzy(MamdaniOutput),
    /// Sugeno: crisp values
    Crisp(SugenoOutput),
}

impl InferenceOutput {
    pub fn as_mamdani(&self) -> FuzzyResult<&MamdaniOutput> {
        match self {
            InferenceOutput::Fuzzy(out) => Ok(out),
            InferenceOutput::Crisp(_) => Err(mode_mismatch("Mamdani", "Sugeno")),
        }
    }

    pub fn as_sugeno(&self) -> FuzzyResult<&SugenoOutput> {
        match self {
            InferenceOutput::Crisp(out) => Ok(out),
            InferenceOutput::Fuzzy(_) => Err(mode_mismatch("Sugeno", "Mamdani")),
        }
    }
}

fn mode_mismatch(expected: &str, actual: &str) -> FuzzyError {
    FuzzyError::evaluation(
        ErrorCode::ModeMismatch,
        format!("Expected {} inference output, got {}", expected, actual),
    )
}

/// An inference strategy over a rule base
pub trait InferenceEngine: Send + Sync + std::fmt::Debug {
    fn name(&self) -> &'static str;

    fn infer(&self, rule_base: &RuleBase, inputs: &FuzzifiedInputs) -> FuzzyResult<InferenceOutput>;

    /// Firing strength of one rule, weight applied
    fn rule_activation(&self, rule: &Rule, inputs: &FuzzifiedInputs) -> FuzzyResult<f64>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_variant_accessors() {
        let fuzzy = InferenceOutput::Fuzzy(MamdaniOutput::default());
        assert!(fuzzy.as_mamdani().is_ok());
        assert_eq!(fuzzy.as_sugeno().unwrap_err().code, ErrorCode::ModeMismatch);

        let crisp = InferenceOutput::Crisp(SugenoOutput::default());
        assert!(crisp.as_sugeno().is_ok());
        assert_eq!(crisp.as_mamdani().unwrap_err().code, ErrorCode::ModeMismatch);
    }

    #[test]
    fn test_engine_names() {
        let engines: Vec<Box<dyn InferenceEngine>> =
            vec![Box::new(MamdaniInference::new()), Box::new(SugenoInference::new())];
        let names: Vec<&str> = engines.iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["Mamdani", "Sugeno"]);
    }
}
