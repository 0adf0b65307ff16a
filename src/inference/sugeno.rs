//! Zero-order Sugeno inference: firing-strength weighted average of crisp consequents

use std::sync::Arc;

use indexmap::IndexMap;

use super::antecedent::{fires, firing_strength};
use super::{InferenceEngine, InferenceOutput};
use crate::error::{ErrorCode, FuzzyError, FuzzyResult};
use crate::fuzzification::FuzzifiedInputs;
use crate::operators::{SNorm, TNorm};
use crate::rules::{Consequent, Rule, RuleBase};
use crate::variable::LinguisticVariable;

/// Crisp result for one output variable
#[derive(Debug, Clone)]
pub struct CrispOutput {
    variable: Arc<LinguisticVariable>,
    weighted_sum: f64,
    total_weight: f64,
}

impl CrispOutput {
    pub fn variable(&self) -> &Arc<LinguisticVariable> {
        &self.variable
    }

    /// Weighted average, or the domain midpoint when nothing fired
    pub fn value(&self) -> f64 {
        if self.total_weight > 0.0 {
            self.weighted_sum / self.total_weight
        } else {
            self.variable.midpoint()
        }
    }

    pub fn total_weight(&self) -> f64 {
        self.total_weight
    }

    /// True when at least one rule contributed
    pub fn fired(&self) -> bool {
        self.total_weight > 0.0
    }
}

/// Output of a Sugeno pass, one entry per output variable named by an enabled rule
#[derive(Debug, Clone, Default)]
pub struct SugenoOutput {
    variables: IndexMap<String, CrispOutput>,
}

impl SugenoOutput {
    /// Crisp value of an output variable (case-insensitive)
    pub fn get(&self, variable: &str) -> FuzzyResult<f64> {
        self.output(variable).map(CrispOutput::value).ok_or_else(|| {
            FuzzyError::evaluation(
                ErrorCode::UnknownVariable,
                format!("No Sugeno output for variable '{}'", variable),
            )
        })
    }

    pub fn output(&self, variable: &str) -> Option<&CrispOutput> {
        self.variables.get(&variable.to_lowercase())
    }

    pub fn iter(&self) -> impl Iterator<Item = &CrispOutput> {
        self.variables.values()
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    fn entry(&mut self, variable: &Arc<LinguisticVariable>) -> &mut CrispOutput {
        self.variables
            .entry(variable.name().to_lowercase())
            .or_insert_with(|| CrispOutput {
                variable: Arc::clone(variable),
                weighted_sum: 0.0,
                total_weight: 0.0,
            })
    }
}

/// Sugeno inference engine
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SugenoInference {
    and: TNorm,
    or: SNorm,
}

impl SugenoInference {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_and(mut self, and: TNorm) -> Self {
        self.and = and;
        self
    }

    pub fn with_or(mut self, or: SNorm) -> Self {
        self.or = or;
        self
    }

    pub fn and(&self) -> TNorm {
        self.and
    }

    pub fn or(&self) -> SNorm {
        self.or
    }

    /// Firing strength of a single rule (weight applied)
    pub fn rule_activation(&self, rule: &Rule, inputs: &FuzzifiedInputs) -> FuzzyResult<f64> {
        firing_strength(rule, inputs, self.and, self.or)
    }

    pub fn infer_crisp(&self, rule_base: &RuleBase, inputs: &FuzzifiedInputs) -> FuzzyResult<SugenoOutput> {
        let mut output = SugenoOutput::default();

        for (index, rule) in rule_base.rules().iter().enumerate() {
            if !rule.is_enabled() {
                continue;
            }

            for consequent in rule.consequents() {
                if consequent.is_mamdani() {
                    return Err(FuzzyError::consequent_mismatch(self.name(), &consequent.to_string())
                        .with_context("rule", rule.to_string()));
                }
                output.entry(consequent.variable());
            }

            let strength = self.rule_activation(rule, inputs)?;
            tracing::debug!(rule = index, strength, "sugeno rule evaluated");
            if !fires(strength) {
                continue;
            }

            for consequent in rule.consequents() {
                if let Consequent::Sugeno { variable, value } = consequent {
                    let crisp = output.entry(variable);
                    crisp.weighted_sum += strength * value;
                    crisp.total_weight += strength;
                }
            }
        }

        Ok(output)
    }
}

impl InferenceEngine for SugenoInference {
    fn name(&self) -> &'static str {
        "Sugeno"
    }

    fn infer(&self, rule_base: &RuleBase, inputs: &FuzzifiedInputs) -> FuzzyResult<InferenceOutput> {
        self.infer_crisp(rule_base, inputs).map(InferenceOutput::Crisp)
    }

    fn rule_activation(&self, rule: &Rule, inputs: &FuzzifiedInputs) -> FuzzyResult<f64> {
        SugenoInference::rule_activation(self, rule, inputs)
    }
}
