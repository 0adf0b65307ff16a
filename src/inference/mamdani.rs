//! Mamdani inference: rule strengths aggregated per output fuzzy set

use std::sync::Arc;

use indexmap::IndexMap;

use super::antecedent::{fires, firing_strength};
use super::{InferenceEngine, InferenceOutput};
use crate::error::{FuzzyError, FuzzyResult};
use crate::fuzzification::FuzzifiedInputs;
use crate::operators::{Implication, SNorm, TNorm};
use crate::rules::{Consequent, Rule, RuleBase};
use crate::variable::{FuzzySet, LinguisticVariable};

/// Aggregated activations for one output variable
#[derive(Debug, Clone)]
pub struct AggregatedVariable {
    variable: Arc<LinguisticVariable>,
    activations: IndexMap<FuzzySet, f64>,
}

impl AggregatedVariable {
    fn new(variable: Arc<LinguisticVariable>) -> Self {
        Self {
            variable,
            activations: IndexMap::new(),
        }
    }

    pub fn variable(&self) -> &Arc<LinguisticVariable> {
        &self.variable
    }

    pub fn activations(&self) -> &IndexMap<FuzzySet, f64> {
        &self.activations
    }

    /// Activation of a set by label (case-insensitive), 0.0 when it never fired
    pub fn activation(&self, label: &str) -> f64 {
        self.activations
            .iter()
            .find(|(set, _)| set.matches(label))
            .map(|(_, a)| *a)
            .unwrap_or(0.0)
    }

    /// True when no rule contributed to this variable
    pub fn is_empty(&self) -> bool {
        self.activations.is_empty()
    }
}

/// Output of a Mamdani pass, one entry per output variable named by an enabled rule
#[derive(Debug, Clone, Default)]
pub struct MamdaniOutput {
    variables: IndexMap<String, AggregatedVariable>,
}

impl MamdaniOutput {
    pub fn get(&self, variable: &str) -> Option<&AggregatedVariable> {
        self.variables.get(&variable.to_lowercase())
    }

    pub fn iter(&self) -> impl Iterator<Item = &AggregatedVariable> {
        self.variables.values()
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    fn entry(&mut self, variable: &Arc<LinguisticVariable>) -> &mut AggregatedVariable {
        self.variables
            .entry(variable.name().to_lowercase())
            .or_insert_with(|| AggregatedVariable::new(Arc::clone(variable)))
    }
}

/// Mamdani inference engine
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MamdaniInference {
    and: TNorm,
    or: SNorm,
    implication: Implication,
    aggregation: SNorm,
}

impl MamdaniInference {
    /// min / max / min-implication / max-aggregation
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

    pub fn with_implication(mut self, implication: Implication) -> Self {
        self.implication = implication;
        self
    }

    pub fn with_aggregation(mut self, aggregation: SNorm) -> Self {
        self.aggregation = aggregation;
        self
    }

    pub fn and(&self) -> TNorm {
        self.and
    }

    pub fn or(&self) -> SNorm {
        self.or
    }

    pub fn implication(&self) -> Implication {
        self.implication
    }

    pub fn aggregation(&self) -> SNorm {
        self.aggregation
    }

    /// Firing strength of a single rule (weight applied)
    pub fn rule_activation(&self, rule: &Rule, inputs: &FuzzifiedInputs) -> FuzzyResult<f64> {
        firing_strength(rule, inputs, self.and, self.or)
    }

    /// Evaluate every enabled rule and aggregate activations per output set
    pub fn infer_fuzzy(&self, rule_base: &RuleBase, inputs: &FuzzifiedInputs) -> FuzzyResult<MamdaniOutput> {
        let mut output = MamdaniOutput::default();

        for (index, rule) in rule_base.rules().iter().enumerate() {
            if !rule.is_enabled() {
                continue;
            }

            for consequent in rule.consequents() {
                if consequent.is_sugeno() {
                    return Err(FuzzyError::consequent_mismatch(self.name(), &consequent.to_string())
                        .with_context("rule", rule.to_string()));
                }
                output.entry(consequent.variable());
            }

            let strength = self.rule_activation(rule, inputs)?;
            tracing::debug!(rule = index, strength, "mamdani rule evaluated");
            if !fires(strength) {
                continue;
            }

            let implied = self.implication.apply(strength, 1.0);
            for consequent in rule.consequents() {
                if let Consequent::Mamdani { variable, set } = consequent {
                    let aggregated = output.entry(variable);
                    let current = aggregated.activations.get(set).copied().unwrap_or(0.0);
                    aggregated
                        .activations
                        .insert(set.clone(), self.aggregation.apply(current, implied));
                }
            }
        }

        Ok(output)
    }
}

impl InferenceEngine for MamdaniInference {
    fn name(&self) -> &'static str {
        "Mamdani"
    }

    fn infer(&self, rule_base: &RuleBase, inputs: &FuzzifiedInputs) -> FuzzyResult<InferenceOutput> {
        self.infer_fuzzy(rule_base, inputs).map(InferenceOutput::Fuzzy)
    }

    fn rule_activation(&self, rule: &Rule, inputs: &FuzzifiedInputs) -> FuzzyResult<f64> {
        MamdaniInference::rule_activation(self, rule, inputs)
    }
}
