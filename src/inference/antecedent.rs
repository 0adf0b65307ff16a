//! Rule condition evaluation shared by both inference engines

use crate::error::{ErrorCode, FuzzyError, FuzzyResult};
use crate::fuzzification::FuzzifiedInputs;
use crate::operators::{SNorm, TNorm};
use crate::rules::{Antecedent, Rule};

/// Degree to which a single antecedent holds
///
/// The label must exist on the variable's model (hard error otherwise). A variable
/// or set missing from `inputs` counts as 0.0.
pub fn antecedent_degree(antecedent: &Antecedent, inputs: &FuzzifiedInputs) -> FuzzyResult<f64> {
    let variable = antecedent.variable();
    let set = variable.get_fuzzy_set_by_name(antecedent.label()).ok_or_else(|| {
        FuzzyError::evaluation(
            ErrorCode::UnknownSetAtEvaluation,
            format!(
                "Antecedent '{}' references a set that variable '{}' does not define",
                antecedent,
                variable.name()
            ),
        )
    })?;
    Ok(inputs.degree(variable.name(), set.label()))
}

/// Combine the antecedents strictly left to right; weight is not applied
///
/// A rule without antecedents never fires and yields 0.0.
pub fn evaluate_antecedents(rule: &Rule, inputs: &FuzzifiedInputs, and: TNorm, or: SNorm) -> FuzzyResult<f64> {
    let antecedents = rule.antecedents();
    let Some((first, rest)) = antecedents.split_first() else {
        return Ok(0.0);
    };

    if rule.operators().len() != rest.len() {
        return Err(FuzzyError::evaluation(
            ErrorCode::EvaluationError,
            format!(
                "Rule has {} antecedents but {} connectors",
                antecedents.len(),
                rule.operators().len()
            ),
        )
        .with_context("rule", rule.to_string()));
    }

    let mut strength = antecedent_degree(first, inputs)?;
    for (op, antecedent) in rule.operators().iter().zip(rest) {
        let degree = antecedent_degree(antecedent, inputs)?;
        strength = op.combine(and, or, strength, degree);
    }
    Ok(strength)
}

/// Condition strength scaled by the rule weight
pub fn firing_strength(rule: &Rule, inputs: &FuzzifiedInputs, and: TNorm, or: SNorm) -> FuzzyResult<f64> {
    Ok(evaluate_antecedents(rule, inputs, and, or)? * rule.weight())
}

/// Only strictly positive strengths contribute; NaN never does
pub(crate) fn fires(strength: f64) -> bool {
    strength > 0.0
}
