//! Fuzzy rules
//!
//! A [`Rule`] reads `IF a0 op0 a1 op1 ... THEN c0, c1, ...`:
//! - antecedents are `variable IS label` clauses
//! - connectors are applied strictly left to right, no precedence
//! - consequents are either Mamdani (`variable IS label`) or Sugeno (`variable = value`)
//!
//! Rules are built by the [`RuleParser`] or programmatically, and collected in a
//! [`RuleBase`].

mod base;
mod parser;

pub use base::{LoadReport, RuleBase};
pub use parser::{Dialect, RuleParser, RuleSyntaxError};

use std::fmt;
use std::sync::Arc;

use crate::error::{FuzzyError, FuzzyResult};
use crate::operators::LogicalOperator;
use crate::variable::{FuzzySet, LinguisticVariable};

/// One `variable IS label` condition
///
/// The label is resolved against the variable only when the rule is evaluated.
#[derive(Debug, Clone)]
pub struct Antecedent {
    variable: Arc<LinguisticVariable>,
    label: String,
}

impl Antecedent {
    pub fn new(variable: Arc<LinguisticVariable>, label: impl Into<String>) -> Self {
        Self {
            variable,
            label: label.into(),
        }
    }

    pub fn variable(&self) -> &Arc<LinguisticVariable> {
        &self.variable
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl PartialEq for Antecedent {
    fn eq(&self, other: &Self) -> bool {
        self.variable.name() == other.variable.name() && self.label.eq_ignore_ascii_case(&other.label)
    }
}

impl fmt::Display for Antecedent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} IS {}", self.variable.name(), self.label)
    }
}

/// A rule conclusion
#[derive(Debug, Clone)]
pub enum Consequent {
    /// `variable IS set`
    Mamdani {
        variable: Arc<LinguisticVariable>,
        set: FuzzySet,
    },
    /// `variable = value` (zero-order Sugeno)
    Sugeno {
        variable: Arc<LinguisticVariable>,
        value: f64,
    },
}

impl Consequent {
    /// Mamdani consequent; the label must name a set of `variable`
    pub fn mamdani(variable: Arc<LinguisticVariable>, label: &str) -> FuzzyResult<Self> {
        let set = variable
            .get_fuzzy_set_by_name(label)
            .cloned()
            .ok_or_else(|| FuzzyError::unknown_set(variable.name(), label))?;
        Ok(Consequent::Mamdani { variable, set })
    }

    pub fn sugeno(variable: Arc<LinguisticVariable>, value: f64) -> Self {
        Consequent::Sugeno { variable, value }
    }

    pub fn variable(&self) -> &Arc<LinguisticVariable> {
        match self {
            Consequent::Mamdani { variable, .. } | Consequent::Sugeno { variable, .. } => variable,
        }
    }

    pub fn is_mamdani(&self) -> bool {
        matches!(self, Consequent::Mamdani { .. })
    }

    pub fn is_sugeno(&self) -> bool {
        matches!(self, Consequent::Sugeno { .. })
    }
}

impl PartialEq for Consequent {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                Consequent::Mamdani { variable: va, set: sa },
                Consequent::Mamdani { variable: vb, set: sb },
            ) => va.name() == vb.name() && sa == sb,
            (
                Consequent::Sugeno { variable: va, value: a },
                Consequent::Sugeno { variable: vb, value: b },
            ) => va.name() == vb.name() && a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Consequent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Consequent::Mamdani { variable, set } => write!(f, "{} IS {}", variable.name(), set.label()),
            Consequent::Sugeno { variable, value } => write!(f, "{} = {}", variable.name(), value),
        }
    }
}

/// A fuzzy rule
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    antecedents: Vec<Antecedent>,
    operators: Vec<LogicalOperator>,
    consequents: Vec<Consequent>,
    weight: f64,
    enabled: bool,
}

impl Default for Rule {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule {
    /// Empty, enabled rule with weight 1.0
    pub fn new() -> Self {
        Self {
            antecedents: Vec::new(),
            operators: Vec::new(),
            consequents: Vec::new(),
            weight: 1.0,
            enabled: true,
        }
    }

    pub fn add_antecedent(&mut self, antecedent: Antecedent) {
        self.antecedents.push(antecedent);
    }

    pub fn add_operator(&mut self, op: LogicalOperator) {
        self.operators.push(op);
    }

    pub fn add_consequent(&mut self, consequent: Consequent) {
        self.consequents.push(consequent);
    }

    /// Chainable form of [`Rule::add_antecedent`]; `op` joins it to the previous clause
    pub fn when(mut self, op: Option<LogicalOperator>, antecedent: Antecedent) -> Self {
        if let Some(op) = op {
            self.operators.push(op);
        }
        self.antecedents.push(antecedent);
        self
    }

    /// Chainable form of [`Rule::add_consequent`]
    pub fn then(mut self, consequent: Consequent) -> Self {
        self.consequents.push(consequent);
        self
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn antecedents(&self) -> &[Antecedent] {
        &self.antecedents
    }

    pub fn operators(&self) -> &[LogicalOperator] {
        &self.operators
    }

    pub fn consequents(&self) -> &[Consequent] {
        &self.consequents
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn set_weight(&mut self, weight: f64) {
        self.weight = weight;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IF")?;
        for (i, antecedent) in self.antecedents.iter().enumerate() {
            if i > 0 {
                match self.operators.get(i - 1) {
                    Some(op) => write!(f, " {}", op)?,
                    None => write!(f, " {}", LogicalOperator::And)?,
                }
            }
            write!(f, " {}", antecedent)?;
        }
        write!(f, " THEN")?;
        for (i, consequent) in self.consequents.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, " {}", consequent)?;
        }
        Ok(())
    }
}
