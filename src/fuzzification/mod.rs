//! Fuzzification: crisp value → membership degree per fuzzy set

use std::sync::Arc;

use indexmap::IndexMap;

use crate::diagnostics::{default_sink, Diagnostic, DiagnosticKind, Diagnostics};
use crate::variable::LinguisticVariable;

/// Membership degrees of one crisp value, one entry per set of the variable
///
/// Immutable once produced; labels keep the variable's set order.
#[derive(Debug, Clone, PartialEq)]
pub struct Fuzzified {
    variable: String,
    value: f64,
    degrees: IndexMap<String, f64>,
}

impl Fuzzified {
    pub fn variable(&self) -> &str {
        &self.variable
    }

    /// The crisp value that was fuzzified
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Degree for a set label (case-insensitive); `None` when absent
    pub fn degree(&self, label: &str) -> Option<f64> {
        self.degrees
            .get(label)
            .copied()
            .or_else(|| {
                self.degrees
                    .iter()
                    .find(|(l, _)| l.eq_ignore_ascii_case(label))
                    .map(|(_, d)| *d)
            })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.degrees.iter().map(|(l, d)| (l.as_str(), *d))
    }

    pub fn len(&self) -> usize {
        self.degrees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.degrees.is_empty()
    }

    /// Sum of all degrees
    pub fn total(&self) -> f64 {
        self.degrees.values().sum()
    }

    /// Label with the highest degree
    pub fn dominant(&self) -> Option<(&str, f64)> {
        self.iter()
            .fold(None, |best: Option<(&str, f64)>, (l, d)| match best {
                Some((_, bd)) if bd >= d => best,
                _ => Some((l, d)),
            })
    }
}

/// Fuzzified values for every input variable of one evaluation, keyed case-insensitively
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FuzzifiedInputs {
    inputs: IndexMap<String, Fuzzified>,
}

impl FuzzifiedInputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, fuzzified: Fuzzified) {
        self.inputs.insert(fuzzified.variable.to_lowercase(), fuzzified);
    }

    pub fn get(&self, variable: &str) -> Option<&Fuzzified> {
        self.inputs.get(&variable.to_lowercase())
    }

    /// Degree of `label` on `variable`; 0.0 when the variable or set was never fuzzified
    pub fn degree(&self, variable: &str, label: &str) -> f64 {
        self.get(variable).and_then(|f| f.degree(label)).unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Fuzzified> {
        self.inputs.values()
    }

    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }
}

impl FromIterator<Fuzzified> for FuzzifiedInputs {
    fn from_iter<I: IntoIterator<Item = Fuzzified>>(iter: I) -> Self {
        let mut inputs = Self::new();
        for f in iter {
            inputs.insert(f);
        }
        inputs
    }
}

/// Maps a crisp value onto the fuzzy sets of a variable
pub trait Fuzzifier: Send + Sync + std::fmt::Debug {
    fn fuzzify(&self, value: f64, variable: &LinguisticVariable) -> Fuzzified;
}

/// Evaluates every set's membership function at the crisp value
#[derive(Debug, Clone)]
pub struct BasicFuzzifier {
    diagnostics: Arc<dyn Diagnostics>,
}

impl Default for BasicFuzzifier {
    fn default() -> Self {
        Self::new()
    }
}

impl BasicFuzzifier {
    pub fn new() -> Self {
        Self {
            diagnostics: default_sink(),
        }
    }

    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn Diagnostics>) -> Self {
        self.diagnostics = diagnostics;
        self
    }
}

impl Fuzzifier for BasicFuzzifier {
    fn fuzzify(&self, value: f64, variable: &LinguisticVariable) -> Fuzzified {
        let degrees: IndexMap<String, f64> = variable
            .sets()
            .iter()
            .map(|set| (set.label().to_string(), set.membership(value)))
            .collect();

        if degrees.is_empty() {
            self.diagnostics.report(Diagnostic {
                kind: DiagnosticKind::EmptyFuzzification,
                message: format!(
                    "Variable '{}' has no fuzzy sets; fuzzification of {} is empty",
                    variable.name(),
                    value
                ),
            });
        }

        Fuzzified {
            variable: variable.name().to_string(),
            value,
            degrees,
        }
    }
}
