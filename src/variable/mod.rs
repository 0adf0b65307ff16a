//! Fuzzy sets and linguistic variables
//!
//! A [`LinguisticVariable`] owns its [`FuzzySet`]s outright: sets handed to it are
//! moved or cloned in, and only shared references ever leave. Once variables are
//! registered in a [`VariableRegistry`] they are shared read-only through `Arc`.

mod registry;

pub use registry::VariableRegistry;

use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::{ErrorCode, FuzzyError, FuzzyResult};
use crate::membership::MembershipFunction;

/// A named fuzzy set
///
/// Equality and hashing use the label only: two sets with the same label compare
/// equal even when their membership functions differ.
#[derive(Debug, Clone)]
pub struct FuzzySet {
    label: String,
    membership: MembershipFunction,
}

impl FuzzySet {
    pub fn new(label: impl Into<String>, membership: MembershipFunction) -> Self {
        Self {
            label: label.into(),
            membership,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn membership_function(&self) -> &MembershipFunction {
        &self.membership
    }

    /// Membership degree of a crisp value
    pub fn membership(&self, x: f64) -> f64 {
        self.membership.compute(x)
    }

    /// Case-insensitive label match
    pub fn matches(&self, label: &str) -> bool {
        self.label.eq_ignore_ascii_case(label)
    }
}

impl PartialEq for FuzzySet {
    fn eq(&self, other: &Self) -> bool {
        self.label == other.label
    }
}

impl Eq for FuzzySet {}

impl Hash for FuzzySet {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.label.hash(state);
    }
}

impl fmt::Display for FuzzySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FuzzySet{{label='{}', mf={}}}", self.label, self.membership)
    }
}

/// A named variable over a closed domain `[start, end]`
#[derive(Debug, Clone)]
pub struct LinguisticVariable {
    name: String,
    start: f64,
    end: f64,
    sets: Vec<FuzzySet>,
}

impl LinguisticVariable {
    /// Create a variable, taking its own copy of every set
    pub fn new(
        name: impl Into<String>,
        start: f64,
        end: f64,
        sets: impl IntoIterator<Item = FuzzySet>,
    ) -> FuzzyResult<Self> {
        let name = name.into();
        if !(start.is_finite() && end.is_finite() && start <= end) {
            return Err(FuzzyError::new(
                ErrorCode::InvalidDomain,
                format!("Variable '{}' has invalid domain [{}, {}]", name, start, end),
            ));
        }

        let mut var = Self {
            name,
            start,
            end,
            sets: Vec::new(),
        };
        var.set_sets(sets)?;
        Ok(var)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn domain_start(&self) -> f64 {
        self.start
    }

    pub fn domain_end(&self) -> f64 {
        self.end
    }

    pub fn domain(&self) -> (f64, f64) {
        (self.start, self.end)
    }

    /// Domain midpoint, the fallback crisp value when nothing fired
    pub fn midpoint(&self) -> f64 {
        (self.start + self.end) / 2.0
    }

    pub fn sets(&self) -> &[FuzzySet] {
        &self.sets
    }

    /// Replace every set
    pub fn set_sets(&mut self, sets: impl IntoIterator<Item = FuzzySet>) -> FuzzyResult<()> {
        let mut owned: Vec<FuzzySet> = Vec::new();
        for set in sets {
            if owned.iter().any(|s| s.matches(set.label())) {
                return Err(duplicate_set(&self.name, set.label()));
            }
            owned.push(set);
        }
        self.sets = owned;
        Ok(())
    }

    /// Append a set; labels must stay unique (case-insensitive)
    pub fn add_fuzzy_set(&mut self, set: FuzzySet) -> FuzzyResult<()> {
        if self.get_fuzzy_set_by_name(set.label()).is_some() {
            return Err(duplicate_set(&self.name, set.label()));
        }
        self.sets.push(set);
        Ok(())
    }

    /// Case-insensitive set lookup; `None` when no set matches
    pub fn get_fuzzy_set_by_name(&self, label: &str) -> Option<&FuzzySet> {
        self.sets.iter().find(|s| s.matches(label))
    }

    /// `count` evenly spaced points covering the domain, endpoints included
    pub fn sample_points(&self, count: usize) -> impl Iterator<Item = f64> + '_ {
        let step = if count > 1 {
            (self.end - self.start) / (count - 1) as f64
        } else {
            0.0
        };
        (0..count).map(move |i| self.start + i as f64 * step)
    }
}

impl fmt::Display for LinguisticVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let labels: Vec<&str> = self.sets.iter().map(|s| s.label()).collect();
        write!(
            f,
            "LinguisticVariable{{name='{}', domain=[{}, {}], sets=[{}]}}",
            self.name,
            self.start,
            self.end,
            labels.join(", ")
        )
    }
}

fn duplicate_set(variable: &str, label: &str) -> FuzzyError {
    FuzzyError::new(
        ErrorCode::DuplicateSet,
        format!("Variable '{}' already has a fuzzy set named '{}'", variable, label),
    )
}
