//! Name → variable registry used by the rule parser and the engine

use std::sync::Arc;

use indexmap::IndexMap;

use super::LinguisticVariable;
use crate::error::{FuzzyError, FuzzyResult};

/// Known linguistic variables, keyed by lower-cased name, in registration order
#[derive(Debug, Clone, Default)]
pub struct VariableRegistry {
    variables: IndexMap<String, Arc<LinguisticVariable>>,
}

impl VariableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a variable, replacing any previous variable with the same name
    pub fn register(&mut self, variable: LinguisticVariable) -> Arc<LinguisticVariable> {
        let shared = Arc::new(variable);
        self.insert(Arc::clone(&shared));
        shared
    }

    /// Register an already shared variable
    pub fn insert(&mut self, variable: Arc<LinguisticVariable>) {
        self.variables.insert(variable.name().to_lowercase(), variable);
    }

    /// Case-insensitive lookup
    pub fn get(&self, name: &str) -> Option<&Arc<LinguisticVariable>> {
        self.variables.get(&name.to_lowercase())
    }

    /// Case-insensitive lookup that fails with `UnknownVariable`
    pub fn resolve(&self, name: &str) -> FuzzyResult<Arc<LinguisticVariable>> {
        self.get(name)
            .cloned()
            .ok_or_else(|| FuzzyError::unknown_variable(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<LinguisticVariable>> {
        self.variables.values()
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}

impl FromIterator<LinguisticVariable> for VariableRegistry {
    fn from_iter<I: IntoIterator<Item = LinguisticVariable>>(iter: I) -> Self {
        let mut registry = Self::new();
        for var in iter {
            registry.register(var);
        }
        registry
    }
}

impl FromIterator<Arc<LinguisticVariable>> for VariableRegistry {
    fn from_iter<I: IntoIterator<Item = Arc<LinguisticVariable>>>(iter: I) -> Self {
        let mut registry = Self::new();
        for var in iter {
            registry.insert(var);
        }
        registry
    }
}
