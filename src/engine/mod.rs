//! Engine assembly and evaluation
//!
//! [`EngineConfig`] collects the parts, [`EngineConfig::build`] validates them in
//! one place, and [`FuzzyEngine::evaluate`] runs
//! fuzzify → infer → (defuzzify) for a set of named crisp inputs.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::defuzzification::Defuzzifier;
use crate::diagnostics::{default_sink, Diagnostic, DiagnosticKind, Diagnostics};
use crate::error::{ErrorCode, FuzzyError, FuzzyResult};
use crate::fuzzification::{BasicFuzzifier, Fuzzifier, FuzzifiedInputs};
use crate::inference::{InferenceEngine, InferenceOutput, MamdaniInference, SugenoInference};
use crate::rules::RuleBase;
use crate::variable::{LinguisticVariable, VariableRegistry};

/// Inference semantics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineMode {
    #[default]
    Mamdani,
    Sugeno,
}

impl EngineMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            EngineMode::Mamdani => "mamdani",
            EngineMode::Sugeno => "sugeno",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "mamdani" => Some(EngineMode::Mamdani),
            "sugeno" | "tsk" => Some(EngineMode::Sugeno),
            _ => None,
        }
    }
}

impl fmt::Display for EngineMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parts of an engine, validated by [`EngineConfig::build`]
#[derive(Debug, Default)]
pub struct EngineConfig {
    mode: Option<EngineMode>,
    rule_base: Option<RuleBase>,
    variables: Option<VariableRegistry>,
    mamdani_inference: Option<MamdaniInference>,
    sugeno_inference: Option<SugenoInference>,
    defuzzifier: Option<Box<dyn Defuzzifier>>,
    fuzzifier: Option<Box<dyn Fuzzifier>>,
    diagnostics: Option<Arc<dyn Diagnostics>>,
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(mut self, mode: EngineMode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn rule_base(mut self, rule_base: RuleBase) -> Self {
        self.rule_base = Some(rule_base);
        self
    }

    /// Variables that inputs may name; without it inputs resolve against rule antecedents
    pub fn variables(mut self, variables: VariableRegistry) -> Self {
        self.variables = Some(variables);
        self
    }

    pub fn mamdani_inference(mut self, inference: MamdaniInference) -> Self {
        self.mamdani_inference = Some(inference);
        self
    }

    pub fn sugeno_inference(mut self, inference: SugenoInference) -> Self {
        self.sugeno_inference = Some(inference);
        self
    }

    pub fn defuzzifier(mut self, defuzzifier: impl Defuzzifier + 'static) -> Self {
        self.defuzzifier = Some(Box::new(defuzzifier));
        self
    }

    pub fn fuzzifier(mut self, fuzzifier: impl Fuzzifier + 'static) -> Self {
        self.fuzzifier = Some(Box::new(fuzzifier));
        self
    }

    pub fn diagnostics(mut self, diagnostics: Arc<dyn Diagnostics>) -> Self {
        self.diagnostics = Some(diagnostics);
        self
    }

    /// Validate and assemble; every missing field is listed in a single error
    pub fn build(self) -> FuzzyResult<FuzzyEngine> {
        let mut missing = Vec::new();
        if self.mode.is_none() {
            missing.push("mode");
        }
        if self.rule_base.is_none() {
            missing.push("rule_base");
        }
        match self.mode {
            Some(EngineMode::Mamdani) => {
                if self.mamdani_inference.is_none() {
                    missing.push("mamdani_inference");
                }
                if self.defuzzifier.is_none() {
                    missing.push("defuzzifier");
                }
            }
            Some(EngineMode::Sugeno) => {
                if self.sugeno_inference.is_none() {
                    missing.push("sugeno_inference");
                }
            }
            None => {}
        }

        let pipeline = match (self.mode, self.mamdani_inference, self.sugeno_inference, self.defuzzifier) {
            (Some(EngineMode::Mamdani), Some(inference), _, Some(defuzzifier)) if missing.is_empty() => {
                Pipeline::Mamdani { inference, defuzzifier }
            }
            (Some(EngineMode::Sugeno), _, Some(inference), _) if missing.is_empty() => {
                Pipeline::Sugeno { inference }
            }
            _ => return Err(FuzzyError::missing_fields(&missing)),
        };
        let rule_base = self.rule_base.ok_or_else(|| FuzzyError::missing_fields(&["rule_base"]))?;

        let diagnostics = self.diagnostics.unwrap_or_else(default_sink);
        let fuzzifier: Box<dyn Fuzzifier> = match self.fuzzifier {
            Some(fuzzifier) => fuzzifier,
            None => Box::new(BasicFuzzifier::new().with_diagnostics(Arc::clone(&diagnostics))),
        };
        let variables = self
            .variables
            .or_else(|| rule_base.parser().map(|p| p.registry().clone()))
            .unwrap_or_default();

        tracing::debug!(
            mode = pipeline.mode().as_str(),
            rules = rule_base.len(),
            variables = variables.len(),
            "fuzzy engine built"
        );

        Ok(FuzzyEngine {
            pipeline,
            rule_base,
            variables,
            fuzzifier,
            diagnostics,
        })
    }
}

#[derive(Debug)]
enum Pipeline {
    Mamdani {
        inference: MamdaniInference,
        defuzzifier: Box<dyn Defuzzifier>,
    },
    Sugeno {
        inference: SugenoInference,
    },
}

impl Pipeline {
    fn mode(&self) -> EngineMode {
        match self {
            Pipeline::Mamdani { .. } => EngineMode::Mamdani,
            Pipeline::Sugeno { .. } => EngineMode::Sugeno,
        }
    }

    fn inference(&self) -> &dyn InferenceEngine {
        match self {
            Pipeline::Mamdani { inference, .. } => inference,
            Pipeline::Sugeno { inference } => inference,
        }
    }
}

/// A ready-to-run fuzzy system
#[derive(Debug)]
pub struct FuzzyEngine {
    pipeline: Pipeline,
    rule_base: RuleBase,
    variables: VariableRegistry,
    fuzzifier: Box<dyn Fuzzifier>,
    diagnostics: Arc<dyn Diagnostics>,
}

impl FuzzyEngine {
    pub fn builder() -> EngineConfig {
        EngineConfig::new()
    }

    pub fn mode(&self) -> EngineMode {
        self.pipeline.mode()
    }

    pub fn rule_base(&self) -> &RuleBase {
        &self.rule_base
    }

    /// Rules may be added or toggled between evaluations
    pub fn rule_base_mut(&mut self) -> &mut RuleBase {
        &mut self.rule_base
    }

    pub fn variables(&self) -> &VariableRegistry {
        &self.variables
    }

    pub fn inference_engine(&self) -> &dyn InferenceEngine {
        self.pipeline.inference()
    }

    pub fn defuzzifier(&self) -> Option<&dyn Defuzzifier> {
        match &self.pipeline {
            Pipeline::Mamdani { defuzzifier, .. } => Some(defuzzifier.as_ref()),
            Pipeline::Sugeno { .. } => None,
        }
    }

    /// Fuzzify named crisp inputs (names are case-insensitive)
    pub fn fuzzify<'a, I>(&self, inputs: I) -> FuzzyResult<FuzzifiedInputs>
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        let mut fuzzified = FuzzifiedInputs::new();
        for (name, value) in inputs {
            let variable = self.resolve_input(name)?;
            fuzzified.insert(self.fuzzifier.fuzzify(value, &variable));
        }
        Ok(fuzzified)
    }

    /// Inference without defuzzification
    pub fn infer<'a, I>(&self, inputs: I) -> FuzzyResult<InferenceOutput>
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        let fuzzified = self.fuzzify(inputs)?;
        self.pipeline.inference().infer(&self.rule_base, &fuzzified)
    }

    /// Crisp output per output variable, keyed by variable name
    ///
    /// Output variables no rule fired for get their domain midpoint and a
    /// `NoRuleFired` diagnostic.
    pub fn evaluate<'a, I>(&self, inputs: I) -> FuzzyResult<IndexMap<String, f64>>
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        let output = self.infer(inputs)?;

        let mut results = IndexMap::new();
        match (&self.pipeline, &output) {
            (Pipeline::Mamdani { defuzzifier, .. }, InferenceOutput::Fuzzy(fuzzy)) => {
                for aggregated in fuzzy.iter().filter(|a| a.is_empty()) {
                    self.report_no_rule_fired(aggregated.variable());
                }
                results = defuzzifier.defuzzify_all(fuzzy);
            }
            (Pipeline::Sugeno { .. }, InferenceOutput::Crisp(crisp)) => {
                for out in crisp.iter() {
                    if !out.fired() {
                        self.report_no_rule_fired(out.variable());
                    }
                    results.insert(out.variable().name().to_string(), out.value());
                }
            }
            _ => {
                return Err(FuzzyError::internal(format!(
                    "{} engine produced mismatched inference output",
                    self.mode()
                ))
                .with_code(ErrorCode::ModeMismatch))
            }
        }

        for (name, value) in &results {
            tracing::debug!(variable = %name, value, "crisp output");
        }
        Ok(results)
    }

    fn resolve_input(&self, name: &str) -> FuzzyResult<Arc<LinguisticVariable>> {
        if let Some(variable) = self.variables.get(name) {
            return Ok(Arc::clone(variable));
        }
        self.rule_base
            .rules()
            .iter()
            .flat_map(|rule| rule.antecedents())
            .map(|a| a.variable())
            .find(|v| v.name().eq_ignore_ascii_case(name))
            .cloned()
            .ok_or_else(|| {
                FuzzyError::evaluation(ErrorCode::UnknownInput, format!("Unknown input variable: {}", name))
            })
    }

    fn report_no_rule_fired(&self, variable: &LinguisticVariable) {
        self.diagnostics.report(Diagnostic {
            kind: DiagnosticKind::NoRuleFired,
            message: format!(
                "No rule fired for '{}'; using domain midpoint {}",
                variable.name(),
                variable.midpoint()
            ),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defuzzification::CentroidDefuzzifier;
    use crate::diagnostics::CollectingDiagnostics;
    use crate::rules::test_support::registry;
    use crate::rules::RuleParser;

    fn sugeno_engine(sink: Arc<dyn Diagnostics>) -> FuzzyEngine {
        let mut rules = RuleBase::with_parser(RuleParser::sugeno(registry()));
        rules
            .add_rule_from_string("IF Speed IS Fast AND Visibility IS Poor THEN AccidentRisk = 90")
            .unwrap();
        EngineConfig::new()
            .mode(EngineMode::Sugeno)
            .rule_base(rules)
            .sugeno_inference(SugenoInference::new())
            .diagnostics(sink)
            .build()
            .unwrap()
    }

    #[test]
    fn test_build_reports_all_missing_fields() {
        let err = EngineConfig::new().build().unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingBuilderField);
        assert_eq!(err.context_field("missing"), Some("mode,rule_base"));

        let err = EngineConfig::new().mode(EngineMode::Mamdani).build().unwrap_err();
        assert_eq!(
            err.context_field("missing"),
            Some("rule_base,mamdani_inference,defuzzifier")
        );

        let err = EngineConfig::new()
            .mode(EngineMode::Sugeno)
            .rule_base(RuleBase::new())
            .mamdani_inference(MamdaniInference::new())
            .build()
            .unwrap_err();
        assert_eq!(err.context_field("missing"), Some("sugeno_inference"));
    }

    #[test]
    fn test_sugeno_evaluate() {
        let engine = sugeno_engine(Arc::new(crate::diagnostics::SilentDiagnostics));
        let out = engine.evaluate([("speed", 120.0), ("Visibility", 250.0)]).unwrap();
        assert!((out["AccidentRisk"] - 90.0).abs() < 1e-9);
        assert!(engine.defuzzifier().is_none());
        assert_eq!(engine.mode(), EngineMode::Sugeno);
    }

    #[test]
    fn test_no_rule_fired_diagnostic() {
        let sink = CollectingDiagnostics::new();
        let engine = sugeno_engine(sink.clone());
        let out = engine.evaluate([("Speed", 20.0), ("Visibility", 900.0)]).unwrap();
        assert_eq!(out["AccidentRisk"], 50.0);
        assert_eq!(sink.records()[0].kind, DiagnosticKind::NoRuleFired);
    }

    #[test]
    fn test_unknown_input() {
        let engine = sugeno_engine(Arc::new(crate::diagnostics::SilentDiagnostics));
        let err = engine.evaluate([("Altitude", 3.0)]).unwrap_err();
        assert_eq!(err.code, ErrorCode::UnknownInput);
    }

    #[test]
    fn test_inputs_resolve_from_rules_without_registry() {
        let registry = registry();
        let mut rules = RuleBase::new();
        rules.add_rule(
            RuleParser::mamdani(registry)
                .parse("IF Speed IS Fast THEN AccidentRisk IS High")
                .unwrap(),
        );
        let engine = FuzzyEngine::builder()
            .mode(EngineMode::Mamdani)
            .rule_base(rules)
            .mamdani_inference(MamdaniInference::new())
            .defuzzifier(CentroidDefuzzifier::default())
            .diagnostics(Arc::new(crate::diagnostics::SilentDiagnostics))
            .build()
            .unwrap();

        assert!(engine.variables().is_empty());
        let out = engine.evaluate([("Speed", 170.0)]).unwrap();
        assert!((out["AccidentRisk"] - 70.0).abs() < 1e-2);

        let fuzzy = engine.infer([("Speed", 170.0)]).unwrap();
        let high = fuzzy.as_mamdani().unwrap().get("AccidentRisk").unwrap().activation("High");
        assert!((high - 1.0).abs() < 1e-9);

        // the right edge of a shoulder set is outside its support
        let fuzzy = engine.infer([("Speed", 200.0)]).unwrap();
        assert!(fuzzy.as_mamdani().unwrap().get("AccidentRisk").unwrap().is_empty());
        let out = engine.evaluate([("Speed", 200.0)]).unwrap();
        assert_eq!(out["AccidentRisk"], 50.0);
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!(EngineMode::from_str("SUGENO"), Some(EngineMode::Sugeno));
        assert_eq!(EngineMode::from_str("larsen"), None);
        assert_eq!(EngineMode::Mamdani.to_string(), "mamdani");
    }
}
