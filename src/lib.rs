//! fuzzylogic - fuzzy-logic expert systems
//!
//! Evaluates a base of `IF … THEN …` rules over linguistic variables, turning
//! crisp inputs into crisp outputs under Mamdani or zero-order Sugeno semantics.
//!
//! # Architecture
//!
//! Leaves first:
//!
//! - [`membership::MembershipFunction`] - piecewise-linear triangular / trapezoidal shapes
//! - [`variable::LinguisticVariable`] - a bounded domain covered by named [`variable::FuzzySet`]s
//! - [`operators`] - T-norms, S-norms and implications
//! - [`rules`] - rule model, textual [`rules::RuleParser`] and [`rules::RuleBase`]
//! - [`fuzzification::Fuzzifier`] - crisp value → membership degree per set
//! - [`inference::InferenceEngine`] - [`inference::MamdaniInference`] and [`inference::SugenoInference`]
//! - [`defuzzification::Defuzzifier`] - centroid, mean of maximum, label weighted average
//! - [`engine::FuzzyEngine`] - the assembled fuzzify → infer → defuzzify pipeline
//!
//! # Example
//!
//! ```rust
//! use fuzzylogic::{
//!     EngineConfig, EngineMode, FuzzySet, LinguisticVariable, MembershipFunction, RuleBase,
//!     RuleParser, SugenoInference, VariableRegistry,
//! };
//!
//! # fn main() -> fuzzylogic::FuzzyResult<()> {
//! let speed = LinguisticVariable::new(
//!     "Speed",
//!     0.0,
//!     200.0,
//!     vec![
//!         FuzzySet::new("Slow", MembershipFunction::trapezoidal(0.0, 0.0, 40.0, 60.0)?),
//!         FuzzySet::new("Fast", MembershipFunction::trapezoidal(100.0, 140.0, 200.0, 200.0)?),
//!     ],
//! )?;
//! let risk = LinguisticVariable::new("Risk", 0.0, 100.0, Vec::<FuzzySet>::new())?;
//! let registry: VariableRegistry = vec![speed, risk].into_iter().collect();
//!
//! let mut rules = RuleBase::with_parser(RuleParser::sugeno(registry));
//! rules.add_rule_from_string("IF Speed IS Fast THEN Risk = 90")?;
//! rules.add_rule_from_string("IF Speed IS Slow THEN Risk = 10")?;
//!
//! let engine = EngineConfig::new()
//!     .mode(EngineMode::Sugeno)
//!     .rule_base(rules)
//!     .sugeno_inference(SugenoInference::new())
//!     .build()?;
//!
//! let out = engine.evaluate([("Speed", 120.0)])?;
//! assert!((out["Risk"] - 90.0).abs() < 1e-9);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod defuzzification;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod fuzzification;
pub mod inference;
pub mod membership;
pub mod operators;
pub mod rules;
pub mod variable;

// Re-export the model
pub use membership::{LineSegment, MembershipFunction, Shape};
pub use operators::{Implication, LogicalOperator, SNorm, TNorm};
pub use variable::{FuzzySet, LinguisticVariable, VariableRegistry};

// Re-export rule types
pub use rules::{Antecedent, Consequent, Dialect, LoadReport, Rule, RuleBase, RuleParser, RuleSyntaxError};

// Re-export pipeline stages
pub use defuzzification::{CentroidDefuzzifier, Defuzzifier, MeanOfMaxDefuzzifier, SugenoWeightedAverage};
pub use fuzzification::{BasicFuzzifier, Fuzzified, FuzzifiedInputs, Fuzzifier};
pub use inference::{
    AggregatedVariable, CrispOutput, InferenceEngine, InferenceOutput, MamdaniInference, MamdaniOutput,
    SugenoInference, SugenoOutput,
};

// Re-export engine assembly
pub use engine::{EngineConfig, EngineMode, FuzzyEngine};

// Re-export configuration types
pub use config::{
    ConfigError, DefuzzifierKind, EngineSettings, FuzzyConfig, GeneralConfig, LogLevel, OutputFormat,
    RulesConfig, SetConfig, VariableConfig,
};

// Re-export diagnostics
pub use diagnostics::{
    CollectingDiagnostics, Diagnostic, DiagnosticKind, Diagnostics, SilentDiagnostics, TracingDiagnostics,
};

// Re-export error types
pub use error::{ErrorCategory, ErrorCode, ErrorContext, FuzzyError, FuzzyResult};
