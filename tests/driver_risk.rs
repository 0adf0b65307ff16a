//! End-to-end runs of the driver-risk system through the public API

use std::sync::Arc;

use approx::assert_abs_diff_eq;
use fuzzylogic::{
    Antecedent, CentroidDefuzzifier, CollectingDiagnostics, Consequent, DiagnosticKind, EngineConfig, EngineMode,
    ErrorCode, FuzzyConfig, FuzzyEngine, FuzzySet, LinguisticVariable, MamdaniInference, MeanOfMaxDefuzzifier,
    MembershipFunction, Rule, RuleBase, RuleParser, SugenoInference, VariableRegistry,
};

fn set(label: &str, params: &[f64]) -> FuzzySet {
    let kind = if params.len() == 3 { "triangular" } else { "trapezoidal" };
    FuzzySet::new(label, MembershipFunction::create(kind, params).unwrap())
}

fn registry() -> VariableRegistry {
    vec![
        LinguisticVariable::new(
            "Speed",
            0.0,
            200.0,
            vec![
                set("Slow", &[0.0, 0.0, 40.0, 60.0]),
                set("Normal", &[50.0, 80.0, 110.0]),
                set("Fast", &[100.0, 140.0, 200.0, 200.0]),
            ],
        ),
        LinguisticVariable::new(
            "RoadCondition",
            0.0,
            10.0,
            vec![
                set("Bad", &[0.0, 0.0, 4.0]),
                set("Wet", &[2.0, 5.0, 8.0]),
                set("Good", &[6.0, 10.0, 10.0]),
            ],
        ),
        LinguisticVariable::new(
            "Visibility",
            0.0,
            1000.0,
            vec![
                set("Poor", &[0.0, 0.0, 100.0, 300.0]),
                set("Foggy", &[200.0, 400.0, 600.0, 800.0]),
                set("Clear", &[700.0, 900.0, 1000.0, 1000.0]),
            ],
        ),
        LinguisticVariable::new(
            "AccidentRisk",
            0.0,
            100.0,
            vec![
                set("Low", &[0.0, 0.0, 25.0]),
                set("Medium", &[20.0, 40.0, 60.0]),
                set("High", &[50.0, 70.0, 90.0]),
                set("Extreme", &[80.0, 100.0, 100.0]),
            ],
        ),
    ]
    .into_iter()
    .map(Result::unwrap)
    .collect()
}

const MAMDANI_RULES: &[&str] = &[
    "IF Speed IS Fast AND Visibility IS Poor THEN AccidentRisk IS Extreme",
    "IF Speed IS Normal AND RoadCondition IS Good AND Visibility IS Clear THEN AccidentRisk IS Low",
    "IF RoadCondition IS Wet AND Visibility IS Foggy THEN AccidentRisk IS Medium",
    "IF Speed IS Fast AND RoadCondition IS Bad THEN AccidentRisk IS High",
];

const SUGENO_RULES: &[&str] = &[
    "IF Speed IS Fast AND Visibility IS Poor THEN AccidentRisk = 90",
    "IF Speed IS Slow AND RoadCondition IS Good THEN AccidentRisk = 10",
    "IF RoadCondition IS Wet AND Visibility IS Foggy THEN AccidentRisk = 40",
    "IF Speed IS Normal AND Visibility IS Clear THEN AccidentRisk = 10",
    "IF Speed IS Fast AND RoadCondition IS Bad THEN AccidentRisk = 70",
];

const INPUTS: [(&str, f64); 3] = [("Speed", 120.0), ("RoadCondition", 5.0), ("Visibility", 250.0)];

fn rule_base(parser: RuleParser, lines: &[&str]) -> RuleBase {
    let mut rules = RuleBase::with_parser(parser);
    for line in lines {
        rules.add_rule_from_string(line).unwrap();
    }
    rules
}

fn sugeno_engine(lines: &[&str]) -> FuzzyEngine {
    EngineConfig::new()
        .mode(EngineMode::Sugeno)
        .rule_base(rule_base(RuleParser::sugeno(registry()), lines))
        .sugeno_inference(SugenoInference::new())
        .build()
        .unwrap()
}

#[test]
fn test_single_sugeno_rule_weight_cancels() {
    let engine = sugeno_engine(&[SUGENO_RULES[0]]);

    let activation = engine
        .inference_engine()
        .rule_activation(&engine.rule_base().rules()[0], &engine.fuzzify(INPUTS).unwrap())
        .unwrap();
    assert_abs_diff_eq!(activation, 0.25, epsilon = 1e-9);

    let out = engine.evaluate(INPUTS).unwrap();
    assert_abs_diff_eq!(out["AccidentRisk"], 90.0, epsilon = 1e-9);
}

#[test]
fn test_sugeno_driver_risk() {
    let engine = sugeno_engine(SUGENO_RULES);

    // Fast∧Poor = 0.25 → 90 and Wet∧Foggy = 0.25 → 40; the rest do not fire
    let out = engine.evaluate(INPUTS).unwrap();
    assert_eq!(out.len(), 1);
    assert_abs_diff_eq!(out["AccidentRisk"], 65.0, epsilon = 1e-9);

    let crisp = engine.infer(INPUTS).unwrap();
    let crisp = crisp.as_sugeno().unwrap();
    assert_abs_diff_eq!(crisp.output("AccidentRisk").unwrap().total_weight(), 0.5, epsilon = 1e-9);
}

#[test]
fn test_sugeno_no_rule_fired_uses_midpoint() {
    let sink = CollectingDiagnostics::new();
    let engine = EngineConfig::new()
        .mode(EngineMode::Sugeno)
        .rule_base(rule_base(RuleParser::sugeno(registry()), SUGENO_RULES))
        .sugeno_inference(SugenoInference::new())
        .diagnostics(sink.clone())
        .build()
        .unwrap();

    // Slow needs a Good road and Clear needs Normal speed
    let out = engine
        .evaluate([("Speed", 0.0), ("RoadCondition", 5.0), ("Visibility", 950.0)])
        .unwrap();
    assert_abs_diff_eq!(out["AccidentRisk"], 50.0, epsilon = 1e-9);
    assert!(sink
        .records()
        .iter()
        .any(|d| matches!(d.kind, DiagnosticKind::NoRuleFired)));
}

#[test]
fn test_mamdani_driver_risk() {
    let rules = rule_base(RuleParser::mamdani(registry()), MAMDANI_RULES);
    let engine = EngineConfig::new()
        .mode(EngineMode::Mamdani)
        .rule_base(rules)
        .mamdani_inference(MamdaniInference::new())
        .defuzzifier(CentroidDefuzzifier::default())
        .build()
        .unwrap();

    let fuzzy = engine.infer(INPUTS).unwrap();
    let aggregated = fuzzy.as_mamdani().unwrap().get("AccidentRisk").unwrap();
    assert_abs_diff_eq!(aggregated.activation("Extreme"), 0.25, epsilon = 1e-9);
    assert_abs_diff_eq!(aggregated.activation("Medium"), 0.25, epsilon = 1e-9);
    assert_abs_diff_eq!(aggregated.activation("Low"), 0.0, epsilon = 1e-9);

    // clipped Medium (centre 40) and clipped Extreme (centre ≈ 91.2), areas 8.75 and 4.375
    let out = engine.evaluate(INPUTS).unwrap();
    assert_abs_diff_eq!(out["AccidentRisk"], 57.1, epsilon = 0.5);
}

#[test]
fn test_mamdani_mean_of_max() {
    let engine = EngineConfig::new()
        .mode(EngineMode::Mamdani)
        .rule_base(rule_base(RuleParser::mamdani(registry()), MAMDANI_RULES))
        .mamdani_inference(MamdaniInference::new())
        .defuzzifier(MeanOfMaxDefuzzifier::default())
        .build()
        .unwrap();

    // both plateaus sit at 0.25: [25, 55] and [85, 100]
    let out = engine.evaluate(INPUTS).unwrap();
    assert_abs_diff_eq!(out["AccidentRisk"], 57.5, epsilon = 1.0);
}

#[test]
fn test_missing_input_defaults_to_zero() {
    let engine = sugeno_engine(SUGENO_RULES);

    // Without Visibility only rules not mentioning it can fire; none do at road 5
    let out = engine.evaluate([("Speed", 120.0), ("RoadCondition", 5.0)]).unwrap();
    assert_abs_diff_eq!(out["AccidentRisk"], 50.0, epsilon = 1e-9);

    // Bad is 0.75 at road 1; Fast is 1 at 150
    let out = engine.evaluate([("Speed", 150.0), ("RoadCondition", 1.0)]).unwrap();
    assert_abs_diff_eq!(out["AccidentRisk"], 70.0, epsilon = 1e-9);
}

#[test]
fn test_unknown_input_is_rejected() {
    let engine = sugeno_engine(SUGENO_RULES);
    let err = engine.evaluate([("Altitude", 3.0)]).unwrap_err();
    assert_eq!(err.code, ErrorCode::UnknownInput);
}

#[test]
fn test_unknown_set_fails_at_evaluation() {
    let registry = registry();
    let speed = registry.resolve("Speed").unwrap();
    let risk = registry.resolve("AccidentRisk").unwrap();

    let mut rules = RuleBase::new();
    rules.add_rule(
        Rule::new()
            .when(None, Antecedent::new(speed, "Reckless"))
            .then(Consequent::sugeno(risk, 99.0)),
    );
    let engine = EngineConfig::new()
        .mode(EngineMode::Sugeno)
        .rule_base(rules)
        .sugeno_inference(SugenoInference::new())
        .build()
        .unwrap();

    let err = engine.evaluate([("Speed", 120.0)]).unwrap_err();
    assert_eq!(err.code, ErrorCode::UnknownSetAtEvaluation);
}

#[test]
fn test_consequent_mismatch() {
    let engine = EngineConfig::new()
        .mode(EngineMode::Mamdani)
        .rule_base(rule_base(RuleParser::sugeno(registry()), SUGENO_RULES))
        .mamdani_inference(MamdaniInference::new())
        .defuzzifier(CentroidDefuzzifier::default())
        .build()
        .unwrap();

    let err = engine.evaluate(INPUTS).unwrap_err();
    assert_eq!(err.code, ErrorCode::ConsequentMismatch);
}

#[test]
fn test_builder_lists_missing_fields() {
    let err = EngineConfig::new().build().unwrap_err();
    assert_eq!(err.code, ErrorCode::MissingBuilderField);
    assert_eq!(err.context_field("missing"), Some("mode,rule_base"));

    let err = EngineConfig::new().mode(EngineMode::Mamdani).build().unwrap_err();
    assert_eq!(err.context_field("missing"), Some("rule_base,mamdani_inference,defuzzifier"));
}

#[test]
fn test_rule_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("driver_risk.rules");

    let original = rule_base(RuleParser::sugeno(registry()), SUGENO_RULES);
    original.save_to_file(&path).unwrap();

    let sink = CollectingDiagnostics::new();
    let mut loaded = RuleBase::with_parser(RuleParser::sugeno(registry())).with_diagnostics(sink.clone());
    let report = loaded.load_from_file(&path).unwrap();
    assert_eq!(report.loaded, SUGENO_RULES.len());
    assert_eq!(report.skipped, 0);
    assert!(sink.is_empty());

    let engine = EngineConfig::new()
        .mode(EngineMode::Sugeno)
        .rule_base(loaded)
        .sugeno_inference(SugenoInference::new())
        .build()
        .unwrap();
    assert_abs_diff_eq!(engine.evaluate(INPUTS).unwrap()["AccidentRisk"], 65.0, epsilon = 1e-9);
}

#[test]
fn test_rule_file_skips_bad_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mixed.rules");
    std::fs::write(
        &path,
        "# driver risk\n\
         IF Speed IS Fast AND Visibility IS Poor THEN AccidentRisk = 90\n\
         \n\
         IF Speed IS Warp THEN AccidentRisk = 100\n\
         IF RoadCondition IS Wet AND Visibility IS Foggy THEN AccidentRisk = 40\n",
    )
    .unwrap();

    let sink = CollectingDiagnostics::new();
    let mut rules = RuleBase::with_parser(RuleParser::sugeno(registry())).with_diagnostics(sink.clone());
    let report = rules.load_from_file(&path).unwrap();

    assert_eq!(report.loaded, 2);
    assert_eq!(report.skipped, 1);
    let records = sink.records();
    assert_eq!(records.len(), 1);
    assert!(matches!(records[0].kind, DiagnosticKind::SkippedRuleLine { line_no: 4 }));
}

#[test]
fn test_default_config_engine() {
    let config = FuzzyConfig::load_from_str(FuzzyConfig::default_config_content()).unwrap();
    let sink: Arc<CollectingDiagnostics> = CollectingDiagnostics::new();
    let engine = config.build_engine_with_diagnostics(sink.clone()).unwrap();

    assert_eq!(engine.mode(), EngineMode::Mamdani);
    assert_eq!(engine.rule_base().len(), MAMDANI_RULES.len());
    assert_eq!(engine.defuzzifier().map(|d| d.name()), Some("centroid"));

    let out = engine.evaluate(INPUTS).unwrap();
    assert_abs_diff_eq!(out["AccidentRisk"], 57.1, epsilon = 0.5);
    assert!(sink.is_empty());
}
