//! Textual rule parser
//!
//! Grammar (keywords case-insensitive, tokens whitespace-separated, `,` always a
//! token of its own):
//!
//! ```text
//! rule        := IF [antecedent ((AND | OR) antecedent)*] THEN consequents
//! antecedent  := VAR IS LABEL
//! consequents := consequent ("," consequent)*
//! consequent  := VAR IS LABEL        (Mamdani dialect)
//!              | VAR = NUMBER        (Sugeno dialect)
//! ```
//!
//! Every variable must be registered and every label must exist on its variable.
//! Any violation fails the whole rule.

use nom::{
    IResult,
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::multispace0,
    multi::many0,
    sequence::preceded,
};

use crate::error::{ErrorCode, FuzzyError, FuzzyResult};
use crate::operators::LogicalOperator;
use crate::variable::VariableRegistry;

use super::{Antecedent, Consequent, Rule};

/// Grammar-level failures
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RuleSyntaxError {
    #[error("Rule must start with IF")]
    MissingIf,

    #[error("Expected THEN keyword in rule")]
    MissingThen,

    #[error("Expected 'IS' after '{variable}', found '{found}'")]
    MissingIs { variable: String, found: String },

    #[error("Expected '=' after '{variable}', found '{found}'")]
    MissingEquals { variable: String, found: String },

    #[error("Unexpected end of rule, expected {expected}")]
    UnexpectedEnd { expected: &'static str },

    #[error("Unknown logical operator: {found}")]
    UnknownOperator { found: String },

    #[error("Invalid numeric value in Sugeno consequent: {found}")]
    InvalidNumber { found: String },

    #[error("Unexpected token '{found}', expected {expected}")]
    UnexpectedToken { found: String, expected: &'static str },
}

impl RuleSyntaxError {
    pub fn code(&self) -> ErrorCode {
        match self {
            RuleSyntaxError::MissingIf => ErrorCode::MissingIf,
            RuleSyntaxError::MissingThen => ErrorCode::MissingThen,
            RuleSyntaxError::MissingIs { .. } => ErrorCode::MissingIs,
            RuleSyntaxError::MissingEquals { .. } => ErrorCode::MissingEquals,
            RuleSyntaxError::UnexpectedEnd { .. } => ErrorCode::UnexpectedEnd,
            RuleSyntaxError::UnknownOperator { .. } => ErrorCode::UnknownOperator,
            RuleSyntaxError::InvalidNumber { .. } => ErrorCode::InvalidNumber,
            RuleSyntaxError::UnexpectedToken { .. } => ErrorCode::ParseError,
        }
    }

    fn at_line(self, line: &str) -> FuzzyError {
        FuzzyError::parse(self.code(), self.to_string(), line)
    }
}

/// Consequent syntax accepted by the parser
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// `VAR IS LABEL` consequents
    Mamdani,
    /// `VAR = NUMBER` consequents
    Sugeno,
}

/// Parses rule text against a registry of known variables
#[derive(Debug, Clone)]
pub struct RuleParser {
    registry: VariableRegistry,
    dialect: Dialect,
}

impl RuleParser {
    pub fn new(registry: VariableRegistry, dialect: Dialect) -> Self {
        Self { registry, dialect }
    }

    pub fn mamdani(registry: VariableRegistry) -> Self {
        Self::new(registry, Dialect::Mamdani)
    }

    pub fn sugeno(registry: VariableRegistry) -> Self {
        Self::new(registry, Dialect::Sugeno)
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn registry(&self) -> &VariableRegistry {
        &self.registry
    }

    /// Parse one rule line
    pub fn parse(&self, line: &str) -> FuzzyResult<Rule> {
        let tokens = tokenize(line);
        let mut cursor = Cursor { tokens: &tokens, pos: 0 };
        let mut rule = Rule::new();

        match cursor.next() {
            Some(t) if t.eq_ignore_ascii_case("IF") => {}
            _ => return Err(RuleSyntaxError::MissingIf.at_line(line)),
        }

        // Antecedents
        if !cursor.peek_is("THEN") {
            loop {
                self.parse_antecedent(&mut cursor, &mut rule, line)?;

                match cursor.peek() {
                    None => return Err(RuleSyntaxError::MissingThen.at_line(line)),
                    Some(t) if t.eq_ignore_ascii_case("THEN") => break,
                    Some(t) => match LogicalOperator::from_keyword(t) {
                        Some(op) => {
                            cursor.advance();
                            rule.add_operator(op);
                        }
                        None => {
                            return Err(RuleSyntaxError::UnknownOperator { found: t.to_string() }
                                .at_line(line))
                        }
                    },
                }
            }
        }

        match cursor.next() {
            Some(t) if t.eq_ignore_ascii_case("THEN") => {}
            _ => return Err(RuleSyntaxError::MissingThen.at_line(line)),
        }

        // Consequents
        loop {
            self.parse_consequent(&mut cursor, &mut rule, line)?;

            match cursor.next() {
                None => break,
                Some(",") => continue,
                Some(t) => {
                    return Err(RuleSyntaxError::UnexpectedToken {
                        found: t.to_string(),
                        expected: "',' or end of rule",
                    }
                    .at_line(line))
                }
            }
        }

        Ok(rule)
    }

    fn parse_antecedent(&self, cursor: &mut Cursor<'_>, rule: &mut Rule, line: &str) -> FuzzyResult<()> {
        let name = cursor.expect("variable name", line)?;
        let keyword = cursor.expect("IS", line)?;
        if !keyword.eq_ignore_ascii_case("IS") {
            return Err(RuleSyntaxError::MissingIs {
                variable: name.to_string(),
                found: keyword.to_string(),
            }
            .at_line(line));
        }
        let label = cursor.expect("fuzzy set label", line)?;

        let variable = self
            .registry
            .resolve(name)
            .map_err(|e| e.with_context("line", line))?;
        let set = variable
            .get_fuzzy_set_by_name(label)
            .ok_or_else(|| FuzzyError::unknown_set(variable.name(), label).with_context("line", line))?;
        let canonical = set.label().to_string();

        rule.add_antecedent(Antecedent::new(variable, canonical));
        Ok(())
    }

    fn parse_consequent(&self, cursor: &mut Cursor<'_>, rule: &mut Rule, line: &str) -> FuzzyResult<()> {
        let name = cursor.expect("output variable name", line)?;
        let keyword = cursor.expect(
            match self.dialect {
                Dialect::Mamdani => "IS",
                Dialect::Sugeno => "=",
            },
            line,
        )?;

        match self.dialect {
            Dialect::Mamdani => {
                if !keyword.eq_ignore_ascii_case("IS") {
                    return Err(RuleSyntaxError::MissingIs {
                        variable: name.to_string(),
                        found: keyword.to_string(),
                    }
                    .at_line(line));
                }
                let label = cursor.expect("fuzzy set label", line)?;
                let variable = self
                    .registry
                    .resolve(name)
                    .map_err(|e| e.with_context("line", line))?;
                let consequent = Consequent::mamdani(variable, label).map_err(|e| e.with_context("line", line))?;
                rule.add_consequent(consequent);
            }
            Dialect::Sugeno => {
                if keyword != "=" {
                    return Err(RuleSyntaxError::MissingEquals {
                        variable: name.to_string(),
                        found: keyword.to_string(),
                    }
                    .at_line(line));
                }
                let raw = cursor.expect("numeric value", line)?;
                let value = parse_number(raw).ok_or_else(|| {
                    RuleSyntaxError::InvalidNumber { found: raw.to_string() }.at_line(line)
                })?;
                let variable = self
                    .registry
                    .resolve(name)
                    .map_err(|e| e.with_context("line", line))?;
                rule.add_consequent(Consequent::sugeno(variable, value));
            }
        }
        Ok(())
    }
}

/// Split rule text into tokens: whitespace-separated words, `,` standalone
pub fn tokenize(line: &str) -> Vec<&str> {
    many0(token)(line).map(|(_, tokens)| tokens).unwrap_or_default()
}

fn token(input: &str) -> IResult<&str, &str> {
    preceded(
        multispace0,
        alt((tag(","), take_while1(|c: char| !c.is_whitespace() && c != ','))),
    )(input)
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}

struct Cursor<'a> {
    tokens: &'a [&'a str],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn peek(&self) -> Option<&'a str> {
        self.tokens.get(self.pos).copied()
    }

    fn peek_is(&self, keyword: &str) -> bool {
        self.peek().map(|t| t.eq_ignore_ascii_case(keyword)).unwrap_or(false)
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn next(&mut self) -> Option<&'a str> {
        let t = self.peek();
        if t.is_some() {
            self.pos += 1;
        }
        t
    }

    fn expect(&mut self, expected: &'static str, line: &str) -> FuzzyResult<&'a str> {
        self.next()
            .ok_or_else(|| RuleSyntaxError::UnexpectedEnd { expected }.at_line(line))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::registry;

    fn mamdani() -> RuleParser {
        RuleParser::mamdani(registry())
    }

    fn sugeno() -> RuleParser {
        RuleParser::sugeno(registry())
    }

    #[test]
    fn test_tokenize_commas() {
        assert_eq!(
            tokenize("  IF a IS b THEN x IS y,z IS w "),
            vec!["IF", "a", "IS", "b", "THEN", "x", "IS", "y", ",", "z", "IS", "w"]
        );
        assert!(tokenize("   ").is_empty());
    }

    #[test]
    fn test_parse_mamdani_rule() {
        let rule = mamdani()
            .parse("IF Speed IS Fast AND Visibility is poor THEN AccidentRisk IS Extreme")
            .unwrap();

        assert_eq!(rule.antecedents().len(), 2);
        assert_eq!(rule.operators(), &[LogicalOperator::And]);
        assert_eq!(rule.antecedents()[1].label(), "Poor");
        assert_eq!(rule.consequents().len(), 1);
        assert!(rule.consequents()[0].is_mamdani());
    }

    #[test]
    fn test_parse_multiple_consequents_and_or() {
        let rule = mamdani()
            .parse("if speed is Slow or RoadCondition is Good and Visibility is Clear then AccidentRisk is Low, AccidentRisk is Medium")
            .unwrap();
        assert_eq!(rule.operators(), &[LogicalOperator::Or, LogicalOperator::And]);
        assert_eq!(rule.consequents().len(), 2);
    }

    #[test]
    fn test_parse_sugeno_rule() {
        let rule = sugeno()
            .parse("IF Speed IS Fast AND Visibility IS Poor THEN AccidentRisk = 90")
            .unwrap();
        match &rule.consequents()[0] {
            Consequent::Sugeno { variable, value } => {
                assert_eq!(variable.name(), "AccidentRisk");
                assert!((value - 90.0).abs() < 1e-12);
            }
            other => panic!("expected Sugeno consequent, got {:?}", other),
        }

        let rule = sugeno().parse("IF Speed IS Slow THEN AccidentRisk = -1.5e1").unwrap();
        assert_eq!(rule.consequents()[0], Consequent::sugeno(registry().resolve("AccidentRisk").unwrap(), -15.0));
    }

    #[test]
    fn test_round_trip_both_dialects() {
        for text in [
            "IF Speed IS Fast AND Visibility IS Poor THEN AccidentRisk IS Extreme",
            "IF Speed IS Normal OR RoadCondition IS Good AND Visibility IS Clear THEN AccidentRisk IS Low, AccidentRisk IS Medium",
        ] {
            let parser = mamdani();
            let rule = parser.parse(text).unwrap();
            assert_eq!(rule.to_string(), text);
            assert_eq!(parser.parse(&rule.to_string()).unwrap(), rule);
        }

        let parser = sugeno();
        let rule = parser
            .parse("IF Speed IS Fast AND RoadCondition IS Bad THEN AccidentRisk = 70.25")
            .unwrap();
        assert_eq!(parser.parse(&rule.to_string()).unwrap(), rule);
    }

    #[test]
    fn test_missing_if() {
        let err = mamdani().parse("Speed IS Fast THEN AccidentRisk IS High").unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingIf);
        assert_eq!(err.context_field("line"), Some("Speed IS Fast THEN AccidentRisk IS High"));

        assert_eq!(mamdani().parse("").unwrap_err().code, ErrorCode::MissingIf);
    }

    #[test]
    fn test_missing_then() {
        let err = mamdani().parse("IF Speed IS Fast").unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingThen);
    }

    #[test]
    fn test_missing_is() {
        let err = mamdani().parse("IF Speed = Fast THEN AccidentRisk IS High").unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingIs);

        let err = mamdani().parse("IF Speed IS Fast THEN AccidentRisk = 9").unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingIs);
    }

    #[test]
    fn test_missing_equals() {
        let err = sugeno().parse("IF Speed IS Fast THEN AccidentRisk IS High").unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingEquals);
    }

    #[test]
    fn test_unknown_variable_and_label() {
        let err = mamdani().parse("IF Altitude IS High THEN AccidentRisk IS High").unwrap_err();
        assert_eq!(err.code, ErrorCode::UnknownVariable);
        assert!(err.context_field("line").is_some());

        let err = mamdani().parse("IF Speed IS Warp THEN AccidentRisk IS High").unwrap_err();
        assert_eq!(err.code, ErrorCode::UnknownFuzzySet);

        let err = sugeno().parse("IF Speed IS Warp THEN AccidentRisk = 3").unwrap_err();
        assert_eq!(err.code, ErrorCode::UnknownFuzzySet);

        let err = mamdani().parse("IF Speed IS Fast THEN AccidentRisk IS Apocalyptic").unwrap_err();
        assert_eq!(err.code, ErrorCode::UnknownFuzzySet);
    }

    #[test]
    fn test_non_numeric_sugeno_value() {
        let err = sugeno().parse("IF Speed IS Fast THEN AccidentRisk = high").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidNumber);

        let err = sugeno().parse("IF Speed IS Fast THEN AccidentRisk = NaN").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidNumber);
    }

    #[test]
    fn test_bad_connector_and_truncation() {
        let err = mamdani()
            .parse("IF Speed IS Fast XOR Visibility IS Poor THEN AccidentRisk IS High")
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::UnknownOperator);

        let err = mamdani().parse("IF Speed IS Fast THEN AccidentRisk IS").unwrap_err();
        assert_eq!(err.code, ErrorCode::UnexpectedEnd);

        let err = mamdani().parse("IF Speed IS Fast THEN").unwrap_err();
        assert_eq!(err.code, ErrorCode::UnexpectedEnd);

        let err = mamdani().parse("IF Speed IS Fast THEN AccidentRisk IS High ,").unwrap_err();
        assert_eq!(err.code, ErrorCode::UnexpectedEnd);

        let err = mamdani()
            .parse("IF Speed IS Fast THEN AccidentRisk IS High AccidentRisk IS Low")
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ParseError);
    }

    #[test]
    fn test_zero_antecedents_allowed() {
        let rule = sugeno().parse("IF THEN AccidentRisk = 50").unwrap();
        assert!(rule.antecedents().is_empty());
        assert_eq!(rule.to_string(), "IF THEN AccidentRisk = 50");
    }
}
