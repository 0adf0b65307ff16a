//! Ordered, mutable rule collection with text persistence

use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

use crate::diagnostics::{default_sink, Diagnostic, DiagnosticKind, Diagnostics};
use crate::error::{ErrorCode, FuzzyError, FuzzyResult};

use super::{Rule, RuleParser};

/// Outcome of a bulk load
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub loaded: usize,
    pub skipped: usize,
}

/// Rules in insertion order
///
/// Indices are positions in that order and shift when a rule is removed.
#[derive(Debug, Clone)]
pub struct RuleBase {
    rules: Vec<Rule>,
    parser: Option<RuleParser>,
    diagnostics: Arc<dyn Diagnostics>,
}

impl Default for RuleBase {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleBase {
    /// Empty rule base without a parser; text operations fail until one is set
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            parser: None,
            diagnostics: default_sink(),
        }
    }

    pub fn with_parser(parser: RuleParser) -> Self {
        Self {
            parser: Some(parser),
            ..Self::new()
        }
    }

    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn Diagnostics>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn set_parser(&mut self, parser: RuleParser) {
        self.parser = Some(parser);
    }

    pub fn parser(&self) -> Option<&RuleParser> {
        self.parser.as_ref()
    }

    pub fn add_rule(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    /// Parse and append one rule; nothing is added when parsing fails
    pub fn add_rule_from_string(&mut self, text: &str) -> FuzzyResult<()> {
        let rule = self.require_parser()?.parse(text)?;
        self.rules.push(rule);
        Ok(())
    }

    /// Remove and return the rule at `index`
    pub fn remove_rule(&mut self, index: usize) -> FuzzyResult<Rule> {
        self.check_index(index)?;
        Ok(self.rules.remove(index))
    }

    pub fn enable_rule(&mut self, index: usize) -> FuzzyResult<()> {
        self.get_mut(index)?.set_enabled(true);
        Ok(())
    }

    pub fn disable_rule(&mut self, index: usize) -> FuzzyResult<()> {
        self.get_mut(index)?.set_enabled(false);
        Ok(())
    }

    pub fn get(&self, index: usize) -> Option<&Rule> {
        self.rules.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> FuzzyResult<&mut Rule> {
        self.check_index(index)?;
        Ok(&mut self.rules[index])
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Enabled rules, in order; reflects the current state on every call
    pub fn enabled_rules(&self) -> impl Iterator<Item = &Rule> + '_ {
        self.rules.iter().filter(|r| r.is_enabled())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn clear(&mut self) {
        self.rules.clear();
    }

    /// Write every rule, enabled or not, one per line
    ///
    /// Weight and enabled state are not part of the text format.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> FuzzyResult<()> {
        let path = path.as_ref();
        let file = fs::File::create(path).map_err(|e| io_error(path, e))?;
        let mut writer = BufWriter::new(file);
        for rule in &self.rules {
            writeln!(writer, "{}", rule).map_err(|e| io_error(path, e))?;
        }
        writer.flush().map_err(|e| io_error(path, e))?;
        Ok(())
    }

    /// Replace the contents with the rules in `path`
    ///
    /// Blank lines and lines starting with `#` are ignored. Lines that fail to
    /// parse are skipped with a diagnostic. If the file cannot be read the
    /// current contents are left untouched.
    pub fn load_from_file(&mut self, path: impl AsRef<Path>) -> FuzzyResult<LoadReport> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| io_error(path, e))?;
        let parser = self.require_parser()?;

        let mut rules = Vec::new();
        let mut report = LoadReport::default();
        for (idx, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            match parser.parse(line) {
                Ok(rule) => {
                    rules.push(rule);
                    report.loaded += 1;
                }
                Err(e) => {
                    report.skipped += 1;
                    self.diagnostics.report(Diagnostic {
                        kind: DiagnosticKind::SkippedRuleLine { line_no: idx + 1 },
                        message: e.to_string(),
                    });
                }
            }
        }

        tracing::debug!(
            path = %path.display(),
            loaded = report.loaded,
            skipped = report.skipped,
            "loaded rule file"
        );
        self.rules = rules;
        Ok(report)
    }

    fn require_parser(&self) -> FuzzyResult<&RuleParser> {
        self.parser.as_ref().ok_or_else(|| {
            FuzzyError::internal("Rule base has no parser attached")
                .with_hint("Create the rule base with RuleBase::with_parser")
        })
    }

    fn check_index(&self, index: usize) -> FuzzyResult<()> {
        if index < self.rules.len() {
            Ok(())
        } else {
            Err(FuzzyError::evaluation(
                ErrorCode::RuleIndexOutOfRange,
                format!("Rule index {} out of range (rule base has {} rules)", index, self.rules.len()),
            ))
        }
    }
}

fn io_error(path: &Path, err: std::io::Error) -> FuzzyError {
    FuzzyError::from(err).with_context("path", path.display().to_string())
}
