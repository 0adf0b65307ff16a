//! Diagnostics channel for soft conditions
//!
//! Soft conditions never fail an operation; they produce a fallback value and a
//! diagnostic. Components that report them take an injectable sink so callers can
//! capture or suppress the messages.

use std::fmt;
use std::sync::{Arc, Mutex};

/// Kind of soft condition being reported
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// A variable with no fuzzy sets was fuzzified
    EmptyFuzzification,
    /// A rule file line failed to parse and was skipped
    SkippedRuleLine { line_no: usize },
    /// No rule fired for an output variable; the fallback value was used
    NoRuleFired,
}

/// A single diagnostic record
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            DiagnosticKind::SkippedRuleLine { line_no } => write!(f, "line {}: {}", line_no, self.message),
            _ => write!(f, "{}", self.message),
        }
    }
}

/// Sink for diagnostics
pub trait Diagnostics: Send + Sync + fmt::Debug {
    fn report(&self, diagnostic: Diagnostic);
}

/// Forwards diagnostics to `tracing` at WARN level
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn report(&self, diagnostic: Diagnostic) {
        match diagnostic.kind {
            DiagnosticKind::SkippedRuleLine { line_no } => {
                tracing::warn!(line_no, "skipping rule line: {}", diagnostic.message)
            }
            DiagnosticKind::EmptyFuzzification => {
                tracing::warn!(kind = "empty_fuzzification", "{}", diagnostic.message)
            }
            DiagnosticKind::NoRuleFired => {
                tracing::warn!(kind = "no_rule_fired", "{}", diagnostic.message)
            }
        }
    }
}

/// Drops every diagnostic
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentDiagnostics;

impl Diagnostics for SilentDiagnostics {
    fn report(&self, _diagnostic: Diagnostic) {}
}

/// Stores diagnostics in memory for later inspection
#[derive(Debug, Default)]
pub struct CollectingDiagnostics {
    records: Mutex<Vec<Diagnostic>>,
}

impl CollectingDiagnostics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Snapshot of everything reported so far
    pub fn records(&self) -> Vec<Diagnostic> {
        self.records.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut r) = self.records.lock() {
            r.clear();
        }
    }
}

impl Diagnostics for CollectingDiagnostics {
    fn report(&self, diagnostic: Diagnostic) {
        if let Ok(mut r) = self.records.lock() {
            r.push(diagnostic);
        }
    }
}

/// Default sink used when none is injected
pub fn default_sink() -> Arc<dyn Diagnostics> {
    Arc::new(TracingDiagnostics)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collecting_sink() {
        let sink = CollectingDiagnostics::new();
        sink.report(Diagnostic {
            kind: DiagnosticKind::SkippedRuleLine { line_no: 3 },
            message: "Unknown variable: Foo".to_string(),
        });
        assert_eq!(sink.len(), 1);
        assert_eq!(sink.records()[0].to_string(), "line 3: Unknown variable: Foo");

        sink.clear();
        assert!(sink.is_empty());
    }

    #[test]
    fn test_silent_sink_drops() {
        let sink = SilentDiagnostics;
        sink.report(Diagnostic {
            kind: DiagnosticKind::NoRuleFired,
            message: "nothing".to_string(),
        });
    }
}
