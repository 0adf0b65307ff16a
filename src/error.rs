//! Structured Error Handling for the fuzzy engine
//!
//! Provides a unified error type with:
//! - Error codes for programmatic handling
//! - Error categories matching the engine's failure taxonomy
//! - Context preservation through error chains
//! - JSON-friendly serialization
//!
//! # Error Categories
//!
//! - `Construction` - Invalid membership shapes, sample counts, missing builder fields
//! - `Parse` - Malformed rule text, unknown variables or fuzzy sets
//! - `Evaluation` - Lookup failures and consequent/engine mismatches during inference
//! - `Io` - Rule file reads and writes
//! - `Config` - Configuration file issues
//!
//! # Example
//!
//! ```rust,ignore
//! use fuzzylogic::error::{FuzzyError, ErrorCode};
//!
//! fn check_samples(samples: usize) -> Result<(), FuzzyError> {
//!     if samples < 3 {
//!         return Err(FuzzyError::invalid_samples(samples)
//!             .with_hint("Use at least 3 samples"));
//!     }
//!     Ok(())
//! }
//! ```

use std::collections::HashMap;
use std::fmt;
use serde::{Deserialize, Serialize};

// ============================================================================
// Error Codes
// ============================================================================

/// Unique error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Construction errors (1xxx)
    /// Generic construction error
    ConstructionError = 1000,
    /// Membership function parameters violate ordering or degeneracy rules
    InvalidShape = 1001,
    /// Defuzzifier sample count below the minimum
    InvalidSampleCount = 1002,
    /// Required engine builder field not supplied
    MissingBuilderField = 1003,
    /// Variable domain with start greater than end
    InvalidDomain = 1004,
    /// Fuzzy set label already present on the variable
    DuplicateSet = 1005,

    // Parse errors (2xxx)
    /// Generic rule parse error
    ParseError = 2000,
    /// Rule does not start with IF
    MissingIf = 2001,
    /// Rule has no THEN keyword
    MissingThen = 2002,
    /// Expected IS after a variable name
    MissingIs = 2003,
    /// Expected = in a Sugeno consequent
    MissingEquals = 2004,
    /// Variable name not present in the registry
    UnknownVariable = 2005,
    /// Fuzzy set label not present on the variable
    UnknownFuzzySet = 2006,
    /// Sugeno consequent value is not a finite number
    InvalidNumber = 2007,
    /// Connector other than AND / OR
    UnknownOperator = 2008,
    /// Rule text ended in the middle of a clause
    UnexpectedEnd = 2009,

    // Evaluation errors (3xxx)
    /// Generic evaluation error
    EvaluationError = 3000,
    /// Antecedent references a set missing from its variable
    UnknownSetAtEvaluation = 3001,
    /// Consequent variant does not match the inference engine
    ConsequentMismatch = 3002,
    /// Crisp input names a variable the engine does not know
    UnknownInput = 3003,
    /// Inference output kind does not match the requested view
    ModeMismatch = 3004,
    /// Rule index outside the rule base
    RuleIndexOutOfRange = 3005,

    // I/O errors (4xxx)
    /// Generic I/O error
    IoError = 4000,
    /// File not found
    FileNotFound = 4001,

    // Config errors (7xxx)
    /// Generic config error
    ConfigError = 7000,
    /// Invalid config syntax
    InvalidConfigSyntax = 7001,
    /// Invalid config value
    InvalidConfigValue = 7002,

    // Internal errors (9xxx)
    /// Internal error
    InternalError = 9000,
}

/// Broad error category, one per taxonomy branch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    Construction,
    Parse,
    Evaluation,
    Io,
    Config,
    Internal,
}

impl ErrorCode {
    /// Get the numeric code value
    pub fn code(&self) -> u32 {
        *self as u32
    }

    /// Get a short description of the error code
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::ConstructionError => "Construction error",
            ErrorCode::InvalidShape => "Invalid membership function shape",
            ErrorCode::InvalidSampleCount => "Invalid sample count",
            ErrorCode::MissingBuilderField => "Missing required builder field",
            ErrorCode::InvalidDomain => "Invalid variable domain",
            ErrorCode::DuplicateSet => "Duplicate fuzzy set label",

            ErrorCode::ParseError => "Rule parse error",
            ErrorCode::MissingIf => "Rule must start with IF",
            ErrorCode::MissingThen => "Expected THEN keyword",
            ErrorCode::MissingIs => "Expected IS",
            ErrorCode::MissingEquals => "Expected =",
            ErrorCode::UnknownVariable => "Unknown variable",
            ErrorCode::UnknownFuzzySet => "Unknown fuzzy set",
            ErrorCode::InvalidNumber => "Invalid numeric value",
            ErrorCode::UnknownOperator => "Unknown logical operator",
            ErrorCode::UnexpectedEnd => "Unexpected end of rule",

            ErrorCode::EvaluationError => "Evaluation error",
            ErrorCode::UnknownSetAtEvaluation => "Unknown fuzzy set at evaluation",
            ErrorCode::ConsequentMismatch => "Consequent does not match inference engine",
            ErrorCode::UnknownInput => "Unknown input variable",
            ErrorCode::ModeMismatch => "Inference mode mismatch",
            ErrorCode::RuleIndexOutOfRange => "Rule index out of range",

            ErrorCode::IoError => "I/O error",
            ErrorCode::FileNotFound => "File not found",

            ErrorCode::ConfigError => "Configuration error",
            ErrorCode::InvalidConfigSyntax => "Invalid configuration syntax",
            ErrorCode::InvalidConfigValue => "Invalid configuration value",

            ErrorCode::InternalError => "Internal error",
        }
    }

    /// Get the category this code belongs to
    pub fn category(&self) -> ErrorCategory {
        match self.code() / 1000 {
            1 => ErrorCategory::Construction,
            2 => ErrorCategory::Parse,
            3 => ErrorCategory::Evaluation,
            4 => ErrorCategory::Io,
            7 => ErrorCategory::Config,
            _ => ErrorCategory::Internal,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

// ============================================================================
// Error Context
// ============================================================================

/// Additional context information for an error
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Key-value pairs of context information
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub fields: HashMap<String, String>,
    /// Source location (file:line)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Stack of error causes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub causes: Vec<String>,
}

impl ErrorContext {
    /// Create a new empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field to the context
    pub fn field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }
}

// ============================================================================
// Main Error Type
// ============================================================================

/// The main error type for the fuzzy engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FuzzyError {
    /// Error code for programmatic handling
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Additional context
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<ErrorContext>,
    /// Hint for resolving the error
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl FuzzyError {
    /// Create a new error with a code and message
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: None,
            hint: None,
        }
    }

    // ========================================================================
    // Factory methods for common error types
    // ========================================================================

    /// Create an invalid membership function shape error
    pub fn invalid_shape(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidShape, message)
    }

    /// Create a sample count error
    pub fn invalid_samples(samples: usize) -> Self {
        Self::new(
            ErrorCode::InvalidSampleCount,
            format!("Samples must be >= 3 (got {})", samples),
        )
    }

    /// Create an error listing every missing builder field
    pub fn missing_fields(fields: &[&str]) -> Self {
        Self::new(
            ErrorCode::MissingBuilderField,
            format!("Engine configuration is incomplete: missing {}", fields.join(", ")),
        )
        .with_context("missing", fields.join(","))
    }

    /// Create a rule parse error with the offending line attached
    pub fn parse(code: ErrorCode, message: impl Into<String>, line: &str) -> Self {
        Self::new(code, message).with_context("line", line)
    }

    /// Create an unknown variable error
    pub fn unknown_variable(name: &str) -> Self {
        Self::new(ErrorCode::UnknownVariable, format!("Unknown variable: {}", name))
    }

    /// Create an unknown fuzzy set error
    pub fn unknown_set(variable: &str, label: &str) -> Self {
        Self::new(
            ErrorCode::UnknownFuzzySet,
            format!("Variable '{}' has no fuzzy set named '{}'", variable, label),
        )
    }

    /// Create a consequent / engine mismatch error
    pub fn consequent_mismatch(engine: &str, consequent: &str) -> Self {
        Self::new(
            ErrorCode::ConsequentMismatch,
            format!("{} inference cannot evaluate consequent '{}'", engine, consequent),
        )
    }

    /// Create an evaluation error
    pub fn evaluation(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::new(code, message)
    }

    /// Create an I/O error
    pub fn io(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::IoError, message)
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, message)
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    // ========================================================================
    // Builder methods
    // ========================================================================

    /// Set the error code
    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = code;
        self
    }

    /// Add context to the error
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let ctx = self.context.get_or_insert_with(ErrorContext::new);
        ctx.fields.insert(key.into(), value.into());
        self
    }

    /// Add a cause to the error chain
    pub fn with_cause(mut self, cause: impl Into<String>) -> Self {
        let ctx = self.context.get_or_insert_with(ErrorContext::new);
        ctx.causes.push(cause.into());
        self
    }

    /// Add source location
    pub fn at(mut self, location: impl Into<String>) -> Self {
        let ctx = self.context.get_or_insert_with(ErrorContext::new);
        ctx.location = Some(location.into());
        self
    }

    /// Add a hint for resolving the error
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Get the category of this error
    pub fn category(&self) -> ErrorCategory {
        self.code.category()
    }

    /// Look up a context field
    pub fn context_field(&self, key: &str) -> Option<&str> {
        self.context
            .as_ref()
            .and_then(|c| c.fields.get(key))
            .map(String::as_str)
    }

    /// Check if this is a rule parse error
    pub fn is_parse_error(&self) -> bool {
        self.category() == ErrorCategory::Parse
    }

    /// Convert to JSON string
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(r#"{{"code":"INTERNAL_ERROR","message":"{}"}}"#, self.message)
        })
    }
}

impl fmt::Display for FuzzyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.code(), self.message)?;

        if let Some(ref ctx) = self.context {
            if let Some(line) = ctx.fields.get("line") {
                write!(f, " in rule '{}'", line)?;
            }
            if let Some(ref loc) = ctx.location {
                write!(f, " at {}", loc)?;
            }
            if !ctx.causes.is_empty() {
                write!(f, "\nCaused by:")?;
                for cause in &ctx.causes {
                    write!(f, "\n  - {}", cause)?;
                }
            }
        }

        if let Some(ref hint) = self.hint {
            write!(f, "\nHint: {}", hint)?;
        }

        Ok(())
    }
}

impl std::error::Error for FuzzyError {}

// ============================================================================
// Conversions from other error types
// ============================================================================

impl From<std::io::Error> for FuzzyError {
    fn from(err: std::io::Error) -> Self {
        use std::io::ErrorKind;
        let code = match err.kind() {
            ErrorKind::NotFound => ErrorCode::FileNotFound,
            _ => ErrorCode::IoError,
        };
        FuzzyError::io(err.to_string()).with_code(code)
    }
}

impl From<toml::de::Error> for FuzzyError {
    fn from(err: toml::de::Error) -> Self {
        FuzzyError::config(err.to_string())
            .with_code(ErrorCode::InvalidConfigSyntax)
    }
}

// ============================================================================
// Result type alias
// ============================================================================

/// A Result type using FuzzyError
pub type FuzzyResult<T> = Result<T, FuzzyError>;

// ============================================================================
// Macros for convenient error creation
// ============================================================================

/// Create a FuzzyError with context from the current location
#[macro_export]
macro_rules! fuzzy_error {
    ($code:expr, $msg:expr) => {
        $crate::error::FuzzyError::new($code, $msg)
            .at(format!("{}:{}", file!(), line!()))
    };
    ($code:expr, $fmt:expr, $($arg:tt)*) => {
        $crate::error::FuzzyError::new($code, format!($fmt, $($arg)*))
            .at(format!("{}:{}", file!(), line!()))
    };
}

/// Bail out early with an error
#[macro_export]
macro_rules! fuzzy_bail {
    ($code:expr, $msg:expr) => {
        return Err($crate::fuzzy_error!($code, $msg))
    };
    ($code:expr, $fmt:expr, $($arg:tt)*) => {
        return Err($crate::fuzzy_error!($code, $fmt, $($arg)*))
    };
}

/// Ensure a condition holds, or return an error
#[macro_export]
macro_rules! fuzzy_ensure {
    ($cond:expr, $code:expr, $msg:expr) => {
        if !$cond {
            $crate::fuzzy_bail!($code, $msg);
        }
    };
    ($cond:expr, $code:expr, $fmt:expr, $($arg:tt)*) => {
        if !$cond {
            $crate::fuzzy_bail!($code, $fmt, $($arg)*);
        }
    };
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = FuzzyError::invalid_shape("a > b");
        assert_eq!(err.code, ErrorCode::InvalidShape);
        assert_eq!(err.message, "a > b");
        assert_eq!(err.category(), ErrorCategory::Construction);
    }

    #[test]
    fn test_parse_error_carries_line() {
        let err = FuzzyError::parse(ErrorCode::MissingThen, "Expected THEN keyword in rule", "IF a IS b");
        assert!(err.is_parse_error());
        assert_eq!(err.context_field("line"), Some("IF a IS b"));
        assert!(err.to_string().contains("IF a IS b"));
    }

    #[test]
    fn test_missing_fields_lists_all() {
        let err = FuzzyError::missing_fields(&["mode", "rule_base"]);
        assert_eq!(err.code, ErrorCode::MissingBuilderField);
        assert!(err.message.contains("mode"));
        assert!(err.message.contains("rule_base"));
    }

    #[test]
    fn test_error_with_cause_and_hint() {
        let err = FuzzyError::io("failed to read rules")
            .with_cause("permission denied")
            .with_hint("Check file permissions");

        let display = err.to_string();
        assert!(display.contains("[4000]"));
        assert!(display.contains("permission denied"));
        assert!(display.contains("Check file permissions"));
    }

    #[test]
    fn test_error_categories() {
        assert_eq!(ErrorCode::UnknownFuzzySet.category(), ErrorCategory::Parse);
        assert_eq!(ErrorCode::ConsequentMismatch.category(), ErrorCategory::Evaluation);
        assert_eq!(ErrorCode::FileNotFound.category(), ErrorCategory::Io);
        assert_eq!(ErrorCode::InvalidConfigValue.category(), ErrorCategory::Config);
        assert_eq!(ErrorCode::InternalError.category(), ErrorCategory::Internal);
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: FuzzyError = io.into();
        assert_eq!(err.code, ErrorCode::FileNotFound);
        assert_eq!(err.category(), ErrorCategory::Io);

        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: FuzzyError = io.into();
        assert_eq!(err.code, ErrorCode::IoError);
        assert!(err.message.contains("denied"));
    }

    #[test]
    fn test_error_to_json() {
        let err = FuzzyError::unknown_variable("Speed");
        let json = err.to_json();
        assert!(json.contains("UNKNOWN_VARIABLE"));
        assert!(json.contains("Speed"));
    }

    #[test]
    fn test_ensure_macro() {
        fn check(n: usize) -> FuzzyResult<usize> {
            crate::fuzzy_ensure!(n >= 3, ErrorCode::InvalidSampleCount, "Samples must be >= 3 (got {})", n);
            Ok(n)
        }
        assert!(check(3).is_ok());
        let err = check(2).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidSampleCount);
        assert!(err.context.unwrap().location.is_some());
    }
}
