//! Configuration for fuzzylogic
//!
//! A configuration file describes a whole fuzzy system (engine settings,
//! linguistic variables and rules) plus general CLI settings:
//! - TOML configuration files
//! - Environment variable overrides
//! - Multiple config file locations
//!
//! # Configuration File Locations
//!
//! Configuration files are searched in order (first found wins):
//! 1. `./fuzzylogic.toml` - Project-local configuration
//! 2. `~/.config/fuzzylogic/config.toml` - User configuration (XDG)
//! 3. `~/.fuzzylogic/config.toml` - User configuration (legacy)
//! 4. `/etc/fuzzylogic/config.toml` - System-wide configuration
//!
//! # Environment Variables
//!
//! - `FUZZY_MODE` - Inference mode (mamdani, sugeno)
//! - `FUZZY_SAMPLES` - Defuzzifier sample count
//! - `FUZZY_DEFUZZIFIER` - Defuzzifier (centroid, mean_of_max)
//! - `FUZZY_LOG_LEVEL` - Logging verbosity (quiet, normal, verbose, debug)
//! - `FUZZY_FORMAT` - Output format (text, json)
//!
//! # Example Configuration
//!
//! ```toml
//! [engine]
//! mode = "sugeno"
//! and = "min"
//! or = "max"
//!
//! [[variables]]
//! name = "Speed"
//! start = 0.0
//! end = 200.0
//! sets = [
//!     { label = "Slow", shape = "trapezoidal", params = [0.0, 0.0, 40.0, 60.0] },
//!     { label = "Fast", shape = "trapezoidal", params = [100.0, 140.0, 200.0, 200.0] },
//! ]
//!
//! [rules]
//! file = "driver_risk.rules"
//! inline = ["IF Speed IS Fast THEN AccidentRisk = 90"]
//! ```

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::defuzzification::{CentroidDefuzzifier, MeanOfMaxDefuzzifier, DEFAULT_SAMPLES};
use crate::diagnostics::{default_sink, Diagnostics};
use crate::engine::{EngineConfig, EngineMode, FuzzyEngine};
use crate::error::{ErrorCode, FuzzyError, FuzzyResult};
use crate::inference::{MamdaniInference, SugenoInference};
use crate::membership::MembershipFunction;
use crate::operators::{Implication, SNorm, TNorm};
use crate::rules::{RuleBase, RuleParser};
use crate::variable::{FuzzySet, LinguisticVariable, VariableRegistry};

// ============================================================================
// Configuration Schema
// ============================================================================

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FuzzyConfig {
    /// General settings
    pub general: GeneralConfig,
    /// Engine settings
    pub engine: EngineSettings,
    /// Linguistic variables, inputs and outputs alike
    pub variables: Vec<VariableConfig>,
    /// Rule sources
    pub rules: RulesConfig,
    /// File this configuration was read from
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

/// General configuration options
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Logging level
    pub log_level: LogLevel,
    /// Output format for evaluation results
    pub format: OutputFormat,
}

/// Inference and defuzzification settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub mode: EngineMode,
    /// T-norm for AND connectors
    pub and: TNorm,
    /// S-norm for OR connectors
    pub or: SNorm,
    /// Mamdani implication
    pub implication: Implication,
    /// Mamdani aggregation across rules
    pub aggregation: SNorm,
    pub defuzzifier: DefuzzifierKind,
    /// Domain samples used by the defuzzifier (>= 3)
    pub samples: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            mode: EngineMode::Mamdani,
            and: TNorm::Min,
            or: SNorm::Max,
            implication: Implication::Min,
            aggregation: SNorm::Max,
            defuzzifier: DefuzzifierKind::Centroid,
            samples: DEFAULT_SAMPLES,
        }
    }
}

/// One linguistic variable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableConfig {
    pub name: String,
    pub start: f64,
    pub end: f64,
    #[serde(default)]
    pub sets: Vec<SetConfig>,
}

/// One fuzzy set of a variable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetConfig {
    pub label: String,
    /// `triangular` or `trapezoidal`
    pub shape: String,
    pub params: Vec<f64>,
}

/// Where rules come from
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Rule file, one rule per line; relative paths resolve against the config file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    /// Rules given directly in the configuration
    pub inline: Vec<String>,
}

// ============================================================================
// Enums
// ============================================================================

/// Output format for evaluation results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Text => "text",
            OutputFormat::Json => "json",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" | "plain" => Some(OutputFormat::Text),
            "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }
}

/// Logging verbosity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Quiet,
    #[default]
    Normal,
    Verbose,
    Debug,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Quiet => "quiet",
            LogLevel::Normal => "normal",
            LogLevel::Verbose => "verbose",
            LogLevel::Debug => "debug",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "quiet" | "q" | "0" => Some(LogLevel::Quiet),
            "normal" | "n" | "1" => Some(LogLevel::Normal),
            "verbose" | "v" | "2" => Some(LogLevel::Verbose),
            "debug" | "d" | "3" => Some(LogLevel::Debug),
            _ => None,
        }
    }

    /// `tracing` filter directive for this level
    pub fn filter_directive(&self) -> &'static str {
        match self {
            LogLevel::Quiet => "error",
            LogLevel::Normal => "warn",
            LogLevel::Verbose => "info",
            LogLevel::Debug => "debug",
        }
    }
}

/// Defuzzification strategy for Mamdani mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DefuzzifierKind {
    #[default]
    Centroid,
    MeanOfMax,
}

impl DefuzzifierKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DefuzzifierKind::Centroid => "centroid",
            DefuzzifierKind::MeanOfMax => "mean_of_max",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "centroid" | "cog" => Some(DefuzzifierKind::Centroid),
            "mean_of_max" | "mean-of-max" | "mom" => Some(DefuzzifierKind::MeanOfMax),
            _ => None,
        }
    }
}

// ============================================================================
// Configuration Loading
// ============================================================================

impl FuzzyConfig {
    /// Create a new default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from the first file found, then apply env overrides
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        for path in Self::config_paths() {
            if path.exists() {
                config = Self::load_from_file(&path)?;
                break;
            }
        }

        config.apply_env_overrides();

        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(path.to_path_buf(), e.to_string()))?;

        let mut config: FuzzyConfig = toml::from_str(&content)
            .map_err(|e| ConfigError::ParseError(path.to_path_buf(), e.to_string()))?;
        config.source = Some(path.to_path_buf());

        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Load configuration from a string
    pub fn load_from_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content)
            .map_err(|e| ConfigError::ParseError(PathBuf::from("<string>"), e.to_string()))
    }

    /// Get the list of config file paths to search
    pub fn config_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        // Project-local
        paths.push(PathBuf::from("./fuzzylogic.toml"));

        // XDG config directory
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("fuzzylogic").join("config.toml"));
        }

        // Legacy home directory
        if let Some(home_dir) = dirs::home_dir() {
            paths.push(home_dir.join(".fuzzylogic").join("config.toml"));
        }

        // System-wide (Unix only)
        #[cfg(unix)]
        paths.push(PathBuf::from("/etc/fuzzylogic/config.toml"));

        paths
    }

    /// Apply environment variable overrides; unparsable values are ignored
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = env::var("FUZZY_MODE") {
            if let Some(mode) = EngineMode::from_str(&val) {
                self.engine.mode = mode;
            }
        }

        if let Ok(val) = env::var("FUZZY_SAMPLES") {
            if let Ok(samples) = val.parse::<usize>() {
                self.engine.samples = samples;
            }
        }

        if let Ok(val) = env::var("FUZZY_DEFUZZIFIER") {
            if let Some(kind) = DefuzzifierKind::from_str(&val) {
                self.engine.defuzzifier = kind;
            }
        }

        if let Ok(val) = env::var("FUZZY_LOG_LEVEL") {
            if let Some(level) = LogLevel::from_str(&val) {
                self.general.log_level = level;
            }
        }

        if let Ok(val) = env::var("FUZZY_FORMAT") {
            if let Some(format) = OutputFormat::from_str(&val) {
                self.general.format = format;
            }
        }
    }

    /// Serialize configuration to TOML
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::SerializeError(e.to_string()))
    }

    /// Save configuration to a file
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = self.to_toml()?;
        fs::write(path, content).map_err(|e| ConfigError::IoError(path.to_path_buf(), e.to_string()))
    }

    /// Rule file path, resolved against the directory of the config file
    pub fn rules_file(&self) -> Option<PathBuf> {
        let file = self.rules.file.as_ref()?;
        if file.is_absolute() {
            return Some(file.clone());
        }
        match self.source.as_ref().and_then(|s| s.parent()) {
            Some(dir) => Some(dir.join(file)),
            None => Some(file.clone()),
        }
    }

    // ========================================================================
    // System construction
    // ========================================================================

    /// Build every configured linguistic variable
    pub fn build_variables(&self) -> FuzzyResult<VariableRegistry> {
        let mut registry = VariableRegistry::new();
        for var in &self.variables {
            let sets = var
                .sets
                .iter()
                .map(|s| {
                    MembershipFunction::create(&s.shape, &s.params)
                        .map(|mf| FuzzySet::new(s.label.clone(), mf))
                        .map_err(|e| e.with_context("variable", var.name.clone()).with_context("set", s.label.clone()))
                })
                .collect::<FuzzyResult<Vec<_>>>()?;
            let variable = LinguisticVariable::new(var.name.clone(), var.start, var.end, sets)?;
            if registry.contains(variable.name()) {
                return Err(ConfigError::InvalidValue(
                    "variables".to_string(),
                    format!("variable '{}' is defined more than once", variable.name()),
                )
                .into());
            }
            registry.register(variable);
        }
        Ok(registry)
    }

    /// Build an engine with diagnostics routed to `tracing`
    pub fn build_engine(&self) -> FuzzyResult<FuzzyEngine> {
        self.build_engine_with_diagnostics(default_sink())
    }

    /// Build the configured engine
    ///
    /// Inline rules must all parse; the rule file is loaded line by line and bad
    /// lines are skipped with a diagnostic.
    pub fn build_engine_with_diagnostics(&self, diagnostics: Arc<dyn Diagnostics>) -> FuzzyResult<FuzzyEngine> {
        let registry = self.build_variables()?;
        let parser = match self.engine.mode {
            EngineMode::Mamdani => RuleParser::mamdani(registry.clone()),
            EngineMode::Sugeno => RuleParser::sugeno(registry.clone()),
        };
        let mut rule_base = RuleBase::with_parser(parser).with_diagnostics(Arc::clone(&diagnostics));

        if let Some(path) = self.rules_file() {
            let report = rule_base.load_from_file(&path)?;
            tracing::info!(
                path = %path.display(),
                loaded = report.loaded,
                skipped = report.skipped,
                "rule file loaded"
            );
        }
        for line in &self.rules.inline {
            rule_base.add_rule_from_string(line)?;
        }

        let settings = &self.engine;
        let mut builder = EngineConfig::new()
            .mode(settings.mode)
            .rule_base(rule_base)
            .variables(registry)
            .diagnostics(diagnostics);

        builder = match settings.mode {
            EngineMode::Mamdani => {
                let builder = builder.mamdani_inference(
                    MamdaniInference::new()
                        .with_and(settings.and)
                        .with_or(settings.or)
                        .with_implication(settings.implication)
                        .with_aggregation(settings.aggregation),
                );
                match settings.defuzzifier {
                    DefuzzifierKind::Centroid => builder.defuzzifier(CentroidDefuzzifier::new(settings.samples)?),
                    DefuzzifierKind::MeanOfMax => builder.defuzzifier(MeanOfMaxDefuzzifier::new(settings.samples)?),
                }
            }
            EngineMode::Sugeno => {
                builder.sugeno_inference(SugenoInference::new().with_and(settings.and).with_or(settings.or))
            }
        };

        builder.build()
    }

    /// Get the default configuration file content
    pub fn default_config_content() -> &'static str {
        r#"# fuzzylogic configuration file
# Describes a complete fuzzy system: engine settings, variables and rules.

[general]
# Logging level: quiet, normal, verbose, debug
log_level = "normal"
# Output format for results: text, json
format = "text"

[engine]
# Inference mode: mamdani, sugeno
mode = "mamdani"
# T-norm for AND: min, product, lukasiewicz
and = "min"
# S-norm for OR: max, bounded_sum, probabilistic_sum
or = "max"
# Mamdani implication: min, product
implication = "min"
# Mamdani aggregation across rules: max, bounded_sum, probabilistic_sum
aggregation = "max"
# Defuzzifier (mamdani only): centroid, mean_of_max
defuzzifier = "centroid"
# Domain samples for defuzzification (>= 3)
samples = 1001

# Variables: shape is triangular (3 params) or trapezoidal (4 params)
[[variables]]
name = "Speed"
start = 0.0
end = 200.0
sets = [
    { label = "Slow", shape = "trapezoidal", params = [0.0, 0.0, 40.0, 60.0] },
    { label = "Normal", shape = "triangular", params = [50.0, 80.0, 110.0] },
    { label = "Fast", shape = "trapezoidal", params = [100.0, 140.0, 200.0, 200.0] },
]

[[variables]]
name = "RoadCondition"
start = 0.0
end = 10.0
sets = [
    { label = "Bad", shape = "triangular", params = [0.0, 0.0, 4.0] },
    { label = "Wet", shape = "triangular", params = [2.0, 5.0, 8.0] },
    { label = "Good", shape = "triangular", params = [6.0, 10.0, 10.0] },
]

[[variables]]
name = "Visibility"
start = 0.0
end = 1000.0
sets = [
    { label = "Poor", shape = "trapezoidal", params = [0.0, 0.0, 100.0, 300.0] },
    { label = "Foggy", shape = "trapezoidal", params = [200.0, 400.0, 600.0, 800.0] },
    { label = "Clear", shape = "trapezoidal", params = [700.0, 900.0, 1000.0, 1000.0] },
]

[[variables]]
name = "AccidentRisk"
start = 0.0
end = 100.0
sets = [
    { label = "Low", shape = "triangular", params = [0.0, 0.0, 25.0] },
    { label = "Medium", shape = "triangular", params = [20.0, 40.0, 60.0] },
    { label = "High", shape = "triangular", params = [50.0, 70.0, 90.0] },
    { label = "Extreme", shape = "triangular", params = [80.0, 100.0, 100.0] },
]

[rules]
# Optional rule file, one rule per line (relative to this file)
# file = "driver_risk.rules"
inline = [
    "IF Speed IS Fast AND Visibility IS Poor THEN AccidentRisk IS Extreme",
    "IF Speed IS Normal AND RoadCondition IS Good AND Visibility IS Clear THEN AccidentRisk IS Low",
    "IF RoadCondition IS Wet AND Visibility IS Foggy THEN AccidentRisk IS Medium",
    "IF Speed IS Fast AND RoadCondition IS Bad THEN AccidentRisk IS High",
]
"#
    }
}

// ============================================================================
// Error Types
// ============================================================================

/// Configuration errors
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// IO error reading config file
    IoError(PathBuf, String),
    /// TOML parse error
    ParseError(PathBuf, String),
    /// Serialization error
    SerializeError(String),
    /// A value that parses but cannot be used
    InvalidValue(String, String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(path, msg) => {
                write!(f, "IO error reading {}: {}", path.display(), msg)
            }
            ConfigError::ParseError(path, msg) => {
                write!(f, "Parse error in {}: {}", path.display(), msg)
            }
            ConfigError::SerializeError(msg) => {
                write!(f, "Serialization error: {}", msg)
            }
            ConfigError::InvalidValue(key, msg) => {
                write!(f, "Invalid value for '{}': {}", key, msg)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for FuzzyError {
    fn from(err: ConfigError) -> Self {
        let code = match &err {
            ConfigError::IoError(..) => ErrorCode::IoError,
            ConfigError::ParseError(..) => ErrorCode::InvalidConfigSyntax,
            ConfigError::SerializeError(_) => ErrorCode::ConfigError,
            ConfigError::InvalidValue(..) => ErrorCode::InvalidConfigValue,
        };
        FuzzyError::new(code, err.to_string())
    }
}

// ============================================================================
// Tests
// ============================================================================
