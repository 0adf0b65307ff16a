//! fuzzylogic - fuzzy inference from the command line

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use fuzzylogic::{
    CollectingDiagnostics, EngineMode, FuzzyConfig, LogLevel, OutputFormat, RuleBase, RuleParser,
};

#[derive(Parser)]
#[command(name = "fuzzylogic")]
#[command(version = "0.1.0")]
#[command(about = "Mamdani and Sugeno fuzzy inference engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (defaults to the standard search path)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Output format (overrides the configuration)
    #[arg(short, long, global = true, value_enum)]
    format: Option<FormatArg>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate the configured system for crisp inputs
    Eval {
        /// Input value as NAME=VALUE (repeatable)
        #[arg(short, long = "input", value_name = "NAME=VALUE", value_parser = parse_input, required = true)]
        inputs: Vec<(String, f64)>,

        /// Rule file to use instead of the configured one
        #[arg(long, value_name = "FILE")]
        rules: Option<PathBuf>,

        /// Also print the firing strength of every rule
        #[arg(long)]
        fired: bool,
    },

    /// Load a rule file and report lines that fail to parse
    Check {
        /// Rule file, one rule per line
        #[arg(value_name = "RULES")]
        rules: PathBuf,
    },

    /// Print (or write) a default configuration file
    InitConfig {
        /// Write to this file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    /// NAME = VALUE lines
    Text,
    /// JSON object
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::InitConfig { output, force } = &cli.command {
        return init_config(output.as_deref(), *force);
    }

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(format) = cli.format {
        config.general.format = match format {
            FormatArg::Text => OutputFormat::Text,
            FormatArg::Json => OutputFormat::Json,
        };
    }
    if cli.verbose {
        config.general.log_level = LogLevel::Debug;
    } else if cli.quiet {
        config.general.log_level = LogLevel::Quiet;
    }
    init_tracing(config.general.log_level);

    match cli.command {
        Commands::Eval { inputs, rules, fired } => eval(config, &inputs, rules, fired),
        Commands::Check { rules } => check(&config, &rules),
        Commands::InitConfig { .. } => Ok(()),
    }
}

fn init_tracing(level: LogLevel) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.filter_directive()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<FuzzyConfig> {
    let config = match path {
        Some(path) => {
            let mut config = FuzzyConfig::load_from_file(path)
                .with_context(|| format!("Failed to load config: {}", path.display()))?;
            config.apply_env_overrides();
            config
        }
        None => FuzzyConfig::load().context("Failed to load config")?,
    };
    if config.variables.is_empty() {
        bail!("Configuration defines no variables; run `fuzzylogic init-config` for an example");
    }
    Ok(config)
}

fn parse_input(s: &str) -> Result<(String, f64), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{}'", s))?;
    let value = value
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid value for '{}': {}", name.trim(), e))?;
    Ok((name.trim().to_string(), value))
}

fn eval(mut config: FuzzyConfig, inputs: &[(String, f64)], rules: Option<PathBuf>, fired: bool) -> Result<()> {
    if let Some(path) = rules {
        let path = if path.is_absolute() {
            path
        } else {
            std::env::current_dir().context("Failed to resolve working directory")?.join(path)
        };
        config.rules.file = Some(path);
        config.rules.inline.clear();
    }

    let engine = config.build_engine().context("Failed to build fuzzy engine")?;
    let named = || inputs.iter().map(|(name, value)| (name.as_str(), *value));

    let outputs = engine.evaluate(named()).context("Evaluation failed")?;

    let activations = if fired {
        let fuzzified = engine.fuzzify(named())?;
        engine
            .rule_base()
            .rules()
            .iter()
            .map(|rule| {
                let strength = if rule.is_enabled() {
                    engine.inference_engine().rule_activation(rule, &fuzzified)?
                } else {
                    0.0
                };
                Ok((rule.to_string(), strength))
            })
            .collect::<fuzzylogic::FuzzyResult<Vec<_>>>()?
    } else {
        Vec::new()
    };

    match config.general.format {
        OutputFormat::Text => {
            for (rule, strength) in &activations {
                println!("{:.4}  {}", strength, rule);
            }
            if !activations.is_empty() {
                println!();
            }
            for (name, value) in &outputs {
                println!("{} = {:.4}", name, value);
            }
        }
        OutputFormat::Json => {
            let mut doc = serde_json::json!({
                "mode": engine.mode(),
                "outputs": outputs,
            });
            if fired {
                doc["rules"] = activations
                    .iter()
                    .map(|(rule, strength)| serde_json::json!({ "rule": rule, "strength": strength }))
                    .collect();
            }
            println!("{}", serde_json::to_string_pretty(&doc)?);
        }
    }

    Ok(())
}

fn check(config: &FuzzyConfig, path: &Path) -> Result<()> {
    let registry = config.build_variables().context("Invalid variable definitions")?;
    let parser = match config.engine.mode {
        EngineMode::Mamdani => RuleParser::mamdani(registry),
        EngineMode::Sugeno => RuleParser::sugeno(registry),
    };

    let sink = CollectingDiagnostics::new();
    let mut rule_base = RuleBase::with_parser(parser).with_diagnostics(sink.clone());
    let report = rule_base
        .load_from_file(path)
        .with_context(|| format!("Failed to read rule file: {}", path.display()))?;

    match config.general.format {
        OutputFormat::Text => {
            for diagnostic in sink.records() {
                println!("{}: {}", path.display(), diagnostic);
            }
            println!(
                "{} {} rules loaded, {} skipped",
                config.engine.mode, report.loaded, report.skipped
            );
        }
        OutputFormat::Json => {
            let skipped: Vec<String> = sink.records().iter().map(|d| d.to_string()).collect();
            let doc = serde_json::json!({
                "file": path.display().to_string(),
                "mode": config.engine.mode,
                "loaded": report.loaded,
                "skipped": skipped,
            });
            println!("{}", serde_json::to_string_pretty(&doc)?);
        }
    }

    if report.skipped > 0 {
        process::exit(1);
    }
    Ok(())
}

fn init_config(output: Option<&Path>, force: bool) -> Result<()> {
    let content = FuzzyConfig::default_config_content();
    match output {
        Some(path) => {
            if path.exists() && !force {
                bail!("{} already exists (use --force to overwrite)", path.display());
            }
            fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("Wrote default configuration to {}", path.display());
        }
        None => print!("{}", content),
    }
    Ok(())
}
