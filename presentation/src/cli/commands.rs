//! CLI command definitions

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for panel results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Transcript, relationships and the synthesis document
    Full,
    /// Only the synthesis document
    Synthesis,
    /// The session snapshot as JSON
    Json,
}

impl From<OutputFormat> for panel_domain::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Full => panel_domain::OutputFormat::Full,
            OutputFormat::Synthesis => panel_domain::OutputFormat::Synthesis,
            OutputFormat::Json => panel_domain::OutputFormat::Json,
        }
    }
}

/// Text generator used for persona utterances
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GeneratorChoice {
    /// Canned per-persona lines
    Scripted,
    /// Deterministic text derived from each request
    Echo,
    /// External program given by --command
    Command,
}

impl GeneratorChoice {
    pub fn as_str(&self) -> &'static str {
        match self {
            GeneratorChoice::Scripted => "scripted",
            GeneratorChoice::Echo => "echo",
            GeneratorChoice::Command => "command",
        }
    }
}

/// CLI arguments for persona-panel
#[derive(Parser, Debug)]
#[command(name = "persona-panel")]
#[command(author, version, about = "Persona Panel - simulated experts discuss a topic and write a brief")]
#[command(long_about = r#"
Persona Panel seats a team of simulated personas around a topic and lets them
talk it through. Personas take turns, interrupt, agree and clash; the
discussion moves through four phases:

1. Discovery: understand the problem
2. Analysis & Insights: dig into causes and data
3. Strategic Recommendations: propose what to do
4. Final Synthesis: a structured brief built from the transcript

Configuration files are loaded from (in priority order):
1. --config <path>     Explicit config file
2. ./panel.toml        Project-level config
3. ~/.config/persona-panel/config.toml   Global config

Example:
  persona-panel "Our customer acquisition cost doubled in six months"
  persona-panel -p priya -p marcus -p sarah --seed 42 --pacing 0 "Pricing review"
  persona-panel --generator command --command llm-bridge -- "Launch plan for Q3"
"#)]
pub struct Cli {
    /// The topic to discuss (not required with --show-config or --list-personas)
    pub topic: Option<String>,

    /// Personas to seat (by id; can be specified multiple times, default: all)
    #[arg(short, long = "persona", value_name = "ID")]
    pub personas: Vec<String>,

    /// Seed for reproducible turn order and timing
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Wall-clock scale of thinking time (0 = no waiting, 1 = real time)
    #[arg(long, value_name = "FACTOR")]
    pub pacing: Option<f64>,

    /// Text generator for persona utterances
    #[arg(short, long, value_enum)]
    pub generator: Option<GeneratorChoice>,

    /// Program (and arguments) for the command generator
    #[arg(long, value_name = "PROGRAM", num_args = 1.., allow_hyphen_values = true)]
    pub command: Vec<String>,

    /// Output format
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Write every panel event to this JSONL file
    #[arg(long, value_name = "PATH")]
    pub events: Option<PathBuf>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Write logs to a daily rotated file in this directory
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,

    /// List the configured personas and exit
    #[arg(long)]
    pub list_personas: bool,
}

impl Cli {
    /// Default tracing filter for the verbosity flags
    pub fn log_filter(&self) -> &'static str {
        match (self.quiet, self.verbose) {
            (true, _) => "error",
            (false, 0) => "warn",
            (false, 1) => "info",
            (false, 2) => "debug",
            (false, _) => "trace",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("persona-panel").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_topic_and_personas() {
        let cli = parse(&["-p", "priya", "--persona", "marcus", "CAC doubled"]);
        assert_eq!(cli.topic.as_deref(), Some("CAC doubled"));
        assert_eq!(cli.personas, vec!["priya", "marcus"]);
        assert!(cli.output.is_none());
        assert!(cli.generator.is_none());
    }

    #[test]
    fn test_run_options() {
        let cli = parse(&[
            "--seed", "42", "--pacing", "0", "-o", "json", "-g", "echo", "--events", "out.jsonl",
            "Topic",
        ]);
        assert_eq!(cli.seed, Some(42));
        assert_eq!(cli.pacing, Some(0.0));
        assert_eq!(cli.output, Some(OutputFormat::Json));
        assert_eq!(cli.generator, Some(GeneratorChoice::Echo));
        assert_eq!(cli.events, Some(PathBuf::from("out.jsonl")));
    }

    #[test]
    fn test_command_collects_arguments() {
        let cli = parse(&["-g", "command", "--command", "llm", "-m", "fast", "--", "Topic"]);
        assert_eq!(cli.command, vec!["llm", "-m", "fast"]);
        assert_eq!(cli.topic.as_deref(), Some("Topic"));
    }

    #[test]
    fn test_log_filter_levels() {
        assert_eq!(parse(&[]).log_filter(), "warn");
        assert_eq!(parse(&["-vv"]).log_filter(), "debug");
        assert_eq!(parse(&["-q", "-vvv"]).log_filter(), "error");
    }

    #[test]
    fn test_output_maps_to_domain() {
        assert_eq!(
            panel_domain::OutputFormat::from(OutputFormat::Full),
            panel_domain::OutputFormat::Full
        );
    }
}
