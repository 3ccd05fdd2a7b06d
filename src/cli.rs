//! CLI argument parsing for onto-rollup
//!
//! A single positional configuration path plus output and logging flags.

use std::path::PathBuf;

use clap::Parser;

pub use onto_rollup_core::format::OutputFormat;

/// Greedy information-content rollup of an ontology's annotating concepts
#[derive(Parser, Debug)]
#[command(name = "onto-rollup")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the TOML run configuration
    pub config: Option<PathBuf>,

    /// Output format for the run summary (human or json)
    #[arg(long, value_parser = parse_format, default_value = "human")]
    pub format: OutputFormat,

    /// Suppress the run summary
    #[arg(long, short)]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(long, short)]
    pub verbose: bool,

    /// Log level or filter directive (overrides --verbose)
    #[arg(long, env = "ONTO_ROLLUP_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,
}

/// Parse output format from string
fn parse_format(s: &str) -> Result<OutputFormat, String> {
    s.parse::<OutputFormat>().map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["onto-rollup"]).unwrap();
        assert!(cli.config.is_none());
        assert_eq!(cli.format, OutputFormat::Human);
        assert!(!cli.quiet);
        assert!(!cli.verbose);
        assert!(!cli.log_json);
    }

    #[test]
    fn test_all_flags() {
        let cli = Cli::try_parse_from([
            "onto-rollup",
            "run.toml",
            "--format",
            "JSON",
            "-q",
            "-v",
            "--log-level",
            "trace",
            "--log-json",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("run.toml")));
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(cli.quiet);
        assert!(cli.verbose);
        assert_eq!(cli.log_level.as_deref(), Some("trace"));
        assert!(cli.log_json);
    }

    #[test]
    fn test_unknown_format_rejected() {
        assert!(Cli::try_parse_from(["onto-rollup", "--format", "yaml"]).is_err());
    }
}
