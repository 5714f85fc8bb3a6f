//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand, ValueHint};
use vigil_common_config::{AuditConfig, ConfigLoader, Environment};
use vigil_common_log::{LogConfig, LogFormat, LogLevel};

use crate::output::OutputFormat;
use crate::replay;

/// Vigil - permission-change audit capture
#[derive(Debug, Parser)]
#[command(name = "vigil", author, version, about, long_about = None, propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Directory containing vigil.yaml
    #[arg(short, long, global = true, env = "VIGIL_CONFIG_DIR", value_hint = ValueHint::DirPath)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "text")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Publish events from a JSON-lines file and print the stored audit records
    Replay(ReplayCommand),

    /// Print the action taxonomy that would be registered
    Taxonomy,
}

/// Arguments for `vigil replay`.
#[derive(Debug, Parser)]
pub struct ReplayCommand {
    /// JSON-lines file of change events (`-` for stdin)
    #[arg(value_hint = ValueHint::FilePath)]
    pub events: PathBuf,

    /// Principal reported as the actor of every change
    #[arg(long, default_value = "system", env = "VIGIL_ACTOR")]
    pub actor: String,
}

impl Cli {
    /// Load config, set up logging and run the selected command.
    pub fn run(self) -> anyhow::Result<()> {
        Environment::init();
        let config = self.load_config()?;
        vigil_common_log::init(self.log_config(&config)).context("initializing logging")?;

        match &self.command {
            Command::Replay(cmd) => replay::run(cmd, &config, self.format),
            Command::Taxonomy => replay::print_taxonomy(&config, self.format),
        }
    }

    fn load_config(&self) -> anyhow::Result<AuditConfig> {
        let loader = match &self.config {
            Some(dir) => ConfigLoader::new(dir),
            None => ConfigLoader::from_env(),
        };
        loader
            .load()
            .with_context(|| format!("loading {}", loader.config_path().display()))
    }

    fn log_config(&self, config: &AuditConfig) -> LogConfig {
        // Env vars win over the config file; flags win over both.
        let mut log = LogConfig::from_env();
        if std::env::var_os("VIGIL_LOG_FORMAT").is_none() {
            log.format = LogFormat::parse(&config.log.format);
        }
        let env_level = ["VIGIL_LOG_LEVEL", "RUST_LOG"]
            .iter()
            .any(|var| std::env::var_os(var).is_some());
        log.level = match (self.quiet, self.verbose) {
            (true, _) => LogLevel::Error,
            (false, 0) if env_level => log.level,
            (false, 0) => LogLevel::parse(&config.log.level).unwrap_or(log.level),
            (false, 1) => LogLevel::Info,
            (false, 2) => LogLevel::Debug,
            (false, _) => LogLevel::Trace,
        };
        log
    }
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
    fn test_parse_replay() {
        let cli = Cli::parse_from(["vigil", "--format", "json", "replay", "events.jsonl", "--actor", "bob"]);
        assert_eq!(cli.format, OutputFormat::Json);
        match cli.command {
            Command::Replay(cmd) => {
                assert_eq!(cmd.events, PathBuf::from("events.jsonl"));
                assert_eq!(cmd.actor, "bob");
            }
            Command::Taxonomy => panic!("expected replay"),
        }
    }

    #[test]
    fn test_verbosity_overrides_config_level() {
        let cli = Cli::parse_from(["vigil", "-vv", "taxonomy"]);
        assert_eq!(cli.log_config(&AuditConfig::default()).level, LogLevel::Debug);

        let cli = Cli::parse_from(["vigil", "-q", "taxonomy"]);
        assert_eq!(cli.log_config(&AuditConfig::default()).level, LogLevel::Error);
    }
}
