use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "stepsync")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(about = "Sync one step definition across every Buildkite pipeline in an organization", long_about = None)]
pub struct Cli {
    /// Path to the JSON config file (org, token, repositories.exclude, step)
    pub config: Option<PathBuf>,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long)]
    pub quiet: bool,

    /// Update every pipeline with changes without asking
    #[arg(short, long)]
    pub yes: bool,

    /// Show what would change, then stop
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Buildkite REST API base URL
    #[arg(
        long,
        env = "BUILDKITE_API_URL",
        default_value = buildkite::DEFAULT_API_BASE,
        hide_default_value = true
    )]
    pub api_url: String,
}

impl Cli {
    pub fn log_level(&self) -> log::LevelFilter {
        if self.quiet {
            return log::LevelFilter::Error;
        }
        match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
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
    fn test_config_is_optional_positional() {
        let cli = Cli::try_parse_from(["stepsync"]).unwrap();
        assert!(cli.config.is_none());

        let cli = Cli::try_parse_from(["stepsync", "conf.json"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("conf.json")));
    }

    #[test]
    fn test_flags() {
        let cli = Cli::try_parse_from(["stepsync", "-y", "-n", "-vv", "conf.json"]).unwrap();
        assert!(cli.yes);
        assert!(cli.dry_run);
        assert_eq!(cli.log_level(), log::LevelFilter::Debug);

        let cli = Cli::try_parse_from(["stepsync", "-q", "-vvv", "conf.json"]).unwrap();
        assert_eq!(cli.log_level(), log::LevelFilter::Error);
    }

    #[test]
    fn test_api_url_flag() {
        let cli =
            Cli::try_parse_from(["stepsync", "--api-url", "http://localhost/v2", "c.json"]).unwrap();
        assert_eq!(cli.api_url, "http://localhost/v2");
    }
}
