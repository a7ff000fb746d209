mod cli;
mod commands;
mod config;
mod engine;
mod ui;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use colored::Colorize;
use commands::sync::{self, SyncOptions};
use config::{Config, ConfigError, TOKEN_ENV};
use std::path::Path;
use std::process;
use stepdiff::{AutoConfirm, ConfirmCallback};

fn main() {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .format_timestamp(None)
        .init();

    let Some(config_path) = cli.config.as_deref() else {
        eprintln!("Usage: {} conf.json", program_name());
        process::exit(1);
    };

    if let Err(err) = run(&cli, config_path) {
        report_fatal(&err);
        process::exit(1);
    }
}

fn run(cli: &Cli, config_path: &Path) -> Result<()> {
    let ctx = Config::load(config_path)?.into_context(std::env::var(TOKEN_ENV).ok())?;
    log::info!("using {} for organization {}", cli.api_url, ctx.org);

    let service = buildkite::RestBackend::with_api_base(&ctx.token, &cli.api_url);
    let opts = SyncOptions {
        dry_run: cli.dry_run,
    };

    let mut confirm: Box<dyn ConfirmCallback> = if cli.yes {
        Box::new(AutoConfirm)
    } else {
        Box::new(engine::DialoguerConfirm)
    };

    let outcome = sync::run(&ctx, &service, opts, confirm.as_mut())?;
    log::debug!("sync finished: {outcome:?}");
    Ok(())
}

fn report_fatal(err: &anyhow::Error) {
    if let Some(config_err) = err.downcast_ref::<ConfigError>() {
        if let Some(headline) = config_err.headline() {
            eprintln!("{}", headline.red());
        }
        eprintln!("{config_err}");
        return;
    }
    ui::error(&format!("{err:#}"));
}

/// Basename of the running executable, for the usage line
fn program_name() -> String {
    std::env::args()
        .next()
        .as_deref()
        .map(Path::new)
        .and_then(Path::file_name)
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "stepsync".to_string())
}
