mod cli;
mod commands;
mod notifier;

use std::process::ExitCode;

use clap::Parser;
use env_logger::Env;
use xlpilot_core::{ConfigStore, XlPilotError, default_config_path};

use crate::cli::Cli;
use crate::notifier::StderrNotifier;

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn"))
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        },
    }
}

fn run(cli: Cli) -> anyhow::Result<bool> {
    let path = cli.config.unwrap_or_else(default_config_path);
    log::debug!("using configuration {}", path.display());

    // Store failures are shown by the notifier before they reach here.
    let mut store = match ConfigStore::open(path, Box::new(StderrNotifier)) {
        Ok(store) => store,
        Err(_) => return Ok(false),
    };
    match commands::run(&mut store, cli.command) {
        Err(err) if err.downcast_ref::<XlPilotError>().is_some() => Ok(false),
        result => result,
    }
}
