mod cli;
mod commands;
mod config;
mod error;
mod paths;

use std::fs::File;
use std::process::ExitCode;

use clap::Parser;
use simplelog::Config as LogConfig;
use simplelog::LevelFilter;
use simplelog::WriteLogger;

use crate::cli::Cli;
use crate::config::Config;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        config.level()
    };
    init_logging(level);

    match commands::run(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("{}", e);
            if e.is_retryable() {
                eprintln!("Re-run the command to retry.");
            }
            ExitCode::FAILURE
        }
    }
}

/// Logs to `<cache dir>/latest.log`, archiving the previous run's log.
fn init_logging(level: LevelFilter) {
    paths::rotate_logs();
    let Some(path) = paths::log_file() else { return };
    if let Some(dir) = path.parent() {
        let _ = std::fs::create_dir_all(dir);
    }

    match File::create(&path) {
        Ok(file) => {
            if let Err(e) = WriteLogger::init(level, LogConfig::default(), file) {
                eprintln!("Failed to initialize logger: {}", e);
            }
        }
        Err(e) => eprintln!("Failed to create log file {}: {}", path.display(), e),
    }
}
