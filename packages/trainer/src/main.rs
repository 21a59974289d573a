use std::process::ExitCode;

use clap::Parser;

use deutsch_daily::cli::{self, Cli};
use deutsch_daily::config::Config;
use deutsch_daily::logging;

fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let mut config = Config::from_env();
    cli.apply(&mut config);

    let _log_guard = logging::init_tracing(&config.log_level, config.file_logs, &config.log_dir);

    match cli::run(&cli, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "command failed");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
