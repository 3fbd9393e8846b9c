use clap::Parser;
use clipnest::cli::{Args, run_cli};
use clipnest::config::Config;
use clipnest::context::RunContext;
use clipnest::disk::FsSpaceProbe;
use clipnest::logging::init_logging;
use clipnest::output::OutputFormatter;
use clipnest::progress;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args = Args::parse();

    let config = match Config::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            OutputFormatter::error(&format!("Error loading configuration: {}", e));
            return ExitCode::FAILURE;
        }
    };

    let base_path = args.base_path();
    if !base_path.is_dir() {
        OutputFormatter::error(&format!("Not a directory: {}", base_path.display()));
        return ExitCode::FAILURE;
    }

    let level = if args.verbose {
        "debug"
    } else {
        config.logging.level.as_str()
    };
    let log_dir = config.logging.directory.as_deref().unwrap_or(&base_path);
    let log_guard = match init_logging(log_dir, level) {
        Ok(guard) => guard,
        Err(e) => {
            OutputFormatter::error(&format!(
                "Could not create log file in {}: {}",
                log_dir.display(),
                e
            ));
            return ExitCode::FAILURE;
        }
    };

    tracing::debug!("Writing log to {}", log_guard.path().display());

    let command = args.command(&config);
    let mut ctx = RunContext::new(progress::select(args.plain), Box::new(FsSpaceProbe));

    match run_cli(command, &base_path, &config, &mut ctx) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            OutputFormatter::error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}
