use std::process::ExitCode;

use clap::Parser;
use servedir::cli::Cli;
use servedir::server::{serve_forever, shutdown_signal};
use servedir::{logger, Config, ServerError};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            logger::log_error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), ServerError> {
    let cli = Cli::parse();
    let cfg = Config::load(&cli)?;
    logger::init(&cfg).map_err(ServerError::Logger)?;

    // Tokio runtime sized by the workers setting
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build().map_err(ServerError::Runtime)?;

    runtime.block_on(serve_forever(&cfg, shutdown_signal()))
}
