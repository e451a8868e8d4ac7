use std::process::ExitCode;

use clap::Parser;
use vdock::cli::{execute, load_config, Cli};
use vdock::Engine;

fn main() -> ExitCode {
    vdock::logging::init();

    let cli = Cli::parse();
    let engine = Engine::new(load_config(cli.config.as_deref()));
    engine.load_plugins();

    let outcome = execute(&cli.command, &engine, std::io::stdin().lock());
    engine.shutdown();

    match serde_json::to_string_pretty(&outcome.output) {
        Ok(text) => println!("{text}"),
        Err(e) => {
            tracing::error!("Failed to serialize output: {}", e);
            return ExitCode::FAILURE;
        }
    }

    if outcome.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
