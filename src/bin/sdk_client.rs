//! Typed client variant.

use ortho_config::OrthoConfig;
use std::io;
use std::process::ExitCode;
use text_analytics::cli::{ClientArgs, try_init_tracing};
use text_analytics::{ServiceConfig, TextAnalyticsClient, repl};
use tracing::error;

fn main() -> ExitCode {
    if let Err(err) = try_init_tracing() {
        eprintln!("logging disabled: {err}");
    }
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "sdk-client stopped");
            println!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = ClientArgs::load()?;
    let config = ServiceConfig::load(args.settings_path())?;
    if args.echo_json {
        tracing::info!("--echo-json only affects rest-client");
    }
    let client = TextAnalyticsClient::new(config, args.client_options())?;
    repl::run(&client, io::stdin().lock(), &mut io::stdout().lock())?;
    Ok(())
}
