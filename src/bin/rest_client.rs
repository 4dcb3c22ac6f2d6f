//! Raw REST variant: hand-built JSON requests, optional JSON echo.

use ortho_config::OrthoConfig;
use std::io;
use std::process::ExitCode;
use text_analytics::cli::{ClientArgs, try_init_tracing};
use text_analytics::{RestClient, ServiceConfig, repl};
use tracing::error;

fn main() -> ExitCode {
    if let Err(err) = try_init_tracing() {
        eprintln!("logging disabled: {err}");
    }
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "rest-client stopped");
            println!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = ClientArgs::load()?;
    let config = ServiceConfig::load(args.settings_path())?;
    let client = RestClient::new(config, args.client_options())?.with_echo(args.echo_json);
    repl::run(&client, io::stdin().lock(), &mut io::stdout().lock())?;
    Ok(())
}
