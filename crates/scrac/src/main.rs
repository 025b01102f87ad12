//! scrac: command-line front-end for a signal-cli-rest-api server
//!
//! Resolves connection settings from flags, the environment and a persisted
//! settings file, then dispatches a single command to the REST API client.
//!
//! Usage:
//!   scrac --url http://localhost:8080 --number +4917612345678 send "hello"
//!   scrac send help
//!   scrac --store_settings --url ... --number ...

mod cli;
mod commands;
mod error;
mod settings;

use clap::{CommandFactory, Parser};
use scrac_client::{BasicAuth, SignalApiClient};
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::commands::Dispatched;
use crate::error::UsageError;
use crate::settings::{PasswordSource, ProcessEnv, StoredSettings, TerminalPrompt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries command results only.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Cli::parse();
    let env = ProcessEnv::from_process();

    match run(args, &env, &TerminalPrompt).await {
        Ok(()) => Ok(()),
        Err(err) => match err.downcast_ref::<UsageError>() {
            Some(usage) => {
                eprintln!("{usage}");
                let _ = Cli::command().print_help();
                std::process::exit(1);
            }
            // Client and I/O errors propagate as-is.
            None => Err(err),
        },
    }
}

async fn run(args: Cli, env: &ProcessEnv, passwords: &dyn PasswordSource) -> anyhow::Result<()> {
    let settings_file = settings::settings_file(args.settings_path.as_deref(), env);
    let stored = StoredSettings::load(&settings_file)?;
    let config = settings::resolve(&args, stored.as_ref(), passwords)?;

    if config.store_settings {
        settings::store(&config, &settings_file)?;
        if args.command.is_empty() {
            return Ok(());
        }
    }

    if args.command.is_empty() {
        return Err(UsageError::NoCommandSupplied.into());
    }

    let auth = config.auth_user.as_ref().map(|user| BasicAuth {
        user: user.clone(),
        password: config.auth_password.clone().unwrap_or_default(),
    });
    let client = SignalApiClient::new(&config.url, &config.number, auth, config.verify_ssl)?;

    match commands::dispatch(&client, &args.command).await? {
        Dispatched::Help(text) => println!("{text}"),
        Dispatched::Output(Some(result)) => println!("{}", commands::render(&result, config.json)),
        Dispatched::Output(None) => {}
    }

    Ok(())
}
