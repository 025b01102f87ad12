//! Command-line flags
//!
//! Flag spellings keep their historical underscore form (`--auth_user`, not
//! `--auth-user`) so existing scripts keep working.

use std::path::PathBuf;

use clap::Parser;

use crate::commands;

/// Command-line wrapper for a signal-cli-rest-api server
#[derive(Parser, Debug, Clone)]
#[command(name = "scrac", version, about = "Command-line wrapper for the Signal CLI REST API")]
pub struct Cli {
    /// Your phone number, e.g.: +4917612345678
    #[arg(long = "number")]
    pub number: Option<String>,

    /// URL of the Signal-CLI-REST-API server, e.g.: http://localhost:8080
    #[arg(long = "url")]
    pub url: Option<String>,

    /// HTTP-Basic-Auth user
    #[arg(long = "auth_user")]
    pub auth_user: Option<String>,

    /// HTTP-Basic-Auth password (prompted without echo when only a user is given)
    #[arg(long = "auth_password")]
    pub auth_password: Option<String>,

    /// Print results as JSON
    #[arg(long = "json")]
    pub json: bool,

    /// Load settings from a custom directory
    #[arg(long = "settings_path")]
    pub settings_path: Option<PathBuf>,

    /// Store number, url, auth_user, auth_password and verify_ssl in a
    /// settings file; the default location is ~/.config, override it with
    /// --settings_path or the SCRAC_SETTINGS environment variable
    #[arg(long = "store_settings")]
    pub store_settings: bool,

    /// Set to false/0/n/no to skip verification of SSL certificates
    /// (use for self-signed certificates)
    #[arg(long = "verify_ssl", default_value = "True")]
    pub verify_ssl: String,

    #[arg(help = commands::positional_help())]
    pub command: Vec<String>,
}
