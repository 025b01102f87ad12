//! Settings resolution and persistence
//!
//! Merge order is flags first, then the settings file on top: values present
//! in the file take precedence over flags given on the command line. This
//! mirrors the historical behavior of the tool and must not be reversed
//! without breaking existing setups.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::cli::Cli;
use crate::error::UsageError;

/// Fixed settings file name, resolved inside the settings directory
pub const SETTINGS_FILE_NAME: &str = "signal-cli-rest-api-client-settings.json";

/// Environment variable overriding the settings directory
pub const SETTINGS_ENV_VAR: &str = "SCRAC_SETTINGS";

/// Source for the HTTP basic auth password when only a user is configured
///
/// Injected into [`resolve`] so tests can substitute a fake source.
pub trait PasswordSource {
    fn read_password(&self, prompt: &str) -> anyhow::Result<String>;
}

/// Interactive prompt, input not echoed
pub struct TerminalPrompt;

impl PasswordSource for TerminalPrompt {
    fn read_password(&self, prompt: &str) -> anyhow::Result<String> {
        let password = dialoguer::Password::new()
            .with_prompt(prompt)
            .interact()
            .context("failed to read password")?;
        Ok(password)
    }
}

/// Relevant process environment, captured once at startup
#[derive(Debug, Clone, Default)]
pub struct ProcessEnv {
    /// SCRAC_SETTINGS
    pub settings_dir: Option<PathBuf>,
    /// HOME
    pub home: Option<PathBuf>,
}

impl ProcessEnv {
    pub fn from_process() -> Self {
        Self {
            settings_dir: std::env::var_os(SETTINGS_ENV_VAR).map(PathBuf::from),
            home: std::env::var_os("HOME").map(PathBuf::from),
        }
    }
}

/// Locate the settings file: explicit flag, then SCRAC_SETTINGS, then ~/.config
pub fn settings_file(flag: Option<&Path>, env: &ProcessEnv) -> PathBuf {
    let dir = flag
        .map(Path::to_path_buf)
        .or_else(|| env.settings_dir.clone())
        .unwrap_or_else(|| env.home.clone().unwrap_or_default().join(".config"));
    dir.join(SETTINGS_FILE_NAME)
}

/// Persisted settings, stored as JSON
///
/// Every field is optional so partial files merge cleanly.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoredSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_settings: Option<bool>,
    /// Older files carry the raw flag string, newer ones a bool
    #[serde(
        default,
        deserialize_with = "verify_ssl_from_bool_or_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub verify_ssl: Option<bool>,
}

impl StoredSettings {
    /// Load the settings file if one exists at `path`
    pub fn load(path: &Path) -> anyhow::Result<Option<Self>> {
        if !path.is_file() {
            return Ok(None);
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file {}", path.display()))?;
        let settings = serde_json::from_str(&content)
            .with_context(|| format!("invalid settings JSON in {}", path.display()))?;

        debug!("Loaded settings from {}", path.display());
        Ok(Some(settings))
    }
}

fn verify_ssl_from_bool_or_string<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;

    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    match value {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::Bool(b)) => Ok(Some(b)),
        Some(serde_json::Value::String(s)) => Ok(Some(parse_verify_ssl(&s))),
        Some(other) => Err(D::Error::custom(format!(
            "verify_ssl must be a bool or string, got {}",
            other
        ))),
    }
}

/// Only false/0/n/no (any case) disable certificate verification
pub fn parse_verify_ssl(value: &str) -> bool {
    !matches!(value.to_lowercase().as_str(), "false" | "0" | "n" | "no")
}

/// Merged configuration for one invocation, never mutated afterwards
#[derive(Debug, Clone)]
pub struct EffectiveConfig {
    pub url: String,
    pub number: String,
    pub auth_user: Option<String>,
    pub auth_password: Option<String>,
    pub verify_ssl: bool,
    pub json: bool,
    pub store_settings: bool,
}

/// Merge flags and the settings file into an [`EffectiveConfig`]
///
/// Pure apart from the password source, which is only consulted when an auth
/// user is configured without a password.
pub fn resolve(
    cli: &Cli,
    file: Option<&StoredSettings>,
    passwords: &dyn PasswordSource,
) -> anyhow::Result<EffectiveConfig> {
    let empty = StoredSettings::default();
    let file = file.unwrap_or(&empty);

    let url = file.url.clone().or_else(|| cli.url.clone());
    let number = file.number.clone().or_else(|| cli.number.clone());
    let auth_user = file.auth_user.clone().or_else(|| cli.auth_user.clone());
    let mut auth_password = file.auth_password.clone().or_else(|| cli.auth_password.clone());
    let verify_ssl = file
        .verify_ssl
        .unwrap_or_else(|| parse_verify_ssl(&cli.verify_ssl));
    let json = file.json.unwrap_or(cli.json);
    let store_settings = file.store_settings.unwrap_or(cli.store_settings);

    let (Some(url), Some(number)) = (
        url.filter(|u| !u.is_empty()),
        number.filter(|n| !n.is_empty()),
    ) else {
        return Err(UsageError::ConfigurationMissing.into());
    };

    if auth_user.is_some() && auth_password.is_none() {
        auth_password = Some(passwords.read_password("HTTP BASIC AUTH Password")?);
    }

    Ok(EffectiveConfig {
        url,
        number,
        auth_user,
        auth_password,
        verify_ssl,
        json,
        store_settings,
    })
}

/// Write the merged configuration to `path`
///
/// The command tokens and the settings path itself are not persisted.
pub fn store(config: &EffectiveConfig, path: &Path) -> anyhow::Result<()> {
    let settings = StoredSettings {
        number: Some(config.number.clone()),
        url: Some(config.url.clone()),
        auth_user: config.auth_user.clone(),
        auth_password: config.auth_password.clone(),
        json: Some(config.json),
        store_settings: Some(config.store_settings),
        verify_ssl: Some(config.verify_ssl),
    };

    let content = serde_json::to_string_pretty(&settings)?;
    fs::write(path, content)
        .with_context(|| format!("failed to write settings file {}", path.display()))?;

    info!("Stored settings at {}", path.display());
    Ok(())
}
