//! Shared configuration for the camfleet CLI.
//!
//! TOML profiles, credential resolution (env + plaintext), and
//! translation to the transport settings `camfleet-api` consumes.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no credentials configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named inventory-service profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default)]
    pub insecure: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            insecure: false,
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_timeout() -> u64 {
    10
}

/// A named inventory-service profile.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Service base URL (e.g., "http://127.0.0.1:8004").
    pub server: String,

    /// Username for login.
    pub username: Option<String>,

    /// Password (plaintext -- prefer the CAMFLEET_PASSWORD env var).
    pub password: Option<String>,

    /// Where the session token is persisted. Defaults to a per-profile
    /// file under the config directory.
    pub token_file: Option<PathBuf>,

    /// Override insecure TLS setting.
    pub insecure: Option<bool>,

    /// Override timeout (seconds).
    pub timeout: Option<u64>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

fn config_dir() -> PathBuf {
    ProjectDirs::from("io", "camfleet", "camfleet")
        .map_or_else(dirs_fallback, |dirs| dirs.config_dir().to_path_buf())
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("camfleet");
    p
}

// ── Config loading / saving ─────────────────────────────────────────

/// Load the full Config from file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    let path = config_path();

    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(&path))
        .merge(Env::prefixed("CAMFLEET_").split("_"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    let path = config_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(&path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve login credentials: env var first, then plaintext config.
pub fn resolve_credentials(
    profile: &Profile,
    profile_name: &str,
) -> Result<(String, SecretString), ConfigError> {
    let username = profile
        .username
        .clone()
        .or_else(|| std::env::var("CAMFLEET_USERNAME").ok())
        .ok_or_else(|| ConfigError::NoCredentials {
            profile: profile_name.into(),
        })?;

    if let Ok(pw) = std::env::var("CAMFLEET_PASSWORD") {
        return Ok((username, SecretString::from(pw)));
    }

    if let Some(ref pw) = profile.password {
        return Ok((username, SecretString::from(pw.clone())));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

// ── Client settings ─────────────────────────────────────────────────

/// Resolved settings a consumer needs to build an `ApiClient`.
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub url: url::Url,
    pub timeout: Duration,
    pub insecure: bool,
    pub token_path: PathBuf,
}

/// Build `ClientSettings` from a profile, applying global defaults.
pub fn profile_to_client_settings(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<ClientSettings, ConfigError> {
    let url: url::Url = profile.server.parse().map_err(|_| ConfigError::Validation {
        field: "server".into(),
        reason: format!("invalid URL: {}", profile.server),
    })?;

    let token_path = profile
        .token_file
        .clone()
        .unwrap_or_else(|| config_dir().join(format!("{profile_name}.token.json")));

    Ok(ClientSettings {
        url,
        timeout: Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout)),
        insecure: profile.insecure.unwrap_or(defaults.insecure),
        token_path,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn profile(server: &str) -> Profile {
        Profile {
            server: server.into(),
            ..Profile::default()
        }
    }

    #[test]
    fn settings_apply_defaults_and_overrides() {
        let mut p = profile("http://10.0.0.1:8004");
        let defaults = Defaults::default();

        let settings = profile_to_client_settings(&p, "default", &defaults).unwrap();
        assert_eq!(settings.timeout, Duration::from_secs(10));
        assert!(!settings.insecure);
        assert!(settings.token_path.ends_with("default.token.json"));

        p.timeout = Some(30);
        p.insecure = Some(true);
        let settings = profile_to_client_settings(&p, "default", &defaults).unwrap();
        assert_eq!(settings.timeout, Duration::from_secs(30));
        assert!(settings.insecure);
    }

    #[test]
    fn invalid_server_url_is_rejected() {
        let p = profile("not a url");
        let err = profile_to_client_settings(&p, "default", &Defaults::default()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { .. }));
    }

    #[test]
    fn plaintext_password_resolves_when_env_is_unset() {
        let p = Profile {
            server: "http://10.0.0.1".into(),
            username: Some("admin".into()),
            password: Some("pw".into()),
            ..Profile::default()
        };

        // Only meaningful when the env override is not set in the test
        // environment.
        if std::env::var("CAMFLEET_PASSWORD").is_err() && std::env::var("CAMFLEET_USERNAME").is_err()
        {
            let (user, _pw) = resolve_credentials(&p, "default").unwrap();
            assert_eq!(user, "admin");
        }
    }

    #[test]
    fn missing_credentials_are_an_error() {
        if std::env::var("CAMFLEET_USERNAME").is_ok() {
            return;
        }
        let p = profile("http://10.0.0.1");
        let err = resolve_credentials(&p, "default").unwrap_err();
        assert!(matches!(err, ConfigError::NoCredentials { .. }));
    }
}
