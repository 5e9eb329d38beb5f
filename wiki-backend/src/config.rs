use serde::Deserialize;
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable names - single source of truth
pub mod env_vars {
    /// Site title shown in the navigation bar. Takes precedence over the JSON config file.
    pub const SITENAME: &str = "SITENAME";
    /// Path of the JSON config file consulted when SITENAME is unset.
    pub const CONFIG_FILE: &str = "CONFIG_FILE";
    pub const PORT: &str = "PORT";
    pub const DATABASE_URL: &str = "DATABASE_URL";
    pub const IMAGES_DIR: &str = "IMAGES_DIR";
    /// Seconds slept after each category update phase.
    pub const CATEGORY_UPDATE_INTERVAL_SECS: &str = "CATEGORY_UPDATE_INTERVAL_SECS";
    pub const ADMIN_USERNAME: &str = "ADMIN_USERNAME";
    pub const ADMIN_PASSWORD: &str = "ADMIN_PASSWORD";
}

/// Default values
pub mod defaults {
    pub const PORT: u16 = 8080;
    pub const DATABASE_URL: &str = "./.db/wiki.db";
    pub const CONFIG_FILE: &str = "config.json";
    pub const IMAGES_DIR: &str = "images";
    pub const CATEGORY_UPDATE_INTERVAL_SECS: u64 = 20;
}

/// Why the configuration could not be assembled at boot.
#[derive(Debug)]
pub enum ConfigError {
    /// Neither SITENAME nor a readable config file was available.
    MissingSiteTitle { path: PathBuf, reason: String },
    InvalidNumber { var: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingSiteTitle { path, reason } => write!(
                f,
                "{} is not set and {} could not supply siteTitle: {}",
                env_vars::SITENAME,
                path.display(),
                reason
            ),
            ConfigError::InvalidNumber { var, value } => {
                write!(f, "{} must be a valid number, got {:?}", var, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Shape of `config.json`.
#[derive(Debug, Deserialize)]
struct FileConfig {
    #[serde(rename = "siteTitle")]
    site_title: String,
}

/// Admin login credentials. Login is impossible when these are absent.
#[derive(Clone)]
pub struct AdminCredentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Immutable process configuration, built once in `main` and shared through `AppState`.
#[derive(Clone, Debug)]
pub struct Config {
    pub site_title: String,
    pub port: u16,
    pub database_url: String,
    pub images_dir: PathBuf,
    pub category_update_interval: Duration,
    pub admin: Option<AdminCredentials>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let config_file = env::var(env_vars::CONFIG_FILE)
            .unwrap_or_else(|_| defaults::CONFIG_FILE.to_string());
        let site_title = match env::var(env_vars::SITENAME) {
            Ok(title) if !title.is_empty() => title,
            _ => site_title_from_file(Path::new(&config_file))?,
        };

        let port = parse_var(env_vars::PORT, defaults::PORT)?;
        let interval_secs = parse_var(
            env_vars::CATEGORY_UPDATE_INTERVAL_SECS,
            defaults::CATEGORY_UPDATE_INTERVAL_SECS,
        )?;

        let admin = match (
            env::var(env_vars::ADMIN_USERNAME),
            env::var(env_vars::ADMIN_PASSWORD),
        ) {
            (Ok(username), Ok(password)) if !username.is_empty() && !password.is_empty() => {
                Some(AdminCredentials { username, password })
            }
            _ => {
                log::warn!(
                    "{} / {} not set - admin login is disabled",
                    env_vars::ADMIN_USERNAME,
                    env_vars::ADMIN_PASSWORD
                );
                None
            }
        };

        Ok(Self {
            site_title,
            port,
            database_url: env::var(env_vars::DATABASE_URL)
                .unwrap_or_else(|_| defaults::DATABASE_URL.to_string()),
            images_dir: PathBuf::from(
                env::var(env_vars::IMAGES_DIR).unwrap_or_else(|_| defaults::IMAGES_DIR.to_string()),
            ),
            category_update_interval: Duration::from_secs(interval_secs),
            admin,
        })
    }

    /// Configuration for tests: in-memory database, short update interval.
    #[cfg(test)]
    pub fn for_tests(site_title: &str) -> Self {
        Self {
            site_title: site_title.to_string(),
            port: defaults::PORT,
            database_url: ":memory:".to_string(),
            images_dir: PathBuf::from(defaults::IMAGES_DIR),
            category_update_interval: Duration::from_millis(10),
            admin: Some(AdminCredentials {
                username: "admin".to_string(),
                password: "hunter2".to_string(),
            }),
        }
    }
}

/// Read `siteTitle` from the JSON config file.
pub fn site_title_from_file(path: &Path) -> Result<String, ConfigError> {
    let missing = |reason: String| ConfigError::MissingSiteTitle {
        path: path.to_path_buf(),
        reason,
    };
    let data = std::fs::read_to_string(path).map_err(|e| missing(e.to_string()))?;
    let parsed: FileConfig = serde_json::from_str(&data).map_err(|e| missing(e.to_string()))?;
    if parsed.site_title.trim().is_empty() {
        return Err(missing("siteTitle is empty".to_string()));
    }
    Ok(parsed.site_title)
}

fn parse_var<T: std::str::FromStr>(var: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(var) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { var, value }),
        Err(_) => Ok(default),
    }
}
