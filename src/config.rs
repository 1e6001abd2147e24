// Dashboard settings, loaded from environment variables (and `.env`).
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;
use crate::source::Credentials;

pub const DEFAULT_WORKBOOK: &str = "Controle de Presenca";
pub const DEFAULT_WORKSHEET: &str = "DATA_DASHBOARD";
pub const DEFAULT_CREDENTIALS_FILE: &str = "credentials.json";
pub const DEFAULT_CACHE_TTL_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct Settings {
    pub workbook: PathBuf,
    pub worksheet: String,
    pub cache_ttl: Duration,
    pub credentials: Credentials,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            workbook: PathBuf::from(DEFAULT_WORKBOOK),
            worksheet: DEFAULT_WORKSHEET.to_string(),
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            credentials: Credentials::File(PathBuf::from(DEFAULT_CREDENTIALS_FILE)),
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build settings from any key lookup. Missing keys fall back to the
    /// defaults; an embedded service account wins over a credentials file.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Settings::default();

        let workbook = lookup("DASHBOARD_WORKBOOK")
            .map(PathBuf::from)
            .unwrap_or(defaults.workbook);
        let worksheet = lookup("DASHBOARD_WORKSHEET").unwrap_or(defaults.worksheet);

        let cache_ttl = match lookup("DASHBOARD_CACHE_TTL_SECS") {
            Some(raw) => {
                let secs = raw
                    .trim()
                    .parse::<u64>()
                    .map_err(|_| ConfigError::InvalidValue {
                        key: "DASHBOARD_CACHE_TTL_SECS",
                        value: raw.clone(),
                    })?;
                Duration::from_secs(secs)
            }
            None => defaults.cache_ttl,
        };

        let credentials = match lookup("DASHBOARD_SERVICE_ACCOUNT_JSON") {
            Some(json) if !json.trim().is_empty() => Credentials::Embedded(json),
            _ => lookup("DASHBOARD_CREDENTIALS_FILE")
                .map(|p| Credentials::File(PathBuf::from(p)))
                .unwrap_or(defaults.credentials),
        };

        Ok(Settings {
            workbook,
            worksheet,
            cache_ttl,
            credentials,
        })
    }
}
