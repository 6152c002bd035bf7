//! Configuration loading and representation.
//!
//! Everything comes from environment variables. `main` may load a `.env` file
//! first; this module only reads the process environment.

use thiserror::Error;

pub use defaultdesk_observability::LogFormat;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;
pub const DEFAULT_MAX_DB_CONNECTIONS: u32 = 10;
const DEV_JWT_SECRET: &str = "dev-secret";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: '{value}' ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub port: u16,
    /// `None` selects the in-memory store.
    pub database_url: Option<String>,
    pub max_db_connections: u32,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub log_format: LogFormat,
}

impl core::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AppConfig")
            .field("port", &self.port)
            .field("database_url", &self.database_url.as_ref().map(|_| "<set>"))
            .field("max_db_connections", &self.max_db_connections)
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl_hours", &self.token_ttl_hours)
            .field("log_format", &self.log_format)
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            database_url: None,
            max_db_connections: DEFAULT_MAX_DB_CONNECTIONS,
            jwt_secret: DEV_JWT_SECRET.to_string(),
            token_ttl_hours: DEFAULT_TOKEN_TTL_HOURS,
            log_format: LogFormat::Json,
        }
    }
}

impl AppConfig {
    /// Read `SERVER_PORT`, `DATABASE_URL`, `DB_MAX_CONNECTIONS`, `JWT_SECRET`,
    /// `TOKEN_TTL_HOURS` and `LOG_FORMAT` from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`AppConfig::from_env`] with an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let port = match get("SERVER_PORT") {
            Some(raw) => parse_number("SERVER_PORT", raw)?,
            None => defaults.port,
        };

        let max_db_connections = match get("DB_MAX_CONNECTIONS") {
            Some(raw) => parse_number("DB_MAX_CONNECTIONS", raw)?,
            None => defaults.max_db_connections,
        };

        let token_ttl_hours = match get("TOKEN_TTL_HOURS") {
            Some(raw) => {
                let hours: i64 = parse_number("TOKEN_TTL_HOURS", raw.clone())?;
                if hours <= 0 {
                    return Err(ConfigError::Invalid {
                        key: "TOKEN_TTL_HOURS",
                        value: raw,
                        reason: "must be positive".to_string(),
                    });
                }
                hours
            }
            None => defaults.token_ttl_hours,
        };

        let log_format = match get("LOG_FORMAT") {
            Some(raw) => raw.parse().map_err(|reason| ConfigError::Invalid {
                key: "LOG_FORMAT",
                value: raw.clone(),
                reason,
            })?,
            None => defaults.log_format,
        };

        let jwt_secret = get("JWT_SECRET").unwrap_or_else(|| defaults.jwt_secret.clone());

        Ok(Self {
            port,
            database_url: get("DATABASE_URL"),
            max_db_connections,
            jwt_secret,
            token_ttl_hours,
            log_format,
        })
    }

    /// Whether `JWT_SECRET` was left unset.
    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }
}

fn parse_number<T>(key: &'static str, raw: String) -> Result<T, ConfigError>
where
    T: core::str::FromStr,
    T::Err: core::fmt::Display,
{
    raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        reason: e.to_string(),
        value: raw.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn empty_environment_gives_defaults() {
        assert_eq!(from(&[]).unwrap(), AppConfig::default());
    }

    #[test]
    fn reads_all_keys() {
        let config = from(&[
            ("SERVER_PORT", "9000"),
            ("DATABASE_URL", "postgres://localhost/defaults"),
            ("JWT_SECRET", "s3cret"),
            ("TOKEN_TTL_HOURS", "2"),
            ("LOG_FORMAT", "pretty"),
        ])
        .unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/defaults"));
        assert_eq!(config.jwt_secret, "s3cret");
        assert_eq!(config.token_ttl_hours, 2);
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            from(&[("SERVER_PORT", "eighty")]),
            Err(ConfigError::Invalid { key: "SERVER_PORT", .. })
        ));
        assert!(matches!(
            from(&[("TOKEN_TTL_HOURS", "0")]),
            Err(ConfigError::Invalid { key: "TOKEN_TTL_HOURS", .. })
        ));
        assert!(from(&[("LOG_FORMAT", "xml")]).is_err());
    }

    #[test]
    fn debug_output_hides_the_secret() {
        let config = from(&[("JWT_SECRET", "hunter22")]).unwrap();
        assert!(!format!("{config:?}").contains("hunter22"));
        assert!(!config.uses_dev_secret());
        assert!(AppConfig::default().uses_dev_secret());
    }
}
