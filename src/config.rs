//! Runtime configuration read from environment variables.
//!
//! `main` loads a `.env` file first (via `dotenv`), then calls
//! [`Config::from_env`]. Parsing goes through [`Config::from_lookup`] so tests
//! can supply variables without touching the process environment.

use std::env;
use std::fmt;
use std::str::FromStr;

/// Deployment flavor. Controls error verbosity, default log level, SQL
/// statement logging and whether a missing database falls back to memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn is_development(self) -> bool {
        self == Environment::Development
    }

    /// Filter passed to `env_logger` when `RUST_LOG` is unset.
    pub fn default_log_filter(self) -> &'static str {
        match self {
            Environment::Development => "debug",
            Environment::Production => "info",
        }
    }
}

impl FromStr for Environment {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" | "test" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is not set.
    Missing(&'static str),
    /// A variable is set but cannot be parsed.
    Invalid { key: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "{} must be set", key),
            ConfigError::Invalid { key, value } => {
                write!(f, "{} has an invalid value: {:?}", key, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone)]
pub struct Config {
    /// `None` only in development, where the in-memory store is used instead.
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub server_port: u16,
    pub server_host: String,
    pub jwt_secret: String,
    pub jwt_expiration_hours: i64,
    pub bcrypt_cost: u32,
    pub environment: Environment,
}

/// Costs `bcrypt` accepts; anything else fails on every hash.
const BCRYPT_COST_RANGE_MIN: u32 = 4;
const BCRYPT_COST_RANGE_MAX: u32 = 31;

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let environment = match get("APP_ENV") {
            Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
                key: "APP_ENV",
                value,
            })?,
            None => Environment::Development,
        };

        let database_url = get("DATABASE_URL");
        if database_url.is_none() && !environment.is_development() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }

        let bcrypt_cost = get("BCRYPT_COST").unwrap_or_else(|| bcrypt::DEFAULT_COST.to_string());
        let bcrypt_cost = match parse::<u32>("BCRYPT_COST", bcrypt_cost.clone())? {
            cost @ BCRYPT_COST_RANGE_MIN..=BCRYPT_COST_RANGE_MAX => cost,
            _ => {
                return Err(ConfigError::Invalid {
                    key: "BCRYPT_COST",
                    value: bcrypt_cost,
                })
            }
        };

        let server_port = match get("PORT") {
            Some(value) => parse("PORT", value)?,
            None => parse("SERVER_PORT", get("SERVER_PORT").unwrap_or_else(|| "8080".into()))?,
        };

        Ok(Self {
            database_url,
            database_max_connections: parse(
                "DATABASE_MAX_CONNECTIONS",
                get("DATABASE_MAX_CONNECTIONS").unwrap_or_else(|| "5".into()),
            )?,
            server_port,
            server_host: get("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            jwt_secret: get("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?,
            jwt_expiration_hours: parse(
                "JWT_EXPIRES_IN_HOURS",
                get("JWT_EXPIRES_IN_HOURS").unwrap_or_else(|| "24".into()),
            )?,
            bcrypt_cost,
            environment,
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}

fn parse<T: FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { key, value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_config_defaults() {
        let config = config_from(&[
            ("DATABASE_URL", "postgres://test"),
            ("JWT_SECRET", "secret"),
        ])
        .unwrap();

        assert_eq!(config.database_url.as_deref(), Some("postgres://test"));
        assert_eq!(config.server_port, 8080);
        assert_eq!(config.server_host, "127.0.0.1");
        assert_eq!(config.jwt_expiration_hours, 24);
        assert_eq!(config.bcrypt_cost, bcrypt::DEFAULT_COST);
        assert_eq!(config.database_max_connections, 5);
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.server_url(), "http://127.0.0.1:8080");
    }

    #[test]
    fn test_config_overrides() {
        let config = config_from(&[
            ("DATABASE_URL", "postgres://test"),
            ("JWT_SECRET", "secret"),
            ("SERVER_PORT", "3000"),
            ("SERVER_HOST", "0.0.0.0"),
            ("JWT_EXPIRES_IN_HOURS", "1"),
            ("APP_ENV", "Production"),
        ])
        .unwrap();

        assert_eq!(config.server_port, 3000);
        assert_eq!(config.server_host, "0.0.0.0");
        assert_eq!(config.jwt_expiration_hours, 1);
        assert_eq!(config.environment, Environment::Production);
    }

    #[test]
    fn test_port_takes_precedence_over_server_port() {
        let config = config_from(&[
            ("JWT_SECRET", "secret"),
            ("PORT", "4000"),
            ("SERVER_PORT", "3000"),
        ])
        .unwrap();
        assert_eq!(config.server_port, 4000);
    }

    #[test]
    fn test_config_errors() {
        assert_eq!(
            config_from(&[("DATABASE_URL", "postgres://test")]).unwrap_err(),
            ConfigError::Missing("JWT_SECRET")
        );
        assert_eq!(
            config_from(&[("JWT_SECRET", "secret"), ("APP_ENV", "production")]).unwrap_err(),
            ConfigError::Missing("DATABASE_URL")
        );
        assert_eq!(
            config_from(&[("JWT_SECRET", "secret"), ("PORT", "eighty")]).unwrap_err(),
            ConfigError::Invalid {
                key: "PORT",
                value: "eighty".into()
            }
        );
        assert!(config_from(&[("JWT_SECRET", "secret"), ("APP_ENV", "staging")]).is_err());
        for cost in ["99", "3", "32"] {
            assert_eq!(
                config_from(&[("JWT_SECRET", "secret"), ("BCRYPT_COST", cost)]).unwrap_err(),
                ConfigError::Invalid {
                    key: "BCRYPT_COST",
                    value: cost.into()
                }
            );
        }
        assert_eq!(
            config_from(&[("JWT_SECRET", "secret"), ("BCRYPT_COST", "4")])
                .unwrap()
                .bcrypt_cost,
            4
        );
    }

    #[test]
    fn test_development_allows_missing_database() {
        let config = config_from(&[("JWT_SECRET", "secret")]).unwrap();
        assert!(config.database_url.is_none());
        assert!(config.environment.is_development());
    }
}
