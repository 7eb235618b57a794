//! Process configuration, read once from the environment at startup.

use thiserror::Error;
use tracing::warn;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEV_JWT_SECRET: &str = "dev-secret";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be 'true' or 'false', got '{value}'")]
    InvalidBool { var: &'static str, value: String },

    #[error("{var} must not be empty")]
    Empty { var: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: String,
    pub jwt_secret: String,
    /// `None` runs on in-memory stores.
    pub database_url: Option<String>,
    pub seed_defaults: bool,
    /// Email of a user to ensure with the developer role while seeding.
    pub admin_email: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).map(|v| v.trim().to_string());

        let bind_addr = match get("BIND_ADDR") {
            Some(addr) if addr.is_empty() => return Err(ConfigError::Empty { var: "BIND_ADDR" }),
            Some(addr) => addr,
            None => DEFAULT_BIND_ADDR.to_string(),
        };

        let jwt_secret = match get("JWT_SECRET").filter(|s| !s.is_empty()) {
            Some(secret) => secret,
            None => {
                warn!("JWT_SECRET not set; using insecure dev default");
                DEV_JWT_SECRET.to_string()
            }
        };

        let database_url = get("DATABASE_URL").filter(|s| !s.is_empty());

        let seed_defaults = match get("SEED_DEFAULTS") {
            Some(raw) => parse_bool("SEED_DEFAULTS", &raw)?,
            None => database_url.is_none(),
        };

        let admin_email = get("SEED_ADMIN_EMAIL").filter(|s| !s.is_empty());

        Ok(Self {
            bind_addr,
            jwt_secret,
            database_url,
            seed_defaults,
            admin_email,
        })
    }
}

fn parse_bool(var: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidBool {
            var,
            value: raw.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|k| vars.get(k).cloned())
    }

    #[test]
    fn defaults_to_in_memory_with_seed() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.bind_addr, DEFAULT_BIND_ADDR);
        assert_eq!(cfg.jwt_secret, DEV_JWT_SECRET);
        assert_eq!(cfg.database_url, None);
        assert!(cfg.seed_defaults);
    }

    #[test]
    fn postgres_does_not_seed_unless_asked() {
        let cfg = config(&[("DATABASE_URL", "postgres://localhost/warden")]).unwrap();
        assert!(!cfg.seed_defaults);

        let cfg = config(&[
            ("DATABASE_URL", "postgres://localhost/warden"),
            ("SEED_DEFAULTS", "TRUE"),
            ("SEED_ADMIN_EMAIL", "root@example.com"),
        ])
        .unwrap();
        assert!(cfg.seed_defaults);
        assert_eq!(cfg.admin_email.as_deref(), Some("root@example.com"));
    }

    #[test]
    fn invalid_values_rejected() {
        assert_eq!(
            config(&[("SEED_DEFAULTS", "maybe")]),
            Err(ConfigError::InvalidBool {
                var: "SEED_DEFAULTS",
                value: "maybe".to_string()
            })
        );
        assert_eq!(
            config(&[("BIND_ADDR", " ")]),
            Err(ConfigError::Empty { var: "BIND_ADDR" })
        );
    }
}
