//! Server configuration loaded from environment variables.

use std::env;

use callsign_auth::AuthConfig;
use callsign_db::{DbConfig, DbCredentials};

/// Everything the binary needs, loaded once at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub auth: AuthConfig,
    pub db: DbConfig,
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}

impl ServerConfig {
    /// Load from the process environment, reading `.env` first if
    /// present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load from an arbitrary key/value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let auth_defaults = AuthConfig::default();
        let db_defaults = DbConfig::default();

        let required = |var: &'static str| {
            lookup(var)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing(var))
        };

        Ok(Self {
            port: parse_or(&lookup, "PORT", 9999)?,
            auth: AuthConfig {
                access_token_secret: required("ACCESS_TOKEN_SECRET")?,
                refresh_token_secret: required("REFRESH_TOKEN_SECRET")?,
                access_token_lifetime_secs: parse_or(
                    &lookup,
                    "ACCESS_TOKEN_TTL_SECS",
                    auth_defaults.access_token_lifetime_secs,
                )?,
                refresh_token_lifetime_secs: parse_or(
                    &lookup,
                    "REFRESH_TOKEN_TTL_SECS",
                    auth_defaults.refresh_token_lifetime_secs,
                )?,
                jwt_issuer: lookup("JWT_ISSUER").unwrap_or(auth_defaults.jwt_issuer),
                pepper: lookup("PASSWORD_PEPPER").filter(|p| !p.is_empty()),
            },
            db: DbConfig {
                url: lookup("SURREAL_URL").unwrap_or(db_defaults.url),
                namespace: lookup("SURREAL_NS").unwrap_or(db_defaults.namespace),
                database: lookup("SURREAL_DB").unwrap_or(db_defaults.database),
                credentials: match lookup("SURREAL_USER") {
                    None => db_defaults.credentials,
                    Some(user) if user.trim().is_empty() => None,
                    Some(username) => Some(DbCredentials {
                        username,
                        password: lookup("SURREAL_PASS").unwrap_or_default(),
                    }),
                },
            },
        })
    }
}

fn parse_or<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(var) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { var, value }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    const SECRETS: [(&str, &str); 2] = [
        ("ACCESS_TOKEN_SECRET", "access"),
        ("REFRESH_TOKEN_SECRET", "refresh"),
    ];

    #[test]
    fn defaults_apply() {
        let config = load(&SECRETS).unwrap();
        assert_eq!(config.port, 9999);
        assert_eq!(config.auth.access_token_lifetime_secs, 900);
        assert_eq!(config.auth.refresh_token_lifetime_secs, 604_800);
        assert_eq!(config.auth.jwt_issuer, "callsign");
        assert!(config.auth.pepper.is_none());
        assert_eq!(config.db.namespace, "callsign");
        assert!(config.db.credentials.is_some());
    }

    #[test]
    fn database_credentials() {
        let mut vars = SECRETS.to_vec();
        vars.extend([("SURREAL_USER", "svc"), ("SURREAL_PASS", "hunter2")]);
        let creds = load(&vars).unwrap().db.credentials.unwrap();
        assert_eq!(creds.username, "svc");
        assert_eq!(creds.password, "hunter2");

        let mut vars = SECRETS.to_vec();
        vars.push(("SURREAL_USER", ""));
        assert!(load(&vars).unwrap().db.credentials.is_none());
    }

    #[test]
    fn overrides_apply() {
        let mut vars = SECRETS.to_vec();
        vars.extend([
            ("PORT", "8080"),
            ("ACCESS_TOKEN_TTL_SECS", "60"),
            ("PASSWORD_PEPPER", "pepper"),
            ("SURREAL_URL", "db:8000"),
        ]);
        let config = load(&vars).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.auth.access_token_lifetime_secs, 60);
        assert_eq!(config.auth.pepper.as_deref(), Some("pepper"));
        assert_eq!(config.db.url, "db:8000");
    }

    #[test]
    fn missing_secret_is_an_error() {
        let err = load(&[("ACCESS_TOKEN_SECRET", "access")]).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("REFRESH_TOKEN_SECRET")));

        let err = load(&[("ACCESS_TOKEN_SECRET", "  "), ("REFRESH_TOKEN_SECRET", "r")])
            .unwrap_err();
        assert!(matches!(err, ConfigError::Missing("ACCESS_TOKEN_SECRET")));
    }

    #[test]
    fn unparsable_number_is_an_error() {
        let mut vars = SECRETS.to_vec();
        vars.push(("PORT", "http"));
        let err = load(&vars).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "PORT", .. }));
    }
}
