use axum::http::HeaderValue;
use serde::Serialize;
use std::env;
use std::str::FromStr;
use thiserror::Error;

/// Smallest accepted HS256 signing secret, in bytes.
pub const MIN_SECRET_BYTES: usize = 32;

/// Longest accepted token lifetime (one year).
pub const MAX_EXPIRY_HOURS: u64 = 24 * 365;

/// Startup configuration errors. Any of these keeps the process from serving traffic.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required setting: {0}")]
    Missing(&'static str),

    #[error("JWT_SECRET must be at least {MIN_SECRET_BYTES} bytes, got {0}")]
    WeakSecret(usize),

    #[error("invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize)]
pub struct DatabaseConfig {
    /// Absent when the server runs against the in-memory store.
    #[serde(skip_serializing)]
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApiConfig {
    pub bind_address: String,
    pub port: u16,
    pub max_request_size_bytes: usize,
}

#[derive(Clone, Serialize)]
pub struct SecurityConfig {
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub jwt_audience: String,
    pub jwt_expiry_hours: u64,
    pub cors_origins: Vec<String>,
}

// Keep the secret out of Debug output (config is logged at startup).
impl std::fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityConfig")
            .field("jwt_secret", &"<redacted>")
            .field("jwt_issuer", &self.jwt_issuer)
            .field("jwt_audience", &self.jwt_audience)
            .field("jwt_expiry_hours", &self.jwt_expiry_hours)
            .field("cors_origins", &self.cors_origins)
            .finish()
    }
}

impl AppConfig {
    /// Build the configuration from the process environment.
    ///
    /// Environment presets supply defaults, specific variables override them.
    /// The signing secret has no default: it must be provided and be at least
    /// [`MIN_SECRET_BYTES`] long.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`AppConfig::from_env`] but reads variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = match lookup("APP_ENV").as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            Some("staging") | Some("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        let config = match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_overrides(&lookup)?;

        config.security.validate()?;
        Ok(config)
    }

    fn with_overrides<F>(mut self, lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Database overrides
        if let Some(v) = lookup("DATABASE_URL") {
            self.database.url = Some(v);
        }
        if let Some(v) = parsed(lookup, "DATABASE_MAX_CONNECTIONS")? {
            self.database.max_connections = v;
        }
        if let Some(v) = parsed(lookup, "DATABASE_CONNECTION_TIMEOUT")? {
            self.database.connection_timeout = v;
        }

        // API overrides
        if let Some(v) = lookup("API_BIND_ADDRESS") {
            self.api.bind_address = v;
        }
        if let Some(v) = parsed(lookup, "API_PORT")? {
            self.api.port = v;
        } else if let Some(v) = parsed(lookup, "PORT")? {
            self.api.port = v;
        }
        if let Some(v) = parsed(lookup, "API_MAX_REQUEST_SIZE_BYTES")? {
            self.api.max_request_size_bytes = v;
        }

        // Security overrides
        if let Some(v) = lookup("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Some(v) = lookup("JWT_ISSUER") {
            self.security.jwt_issuer = v;
        }
        if let Some(v) = lookup("JWT_AUDIENCE") {
            self.security.jwt_audience = v;
        }
        if let Some(v) = parsed(lookup, "JWT_EXPIRY_HOURS")? {
            self.security.jwt_expiry_hours = v;
        }
        if let Some(v) = lookup("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        Ok(self)
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 30,
            },
            api: ApiConfig {
                bind_address: "127.0.0.1".to_string(),
                port: 5000,
                max_request_size_bytes: 1024 * 1024, // 1MB
            },
            security: SecurityConfig::defaults(vec!["http://localhost:3000".to_string()]),
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            database: DatabaseConfig {
                url: None,
                max_connections: 20,
                connection_timeout: 10,
            },
            api: ApiConfig {
                bind_address: "0.0.0.0".to_string(),
                port: 8080,
                max_request_size_bytes: 512 * 1024,
            },
            security: SecurityConfig::defaults(Vec::new()),
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                url: None,
                max_connections: 50,
                connection_timeout: 5,
            },
            api: ApiConfig {
                bind_address: "0.0.0.0".to_string(),
                port: 8080,
                max_request_size_bytes: 256 * 1024,
            },
            security: SecurityConfig::defaults(Vec::new()),
        }
    }
}

impl SecurityConfig {
    /// Token lifetime is the same in every environment: 24 hours from issuance.
    fn defaults(cors_origins: Vec<String>) -> Self {
        Self {
            jwt_secret: String::new(),
            jwt_issuer: "MobieleTijdkaartApi".to_string(),
            jwt_audience: "MobieleTijdkaartClient".to_string(),
            jwt_expiry_hours: 24,
            cors_origins,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.is_empty() {
            return Err(ConfigError::Missing("JWT_SECRET"));
        }
        if self.jwt_secret.len() < MIN_SECRET_BYTES {
            return Err(ConfigError::WeakSecret(self.jwt_secret.len()));
        }
        if self.jwt_issuer.trim().is_empty() {
            return Err(ConfigError::Missing("JWT_ISSUER"));
        }
        if self.jwt_audience.trim().is_empty() {
            return Err(ConfigError::Missing("JWT_AUDIENCE"));
        }
        if self.jwt_expiry_hours == 0 || self.jwt_expiry_hours > MAX_EXPIRY_HOURS {
            return Err(ConfigError::Invalid {
                var: "JWT_EXPIRY_HOURS",
                value: self.jwt_expiry_hours.to_string(),
            });
        }
        // Credentialed CORS needs explicit origins, a wildcard is not allowed.
        for origin in &self.cors_origins {
            let usable = origin != "*"
                && (origin.starts_with("http://") || origin.starts_with("https://"))
                && HeaderValue::from_str(origin).is_ok();
            if !usable {
                return Err(ConfigError::Invalid {
                    var: "SECURITY_CORS_ORIGINS",
                    value: origin.clone(),
                });
            }
        }
        Ok(())
    }
}

fn parsed<F, T>(lookup: &F, var: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(var) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { var, value }),
    }
}
