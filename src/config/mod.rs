use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

/// Signing key used when `SECRET_KEY` is not set. Only acceptable for local development.
pub const DEV_SECRET_KEY: &str = "secret-dev";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Test,
    Staging,
    Production,
}

impl Environment {
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Environment::Production,
            "staging" | "stage" => Environment::Staging,
            "test" | "testing" => Environment::Test,
            _ => Environment::Development,
        }
    }

    /// Failed requests are logged with their detail everywhere except under automated tests.
    pub fn logs_errors(self) -> bool {
        !matches!(self, Environment::Test)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub port: u16,
    pub max_request_size_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(skip_serializing)]
    pub secret_key: String,
    pub jwt_expiry_hours: u64,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("SECRET_KEY must be set outside of development (refusing the built-in dev key in {0:?})")]
    InsecureSecret(Environment),

    #[error("SECRET_KEY must not be empty")]
    EmptySecret,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = Environment::from_name(&env::var("APP_ENV").unwrap_or_default());

        // Set defaults based on environment, then override with specific env vars
        Self::for_environment(environment).with_env_overrides()
    }

    pub fn for_environment(environment: Environment) -> Self {
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Test => Self::test(),
            Environment::Development => Self::development(),
        }
    }

    fn with_env_overrides(mut self) -> Self {
        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = v;
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // API overrides
        if let Some(v) = env::var("JOBLY_API_PORT").ok().or_else(|| env::var("PORT").ok()) {
            self.api.port = v.parse().unwrap_or(self.api.port);
        }
        if let Ok(v) = env::var("API_MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes = v.parse().unwrap_or(self.api.max_request_size_bytes);
        }

        // Security overrides
        if let Ok(v) = env::var("SECRET_KEY") {
            self.security.secret_key = v;
        }
        if let Ok(v) = env::var("SECURITY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        self
    }

    /// Reject settings that must never reach a deployed environment.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.security.secret_key.is_empty() {
            return Err(ConfigError::EmptySecret);
        }
        let deployed = matches!(self.environment, Environment::Staging | Environment::Production);
        if deployed && self.security.secret_key == DEV_SECRET_KEY {
            return Err(ConfigError::InsecureSecret(self.environment));
        }
        Ok(())
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                url: "postgresql://localhost/jobly".to_string(),
                max_connections: 10,
                connection_timeout: 30,
            },
            api: ApiConfig {
                port: 3001,
                max_request_size_bytes: 1024 * 1024, // 1MB
            },
            security: SecurityConfig {
                secret_key: DEV_SECRET_KEY.to_string(),
                jwt_expiry_hours: 24 * 7, // 1 week
                cors_origins: vec!["*".to_string()],
            },
        }
    }

    fn test() -> Self {
        Self {
            environment: Environment::Test,
            database: DatabaseConfig {
                url: "postgresql://localhost/jobly_test".to_string(),
                max_connections: 5,
                connection_timeout: 5,
            },
            api: ApiConfig {
                port: 0,
                max_request_size_bytes: 1024 * 1024,
            },
            security: SecurityConfig {
                secret_key: DEV_SECRET_KEY.to_string(),
                jwt_expiry_hours: 1,
                cors_origins: vec!["*".to_string()],
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            database: DatabaseConfig {
                url: "postgresql://localhost/jobly".to_string(),
                max_connections: 20,
                connection_timeout: 10,
            },
            api: ApiConfig {
                port: 3001,
                max_request_size_bytes: 512 * 1024,
            },
            security: SecurityConfig {
                secret_key: DEV_SECRET_KEY.to_string(),
                jwt_expiry_hours: 24,
                cors_origins: vec!["https://staging.example.com".to_string()],
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                url: "postgresql://localhost/jobly".to_string(),
                max_connections: 50,
                connection_timeout: 5,
            },
            api: ApiConfig {
                port: 3001,
                max_request_size_bytes: 256 * 1024,
            },
            security: SecurityConfig {
                secret_key: DEV_SECRET_KEY.to_string(),
                jwt_expiry_hours: 4,
                cors_origins: vec!["https://app.example.com".to_string()],
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_environment_names() {
        assert_eq!(Environment::from_name("prod"), Environment::Production);
        assert_eq!(Environment::from_name(" Staging "), Environment::Staging);
        assert_eq!(Environment::from_name("test"), Environment::Test);
        assert_eq!(Environment::from_name(""), Environment::Development);
        assert_eq!(Environment::from_name("whatever"), Environment::Development);
    }

    #[test]
    fn only_test_environment_silences_error_logging() {
        assert!(!Environment::Test.logs_errors());
        assert!(Environment::Development.logs_errors());
        assert!(Environment::Production.logs_errors());
    }

    #[test]
    fn development_accepts_fallback_secret() {
        let config = AppConfig::for_environment(Environment::Development);
        assert_eq!(config.security.secret_key, DEV_SECRET_KEY);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn production_rejects_fallback_secret() {
        let mut config = AppConfig::for_environment(Environment::Production);
        assert!(matches!(config.validate(), Err(ConfigError::InsecureSecret(Environment::Production))));

        config.security.secret_key = "a-real-secret".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_secret_is_rejected() {
        let mut config = AppConfig::for_environment(Environment::Test);
        config.security.secret_key.clear();
        assert!(matches!(config.validate(), Err(ConfigError::EmptySecret)));
    }
}
