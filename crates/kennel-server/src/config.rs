use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::ServerError;
use crate::telemetry::TracerConfig;

pub const DEFAULT_ADDR: &str = "127.0.0.1:4567";
pub const DEFAULT_DB_PATH: &str = "kennel.db";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }

    pub fn is_development(&self) -> bool {
        *self == Environment::Development
    }
}

impl FromStr for Environment {
    type Err = ServerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(ServerError::Config(format!(
                "unknown environment '{}' (expected development or production)",
                other
            ))),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Everything `serve` needs to start.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub db_path: PathBuf,
    pub environment: Environment,
    /// Directory holding `index.html`. Only consulted in development.
    pub views_dir: Option<PathBuf>,
    pub tracer: TracerConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 4567)),
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            environment: Environment::default(),
            views_dir: None,
            tracer: TracerConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_environment() {
        assert_eq!("development".parse::<Environment>().unwrap(), Environment::Development);
        assert_eq!("DEV".parse::<Environment>().unwrap(), Environment::Development);
        assert_eq!(" prod ".parse::<Environment>().unwrap(), Environment::Production);
        assert!("staging".parse::<Environment>().is_err());
    }

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.addr.to_string(), DEFAULT_ADDR);
        assert!(config.environment.is_development());
        assert_eq!(config.tracer.service_name, "my-app");
    }
}
