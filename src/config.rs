use std::net::SocketAddr;
use std::path::PathBuf;

use jsonwebtoken::Algorithm;
use secrecy::SecretString;
use serde::Deserialize;
use snafu::ResultExt as _;

use crate::auth::Authenticator;
use crate::database::DatabaseConfig;
use crate::error::{ApplicationError, ConfigLoadSnafu};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(rename = "host_address")]
    pub host: SocketAddr,
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
    #[serde(flatten)]
    pub database: DatabaseConfig,
    #[serde(flatten)]
    pub auth: AuthConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    #[serde(rename = "auth_secret")]
    pub secret: SecretString,
    #[serde(rename = "auth_algorithm", default = "default_algorithm")]
    pub algorithm: Algorithm,
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

fn default_algorithm() -> Algorithm {
    Algorithm::HS256
}

impl Config {
    pub fn from_env() -> Result<Config, ApplicationError> {
        envy::from_env::<Config>().context(ConfigLoadSnafu)
    }

    pub fn authenticator(&self) -> Authenticator {
        Authenticator::new(self.auth.secret.clone(), self.auth.algorithm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(extra: &[(&str, &str)]) -> Vec<(String, String)> {
        let base = [
            ("HOST_ADDRESS", "127.0.0.1:8080"),
            ("SURREAL_URL", "mem://"),
            ("SURREAL_NS", "tally"),
            ("SURREAL_DB", "tally"),
            ("AUTH_SECRET", "secret"),
        ];

        base.iter()
            .chain(extra)
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn defaults_are_applied() {
        let config: Config = envy::from_iter(vars(&[])).unwrap();

        assert_eq!(config.host, "127.0.0.1:8080".parse().unwrap());
        assert_eq!(config.log_dir, PathBuf::from("logs"));
        assert_eq!(config.auth.algorithm, Algorithm::HS256);
        assert_eq!(config.database.username, None);
    }

    #[test]
    fn optional_values_are_read() {
        let config: Config = envy::from_iter(vars(&[
            ("SURREAL_USER", "root"),
            ("SURREAL_PASS", "root"),
            ("AUTH_ALGORITHM", "HS512"),
            ("LOG_DIR", "/var/log/tally"),
        ]))
        .unwrap();

        assert_eq!(config.database.username.as_deref(), Some("root"));
        assert_eq!(config.auth.algorithm, Algorithm::HS512);
        assert_eq!(config.log_dir, PathBuf::from("/var/log/tally"));
    }

    #[test]
    fn missing_secret_fails() {
        let vars = vars(&[]).into_iter().filter(|(key, _)| key != "AUTH_SECRET");
        assert!(envy::from_iter::<_, Config>(vars).is_err());
    }
}
