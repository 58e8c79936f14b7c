//! Configuration manager for profiles.

use std::fs::File;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::extract::FromRef;
use serde::{Deserialize, Serialize};

use crate::AppState;

const DEFAULT_CONFIG_PATH: &str = "config.yaml";
const DEFAULT_ADDRESS: &str = "0.0.0.0:8888";
const DEFAULT_REQUEST_TIMEOUT: u64 = 10;
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    /// Instance name.
    pub name: String,
    /// Socket address to listen on.
    pub address: String,
    /// Seconds before a request is aborted.
    pub request_timeout: u64,
    /// Storage back-end.
    pub storage: Storage,
    /// Related to PostgreSQL configuration.
    #[serde(skip_serializing)]
    pub postgres: Option<Postgres>,
    /// Related to logs, traces and metrics export.
    pub telemetry: Telemetry,
    #[serde(skip_deserializing)]
    pub version: String,
    #[serde(skip)]
    path: PathBuf,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME").to_owned(),
            address: DEFAULT_ADDRESS.to_owned(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            storage: Storage::default(),
            postgres: None,
            telemetry: Telemetry::default(),
            version: VERSION.to_owned(),
            path: PathBuf::default(),
        }
    }
}

/// Where profiles are persisted.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Storage {
    /// Lost on restart.
    #[default]
    Memory,
    Postgres,
}

/// PostgreSQL configuration.
#[derive(Debug, Default, PartialEq, Clone, Serialize, Deserialize)]
pub struct Postgres {
    /// Hostname:(?port) for PostgreSQL instance.
    pub address: String,
    /// Database name.
    pub database: Option<String>,
    /// Username credential to connect.
    pub username: Option<String>,
    /// Password credential to connect.
    pub password: Option<String>,
    /// Maximum pool connections.
    pub pool_size: Option<u32>,
}

/// Telemetry configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Telemetry {
    /// OTLP gRPC collector receiving logs and traces.
    pub otlp_endpoint: Option<String>,
    /// Serve Prometheus metrics on `/metrics`.
    pub prometheus: bool,
}

impl Default for Telemetry {
    fn default() -> Self {
        Self {
            otlp_endpoint: None,
            prometheus: true,
        }
    }
}

/// Errors that may occur while loading the configuration.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("`address` is not a valid socket address: {0}")]
    Address(#[from] std::net::AddrParseError),
    #[error("`postgres` entry is required by `storage: postgres`")]
    MissingPostgres,
}

impl FromRef<AppState> for Arc<Configuration> {
    fn from_ref(state: &AppState) -> Arc<Configuration> {
        Arc::clone(&state.config)
    }
}

impl Configuration {
    pub fn path(mut self, path: PathBuf) -> Self {
        self.path = path;
        self
    }

    /// Reads the `config.yaml` file from the specified path or the default
    /// location.
    pub fn read(self) -> Result<Arc<Self>, Error> {
        let file_path = if self.path.is_file() {
            self.path.clone()
        } else {
            Path::new(DEFAULT_CONFIG_PATH).to_path_buf()
        };

        let mut config: Configuration = match File::open(&file_path) {
            Ok(file) => match serde_yaml::from_reader(file) {
                Ok(config) => config,
                Err(err) => return Ok(Arc::new(self.error(err))),
            },
            Err(err) => return Ok(Arc::new(self.error(err))),
        };

        // set app version.
        config.version = VERSION.to_owned();
        config.path = file_path;

        config.address.parse::<SocketAddr>()?;
        if config.storage == Storage::Postgres && config.postgres.is_none() {
            return Err(Error::MissingPostgres);
        }

        Ok(Arc::new(config))
    }

    /// Return a default configuration as fallback.
    fn error(&self, err: impl std::error::Error) -> Self {
        tracing::error!(error = %err, path = ?self.path, "`config.yaml` cannot be read, using defaults");
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir()
            .join(format!("profiles-{}-{name}.yaml", std::process::id()));
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_read_config() {
        let path = write_config(
            "full",
            r#"
name: profiles-eu
address: 127.0.0.1:9000
storage: postgres
postgres:
  address: localhost:5432
  pool_size: 4
telemetry:
  prometheus: false
"#,
        );

        let config = Configuration::default().path(path.clone()).read().unwrap();
        assert_eq!(config.name, "profiles-eu");
        assert_eq!(config.address, "127.0.0.1:9000");
        assert_eq!(config.request_timeout, DEFAULT_REQUEST_TIMEOUT);
        assert_eq!(config.storage, Storage::Postgres);
        assert_eq!(config.postgres.as_ref().unwrap().pool_size, Some(4));
        assert!(!config.telemetry.prometheus);
        assert_eq!(config.version, VERSION);

        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_invalid_config() {
        let path = write_config("address", "address: nowhere\n");
        assert!(matches!(
            Configuration::default().path(path.clone()).read(),
            Err(Error::Address(_))
        ));
        std::fs::remove_file(path).unwrap();

        let path = write_config("postgres", "storage: postgres\n");
        assert!(matches!(
            Configuration::default().path(path.clone()).read(),
            Err(Error::MissingPostgres)
        ));
        std::fs::remove_file(path).unwrap();
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_fallback_is_logged() {
        let logs = Captured::default();
        let writer = logs.clone();
        let (subscriber, _) = crate::telemetry::subscriber(move || writer.clone());

        let path = write_config("logged", "storage: [not, a, storage]\n");
        let config = tracing::subscriber::with_default(subscriber, || {
            Configuration::default().path(path.clone()).read().unwrap()
        });
        assert_eq!(config.storage, Storage::Memory);
        std::fs::remove_file(path).unwrap();

        let logs = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(logs.contains("ERROR"));
        assert!(logs.contains("cannot be read, using defaults"));
    }

    #[test]
    fn test_fallback_config() {
        let path = write_config("broken", "storage: [not, a, storage]\n");
        let config = Configuration::default().path(path.clone()).read().unwrap();
        assert_eq!(config.storage, Storage::Memory);
        assert_eq!(config.address, DEFAULT_ADDRESS);
        std::fs::remove_file(path).unwrap();
    }
}
