//! Configuration: TOML file with defaults, overridden by CLI flags.
//!
//! ```toml
//! [coordinator]
//! bind = "0.0.0.0:8080"
//! mode = "workers"          # sync | local | workers
//! claim_mode = "exclusive"  # exclusive | shared
//! claim_timeout_ms = 30000
//! id_scheme = "sequential"  # sequential | ulid
//!
//! [worker]
//! coordinator_url = "http://127.0.0.1:8080"
//! poll_interval_ms = 1000
//! request_timeout_ms = 5000
//! concurrency = 1
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::registry::ClaimMode;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub coordinator: CoordinatorConfig,
    pub worker: WorkerConfig,
}

impl Config {
    /// Defaults, or the file at `path` layered over them.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.coordinator.validate()?;
        self.worker.validate()
    }
}

/// How `POST /api/v1/calculate` is served.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvaluationMode {
    /// Evaluate in the request and return the value.
    Sync,
    /// Create a task and evaluate it in-process in the background.
    Local,
    /// Create a task and split it into jobs for remote workers.
    #[default]
    Workers,
}

impl fmt::Display for EvaluationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvaluationMode::Sync => f.write_str("sync"),
            EvaluationMode::Local => f.write_str("local"),
            EvaluationMode::Workers => f.write_str("workers"),
        }
    }
}

impl FromStr for EvaluationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sync" => Ok(EvaluationMode::Sync),
            "local" => Ok(EvaluationMode::Local),
            "workers" => Ok(EvaluationMode::Workers),
            other => Err(format!("unknown mode {other:?} (expected sync|local|workers)")),
        }
    }
}

/// Shape of generated task ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdScheme {
    /// `expr_1`, `expr_2`, ...
    #[default]
    Sequential,
    /// `expr_<ULID>`
    Ulid,
}

impl FromStr for IdScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sequential" => Ok(IdScheme::Sequential),
            "ulid" => Ok(IdScheme::Ulid),
            other => Err(format!("unknown id scheme {other:?} (expected sequential|ulid)")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    pub bind: String,
    pub mode: EvaluationMode,
    pub claim_mode: ClaimMode,
    /// A claimed job not reported within this window is handed out again.
    pub claim_timeout_ms: u64,
    pub id_scheme: IdScheme,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
            mode: EvaluationMode::default(),
            claim_mode: ClaimMode::default(),
            claim_timeout_ms: 30_000,
            id_scheme: IdScheme::default(),
        }
    }
}

impl CoordinatorConfig {
    pub fn claim_timeout(&self) -> Duration {
        Duration::from_millis(self.claim_timeout_ms)
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.bind
            .parse()
            .map_err(|e| ConfigError::Invalid(format!("coordinator.bind {:?}: {e}", self.bind)))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.bind_addr()?;
        if self.claim_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "coordinator.claim_timeout_ms must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    pub coordinator_url: String,
    /// Wait between polls after an empty queue or a transport failure.
    pub poll_interval_ms: u64,
    /// Upper bound on a single HTTP exchange with the coordinator.
    pub request_timeout_ms: u64,
    /// Number of worker loops in this process.
    pub concurrency: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            coordinator_url: "http://127.0.0.1:8080".to_string(),
            poll_interval_ms: 1_000,
            request_timeout_ms: 5_000,
            concurrency: 1,
        }
    }
}

impl WorkerConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.coordinator_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "worker.coordinator_url must be an http(s) URL, got {:?}",
                self.coordinator_url
            )));
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "worker.poll_interval_ms must be greater than 0".into(),
            ));
        }
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "worker.request_timeout_ms must be greater than 0".into(),
            ));
        }
        if self.concurrency == 0 {
            return Err(ConfigError::Invalid("worker.concurrency must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        config.validate().unwrap();
        assert_eq!(config.coordinator.mode, EvaluationMode::Workers);
        assert_eq!(config.coordinator.claim_mode, ClaimMode::Exclusive);
        assert_eq!(config.worker.poll_interval(), Duration::from_secs(1));
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [coordinator]
            mode = "sync"
            claim_mode = "shared"

            [worker]
            concurrency = 4
            "#,
        )
        .unwrap();
        assert_eq!(config.coordinator.mode, EvaluationMode::Sync);
        assert_eq!(config.coordinator.claim_mode, ClaimMode::Shared);
        assert_eq!(config.coordinator.bind, "0.0.0.0:8080");
        assert_eq!(config.worker.concurrency, 4);
        assert_eq!(config.worker.poll_interval_ms, 1_000);
    }

    #[test]
    fn load_without_path_is_default() {
        assert_eq!(Config::load(None).unwrap(), Config::default());
    }

    #[test]
    fn load_reports_missing_file() {
        let err = Config::load(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        let mut config = Config::default();
        config.worker.concurrency = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn bad_bind_address_is_rejected() {
        let mut config = Config::default();
        config.coordinator.bind = "localhost".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn modes_parse_from_flags() {
        assert_eq!("LOCAL".parse::<EvaluationMode>(), Ok(EvaluationMode::Local));
        assert_eq!("ulid".parse::<IdScheme>(), Ok(IdScheme::Ulid));
        assert!("batch".parse::<EvaluationMode>().is_err());
    }
}
