//! Cluster session configuration

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{RelocatorError, Result};

/// Environment variable prefix, e.g. `RELOCATOR_MASTER_URL`
pub const ENV_PREFIX: &str = "RELOCATOR";

/// How to reach the cluster and how fast to talk to it
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SessionConfig {
    /// API server URL, used when no kubeconfig is given
    #[serde(default)]
    pub master_url: Option<String>,

    /// Path to a kubeconfig file; takes precedence over `master_url`
    #[serde(default)]
    pub kubeconfig: Option<PathBuf>,

    /// Sustained client-side request rate
    #[serde(default = "default_qps")]
    pub qps: f64,

    /// Requests allowed in a burst above the sustained rate
    #[serde(default = "default_burst")]
    pub burst: u32,
}

fn default_qps() -> f64 {
    20.0
}

fn default_burst() -> u32 {
    30
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            master_url: None,
            kubeconfig: None,
            qps: default_qps(),
            burst: default_burst(),
        }
    }
}

impl SessionConfig {
    /// Load configuration from an optional file and the environment
    ///
    /// Environment variables override values from the file.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(config::File::from(path).required(false));
        }

        let settings = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX))
            .build()
            .map_err(|e| RelocatorError::Configuration(format!("Failed to load config: {}", e)))?;

        settings
            .try_deserialize()
            .map_err(|e| RelocatorError::Configuration(format!("Failed to parse config: {}", e)))
    }

    pub fn with_master_url(mut self, master_url: impl Into<String>) -> Self {
        self.master_url = Some(master_url.into());
        self
    }

    pub fn with_kubeconfig(mut self, kubeconfig: impl Into<PathBuf>) -> Self {
        self.kubeconfig = Some(kubeconfig.into());
        self
    }

    /// Check that the cluster endpoint and rate limits are usable
    pub fn validate(&self) -> Result<()> {
        let blank = |value: &Option<String>| value.as_deref().map_or(true, str::is_empty);
        let no_kubeconfig = self
            .kubeconfig
            .as_deref()
            .map_or(true, |path| path.as_os_str().is_empty());

        if blank(&self.master_url) && no_kubeconfig {
            return Err(RelocatorError::Configuration(
                "must specify master URL or kubeconfig".to_string(),
            ));
        }
        if !(self.qps > 0.0) {
            return Err(RelocatorError::Configuration(format!(
                "qps must be positive, got {}",
                self.qps
            )));
        }
        if self.burst == 0 {
            return Err(RelocatorError::Configuration(
                "burst must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.qps, 20.0);
        assert_eq!(config.burst, 30);
        assert!(config.master_url.is_none());
    }

    #[test]
    fn test_validate_requires_endpoint() {
        let err = SessionConfig::default().validate().unwrap_err();
        assert!(matches!(err, RelocatorError::Configuration(_)));

        let blank = SessionConfig::default().with_master_url("");
        assert!(blank.validate().is_err());

        assert!(SessionConfig::default()
            .with_master_url("https://10.0.0.1:6443")
            .validate()
            .is_ok());
        assert!(SessionConfig::default()
            .with_kubeconfig("/etc/kubernetes/admin.conf")
            .validate()
            .is_ok());
    }

    #[test]
    fn test_validate_rate_limits() {
        let mut config = SessionConfig::default().with_master_url("https://10.0.0.1:6443");
        config.burst = 0;
        assert!(config.validate().is_err());

        config.burst = 1;
        config.qps = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "kubeconfig = \"/home/ops/.kube/staging\"").unwrap();
        writeln!(file, "qps = 5.0").unwrap();

        let config = SessionConfig::load(Some(file.path())).unwrap();
        assert_eq!(
            config.kubeconfig,
            Some(PathBuf::from("/home/ops/.kube/staging"))
        );
        assert_eq!(config.qps, 5.0);
        assert_eq!(config.burst, 30);
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = SessionConfig::load(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config.burst, 30);
    }
}
