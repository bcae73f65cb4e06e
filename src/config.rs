use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;
use crate::inference::AlignmentPolicy;

pub const DEFAULT_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_DATA_DIR: &str = "database";
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 10;

/// Runtime settings for the server and the CLI
#[derive(Clone, Debug, PartialEq)]
pub struct ServerConfig {
    /// Address the HTTP server binds to
    pub addr: String,

    /// Directory holding the persisted custom charts
    pub data_dir: PathBuf,

    /// Key for the data.gov.in API, if any
    pub data_gov_api_key: Option<String>,

    /// Timeout applied to every upstream request
    pub upstream_timeout: Duration,

    /// How inferred labels and values are paired
    pub alignment: AlignmentPolicy,

    /// Whether remote previews may fetch from loopback and private hosts
    pub allow_private_upstream: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.to_string(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            data_gov_api_key: None,
            upstream_timeout: Duration::from_secs(DEFAULT_UPSTREAM_TIMEOUT_SECS),
            alignment: AlignmentPolicy::default(),
            allow_private_upstream: false,
        }
    }
}

impl ServerConfig {
    /// Reads settings from the process environment
    ///
    /// * `GOVGRAPH_ADDR` - bind address (default `127.0.0.1:3000`)
    /// * `GOVGRAPH_DATA_DIR` - data directory (default `database`)
    /// * `DATA_GOV_API_KEY` - data.gov.in API key
    /// * `GOVGRAPH_UPSTREAM_TIMEOUT_SECS` - upstream timeout (default 10)
    /// * `GOVGRAPH_ALIGNMENT` - `positional` or `row-keyed`
    /// * `GOVGRAPH_ALLOW_PRIVATE_UPSTREAM` - `true` to let remote previews
    ///   reach private addresses (default `false`)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads settings through `lookup`, treating blank values as unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = ServerConfig::default();

        if let Some(addr) = get("GOVGRAPH_ADDR") {
            config.addr = addr;
        }
        if let Some(dir) = get("GOVGRAPH_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        config.data_gov_api_key = get("DATA_GOV_API_KEY");

        if let Some(secs) = get("GOVGRAPH_UPSTREAM_TIMEOUT_SECS") {
            let secs: u64 = secs
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue {
                    key: "GOVGRAPH_UPSTREAM_TIMEOUT_SECS",
                    value: secs.clone(),
                })?;
            config.upstream_timeout = Duration::from_secs(secs);
        }
        if let Some(policy) = get("GOVGRAPH_ALIGNMENT") {
            config.alignment = policy.parse()?;
        }
        if let Some(flag) = get("GOVGRAPH_ALLOW_PRIVATE_UPSTREAM") {
            config.allow_private_upstream = match flag.trim().to_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: "GOVGRAPH_ALLOW_PRIVATE_UPSTREAM",
                        value: flag,
                    });
                }
            };
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = ServerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ServerConfig::default());
    }

    #[test]
    fn reads_overrides() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("GOVGRAPH_ADDR", "0.0.0.0:8080"),
            ("GOVGRAPH_DATA_DIR", "/var/lib/govgraph"),
            ("DATA_GOV_API_KEY", "secret"),
            ("GOVGRAPH_UPSTREAM_TIMEOUT_SECS", "3"),
            ("GOVGRAPH_ALIGNMENT", "row-keyed"),
            ("GOVGRAPH_ALLOW_PRIVATE_UPSTREAM", "true"),
        ]))
        .unwrap();
        assert_eq!(config.addr, "0.0.0.0:8080");
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/govgraph"));
        assert_eq!(config.data_gov_api_key.as_deref(), Some("secret"));
        assert_eq!(config.upstream_timeout, Duration::from_secs(3));
        assert_eq!(config.alignment, AlignmentPolicy::RowKeyed);
        assert!(config.allow_private_upstream);
    }

    #[test]
    fn rejects_bad_timeout() {
        let err = ServerConfig::from_lookup(lookup(&[("GOVGRAPH_UPSTREAM_TIMEOUT_SECS", "soon")]));
        assert!(err.is_err());
    }

    #[test]
    fn rejects_bad_private_upstream_flag() {
        let err = ServerConfig::from_lookup(lookup(&[("GOVGRAPH_ALLOW_PRIVATE_UPSTREAM", "maybe")]));
        assert!(err.is_err());
    }
}
