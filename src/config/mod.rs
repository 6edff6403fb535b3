// Configuration module entry point
// Resolves the immutable server configuration from defaults plus an optional
// JSON override file.

mod types;

use serde_json::Value;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub use types::{Config, RouteTable};

/// Errors raised while resolving the configuration. All of them abort
/// startup with a diagnostic instead of crashing later.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("config file {path:?} is not valid JSON: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("config file {path:?} must contain a JSON object")]
    NotAnObject { path: PathBuf },
    #[error("invalid config value: {0}")]
    Value(serde_json::Error),
    #[error("invalid listen address {address:?}: {source}")]
    Address {
        address: String,
        source: std::net::AddrParseError,
    },
}

impl Config {
    /// Resolve the configuration.
    ///
    /// Built-in defaults are always the base. When `override_path` names an
    /// existing file, it must hold a JSON object whose keys are merged on
    /// top, override winning per key. The merge is shallow: a supplied
    /// `ROUTE` replaces the default table wholesale. Unrecognized keys are
    /// ignored.
    pub fn resolve(override_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut merged = serde_json::to_value(Self::default()).map_err(ConfigError::Value)?;

        if let Some(path) = override_path.filter(|p| p.is_file()) {
            let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            let overrides: Value =
                serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
                    path: path.to_path_buf(),
                    source,
                })?;
            let Value::Object(overrides) = overrides else {
                return Err(ConfigError::NotAnObject {
                    path: path.to_path_buf(),
                });
            };
            if let Value::Object(base) = &mut merged {
                for (key, value) in overrides {
                    base.insert(key, value);
                }
            }
        }

        let mut config: Self = serde_json::from_value(merged).map_err(ConfigError::Value)?;
        config.route.normalize();
        Ok(config)
    }

    /// The socket address to listen on.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.server_address, self.server_port)
            .parse()
            .map_err(|source| ConfigError::Address {
                address: format!("{}:{}", self.server_address, self.server_port),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        (dir, path)
    }

    #[test]
    fn test_defaults_without_file() {
        let config = Config::resolve(None).unwrap();
        assert_eq!(config.server_address, "0.0.0.0");
        assert_eq!(config.server_port, 80);
        assert!(config.server_multithreaded);
        assert_eq!(config.static_url_prefix, "/static");
        assert_eq!(config.static_cache, 604_800);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = Config::resolve(Some(Path::new("/no/such/config.json"))).unwrap();
        assert_eq!(config.server_port, 80);
    }

    #[test]
    fn test_override_wins_per_key() {
        let (_dir, path) = write_config(r#"{"SERVER_PORT": 8080, "STATIC_CACHE": 100}"#);
        let config = Config::resolve(Some(&path)).unwrap();
        assert_eq!(config.server_port, 8080);
        assert_eq!(config.static_cache, 100);
        // Untouched keys keep their defaults.
        assert_eq!(config.server_address, "0.0.0.0");
    }

    #[test]
    fn test_route_is_replaced_wholesale() {
        let (_dir, path) = write_config(r#"{"ROUTE": {"GET": {"hello": "say_hello"}}}"#);
        let config = Config::resolve(Some(&path)).unwrap();
        assert_eq!(config.route.lookup("GET", "/hello"), Some("say_hello"));
        // The default POST table is gone, not merged in.
        assert_eq!(config.route.lookup("POST", "/"), None);
    }

    #[test]
    fn test_unrecognized_keys_are_ignored() {
        let (_dir, path) = write_config(r#"{"GPIO_PIN": 7, "SERVER_PORT": 8080}"#);
        let config = Config::resolve(Some(&path)).unwrap();
        assert_eq!(config.server_port, 8080);
    }

    #[test]
    fn test_malformed_json_is_a_parse_error() {
        let (_dir, path) = write_config("{not json");
        let err = Config::resolve(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_non_object_json_is_rejected() {
        let (_dir, path) = write_config("[1, 2, 3]");
        let err = Config::resolve(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::NotAnObject { .. }));
    }

    #[test]
    fn test_type_mismatch_is_reported() {
        let (_dir, path) = write_config(r#"{"SERVER_PORT": "eighty"}"#);
        let err = Config::resolve(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::Value(_)));
    }

    #[test]
    fn test_socket_addr() {
        let mut config = Config::resolve(None).unwrap();
        config.server_address = "127.0.0.1".to_string();
        config.server_port = 8080;
        assert_eq!(
            config.socket_addr().unwrap(),
            "127.0.0.1:8080".parse::<SocketAddr>().unwrap()
        );
    }

    #[test]
    fn test_bad_address_is_reported() {
        let mut config = Config::resolve(None).unwrap();
        config.server_address = "not an address".to_string();
        assert!(matches!(
            config.socket_addr(),
            Err(ConfigError::Address { .. })
        ));
    }
}
