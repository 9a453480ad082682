//! Configuration file model and discovery for certbot-deployer
//!
//! The config file is a JSON object mapping a scope name to a mapping of
//! option name to value. Scopes are either `main` (framework globals) or a
//! deployer plugin's subcommand. Values from a scope sit between a plugin's
//! built-in defaults and the command line in precedence.

use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Filename looked for during discovery.
pub const CONFIG_FILENAME: &str = "certbot-deployer.conf";

/// Directory component under the user config root.
pub const CONFIG_DIR: &str = "certbot-deployer";

/// Scope name holding the framework's own global options.
pub const GLOBAL_SCOPE: &str = "main";

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file `{}`: {source}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Options for one scope.
pub type ScopeValues = BTreeMap<String, Value>;

/// Parsed configuration: scope name to option name to value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct Config {
    scopes: BTreeMap<String, ScopeValues>,
}

impl Config {
    /// Load configuration from `path`.
    ///
    /// A missing file yields an empty configuration; an unreadable or
    /// malformed file is an error.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no config file, using empty configuration");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let config: Config = serde_json::from_str(&content).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), scopes = config.scopes.len(), "config file loaded");
        Ok(config)
    }

    /// Discover and load the configuration from the standard locations.
    ///
    /// Checks, in order: `$XDG_CONFIG_HOME/certbot-deployer/`, then
    /// `$HOME/.config/certbot-deployer/`, then `/etc/`. The first existing
    /// file wins; none existing yields an empty configuration.
    pub fn discover() -> Result<Self, ConfigError> {
        for path in search_paths() {
            if path.is_file() {
                return Self::load(&path);
            }
        }
        Ok(Self::default())
    }

    /// The options registered under `name`, if the scope exists.
    pub fn scope(&self, name: &str) -> Option<&ScopeValues> {
        self.scopes.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }
}

/// Candidate config file paths, most specific first.
pub fn search_paths() -> Vec<PathBuf> {
    search_paths_from(
        std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from),
        std::env::var_os("HOME").map(PathBuf::from),
    )
}

fn search_paths_from(xdg_config_home: Option<PathBuf>, home: Option<PathBuf>) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    let user_config_root = xdg_config_home.or_else(|| home.map(|home| home.join(".config")));
    if let Some(root) = user_config_root {
        paths.push(root.join(CONFIG_DIR).join(CONFIG_FILENAME));
    }
    paths.push(Path::new("/etc").join(CONFIG_FILENAME));
    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let config = Config::load(dir.path().join(CONFIG_FILENAME)).unwrap();
        assert!(config.is_empty());
    }

    #[test]
    fn test_load_scopes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(
            &path,
            r#"{"main": {"verbosity": 1}, "dummy": {"dummy_arg": "bar"}}"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(
            config.scope("main").unwrap().get("verbosity"),
            Some(&json!(1))
        );
        assert_eq!(
            config.scope("dummy").unwrap().get("dummy_arg"),
            Some(&json!("bar"))
        );
        assert!(config.scope("unknown").is_none());
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "{not json").unwrap();

        assert!(matches!(Config::load(&path), Err(ConfigError::Json { .. })));
    }

    #[test]
    fn test_scope_must_be_an_object() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, r#"{"main": "not-a-mapping"}"#).unwrap();

        assert!(matches!(Config::load(&path), Err(ConfigError::Json { .. })));
    }

    #[test]
    fn test_search_path_order() {
        let paths = search_paths_from(
            Some(PathBuf::from("/xdg")),
            Some(PathBuf::from("/home/user")),
        );
        assert_eq!(
            paths,
            vec![
                PathBuf::from("/xdg/certbot-deployer/certbot-deployer.conf"),
                PathBuf::from("/etc/certbot-deployer.conf"),
            ]
        );
    }

    #[test]
    fn test_search_path_falls_back_to_home() {
        let paths = search_paths_from(None, Some(PathBuf::from("/home/user")));
        assert_eq!(
            paths,
            vec![
                PathBuf::from("/home/user/.config/certbot-deployer/certbot-deployer.conf"),
                PathBuf::from("/etc/certbot-deployer.conf"),
            ]
        );
    }

    #[test]
    fn test_search_path_without_home() {
        let paths = search_paths_from(None, None);
        assert_eq!(paths, vec![PathBuf::from("/etc/certbot-deployer.conf")]);
    }
}
