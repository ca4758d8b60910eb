use std::fs;
use std::path::{Path, PathBuf};

use crate::model::config::AppConfig;

/// Error type for config loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Get the config directory, respecting XDG_CONFIG_HOME
pub fn config_dir() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .ok()
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| home_dir().join(".config"));
    base.join("repodock")
}

/// Get the user's home directory
pub fn home_dir() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/"))
}

/// Read `config.toml` from the given directory. A missing file yields defaults.
pub fn read_config(dir: &Path) -> Result<AppConfig, ConfigError> {
    let path = dir.join("config.toml");
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let text = fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        source: e,
    })?;
    toml::from_str(&text).map_err(|e| ConfigError::ParseError { path, source: e })
}

/// Resolve the store file: explicit override, then `[storage] path`,
/// then `defaults.json` in the config directory.
pub fn store_path(dir: &Path, config: &AppConfig, override_path: Option<&Path>) -> PathBuf {
    if let Some(p) = override_path {
        return p.to_path_buf();
    }
    match config.storage.path.as_deref() {
        Some(p) => expand_home(p),
        None => dir.join("defaults.json"),
    }
}

/// Expand a leading `~/` to the home directory
pub fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => home_dir().join(rest),
        None => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_config_is_default() {
        let tmp = TempDir::new().unwrap();
        let config = read_config(tmp.path()).unwrap();
        assert!(config.storage.path.is_none());
    }

    #[test]
    fn malformed_config_is_an_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "[storage\npath = ").unwrap();
        let err = read_config(tmp.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    fn store_path_precedence() {
        let tmp = TempDir::new().unwrap();
        let mut config = AppConfig::default();
        assert_eq!(
            store_path(tmp.path(), &config, None),
            tmp.path().join("defaults.json")
        );

        config.storage.path = Some("/srv/dock.json".into());
        assert_eq!(
            store_path(tmp.path(), &config, None),
            PathBuf::from("/srv/dock.json")
        );

        let explicit = tmp.path().join("other.json");
        assert_eq!(store_path(tmp.path(), &config, Some(&explicit)), explicit);
    }

    #[test]
    fn expand_home_only_touches_tilde_prefix() {
        assert_eq!(expand_home("/abs/path"), PathBuf::from("/abs/path"));
        assert_eq!(expand_home("~/x"), home_dir().join("x"));
    }
}
