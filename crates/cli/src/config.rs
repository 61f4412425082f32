//! Optional `palaver.toml` in the working directory.
//!
//! Everything has a default, so the file is never required; command-line
//! flags override whatever it provides.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, warn};

const CONFIG_FILENAME: &str = "palaver.toml";

/// Root configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PalaverConfig {
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address.
    pub bind: String,
    /// Listen port.
    pub port: u16,
    /// Credential file, `username:password` lines.
    pub users_file: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".into(),
            port: 12345,
            users_file: "users.txt".into(),
        }
    }
}

/// Load `palaver.toml` from the working directory, falling back to
/// defaults when absent or unreadable.
pub fn discover_and_load() -> PalaverConfig {
    let path = Path::new(CONFIG_FILENAME);
    if !path.exists() {
        debug!("no config file found, using defaults");
        return PalaverConfig::default();
    }
    match load(path) {
        Ok(config) => config,
        Err(error) => {
            warn!(path = %path.display(), %error, "failed to load config, using defaults");
            PalaverConfig::default()
        },
    }
}

/// Load and parse one config file.
pub fn load(path: &Path) -> anyhow::Result<PalaverConfig> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    Ok(toml::from_str(&raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write;

    #[test]
    fn defaults_match_the_historical_server() {
        let config = PalaverConfig::default();
        assert_eq!(config.server.bind, "127.0.0.1");
        assert_eq!(config.server.port, 12345);
        assert_eq!(config.server.users_file, PathBuf::from("users.txt"));
    }

    #[test]
    fn partial_config_keeps_defaults_for_the_rest() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[server]\nport = 9000\n").unwrap();

        let config = load(file.path()).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.bind, "127.0.0.1");
    }

    #[test]
    fn full_config_parses() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "[server]\nbind = \"0.0.0.0\"\nport = 4000\nusers_file = \"creds/users.txt\"\n"
        )
        .unwrap();

        let config = load(file.path()).unwrap();
        assert_eq!(config.server.bind, "0.0.0.0");
        assert_eq!(config.server.port, 4000);
        assert_eq!(config.server.users_file, PathBuf::from("creds/users.txt"));
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[server\nport = ").unwrap();
        assert!(load(file.path()).is_err());
    }
}
