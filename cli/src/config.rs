//! `quickmail.json`: where to send and which proxy to use.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use quickmail_core::ProxyConfig;
use serde::Deserialize;

pub const CONFIG_FILE_NAME: &str = "quickmail.json";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Config {
    /// Onion (or other proxied) host, optionally with a scheme.
    pub onion_address: String,
    #[serde(default)]
    pub port: String,
    /// SOCKS5 proxy `host:port`; the local Tor port when absent.
    #[serde(default)]
    pub proxy: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Config {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("could not read config file {}", path.display()))?;
        serde_json::from_str(&data)
            .with_context(|| format!("could not parse config file {}", path.display()))
    }

    /// `quickmail.json` next to the running executable.
    pub fn default_path() -> anyhow::Result<PathBuf> {
        let exe = std::env::current_exe().context("could not locate executable")?;
        let dir = exe.parent().context("executable has no parent directory")?;
        Ok(dir.join(CONFIG_FILE_NAME))
    }

    pub fn proxy_config(&self) -> ProxyConfig {
        let mut config = match &self.proxy {
            Some(address) => ProxyConfig::new(address.clone()),
            None => ProxyConfig::default(),
        };
        if let Some(secs) = self.timeout_secs.filter(|s| *s > 0) {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_minimal_config() {
        let file = write_config(r#"{"onion_address":"abcdef.onion","port":"8080"}"#);
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.onion_address, "abcdef.onion");
        assert_eq!(config.port, "8080");
        assert_eq!(config.proxy_config(), ProxyConfig::default());
    }

    #[test]
    fn port_is_optional() {
        let file = write_config(r#"{"onion_address":"abcdef.onion"}"#);
        assert_eq!(Config::load(file.path()).unwrap().port, "");
    }

    #[test]
    fn proxy_and_timeout_override_defaults() {
        let file = write_config(
            r#"{"onion_address":"abcdef.onion","proxy":"127.0.0.1:9150","timeout_secs":5}"#,
        );
        let proxy = Config::load(file.path()).unwrap().proxy_config();
        assert_eq!(proxy.address(), "127.0.0.1:9150");
        assert_eq!(proxy.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn zero_timeout_keeps_default() {
        let file = write_config(r#"{"onion_address":"abcdef.onion","timeout_secs":0}"#);
        let proxy = Config::load(file.path()).unwrap().proxy_config();
        assert_eq!(proxy.timeout(), quickmail_core::DEFAULT_TIMEOUT);
    }

    #[test]
    fn missing_file_mentions_path() {
        let err = Config::load(Path::new("/nonexistent/quickmail.json")).unwrap_err();
        assert!(err.to_string().contains("could not read config file"));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let file = write_config("{not json");
        let err = Config::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("could not parse config file"));
    }

    #[test]
    fn default_path_is_next_to_executable() {
        let path = Config::default_path().unwrap();
        assert_eq!(path.file_name().unwrap(), CONFIG_FILE_NAME);
    }
}
