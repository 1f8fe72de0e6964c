use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure loaded from sds_console.toml and environment variables
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

/// Backend service endpoints and transport behavior
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceConfig {
    /// Origin of the primary POST/JSON integration
    pub base_url: String,
    /// Origin of the legacy GET/query-string integration
    pub legacy_base_url: String,
    pub timeout_ms: u64,
}

/// Interactive-mode behavior
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UiConfig {
    /// Quiet period after the last keystroke before a validation request fires
    pub debounce_ms: u64,
    /// Inputs shorter than this never trigger validation
    pub min_validate_len: usize,
    /// Where TUI-mode tracing output goes (the terminal belongs to ratatui)
    pub log_file: Option<PathBuf>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            legacy_base_url: "http://127.0.0.1:8001".to_string(),
            timeout_ms: 15_000,
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 500,
            min_validate_len: 2,
            log_file: None,
        }
    }
}

impl Config {
    /// Load configuration: sds_console.toml (cwd, then the user config dir),
    /// then SDSC_* environment overrides on top.
    pub fn load() -> anyhow::Result<Self> {
        let mut config = match Self::find_config_file() {
            Some(path) => {
                let raw = std::fs::read_to_string(&path)?;
                toml::from_str(&raw)?
            }
            None => Self::default(),
        };
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    fn find_config_file() -> Option<PathBuf> {
        let local = PathBuf::from("sds_console.toml");
        if local.is_file() {
            return Some(local);
        }
        let dir = dirs::config_dir()?.join("sds-console").join("sds_console.toml");
        dir.is_file().then_some(dir)
    }

    /// Environment variables win over file values.
    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("SDSC_BASE_URL") {
            self.service.base_url = url;
        }
        if let Ok(url) = std::env::var("SDSC_LEGACY_BASE_URL") {
            self.service.legacy_base_url = url;
        }
        if let Some(ms) = std::env::var("SDSC_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
        {
            self.service.timeout_ms = ms;
        }
        if let Some(ms) = std::env::var("SDSC_DEBOUNCE_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
        {
            self.ui.debounce_ms = ms;
        }
        if let Some(len) = std::env::var("SDSC_MIN_VALIDATE_LEN")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
        {
            self.ui.min_validate_len = len;
        }
        if let Ok(path) = std::env::var("SDSC_LOG_FILE") {
            self.ui.log_file = Some(PathBuf::from(path));
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        for (name, url) in [
            ("base_url", &self.service.base_url),
            ("legacy_base_url", &self.service.legacy_base_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                anyhow::bail!("{name} must be an http(s) origin, got '{url}'");
            }
        }
        if self.service.timeout_ms == 0 {
            anyhow::bail!("SDSC_TIMEOUT_MS must be > 0");
        }
        if self.ui.debounce_ms == 0 {
            anyhow::bail!("SDSC_DEBOUNCE_MS must be > 0");
        }
        if self.ui.min_validate_len == 0 {
            anyhow::bail!("SDSC_MIN_VALIDATE_LEN must be > 0");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn rejects_non_http_origin() {
        let mut config = Config::default();
        config.service.base_url = "ftp://example.org".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_zero_debounce() {
        let mut config = Config::default();
        config.ui.debounce_ms = 0;
        assert!(config.validate().is_err());
    }
}
