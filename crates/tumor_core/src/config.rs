use crate::encoding::MimePolicy;
use crate::error::ConfigError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Environment variable that overrides the configured endpoint.
pub const ENDPOINT_ENV: &str = "BRAINSCAN_ENDPOINT";

/// Top-level configuration file (`config.toml`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub client: ClientConfig,
}

/// Settings for talking to the prediction service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub endpoint: String,
    /// Upper bound for a whole request, upload included.
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub mime: MimePolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:5000/predict".to_string(),
            timeout_secs: 30,
            connect_timeout_secs: 5,
            mime: MimePolicy::default(),
        }
    }
}

impl ClientConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        let endpoint = self.endpoint.trim();
        if endpoint.is_empty() {
            return Err(ConfigError::EmptyEndpoint);
        }
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(ConfigError::UnsupportedScheme(endpoint.to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout("timeout_secs"));
        }
        if self.connect_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout("connect_timeout_secs"));
        }
        if let MimePolicy::Fixed(mime) = &self.mime {
            let ok = mime
                .strip_prefix("image/")
                .is_some_and(|sub| !sub.is_empty() && !sub.contains([';', ',']));
            if !ok {
                return Err(ConfigError::BadMime(mime.clone()));
            }
        }
        Ok(())
    }

    /// Settings to write back to the config file after the user edited the
    /// running settings `effective` into `edited`. `self` is what the file
    /// holds. Fields the user did not touch keep the file's value, so an
    /// environment override is never persisted.
    pub fn merge_edits(&self, effective: &ClientConfig, edited: &ClientConfig) -> ClientConfig {
        fn pick<T: PartialEq + Clone>(stored: &T, effective: &T, edited: &T) -> T {
            if edited != effective {
                edited.clone()
            } else {
                stored.clone()
            }
        }
        ClientConfig {
            endpoint: pick(&self.endpoint, &effective.endpoint, &edited.endpoint),
            timeout_secs: pick(&self.timeout_secs, &effective.timeout_secs, &edited.timeout_secs),
            connect_timeout_secs: pick(
                &self.connect_timeout_secs,
                &effective.connect_timeout_secs,
                &edited.connect_timeout_secs,
            ),
            mime: pick(&self.mime, &effective.mime, &edited.mime),
        }
    }
}

impl AppConfig {
    /// Load from a TOML file. A missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::info!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read config: {}", path.display()))?;
        let cfg: AppConfig = toml::from_str(&raw)
            .with_context(|| format!("invalid config: {}", path.display()))?;
        cfg.client.validate()?;
        Ok(cfg)
    }

    /// Write the configuration as TOML, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("cannot create {}", parent.display()))?;
        }
        let raw = toml::to_string_pretty(self).context("cannot serialise config")?;
        std::fs::write(path, raw).with_context(|| format!("cannot write {}", path.display()))?;
        Ok(())
    }

    pub fn apply_env_overrides(&mut self) {
        self.apply_endpoint_override(std::env::var(ENDPOINT_ENV).ok());
    }

    fn apply_endpoint_override(&mut self, value: Option<String>) {
        if let Some(endpoint) = value.filter(|v| !v.trim().is_empty()) {
            tracing::info!("endpoint overridden by {ENDPOINT_ENV}: {endpoint}");
            self.client.endpoint = endpoint.trim().to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_gives_defaults() -> Result<()> {
        let dir = tempdir()?;
        let cfg = AppConfig::load(dir.path().join("config.toml"))?;
        assert_eq!(cfg, AppConfig::default());
        assert_eq!(cfg.client.endpoint, "http://localhost:5000/predict");
        assert_eq!(cfg.client.mime, MimePolicy::Fixed("image/jpeg".into()));
        Ok(())
    }

    #[test]
    fn partial_file_keeps_other_defaults() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[client]\nendpoint = \"https://scanner.local/predict\"\nmime = \"detect\"\n",
        )?;
        let cfg = AppConfig::load(&path)?;
        assert_eq!(cfg.client.endpoint, "https://scanner.local/predict");
        assert_eq!(cfg.client.mime, MimePolicy::Detect);
        assert_eq!(cfg.client.timeout_secs, 30);
        Ok(())
    }

    #[test]
    fn fixed_mime_from_table() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[client]\nmime = { fixed = \"image/png\" }\n")?;
        let cfg = AppConfig::load(&path)?;
        assert_eq!(cfg.client.mime, MimePolicy::Fixed("image/png".into()));
        Ok(())
    }

    #[test]
    fn malformed_file_is_an_error() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[client\nendpoint = ")?;
        assert!(AppConfig::load(&path).is_err());
        Ok(())
    }

    #[test]
    fn zero_timeout_is_rejected_on_load() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[client]\ntimeout_secs = 0\n")?;
        let err = AppConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains("timeout_secs"));
        Ok(())
    }

    #[test]
    fn save_then_load_preserves_values() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("nested").join("config.toml");
        let mut cfg = AppConfig::default();
        cfg.client.timeout_secs = 12;
        cfg.save(&path)?;
        assert_eq!(AppConfig::load(&path)?, cfg);
        Ok(())
    }

    #[test]
    fn validate_rejects_bad_values() {
        let mut c = ClientConfig::default();
        c.endpoint = "  ".into();
        assert_eq!(c.validate(), Err(ConfigError::EmptyEndpoint));

        let mut c = ClientConfig::default();
        c.endpoint = "ftp://host/predict".into();
        assert!(matches!(c.validate(), Err(ConfigError::UnsupportedScheme(_))));

        let mut c = ClientConfig::default();
        c.mime = MimePolicy::Fixed("text/plain".into());
        assert!(matches!(c.validate(), Err(ConfigError::BadMime(_))));

        assert_eq!(ClientConfig::default().validate(), Ok(()));
    }

    #[test]
    fn endpoint_override_ignores_blank_values() {
        let mut cfg = AppConfig::default();
        cfg.apply_endpoint_override(Some("   ".into()));
        assert_eq!(cfg.client.endpoint, ClientConfig::default().endpoint);
        cfg.apply_endpoint_override(Some(" http://10.0.0.2:5000/predict ".into()));
        assert_eq!(cfg.client.endpoint, "http://10.0.0.2:5000/predict");
        cfg.apply_endpoint_override(None);
        assert_eq!(cfg.client.endpoint, "http://10.0.0.2:5000/predict");
    }

    #[test]
    fn env_endpoint_is_not_persisted_by_unrelated_edits() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("config.toml");
        let stored = AppConfig::default();
        stored.save(&path)?;

        let mut effective = stored.clone();
        effective.apply_endpoint_override(Some("http://x/predict".into()));

        let mut edited = effective.client.clone();
        edited.mime = MimePolicy::Detect;
        let to_save = AppConfig {
            client: stored.client.merge_edits(&effective.client, &edited),
        };
        to_save.save(&path)?;

        let reloaded = AppConfig::load(&path)?;
        assert_eq!(reloaded.client.endpoint, "http://localhost:5000/predict");
        assert_eq!(reloaded.client.mime, MimePolicy::Detect);
        Ok(())
    }

    #[test]
    fn explicit_endpoint_edit_is_persisted_over_override() {
        let stored = ClientConfig::default();
        let mut effective = stored.clone();
        effective.endpoint = "http://x/predict".into();
        let mut edited = effective.clone();
        edited.endpoint = "https://scanner.local/predict".into();
        edited.timeout_secs = 60;

        let merged = stored.merge_edits(&effective, &edited);
        assert_eq!(merged.endpoint, "https://scanner.local/predict");
        assert_eq!(merged.timeout_secs, 60);
        assert_eq!(merged.mime, stored.mime);
    }
}
