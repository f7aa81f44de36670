use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};

use crate::transport::Transport;

const DEFAULT_ASSET_BASE: &str = "https://concierge-widget.github.io/assets/chat";
const DEFAULT_MODEL: &str = "openai/gpt-3.5-turbo";
const DEFAULT_REFERRER: &str = "https://concierge-widget.github.io";
const DEFAULT_TITLE: &str = "Concierge Assistant";

/// Widget configuration, stored as JSON under the user config directory.
/// Every field is optional in the file; the accessors resolve defaults so
/// callers never see `None`.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Config {
    pub transport: Option<String>,
    pub asset_base: Option<String>,
    pub completion_url: Option<String>,
    pub model: Option<String>,
    pub referrer: Option<String>,
    pub title: Option<String>,
}

impl Config {
    pub fn new() -> Self {
        Self {
            transport: Some(Transport::Proxy.as_str().to_string()),
            asset_base: None,
            completion_url: None,
            model: None,
            referrer: None,
            title: None,
        }
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("concierge").join("config.json"))
    }

    // Resolved accessors

    pub fn transport_kind(&self) -> Transport {
        self.transport
            .as_deref()
            .and_then(Transport::from_str)
            .unwrap_or(Transport::Proxy)
    }

    pub fn asset_base(&self) -> String {
        self.asset_base
            .clone()
            .unwrap_or_else(|| DEFAULT_ASSET_BASE.to_string())
    }

    pub fn system_prompt_url(&self) -> String {
        format!("{}/system-prompt.txt", self.asset_base().trim_end_matches('/'))
    }

    pub fn api_key_url(&self) -> String {
        format!("{}/api-key.txt", self.asset_base().trim_end_matches('/'))
    }

    /// Completion endpoint; defaults per transport so switching transports
    /// without an explicit URL still points somewhere sensible.
    pub fn completion_url(&self) -> String {
        self.completion_url
            .clone()
            .unwrap_or_else(|| self.transport_kind().default_endpoint().to_string())
    }

    pub fn model(&self) -> String {
        self.model.clone().unwrap_or_else(|| DEFAULT_MODEL.to_string())
    }

    pub fn referrer(&self) -> String {
        self.referrer
            .clone()
            .unwrap_or_else(|| DEFAULT_REFERRER.to_string())
    }

    pub fn title(&self) -> String {
        self.title.clone().unwrap_or_else(|| DEFAULT_TITLE.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_the_proxy_transport() {
        let config = Config::new();
        assert_eq!(config.transport_kind(), Transport::Proxy);
        assert_eq!(config.completion_url(), Transport::Proxy.default_endpoint());
        assert_eq!(config.model(), DEFAULT_MODEL);
        assert_eq!(config.title(), DEFAULT_TITLE);
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config.transport_kind(), Transport::Proxy);
    }

    #[test]
    fn round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("concierge").join("config.json");

        let mut config = Config::new();
        config.transport = Some("openrouter".to_string());
        config.model = Some("openai/gpt-4o-mini".to_string());
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.transport_kind(), Transport::OpenRouter);
        assert_eq!(loaded.model(), "openai/gpt-4o-mini");
        assert_eq!(
            loaded.completion_url(),
            Transport::OpenRouter.default_endpoint()
        );
    }

    #[test]
    fn partial_files_leave_unset_fields_defaulted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"model":"openai/gpt-4o"}"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.model(), "openai/gpt-4o");
        assert_eq!(config.transport_kind(), Transport::Proxy);
    }

    #[test]
    fn asset_urls_tolerate_trailing_slashes() {
        let mut config = Config::new();
        config.asset_base = Some("https://assets.example.com/chat/".to_string());
        assert_eq!(
            config.system_prompt_url(),
            "https://assets.example.com/chat/system-prompt.txt"
        );
        assert_eq!(
            config.api_key_url(),
            "https://assets.example.com/chat/api-key.txt"
        );
    }
}
