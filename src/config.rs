use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Context, Result, anyhow};

/// Chat endpoint used when neither the command line nor the config file names one
pub const DEFAULT_ENDPOINT: &str = "https://e-commerce-bot-ohxx.onrender.com/chat";

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub endpoint: Option<String>,
}

impl Config {
    /// Load from the default location, falling back to defaults when absent
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let config_content = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: Config = serde_json::from_str(&config_content)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(config)
    }

    /// Pick the endpoint: explicit override, then this file, then the default.
    ///
    /// The result must be an absolute http(s) URL.
    pub fn resolve_endpoint(&self, cli_override: Option<&str>) -> Result<String> {
        let endpoint = cli_override
            .or(self.endpoint.as_deref())
            .unwrap_or(DEFAULT_ENDPOINT)
            .trim();

        let url = reqwest::Url::parse(endpoint)
            .with_context(|| format!("invalid chat endpoint {:?}", endpoint))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(anyhow!(
                "chat endpoint must use http or https, got {:?}",
                url.scheme()
            ));
        }
        Ok(endpoint.to_string())
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("ebot").join("config.json"))
    }
}
