//! Analysis settings
//!
//! Settings are loaded with a two-layer resolution:
//! 1. Check for override in data dir (~/.local/share/finsight/config/analysis.toml)
//! 2. Fall back to embedded defaults (compiled into binary)
//!
//! Missing keys in an override keep their default values.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/analysis.toml");

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";

/// Settings for the provider and the analysis request
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisSettings {
    /// Provider base URL (no trailing slash)
    pub base_url: String,
    pub model: String,
    /// Sampling temperature sent with every request
    pub temperature: f32,
    /// Transport timeout for one analysis call
    pub timeout: Duration,
    /// Whether to request Google Search grounding
    pub web_search: bool,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.1,
            timeout: Duration::from_secs(120),
            web_search: true,
        }
    }
}

impl AnalysisSettings {
    /// Load settings from the default override location or embedded defaults
    pub fn load() -> Result<Self> {
        match default_config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => parse_config(DEFAULT_CONFIG),
        }
    }

    /// Load settings from an explicit file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        parse_config(&content)
    }

    /// Apply `GEMINI_MODEL` / `GEMINI_BASE_URL` overrides
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(model) = std::env::var("GEMINI_MODEL").ok().filter(|s| !s.is_empty()) {
            self.model = model;
        }
        if let Some(url) = std::env::var("GEMINI_BASE_URL")
            .ok()
            .filter(|s| !s.is_empty())
        {
            self.base_url = url.trim_end_matches('/').to_string();
        }
        self
    }

    /// Same settings with a different model
    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("finsight").join("config").join("analysis.toml"))
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    provider: Option<RawProvider>,
    analysis: Option<RawAnalysis>,
}

#[derive(Debug, Deserialize)]
struct RawProvider {
    base_url: Option<String>,
    model: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawAnalysis {
    temperature: Option<f32>,
    timeout_secs: Option<u64>,
    web_search: Option<bool>,
}

/// Parse settings from TOML content
fn parse_config(content: &str) -> Result<AnalysisSettings> {
    let raw: RawConfig = toml::from_str(content)
        .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

    let mut settings = AnalysisSettings::default();

    if let Some(provider) = raw.provider {
        if let Some(url) = provider.base_url {
            settings.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(model) = provider.model {
            settings.model = model;
        }
    }

    if let Some(analysis) = raw.analysis {
        if let Some(temperature) = analysis.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(Error::Config(format!(
                    "temperature must be between 0.0 and 2.0, got {}",
                    temperature
                )));
            }
            settings.temperature = temperature;
        }
        if let Some(timeout) = analysis.timeout_secs {
            settings.timeout = Duration::from_secs(timeout);
        }
        if let Some(web_search) = analysis.web_search {
            settings.web_search = web_search;
        }
    }

    Ok(settings)
}
