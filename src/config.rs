use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::constants::{
    DEFAULT_CSV_DIR, DEFAULT_CSV_FILENAME, DEFAULT_OUTPUT_DIR, DEFAULT_SOURCE_URL,
    DEFAULT_USER_AGENT,
};
use crate::error::{Result, SeederError};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub source: SourceConfig,
    pub extract: ExtractConfig,
}

/// Where and how the register is fetched.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub url: String,
    pub csv_storage_path: PathBuf,
    pub csv_filename: String,
    pub request_timeout_secs: u64,
    pub request_delay_ms: u64,
    pub max_retries: u32,
    pub verify_ssl: bool,
    pub user_agent: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_SOURCE_URL.to_string(),
            csv_storage_path: PathBuf::from(DEFAULT_CSV_DIR),
            csv_filename: DEFAULT_CSV_FILENAME.to_string(),
            request_timeout_secs: 3000,
            request_delay_ms: 1000,
            max_retries: 3,
            verify_ssl: true,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    pub output_dir: PathBuf,
    /// Replacement degree synonym table; the bundled one is used when unset
    pub degree_synonyms: Option<PathBuf>,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            degree_synonyms: None,
        }
    }
}

impl Config {
    /// Load from a TOML file, falling back to defaults when the file does not exist,
    /// then apply `KMPDC_*` environment overrides.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let content = fs::read_to_string(path).map_err(|e| {
                SeederError::Config(format!(
                    "Failed to read config file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
            Self::from_toml_str(&content)?
        } else {
            debug!("Config file {} not found, using defaults", path.display());
            Self::default()
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply `KMPDC_*` overrides read through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let source = &mut self.source;
        if let Some(v) = lookup("KMPDC_SOURCE_URL") {
            source.url = v;
        }
        if let Some(v) = lookup("KMPDC_CSV_PATH") {
            source.csv_storage_path = PathBuf::from(v);
        }
        if let Some(v) = lookup("KMPDC_CSV_FILENAME") {
            source.csv_filename = v;
        }
        if let Some(v) = lookup("KMPDC_REQUEST_TIMEOUT") {
            source.request_timeout_secs = parse_override("KMPDC_REQUEST_TIMEOUT", &v)?;
        }
        if let Some(v) = lookup("KMPDC_REQUEST_DELAY") {
            source.request_delay_ms = parse_override("KMPDC_REQUEST_DELAY", &v)?;
        }
        if let Some(v) = lookup("KMPDC_MAX_RETRIES") {
            source.max_retries = parse_override("KMPDC_MAX_RETRIES", &v)?;
        }
        if let Some(v) = lookup("KMPDC_VERIFY_SSL") {
            source.verify_ssl = parse_override("KMPDC_VERIFY_SSL", &v)?;
        }
        if let Some(v) = lookup("KMPDC_USER_AGENT") {
            source.user_agent = v;
        }
        if let Some(v) = lookup("KMPDC_OUTPUT_DIR") {
            self.extract.output_dir = PathBuf::from(v);
        }
        Ok(())
    }
}

fn parse_override<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| SeederError::Config(format!("Invalid value for {}: '{}'", key, value)))
}
