//! Dashboard configuration

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use ruea_core::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, PAGE_SIZE_OPTIONS};

use crate::fetch::FetchLimits;
use crate::DataError;

/// Environment variable naming the configuration file
pub const CONFIG_ENV: &str = "RUEA_CONFIG";

/// Environment variable overriding `api_base_url`
pub const BASE_URL_ENV: &str = "RUEA_API_BASE_URL";

/// File read when `RUEA_CONFIG` is not set
pub const DEFAULT_CONFIG_FILE: &str = "ruea-dashboard.json";

/// Settings of the dashboard; every key is optional in the file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Origin of the API; `/api/v1` is appended
    pub api_base_url: String,

    /// Deadline of every request, e.g. "30s" or "1m 30s"
    #[serde(with = "duration_text")]
    pub request_timeout: Duration,

    /// Initial page size of the table
    pub default_page_size: usize,

    /// Page sizes offered by the table
    pub page_size_options: Vec<usize>,

    /// Rows sampled when facets are derived client-side
    pub facet_sample_limit: usize,

    /// Page size of full scans
    pub fetch_page_size: usize,

    /// Row cap of full scans
    pub fetch_max_rows: usize,

    /// Veredas shown in the statistics chart
    pub top_veredas: usize,

    /// Places per ranking in client-side summaries
    pub summary_top: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000".to_string(),
            request_timeout: Duration::from_secs(30),
            default_page_size: DEFAULT_PAGE_SIZE,
            page_size_options: PAGE_SIZE_OPTIONS.to_vec(),
            facet_sample_limit: 5000,
            fetch_page_size: MAX_PAGE_SIZE,
            fetch_max_rows: 20_000,
            top_veredas: 10,
            summary_top: 5,
        }
    }
}

impl DashboardConfig {
    /// Read a JSON configuration file; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Self, DataError> {
        if !path.exists() {
            tracing::debug!("No configuration at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)
            .map_err(|e| DataError::Config(format!("{}: {}", path.display(), e)))?;
        tracing::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Configuration from `RUEA_CONFIG` (or the default file) with the
    /// `RUEA_API_BASE_URL` override applied, validated
    pub fn from_env() -> Result<Self, DataError> {
        let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        let mut config = Self::load(Path::new(&path))?;

        if let Ok(base_url) = std::env::var(BASE_URL_ENV) {
            if !base_url.trim().is_empty() {
                config.api_base_url = base_url.trim().to_string();
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject settings the dashboard cannot work with
    pub fn validate(&self) -> Result<(), DataError> {
        let url = reqwest::Url::parse(&self.api_base_url)
            .map_err(|e| DataError::Config(format!("api_base_url '{}': {}", self.api_base_url, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(DataError::Config(format!(
                "api_base_url must be http or https, got '{}'",
                url.scheme()
            )));
        }

        if self.request_timeout.is_zero() {
            return Err(DataError::Config("request_timeout must be positive".to_string()));
        }

        let sizes = [
            ("default_page_size", self.default_page_size),
            ("fetch_page_size", self.fetch_page_size),
        ];
        for (name, size) in sizes {
            if size == 0 || size > MAX_PAGE_SIZE {
                return Err(DataError::Config(format!(
                    "{} must be between 1 and {}",
                    name, MAX_PAGE_SIZE
                )));
            }
        }

        if self.page_size_options.is_empty()
            || self.page_size_options.iter().any(|&size| size == 0 || size > MAX_PAGE_SIZE)
        {
            return Err(DataError::Config(format!(
                "page_size_options must be non-empty sizes between 1 and {}",
                MAX_PAGE_SIZE
            )));
        }

        let caps = [
            ("facet_sample_limit", self.facet_sample_limit),
            ("fetch_max_rows", self.fetch_max_rows),
            ("top_veredas", self.top_veredas),
            ("summary_top", self.summary_top),
        ];
        if let Some((name, _)) = caps.iter().find(|(_, value)| *value == 0) {
            return Err(DataError::Config(format!("{} must be positive", name)));
        }

        Ok(())
    }

    /// Bounds of stats and summary scans
    pub fn fetch_limits(&self) -> FetchLimits {
        FetchLimits::new(self.fetch_page_size, self.fetch_max_rows)
    }

    /// Bounds of the facet sample
    pub fn facet_limits(&self) -> FetchLimits {
        FetchLimits::new(self.fetch_page_size, self.facet_sample_limit)
    }
}

mod duration_text {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&humantime::format_duration(*duration).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let text = String::deserialize(deserializer)?;
        humantime::parse_duration(&text).map_err(serde::de::Error::custom)
    }
}
