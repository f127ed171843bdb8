use crate::error::{JobMapError, Result};
use jobmap_common::PairKey;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variables checked for the job-search credential, in order.
pub const API_KEY_VARS: &[&str] = &["REED_API_KEY", "API_KEY"];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub job_titles: Vec<String>,
    pub regions: Vec<String>,
    pub total_results: usize,
    pub results_per_page: usize,
    pub page_pause_ms: u64,
    pub geocode_pause_ms: u64,
    pub timeout_seconds: u64,
    pub user_agent: String,
    pub job_search_url: String,
    pub place_search_url: String,
    pub postcode_file: PathBuf,
    pub pairs_dir: PathBuf,
    pub output_file: PathBuf,
    /// Columns tried in order when picking the text to geocode for a row.
    pub location_columns: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            job_titles: vec!["data analyst".into(), "GIS".into()],
            regions: vec![
                "England".into(),
                "Scotland".into(),
                "Wales".into(),
                "Northern Ireland".into(),
                "remote".into(),
            ],
            total_results: 10_000,
            results_per_page: 100,
            page_pause_ms: 250,
            geocode_pause_ms: 1_000,
            timeout_seconds: 30,
            user_agent: "GeoLookupApp/1.0".into(),
            job_search_url: "https://www.reed.co.uk/api/1.0/search".into(),
            place_search_url: "https://nominatim.openstreetmap.org/search".into(),
            postcode_file: PathBuf::from("support_data/ukpostcodes.csv"),
            pairs_dir: PathBuf::from("tmp_outputs"),
            output_file: PathBuf::from("tmp_outputs/df_lat_long.csv"),
            location_columns: vec!["locationName".into(), "location".into()],
        }
    }
}

impl Config {
    /// Load from an explicit path, or from the default location if present.
    /// An explicit path that does not exist is an error; a missing default
    /// file just means built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => {
                if !p.exists() {
                    return Err(JobMapError::FileNotFound(p.display().to_string()));
                }
                p.to_path_buf()
            }
            None => Self::config_path()?,
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: Option<&Path>) -> Result<PathBuf> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };

        if let Some(parent) = config_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(config_path)
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| JobMapError::Config("home directory not found".into()))?;
        Ok(home.join(".config").join("jobmap").join("config.json"))
    }

    /// Job-search credential. The environment wins over the config file.
    pub fn api_key(&self) -> Result<String> {
        self.api_key_from(|name| std::env::var(name).ok())
    }

    /// Same as [`Config::api_key`] with `lookup` standing in for the environment.
    pub fn api_key_from(&self, lookup: impl Fn(&str) -> Option<String>) -> Result<String> {
        API_KEY_VARS
            .iter()
            .filter_map(|name| lookup(name))
            .chain(self.api_key.clone())
            .map(|key| key.trim().to_string())
            .find(|key| !key.is_empty())
            .ok_or(JobMapError::MissingApiKey)
    }

    /// Every (job title, region) combination, job titles outermost.
    pub fn pairs(&self) -> Result<Vec<PairKey>> {
        let mut pairs = Vec::with_capacity(self.job_titles.len() * self.regions.len());
        for job_title in &self.job_titles {
            for region in &self.regions {
                pairs.push(PairKey::new(job_title.as_str(), region.as_str())?);
            }
        }
        Ok(pairs)
    }

    /// Checks that do not touch the network or the filesystem.
    pub fn validate_fetch(&self) -> Result<()> {
        if self.results_per_page == 0 {
            return Err(JobMapError::Config("results_per_page must be greater than 0".into()));
        }
        if self.job_titles.is_empty() || self.regions.is_empty() {
            return Err(JobMapError::Config("job_titles and regions must not be empty".into()));
        }
        self.pairs()?;
        Ok(())
    }

    pub fn page_pause(&self) -> Duration {
        Duration::from_millis(self.page_pause_ms)
    }

    pub fn geocode_pause(&self) -> Duration {
        Duration::from_millis(self.geocode_pause_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}
