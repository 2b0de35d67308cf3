use serde::Deserialize;
use std::path::PathBuf;

use crate::api::category::{CATEGORY_SEARCH_URL, MAX_CATEGORY_LIMIT};
use crate::api::geocoding::GEOCODING_URL;

pub mod credentials;

pub use credentials::CredentialSources;

pub const DEFAULT_INPUT: &str = "Steder/StedertstAlle.csv";
pub const DEFAULT_GEOJSON_OUTPUT: &str = "steder.geojson";
pub const DEFAULT_CATEGORY_OUTPUT: &str = "mall.csv";

fn default_input() -> PathBuf {
    PathBuf::from(DEFAULT_INPUT)
}
fn default_output() -> PathBuf {
    PathBuf::from(DEFAULT_GEOJSON_OUTPUT)
}
fn default_verbose() -> bool {
    false
}

/// Settings read from `stedkart.toml`; every field is optional
#[derive(Debug, Deserialize)]
pub struct FileConfig {
    #[serde(default = "default_input")]
    pub input: PathBuf,
    #[serde(default = "default_output")]
    pub output: PathBuf,
    #[serde(default = "default_verbose")]
    pub verbose: bool,
    #[serde(default)]
    pub geocoding: GeocodingConfig,
    #[serde(default)]
    pub category: CategoryConfig,
    #[serde(default)]
    pub credentials: CredentialSources,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            input: default_input(),
            output: default_output(),
            verbose: default_verbose(),
            geocoding: GeocodingConfig::default(),
            category: CategoryConfig::default(),
            credentials: CredentialSources::default(),
        }
    }
}

fn default_geocoding_url() -> String {
    GEOCODING_URL.to_string()
}
fn default_country_name() -> String {
    "Norway".to_string()
}
fn default_country_code() -> String {
    "no".to_string()
}
fn default_geocoding_timeout_secs() -> u64 {
    10
}
fn default_delay_ms() -> u64 {
    100
}

#[derive(Debug, Deserialize, Clone)]
pub struct GeocodingConfig {
    #[serde(default = "default_geocoding_url")]
    pub url: String,
    /// Appended to every address query
    #[serde(default = "default_country_name")]
    pub country_name: String,
    /// Country filter sent to the API
    #[serde(default = "default_country_code")]
    pub country_code: String,
    #[serde(default = "default_geocoding_timeout_secs")]
    pub timeout_secs: u64,
    /// Pause after each successful lookup
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            url: default_geocoding_url(),
            country_name: default_country_name(),
            country_code: default_country_code(),
            timeout_secs: default_geocoding_timeout_secs(),
            delay_ms: default_delay_ms(),
        }
    }
}

fn default_category_url() -> String {
    CATEGORY_SEARCH_URL.to_string()
}
fn default_category() -> String {
    "shopping_mall".to_string()
}
fn default_category_country() -> String {
    "NO".to_string()
}
fn default_language() -> String {
    "nb".to_string()
}
fn default_limit() -> u32 {
    MAX_CATEGORY_LIMIT
}
fn default_category_output() -> PathBuf {
    PathBuf::from(DEFAULT_CATEGORY_OUTPUT)
}

#[derive(Debug, Deserialize, Clone)]
pub struct CategoryConfig {
    #[serde(default = "default_category_url")]
    pub url: String,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default = "default_category_country")]
    pub country: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default = "default_category_output")]
    pub output: PathBuf,
}

impl Default for CategoryConfig {
    fn default() -> Self {
        Self {
            url: default_category_url(),
            category: default_category(),
            country: default_category_country(),
            language: default_language(),
            limit: default_limit(),
            output: default_category_output(),
        }
    }
}

impl FileConfig {
    pub fn load() -> Option<Self> {
        let config_paths = get_config_paths();

        for path in config_paths {
            if path.exists()
                && let Ok(contents) = std::fs::read_to_string(&path)
            {
                match toml::from_str(&contents) {
                    Ok(config) => return Some(config),
                    Err(e) => {
                        eprintln!("Warning: Failed to parse config file {:?}: {}", path, e);
                    }
                }
            }
        }
        None
    }
}

fn get_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    paths.push(PathBuf::from("stedkart.toml"));
    paths.push(PathBuf::from(".stedkart.toml"));

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("stedkart").join("config.toml"));
        paths.push(config_dir.join("stedkart.toml"));
    }

    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".stedkart.toml"));
        paths.push(home.join(".config").join("stedkart").join("config.toml"));
    }

    paths
}
