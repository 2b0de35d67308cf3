use anyhow::{Context, Result, bail};
use reqwest::Url;
use serde_json::Value;

pub const CATEGORY_SEARCH_URL: &str = "https://api.mapbox.com/search/searchbox/v1/category";
const USER_AGENT: &str = concat!("stedkart/", env!("CARGO_PKG_VERSION"));

/// Largest `limit` the category endpoint accepts
pub const MAX_CATEGORY_LIMIT: u32 = 25;

/// Parameters for one category search
#[derive(Debug, Clone)]
pub struct CategoryQuery {
    /// Canonical category id, e.g. "shopping_mall"
    pub category: String,
    /// ISO 3166 alpha-2 country filter
    pub country: String,
    pub language: String,
    pub limit: u32,
}

impl CategoryQuery {
    /// Limit clamped to what the API accepts
    pub fn effective_limit(&self) -> u32 {
        self.limit.clamp(1, MAX_CATEGORY_LIMIT)
    }
}

/// Client for the Search Box category endpoint
pub struct CategorySearchClient {
    client: reqwest::blocking::Client,
    base_url: String,
    access_token: String,
}

impl CategorySearchClient {
    pub fn new(base_url: &str, access_token: &str) -> Result<Self> {
        if access_token.trim().is_empty() {
            bail!("Access token must be set for category search");
        }

        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token: access_token.to_string(),
        })
    }

    pub fn request_url(&self, query: &CategoryQuery) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .with_context(|| format!("Invalid category search URL: {}", self.base_url))?;

        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("Category search URL cannot be a base: {}", self.base_url))?
            .push(&query.category);

        url.query_pairs_mut()
            .append_pair("access_token", &self.access_token)
            .append_pair("country", &query.country)
            .append_pair("language", &query.language)
            .append_pair("limit", &query.effective_limit().to_string());

        Ok(url)
    }

    /// Run one category search and return the raw result features.
    ///
    /// Fails on transport errors and non-2xx responses; there is no retry.
    pub fn search(&self, query: &CategoryQuery) -> Result<Vec<Value>> {
        let url = self.request_url(query)?;

        let response = self
            .client
            .get(url)
            .send()
            .map_err(reqwest::Error::without_url)
            .context("Failed to send request to category search API")?;

        if !response.status().is_success() {
            bail!(
                "Category search API returned error status: {}",
                response.status()
            );
        }

        let body = response
            .text()
            .map_err(reqwest::Error::without_url)
            .context("Failed to read category search response")?;

        parse_category_response(&body)
    }
}

/// Pull the `features` array out of a category search response
pub fn parse_category_response(body: &str) -> Result<Vec<Value>> {
    let data: Value =
        serde_json::from_str(body).context("Failed to parse category search JSON response")?;

    match data.get("features") {
        Some(Value::Array(features)) => Ok(features.clone()),
        _ => Ok(Vec::new()),
    }
}
