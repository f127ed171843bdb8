//! Online place-name search (Nominatim)

use crate::error::{JobMapError, Result};
use reqwest::header::USER_AGENT;
use serde::Deserialize;
use std::time::Duration;

/// One search hit. Nominatim returns coordinates as strings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlaceCandidate {
    pub lat: String,
    pub lon: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// A free-text place search backend.
#[allow(async_fn_in_trait)]
pub trait PlaceSearch {
    /// Return at most one candidate for `query`, best first.
    async fn search(&self, query: &str) -> Result<Vec<PlaceCandidate>>;
}

impl<T: PlaceSearch + ?Sized> PlaceSearch for &T {
    async fn search(&self, query: &str) -> Result<Vec<PlaceCandidate>> {
        (**self).search(query).await
    }
}

pub struct NominatimClient {
    http: reqwest::Client,
    base_url: String,
    user_agent: String,
}

impl NominatimClient {
    pub fn new(
        base_url: impl Into<String>,
        user_agent: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
            user_agent: user_agent.into(),
        })
    }
}

impl PlaceSearch for NominatimClient {
    async fn search(&self, query: &str) -> Result<Vec<PlaceCandidate>> {
        let response = self
            .http
            .get(&self.base_url)
            .header(USER_AGENT, &self.user_agent)
            .query(&[("q", query), ("format", "json"), ("limit", "1")])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(JobMapError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body)
            .map_err(|e| JobMapError::InvalidResponse(format!("place search: {}", e)))
    }
}
