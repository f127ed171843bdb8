//! Reed job-search API client

use super::{JobSource, PageQuery};
use crate::error::{JobMapError, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use jobmap_common::JobRecord;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<JobRecord>,
}

pub struct ReedClient {
    http: reqwest::Client,
    base_url: String,
    auth_header: String,
}

impl ReedClient {
    pub fn new(api_key: &str, base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
            auth_header: basic_auth_value(api_key),
        })
    }
}

/// The API key is the Basic-auth user name with an empty password.
fn basic_auth_value(api_key: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{}:", api_key)))
}

impl JobSource for ReedClient {
    async fn fetch_page(&self, query: &PageQuery<'_>) -> Result<Vec<JobRecord>> {
        let params = [
            ("keywords", query.keywords.to_string()),
            ("locationName", query.location.to_string()),
            ("resultsToTake", query.take.to_string()),
            ("resultsToSkip", query.skip.to_string()),
        ];

        let response = self
            .http
            .get(&self.base_url)
            .header(ACCEPT, "application/json")
            .header(AUTHORIZATION, &self.auth_header)
            .query(&params)
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

        let payload: SearchResponse = serde_json::from_str(&body)
            .map_err(|e| JobMapError::InvalidResponse(format!("job search: {}", e)))?;
        Ok(payload.results)
    }
}
