// HTTP data source backed by the factory REST API
use crate::application::dashboard_source::{DashboardSource, EndpointRequest, FetchError};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HttpDashboardSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpDashboardSource {
    pub fn new(base_url: &str, request_timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn build_url(&self, request: &EndpointRequest) -> String {
        let query = request
            .query_pairs()
            .iter()
            .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&");

        if query.is_empty() {
            format!("{}{}", self.base_url, request.endpoint.path())
        } else {
            format!("{}{}?{}", self.base_url, request.endpoint.path(), query)
        }
    }
}

#[async_trait]
impl DashboardSource for HttpDashboardSource {
    async fn fetch(&self, request: &EndpointRequest) -> Result<serde_json::Value, FetchError> {
        let endpoint = request.endpoint;
        let url = self.build_url(request);

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| FetchError::Transport {
                endpoint,
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Transport {
                endpoint,
                message: format!("HTTP error! status: {}", status),
            });
        }

        response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| FetchError::Envelope {
                endpoint,
                message: format!("malformed body: {}", e),
            })
    }
}
