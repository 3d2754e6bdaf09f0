// Source trait for upstream dashboard data access
use crate::domain::site::TimeRange;
use async_trait::async_trait;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Upstream routes the dashboard reads from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    SensorData,
    MesData,
    ErpData,
    WorkOrders,
    ProductionMetrics,
    HistoricalData,
    Sites,
}

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::SensorData => "/api/sensor-data",
            Endpoint::MesData => "/api/mes-data",
            Endpoint::ErpData => "/api/erp-data",
            Endpoint::WorkOrders => "/api/work-orders",
            Endpoint::ProductionMetrics => "/api/production-metrics",
            Endpoint::HistoricalData => "/api/historical-data",
            Endpoint::Sites => "/api/sites",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// A single GET against one endpoint, built fresh for every cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointRequest {
    pub endpoint: Endpoint,
    pub site: Option<String>,
    pub range: Option<TimeRange>,
}

impl EndpointRequest {
    pub fn for_site(endpoint: Endpoint, site: &str) -> Self {
        Self {
            endpoint,
            site: Some(site.to_string()),
            range: None,
        }
    }

    pub fn historical(site: &str, range: TimeRange) -> Self {
        Self {
            endpoint: Endpoint::HistoricalData,
            site: Some(site.to_string()),
            range: Some(range),
        }
    }

    pub fn sites() -> Self {
        Self {
            endpoint: Endpoint::Sites,
            site: None,
            range: None,
        }
    }

    /// Query parameters in wire order (`range` before `site`)
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(range) = self.range {
            pairs.push(("range", range.as_str().to_string()));
        }
        if let Some(site) = &self.site {
            pairs.push(("site", site.clone()));
        }
        pairs
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    /// Network failure or non-2xx status
    #[error("transport error on {endpoint}: {message}")]
    Transport { endpoint: Endpoint, message: String },

    /// `success=false`, malformed body, or payload of the wrong shape
    #[error("envelope error on {endpoint}: {message}")]
    Envelope { endpoint: Endpoint, message: String },

    #[error("refresh timed out after {0:?}")]
    Timeout(Duration),
}

#[async_trait]
pub trait DashboardSource: Send + Sync {
    /// GET one endpoint and return the parsed JSON body (the response envelope)
    async fn fetch(&self, request: &EndpointRequest) -> Result<serde_json::Value, FetchError>;
}
