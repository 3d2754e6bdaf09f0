// Data fetcher - Concurrent, fail-fast retrieval of the dashboard bundle
use crate::application::dashboard_source::{DashboardSource, Endpoint, EndpointRequest, FetchError};
use crate::domain::site::{SiteDetails, SiteInfo, TimeRange};
use crate::domain::telemetry::{
    ordered_entries, Bundle, ErpData, HistoricalData, MesData, ProductionMetrics, SensorReadings,
    WorkOrder,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_CYCLE_TIMEOUT: Duration = Duration::from_secs(10);

/// `{success, data, error?}` wrapper every endpoint answers with
#[derive(Debug, Deserialize)]
struct ResponseEnvelope {
    success: bool,
    #[serde(default)]
    data: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SitesPayload(#[serde(deserialize_with = "ordered_entries")] Vec<(String, SiteDetails)>);

#[derive(Clone)]
pub struct DataFetcher {
    source: Arc<dyn DashboardSource>,
    cycle_timeout: Duration,
}

impl DataFetcher {
    pub fn new(source: Arc<dyn DashboardSource>, cycle_timeout: Duration) -> Self {
        Self {
            source,
            cycle_timeout,
        }
    }

    /// Fetch the five main endpoints concurrently; the first failure fails the bundle
    pub async fn fetch_all(&self, site: &str) -> Result<Bundle, FetchError> {
        let bundle = async {
            let (sensors, mes, erp, work_orders, production) = futures::try_join!(
                self.fetch_payload::<SensorReadings>(EndpointRequest::for_site(Endpoint::SensorData, site)),
                self.fetch_payload::<MesData>(EndpointRequest::for_site(Endpoint::MesData, site)),
                self.fetch_payload::<ErpData>(EndpointRequest::for_site(Endpoint::ErpData, site)),
                self.fetch_payload::<Vec<WorkOrder>>(EndpointRequest::for_site(Endpoint::WorkOrders, site)),
                self.fetch_payload::<ProductionMetrics>(EndpointRequest::for_site(
                    Endpoint::ProductionMetrics,
                    site
                )),
            )?;

            Ok(Bundle {
                sensors,
                mes,
                erp,
                work_orders,
                production,
            })
        };

        self.with_timeout(bundle).await
    }

    pub async fn fetch_historical(
        &self,
        site: &str,
        range: TimeRange,
    ) -> Result<HistoricalData, FetchError> {
        self.with_timeout(self.fetch_payload(EndpointRequest::historical(site, range)))
            .await
    }

    pub async fn fetch_sites(&self) -> Result<Vec<SiteInfo>, FetchError> {
        let payload: SitesPayload = self
            .with_timeout(self.fetch_payload(EndpointRequest::sites()))
            .await?;

        Ok(payload
            .0
            .into_iter()
            .map(|(id, details)| details.into_site(id))
            .collect())
    }

    async fn fetch_payload<T: DeserializeOwned>(&self, request: EndpointRequest) -> Result<T, FetchError> {
        tracing::debug!(endpoint = %request.endpoint, site = ?request.site, "fetching");
        let body = self.source.fetch(&request).await?;
        decode_envelope(request.endpoint, body)
    }

    async fn with_timeout<T>(
        &self,
        work: impl Future<Output = Result<T, FetchError>>,
    ) -> Result<T, FetchError> {
        tokio::time::timeout(self.cycle_timeout, work)
            .await
            .map_err(|_| FetchError::Timeout(self.cycle_timeout))?
    }
}

/// Validate a response envelope and decode its `data` payload
fn decode_envelope<T: DeserializeOwned>(
    endpoint: Endpoint,
    body: serde_json::Value,
) -> Result<T, FetchError> {
    let envelope_error = |message: String| FetchError::Envelope { endpoint, message };

    let envelope: ResponseEnvelope = serde_json::from_value(body)
        .map_err(|e| envelope_error(format!("malformed envelope: {}", e)))?;

    if !envelope.success {
        return Err(envelope_error(
            envelope
                .error
                .unwrap_or_else(|| "Unknown error occurred".to_string()),
        ));
    }

    let data = envelope
        .data
        .ok_or_else(|| envelope_error("envelope has no data".to_string()))?;

    serde_json::from_value(data).map_err(|e| envelope_error(format!("unexpected payload: {}", e)))
}
