// InfluxDB v2 repository implementation
use crate::application::error::FetchError;
use crate::application::sensor_repository::{FluxRecord, SensorRepository};
use crate::infrastructure::config::InfluxSettings;
use crate::infrastructure::flux_csv;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Long-lived handle on one InfluxDB org. The underlying HTTP client pools
/// connections, so a single instance is shared by every request.
#[derive(Debug, Clone)]
pub struct InfluxRepository {
    host: String,
    token: String,
    org: String,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct FluxQueryRequest<'a> {
    query: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
    dialect: FluxDialect,
}

#[derive(Debug, Serialize)]
struct FluxDialect {
    header: bool,
    annotations: Vec<String>,
    delimiter: &'static str,
}

#[derive(Debug, Deserialize)]
struct InfluxErrorBody {
    #[serde(default)]
    message: Option<String>,
}

impl InfluxRepository {
    pub fn new(host: String, token: String, org: String, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            host: host.trim_end_matches('/').to_string(),
            token,
            org,
            client,
        })
    }

    pub fn from_settings(settings: &InfluxSettings) -> anyhow::Result<Self> {
        Self::new(
            settings.url.clone(),
            settings.token.clone(),
            settings.org.clone(),
            settings.timeout(),
        )
    }

    fn build_query_url(&self) -> String {
        format!("{}/api/v2/query?org={}", self.host, urlencoding::encode(&self.org))
    }

    fn request_body(query: &str) -> FluxQueryRequest<'_> {
        FluxQueryRequest {
            query,
            kind: "flux",
            dialect: FluxDialect {
                header: true,
                annotations: Vec::new(),
                delimiter: ",",
            },
        }
    }

    async fn execute_query(&self, query: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .post(self.build_query_url())
            .header("Authorization", format!("Token {}", self.token))
            .header("Accept", "application/csv")
            .json(&Self::request_body(query))
            .send()
            .await
            .map_err(|e| FetchError::Connection(format!("Failed to reach InfluxDB: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_failure(status, &body));
        }

        response
            .text()
            .await
            .map_err(|e| FetchError::Connection(format!("Failed to read InfluxDB response: {}", e)))
    }
}

/// Map a non-2xx answer onto the fetch error taxonomy
fn classify_failure(status: StatusCode, body: &str) -> FetchError {
    let message = serde_json::from_str::<InfluxErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .unwrap_or_else(|| body.trim().to_string());
    let detail = format!("InfluxDB returned {}: {}", status, message);

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => FetchError::Connection(detail),
        StatusCode::REQUEST_TIMEOUT
        | StatusCode::BAD_GATEWAY
        | StatusCode::SERVICE_UNAVAILABLE
        | StatusCode::GATEWAY_TIMEOUT => {
            FetchError::Connection(detail)
        }
        _ => FetchError::Query(detail),
    }
}

#[async_trait]
impl SensorRepository for InfluxRepository {
    async fn query(&self, flux: &str) -> Result<Vec<FluxRecord>, FetchError> {
        let body = self.execute_query(flux).await?;
        let records = flux_csv::decode(&body)?;
        tracing::debug!("InfluxDB returned {} records", records.len());
        Ok(records)
    }
}
