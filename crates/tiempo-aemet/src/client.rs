//! AEMET OpenData client.
//!
//! A forecast takes two round trips: the locator endpoint answers with an
//! envelope whose `datos` URL points at the payload, which is fetched after a
//! fixed throttle delay.

use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tiempo_core::{AemetConfig, NetworkError, ReqwestErrorExt};
use tracing::instrument;
use url::Url;

use crate::error::ForecastError;
use crate::normalize::normalize;
use crate::types::{parse_data_url, DailySummary, EnvelopeWire, LocatorEnvelope, MunicipalityCode};

const LOCATOR_PATH: [&str; 4] = ["prediccion", "especifica", "municipio", "diaria"];
const API_KEY_PARAM: &str = "api_key";
const USER_AGENT: &str = concat!("tiempo/", env!("CARGO_PKG_VERSION"));

#[derive(Clone)]
pub struct AemetClient {
    client: Arc<Client>,
    base_url: String,
    api_key: String,
    throttle: Duration,
}

impl std::fmt::Debug for AemetClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AemetClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"***")
            .field("throttle", &self.throttle)
            .finish_non_exhaustive()
    }
}

impl AemetClient {
    pub fn new(config: &AemetConfig) -> Result<Self, ForecastError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| NetworkError::TlsError(e.to_string()))?;

        Ok(Self {
            client: Arc::new(client),
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            throttle: Duration::from_millis(config.throttle_ms),
        })
    }

    /// Build the locator URL for a municipality.
    pub fn locator_url(&self, code: &MunicipalityCode) -> Result<Url, ForecastError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ForecastError::InvalidRequest(format!("bad base URL: {}", e)))?;

        url.path_segments_mut()
            .map_err(|()| ForecastError::InvalidRequest("base URL cannot be a base".into()))?
            .pop_if_empty()
            .extend(LOCATOR_PATH)
            .push(code.as_str());

        url.query_pairs_mut().append_pair(API_KEY_PARAM, &self.api_key);
        Ok(url)
    }

    /// Ask the locator endpoint where the forecast for `code` lives.
    #[instrument(skip(self), level = "info")]
    pub async fn locate(&self, code: &MunicipalityCode) -> Result<LocatorEnvelope, ForecastError> {
        let url = self.locator_url(code)?;
        tracing::debug!("Locator URL: {}", redact(&url));

        let (body, _) = self.get_body(url).await?;
        tracing::debug!("Locator envelope: {}", String::from_utf8_lossy(&body));

        let wire: EnvelopeWire = serde_json::from_slice(&body)
            .map_err(|e| ForecastError::MalformedEnvelope(e.to_string()))?;
        let envelope = LocatorEnvelope::try_from(wire)?;

        tracing::info!(status = envelope.status, "Located forecast data");
        Ok(envelope)
    }

    /// Fetch and normalize the payload behind a locator `datos` URL.
    #[instrument(skip(self), level = "info")]
    pub async fn fetch_forecast(&self, data_url: &str) -> Result<Vec<DailySummary>, ForecastError> {
        let url = parse_data_url(data_url)?;

        if !self.throttle.is_zero() {
            tracing::debug!("Waiting {:?} before fetching forecast data", self.throttle);
            tokio::time::sleep(self.throttle).await;
        }

        let (raw, content_type) = self.get_body(url).await?;
        tracing::debug!(
            content_type = content_type.as_deref().unwrap_or("unknown"),
            bytes = raw.len(),
            "Received forecast payload"
        );

        let days = normalize(&raw)?;
        tracing::info!(days = days.len(), "Forecast normalized");
        Ok(days)
    }

    /// Locate and fetch in one go.
    pub async fn forecast(&self, code: &MunicipalityCode) -> Result<Vec<DailySummary>, ForecastError> {
        let envelope = self.locate(code).await?;
        self.fetch_forecast(envelope.data_url.as_str()).await
    }

    /// GET `url`, returning the non-empty body and its Content-Type.
    async fn get_body(&self, url: Url) -> Result<(Vec<u8>, Option<String>), ForecastError> {
        let redacted = redact(&url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(ReqwestErrorExt::into_network_error)?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::debug!("{} returned {}: {}", redacted, status, message);
            return Err(NetworkError::ServerError {
                status: status.as_u16(),
                message,
            }
            .into());
        }

        let body = response
            .bytes()
            .await
            .map_err(ReqwestErrorExt::into_network_error)?;

        if body.is_empty() {
            return Err(NetworkError::EmptyBody(redacted).into());
        }

        Ok((body.to_vec(), content_type))
    }
}

/// Render a URL for logs with the API key masked.
fn redact(url: &Url) -> String {
    if !url.query_pairs().any(|(k, _)| k == API_KEY_PARAM) {
        return url.to_string();
    }

    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if k == API_KEY_PARAM {
                "***".to_string()
            } else {
                v.into_owned()
            };
            (k.into_owned(), v)
        })
        .collect();

    let mut redacted = url.clone();
    redacted.query_pairs_mut().clear().extend_pairs(pairs);
    redacted.to_string()
}
