use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use transfer_logging::{transfer_debug, transfer_info, transfer_warn};
use url::Url;

use crate::payload::render_payload;
use crate::{Batch, FailureKind, Reachability, TransferError};

/// Server certificate policy for submissions and reachability probes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TlsVerification {
    #[default]
    Verify,
    /// Accept self-signed or otherwise invalid certificates. Traffic is still
    /// encrypted but the server is not authenticated.
    AcceptInvalidCerts,
}

#[derive(Debug, Clone)]
pub struct TransferSettings {
    pub endpoint_url: String,
    pub request_timeout: Duration,
    pub probe_timeout: Duration,
    pub tls: TlsVerification,
}

impl TransferSettings {
    pub fn new(endpoint_url: impl Into<String>) -> Self {
        Self {
            endpoint_url: endpoint_url.into(),
            request_timeout: Duration::from_secs(30),
            probe_timeout: Duration::from_secs(3),
            tls: TlsVerification::Verify,
        }
    }
}

#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Posts the batch as JSON. Returns the response body on a 2xx status.
    async fn submit(&self, batch: &Batch) -> Result<String, TransferError>;

    /// Issues a lightweight GET; only an exact 200 counts as connected.
    async fn check_reachable(&self) -> Reachability;
}

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    settings: TransferSettings,
    endpoint: Url,
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(settings: TransferSettings) -> Result<Self, TransferError> {
        let endpoint = Url::parse(&settings.endpoint_url)
            .map_err(|err| TransferError::new(FailureKind::InvalidUrl, err.to_string()))?;

        let accept_invalid = settings.tls == TlsVerification::AcceptInvalidCerts;
        if accept_invalid {
            transfer_warn!(
                "TLS certificate verification is disabled for {}",
                endpoint
            );
        }

        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(accept_invalid)
            .build()
            .map_err(|err| TransferError::new(FailureKind::Network, err.to_string()))?;

        Ok(Self {
            settings,
            endpoint,
            client,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait::async_trait]
impl Transport for ReqwestTransport {
    async fn submit(&self, batch: &Batch) -> Result<String, TransferError> {
        let body = render_payload(batch.records())
            .map_err(|err| TransferError::new(FailureKind::Encode, err.to_string()))?;
        transfer_debug!("JSON Data for {:?}:\n{}", batch.path(), body);

        let response = self
            .client
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "application/json")
            .timeout(self.settings.request_timeout)
            .body(body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(TransferError::new(
                FailureKind::HttpStatus(status.as_u16()),
                format!("{status} for url: {} {text}", self.endpoint)
                    .trim_end()
                    .to_string(),
            ));
        }

        let text = response.text().await.map_err(map_reqwest_error)?;
        transfer_info!(
            "Submitted {} record(s) from {:?}: {}",
            batch.len(),
            batch.path(),
            status
        );
        Ok(text)
    }

    async fn check_reachable(&self) -> Reachability {
        let result = self
            .client
            .get(self.endpoint.clone())
            .timeout(self.settings.probe_timeout)
            .send()
            .await;

        match result {
            Ok(response) if response.status() == StatusCode::OK => Reachability::connected(),
            Ok(response) => {
                Reachability::disconnected(FailureKind::HttpStatus(response.status().as_u16()))
            }
            Err(err) => {
                let err = map_reqwest_error(err);
                transfer_debug!("Reachability probe failed: {}", err.message);
                Reachability::disconnected(err.kind)
            }
        }
    }
}

fn map_reqwest_error(err: reqwest::Error) -> TransferError {
    if err.is_timeout() {
        return TransferError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_connect() {
        return TransferError::new(FailureKind::Connect, err.to_string());
    }
    TransferError::new(FailureKind::Network, err.to_string())
}
