use std::time::Duration;

use async_trait::async_trait;
use balview_core::domain::txn::Txn;
use balview_core::domain::variance::{VarianceId, VarianceRow};
use balview_core::gateway::{DataGateway, GatewayError};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use uuid::Uuid;

pub const VARIANCES_PATH: &[&str] = &["api", "variances"];
pub const TRANSACTIONS_PATH: &[&str] = &["api", "transactions"];

/// Reads rows and transactions from the review API over HTTP.
#[derive(Clone, Debug)]
pub struct HttpGateway {
    client: Client,
    base_url: Url,
    timeout_secs: u64,
}

impl HttpGateway {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, GatewayError> {
        let base_url = Url::parse(base_url).map_err(|error| GatewayError::Transport {
            url: base_url.to_string(),
            message: format!("invalid base url: {error}"),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(GatewayError::Transport {
                url: base_url.to_string(),
                message: "base url cannot carry a path".to_string(),
            });
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|error| GatewayError::Transport {
                url: base_url.to_string(),
                message: error.to_string(),
            })?;
        Ok(Self { client, base_url, timeout_secs })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Joins path segments onto the base url, percent-encoding each one.
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, GatewayError> {
        let correlation_id = Uuid::new_v4();
        debug!(
            event_name = "gateway.http.request",
            correlation_id = %correlation_id,
            url = %url,
            "requesting review api"
        );

        let response = self.client.get(url.clone()).send().await.map_err(|error| {
            warn!(
                event_name = "gateway.http.failed",
                correlation_id = %correlation_id,
                url = %url,
                error = %error,
                "review api request failed"
            );
            self.classify(&url, &error)
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(
                event_name = "gateway.http.status",
                correlation_id = %correlation_id,
                url = %url,
                status = status.as_u16(),
                "review api returned non-success status"
            );
            return Err(GatewayError::Status { url: url.to_string(), status: status.as_u16() });
        }

        response.json::<T>().await.map_err(|error| {
            if error.is_timeout() {
                self.classify(&url, &error)
            } else {
                GatewayError::Decode { url: url.to_string(), message: error.to_string() }
            }
        })
    }

    fn classify(&self, url: &Url, error: &reqwest::Error) -> GatewayError {
        if error.is_timeout() {
            GatewayError::Timeout { url: url.to_string(), after_secs: self.timeout_secs }
        } else {
            GatewayError::Transport { url: url.to_string(), message: error.to_string() }
        }
    }
}

#[async_trait]
impl DataGateway for HttpGateway {
    async fn fetch_variances(&self) -> Result<Vec<VarianceRow>, GatewayError> {
        self.get_json(self.endpoint(VARIANCES_PATH)).await
    }

    async fn fetch_transactions(&self, var_id: &VarianceId) -> Result<Vec<Txn>, GatewayError> {
        let mut segments = TRANSACTIONS_PATH.to_vec();
        segments.push(var_id.as_str());
        self.get_json(self.endpoint(&segments)).await
    }
}
