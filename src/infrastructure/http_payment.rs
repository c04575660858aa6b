use crate::domain::order::PaymentId;
use crate::domain::payment::PaymentStatus;
use crate::domain::ports::PaymentAuthority;
use crate::error::{EngineError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Body of `GET /payment/{id}`. Only the status is read.
#[derive(Debug, Deserialize)]
struct PaymentResponse {
    status: String,
}

/// Payment authority reached over HTTP.
#[derive(Clone)]
pub struct HttpPaymentAuthority {
    client: Client,
    base_url: String,
}

impl HttpPaymentAuthority {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EngineError::ValidationError(format!("Invalid HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn status_url(&self, payment_id: &PaymentId) -> String {
        format!("{}/payment/{}", self.base_url, payment_id)
    }
}

#[async_trait]
impl PaymentAuthority for HttpPaymentAuthority {
    async fn fetch_status(&self, payment_id: &PaymentId) -> Result<PaymentStatus> {
        let url = self.status_url(payment_id);
        debug!(%url, "Checking payment status");
        let response: PaymentResponse = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(PaymentStatus::from(response.status.as_str()))
    }
}
