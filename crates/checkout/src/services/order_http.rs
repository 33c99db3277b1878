//! HTTP client for the order service.

use std::time::Duration;

use async_trait::async_trait;
use common::Envelope;
use reqwest::Client;

use super::order::{OrderService, OrderServiceError};
use crate::model::{OrderOpts, PlacedOrder};

/// Order service client over `POST /api/order`.
#[derive(Debug, Clone)]
pub struct HttpOrderClient {
    client: Client,
    url: String,
}

impl HttpOrderClient {
    /// Creates a client for the order service at `base_url`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, OrderServiceError> {
        let url = format!("{}/api/order", base_url.trim_end_matches('/'));
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| OrderServiceError::Transport {
                url: url.clone(),
                reason: e.to_string(),
            })?;
        Ok(Self { client, url })
    }

    fn request_error(&self, e: reqwest::Error) -> OrderServiceError {
        if e.is_timeout() {
            OrderServiceError::Timeout {
                url: self.url.clone(),
            }
        } else if e.is_decode() {
            OrderServiceError::Decode {
                url: self.url.clone(),
                reason: e.to_string(),
            }
        } else {
            OrderServiceError::Transport {
                url: self.url.clone(),
                reason: e.to_string(),
            }
        }
    }
}

#[async_trait]
impl OrderService for HttpOrderClient {
    #[tracing::instrument(skip(self, orders), fields(order_count = orders.len()))]
    async fn submit_orders(
        &self,
        orders: Vec<OrderOpts>,
    ) -> Result<Vec<PlacedOrder>, OrderServiceError> {
        let response = self
            .client
            .post(&self.url)
            .json(&orders)
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(url = %self.url, %status, %body, "order submission failed");
            return Err(OrderServiceError::Status {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }

        let envelope: Envelope<Vec<PlacedOrder>> = response
            .json()
            .await
            .map_err(|e| self.request_error(e))?;

        let message = envelope.message.clone();
        envelope
            .into_payload()
            .ok_or_else(|| OrderServiceError::Unsuccessful {
                url: self.url.clone(),
                message: message.unwrap_or_else(|| "no payload".to_string()),
            })
    }
}
