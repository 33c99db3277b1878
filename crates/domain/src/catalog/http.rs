//! HTTP client for the catalog service.

use std::time::Duration;

use async_trait::async_trait;
use common::{CatalogId, Envelope, VariantId};
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;

use super::{CatalogError, CatalogInfo, CatalogService, CatalogVariant};

/// Catalog service client over `GET /api/keeper/catalog/...`.
///
/// Every request carries the client-wide timeout. Failures are never retried.
#[derive(Debug, Clone)]
pub struct HttpCatalogClient {
    client: Client,
    base_url: Url,
}

impl HttpCatalogClient {
    /// Creates a client for the catalog service at `base_url`.
    pub fn new(base_url: impl AsRef<str>, timeout: Duration) -> Result<Self, CatalogError> {
        let raw = base_url.as_ref();
        let transport = |reason: String| CatalogError::Transport {
            url: raw.to_string(),
            reason,
        };

        let base_url = Url::parse(raw).map_err(|e| transport(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(transport("not a base URL".to_string()));
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| transport(e.to_string()))?;
        Ok(Self { client, base_url })
    }

    /// Builds `{base}/api/keeper/catalog/{segments..}`, percent-encoding
    /// each segment so ids cannot change the path or add a query.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // checked in `new`
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty()
                .extend(["api", "keeper", "catalog"])
                .extend(segments);
        }
        url
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        url: Url,
        not_found: impl FnOnce() -> CatalogError,
    ) -> Result<T, CatalogError> {
        let response = self.client.get(url.clone()).send().await;
        let url = url.to_string();
        let response = response.map_err(|e| {
            if e.is_timeout() {
                CatalogError::Timeout { url: url.clone() }
            } else {
                CatalogError::Transport {
                    url: url.clone(),
                    reason: e.to_string(),
                }
            }
        })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(not_found());
        }
        if !status.is_success() {
            tracing::warn!(%url, %status, "catalog request failed");
            return Err(CatalogError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let envelope: Envelope<T> = response.json().await.map_err(|e| {
            if e.is_timeout() {
                CatalogError::Timeout { url: url.clone() }
            } else {
                CatalogError::Decode {
                    url: url.clone(),
                    reason: e.to_string(),
                }
            }
        })?;

        let message = envelope.message.clone();
        envelope
            .into_payload()
            .ok_or_else(|| CatalogError::Unsuccessful {
                url,
                message: message.unwrap_or_else(|| "no payload".to_string()),
            })
    }
}

#[async_trait]
impl CatalogService for HttpCatalogClient {
    #[tracing::instrument(skip(self))]
    async fn get_catalog(&self, catalog_id: &CatalogId) -> Result<CatalogInfo, CatalogError> {
        let url = self.endpoint(&[catalog_id.as_str()]);
        self.fetch(url, || CatalogError::CatalogNotFound {
            catalog_id: catalog_id.clone(),
        })
        .await
    }

    #[tracing::instrument(skip(self))]
    async fn get_variant(
        &self,
        catalog_id: &CatalogId,
        variant_id: &VariantId,
    ) -> Result<CatalogVariant, CatalogError> {
        let url = self.endpoint(&[catalog_id.as_str(), "variant", variant_id.as_str()]);
        self.fetch(url, || CatalogError::VariantNotFound {
            catalog_id: catalog_id.clone(),
            variant_id: variant_id.clone(),
        })
        .await
    }
}
