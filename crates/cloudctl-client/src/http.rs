//! `reqwest`-backed implementation of the billing API.

use std::time::Duration;

use async_trait::async_trait;
use cloudctl_api_models::{
    ApiErrorBody, BillingHistoryResponse, History, Invoice, InvoiceItem, InvoiceItemListResponse,
    InvoiceListResponse, InvoiceResponse, ListOptions,
};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;

use crate::{BillingApi, ClientError, ClientResult, Page};

/// Header carrying the per-invocation trace identifier.
pub const HEADER_REQUEST_ID: &str = "x-request-id";

/// Request timeout used when the caller does not pick one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for [`HttpBillingClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Service root, e.g. `https://api.vultr.com`.
    pub base_url: Url,
    /// Bearer token sent with every request when present.
    pub api_key: Option<String>,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Trace identifier propagated as `x-request-id`.
    pub request_id: Option<String>,
}

impl ClientConfig {
    /// Unauthenticated configuration with the default timeout.
    #[must_use]
    pub const fn new(base_url: Url) -> Self {
        Self {
            base_url,
            api_key: None,
            timeout: DEFAULT_TIMEOUT,
            request_id: None,
        }
    }
}

/// Billing client speaking JSON over HTTP.
#[derive(Debug, Clone)]
pub struct HttpBillingClient {
    client: Client,
    base_url: Url,
}

impl HttpBillingClient {
    /// Build a client with authentication and trace headers preinstalled.
    ///
    /// # Errors
    ///
    /// Returns an error when the base URL cannot carry paths, a header value is
    /// not valid ASCII, or the TLS backend fails to initialise.
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        if config.base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidBaseUrl {
                url: config.base_url.to_string(),
            });
        }

        let mut default_headers = HeaderMap::new();
        if let Some(request_id) = &config.request_id {
            let value = HeaderValue::from_str(request_id).map_err(|_| ClientError::InvalidHeader {
                name: HEADER_REQUEST_ID,
            })?;
            default_headers.insert(HEADER_REQUEST_ID, value);
        }
        if let Some(api_key) = &config.api_key {
            let mut value = HeaderValue::from_str(&format!("Bearer {api_key}"))
                .map_err(|_| ClientError::InvalidHeader {
                    name: "authorization",
                })?;
            value.set_sensitive(true);
            default_headers.insert(AUTHORIZATION, value);
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(default_headers)
            .build()
            .map_err(|source| ClientError::Build { source })?;

        Ok(Self {
            client,
            base_url: config.base_url,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> ClientResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ClientError::InvalidBaseUrl {
                url: self.base_url.to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        mut url: Url,
        query: &[(&'static str, String)],
    ) -> ClientResult<T> {
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        let path = url.path().to_string();
        tracing::debug!(path = %path, "sending billing request");

        let response =
            self.client
                .get(url)
                .send()
                .await
                .map_err(|source| ClientError::Transport {
                    path: path.clone(),
                    source,
                })?;
        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|source| ClientError::Transport {
                path: path.clone(),
                source,
            })?;

        if !status.is_success() {
            let err = classify_failure(status, &bytes);
            tracing::debug!(path = %path, status = status.as_u16(), "billing request rejected");
            return Err(err);
        }

        serde_json::from_slice(&bytes).map_err(|source| ClientError::Decode { path, source })
    }
}

#[async_trait]
impl BillingApi for HttpBillingClient {
    async fn list_history(&self, options: &ListOptions) -> ClientResult<Page<History>> {
        let url = self.endpoint(&["v2", "billing", "history"])?;
        let page: BillingHistoryResponse = self.get_json(url, &options.query_pairs()).await?;
        Ok(Page {
            items: page.billing_history,
            meta: page.meta,
        })
    }

    async fn list_invoices(&self, options: &ListOptions) -> ClientResult<Page<Invoice>> {
        let url = self.endpoint(&["v2", "billing", "invoices"])?;
        let page: InvoiceListResponse = self.get_json(url, &options.query_pairs()).await?;
        Ok(Page {
            items: page.billing_invoices,
            meta: page.meta,
        })
    }

    async fn get_invoice(&self, invoice_id: &str) -> ClientResult<Invoice> {
        let url = self.endpoint(&["v2", "billing", "invoices", invoice_id])?;
        let body: InvoiceResponse = self.get_json(url, &[]).await?;
        Ok(body.billing_invoice)
    }

    async fn list_invoice_items(
        &self,
        invoice_id: i64,
        options: &ListOptions,
    ) -> ClientResult<Page<InvoiceItem>> {
        let id = invoice_id.to_string();
        let url = self.endpoint(&["v2", "billing", "invoices", &id, "items"])?;
        let page: InvoiceItemListResponse = self.get_json(url, &options.query_pairs()).await?;
        Ok(Page {
            items: page.invoice_items,
            meta: page.meta,
        })
    }
}

/// Turn a non-success response into a client error, preferring the service's
/// own message over the raw body.
fn classify_failure(status: StatusCode, bytes: &[u8]) -> ClientError {
    let body_text = String::from_utf8_lossy(bytes).trim().to_string();
    let message = serde_json::from_slice::<ApiErrorBody>(bytes)
        .ok()
        .map(|body| body.error)
        .filter(|message| !message.is_empty())
        .or_else(|| (!body_text.is_empty()).then_some(body_text))
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        });

    ClientError::Api {
        status: status.as_u16(),
        message,
    }
}
