#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
//! Client for the account billing endpoints.
//!
//! Layout:
//! - `error.rs`: typed client failures
//! - `http.rs`: `reqwest` implementation of [`BillingApi`]

use async_trait::async_trait;
use cloudctl_api_models::{History, Invoice, InvoiceItem, ListOptions, Meta};

pub mod error;
pub mod http;

pub use error::{ClientError, ClientResult};
pub use http::{ClientConfig, HttpBillingClient};

/// One page of records plus the pagination metadata returned with it.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    /// Records on this page, in service order.
    pub items: Vec<T>,
    /// Pagination metadata, forwarded untouched.
    pub meta: Meta,
}

/// Read operations exposed by the billing service.
#[async_trait]
pub trait BillingApi: Send + Sync {
    /// Fetch one page of billing history.
    async fn list_history(&self, options: &ListOptions) -> ClientResult<Page<History>>;

    /// Fetch one page of invoices.
    async fn list_invoices(&self, options: &ListOptions) -> ClientResult<Page<Invoice>>;

    /// Fetch a single invoice by identifier.
    async fn get_invoice(&self, invoice_id: &str) -> ClientResult<Invoice>;

    /// Fetch one page of line items for an invoice.
    async fn list_invoice_items(
        &self,
        invoice_id: i64,
        options: &ListOptions,
    ) -> ClientResult<Page<InvoiceItem>>;
}
