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
//! Shared HTTP DTOs for the account billing API.
//!
//! These types mirror the wire contract of the `/v2/billing` endpoints. The
//! client decodes into them and the CLI renders them without touching field
//! values, so the service stays the single source of truth for billing data.
use serde::{Deserialize, Serialize};

/// Default number of records requested per page.
pub const PER_PAGE_DEFAULT: u32 = 100;

/// A single entry in the account billing ledger.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct History {
    /// Ledger entry identifier.
    pub id: i64,
    /// Timestamp of the entry as reported by the service.
    pub date: String,
    #[serde(rename = "type")]
    /// Entry kind (for example `invoice` or `payment`).
    pub kind: String,
    /// Free-form description of the entry.
    pub description: String,
    /// Amount charged or credited by this entry.
    pub amount: f64,
    /// Account balance after the entry was applied.
    pub balance: f64,
}

/// A billing document issued to the account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Invoice {
    /// Invoice identifier.
    pub id: i64,
    /// Issue timestamp as reported by the service.
    pub date: String,
    /// Free-form description of the invoice.
    pub description: String,
    /// Invoiced amount.
    pub amount: f64,
    /// Account balance after the invoice was issued.
    pub balance: f64,
}

/// One line of an invoice's itemised charges.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InvoiceItem {
    /// Description of the charge.
    pub description: String,
    /// Product the charge belongs to.
    pub product: String,
    /// Start of the billed period.
    pub start_date: String,
    /// End of the billed period.
    pub end_date: String,
    /// Number of billed units.
    pub units: i64,
    /// Unit of measure (for example `hours`).
    pub unit_type: String,
    /// Price per unit.
    pub unit_price: f64,
    /// Line total.
    pub total: f64,
}

/// Cursor links returned alongside a list page.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Links {
    /// Cursor for the next page; empty when on the last page.
    #[serde(default)]
    pub next: String,
    /// Cursor for the previous page; empty when on the first page.
    #[serde(default)]
    pub prev: String,
}

/// Pagination metadata accompanying every list response.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Meta {
    /// Total number of records across all pages.
    #[serde(default)]
    pub total: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Continuation cursors, when the service returns them.
    pub links: Option<Links>,
}

impl Meta {
    /// Cursor for the next page, if there is one.
    #[must_use]
    pub fn next_cursor(&self) -> Option<&str> {
        self.links
            .as_ref()
            .map(|links| links.next.as_str())
            .filter(|cursor| !cursor.is_empty())
    }

    /// Cursor for the previous page, if there is one.
    #[must_use]
    pub fn prev_cursor(&self) -> Option<&str> {
        self.links
            .as_ref()
            .map(|links| links.prev.as_str())
            .filter(|cursor| !cursor.is_empty())
    }
}

/// Paging parameters sent with list requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListOptions {
    /// Number of records requested per page.
    pub per_page: u32,
    /// Opaque continuation token from a previous page.
    pub cursor: Option<String>,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            per_page: PER_PAGE_DEFAULT,
            cursor: None,
        }
    }
}

impl ListOptions {
    /// Build options from raw flag values; a blank cursor counts as absent.
    #[must_use]
    pub fn new(per_page: u32, cursor: Option<String>) -> Self {
        Self {
            per_page,
            cursor: cursor.filter(|value| !value.trim().is_empty()),
        }
    }

    /// Query pairs in the order the service expects them.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("per_page", self.per_page.to_string())];
        if let Some(cursor) = &self.cursor {
            pairs.push(("cursor", cursor.clone()));
        }
        pairs
    }
}

/// Envelope returned by `GET /v2/billing/history`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BillingHistoryResponse {
    /// Ledger entries on this page.
    pub billing_history: Vec<History>,
    /// Pagination metadata.
    #[serde(default)]
    pub meta: Meta,
}

/// Envelope returned by `GET /v2/billing/invoices`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InvoiceListResponse {
    /// Invoices on this page.
    pub billing_invoices: Vec<Invoice>,
    /// Pagination metadata.
    #[serde(default)]
    pub meta: Meta,
}

/// Envelope returned by `GET /v2/billing/invoices/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InvoiceResponse {
    /// The requested invoice.
    pub billing_invoice: Invoice,
}

/// Envelope returned by `GET /v2/billing/invoices/{id}/items`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InvoiceItemListResponse {
    /// Invoice lines on this page.
    pub invoice_items: Vec<InvoiceItem>,
    /// Pagination metadata.
    #[serde(default)]
    pub meta: Meta,
}

/// Error document the service returns for failed requests.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiErrorBody {
    /// Human-readable failure description.
    pub error: String,
    /// HTTP status echoed by the service.
    #[serde(default)]
    pub status: u16,
}
