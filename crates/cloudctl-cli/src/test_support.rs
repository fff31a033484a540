//! Fakes and sample records shared by the command and output tests.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use cloudctl_api_models::{History, Invoice, InvoiceItem, Links, ListOptions, Meta};
use cloudctl_client::{BillingApi, ClientError, ClientResult, Page};

use crate::client::{AppContext, parse_api_key};
use crate::output::{OutputFormat, Printer};

/// Request observed by [`FakeBillingApi`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    ListHistory(ListOptions),
    ListInvoices(ListOptions),
    GetInvoice(String),
    ListInvoiceItems(i64, ListOptions),
}

/// In-memory billing API that records every request it receives.
#[derive(Default)]
pub(crate) struct FakeBillingApi {
    calls: Mutex<Vec<Call>>,
    failure: Option<String>,
    history: Vec<History>,
    invoices: Vec<Invoice>,
    items: Vec<InvoiceItem>,
    meta: Meta,
}

impl FakeBillingApi {
    pub(crate) fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub(crate) fn with_history(history: Vec<History>, meta: Meta) -> Self {
        Self {
            history,
            meta,
            ..Self::default()
        }
    }

    pub(crate) fn with_invoices(invoices: Vec<Invoice>, meta: Meta) -> Self {
        Self {
            invoices,
            meta,
            ..Self::default()
        }
    }

    pub(crate) fn with_items(items: Vec<InvoiceItem>, meta: Meta) -> Self {
        Self {
            items,
            meta,
            ..Self::default()
        }
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record(&self, call: Call) -> ClientResult<()> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
        match &self.failure {
            Some(message) => Err(ClientError::Api {
                status: 500,
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }

    fn page<T: Clone>(&self, items: &[T]) -> Page<T> {
        Page {
            items: items.to_vec(),
            meta: self.meta.clone(),
        }
    }
}

#[async_trait]
impl BillingApi for FakeBillingApi {
    async fn list_history(&self, options: &ListOptions) -> ClientResult<Page<History>> {
        self.record(Call::ListHistory(options.clone()))?;
        Ok(self.page(&self.history))
    }

    async fn list_invoices(&self, options: &ListOptions) -> ClientResult<Page<Invoice>> {
        self.record(Call::ListInvoices(options.clone()))?;
        Ok(self.page(&self.invoices))
    }

    async fn get_invoice(&self, invoice_id: &str) -> ClientResult<Invoice> {
        self.record(Call::GetInvoice(invoice_id.to_string()))?;
        let id = invoice_id.parse().unwrap_or_default();
        Ok(self
            .invoices
            .iter()
            .find(|invoice| invoice.id == id)
            .cloned()
            .unwrap_or_else(|| sample_invoice(id)))
    }

    async fn list_invoice_items(
        &self,
        invoice_id: i64,
        options: &ListOptions,
    ) -> ClientResult<Page<InvoiceItem>> {
        self.record(Call::ListInvoiceItems(invoice_id, options.clone()))?;
        Ok(self.page(&self.items))
    }
}

/// Context backed by `api`, authenticated when `authed` is set.
pub(crate) fn context_with(api: &Arc<FakeBillingApi>, authed: bool) -> AppContext {
    let api_key = authed.then(|| "test-token".to_string());
    AppContext {
        api: Arc::clone(api) as Arc<dyn BillingApi>,
        api_key: parse_api_key(api_key),
        printer: Printer::new(OutputFormat::Table),
    }
}

pub(crate) fn sample_history(id: i64) -> History {
    History {
        id,
        date: "2021-01-01T00:00:00+00:00".into(),
        kind: "invoice".into(),
        description: format!("Invoice #{id}"),
        amount: 2.33,
        balance: -997.67,
    }
}

pub(crate) fn sample_invoice(id: i64) -> Invoice {
    Invoice {
        id,
        date: "2021-01-01T00:00:00+00:00".into(),
        description: format!("Invoice #{id}"),
        amount: 12.5,
        balance: 0.0,
    }
}

pub(crate) fn sample_item(description: &str) -> InvoiceItem {
    InvoiceItem {
        description: description.to_string(),
        product: "Cloud Compute".into(),
        start_date: "2021-01-01T00:00:00+00:00".into(),
        end_date: "2021-02-01T00:00:00+00:00".into(),
        units: 720,
        unit_type: "hours".into(),
        unit_price: 0.0069,
        total: 5.0,
    }
}

pub(crate) fn sample_meta(total: i64, next: &str, prev: &str) -> Meta {
    Meta {
        total,
        links: Some(Links {
            next: next.to_string(),
            prev: prev.to_string(),
        }),
    }
}
