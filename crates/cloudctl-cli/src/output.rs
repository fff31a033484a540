//! Display adapters and the printer that renders them.

use std::io::Write;

use anyhow::anyhow;
use clap::ValueEnum;
use cloudctl_api_models::{History, Invoice, InvoiceItem, Meta};
use cloudctl_client::Page;
use serde::Serialize;

use crate::client::{CliError, CliResult};

const EMPTY_CELL: &str = "---";
const COLUMN_GAP: &str = "  ";

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// Tabular view of a command result.
pub(crate) trait TableView {
    fn columns(&self) -> &'static [&'static str];
    fn rows(&self) -> Vec<Vec<String>>;

    /// Page metadata printed under list results.
    fn meta(&self) -> Option<&Meta> {
        None
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct BillingHistoryView {
    pub(crate) billing_history: Vec<History>,
    pub(crate) meta: Meta,
}

impl From<Page<History>> for BillingHistoryView {
    fn from(page: Page<History>) -> Self {
        Self {
            billing_history: page.items,
            meta: page.meta,
        }
    }
}

impl TableView for BillingHistoryView {
    fn columns(&self) -> &'static [&'static str] {
        &["ID", "DATE", "TYPE", "DESCRIPTION", "AMOUNT", "BALANCE"]
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.billing_history
            .iter()
            .map(|entry| {
                vec![
                    entry.id.to_string(),
                    entry.date.clone(),
                    entry.kind.clone(),
                    entry.description.clone(),
                    entry.amount.to_string(),
                    entry.balance.to_string(),
                ]
            })
            .collect()
    }

    fn meta(&self) -> Option<&Meta> {
        Some(&self.meta)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct InvoicesView {
    pub(crate) billing_invoices: Vec<Invoice>,
    pub(crate) meta: Meta,
}

impl From<Page<Invoice>> for InvoicesView {
    fn from(page: Page<Invoice>) -> Self {
        Self {
            billing_invoices: page.items,
            meta: page.meta,
        }
    }
}

impl TableView for InvoicesView {
    fn columns(&self) -> &'static [&'static str] {
        &INVOICE_COLUMNS
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.billing_invoices.iter().map(invoice_row).collect()
    }

    fn meta(&self) -> Option<&Meta> {
        Some(&self.meta)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct InvoiceView {
    pub(crate) billing_invoice: Invoice,
}

impl TableView for InvoiceView {
    fn columns(&self) -> &'static [&'static str] {
        &INVOICE_COLUMNS
    }

    fn rows(&self) -> Vec<Vec<String>> {
        vec![invoice_row(&self.billing_invoice)]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct InvoiceItemsView {
    pub(crate) invoice_items: Vec<InvoiceItem>,
    pub(crate) meta: Meta,
}

impl From<Page<InvoiceItem>> for InvoiceItemsView {
    fn from(page: Page<InvoiceItem>) -> Self {
        Self {
            invoice_items: page.items,
            meta: page.meta,
        }
    }
}

impl TableView for InvoiceItemsView {
    fn columns(&self) -> &'static [&'static str] {
        &[
            "DESCRIPTION",
            "PRODUCT",
            "START DATE",
            "END DATE",
            "UNITS",
            "UNIT TYPE",
            "UNIT PRICE",
            "TOTAL",
        ]
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.invoice_items
            .iter()
            .map(|item| {
                vec![
                    item.description.clone(),
                    item.product.clone(),
                    item.start_date.clone(),
                    item.end_date.clone(),
                    item.units.to_string(),
                    item.unit_type.clone(),
                    item.unit_price.to_string(),
                    item.total.to_string(),
                ]
            })
            .collect()
    }

    fn meta(&self) -> Option<&Meta> {
        Some(&self.meta)
    }
}

const INVOICE_COLUMNS: [&str; 5] = ["ID", "DATE", "DESCRIPTION", "AMOUNT", "BALANCE"];

fn invoice_row(invoice: &Invoice) -> Vec<String> {
    vec![
        invoice.id.to_string(),
        invoice.date.clone(),
        invoice.description.clone(),
        invoice.amount.to_string(),
        invoice.balance.to_string(),
    ]
}

/// Result of a billing command, ready to be printed.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum BillingOutput {
    History(BillingHistoryView),
    Invoices(InvoicesView),
    Invoice(InvoiceView),
    InvoiceItems(InvoiceItemsView),
}

/// Renders display adapters in the format selected on the command line.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Printer {
    format: OutputFormat,
}

impl Printer {
    pub(crate) const fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub(crate) fn display_billing<W: Write>(
        &self,
        output: &BillingOutput,
        out: &mut W,
    ) -> CliResult<()> {
        match output {
            BillingOutput::History(view) => self.display(view, out),
            BillingOutput::Invoices(view) => self.display(view, out),
            BillingOutput::Invoice(view) => self.display(view, out),
            BillingOutput::InvoiceItems(view) => self.display(view, out),
        }
    }

    pub(crate) fn display<V, W>(&self, view: &V, out: &mut W) -> CliResult<()>
    where
        V: TableView + Serialize,
        W: Write,
    {
        let text = match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(view)
                .map(|mut text| {
                    text.push('\n');
                    text
                })
                .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))?,
            OutputFormat::Table => render_table(view),
        };
        out.write_all(text.as_bytes())
            .and_then(|()| out.flush())
            .map_err(|err| CliError::failure(anyhow!("failed to write output: {err}")))
    }
}

fn render_table<V: TableView>(view: &V) -> String {
    let columns = view.columns();
    let mut rows = view.rows();
    if rows.is_empty() {
        rows.push(vec![EMPTY_CELL.to_string(); columns.len()]);
    }

    let mut text = format_rows(columns, &rows);
    if let Some(meta) = view.meta() {
        text.push_str(EMPTY_CELL);
        text.push('\n');
        let paging = vec![
            meta.total.to_string(),
            meta.next_cursor().unwrap_or_default().to_string(),
            meta.prev_cursor().unwrap_or_default().to_string(),
        ];
        text.push_str(&format_rows(&["TOTAL", "NEXT PAGE", "PREV PAGE"], &[paging]));
    }
    text
}

fn format_rows(columns: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = columns.iter().map(|col| col.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut text = String::new();
    let header: Vec<String> = columns.iter().map(|col| (*col).to_string()).collect();
    for row in std::iter::once(&header).chain(rows) {
        let line = row
            .iter()
            .zip(&widths)
            .map(|(cell, &width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join(COLUMN_GAP);
        text.push_str(line.trim_end());
        text.push('\n');
    }
    text
}
