//! Handlers for the `billing` command tree.
//!
//! Every leaf runs the same sequence: positional checks, the authentication
//! guard, one request through the [`BillingApi`] seam, then a display adapter.

use std::error::Error;

use cloudctl_api_models::{History, Invoice, InvoiceItem, ListOptions};
use cloudctl_client::{BillingApi, ClientError, ClientResult, Page};

use crate::cli::{BillingCommand, HistoryCommand, InvoiceCommand, InvoiceItemsArgs, PagingArgs};
use crate::client::{AppContext, CliError, CliResult};
use crate::output::{
    BillingHistoryView, BillingOutput, InvoiceItemsView, InvoiceView, InvoicesView,
};

const MISSING_INVOICE_ID: &str = "please provide an invoice ID";

/// Validate arguments, apply the authentication guard, and run the leaf.
pub(crate) async fn execute(
    ctx: &AppContext,
    command: BillingCommand,
) -> CliResult<BillingOutput> {
    validate_args(&command)?;
    ctx.require_auth()?;

    match command {
        BillingCommand::History(HistoryCommand::List(args)) => {
            handle_history_list(ctx, &args).await
        }
        BillingCommand::Invoice(InvoiceCommand::List(args)) => {
            handle_invoice_list(ctx, &args).await
        }
        BillingCommand::Invoice(InvoiceCommand::Get(args)) => {
            handle_invoice_get(ctx, args.invoice_id.as_deref()).await
        }
        BillingCommand::Invoice(InvoiceCommand::Items(args)) => {
            handle_invoice_items(ctx, &args).await
        }
    }
}

fn validate_args(command: &BillingCommand) -> CliResult<()> {
    let invoice_id = match command {
        BillingCommand::Invoice(InvoiceCommand::Get(args)) => args.invoice_id.as_deref(),
        BillingCommand::Invoice(InvoiceCommand::Items(args)) => args.invoice_id.as_deref(),
        BillingCommand::History(_) | BillingCommand::Invoice(InvoiceCommand::List(_)) => {
            return Ok(());
        }
    };
    require_invoice_id(invoice_id).map(|_| ())
}

/// Blank IDs count as missing; present IDs are returned exactly as typed.
fn require_invoice_id(invoice_id: Option<&str>) -> CliResult<&str> {
    invoice_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| CliError::validation(MISSING_INVOICE_ID))
}

fn parse_invoice_id(raw: &str) -> CliResult<i64> {
    raw.parse::<i64>().map_err(|err| {
        CliError::validation(format!("error converting invoice item id : {err}"))
    })
}

fn request_failure(context: &str, err: ClientError) -> CliError {
    let detail = error_chain(&err);
    tracing::debug!(error = %detail, "{context}");
    CliError::failure(anyhow::Error::new(err).context(format!("{context} : {detail}")))
}

/// Render an error and its causes, skipping causes already inlined by a parent.
fn error_chain(err: &(dyn Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut cause = err.source();
    while let Some(inner) = cause {
        let text = inner.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        cause = inner.source();
    }
    message
}

async fn handle_history_list(ctx: &AppContext, args: &PagingArgs) -> CliResult<BillingOutput> {
    let options = args.list_options();
    let page = list_history(ctx.api.as_ref(), &options)
        .await
        .map_err(|err| request_failure("error retrieving billing history list", err))?;
    Ok(BillingOutput::History(BillingHistoryView::from(page)))
}

async fn handle_invoice_list(ctx: &AppContext, args: &PagingArgs) -> CliResult<BillingOutput> {
    let options = args.list_options();
    let page = list_invoices(ctx.api.as_ref(), &options)
        .await
        .map_err(|err| request_failure("error retrieving billing invoice list", err))?;
    Ok(BillingOutput::Invoices(InvoicesView::from(page)))
}

async fn handle_invoice_get(
    ctx: &AppContext,
    invoice_id: Option<&str>,
) -> CliResult<BillingOutput> {
    let invoice_id = require_invoice_id(invoice_id)?;
    let invoice = get_invoice(ctx.api.as_ref(), invoice_id)
        .await
        .map_err(|err| request_failure("error getting invoice", err))?;
    Ok(BillingOutput::Invoice(InvoiceView {
        billing_invoice: invoice,
    }))
}

async fn handle_invoice_items(
    ctx: &AppContext,
    args: &InvoiceItemsArgs,
) -> CliResult<BillingOutput> {
    let options = args.paging.list_options();
    let invoice_id = parse_invoice_id(require_invoice_id(args.invoice_id.as_deref())?)?;
    let page = list_invoice_items(ctx.api.as_ref(), invoice_id, &options)
        .await
        .map_err(|err| request_failure("error retrieving billing invoice item list", err))?;
    Ok(BillingOutput::InvoiceItems(InvoiceItemsView::from(page)))
}

pub(crate) async fn list_history(
    api: &dyn BillingApi,
    options: &ListOptions,
) -> ClientResult<Page<History>> {
    tracing::debug!(per_page = options.per_page, "listing billing history");
    api.list_history(options).await
}

pub(crate) async fn get_invoice(api: &dyn BillingApi, invoice_id: &str) -> ClientResult<Invoice> {
    tracing::debug!(invoice_id, "fetching invoice");
    api.get_invoice(invoice_id).await
}

pub(crate) async fn list_invoices(
    api: &dyn BillingApi,
    options: &ListOptions,
) -> ClientResult<Page<Invoice>> {
    tracing::debug!(per_page = options.per_page, "listing invoices");
    api.list_invoices(options).await
}

pub(crate) async fn list_invoice_items(
    api: &dyn BillingApi,
    invoice_id: i64,
    options: &ListOptions,
) -> ClientResult<Page<InvoiceItem>> {
    tracing::debug!(invoice_id, per_page = options.per_page, "listing invoice items");
    api.list_invoice_items(invoice_id, options).await
}
