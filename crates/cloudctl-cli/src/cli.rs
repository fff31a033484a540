//! Command-line parsing, logging setup, and command dispatch.

use std::io::{self, Write};

use clap::{Args, Parser, Subcommand};
use cloudctl_api_models::{ListOptions, PER_PAGE_DEFAULT};
use cloudctl_telemetry::{DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig, command_span, init_logging};
use tracing::Instrument;
use url::Url;
use uuid::Uuid;

use crate::client::{AppContext, CliResult, parse_url};
use crate::commands::billing;
use crate::output::OutputFormat;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_API_URL: &str = "https://api.vultr.com";

const BILLING_LONG: &str = "Get all available commands for billing";
const BILLING_EXAMPLE: &str = "Examples:
  # Full example
  cloudctl billing";

const HISTORY_LONG: &str = "Get all available commands for billing history";
const HISTORY_EXAMPLE: &str = "Examples:
  # Full example
  cloudctl billing history

  # Shortened with alias commands
  cloudctl billing h";

const HISTORY_LIST_LONG: &str = "Retrieve a list of all billing history on your account";
const HISTORY_LIST_EXAMPLE: &str = "Examples:
  # Full example
  cloudctl billing history list

  # Shortened with alias commands
  cloudctl billing h l";

const INVOICE_LONG: &str = "Get all available commands for billing invoices";
const INVOICE_EXAMPLE: &str = "Examples:
  # Full example
  cloudctl billing invoice

  # Shortened with alias commands
  cloudctl billing i";

const INVOICE_LIST_LONG: &str = "Retrieve a list of all invoices on your account";
const INVOICE_LIST_EXAMPLE: &str = "Examples:
  # Full example
  cloudctl billing invoice list

  # Shortened with alias commands
  cloudctl billing i l";

const INVOICE_GET_LONG: &str = "Get a specific invoice on your account";
const INVOICE_GET_EXAMPLE: &str = "Examples:
  # Full example
  cloudctl billing invoice get 123456

  # Shortened with alias commands
  cloudctl billing i g 123456";

const INVOICE_ITEMS_LONG: &str =
    "Retrieve a list of invoice items from a specific invoice on your account";
const INVOICE_ITEMS_EXAMPLE: &str = "Examples:
  # Full example
  cloudctl billing invoice items 123456

  # Shortened with alias commands
  cloudctl billing i i 123456";

/// Parses CLI arguments, executes the requested command, and reports errors.
/// Returns the process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();
    install_logging(&cli);

    let trace_id = Uuid::new_v4().to_string();
    let span = command_span(command_label(&cli.command), &trace_id);

    async move {
        let ctx = match AppContext::from_cli(&cli, &trace_id) {
            Ok(ctx) => ctx,
            Err(err) => {
                eprintln!("error: {}", err.display_message());
                return err.exit_code();
            }
        };
        execute(&ctx, cli.command, &mut io::stdout(), &mut io::stderr()).await
    }
    .instrument(span)
    .await
}

fn install_logging(cli: &Cli) {
    let config = LoggingConfig {
        level: &cli.log_level,
        format: cli.log_format,
        build_sha: env!("CARGO_PKG_VERSION"),
    };
    if let Err(err) = init_logging(&config) {
        eprintln!("warning: {err}");
    }
}

/// Run a parsed command, printing results to `out` and failures to `err_out`.
pub(crate) async fn execute<W, E>(
    ctx: &AppContext,
    command: Command,
    out: &mut W,
    err_out: &mut E,
) -> i32
where
    W: Write,
    E: Write,
{
    match dispatch(ctx, command, out).await {
        Ok(()) => 0,
        Err(err) => {
            let message = err.display_message();
            tracing::debug!(error = %message, "command failed");
            if writeln!(err_out, "error: {message}").is_err() {
                tracing::debug!("failed to write error output");
            }
            err.exit_code()
        }
    }
}

async fn dispatch<W: Write>(ctx: &AppContext, command: Command, out: &mut W) -> CliResult<()> {
    match command {
        Command::Billing(command) => {
            let output = billing::execute(ctx, command).await?;
            ctx.printer.display_billing(&output, out)
        }
    }
}

#[derive(Parser)]
#[command(
    name = "cloudctl",
    version,
    about = "Command-line client for cloud account management"
)]
pub(crate) struct Cli {
    #[arg(
        long,
        global = true,
        env = "CLOUDCTL_API_URL",
        value_parser = parse_url,
        default_value = DEFAULT_API_URL
    )]
    pub(crate) api_url: Url,
    #[arg(long, global = true, env = "CLOUDCTL_API_KEY", hide_env_values = true)]
    pub(crate) api_key: Option<String>,
    #[arg(
        long,
        global = true,
        env = "CLOUDCTL_HTTP_TIMEOUT_SECS",
        default_value_t = DEFAULT_TIMEOUT_SECS
    )]
    pub(crate) timeout: u64,
    #[arg(
        long = "output",
        alias = "format",
        global = true,
        value_enum,
        default_value_t = OutputFormat::Table,
        help = "Select output format for commands that render structured data"
    )]
    pub(crate) output: OutputFormat,
    #[arg(
        long,
        global = true,
        env = "CLOUDCTL_LOG",
        default_value = DEFAULT_LOG_LEVEL,
        help = "Log level or filter directive (RUST_LOG takes precedence)"
    )]
    pub(crate) log_level: String,
    #[arg(
        long,
        global = true,
        env = "CLOUDCTL_LOG_FORMAT",
        default_value_t = LogFormat::Pretty,
        help = "Log output format: pretty or json"
    )]
    pub(crate) log_format: LogFormat,
    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    #[command(
        subcommand,
        about = "display billing information",
        long_about = BILLING_LONG,
        after_help = BILLING_EXAMPLE
    )]
    Billing(BillingCommand),
}

#[derive(Debug, Subcommand)]
pub(crate) enum BillingCommand {
    #[command(
        subcommand,
        visible_alias = "h",
        about = "display billing history information",
        long_about = HISTORY_LONG,
        after_help = HISTORY_EXAMPLE
    )]
    History(HistoryCommand),
    #[command(
        subcommand,
        visible_alias = "i",
        about = "display invoice information",
        long_about = INVOICE_LONG,
        after_help = INVOICE_EXAMPLE
    )]
    Invoice(InvoiceCommand),
}

#[derive(Debug, Subcommand)]
pub(crate) enum HistoryCommand {
    #[command(
        visible_alias = "l",
        about = "list billing history",
        long_about = HISTORY_LIST_LONG,
        after_help = HISTORY_LIST_EXAMPLE
    )]
    List(PagingArgs),
}

#[derive(Debug, Subcommand)]
pub(crate) enum InvoiceCommand {
    #[command(
        visible_alias = "l",
        about = "list billing invoices",
        long_about = INVOICE_LIST_LONG,
        after_help = INVOICE_LIST_EXAMPLE
    )]
    List(PagingArgs),
    #[command(
        visible_alias = "g",
        about = "get invoice",
        long_about = INVOICE_GET_LONG,
        after_help = INVOICE_GET_EXAMPLE
    )]
    Get(InvoiceGetArgs),
    #[command(
        visible_alias = "i",
        about = "list invoice items",
        long_about = INVOICE_ITEMS_LONG,
        after_help = INVOICE_ITEMS_EXAMPLE
    )]
    Items(InvoiceItemsArgs),
}

#[derive(Debug, Clone, Args)]
pub(crate) struct PagingArgs {
    #[arg(short = 'c', long, help = "(optional) Cursor for paging.")]
    pub(crate) cursor: Option<String>,
    #[arg(
        short = 'p',
        long = "per-page",
        default_value_t = PER_PAGE_DEFAULT,
        help = "(optional) Number of items requested per page. Default is 100 and Max is 500."
    )]
    pub(crate) per_page: u32,
}

impl PagingArgs {
    pub(crate) fn list_options(&self) -> ListOptions {
        ListOptions::new(self.per_page, self.cursor.clone())
    }
}

#[derive(Debug, Args)]
pub(crate) struct InvoiceGetArgs {
    #[arg(value_name = "INVOICE_ID", help = "Invoice identifier")]
    pub(crate) invoice_id: Option<String>,
}

#[derive(Debug, Args)]
pub(crate) struct InvoiceItemsArgs {
    #[arg(value_name = "INVOICE_ID", help = "Invoice identifier")]
    pub(crate) invoice_id: Option<String>,
    #[command(flatten)]
    pub(crate) paging: PagingArgs,
}

const fn command_label(command: &Command) -> &'static str {
    match command {
        Command::Billing(BillingCommand::History(HistoryCommand::List(_))) => {
            "billing_history_list"
        }
        Command::Billing(BillingCommand::Invoice(InvoiceCommand::List(_))) => {
            "billing_invoice_list"
        }
        Command::Billing(BillingCommand::Invoice(InvoiceCommand::Get(_))) => "billing_invoice_get",
        Command::Billing(BillingCommand::Invoice(InvoiceCommand::Items(_))) => {
            "billing_invoice_items"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{
        Call, FakeBillingApi, context_with, sample_invoice, sample_meta,
    };
    use clap::CommandFactory;
    use std::sync::{Arc, Mutex, PoisonError};
    use tracing_subscriber::EnvFilter;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["cloudctl"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).expect("arguments should parse")
    }

    #[test]
    fn command_tree_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn per_page_defaults_to_documented_value() {
        let cli = parse(&["billing", "invoice", "list"]);
        let Command::Billing(BillingCommand::Invoice(InvoiceCommand::List(paging))) = cli.command
        else {
            panic!("expected invoice list");
        };
        assert_eq!(paging.per_page, 100);
        assert_eq!(paging.list_options(), ListOptions::default());
    }

    #[test]
    fn short_flags_and_aliases_resolve() {
        let cli = parse(&["billing", "i", "i", "123456", "-c", "abc", "-p", "25"]);
        let Command::Billing(BillingCommand::Invoice(InvoiceCommand::Items(args))) = cli.command
        else {
            panic!("expected invoice items");
        };
        assert_eq!(args.invoice_id.as_deref(), Some("123456"));
        assert_eq!(args.paging.list_options(), ListOptions::new(25, Some("abc".into())));

        let cli = parse(&["billing", "h", "l"]);
        assert_eq!(command_label(&cli.command), "billing_history_list");

        let cli = parse(&["billing", "i", "g", "42"]);
        assert_eq!(command_label(&cli.command), "billing_invoice_get");
    }

    #[test]
    fn non_numeric_per_page_is_rejected_by_parser() {
        let result = Cli::try_parse_from(["cloudctl", "billing", "invoice", "list", "-p", "many"]);
        assert!(result.is_err());
    }

    #[test]
    fn output_and_log_flags_are_global() {
        let cli = parse(&[
            "billing",
            "invoice",
            "list",
            "--output",
            "json",
            "--log-format",
            "json",
            "--log-level",
            "debug",
        ]);
        assert_eq!(cli.output, OutputFormat::Json);
        assert_eq!(cli.log_format, LogFormat::Json);
        assert_eq!(cli.log_level, "debug");
    }

    #[tokio::test]
    async fn invoice_list_failure_exits_with_one() {
        let api = Arc::new(FakeBillingApi::failing("service unavailable"));
        let ctx = context_with(&api, true);
        let cli = parse(&["billing", "invoice", "list"]);

        let mut out = Vec::new();
        let mut err_out = Vec::new();
        let code = execute(&ctx, cli.command, &mut out, &mut err_out).await;

        assert_eq!(code, 1);
        assert!(out.is_empty());
        let message = String::from_utf8(err_out).expect("utf8 error output");
        assert!(message.contains("error retrieving billing invoice list"));
        assert!(message.contains("service unavailable"));
    }

    #[tokio::test]
    async fn invoice_get_success_prints_table() {
        let api = Arc::new(FakeBillingApi::with_invoices(
            vec![sample_invoice(123_456)],
            sample_meta(1, "", ""),
        ));
        let ctx = context_with(&api, true);
        let cli = parse(&["billing", "invoice", "get", "123456"]);

        let mut out = Vec::new();
        let mut err_out = Vec::new();
        let code = execute(&ctx, cli.command, &mut out, &mut err_out).await;

        assert_eq!(code, 0);
        assert!(err_out.is_empty());
        let text = String::from_utf8(out).expect("utf8 output");
        assert!(text.contains("Invoice #123456"));
        assert_eq!(api.calls(), vec![Call::GetInvoice("123456".into())]);
    }

    struct LogSink(Arc<Mutex<Vec<u8>>>);

    impl Write for LogSink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn each_failure_is_reported_once() {
        let logs = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&logs);
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new(DEFAULT_LOG_LEVEL))
            .with_writer(move || LogSink(Arc::clone(&sink)))
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let cases: [(&[&str], bool); 3] = [
            (&["billing", "invoice", "list"], false),
            (&["billing", "invoice", "items"], true),
            (&["billing", "i", "i", "abc"], true),
        ];
        for (args, authed) in cases {
            let api = Arc::new(FakeBillingApi::default());
            let ctx = context_with(&api, authed);
            let cli = parse(args);

            let mut out = Vec::new();
            let mut err_out = Vec::new();
            let code = execute(&ctx, cli.command, &mut out, &mut err_out).await;

            assert_eq!(code, 1);
            let message = String::from_utf8(err_out).expect("utf8 error output");
            assert_eq!(message.lines().count(), 1, "{args:?} printed {message:?}");
            assert!(message.starts_with("error: "));
        }

        let logged = logs.lock().unwrap_or_else(PoisonError::into_inner).clone();
        assert!(
            logged.is_empty(),
            "default log level repeated the error: {}",
            String::from_utf8_lossy(&logged)
        );
    }

    #[tokio::test]
    async fn missing_auth_reports_api_key_error() {
        let api = Arc::new(FakeBillingApi::default());
        let ctx = context_with(&api, false);
        let cli = parse(&["billing", "history", "list"]);

        let mut out = Vec::new();
        let mut err_out = Vec::new();
        let code = execute(&ctx, cli.command, &mut out, &mut err_out).await;

        assert_eq!(code, 1);
        let message = String::from_utf8(err_out).expect("utf8 error output");
        assert!(message.starts_with("error: API key is required"));
        assert!(api.calls().is_empty());
    }
}
