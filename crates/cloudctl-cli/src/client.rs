//! Shared context, credentials, and error types for the CLI.

use std::fmt::{self, Debug, Display, Formatter};
use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use cloudctl_client::{BillingApi, ClientConfig, HttpBillingClient};
use url::Url;

use crate::cli::Cli;
use crate::output::Printer;

/// Exit status for every failed invocation.
pub(crate) const EXIT_FAILURE: i32 = 1;

/// Message shown when a command needs an API key and none was configured.
pub(crate) const API_KEY_ERROR: &str =
    "API key is required (pass --api-key or set CLOUDCTL_API_KEY)";

/// CLI-level error type separating user mistakes from operational failures.
#[derive(Debug)]
pub(crate) enum CliError {
    Authentication,
    Validation(String),
    Failure(anyhow::Error),
}

/// Convenience alias for functions returning a `CliError`.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Authentication | Self::Validation(_) | Self::Failure(_) => EXIT_FAILURE,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Authentication => API_KEY_ERROR.to_string(),
            Self::Validation(message) => message.clone(),
            Self::Failure(error) => error.to_string(),
        }
    }
}

impl Display for CliError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.display_message())
    }
}

impl std::error::Error for CliError {}

/// API key taken from the command line or the environment.
#[derive(Clone)]
pub(crate) struct ApiKeyCredential {
    token: String,
}

impl ApiKeyCredential {
    pub(crate) fn token(&self) -> &str {
        &self.token
    }
}

impl Debug for ApiKeyCredential {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ApiKeyCredential")
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Application context passed to command handlers.
#[derive(Clone)]
pub(crate) struct AppContext {
    pub(crate) api: Arc<dyn BillingApi>,
    pub(crate) api_key: Option<ApiKeyCredential>,
    pub(crate) printer: Printer,
}

impl AppContext {
    /// Build the context for one invocation, wiring the HTTP client with the
    /// credential and the trace identifier.
    pub(crate) fn from_cli(cli: &Cli, trace_id: &str) -> CliResult<Self> {
        let api_key = parse_api_key(cli.api_key.clone());

        let mut config = ClientConfig::new(cli.api_url.clone());
        config.api_key = api_key.as_ref().map(|key| key.token().to_string());
        config.timeout = Duration::from_secs(cli.timeout);
        config.request_id = Some(trace_id.to_string());

        let client = HttpBillingClient::new(config)
            .map_err(|err| CliError::failure(anyhow!("failed to configure API client: {err}")))?;

        Ok(Self {
            api: Arc::new(client),
            api_key,
            printer: Printer::new(cli.output),
        })
    }

    pub(crate) const fn has_auth(&self) -> bool {
        self.api_key.is_some()
    }

    /// Pre-run guard shared by every authenticated command.
    pub(crate) fn require_auth(&self) -> CliResult<()> {
        if self.has_auth() {
            Ok(())
        } else {
            Err(CliError::Authentication)
        }
    }
}

/// Parse the API URL provided to the CLI.
pub(crate) fn parse_url(input: &str) -> Result<Url, String> {
    input
        .parse::<Url>()
        .map_err(|err| format!("invalid URL '{input}': {err}"))
}

/// Normalise the API key; blank values count as absent.
pub(crate) fn parse_api_key(input: Option<String>) -> Option<ApiKeyCredential> {
    let token = input?.trim().to_string();
    if token.is_empty() {
        None
    } else {
        Some(ApiKeyCredential { token })
    }
}
