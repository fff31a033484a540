//! Span helpers for command invocations.
//!
//! # Design
//! - Every invocation runs inside one `command` span carrying the command label,
//!   the trace identifier sent as `x-request-id`, and the build SHA.

use tracing::Span;

use crate::init::build_sha;

/// Build the span that wraps a single CLI invocation.
#[must_use]
pub fn command_span(command: &str, trace_id: &str) -> Span {
    tracing::info_span!(
        "command",
        command = %command,
        trace_id = %trace_id,
        build_sha = %build_sha()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_span_can_be_entered() {
        let span = command_span("billing_invoice_list", "trace-1");
        let guard = span.enter();
        tracing::debug!("inside command span");
        drop(guard);
    }
}
