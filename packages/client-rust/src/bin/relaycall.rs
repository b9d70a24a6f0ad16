//! Invokes a single operation on a relay-hosted service.
//!
//! ```sh
//! RELAYCALL_NAMESPACE=myns.servicebus.windows.net \
//! RELAYCALL_KEY=<base64 key> \
//! relaycall --service orders --operation GetOrder --body '{"id": 7}'
//! ```
//!
//! The reply is printed as JSON on stdout. Failures are logged to stderr and
//! the process exits with status 1.

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use relaycall_client::http::{BindingConfig, HttpTransport, DEFAULT_TOKEN_HEADER};
use relaycall_client::{init_tracing, Channel, InvocationRunner};
use relaycall_core::config::DEFAULT_KEY_NAME;
use relaycall_core::{RelayConfig, SharedKey, TracingErrorLogger};

#[derive(Parser, Debug)]
#[command(name = "relaycall")]
#[command(about = "Invoke one operation on a relay-hosted service")]
struct Args {
    /// Relay namespace host, e.g. `myns.servicebus.windows.net`.
    #[arg(long, env = "RELAYCALL_NAMESPACE")]
    namespace: String,

    /// URI scheme used to reach the namespace.
    #[arg(long, default_value = "https", env = "RELAYCALL_SCHEME")]
    scheme: String,

    /// Shared access key name.
    #[arg(long, default_value = DEFAULT_KEY_NAME, env = "RELAYCALL_KEY_NAME")]
    key_name: String,

    /// Shared access key value.
    #[arg(long, env = "RELAYCALL_KEY", hide_env_values = true)]
    key: String,

    /// Service path within the namespace.
    #[arg(long)]
    service: String,

    /// Operation to invoke.
    #[arg(long)]
    operation: String,

    /// JSON request body.
    #[arg(long, default_value = "null")]
    body: String,

    /// Per-request timeout in seconds.
    #[arg(long, default_value_t = 60)]
    timeout_secs: u64,

    /// Header carrying the access token.
    #[arg(long, default_value = DEFAULT_TOKEN_HEADER)]
    token_header: String,

    /// Emit logs as JSON lines.
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();
    init_tracing(args.json_logs);

    let body: serde_json::Value =
        serde_json::from_str(&args.body).context("--body is not valid JSON")?;

    let transport = HttpTransport::new(BindingConfig {
        request_timeout: Duration::from_secs(args.timeout_secs),
        token_header: args.token_header,
        ..BindingConfig::default()
    });
    let config = RelayConfig {
        namespace_address: args.namespace,
        scheme: args.scheme,
        shared_key: SharedKey::new(args.key_name, args.key),
    };

    let runner = InvocationRunner::builder()
        .transport(transport)
        .config(Arc::new(config))
        .logger(Arc::new(TracingErrorLogger))
        .build()?;

    let operation = args.operation;
    let outcome = runner
        .invoke(&args.service, move |ch| {
            Box::pin(async move {
                let reply = ch.call(&operation, body).await?;
                println!("{}", serde_json::to_string_pretty(&reply)?);
                Ok::<_, anyhow::Error>(())
            })
        })
        .await?;

    if outcome.is_success() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
