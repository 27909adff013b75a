use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::{self, net::TcpListener};
use tracing_subscriber::EnvFilter;
use zimage_core::{resolve_variant, DeviceMap, Handler, PlaceholderLoader};

mod routes;

// Define command line arguments
#[derive(Parser, Debug)]
#[command(author, version, about = "Z-Image Turbo serverless worker")]
struct Args {
    /// Use CPU instead of GPU
    #[arg(long)]
    cpu: bool,

    /// Model variant to serve
    #[arg(long, default_value = "z-image-turbo")]
    model: String,

    /// Host address to bind the server to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to bind the server to
    #[arg(long, default_value_t = 8000)]
    port: u16,

    /// Run a single job event (JSON) through the handler, print its output and exit
    #[arg(long, value_name = "JSON")]
    test_input: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let variant = resolve_variant(&args.model)?;

    // The model itself is loaded by the first job, not here.
    let handler = Arc::new(Handler::new(
        PlaceholderLoader,
        variant,
        DeviceMap::from_cpu_flag(args.cpu),
    ));

    if let Some(test_input) = args.test_input {
        let event: serde_json::Value =
            serde_json::from_str(&test_input).context("--test-input is not valid JSON")?;
        let output = handler.handle(&event).await;
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let app = routes::router(handler);

    let bind_address = format!("{}:{}", args.host, args.port);
    let listener = TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("failed to bind {bind_address}"))?;
    tracing::info!(model = %variant, "Started worker on {}", listener.local_addr()?);
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
