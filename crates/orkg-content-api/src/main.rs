//! ORKG Content API - Entry Point

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use orkg_content_api::{config::defaults, http, Config, Services};

#[derive(Parser, Debug)]
#[command(name = "orkg-content-api")]
#[command(about = "REST API for scholarly knowledge graph content types")]
#[command(version)]
struct Cli {
    /// HTTP server port
    #[arg(long, default_value_t = defaults::PORT, env = "ORKG_API_PORT")]
    port: u16,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,
}

fn init_tracing(log_level: &str, json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if json {
        subscriber.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        subscriber.with(tracing_subscriber::fmt::layer().compact()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    init_tracing(&cli.log_level, cli.json_logs);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        port = cli.port,
        "Starting ORKG content API server"
    );

    let config = Config::new(cli.port);
    let services = Services::new(&config);

    http::run(&config, services).await
}
