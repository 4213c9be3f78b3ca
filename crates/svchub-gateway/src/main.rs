//! svchub binary - configure, then run the gateway

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use svchub_gateway::{GatewayConfig, GatewayServer};

fn init_tracing() {
    // RUST_LOG takes precedence, with sensible defaults for our crates
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("info")
            .add_directive("svchub_core=debug".parse().unwrap())
            .add_directive("svchub_gateway=debug".parse().unwrap())
            .add_directive("svchub_storage=debug".parse().unwrap())
    });

    let console_layer = fmt::layer()
        .with_ansi(true)
        .compact()
        .with_file(false)
        .with_line_number(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (for development)
    dotenvy::dotenv().ok();
    init_tracing();

    let config = GatewayConfig::from_env()?;
    GatewayServer::new(config).run().await
}
