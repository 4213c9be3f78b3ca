//! Gateway configuration
//!
//! Read once from the environment at startup. The token signing secret
//! has no default: starting without one is a deployment error, surfaced
//! immediately rather than silently downgraded.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;

/// Upstream used when a manifest configures no `proxyTarget`
pub const DEFAULT_PROXY_TARGET: &str = "http://localhost:4000";

const DEFAULT_PORT: u16 = 3100;

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Directory holding the durable user/request collections
    pub data_dir: PathBuf,
    /// Directory scanned for service manifests
    pub services_dir: PathBuf,
    /// Process-wide default upstream for services without a target
    pub default_proxy_target: String,
    /// Symmetric token signing secret
    pub token_secret: String,
    /// Enable CORS for browser access
    pub enable_cors: bool,
}

impl GatewayConfig {
    /// Build from `SVCHUB_*` environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        let token_secret = std::env::var("SVCHUB_TOKEN_SECRET")
            .ok()
            .filter(|s| !s.is_empty())
            .context("SVCHUB_TOKEN_SECRET is not set; refusing to start without a signing secret")?;

        let port = match std::env::var("SVCHUB_PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("SVCHUB_PORT is not a valid port: {raw:?}"))?,
            Err(_) => DEFAULT_PORT,
        };

        Ok(Self {
            host: std::env::var("SVCHUB_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port,
            data_dir: std::env::var("SVCHUB_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data")),
            services_dir: std::env::var("SVCHUB_SERVICES_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("services")),
            default_proxy_target: std::env::var("SVCHUB_PROXY_TARGET")
                .unwrap_or_else(|_| DEFAULT_PROXY_TARGET.to_string()),
            token_secret,
            enable_cors: true,
        })
    }

    /// Get the socket address
    pub fn addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }
}
