use anyhow::{Context, Result};
use tokio::net::TcpListener;

use crate::config::ServerConfig;

/// Bind the configured host and port. The host may be a name (`localhost`) or
/// a bare IPv4/IPv6 address (`0.0.0.0`, `::`).
pub async fn bind_listener(server: &ServerConfig) -> Result<TcpListener> {
    TcpListener::bind((server.host.as_str(), server.port))
        .await
        .with_context(|| format!("Failed to bind {}:{}", server.host, server.port))
}
