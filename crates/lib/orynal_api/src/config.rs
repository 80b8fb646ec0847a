//! API server configuration.

use std::time::Duration;

use orynal_core::auth::jwt::resolve_jwt_secret;

/// Grace period for in-flight requests on shutdown.
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for the API server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "127.0.0.1:3100").
    pub bind_addr: String,
    /// PostgreSQL connection URL.
    pub pg_connection_url: String,
    /// JWT signing secret shared by every token.
    pub jwt_secret: String,
    /// How long shutdown waits for in-flight requests.
    pub shutdown_timeout: Duration,
}

impl ApiConfig {
    /// Builds the configuration from the server's arguments. A missing or
    /// blank `jwt_secret` is replaced by an ephemeral one.
    pub fn new(
        bind_addr: String,
        pg_connection_url: String,
        jwt_secret: Option<String>,
        shutdown_timeout: Duration,
    ) -> Self {
        Self {
            bind_addr,
            pg_connection_url,
            jwt_secret: resolve_jwt_secret(jwt_secret),
            shutdown_timeout,
        }
    }

    /// Signing secret as bytes.
    pub fn secret_bytes(&self) -> &[u8] {
        self.jwt_secret.as_bytes()
    }
}
