//! gRPC channel configuration and connection helpers.
//!
//! Channels to the naming service are connected eagerly with bounded retry;
//! channels to object endpoints are connected lazily so that a dead endpoint
//! only shows up when it is actually called.

use std::time::Duration;

use tonic::transport::{Channel, Endpoint};
use tracing::Instrument;

fn duration_to_u64_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Transport-level settings for outgoing channels.
#[derive(Debug, Clone)]
pub struct GrpcClientConfig {
    /// Timeout for establishing a connection.
    pub connect_timeout: Duration,

    /// Per-call timeout. `None` lets a call run until the peer answers or
    /// the connection breaks.
    pub rpc_timeout: Option<Duration>,

    /// Extra connection attempts after the first one fails.
    pub max_retries: u32,

    /// Backoff after the first failed attempt; grows linearly per attempt.
    pub base_backoff: Duration,

    pub max_backoff: Duration,

    /// Name used in tracing output.
    pub service_name: &'static str,
}

impl Default for GrpcClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            rpc_timeout: None,
            max_retries: 3,
            base_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(5),
            service_name: "grpc_client",
        }
    }
}

impl GrpcClientConfig {
    pub fn new(service_name: &'static str) -> Self {
        Self {
            service_name,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_rpc_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.rpc_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }
}

/// Build a tonic `Endpoint` with timeouts and keepalive settings.
pub fn build_endpoint(
    uri: String,
    cfg: &GrpcClientConfig,
) -> Result<Endpoint, tonic::transport::Error> {
    let mut endpoint = Endpoint::from_shared(uri)?
        .connect_timeout(cfg.connect_timeout)
        .tcp_keepalive(Some(Duration::from_secs(30)))
        .http2_keep_alive_interval(Duration::from_secs(30))
        .keep_alive_timeout(Duration::from_secs(10))
        .keep_alive_while_idle(true);

    if let Some(timeout) = cfg.rpc_timeout {
        endpoint = endpoint.timeout(timeout);
    }

    Ok(endpoint)
}

/// Connect once, inside a tracing span.
pub async fn connect_with_stack(
    uri: impl Into<String>,
    cfg: &GrpcClientConfig,
) -> anyhow::Result<Channel> {
    let uri_string = uri.into();
    let span = tracing::debug_span!(
        "grpc_connect",
        service = cfg.service_name,
        uri = %uri_string
    );

    async move {
        let endpoint = build_endpoint(uri_string, cfg)?;
        let channel = endpoint.connect().await?;
        tracing::debug!(
            service = cfg.service_name,
            connect_timeout_ms = duration_to_u64_ms(cfg.connect_timeout),
            "gRPC client connected"
        );
        Ok(channel)
    }
    .instrument(span)
    .await
}

/// Connect with up to `max_retries` extra attempts and linear backoff.
pub async fn connect_with_retry(
    uri: impl Into<String>,
    cfg: &GrpcClientConfig,
) -> anyhow::Result<Channel> {
    use anyhow::Context;

    let uri_string = uri.into();
    let mut attempt: u32 = 0;

    loop {
        attempt += 1;

        match connect_with_stack(&uri_string, cfg).await {
            Ok(channel) => {
                if attempt > 1 {
                    tracing::info!(
                        service = cfg.service_name,
                        attempt,
                        "gRPC connection established after retries"
                    );
                }
                return Ok(channel);
            }
            Err(e) if attempt <= cfg.max_retries => {
                let backoff = (cfg.base_backoff * attempt).min(cfg.max_backoff);
                tracing::warn!(
                    service = cfg.service_name,
                    attempt,
                    max_retries = cfg.max_retries,
                    error = %e,
                    backoff_ms = duration_to_u64_ms(backoff),
                    "gRPC connection failed, retrying"
                );
                tokio::time::sleep(backoff).await;
            }
            Err(e) => {
                tracing::debug!(
                    service = cfg.service_name,
                    attempt,
                    error = %e,
                    "gRPC connection failed after all retries"
                );
                return Err(e).context(format!(
                    "failed to connect to {} at {uri_string} after {attempt} attempts",
                    cfg.service_name
                ));
            }
        }
    }
}

/// A channel that connects on first use.
pub fn connect_lazy(uri: impl Into<String>, cfg: &GrpcClientConfig) -> anyhow::Result<Channel> {
    Ok(build_endpoint(uri.into(), cfg)?.connect_lazy())
}
