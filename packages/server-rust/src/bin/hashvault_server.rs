//! `hashvault-server` binary: parses the CLI, installs logging, and runs the
//! network module until Ctrl+C, SIGTERM, or a request to `/shutdown`.

use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use hashvault_server::{HashService, NetworkConfig, NetworkModule, ServiceConfig};
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

/// Password digest service with asynchronous jobs and graceful drain.
#[derive(Debug, Parser)]
#[command(version, about)]
struct CliArgs {
    /// Port on which the service listens.
    #[arg(short = 'p', long, env = "HASHVAULT_PORT", default_value_t = 8080)]
    port: u16,

    /// Address to bind.
    #[arg(long, env = "HASHVAULT_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Delay each job waits before computing its digest, in milliseconds.
    #[arg(long, env = "HASHVAULT_DELAY_MS", default_value_t = 5_000)]
    delay_ms: u64,

    /// Largest accepted request body, in bytes.
    #[arg(long, env = "HASHVAULT_MAX_PAYLOAD_BYTES", default_value_t = hashvault_core::DEFAULT_MAX_PAYLOAD_BYTES)]
    max_payload_bytes: usize,

    /// Per-request timeout, in seconds.
    #[arg(long, env = "HASHVAULT_REQUEST_TIMEOUT_SECS", default_value_t = 10)]
    request_timeout_secs: u64,

    /// How long open connections get to finish after shutdown begins, in seconds.
    #[arg(long, env = "HASHVAULT_SHUTDOWN_TIMEOUT_SECS", default_value_t = 5)]
    shutdown_timeout_secs: u64,

    /// Upper bound on the shutdown drain, in seconds. Unbounded when unset.
    #[arg(long, env = "HASHVAULT_DRAIN_TIMEOUT_SECS")]
    drain_timeout_secs: Option<u64>,

    /// Log output format.
    #[arg(long, env = "HASHVAULT_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

impl CliArgs {
    fn network_config(&self) -> NetworkConfig {
        NetworkConfig {
            host: self.host.clone(),
            port: self.port,
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            shutdown_timeout: Duration::from_secs(self.shutdown_timeout_secs),
        }
    }

    fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            processing_delay: Duration::from_millis(self.delay_ms),
            max_payload_bytes: self.max_payload_bytes,
            drain_timeout: self.drain_timeout_secs.map(Duration::from_secs),
        }
    }
}

fn init_logging(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();
    init_logging(args.log_format);

    let service = Arc::new(HashService::new(args.service_config()));
    let mut module = NetworkModule::new(args.network_config(), service);

    let port = module.start().await?;
    info!(
        port,
        delay_ms = args.delay_ms,
        "hashvault starting, listening on port {port}"
    );

    module.serve(shutdown_signal()).await?;

    info!("hashvault exiting");
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        () = ctrl_c => info!("received Ctrl+C signal"),
        () = terminate => info!("received SIGTERM signal"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_service_defaults() {
        let args = CliArgs::try_parse_from(["hashvault-server"]).unwrap();
        assert_eq!(args.port, 8080);
        assert_eq!(args.log_format, LogFormat::Text);

        let service = args.service_config();
        assert_eq!(service.processing_delay, Duration::from_secs(5));
        assert_eq!(service.max_payload_bytes, hashvault_core::DEFAULT_MAX_PAYLOAD_BYTES);
        assert!(service.drain_timeout.is_none());
    }

    #[test]
    fn short_port_flag() {
        let args = CliArgs::try_parse_from(["hashvault-server", "-p", "9090"]).unwrap();
        let network = args.network_config();
        assert_eq!(network.port, 9090);
        assert_eq!(network.shutdown_timeout, Duration::from_secs(5));
    }

    #[test]
    fn drain_timeout_and_format() {
        let args = CliArgs::try_parse_from([
            "hashvault-server",
            "--drain-timeout-secs",
            "3",
            "--log-format",
            "json",
            "--delay-ms",
            "250",
        ])
        .unwrap();
        let service = args.service_config();
        assert_eq!(service.drain_timeout, Some(Duration::from_secs(3)));
        assert_eq!(service.processing_delay, Duration::from_millis(250));
        assert_eq!(args.log_format, LogFormat::Json);
    }
}
