//! Network module with deferred startup lifecycle.
//!
//! Implements the deferred startup pattern: `new()` wires the router state,
//! `start()` binds the TCP listener, and `serve()` opens the accept path and
//! runs until shutdown, then drains outstanding jobs.

use std::future::{Future, IntoFuture};
use std::sync::Arc;
use std::time::Instant;

use anyhow::anyhow;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tracing::{info, warn};

use super::config::NetworkConfig;
use super::handlers::{
    create_hash_handler, health_handler, liveness_handler, read_hash_handler, readiness_handler,
    shutdown_handler, stats_handler, AppState,
};
use super::middleware::build_http_layers;
use crate::service::HashService;

/// Manages the HTTP server lifecycle around a [`HashService`].
///
/// 1. `new()` -- holds the config and the shared service (state `Starting`)
/// 2. `start()` -- binds TCP listener to the configured address
/// 3. `serve()` -- moves the service to `Running` and serves until shutdown
///    is requested, then stops the listener and drains in-flight jobs
pub struct NetworkModule {
    config: NetworkConfig,
    listener: Option<TcpListener>,
    service: Arc<HashService>,
}

impl NetworkModule {
    /// Creates a new network module without binding any port.
    #[must_use]
    pub fn new(config: NetworkConfig, service: Arc<HashService>) -> Self {
        Self {
            config,
            listener: None,
            service,
        }
    }

    /// Returns a shared reference to the service.
    #[must_use]
    pub fn service(&self) -> Arc<HashService> {
        Arc::clone(&self.service)
    }

    /// Assembles the axum router with all routes and middleware.
    ///
    /// Routes:
    /// - `POST /hash` -- submit a `password=<secret>` body, returns a handle
    /// - `GET /hash/{id}` -- fetch the digest for a handle
    /// - `GET /stats` -- accept-latency statistics
    /// - `GET|POST /shutdown` -- begin graceful shutdown
    /// - `GET /health`, `/health/live`, `/health/ready` -- probes
    pub fn build_router(&self) -> Router {
        build_router(&self.config, &self.service)
    }

    /// Binds the TCP listener to the configured host and port.
    ///
    /// Returns the actual bound port, which may differ from the configured
    /// port when port 0 is used (OS-assigned ephemeral port).
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be bound (e.g., port in use).
    pub async fn start(&mut self) -> anyhow::Result<u16> {
        let listener = TcpListener::bind(self.config.bind_addr()).await?;
        let port = listener.local_addr()?.port();

        info!("TCP listener bound to {}:{}", self.config.host, port);

        self.listener = Some(listener);
        Ok(port)
    }

    /// Serves requests until `shutdown` completes or the service's own
    /// shutdown is requested (e.g. through `/shutdown`).
    ///
    /// Both triggers converge on [`HashService::begin_shutdown`]. The
    /// listener then stops accepting connections, open requests finish,
    /// and all in-flight jobs are drained before this returns.
    ///
    /// # Errors
    ///
    /// Returns an error if `start()` was not called first, or if the server
    /// hits a fatal I/O error. Jobs are drained in the I/O error case too.
    pub async fn serve(
        self,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> anyhow::Result<()> {
        let listener = self
            .listener
            .ok_or_else(|| anyhow!("start() must be called before serve()"))?;
        let router = build_router(&self.config, &self.service);
        let service = self.service;

        service.mark_running();
        info!("hashvault started, accepting work");

        let signal_service = Arc::clone(&service);
        let lifecycle = service.lifecycle();
        let graceful = async move {
            tokio::select! {
                () = shutdown => {
                    signal_service.begin_shutdown();
                }
                () = lifecycle.shutdown_requested() => {}
            }
            info!("hashvault stopping: shutting down http server");
        };

        let mut server = Box::pin(
            axum::serve(listener, router)
                .with_graceful_shutdown(graceful)
                .into_future(),
        );

        // Bounds the HTTP phase only; accepted jobs are drained below.
        let lifecycle = service.lifecycle();
        let shutdown_timeout = self.config.shutdown_timeout;
        let http_deadline = async move {
            lifecycle.shutdown_requested().await;
            tokio::time::sleep(shutdown_timeout).await;
        };

        let served = tokio::select! {
            served = &mut server => served,
            () = http_deadline => {
                warn!(
                    timeout_ms = u64::try_from(shutdown_timeout.as_millis()).unwrap_or(u64::MAX),
                    "hashvault stopping: open connections did not close in time"
                );
                Ok(())
            }
        };
        drop(server);
        match &served {
            Ok(()) => info!("hashvault stopping: http server exited"),
            Err(e) => {
                warn!(error = %e, "hashvault stopping: http server failed");
                service.begin_shutdown();
            }
        }

        drain_jobs(&service).await;
        served.map_err(Into::into)
    }
}

fn build_router(config: &NetworkConfig, service: &Arc<HashService>) -> Router {
    let state = AppState {
        service: Arc::clone(service),
        config: Arc::new(config.clone()),
        start_time: Instant::now(),
    };

    let layers = build_http_layers(config);

    Router::new()
        .route("/hash", post(create_hash_handler))
        .route("/hash/{id}", get(read_hash_handler))
        .route("/stats", get(stats_handler))
        .route("/shutdown", get(shutdown_handler).post(shutdown_handler))
        .route("/health", get(health_handler))
        .route("/health/live", get(liveness_handler))
        .route("/health/ready", get(readiness_handler))
        .layer(DefaultBodyLimit::max(service.config().max_payload_bytes))
        .layer(layers)
        .with_state(state)
}

/// Waits for accepted jobs to finish and moves the service to `Stopped`.
///
/// Unbounded unless the service config sets a drain timeout.
async fn drain_jobs(service: &HashService) {
    info!(
        in_flight = service.in_flight_count(),
        "hashvault stopping: waiting for in-flight jobs"
    );

    match service.config().drain_timeout {
        None => {
            service.drain().await;
            info!("hashvault stopped cleanly");
        }
        Some(timeout) => {
            if service.drain_with_timeout(timeout).await {
                info!("hashvault stopped cleanly");
            } else {
                warn!(
                    remaining = service.in_flight_count(),
                    "drain timeout expired with jobs still running"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::network::LifecycleState;
    use crate::service::ServiceConfig;

    fn local_config() -> NetworkConfig {
        NetworkConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            ..NetworkConfig::default()
        }
    }

    fn service(delay: Duration) -> Arc<HashService> {
        Arc::new(HashService::new(ServiceConfig {
            processing_delay: delay,
            ..ServiceConfig::default()
        }))
    }

    #[test]
    fn new_creates_module_without_binding() {
        let module = NetworkModule::new(local_config(), service(Duration::ZERO));
        assert!(module.listener.is_none());
        assert_eq!(module.service().state(), LifecycleState::Starting);
    }

    #[test]
    fn service_returns_shared_arc() {
        let module = NetworkModule::new(local_config(), service(Duration::ZERO));
        assert!(Arc::ptr_eq(&module.service(), &module.service()));
    }

    #[test]
    fn build_router_creates_router() {
        let module = NetworkModule::new(local_config(), service(Duration::ZERO));
        let _router = module.build_router();
    }

    #[tokio::test]
    async fn start_binds_to_os_assigned_port() {
        let mut module = NetworkModule::new(local_config(), service(Duration::ZERO));
        let port = module.start().await.expect("start should succeed");
        assert!(port > 0, "OS-assigned port should be > 0");
        assert!(module.listener.is_some());
    }

    #[tokio::test]
    async fn serve_without_start_is_an_error() {
        let module = NetworkModule::new(local_config(), service(Duration::ZERO));
        let err = module
            .serve(std::future::pending::<()>())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("start() must be called"));
    }

    #[tokio::test]
    async fn external_signal_drains_jobs_before_returning() {
        let service = service(Duration::from_millis(200));
        let mut module = NetworkModule::new(local_config(), Arc::clone(&service));
        module.start().await.unwrap();

        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        let server = tokio::spawn(module.serve(async move {
            let _ = rx.await;
        }));

        // serve() opens the accept path before awaiting the listener.
        while service.state() != LifecycleState::Running {
            tokio::task::yield_now().await;
        }
        let handles: Vec<_> = (0..4)
            .map(|i| service.submit_work(format!("password={i}").as_bytes()).unwrap())
            .collect();

        tx.send(()).unwrap();
        server.await.unwrap().unwrap();

        assert_eq!(service.state(), LifecycleState::Stopped);
        assert_eq!(service.in_flight_count(), 0);
        for handle in handles {
            assert!(service.fetch_result(handle).is_ok());
        }
    }

    #[tokio::test]
    async fn begin_shutdown_stops_server() {
        let service = service(Duration::from_millis(50));
        let mut module = NetworkModule::new(local_config(), Arc::clone(&service));
        module.start().await.unwrap();

        let server = tokio::spawn(module.serve(std::future::pending::<()>()));
        while service.state() != LifecycleState::Running {
            tokio::task::yield_now().await;
        }
        let handle = service.submit_work(b"password=x").unwrap();

        assert!(service.begin_shutdown());
        server.await.unwrap().unwrap();

        assert_eq!(service.state(), LifecycleState::Stopped);
        assert!(service.fetch_result(handle).is_ok());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn stalled_request_does_not_hold_shutdown_open() {
        use std::io::Write;

        let service = service(Duration::ZERO);
        let mut module = NetworkModule::new(
            NetworkConfig {
                request_timeout: Duration::from_secs(60),
                shutdown_timeout: Duration::from_millis(100),
                ..local_config()
            },
            Arc::clone(&service),
        );
        let port = module.start().await.unwrap();

        let server = tokio::spawn(module.serve(std::future::pending::<()>()));
        while service.state() != LifecycleState::Running {
            tokio::task::yield_now().await;
        }

        // Promises a body it never sends, so the request stays open.
        let mut client = std::net::TcpStream::connect(("127.0.0.1", port)).unwrap();
        client
            .write_all(b"POST /hash HTTP/1.1\r\nHost: localhost\r\nContent-Length: 100\r\n\r\npassword=")
            .unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        service.begin_shutdown();
        tokio::time::timeout(Duration::from_secs(5), server)
            .await
            .expect("serve should give up on the stalled connection")
            .unwrap()
            .unwrap();

        assert_eq!(service.state(), LifecycleState::Stopped);
        drop(client);
    }

    #[tokio::test]
    async fn bounded_drain_gives_up_on_slow_jobs() {
        let service = Arc::new(HashService::new(ServiceConfig {
            processing_delay: Duration::from_secs(30),
            drain_timeout: Some(Duration::from_millis(50)),
            ..ServiceConfig::default()
        }));
        let mut module = NetworkModule::new(local_config(), Arc::clone(&service));
        module.start().await.unwrap();

        let server = tokio::spawn(module.serve(std::future::pending::<()>()));
        while service.state() != LifecycleState::Running {
            tokio::task::yield_now().await;
        }
        service.submit_work(b"password=slow").unwrap();

        service.begin_shutdown();
        server.await.unwrap().unwrap();

        assert_eq!(service.state(), LifecycleState::Draining);
        assert_eq!(service.in_flight_count(), 1);
    }
}
