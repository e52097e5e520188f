//! HTTP exposure of the latest snapshot.
//!
//! The server holds at most one current snapshot, replaced wholesale after
//! each successful build so a request never observes a partially assembled
//! value. Under the on-demand policy every request triggers a fresh build;
//! under the interval policy a background loop rebuilds on a fixed period
//! and requests read the slot without waiting on probes.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use parking_lot::RwLock;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{error, info};

use stackwatch_types::Snapshot;

use crate::collector::Collector;
use crate::config::RefreshPolicy;
use crate::render;

type SnapshotSlot = Arc<RwLock<Option<Snapshot>>>;

/// Serves the latest snapshot as JSON and HTML.
pub struct SnapshotServer {
    collector: Arc<Collector>,
    policy: RefreshPolicy,
    latest: SnapshotSlot,
}

impl SnapshotServer {
    /// Create a server for `collector` under the given refresh policy.
    pub fn new(collector: Arc<Collector>, policy: RefreshPolicy) -> Self {
        Self {
            collector,
            policy,
            latest: Arc::new(RwLock::new(None)),
        }
    }

    /// The most recently completed snapshot, if any build has finished yet.
    pub fn latest(&self) -> Option<Snapshot> {
        self.latest.read().clone()
    }

    /// Build a fresh snapshot and publish it as the latest.
    pub async fn refresh(&self) -> Snapshot {
        let snapshot = self.collector.collect().await;
        *self.latest.write() = Some(snapshot.clone());
        snapshot
    }

    /// Start the background rebuild loop for the interval policy.
    ///
    /// The first rebuild happens immediately, so requests are usually
    /// answerable right after startup. Returns a handle that stops the loop;
    /// an in-flight build is abandoned, not awaited.
    pub fn start_refresh_loop(&self, period: Duration) -> RefreshHandle {
        let (stop_tx, mut stop_rx) = watch::channel(false);
        let collector = self.collector.clone();
        let latest = self.latest.clone();

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        let snapshot = collector.collect().await;
                        *latest.write() = Some(snapshot);
                    }
                    _ = stop_rx.changed() => {
                        if *stop_rx.borrow() {
                            break;
                        }
                    }
                }
            }
        });

        RefreshHandle { stop_tx }
    }

    /// Run the HTTP accept loop until it fails or the process shuts down.
    pub async fn serve(
        &self,
        listen_addr: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        run_server(
            listen_addr.to_string(),
            self.policy,
            self.collector.clone(),
            self.latest.clone(),
        )
        .await
    }

    /// Spawn the HTTP server as a background task.
    pub fn start_server(&self, listen_addr: &str) -> tokio::task::JoinHandle<()> {
        let listen_addr = listen_addr.to_string();
        let policy = self.policy;
        let collector = self.collector.clone();
        let latest = self.latest.clone();

        tokio::spawn(async move {
            if let Err(e) = run_server(listen_addr, policy, collector, latest).await {
                error!(%e, "snapshot server error");
            }
        })
    }
}

/// Handle for stopping the background refresh loop.
///
/// Call `stop()` explicitly; dropping the handle also ends the loop.
pub struct RefreshHandle {
    stop_tx: watch::Sender<bool>,
}

impl RefreshHandle {
    /// Stop the background refresh loop.
    pub fn stop(self) {
        let _ = self.stop_tx.send(true);
    }
}

async fn run_server(
    listen_addr: String,
    policy: RefreshPolicy,
    collector: Arc<Collector>,
    latest: SnapshotSlot,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let addr: SocketAddr = listen_addr.parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, policy = policy.as_str(), "snapshot server listening");

    loop {
        let (stream, _) = listener.accept().await?;
        let io = TokioIo::new(stream);

        let collector = collector.clone();
        let latest = latest.clone();

        tokio::spawn(async move {
            let service = service_fn(move |req: Request<hyper::body::Incoming>| {
                let collector = collector.clone();
                let latest = latest.clone();
                let path = req.uri().path().to_string();

                async move { Ok::<_, Infallible>(route(&path, policy, &collector, &latest).await) }
            });

            if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                error!(%e, "connection error");
            }
        });
    }
}

/// Dispatch one request path to a response.
///
/// Rendering never errors on a missing snapshot: the API answers 503 with a
/// small JSON body and the display page renders a pending state instead.
async fn route(
    path: &str,
    policy: RefreshPolicy,
    collector: &Arc<Collector>,
    latest: &SnapshotSlot,
) -> Response<Full<Bytes>> {
    match path {
        "/api/snapshot" => match current_snapshot(policy, collector, latest).await {
            Some(snapshot) => json_response(StatusCode::OK, render::render_json(&snapshot)),
            None => json_response(
                StatusCode::SERVICE_UNAVAILABLE,
                r#"{"error":"not ready"}"#.to_string(),
            ),
        },
        // Liveness only: independent of whether a snapshot exists yet.
        "/health" => json_response(
            StatusCode::OK,
            format!(r#"{{"status":"ok","timestamp":"{}"}}"#, Utc::now().to_rfc3339()),
        ),
        "/" => {
            let snapshot = current_snapshot(policy, collector, latest).await;
            html_response(StatusCode::OK, render::render_html(snapshot.as_ref()))
        }
        _ => text_response(StatusCode::NOT_FOUND, "Not Found"),
    }
}

async fn current_snapshot(
    policy: RefreshPolicy,
    collector: &Arc<Collector>,
    latest: &SnapshotSlot,
) -> Option<Snapshot> {
    match policy {
        RefreshPolicy::OnDemand => {
            let snapshot = collector.collect().await;
            *latest.write() = Some(snapshot.clone());
            Some(snapshot)
        }
        RefreshPolicy::Interval => latest.read().clone(),
    }
}

fn json_response(status: StatusCode, body: String) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(body)))
        .unwrap()
}

fn html_response(status: StatusCode, body: String) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .header("Content-Type", "text/html; charset=utf-8")
        .body(Full::new(Bytes::from(body)))
        .unwrap()
}

fn text_response(status: StatusCode, body: &'static str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .header("Content-Type", "text/plain")
        .body(Full::new(Bytes::from(body)))
        .unwrap()
}
