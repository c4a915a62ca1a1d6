//! Loopback HTTP servers and launcher doubles shared by scenario tests.

use crate::launcher::ServiceLauncher;
use axum::extract::{Request, State};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::Router;
use seedbed_core::{AppError, AppResult};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Axum server on an ephemeral loopback port, counting every request.
pub struct TestServer {
    addr: SocketAddr,
    hits: Arc<AtomicUsize>,
}

async fn count_hits(State(hits): State<Arc<AtomicUsize>>, req: Request, next: Next) -> Response {
    hits.fetch_add(1, Ordering::SeqCst);
    next.run(req).await
}

impl TestServer {
    pub async fn spawn(router: Router) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));

        let app = router.layer(middleware::from_fn_with_state(hits.clone(), count_hits));
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self { addr, hits }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Requests received so far, redirects included.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

/// Writes the same raw bytes in answer to every request, for responses a
/// well-behaved server would never produce.
pub struct RawServer {
    addr: SocketAddr,
}

impl RawServer {
    pub async fn spawn(raw: Vec<u8>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let raw = Arc::new(raw);

        tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                let raw = raw.clone();
                tokio::spawn(async move {
                    let mut request = Vec::new();
                    let mut chunk = [0u8; 1024];
                    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                        match stream.read(&mut chunk).await {
                            Ok(0) | Err(_) => return,
                            Ok(n) => request.extend_from_slice(&chunk[..n]),
                        }
                    }
                    let _ = stream.write_all(&raw).await;
                    let _ = stream.shutdown().await;
                });
            }
        });

        Self { addr }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Launcher that fails unless the seed file is already on disk when
/// `start` is called.
pub struct SeedCheckingLauncher {
    pub seed_path: PathBuf,
    pub calls: AtomicUsize,
}

impl SeedCheckingLauncher {
    pub fn new(seed_path: PathBuf) -> Self {
        Self {
            seed_path,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait::async_trait]
impl ServiceLauncher for SeedCheckingLauncher {
    fn launcher_name(&self) -> &str {
        "seed-checking"
    }

    async fn start(&self) -> AppResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.seed_path.is_file() {
            Ok(())
        } else {
            Err(AppError::ServiceStart(format!(
                "started before seed existed at {:?}",
                self.seed_path
            )))
        }
    }
}
