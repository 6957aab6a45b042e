//! Test server harness.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use ranker::analysis::{Analyzer, LanguagePolicy};
use ranker::gateway::{AppState, create_router};
use ranker::pertinence::{PertinenceConfig, PertinenceDecider};
use ranker::ranking::RankingOrchestrator;
use ranker::scoring::RelevanceScorer;
use ranker::taxonomy::{ReliefWebSource, SystemClock, TaxonomyCache, TaxonomyStore};
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

const STARTUP_WAIT_TIMEOUT_SECS: u64 = 5;
const STARTUP_POLL_INTERVAL_MS: u64 = 50;

pub struct TestServerConfig {
    pub taxonomy_url: String,
    pub scorer: Arc<dyn RelevanceScorer>,
    pub pertinence: PertinenceConfig,
    pub request_timeout: Duration,
    pub warm_on_start: bool,
    /// Reuse an existing storage directory instead of a fresh temp dir.
    pub storage: Option<Arc<TempDir>>,
}

impl TestServerConfig {
    pub fn new(taxonomy_url: String, scorer: Arc<dyn RelevanceScorer>) -> Self {
        Self {
            taxonomy_url,
            scorer,
            pertinence: PertinenceConfig::default(),
            request_timeout: Duration::from_secs(5),
            warm_on_start: false,
            storage: None,
        }
    }
}

pub struct TestServer {
    pub addr: SocketAddr,
    pub storage: Arc<TempDir>,
    _server_handle: JoinHandle<()>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl TestServer {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// Builds the same stack as the binary (ReliefWeb source, on-disk store, hydrate) around
/// the given scorer and serves it on an ephemeral port.
pub async fn spawn_test_server(config: TestServerConfig) -> anyhow::Result<TestServer> {
    let storage = match config.storage {
        Some(storage) => storage,
        None => Arc::new(TempDir::new()?),
    };
    let languages = vec!["en".to_string(), "fr".to_string()];

    let cache = TaxonomyCache::with_store(
        Arc::new(ReliefWebSource::new(config.taxonomy_url, "ranker-tests")?),
        Duration::from_secs(3600),
        Arc::new(SystemClock),
        TaxonomyStore::new(storage.path()),
    );
    cache.hydrate(&languages).await;

    let analyzer = Arc::new(Analyzer::new(
        cache,
        RankingOrchestrator::new(config.scorer),
        PertinenceDecider::new(config.pertinence),
        LanguagePolicy::new(languages, Some("en".to_string())),
        config.request_timeout,
    ));

    let state = AppState::new(analyzer);
    if config.warm_on_start {
        state.analyzer.warm_up().await;
    }
    state.mark_ready();

    let app = create_router(state);
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let server_handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
            .unwrap();
    });

    wait_for_server(addr).await?;

    Ok(TestServer {
        addr,
        storage,
        _server_handle: server_handle,
        shutdown_tx: Some(shutdown_tx),
    })
}

async fn wait_for_server(addr: SocketAddr) -> anyhow::Result<()> {
    let client = reqwest::Client::new();
    let url = format!("http://{}/healthz", addr);
    let deadline = tokio::time::Instant::now() + Duration::from_secs(STARTUP_WAIT_TIMEOUT_SECS);

    while tokio::time::Instant::now() < deadline {
        if let Ok(res) = client.get(&url).send().await
            && res.status().is_success()
        {
            return Ok(());
        }
        tokio::time::sleep(Duration::from_millis(STARTUP_POLL_INTERVAL_MS)).await;
    }

    anyhow::bail!("server at {} did not become healthy", addr)
}
