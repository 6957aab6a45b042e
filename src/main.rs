//! Ranker HTTP server entrypoint.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tokio::signal;

use ranker::analysis::{Analyzer, LanguagePolicy};
use ranker::config::Config;
use ranker::embedding::RerankerConfig;
use ranker::gateway::{AppState, create_router};
use ranker::pertinence::PertinenceDecider;
use ranker::ranking::RankingOrchestrator;
use ranker::scoring::CrossEncoderScorer;
use ranker::taxonomy::{ReliefWebSource, SystemClock, TaxonomyCache, TaxonomyStore};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if std::env::args().any(|arg| arg == "--health-check") {
        std::process::exit(run_health_check());
    }

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    config.validate()?;
    let addr: SocketAddr = config.socket_addr().parse()?;

    tracing::info!(
        bind_addr = %config.bind_addr,
        port = config.port,
        taxonomy_url = %config.taxonomy_url,
        k = config.sensitivity_k,
        floor = ?config.score_floor,
        "Ranker starting"
    );

    let source = Arc::new(ReliefWebSource::new(
        config.taxonomy_url.clone(),
        config.app_name.clone(),
    )?);
    let cache = TaxonomyCache::with_store(
        source,
        config.cache_ttl,
        Arc::new(SystemClock),
        TaxonomyStore::new(config.storage_path.clone()),
    );
    let languages = LanguagePolicy::new(config.languages.clone(), config.default_language.clone());
    let hydrated = cache.hydrate(languages.supported()).await;
    tracing::info!(keys = hydrated, "Taxonomy cache hydrated from disk");

    let reranker_config = match &config.reranker_path {
        Some(path) => RerankerConfig::new(path.clone()),
        None => {
            tracing::warn!("No RANKER_RERANKER_PATH configured, running scorer in stub mode");
            RerankerConfig::stub()
        }
    };
    let scorer = Arc::new(CrossEncoderScorer::new(reranker_config)?);

    let analyzer = Arc::new(Analyzer::new(
        cache,
        RankingOrchestrator::new(scorer),
        PertinenceDecider::new(config.pertinence()),
        languages,
        config.request_timeout,
    ));

    let state = AppState::new(Arc::clone(&analyzer));
    if config.warm_on_start {
        let warm_state = state.clone();
        tokio::spawn(async move {
            tracing::info!("Warming taxonomy cache and scorer...");
            let keys = warm_state.analyzer.warm_up().await;
            tracing::info!(keys, "Warm-up finished");
            warm_state.mark_ready();
        });
    } else {
        state.mark_ready();
    }

    let app = create_router(state);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Ranker shutdown complete");
    Ok(())
}

fn run_health_check() -> i32 {
    let port = std::env::var("RANKER_PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(8000);

    let url = format!("http://127.0.0.1:{}/healthz", port);

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed to build runtime");

    rt.block_on(async {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(1))
            .build()
            .expect("failed to build client");

        match client.get(&url).send().await {
            Ok(res) if res.status().is_success() => 0,
            _ => 1,
        }
    })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
