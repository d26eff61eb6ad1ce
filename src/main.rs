use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    http::{HeaderName, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use serde_json::json;
use tokio::sync::{Mutex, RwLock};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

mod auth;
mod clock;
mod config;
mod db;
mod error;
mod evaluator;
mod gateway;
mod handlers;
mod judge;
mod matchmaking;
mod middleware;
mod models;
mod pubsub;
mod random;
mod rate_limit;
mod rating;
mod response;
mod room_engine;
mod store;
mod validation;

use clock::{Clock, SystemClock};
use config::Config;
use evaluator::{Evaluator, JudgeBackedEvaluator};
use gateway::SessionHandle;
use judge::memory::InMemoryJudgeQueue;
use judge::JudgeQueue;
use matchmaking::MatchmakingQueue;
use pubsub::BroadcastPubSub;
use room_engine::RoomEngine;
use store::postgres::PostgresStore;
use store::Store;

/// Shared application state, handed to every handler and to the session
/// gateway through Axum's `State` extractor. Cheap to clone: every field is
/// an `Arc` (or `Arc`-backed), so background tasks (matchmaking deadlines,
/// room broadcast relays) can own a full copy instead of borrowing.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub judge: Arc<dyn JudgeQueue>,
    pub room_engine: Arc<RoomEngine>,
    pub matchmaking: Arc<MatchmakingQueue>,
    pub clock: Arc<dyn Clock>,
    pub config: Arc<Config>,
    /// Live WebSocket connections, keyed by user id, so one connection's task
    /// can push a message directly into another's socket (matchmaking pairing
    /// notifications, reconnection pushes) without a shared broadcast channel.
    pub sessions: Arc<RwLock<HashMap<Uuid, SessionHandle>>>,
    /// Serializes the find-match race so two concurrent `findMatch` calls
    /// can't both claim the same opponent.
    pub pairing_lock: Arc<Mutex<()>>,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let config = Config::from_env().expect("failed to load configuration from environment");

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    if config.json_logging {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    tracing::info!("configuration loaded");

    let db_pool = db::create_pool(&config.database_url)
        .await
        .expect("failed to create database pool");
    tracing::info!(
        max_connections = config.db_max_connections,
        min_connections = config.db_min_connections,
        "database pool created"
    );

    db::run_migrations(&db_pool)
        .await
        .expect("failed to run database migrations");

    let allowed_origins_config = config.allowed_origins.clone();

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let store: Arc<dyn Store> = Arc::new(PostgresStore::new(db_pool));
    let judge_queue: Arc<dyn JudgeQueue> = Arc::new(InMemoryJudgeQueue::new(clock.clone()));
    let pubsub = BroadcastPubSub::new();
    let evaluator: Arc<dyn Evaluator> = Arc::new(JudgeBackedEvaluator::new(judge_queue.clone()));
    let room_engine = RoomEngine::new(store.clone(), pubsub, clock.clone(), evaluator);
    let matchmaking = Arc::new(MatchmakingQueue::new());

    let state = AppState {
        store,
        judge: judge_queue,
        room_engine,
        matchmaking,
        clock,
        config: Arc::new(config),
        sessions: Arc::new(RwLock::new(HashMap::new())),
        pairing_lock: Arc::new(Mutex::new(())),
    };

    let allowed_origins: Vec<HeaderValue> = allowed_origins_config
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            HeaderName::from_static("content-type"),
            HeaderName::from_static("authorization"),
            HeaderName::from_static("accept"),
            HeaderName::from_static("origin"),
            HeaderName::from_static("x-requested-with"),
        ])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600));

    tracing::info!("cors configured for origins: {:?}", allowed_origins_config);

    // Code-judge dispatch: strict, matches the teacher's submit-route budget.
    let submit_routes = Router::new()
        .route("/code/run", post(handlers::judge::run_handler))
        .route("/code/submit", post(handlers::judge::submit_handler))
        .route(
            "/submit-solution/:contestId/:problemId",
            post(handlers::contest::submit_solution_handler),
        )
        .layer(rate_limit::RateLimitLayer::submit());

    let general_routes = Router::new()
        .route("/", get(root_handler))
        .route("/code/result/:jobId", get(handlers::judge::result_handler))
        .route(
            "/get-problem/:contestId/:problemId",
            get(handlers::contest::get_contest_problem_handler),
        )
        .route("/get-problem/:problemId", get(handlers::contest::get_problem_handler))
        .route("/get-leaderboard/:contestId", get(handlers::contest::get_leaderboard_handler))
        .route("/get-all-problems", get(handlers::contest::get_all_problems_handler))
        .layer(rate_limit::RateLimitLayer::general());

    let health_routes = Router::new()
        .route("/health", get(health_handler))
        .route("/ready", get(ready_handler));

    // WebSocket route: no request-rate limiting, the connection itself is the unit.
    let ws_routes = Router::new().route("/ws", get(gateway::ws_handler));

    let app = Router::new()
        .merge(health_routes)
        .merge(submit_routes)
        .merge(general_routes)
        .merge(ws_routes)
        .layer(axum::middleware::from_fn(middleware::security_headers))
        .layer(axum::middleware::from_fn(middleware::request_id))
        .layer(axum::middleware::from_fn(middleware::request_timing))
        .layer(cors)
        .with_state(state.clone());

    let addr: SocketAddr = format!("{}:{}", state.config.host, state.config.port)
        .parse()
        .expect("invalid HOST:PORT configuration");

    tracing::info!("server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();

    let shutdown_signal = async {
        let ctrl_c = async {
            tokio::signal::ctrl_c().await.expect("failed to install ctrl+c handler");
        };

        #[cfg(unix)]
        let terminate = async {
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("failed to install sigterm handler")
                .recv()
                .await;
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {},
            _ = terminate => {},
        }

        tracing::info!("shutdown signal received, starting graceful shutdown");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await
        .unwrap();

    tracing::info!("server shut down gracefully");
}

async fn root_handler() -> &'static str {
    "duelcore"
}

async fn health_handler() -> axum::Json<serde_json::Value> {
    axum::Json(json!({ "status": "ok" }))
}

async fn ready_handler(axum::extract::State(state): axum::extract::State<AppState>) -> impl axum::response::IntoResponse {
    match state.store.get_user(Uuid::nil()).await {
        Ok(_) | Err(error::AppError::NotFound(_)) => (axum::http::StatusCode::OK, "ready"),
        _ => (axum::http::StatusCode::SERVICE_UNAVAILABLE, "database unavailable"),
    }
}
