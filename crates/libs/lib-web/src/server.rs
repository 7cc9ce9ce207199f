//! # Server Setup
//!
//! Server initialization, route registration, and HTTP server startup.
//!
//! The composition root: the endpoint pool, the order service client, the
//! metadata cache and the session transaction log are constructed here once
//! and injected into the router state — nothing network-facing lives in a
//! module-level singleton.

// region: --- Imports
use axum::routing::{get, post};
use axum::Router;
use lib_core::Config;
use lib_solana::jupiter::UltraClient;
use lib_solana::metadata::TokenMetadataCache;
use lib_solana::rotation::RpcEndpointPool;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::handlers;
use crate::middleware::stamp_request;
use crate::tx_log::TransactionLog;
// endregion: --- Imports

// region: --- AppState
/// Application state shared across all routes.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub pool: Arc<RpcEndpointPool>,
    pub ultra: Arc<UltraClient>,
    pub metadata: Arc<TokenMetadataCache>,
    pub tx_log: Arc<TransactionLog>,
}

impl axum::extract::FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl axum::extract::FromRef<AppState> for Arc<RpcEndpointPool> {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl axum::extract::FromRef<AppState> for Arc<UltraClient> {
    fn from_ref(state: &AppState) -> Self {
        state.ultra.clone()
    }
}

impl axum::extract::FromRef<AppState> for Arc<TokenMetadataCache> {
    fn from_ref(state: &AppState) -> Self {
        state.metadata.clone()
    }
}

impl axum::extract::FromRef<AppState> for Arc<TransactionLog> {
    fn from_ref(state: &AppState) -> Self {
        state.tx_log.clone()
    }
}
// endregion: --- AppState

// region: --- Server Configuration
/// Server configuration.
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1:3001")
    pub bind_address: String,
    /// Allowed CORS origins
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:3001".to_string(),
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
        }
    }
}
// endregion: --- Server Configuration

// region: --- Server Setup
/// Initialize and start the HTTP server.
///
/// # Errors
///
/// This function will return an error if:
/// - Configuration loading or validation fails
/// - The order service client cannot be constructed
/// - Server binding fails
pub async fn start_server(server_config: ServerConfig) -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set global tracing subscriber");

    info!("SWEEP BACKEND STARTING");

    dotenvy::dotenv().ok();

    info!("Loading configuration...");
    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;
    config.validate().map_err(|e| anyhow::anyhow!(e))?;

    if config.rpc_urls.is_empty() {
        warn!("SOLANA_RPC_URLS is empty; every chain-backed endpoint will fail fast");
    } else {
        info!("Endpoint pool: {} node(s)", config.rpc_urls.len());
    }

    let state = build_state(config)?;
    let app = create_router(state, server_config.allowed_origins.clone());

    let listener = tokio::net::TcpListener::bind(&server_config.bind_address).await?;

    info!("SERVER READY: http://{}", server_config.bind_address);
    log_server_info();

    axum::serve(listener, app).await?;
    Ok(())
}

/// Construct the shared application state from validated configuration.
pub fn build_state(config: Config) -> anyhow::Result<AppState> {
    let pool = Arc::new(RpcEndpointPool::new(config.rpc_urls.clone()));
    let ultra = Arc::new(UltraClient::new(config.ultra_api_base.clone())?);
    let metadata = Arc::new(TokenMetadataCache::new(config.token_api_base.clone())?);
    let tx_log = Arc::new(TransactionLog::new());

    Ok(AppState { config, pool, ultra, metadata, tx_log })
}

/// Create the main application router with all routes.
fn create_router(state: AppState, allowed_origins: Vec<String>) -> Router {
    use axum::http::{HeaderValue, Method};

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    Router::new()
        .route("/api/balances", post(handlers::balances::get_balances))
        .route("/api/order", post(handlers::order::create_order))
        .route("/api/execute", post(handlers::execute::execute_order))
        .route("/api/broadcast", post(handlers::broadcast::broadcast))
        .route("/api/close-account", post(handlers::close_account::build_close_account))
        .route("/api/transactions", get(handlers::transactions::list))
        .route("/api/transactions/clear", post(handlers::transactions::clear))
        .route("/health", get(|| async { "OK" }))
        .with_state(state)
        .layer(axum::middleware::from_fn(stamp_request))
        .layer(cors)
}

/// Log server information.
fn log_server_info() {
    info!("SWEEP SURFACE:");
    info!("   • POST /api/balances");
    info!("   • POST /api/order");
    info!("   • POST /api/execute");
    info!("   • POST /api/broadcast");
    info!("   • POST /api/close-account");
    info!("   • GET  /api/transactions");
    info!("   • POST /api/transactions/clear");
    info!(" HEALTH:");
    info!("   • GET  /health");
}
// endregion: --- Server Setup

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use lib_core::config::{DEFAULT_TARGET_MINT, DEFAULT_TOKEN_API_BASE};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    /// State with no endpoints and unreachable external services: enough for
    /// exercising validation and the error contract.
    fn test_state() -> AppState {
        let config = Config {
            rpc_urls: vec![],
            target_mint: DEFAULT_TARGET_MINT.to_string(),
            ultra_api_base: "http://127.0.0.1:9".to_string(),
            token_api_base: DEFAULT_TOKEN_API_BASE.to_string(),
        };
        build_state(config).unwrap()
    }

    fn test_router() -> Router {
        create_router(test_state(), vec![])
    }

    async fn post_json(router: Router, path: &str, body: Value) -> (StatusCode, Value) {
        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(path)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn test_health() {
        let response = test_router()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_balances_rejects_invalid_owner() {
        let (status, body) =
            post_json(test_router(), "/api/balances", json!({"user": "not-a-pubkey"})).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("Invalid owner address"));
        assert_eq!(body["code"], "InvalidInput");
    }

    #[tokio::test]
    async fn test_balances_with_empty_pool_is_internal_error() {
        let owner = solana_sdk::pubkey::Pubkey::new_unique().to_string();
        let (status, body) = post_json(test_router(), "/api/balances", json!({"user": owner})).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        // Config details never leak to the client
        assert_eq!(body["error"], "An internal error occurred");
        assert_eq!(body["code"], "Config");
    }

    #[tokio::test]
    async fn test_close_account_rejects_invalid_addresses() {
        let (status, body) = post_json(
            test_router(),
            "/api/close-account",
            json!({"user": "bogus", "tokenAccount": "alsobogus"}),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "InvalidInput");
    }

    #[tokio::test]
    async fn test_broadcast_rejects_garbage_blob() {
        let (status, body) = post_json(
            test_router(),
            "/api/broadcast",
            json!({"signedTransaction": "@@not-base64@@"}),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["code"], "Decoding");
    }

    #[tokio::test]
    async fn test_transaction_log_roundtrip() {
        let state = test_state();
        state
            .tx_log
            .append(crate::tx_log::TransactionLogEntry::new(
                "Sig1".to_string(),
                vec!["BONK".to_string()],
            ))
            .await;
        let router = create_router(state, vec![]);

        let response = router
            .clone()
            .oneshot(Request::builder().uri("/api/transactions").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let entries: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(entries[0]["signature"], "Sig1");
        assert_eq!(entries[0]["tokens"][0], "BONK");

        let (status, body) = post_json(router, "/api/transactions/clear", json!({})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["cleared"], 1);
    }

    #[tokio::test]
    async fn test_responses_carry_request_id_header() {
        let response = test_router()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert!(response.headers().contains_key("x-request-id"));
    }
}
