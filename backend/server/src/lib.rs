//! Backend for the Atal idea generator: an electronic component catalog,
//! saved project ideas, one preferences document, and an idea generation
//! passthrough to a chat completion API.
//!
//!
//!
//! # Store
//! - Redis when credentials resolve, see [`credentials`]
//! - In-memory fallback otherwise, seeded with the starter catalog
//! - Component and preference reads never fail, they fall back to the
//!   starter catalog and default preferences
//!
//!
//!
//! # Environment
//!
//! | Variable | Default |
//! |---|---|
//! | `RUST_PORT` | `8001` |
//! | `REDIS_URL` | unset |
//! | `STORE_KEY_FILE` | `store-key.json` |
//! | `STORE_PREFIX` | `atal` |
//! | `OPENAI_API_KEY` | unset, then `/run/secrets/OPENAI_API_KEY` |
//! | `OPENAI_BASE_URL` | `https://api.openai.com/v1` |
//! | `OPENAI_MODEL` | `gpt-3.5-turbo` |
//!
//!
//!
//! # Setup
//!
//! Seed an empty store.
//! ```sh
//! cargo run -p setup
//! ```
//!
//! Run the server with logs.
//! ```sh
//! RUST_LOG=info cargo run -p atal
//! ```
use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    http::{Method, header::CONTENT_TYPE},
    routing::{get, patch, post, put},
};
#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};
use tokio::{net::TcpListener, signal::ctrl_c};
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt};

pub mod config;
pub mod credentials;
pub mod database;
pub mod error;
pub mod generate;
pub mod routes;
pub mod search;
pub mod state;
pub mod utils;

use config::Config;
use routes::*;
use state::AppState;

pub fn app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/api/health", get(health_handler))
        .route(
            "/api/components",
            get(list_components_handler).post(create_component_handler),
        )
        .route(
            "/api/components/{id}",
            get(get_component_handler).delete(delete_component_handler),
        )
        .route(
            "/api/components/category/{category}",
            get(components_by_category_handler),
        )
        .route(
            "/api/ideas",
            get(list_ideas_handler).post(create_idea_handler),
        )
        .route("/api/ideas/search", get(search_handler))
        .route(
            "/api/ideas/{id}",
            put(update_idea_handler).delete(delete_idea_handler),
        )
        .route("/api/ideas/{id}/favorite", patch(favorite_handler))
        .route("/api/generate-ideas", post(generate_handler))
        .route(
            "/api/preferences",
            get(get_preferences_handler).post(save_preferences_handler),
        )
        .route("/api/stats", get(stats_handler))
        .layer(cors)
        .with_state(state)
}

pub async fn start_server() -> anyhow::Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Loading config...");
    let config = Config::load()?;

    info!("Initializing state...");
    let state = AppState::new(config).await;

    info!("Starting server...");

    let address = format!("0.0.0.0:{}", state.config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutting down...");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
