//! Family Gift Wishlist Backend
//!
//! REST backend with SQLite persistence, a PIN-gated parents area and
//! reverse-image price comparison.

mod api;
mod auth;
mod config;
mod db;
mod errors;
mod lookup;
mod models;
mod pricing;
mod reorder;
mod store;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::Config;
use db::Repository;
use lookup::{PriceLookup, SerpApiClient};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub lookup: Arc<dyn PriceLookup>,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env();

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Gift Wishlist Backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Bind address: {}", config.bind_addr);

    if config.parent_pin.is_none() {
        tracing::warn!("No parent PIN configured (WISHLIST_PARENT_PIN). The parents area is open!");
    }

    // Initialize database
    let pool = db::init_database(&config.db_path).await?;
    let repo = Arc::new(Repository::new(pool));

    // Price lookups
    let serpapi = SerpApiClient::new(
        config.lookup_endpoint.clone(),
        config.serpapi_key.clone(),
        config.lookup_timeout,
    )?;
    if !serpapi.is_configured() {
        tracing::warn!("No SerpAPI key configured (WISHLIST_SERPAPI_KEY). Price lookups will fail.");
    }

    let state = AppState {
        repo,
        lookup: Arc::new(serpapi),
        config: Arc::new(config.clone()),
    };

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let pin = state.config.parent_pin.clone();

    // Parents area, behind the PIN
    let parent_routes = Router::new()
        .route("/session", get(api::parent_session))
        .route("/children", post(api::create_child))
        .route("/children/{id}", delete(api::delete_child))
        .route("/gifts", get(api::list_all_gifts))
        .route("/gifts/{id}", put(api::update_gift))
        .route("/gifts/{id}", delete(api::delete_gift))
        .route("/gifts/{id}/apply-offer", post(api::apply_offer))
        .route("/gifts/{id}/price-lookup", post(api::price_lookup))
        .route("/search-product", post(api::search_product))
        .layer(middleware::from_fn(move |req, next| {
            auth::parent_pin_layer(pin.clone(), req, next)
        }));

    // Children's pages
    let api_routes = Router::new()
        .route("/revision", get(api::get_revision))
        .route("/children", get(api::list_children))
        .route("/children/{id}/gifts", get(api::list_child_gifts))
        .route("/children/{id}/gifts", post(api::create_gift))
        .route("/children/{id}/gifts/reorder", post(api::reorder_gifts))
        .nest("/parents", parent_routes);

    // Health check (no PIN required)
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests;
