#![forbid(unsafe_code)]
#![warn(clippy::all, rust_2018_idioms)]

mod clients;
mod config;
mod dto;
mod error;
mod handlers;
mod state;

use axum::Router;
use axum::routing::{delete, get, post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let bind_addr = config.bind_addr;
    let state = AppState::new(config);

    let app = Router::new()
        .route("/session", post(handlers::create_session))
        .route("/session/:token", get(handlers::get_session))
        .route("/session/:token", delete(handlers::delete_session))
        .route("/plotorder", post(handlers::create_plot_order))
        .route("/plotorder/:id", get(handlers::get_plot_order))
        .route("/plotorder/:id", delete(handlers::delete_plot_order))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    tracing::info!(%bind_addr, "starting plottrader");
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
