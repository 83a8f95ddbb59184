//! Small HTTP façade over the resolvers, for plugins that prefer a
//! local sidecar endpoint over linking the library.

mod handlers;
mod state;

use axum::routing::get;
use axum::Router;
use state::AppState;
use std::sync::{Arc, Mutex};
use tower_http::cors::CorsLayer;

use crate::location::{GeoResolver, PostalResolver};

pub fn build_router() -> Router {
    let state = Arc::new(AppState {
        resolver: Mutex::new(GeoResolver::new()),
        postal: PostalResolver::new(),
    });

    Router::new()
        .route("/api/geo", get(handlers::geo))
        .route("/api/postal", get(handlers::postal))
        .route("/api/env", get(handlers::env))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start(host: &str, port: u16) {
    let app = build_router();
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| {
            eprintln!("Error: Cannot bind to {}: {}", addr, e);
            std::process::exit(1);
        });

    tracing::info!("geolocus server listening on http://{}", addr);
    eprintln!("  Press Ctrl+C to stop.");

    axum::serve(listener, app).await.unwrap_or_else(|e| {
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    });
}
