use std::net::SocketAddr;

use anyhow::Context;
use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use tower_http::cors::{Any, CorsLayer};
use weather_core::{LocationParams, WeatherService};

pub fn router(service: WeatherService) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/weather", get(weather))
        .layer(cors)
        .with_state(service)
}

/// Raw pairs rather than a typed extractor: a repeated key is not a rejection, its first
/// value is used.
async fn weather(
    State(service): State<WeatherService>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> impl IntoResponse {
    let params = LocationParams::from_pairs(pairs);
    let reply = service.handle(&params).await;
    let status = StatusCode::from_u16(reply.status);
    let status = status.unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(reply.body))
}

pub async fn run(service: WeatherService, port: u16) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    tracing::info!("Web server running at http://localhost:{}", port);
    axum::serve(listener, router(service))
        .await
        .context("HTTP server failed")?;

    Ok(())
}
