//! Thin JSON surface over the searcher. One query parameter in, rendered
//! results, "not found", or a 500 out.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use tango_core::{SearchOutcome, Searcher, Word};

pub struct AppState {
    pub searcher: Searcher,
}

#[derive(Deserialize)]
pub struct SearchParams {
    query: String,
}

#[derive(Serialize)]
struct SearchResponse {
    query: String,
    results: Vec<Word>,
}

#[derive(Serialize)]
struct MessageResponse {
    message: String,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/search", get(search))
        .with_state(state)
}

pub async fn serve(addr: &str, state: Arc<AppState>) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn healthz() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Response {
    let started = Instant::now();

    let (status, response) = match state.searcher.search(&params.query) {
        Ok(SearchOutcome::Found(results)) => {
            let body = SearchResponse {
                query: params.query.clone(),
                results,
            };
            (StatusCode::OK, Json(body).into_response())
        }
        Ok(SearchOutcome::Empty) => {
            let body = MessageResponse {
                message: format!("no results for {:?}", params.query),
            };
            (StatusCode::NOT_FOUND, Json(body).into_response())
        }
        Err(err) => {
            tracing::error!(error = %err, query = %params.query, "search failed");
            let body = MessageResponse {
                message: "search failed".to_string(),
            };
            (StatusCode::INTERNAL_SERVER_ERROR, Json(body).into_response())
        }
    };

    tracing::info!(
        query = %params.query,
        status = %status,
        elapsed = ?started.elapsed(),
        "search request"
    );

    let mut response = response;
    *response.status_mut() = status;
    response
}
