use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::crawler::{run_extraction, ExtractionRequest};
use crate::output::ErrorBody;
use crate::server::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    agent: String,
}

/// Health check endpoint
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        agent: state.fetcher.agent_name().to_string(),
    })
}

/// Extraction endpoint
///
/// - Malformed JSON, missing fields, bad URL or selector: 400 `{ error }`
/// - Pipeline ran (success or failure): 200 with the extraction result
pub async fn scrape_handler(
    State(state): State<AppState>,
    payload: Result<Json<ExtractionRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::warn!("Rejected scrape request: {}", rejection.body_text());
            return bad_request(rejection.body_text());
        }
    };

    let validated = match request.validate() {
        Ok(validated) => validated,
        Err(e) => {
            tracing::warn!("Rejected scrape request: {}", e);
            return bad_request(e.to_string());
        }
    };

    let result = run_extraction(&state.fetcher, validated).await;
    (StatusCode::OK, Json(result)).into_response()
}

fn bad_request(message: String) -> Response {
    (StatusCode::BAD_REQUEST, Json(ErrorBody::new(message))).into_response()
}
