use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::{error, info_span, warn, Instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{AskRequest, ErrorBody};
use crate::service::relay_service::RelayService;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST `/ask` — relays one message and returns `{ text, citations, timestamp }`
pub async fn ask_handler(
    State(svc): State<RelayService>,
    payload: Result<Json<AskRequest>, JsonRejection>,
) -> Response {
    let request_id = Uuid::new_v4();
    let span = info_span!("ask", %request_id);

    async move {
        let result = match payload {
            Ok(Json(request)) => svc.ask(request).await,
            Err(rejection) => Err(AppError::MalformedRequest { message: rejection.body_text() }),
        };

        let mut response = match result {
            Ok(body) => Json(body).into_response(),
            Err(err) => error_response(&err),
        };
        if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
            response.headers_mut().insert(REQUEST_ID_HEADER, value);
        }
        response
    }
    .instrument(span)
    .await
}

/// Fallback for every unknown route.
pub async fn not_found_handler() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody { error: "Endpoint not found".to_string() }),
    )
        .into_response()
}

// ── Helper ────────────────────────────────────────────────────────────────────

pub fn status_for(err: &AppError) -> StatusCode {
    if err.is_validation() {
        StatusCode::BAD_REQUEST
    } else if err.is_upstream_unavailable() {
        StatusCode::SERVICE_UNAVAILABLE
    } else if err.is_upstream() {
        StatusCode::BAD_GATEWAY
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

fn error_response(err: &AppError) -> Response {
    let status = status_for(err);
    if status.is_client_error() {
        warn!("Rejected request: {err}");
    } else {
        error!("Relay failed: {err}");
    }
    (status, Json(ErrorBody { error: err.to_string() })).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_error_kinds_to_statuses() {
        assert_eq!(status_for(&AppError::empty_field("message")), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_for(&AppError::MalformedRequest { message: "not json".into() }),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&AppError::UpstreamUnavailable { host: "h".into(), message: "m".into() }),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_for(&AppError::UpstreamStatus { status: 429, message: "quota".into() }),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(status_for(&AppError::malformed_upstream("x")), StatusCode::BAD_GATEWAY);
        assert_eq!(
            status_for(&AppError::Unexpected("x".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
