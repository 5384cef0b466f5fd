use crate::gate::{
    credential::{credential_is_valid, SessionCredential},
    error::{ErrorResponse, GateError},
    state::GateState,
};
use axum::{
    extract::Extension,
    http::{
        header::{CACHE_CONTROL, CONTENT_TYPE, X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS},
        HeaderMap, StatusCode,
    },
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::{debug, error, instrument};

#[utoipa::path(
    get,
    path = "/api/game",
    responses (
        (status = 200, description = "Protected game payload", content_type = "text/html; charset=utf-8"),
        (status = 401, description = "Missing or invalid `game_access` cookie", body = ErrorResponse),
        (status = 404, description = "Game file not found", body = ErrorResponse),
        (status = 500, description = "Unexpected fault reading the game file", body = ErrorResponse),
    ),
    tag = "game",
)]
// axum handler for the protected payload
#[instrument(skip(state, headers))]
pub async fn game(
    Extension(state): Extension<Arc<GateState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, GateError> {
    // Missing, expired and tampered credentials all collapse to one answer.
    let presented = state.carrier().read(&headers);
    if !credential_is_valid(presented.as_deref(), &SessionCredential::GRANTED) {
        debug!("Missing or invalid session credential");
        return Err(GateError::Unauthorized);
    }

    let payload = state.payload().load().await.map_err(|err| {
        error!("Error reading game file: {err}");
        GateError::from(err)
    })?;

    Ok((
        StatusCode::OK,
        [
            (CONTENT_TYPE, "text/html; charset=utf-8"),
            (X_CONTENT_TYPE_OPTIONS, "nosniff"),
            (X_FRAME_OPTIONS, "DENY"),
            (CACHE_CONTROL, "private, max-age=3600"),
        ],
        payload,
    ))
}
