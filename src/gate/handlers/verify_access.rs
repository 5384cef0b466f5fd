use crate::gate::{
    credential::{access_code_matches, SessionCredential},
    error::{ErrorResponse, GateError},
    state::GateState,
};
use axum::{
    body::Bytes,
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use std::{fmt, sync::Arc};
use tracing::{debug, error, info, instrument, warn};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessRequest {
    access_code: String,
}

impl fmt::Debug for AccessRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessRequest")
            .field("access_code", &"[REDACTED]")
            .finish()
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct AccessGranted {
    pub success: bool,
    pub message: String,
}

impl AccessGranted {
    fn new() -> Self {
        Self {
            success: true,
            message: "Access granted".to_string(),
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/verify-access",
    request_body = AccessRequest,
    responses (
        (status = 200, description = "Access granted, `game_access` cookie set", body = AccessGranted, content_type = "application/json"),
        (status = 400, description = "Malformed request body", body = ErrorResponse),
        (status = 401, description = "Invalid access code", body = ErrorResponse),
        (status = 500, description = "Access code is not configured", body = ErrorResponse),
    ),
    tag = "access",
)]
// axum handler for the access code check
#[instrument(skip(state, body))]
pub async fn verify_access(
    Extension(state): Extension<Arc<GateState>>,
    body: Bytes,
) -> Result<impl IntoResponse, GateError> {
    let Some(secret) = state.config().access_code() else {
        error!("Access code is not configured");
        return Err(GateError::Configuration);
    };

    let request: AccessRequest = serde_json::from_slice(&body).map_err(|err| {
        debug!("Malformed access request: {err}");
        GateError::BadRequest
    })?;

    if !access_code_matches(&request.access_code, secret) {
        warn!("Rejected invalid access code");
        return Err(GateError::InvalidCredential);
    }

    let (name, value) = state
        .carrier()
        .issue(
            &SessionCredential::GRANTED,
            &state.config().credential_policy(),
        )
        .map_err(|err| {
            error!("Failed to encode session credential: {err}");
            GateError::ServerError
        })?;

    let mut headers = HeaderMap::new();
    headers.insert(name, value);

    info!("Access granted");

    Ok((StatusCode::OK, headers, Json(AccessGranted::new())))
}
