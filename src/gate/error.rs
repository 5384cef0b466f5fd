use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use super::payload::PayloadError;

/// Failures surfaced by the issuer and the gate.
///
/// The display string of each variant is the client-facing message.
#[derive(Debug, Error)]
pub enum GateError {
    /// The access code is not configured on the server.
    #[error("Server configuration error")]
    Configuration,
    #[error("Invalid request")]
    BadRequest,
    /// Wrong access code at issuance.
    #[error("Invalid access code")]
    InvalidCredential,
    /// Missing, expired or tampered credential at the gate.
    #[error("Unauthorized. Please enter a valid access code.")]
    Unauthorized,
    #[error("Game file not found")]
    NotFound,
    #[error("Internal server error")]
    ServerError,
}

impl GateError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Configuration | Self::ServerError => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BadRequest => StatusCode::BAD_REQUEST,
            Self::InvalidCredential | Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::NotFound => StatusCode::NOT_FOUND,
        }
    }
}

impl From<PayloadError> for GateError {
    fn from(err: PayloadError) -> Self {
        match err {
            PayloadError::Unavailable { .. } => Self::NotFound,
            PayloadError::Fault { .. } => Self::ServerError,
        }
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for GateError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}
