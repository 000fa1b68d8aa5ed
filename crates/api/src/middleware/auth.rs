//! JWT-based facilitator extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use boardstorm_core::error::CoreError;
use boardstorm_core::types::FacilitatorId;

use crate::auth::jwt::validate_token;
use crate::error::AppError;
use crate::state::AppState;

/// Authenticated facilitator extracted from a JWT Bearer token in the
/// `Authorization` header.
///
/// Use this as an extractor parameter in any handler that requires the
/// facilitator identity class. Possessing a valid token only proves *who*
/// the facilitator is; *what* they may touch is decided per-entity by the
/// authorization gateway (`crate::authz`).
#[derive(Debug, Clone, Copy)]
pub struct Facilitator {
    pub id: FacilitatorId,
}

impl FromRequestParts<AppState> for Facilitator {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Missing Authorization header".into(),
                ))
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid Authorization format. Expected: Bearer <token>".into(),
            ))
        })?;

        let claims = validate_token(token, &state.config.jwt).map_err(|_| {
            AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
        })?;

        Ok(Facilitator { id: claims.sub })
    }
}
