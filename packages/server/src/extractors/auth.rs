use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::CookieJar;

use crate::error::AppError;
use crate::state::AppState;
use crate::utils::jwt;

/// Authenticated user for the request, taken from the `Authorization:
/// Bearer <token>` header or, failing that, the `token` session cookie the
/// login endpoint sets.
///
/// Add this as a handler parameter to require authentication. Ownership
/// checks happen against `user_id` in the handler body.
pub struct AuthUser {
    pub user_id: i32,
    pub username: String,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let bearer = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .map(|header| {
                header
                    .strip_prefix("Bearer ")
                    .map(str::to_owned)
                    .ok_or(AppError::TokenInvalid)
            });

        let token = match bearer {
            Some(result) => result?,
            None => CookieJar::from_headers(&parts.headers)
                .get("token")
                .map(|c| c.value().to_owned())
                .ok_or(AppError::TokenMissing)?,
        };

        let claims = jwt::verify(&token, &state.config.auth.jwt_secret)
            .map_err(|_| AppError::TokenInvalid)?;

        Ok(AuthUser {
            user_id: claims.uid,
            username: claims.sub,
        })
    }
}
