use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use uuid::Uuid;

use crate::{auth::jwt::JwtKeys, error::AppError};

pub const SESSION_COOKIE: &str = "access_token";

/// `Set-Cookie` value for a fresh session. The cookie carries the token with
/// a `Bearer ` prefix, quoted so the embedded space survives the trip.
pub fn session_cookie(token: &str, max_age_secs: u64, secure: bool) -> String {
    let mut cookie = format!(
        "{SESSION_COOKIE}=\"Bearer {token}\"; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age_secs}"
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value that removes the session cookie.
pub fn clear_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

/// Pulls the bearer token out of a request: session cookie first (web UI),
/// `Authorization` header as the fallback (API clients). A `Bearer ` prefix
/// is stripped in either place.
fn token_from_parts(parts: &Parts) -> Option<String> {
    if let Some(raw) = parts
        .headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
    {
        for pair in raw.split(';') {
            if let Some(value) = pair.trim().strip_prefix("access_token=") {
                let value = value.trim_matches('"');
                let token = value.strip_prefix("Bearer ").unwrap_or(value);
                if !token.is_empty() {
                    return Some(token.to_string());
                }
            }
        }
    }

    let auth = parts
        .headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?;
    let token = auth.strip_prefix("Bearer ").unwrap_or(auth);
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// Extracts and validates the session token, returning the user ID.
/// Rejects with 401 when the token is missing, malformed or expired.
pub struct AuthUser(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);
        let token = token_from_parts(parts)
            .ok_or_else(|| AppError::unauthorized("Not authenticated"))?;
        let claims = keys.verify(&token).map_err(|_| {
            tracing::warn!("invalid or expired token");
            AppError::unauthorized("Invalid or expired token")
        })?;
        Ok(AuthUser(claims.sub))
    }
}

/// Like [`AuthUser`] but never rejects: pages that render differently for
/// anonymous visitors get `None` instead of a 401.
pub struct MaybeAuthUser(pub Option<Uuid>);

#[async_trait]
impl<S> FromRequestParts<S> for MaybeAuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);
        let user_id = token_from_parts(parts)
            .and_then(|token| keys.verify(&token).ok())
            .map(|claims| claims.sub);
        Ok(MaybeAuthUser(user_id))
    }
}
