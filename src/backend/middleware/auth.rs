/**
 * Authentication Extractors
 *
 * Two ways a request proves who it is:
 *
 * - Web tier routes need a signed-in user. The embedding application runs
 *   its own session middleware and inserts an `AuthenticatedUser` into the
 *   request extensions; `AuthUser` reads it back out.
 * - Collaboration service routes need a capability token. `CollabAuth`
 *   reads it from `Authorization: Bearer <token>` (or `?token=` on
 *   WebSocket upgrades) and verifies it against the token service.
 */

use std::collections::HashMap;

use axum::{
    extract::{FromRef, FromRequestParts, Query},
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
};

use crate::backend::auth::{bearer_token, CollabClaims, TokenService};
use crate::backend::error::BackendError;

/// Signed-in user placed in request extensions by the session layer
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: String,
}

impl AuthenticatedUser {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }
}

/// Axum extractor for the signed-in user
///
/// Rejects with 401 when no session layer put a user on the request.
#[derive(Clone, Debug)]
pub struct AuthUser(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = BackendError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| {
                tracing::debug!("[Auth] No session user on request to {}", parts.uri.path());
                BackendError::handler(StatusCode::UNAUTHORIZED, "Unauthorized")
            })
    }
}

/// Pull a capability token off a request
///
/// The `Authorization` header wins; the `token` query parameter is the
/// fallback for clients that cannot set headers on a WebSocket upgrade.
pub fn request_token(parts: &Parts) -> Option<String> {
    let from_header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(bearer_token)
        .map(str::to_string);
    if from_header.is_some() {
        return from_header;
    }

    Query::<HashMap<String, String>>::try_from_uri(&parts.uri)
        .ok()
        .and_then(|Query(mut params)| params.remove("token"))
        .filter(|token| !token.is_empty())
}

/// Axum extractor for verified capability token claims
#[derive(Clone, Debug)]
pub struct CollabAuth(pub CollabClaims);

impl<S> FromRequestParts<S> for CollabAuth
where
    TokenService: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = BackendError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let tokens = TokenService::from_ref(state);
        let token = request_token(parts).ok_or_else(|| {
            tracing::debug!("[Auth] Missing capability token on {}", parts.uri.path());
            BackendError::InvalidToken
        })?;

        tokens.verify(&token).map(CollabAuth)
    }
}
