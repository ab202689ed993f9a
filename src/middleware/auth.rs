use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use serde::Deserialize;
use tracing::debug;

use crate::api::PathParam;
use crate::auth::Claims;
use crate::error::ApiError;
use crate::state::AppState;

/// Verified requester, taken from a valid bearer token
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    pub username: String,
    pub is_admin: bool,
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Self {
            username: claims.username,
            is_admin: claims.is_admin,
        }
    }
}

/// Per-request auth state. Anonymous unless [`identify`] verified a token.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub identity: Option<Identity>,
}

impl RequestContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(identity: Identity) -> Self {
        Self {
            identity: Some(identity),
        }
    }

    pub fn require_logged_in(&self) -> Result<&Identity, ApiError> {
        self.identity
            .as_ref()
            .ok_or_else(|| ApiError::unauthorized("Unauthorized"))
    }

    pub fn require_admin(&self) -> Result<&Identity, ApiError> {
        let identity = self.require_logged_in()?;
        if identity.is_admin {
            Ok(identity)
        } else {
            Err(ApiError::forbidden("Forbidden"))
        }
    }

    /// Admins pass for any user; everyone else only for their own (case-sensitive) username
    pub fn require_self_or_admin(&self, username: &str) -> Result<&Identity, ApiError> {
        let identity = self.require_logged_in()?;
        if identity.is_admin || identity.username == username {
            Ok(identity)
        } else {
            Err(ApiError::forbidden("Forbidden"))
        }
    }
}

#[axum::async_trait]
impl<S: Send + Sync> FromRequestParts<S> for RequestContext {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<RequestContext>().cloned().unwrap_or_default())
    }
}

/// Attach the caller's identity when a valid bearer token is present. Never rejects.
pub async fn identify(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let context = match extract_bearer_token(request.headers()) {
        Some(token) => match state.tokens.verify(token) {
            Ok(claims) => RequestContext::authenticated(claims.into()),
            Err(e) => {
                debug!("Ignoring bearer token: {}", e);
                RequestContext::anonymous()
            }
        },
        None => RequestContext::anonymous(),
    };

    request.extensions_mut().insert(context);
    next.run(request).await
}

pub async fn require_logged_in(ctx: RequestContext, request: Request, next: Next) -> Result<Response, ApiError> {
    ctx.require_logged_in()?;
    Ok(next.run(request).await)
}

pub async fn require_admin(ctx: RequestContext, request: Request, next: Next) -> Result<Response, ApiError> {
    ctx.require_admin()?;
    Ok(next.run(request).await)
}

#[derive(Debug, Deserialize)]
pub struct UsernamePath {
    pub username: String,
}

/// Gate for `/users/:username`
pub async fn require_self_or_admin(
    ctx: RequestContext,
    PathParam(path): PathParam<UsernamePath>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    ctx.require_self_or_admin(&path.username)?;
    Ok(next.run(request).await)
}

/// Token from `Authorization: Bearer <token>`; scheme is case-insensitive and padding is ignored
fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?.trim();
    let (scheme, token) = value.split_once(char::is_whitespace)?;
    let token = token.trim();

    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    fn user(username: &str, is_admin: bool) -> RequestContext {
        RequestContext::authenticated(Identity {
            username: username.to_string(),
            is_admin,
        })
    }

    #[test]
    fn bearer_scheme_is_case_insensitive() {
        assert_eq!(extract_bearer_token(&headers("Bearer abc")), Some("abc"));
        assert_eq!(extract_bearer_token(&headers("bearer abc")), Some("abc"));
        assert_eq!(extract_bearer_token(&headers("  BEARER   abc  ")), Some("abc"));
    }

    #[test]
    fn other_schemes_and_empty_tokens_are_ignored() {
        assert_eq!(extract_bearer_token(&headers("Basic abc")), None);
        assert_eq!(extract_bearer_token(&headers("Bearer")), None);
        assert_eq!(extract_bearer_token(&headers("Bearer   ")), None);
        assert_eq!(extract_bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn logged_in_gate() {
        assert_eq!(RequestContext::anonymous().require_logged_in().unwrap_err().status_code(), 401);
        assert!(user("u1", false).require_logged_in().is_ok());
    }

    #[test]
    fn admin_gate() {
        assert_eq!(RequestContext::anonymous().require_admin().unwrap_err().status_code(), 401);
        assert_eq!(user("u1", false).require_admin().unwrap_err().status_code(), 403);
        assert!(user("admin", true).require_admin().is_ok());
    }

    #[test]
    fn self_or_admin_gate() {
        assert!(user("u1", false).require_self_or_admin("u1").is_ok());
        assert_eq!(user("u1", false).require_self_or_admin("u2").unwrap_err().status_code(), 403);
        assert_eq!(user("u1", false).require_self_or_admin("U1").unwrap_err().status_code(), 403);
        assert!(user("admin", true).require_self_or_admin("u2").is_ok());
        assert_eq!(
            RequestContext::anonymous().require_self_or_admin("u1").unwrap_err().status_code(),
            401
        );
    }

    #[test]
    fn identity_from_claims() {
        let claims = Claims { username: "u1".into(), is_admin: true, iat: 0, exp: 1 };
        assert_eq!(Identity::from(claims), Identity { username: "u1".into(), is_admin: true });
    }
}
