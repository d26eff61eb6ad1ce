use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap, StatusCode},
};
use uuid::Uuid;

use crate::auth::jwt::validate_access_token;
use crate::AppState;

#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: Uuid,
}

/// Token from `Authorization: Bearer <jwt>`, the `accessToken` cookie, or a
/// `?token=` query parameter -- the only transport a raw WebSocket upgrade
/// has if the client can't set custom headers (section 4.E). Shared by the
/// HTTP extractor below and the WebSocket upgrade handler in `gateway.rs`.
pub fn extract_token_raw(headers: &HeaderMap, query: Option<&str>) -> Option<String> {
    if let Some(bearer) = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
    {
        return Some(bearer.to_string());
    }

    if let Some(cookie_header) = headers.get(axum::http::header::COOKIE).and_then(|h| h.to_str().ok()) {
        for pair in cookie_header.split(';') {
            let mut kv = pair.trim().splitn(2, '=');
            if let (Some("accessToken"), Some(value)) = (kv.next(), kv.next()) {
                return Some(value.to_string());
            }
        }
    }

    query
        .and_then(|q| q.split('&').find_map(|kv| kv.strip_prefix("token=")))
        .map(|v| v.to_string())
}

pub fn extract_token(parts: &Parts) -> Option<String> {
    extract_token_raw(&parts.headers, parts.uri.query())
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = extract_token(parts).ok_or((StatusCode::UNAUTHORIZED, "missing access token"))?;
        let claims = validate_access_token(&token, &state.config.access_token_secret)
            .map_err(|_| (StatusCode::UNAUTHORIZED, "invalid or expired token"))?;

        Ok(AuthUser { user_id: claims.user_id })
    }
}

/// Optional auth: does not fail if no token is present.
#[derive(Debug, Clone, Copy)]
pub struct OptionalAuthUser(pub Option<AuthUser>);

#[async_trait]
impl FromRequestParts<AppState> for OptionalAuthUser {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(OptionalAuthUser(AuthUser::from_request_parts(parts, state).await.ok()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with_uri(uri: &str) -> Parts {
        Request::builder().uri(uri).body(()).unwrap().into_parts().0
    }

    #[test]
    fn extracts_token_from_query_param_when_no_header_or_cookie() {
        let parts = parts_with_uri("/ws?token=abc123");
        assert_eq!(extract_token(&parts), Some("abc123".to_string()));
    }

    #[test]
    fn returns_none_when_nothing_present() {
        let parts = parts_with_uri("/ws");
        assert_eq!(extract_token(&parts), None);
    }
}
