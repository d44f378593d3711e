//! Caller identity for axum handlers.
//!
//! Authentication happens upstream (API gateway or session layer). It forwards
//! the authenticated user's id in the `X-User-Id` header; this module only
//! parses it. Authorization decisions stay in the application layer.
//!
//! ```ignore
//! async fn my_handler(RequireUser(user_id): RequireUser) -> impl IntoResponse {
//!     format!("Hello, {}!", user_id)
//! }
//! ```

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::adapters::http::error::ErrorResponse;
use crate::domain::foundation::UserId;

/// Header carrying the authenticated user's id.
pub const USER_ID_HEADER: &str = "X-User-Id";

/// Extractor that requires a caller identity.
#[derive(Debug, Clone, Copy)]
pub struct RequireUser(pub UserId);

/// Rejection when the identity header is missing or malformed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthRejection {
    Missing,
    Malformed,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let message = match self {
            AuthRejection::Missing => "Authentication is required",
            AuthRejection::Malformed => "X-User-Id must be a UUID",
        };
        let body = ErrorResponse::new("UNAUTHORIZED", message);
        (StatusCode::UNAUTHORIZED, Json(body)).into_response()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for RequireUser
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(USER_ID_HEADER)
            .ok_or(AuthRejection::Missing)?
            .to_str()
            .map_err(|_| AuthRejection::Malformed)?;

        let user_id = raw
            .trim()
            .parse::<UserId>()
            .map_err(|_| AuthRejection::Malformed)?;

        Ok(RequireUser(user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(header: Option<&str>) -> Result<RequireUser, AuthRejection> {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = header {
            builder = builder.header(USER_ID_HEADER, value);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        RequireUser::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn parses_uuid_header() {
        let id = UserId::new();
        let RequireUser(extracted) = extract(Some(&id.to_string())).await.unwrap();
        assert_eq!(extracted, id);
    }

    #[tokio::test]
    async fn missing_header_is_rejected() {
        assert_eq!(extract(None).await.unwrap_err(), AuthRejection::Missing);
    }

    #[tokio::test]
    async fn non_uuid_header_is_rejected() {
        assert_eq!(
            extract(Some("test-user-123")).await.unwrap_err(),
            AuthRejection::Malformed
        );
    }

    #[test]
    fn rejection_is_unauthorized() {
        let response = AuthRejection::Missing.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
