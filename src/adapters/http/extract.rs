//! Request extraction that reports failures in the API error format.
//!
//! Axum's own `Json`, `Query` and typed `Path` rejections answer in plain
//! text. Handlers use these instead so a malformed id or body comes back as a
//! 400 `VALIDATION_FAILED` with the usual `{ "code", "message" }` body.

use std::str::FromStr;

use axum::async_trait;
use axum::extract::{FromRequest, FromRequestParts, Json, Query, Request};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;

use crate::adapters::http::error::ApiError;
use crate::domain::engagement::EngagementError;

/// JSON body extractor whose rejection is an [`ApiError`].
#[derive(Debug, Clone)]
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => {
                Err(EngagementError::validation("body", rejection.body_text()).into())
            }
        }
    }
}

/// Query string extractor whose rejection is an [`ApiError`].
#[derive(Debug, Clone)]
pub struct ApiQuery<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(Self(value)),
            Err(rejection) => {
                Err(EngagementError::validation("query", rejection.body_text()).into())
            }
        }
    }
}

/// Parses a raw path segment into a typed id.
pub fn parse_id<T: FromStr>(raw: &str, field: &str) -> Result<T, ApiError> {
    raw.parse::<T>()
        .map_err(|_| EngagementError::validation(field, format!("Invalid {}: {}", field, raw)).into())
}

/// Parses an optional JSON body; an empty body yields `None`.
pub fn optional_json<T: DeserializeOwned>(body: &[u8]) -> Result<Option<T>, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice(body)
        .map(Some)
        .map_err(|e| EngagementError::validation("body", e.to_string()).into())
}
