use axum::{
    body::Body,
    extract::{FromRequest, FromRequestParts, Query},
};
use http::request::Parts;
use serde::de::DeserializeOwned;

use crate::error::TtsError;

/// Body limit for synthesis requests (1 MiB)
const BODY_LIMIT_BYTES: usize = 1 << 20;

/// Extractor for JSON request bodies
///
/// Rejections are reported in the service's own error shape with code 400.
pub struct ExtractPayload<T>(pub T);

impl<S, T: DeserializeOwned> FromRequest<S> for ExtractPayload<T>
where
    S: Send + Sync,
{
    type Rejection = TtsError;

    async fn from_request(request: http::Request<Body>, _state: &S) -> Result<Self, Self::Rejection> {
        let (parts, body) = request.into_parts();

        if parts
            .headers
            .get(http::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_none_or(|value| !value.starts_with("application/json"))
        {
            return Err(TtsError::InvalidParam(
                "Unsupported Content-Type, expected: 'Content-Type: application/json'".to_string(),
            ));
        }

        let bytes = axum::body::to_bytes(body, BODY_LIMIT_BYTES).await.map_err(|err| {
            if std::error::Error::source(&err).is_some_and(|source| source.is::<http_body_util::LengthLimitError>()) {
                TtsError::InvalidParam(format!("Request body is too large, limit is {BODY_LIMIT_BYTES} bytes"))
            } else {
                TtsError::InvalidParam(format!("Failed to read request body: {err}"))
            }
        })?;

        serde_json::from_slice::<T>(&bytes)
            .map(Self)
            .map_err(|e| TtsError::InvalidParam(format!("Failed to parse request body: {e}")))
    }
}

/// Extractor for query string parameters, rejecting like [`ExtractPayload`]
pub struct ExtractQuery<T>(pub T);

impl<S, T: DeserializeOwned> FromRequestParts<S> for ExtractQuery<T>
where
    S: Send + Sync,
{
    type Rejection = TtsError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Query::<T>::try_from_uri(&parts.uri)
            .map(|Query(query)| Self(query))
            .map_err(|e| TtsError::InvalidParam(format!("Failed to parse query string: {}", e.body_text())))
    }
}

/// Value of the `Range` header, if present and readable
pub fn range_header(headers: &http::HeaderMap) -> Option<&str> {
    headers.get(http::header::RANGE).and_then(|value| value.to_str().ok())
}
