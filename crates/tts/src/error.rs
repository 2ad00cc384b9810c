use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::response::ErrorResponse;

pub type Result<T> = std::result::Result<T, TtsError>;

/// Wire error codes carried in the `code` field of every response body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum ErrorCode {
    Ok = 200,
    ParamError = 400,
    TaskNotExist = 404,
    RangeNotSatisfiable = 416,
    InternalError = 500,
    NetworkError = 502,
    UnknownError = 509,
}

impl ErrorCode {
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Description used when a failure carries no message of its own
    pub const fn default_message(self) -> &'static str {
        match self {
            Self::Ok => "success.",
            Self::ParamError => "Input parameters are not valid.",
            Self::TaskNotExist => "Task is not exist.",
            Self::RangeNotSatisfiable => "Requested range not satisfiable.",
            Self::InternalError => "Internal error.",
            Self::NetworkError => "Network exception.",
            Self::UnknownError => "Unknown error occurred.",
        }
    }

    /// Look up a known code
    pub const fn from_u16(code: u16) -> Option<Self> {
        match code {
            200 => Some(Self::Ok),
            400 => Some(Self::ParamError),
            404 => Some(Self::TaskNotExist),
            416 => Some(Self::RangeNotSatisfiable),
            500 => Some(Self::InternalError),
            502 => Some(Self::NetworkError),
            509 => Some(Self::UnknownError),
            _ => None,
        }
    }
}

/// Failures of the TTS request flow
#[derive(Debug, Error)]
pub enum TtsError {
    /// A request parameter failed validation
    #[error("{0}")]
    InvalidParam(String),

    /// Classified failure reported by the synthesis engine
    #[error("engine error ({code}): {message}")]
    Engine { code: u16, message: String },

    /// The engine's type tag does not serve the requested endpoint family
    #[error("{family} tts engine only support {expected}, engine '{engine}' is '{engine_type}'")]
    UnsupportedEngine {
        family: &'static str,
        expected: &'static str,
        engine: String,
        engine_type: String,
    },

    /// No engine registered under the requested name
    #[error("TTS engine '{0}' not found")]
    EngineNotFound(String),

    /// Invalid engine configuration detected while building the pool
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The byte range cannot be served from a buffer of `total` bytes
    #[error("requested range '{range}' not satisfiable for {total} bytes")]
    RangeNotSatisfiable { range: String, total: u64 },

    /// Unclassified failure; details stay in the server log
    #[error("unknown server error: {0:#}")]
    Unknown(#[from] anyhow::Error),
}

impl TtsError {
    /// Wire code for this error
    pub fn code(&self) -> u16 {
        match self {
            Self::InvalidParam(_) => ErrorCode::ParamError.as_u16(),
            Self::Engine { code, .. } => *code,
            Self::UnsupportedEngine { .. } | Self::EngineNotFound(_) | Self::ConfigError(_) => {
                ErrorCode::InternalError.as_u16()
            }
            Self::RangeNotSatisfiable { .. } => ErrorCode::RangeNotSatisfiable.as_u16(),
            Self::Unknown(_) => ErrorCode::UnknownError.as_u16(),
        }
    }

    /// HTTP status for this error
    ///
    /// Clients classify failures by the body's `code`, so error bodies are
    /// sent as 200. Only an unsatisfiable range uses its own status.
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::RangeNotSatisfiable { .. } => StatusCode::RANGE_NOT_SATISFIABLE,
            _ => StatusCode::OK,
        }
    }

    /// Message that is safe to expose to API consumers
    pub fn client_message(&self) -> String {
        match self {
            Self::InvalidParam(message) | Self::Engine { message, .. } => message.clone(),
            Self::Unknown(_) => ErrorCode::UnknownError.default_message().to_string(),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for TtsError {
    fn into_response(self) -> Response {
        match &self {
            Self::Unknown(source) => tracing::error!(error = ?source, "tts request failed with an unclassified error"),
            Self::Engine { code, message } => tracing::warn!(code, %message, "tts engine reported an error"),
            Self::UnsupportedEngine { .. } | Self::EngineNotFound(_) | Self::ConfigError(_) => {
                tracing::error!(error = %self, "tts engine misconfigured");
            }
            Self::InvalidParam(_) | Self::RangeNotSatisfiable { .. } => tracing::debug!(error = %self, "rejected tts request"),
        }

        let status = self.status_code();
        let body = ErrorResponse::new(self.code(), self.client_message());
        let mut response = (status, Json(body)).into_response();

        if let Self::RangeNotSatisfiable { total, .. } = self
            && let Ok(value) = HeaderValue::from_str(&format!("bytes */{total}"))
        {
            response.headers_mut().insert(header::CONTENT_RANGE, value);
        }

        response
    }
}
