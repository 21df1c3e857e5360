//! Error taxonomy for upstream calls.

use serde::Deserialize;

const UNKNOWN_ERROR_MESSAGE: &str = "An unknown error occurred";

/// 403 reasons that are not about quota. Anything else on a 403 is treated as
/// a quota/rate-limit condition.
const NON_QUOTA_FORBIDDEN_REASONS: &[&str] = &["commentsDisabled", "forbidden"];

/// Failure of a single upstream request. Every variant is recoverable at the
/// resource boundary; only `QuotaExceeded` asks the caller to pause.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("quota exceeded (HTTP {status}): {message}")]
    QuotaExceeded { status: u16, message: String },

    #[error("HTTP error {status}: {message}")]
    Http { status: u16, message: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("could not decode response: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn is_quota(&self) -> bool {
        matches!(self, ApiError::QuotaExceeded { .. })
    }

    /// Builds the error for a non-2xx response from its status and raw body.
    pub fn from_status(status: u16, body: &str) -> Self {
        let envelope = serde_json::from_str::<ErrorEnvelope>(body).ok();
        let message = match &envelope {
            Some(envelope) => envelope
                .error
                .message
                .clone()
                .filter(|message| !message.trim().is_empty())
                .unwrap_or_else(|| UNKNOWN_ERROR_MESSAGE.to_string()),
            None => {
                tracing::error!(status, raw = body, "failed to parse error response");
                UNKNOWN_ERROR_MESSAGE.to_string()
            }
        };
        let reason = envelope.as_ref().and_then(ErrorEnvelope::first_reason);

        let quota = match status {
            429 => true,
            403 => !reason.is_some_and(|reason| NON_QUOTA_FORBIDDEN_REASONS.contains(&reason)),
            _ => false,
        };

        if quota {
            ApiError::QuotaExceeded { status, message }
        } else {
            ApiError::Http { status, message }
        }
    }
}

/// Google's JSON error body: `{"error": {"code", "message", "errors": [...]}}`.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    errors: Vec<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    reason: Option<String>,
}

impl ErrorEnvelope {
    fn first_reason(&self) -> Option<&str> {
        self.error
            .errors
            .iter()
            .find_map(|detail| detail.reason.as_deref())
    }
}
