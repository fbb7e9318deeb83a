use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use std::fmt;
use unicorn_bridge_core::BridgeError;

/// Error type of the relay's HTTP surface
#[derive(Debug, Clone)]
pub enum RelayError {
    Bridge(BridgeError),
    BadRequest(String),
    Config(String),
    Internal(String),
}

impl fmt::Display for RelayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelayError::Bridge(e) => write!(f, "{e}"),
            RelayError::BadRequest(msg) => write!(f, "Bad request: {msg}"),
            RelayError::Config(msg) => write!(f, "Configuration error: {msg}"),
            RelayError::Internal(msg) => write!(f, "Internal error: {msg}"),
        }
    }
}

impl std::error::Error for RelayError {}

impl RelayError {
    /// Machine-readable code carried in the `error` field
    pub fn code(&self) -> &'static str {
        match self {
            RelayError::Bridge(e) => match e {
                BridgeError::Validation(_) => "VALIDATION_ERROR",
                BridgeError::UnknownTarget(_) => "UNKNOWN_TARGET",
                BridgeError::Busy(_) => "OPERATION_IN_PROGRESS",
                BridgeError::NoAccount(_) => "NO_ACCOUNT",
                BridgeError::Network(_) => "NETWORK_ERROR",
                BridgeError::Quote(_) => "QUOTE_ERROR",
                BridgeError::Transaction(_) => "TRANSACTION_ERROR",
                BridgeError::Rejected(_) => "REJECTED",
                BridgeError::Config(_) => "CONFIG_ERROR",
                BridgeError::Storage(_) => "STORAGE_ERROR",
                BridgeError::Internal(_) => "INTERNAL_ERROR",
            },
            RelayError::BadRequest(_) => "BAD_REQUEST",
            RelayError::Config(_) => "CONFIG_ERROR",
            RelayError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn message(&self) -> String {
        match self {
            RelayError::Bridge(e) => e.user_message(),
            other => other.to_string(),
        }
    }
}

impl ResponseError for RelayError {
    fn status_code(&self) -> StatusCode {
        match self {
            RelayError::Bridge(e) => match e {
                BridgeError::Validation(_) | BridgeError::UnknownTarget(_) => StatusCode::BAD_REQUEST,
                BridgeError::Busy(_) => StatusCode::CONFLICT,
                BridgeError::NoAccount(_) => StatusCode::PRECONDITION_FAILED,
                BridgeError::Network(_) | BridgeError::Quote(_) | BridgeError::Transaction(_) => StatusCode::BAD_GATEWAY,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            RelayError::BadRequest(_) => StatusCode::BAD_REQUEST,
            RelayError::Config(_) | RelayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.code(), "{}", self);
        } else {
            tracing::debug!(code = self.code(), "{}", self);
        }
        HttpResponse::build(status).json(serde_json::json!({
            "error": self.code(),
            "message": self.message(),
            "timestamp": chrono::Utc::now().to_rfc3339(),
        }))
    }
}

impl From<BridgeError> for RelayError {
    fn from(err: BridgeError) -> Self {
        RelayError::Bridge(err)
    }
}

impl From<anyhow::Error> for RelayError {
    fn from(err: anyhow::Error) -> Self {
        RelayError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[test]
    fn test_status_codes_by_category() {
        let cases = [
            (BridgeError::validation("x"), StatusCode::BAD_REQUEST),
            (BridgeError::unknown_target("DOGE"), StatusCode::BAD_REQUEST),
            (BridgeError::busy("x"), StatusCode::CONFLICT),
            (BridgeError::no_account("x"), StatusCode::PRECONDITION_FAILED),
            (BridgeError::network("x"), StatusCode::BAD_GATEWAY),
            (BridgeError::quote("x"), StatusCode::BAD_GATEWAY),
            (BridgeError::transaction("x"), StatusCode::BAD_GATEWAY),
            (BridgeError::storage("x"), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(RelayError::from(err).status_code(), status);
        }
    }

    #[test]
    fn test_codes_cover_every_bridge_category() {
        let cases = [
            (BridgeError::validation("x"), "VALIDATION_ERROR"),
            (BridgeError::unknown_target("x"), "UNKNOWN_TARGET"),
            (BridgeError::busy("x"), "OPERATION_IN_PROGRESS"),
            (BridgeError::no_account("x"), "NO_ACCOUNT"),
            (BridgeError::network("x"), "NETWORK_ERROR"),
            (BridgeError::quote("x"), "QUOTE_ERROR"),
            (BridgeError::transaction("x"), "TRANSACTION_ERROR"),
            (BridgeError::rejected("x"), "REJECTED"),
            (BridgeError::config("x"), "CONFIG_ERROR"),
            (BridgeError::storage("x"), "STORAGE_ERROR"),
            (BridgeError::internal("x"), "INTERNAL_ERROR"),
        ];
        for (err, code) in cases {
            assert_eq!(RelayError::from(err).code(), code);
        }
    }

    #[actix_web::test]
    async fn test_error_body_shape() {
        let response = RelayError::from(BridgeError::unknown_target("DOGE")).error_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = to_bytes(response.into_body()).await.expect("body");
        let json: serde_json::Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(json["error"], "UNKNOWN_TARGET");
        assert_eq!(json["message"], "Unsupported target token: DOGE");
        assert!(json["timestamp"].is_string());
    }
}
