use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use derive_more::Display;
use serde_json::json;

/// Service-level error taxonomy. An unknown card is not represented here:
/// scanning an unregistered badge is a normal negative outcome carried in
/// `ScanOutcome`, not a failure.
#[derive(Debug, Display)]
pub enum LedgerError {
    /// Malformed or empty input, rejected before anything touches storage.
    #[display(fmt = "invalid input: {}", _0)]
    Validation(String),

    /// The storage lock could not be acquired within the bounded wait.
    /// Callers retry; nothing was touched.
    #[display(fmt = "storage busy, retry shortly")]
    Busy,

    /// An open/create/read/write on the backing files failed. State on disk
    /// is whatever the failed step left behind; in-memory state is unchanged.
    #[display(fmt = "storage failure: {}", _0)]
    StorageIo(std::io::Error),
}

impl std::error::Error for LedgerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LedgerError::StorageIo(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for LedgerError {
    fn from(e: std::io::Error) -> Self {
        LedgerError::StorageIo(e)
    }
}

impl ResponseError for LedgerError {
    fn status_code(&self) -> StatusCode {
        match self {
            LedgerError::Validation(_) => StatusCode::BAD_REQUEST,
            LedgerError::Busy => StatusCode::SERVICE_UNAVAILABLE,
            LedgerError::StorageIo(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "error": self.to_string()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_taxonomy() {
        assert_eq!(
            LedgerError::Validation("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(LedgerError::Busy.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            LedgerError::StorageIo(std::io::Error::other("disk")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
