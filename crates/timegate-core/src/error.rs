//! Shared error type across timegate crates.

use thiserror::Error;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Invalid input / malformed message.
    BadRequest,
    /// Missing or invalid bearer credential.
    Unauthorized,
    /// Message addressed to an unknown or closed session.
    SessionNotFound,
    /// Session identifier collision on insert (internal fault).
    DuplicateSession,
    /// Session inbound queue is saturated.
    Overloaded,
    /// Internal server error.
    Internal,
}

impl ClientCode {
    /// String representation used in JSON responses.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::BadRequest => "BAD_REQUEST",
            ClientCode::Unauthorized => "UNAUTHORIZED",
            ClientCode::SessionNotFound => "SESSION_NOT_FOUND",
            ClientCode::DuplicateSession => "DUPLICATE_SESSION",
            ClientCode::Overloaded => "OVERLOADED",
            ClientCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, TimeGateError>;

/// Unified error type used by core and gateway.
#[derive(Debug, Error)]
pub enum TimeGateError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("unauthorized")]
    Unauthorized,
    #[error("session not found: {0}")]
    SessionNotFound(String),
    #[error("duplicate session id: {0}")]
    DuplicateSession(String),
    #[error("session inbound queue full: {0}")]
    Overloaded(String),
    #[error("transport write failed: {0}")]
    TransportWriteFailure(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl TimeGateError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            TimeGateError::BadRequest(_) => ClientCode::BadRequest,
            TimeGateError::Unauthorized => ClientCode::Unauthorized,
            TimeGateError::SessionNotFound(_) => ClientCode::SessionNotFound,
            TimeGateError::DuplicateSession(_) => ClientCode::DuplicateSession,
            TimeGateError::Overloaded(_) => ClientCode::Overloaded,
            // A broken outbound stream is never reported back over that stream;
            // if it surfaces anywhere else it is an internal fault.
            TimeGateError::TransportWriteFailure(_) => ClientCode::Internal,
            TimeGateError::Internal(_) => ClientCode::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_codes_are_stable_strings() {
        assert_eq!(
            TimeGateError::Unauthorized.client_code().as_str(),
            "UNAUTHORIZED"
        );
        assert_eq!(
            TimeGateError::SessionNotFound("abc".into())
                .client_code()
                .as_str(),
            "SESSION_NOT_FOUND"
        );
        assert_eq!(
            TimeGateError::DuplicateSession("abc".into())
                .client_code()
                .as_str(),
            "DUPLICATE_SESSION"
        );
        assert_eq!(
            TimeGateError::TransportWriteFailure("eof".into())
                .client_code()
                .as_str(),
            "INTERNAL"
        );
    }
}
