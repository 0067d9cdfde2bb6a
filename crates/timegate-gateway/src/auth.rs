//! Bearer-token gate.
//!
//! Exact-match lookup against the credential records loaded at startup. The
//! gate is pure: a failed authorization has no observable side effect, and it
//! always runs before any session state exists.

use std::collections::HashMap;

use axum::http::{header, HeaderMap};

use timegate_core::error::{Result, TimeGateError};

/// Identity metadata attached to a valid credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub client_id: String,
}

/// Immutable bearer allow-list (token -> client id).
pub struct TokenGate {
    tokens: HashMap<String, String>,
}

impl TokenGate {
    pub fn new(records: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            tokens: records.into_iter().collect(),
        }
    }

    /// Gate with a single credential, as loaded from the config file.
    pub fn single(token: impl Into<String>, client_id: impl Into<String>) -> Self {
        Self::new([(token.into(), client_id.into())])
    }

    /// Authorize a request from its headers. Pure lookup; fails with
    /// `Unauthorized` on a missing header, a non-bearer scheme, or an
    /// unknown token.
    pub fn authorize(&self, headers: &HeaderMap) -> Result<Identity> {
        let raw = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(TimeGateError::Unauthorized)?;
        let token = raw.strip_prefix("Bearer ").ok_or(TimeGateError::Unauthorized)?;
        self.tokens
            .get(token)
            .map(|client_id| Identity {
                client_id: client_id.clone(),
            })
            .ok_or(TimeGateError::Unauthorized)
    }
}
