//! Session identity and registry.
//!
//! A session is one open outbound stream. It is owned by the relay task that
//! created it; the registry and the intake endpoint only hold references
//! (clones of the inbound sender) obtained through lookup.

pub mod registry;

pub use registry::{SessionEntry, SessionRegistry};

use uuid::Uuid;

/// Generate a fresh opaque session identifier.
pub fn new_session_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Check that a client-supplied identifier is at least well-formed before the
/// registry is consulted.
pub fn is_valid_session_id(s: &str) -> bool {
    Uuid::try_parse(s).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_valid_and_distinct() {
        let a = new_session_id();
        let b = new_session_id();
        assert_ne!(a, b);
        assert!(is_valid_session_id(&a));
    }

    #[test]
    fn malformed_ids_are_rejected() {
        assert!(!is_valid_session_id(""));
        assert!(!is_valid_session_id("not-a-uuid"));
        assert!(!is_valid_session_id("0123"));
    }
}
