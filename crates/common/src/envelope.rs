//! Response envelope shared by the catalog and order services.

use serde::{Deserialize, Serialize};

/// `{ "success": bool, "payload": T }` wrapper returned by collaborator APIs.
///
/// A `success = false` envelope is a failure even when the HTTP status is 2xx,
/// so the payload is optional on the way in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub payload: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> Envelope<T> {
    /// Wraps a successful payload.
    pub fn ok(payload: T) -> Self {
        Self {
            success: true,
            payload: Some(payload),
            message: None,
        }
    }

    /// Builds a failure envelope with a message.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            payload: None,
            message: Some(message.into()),
        }
    }

    /// Returns the payload when the envelope reports success.
    pub fn into_payload(self) -> Option<T> {
        if self.success { self.payload } else { None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsuccessful_envelope_yields_no_payload() {
        let env: Envelope<u32> =
            serde_json::from_str(r#"{"success": false, "payload": 3}"#).unwrap();
        assert_eq!(env.into_payload(), None);
    }

    #[test]
    fn missing_payload_is_tolerated() {
        let env: Envelope<u32> =
            serde_json::from_str(r#"{"success": false, "message": "nope"}"#).unwrap();
        assert!(!env.success);
        assert_eq!(env.message.as_deref(), Some("nope"));
    }

    #[test]
    fn ok_envelope_serializes_without_message() {
        let json = serde_json::to_value(Envelope::ok(7)).unwrap();
        assert_eq!(json, serde_json::json!({"success": true, "payload": 7}));
    }
}
