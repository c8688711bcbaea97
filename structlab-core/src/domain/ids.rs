use serde::{Deserialize, Serialize};
use std::fmt;

/// Deterministic configuration ID (content hash of a serialized configuration).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConfigId(pub String);

impl ConfigId {
    /// Hash arbitrary canonical bytes with BLAKE3.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(blake3::hash(bytes).to_hex().to_string())
    }

    /// First 12 hex characters, for log lines.
    pub fn short(&self) -> &str {
        let end = self.0.len().min(12);
        &self.0[..end]
    }
}

impl fmt::Display for ConfigId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_id_is_deterministic() {
        let a = ConfigId::from_bytes(b"{\"symbol\":\"EUR/USD\"}");
        let b = ConfigId::from_bytes(b"{\"symbol\":\"EUR/USD\"}");
        assert_eq!(a, b);
        assert_eq!(a.0.len(), 64);
    }

    #[test]
    fn config_id_changes_with_content() {
        let a = ConfigId::from_bytes(b"EUR/USD");
        let b = ConfigId::from_bytes(b"GBP/USD");
        assert_ne!(a, b);
    }

    #[test]
    fn short_form_is_a_prefix() {
        let id = ConfigId::from_bytes(b"abc");
        assert_eq!(id.short().len(), 12);
        assert!(id.0.starts_with(id.short()));
        assert_eq!(ConfigId("abc".into()).short(), "abc");
    }
}
