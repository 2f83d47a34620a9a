//! Request DTOs for peer lookups
//!
//! Defines the `{group, key}` pair a node asks a peer for.

use serde::{Deserialize, Serialize};

/// Request for the value of `key` in `group` on a remote node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchRequest {
    /// The group (cache namespace) name
    pub group: String,
    /// The key inside that group; empty when the path ends right after the group
    #[serde(default)]
    pub key: String,
}

impl FetchRequest {
    /// Creates a new FetchRequest
    pub fn new(group: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            key: key.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_request_new() {
        let req = FetchRequest::new("files", "a/b/c");
        assert_eq!(req.group, "files");
        assert_eq!(req.key, "a/b/c");
    }

    #[test]
    fn test_fetch_request_missing_key_is_empty() {
        let req: FetchRequest = serde_json::from_str(r#"{"group": "scores"}"#).unwrap();
        assert_eq!(req.key, "");
    }

    #[test]
    fn test_fetch_request_deserialize() {
        let json = r#"{"group": "scores", "key": "Tom"}"#;
        let req: FetchRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req, FetchRequest::new("scores", "Tom"));
    }
}
