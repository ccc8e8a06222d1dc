//! Inbound request bodies.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Body of a start-signature request.
///
/// The calling workflow sends ids either as JSON numbers or strings, so
/// every id field is normalized to an optional string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartSignatureRequest {
    #[serde(default, deserialize_with = "lenient_string")]
    pub node_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub attach_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub user_email1: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub user_email2: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub doc_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub workflow_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub subworkflow_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub task_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub signature: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub timestamp: Option<String>,
}

/// Accept a string or a number; treat null, empty strings and other JSON
/// types as absent.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbers_and_strings_accepted() {
        let body = r#"{
            "nodeId": 12345,
            "attachId": "678",
            "userEmail1": "a@x.com; b@x.com",
            "workflowId": 42,
            "timestamp": 1700000000000,
            "signature": "ab"
        }"#;
        let req: StartSignatureRequest = serde_json::from_str(body).unwrap();
        assert_eq!(req.node_id.as_deref(), Some("12345"));
        assert_eq!(req.attach_id.as_deref(), Some("678"));
        assert_eq!(req.workflow_id.as_deref(), Some("42"));
        assert_eq!(req.timestamp.as_deref(), Some("1700000000000"));
        assert!(req.user_email2.is_none());
        assert!(req.task_id.is_none());
    }

    #[test]
    fn test_blank_and_null_are_absent() {
        let body = r#"{ "nodeId": "", "attachId": null, "docName": "  " }"#;
        let req: StartSignatureRequest = serde_json::from_str(body).unwrap();
        assert!(req.node_id.is_none());
        assert!(req.attach_id.is_none());
        assert!(req.doc_name.is_none());
    }
}
