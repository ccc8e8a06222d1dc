//! Content Server REST wire types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::http::id_string;

/// Node subtype of a plain document.
pub const DOCUMENT_SUBTYPE: i64 = 144;

/// Ticket lifetime assumed when the server does not report one.
pub const DEFAULT_TICKET_TTL_SECS: i64 = 1800;

#[derive(Debug, Serialize)]
pub struct AuthRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Default, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub ticket: Option<String>,
    #[serde(default, rename = "otdsToken")]
    pub otds_token: Option<String>,
    #[serde(default, rename = "validFor")]
    pub valid_for: Option<i64>,
}

impl AuthResponse {
    /// The session ticket, preferring the classic ticket over an OTDS token.
    pub fn into_ticket(self) -> Option<(String, i64)> {
        let value = self
            .ticket
            .filter(|t| !t.is_empty())
            .or(self.otds_token.filter(|t| !t.is_empty()))?;
        let ttl = self
            .valid_for
            .filter(|v| *v > 0)
            .unwrap_or(DEFAULT_TICKET_TTL_SECS);
        Some((value, ttl))
    }
}

/// `GET /v1/nodes/{id}/nodes` listing.
#[derive(Debug, Default, Deserialize)]
pub struct NodeListing {
    #[serde(default)]
    pub data: Vec<NodeSummary>,
}

#[derive(Debug, Deserialize)]
pub struct NodeSummary {
    #[serde(default)]
    pub id: Value,
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "type")]
    pub node_type: i64,
}

impl NodeListing {
    /// Id of the document named exactly `name`.
    pub fn find_document(&self, name: &str) -> Option<String> {
        self.data
            .iter()
            .find(|n| n.name == name && n.node_type == DOCUMENT_SUBTYPE)
            .and_then(|n| id_string(&n.id))
    }
}

/// `POST /v1/nodes` response.
#[derive(Debug, Deserialize)]
pub struct CreatedNode {
    #[serde(default)]
    pub id: Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_prefers_ticket_and_defaults_ttl() {
        let parsed: AuthResponse = serde_json::from_str(r#"{"ticket":"abc"}"#).unwrap();
        assert_eq!(parsed.into_ticket(), Some(("abc".to_string(), 1800)));

        let otds: AuthResponse =
            serde_json::from_str(r#"{"otdsToken":"tok","validFor":600}"#).unwrap();
        assert_eq!(otds.into_ticket(), Some(("tok".to_string(), 600)));

        let empty: AuthResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(empty.into_ticket(), None);
    }

    #[test]
    fn test_listing_matches_exact_document_name() {
        let listing: NodeListing = serde_json::from_str(
            r#"{"data":[
                {"id": 10, "name": "contract.pdf", "type": 0},
                {"id": 11, "name": "Contract.pdf", "type": 144},
                {"id": 12, "name": "contract.pdf", "type": 144}
            ]}"#,
        )
        .unwrap();
        assert_eq!(listing.find_document("contract.pdf"), Some("12".to_string()));
        assert_eq!(listing.find_document("other.pdf"), None);
    }
}
