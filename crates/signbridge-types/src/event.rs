//! Webhook events reported by the e-signature provider.

use std::fmt;

use serde_json::Value;

/// Event kind carried by a provider notification.
///
/// Only the kinds the bridge acts on are named; everything else is kept
/// verbatim in [`EventKind::Other`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    DocumentSigned,
    ParticipantCompleted,
    ParticipantSigned,
    AgreementCompleted,
    AgreementSigned,
    AgreementActionCompleted,
    AgreementWorkflowCompleted,
    AgreementRejected,
    Other(String),
}

impl EventKind {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "DOCUMENT_SIGNED" => Self::DocumentSigned,
            "PARTICIPANT_COMPLETED" => Self::ParticipantCompleted,
            "PARTICIPANT_SIGNED" => Self::ParticipantSigned,
            "AGREEMENT_COMPLETED" => Self::AgreementCompleted,
            "AGREEMENT_SIGNED" => Self::AgreementSigned,
            "AGREEMENT_ACTION_COMPLETED" => Self::AgreementActionCompleted,
            "AGREEMENT_WORKFLOW_COMPLETED" => Self::AgreementWorkflowCompleted,
            "AGREEMENT_REJECTED" => Self::AgreementRejected,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::DocumentSigned => "DOCUMENT_SIGNED",
            Self::ParticipantCompleted => "PARTICIPANT_COMPLETED",
            Self::ParticipantSigned => "PARTICIPANT_SIGNED",
            Self::AgreementCompleted => "AGREEMENT_COMPLETED",
            Self::AgreementSigned => "AGREEMENT_SIGNED",
            Self::AgreementActionCompleted => "AGREEMENT_ACTION_COMPLETED",
            Self::AgreementWorkflowCompleted => "AGREEMENT_WORKFLOW_COMPLETED",
            Self::AgreementRejected => "AGREEMENT_REJECTED",
            Self::Other(raw) => raw,
        }
    }

    /// Events after which the signed document may have changed.
    pub fn affects_document(&self) -> bool {
        !matches!(self, Self::Other(_))
    }

    /// Events meaning every participant has finished signing.
    pub fn is_fully_completed(&self) -> bool {
        matches!(
            self,
            Self::AgreementCompleted | Self::AgreementSigned | Self::AgreementWorkflowCompleted
        )
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields extracted from an inbound webhook payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookEvent {
    pub agreement_id: Option<String>,
    pub kind: EventKind,
    pub participant: Option<String>,
    pub event_date: Option<String>,
}

impl WebhookEvent {
    /// Extract the event from a provider payload.
    ///
    /// The provider has shipped several payload shapes; the nested `event`
    /// object wins over top-level fields.
    pub fn from_payload(payload: &Value) -> Self {
        let event = payload.get("event");

        let agreement_id = event
            .and_then(|e| string_field(e, "agreementId"))
            .or_else(|| payload.get("agreement").and_then(|a| string_field(a, "id")))
            .or_else(|| string_field(payload, "agreementId"));

        let kind = event
            .and_then(|e| string_field(e, "eventType"))
            .or_else(|| event.and_then(Value::as_str).map(str::to_string))
            .or_else(|| string_field(payload, "type"))
            .unwrap_or_else(|| "UNKNOWN_EVENT".to_string());

        let participant = event
            .and_then(|e| string_field(e, "participantUserEmail"))
            .or_else(|| string_field(payload, "participantUserEmail"));

        let event_date = event.and_then(|e| string_field(e, "eventDate"));

        Self {
            agreement_id,
            kind: EventKind::parse(&kind),
            participant,
            event_date,
        }
    }
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    match value.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_round_trips_known_kinds() {
        for raw in [
            "DOCUMENT_SIGNED",
            "AGREEMENT_COMPLETED",
            "AGREEMENT_REJECTED",
            "AGREEMENT_WORKFLOW_COMPLETED",
        ] {
            assert_eq!(EventKind::parse(raw).as_str(), raw);
        }
        assert_eq!(
            EventKind::parse("AGREEMENT_CREATED"),
            EventKind::Other("AGREEMENT_CREATED".into())
        );
    }

    #[test]
    fn test_classification() {
        assert!(EventKind::ParticipantSigned.affects_document());
        assert!(!EventKind::ParticipantSigned.is_fully_completed());
        assert!(EventKind::AgreementSigned.is_fully_completed());
        assert!(!EventKind::AgreementRejected.is_fully_completed());
        assert!(!EventKind::Other("AGREEMENT_CREATED".into()).affects_document());
    }

    #[test]
    fn test_from_nested_event_payload() {
        let payload = json!({
            "event": {
                "eventType": "AGREEMENT_COMPLETED",
                "agreementId": "CBJCHB123",
                "participantUserEmail": "signer@example.com",
                "eventDate": "2024-05-01T10:00:00Z"
            }
        });
        let evt = WebhookEvent::from_payload(&payload);
        assert_eq!(evt.kind, EventKind::AgreementCompleted);
        assert_eq!(evt.agreement_id.as_deref(), Some("CBJCHB123"));
        assert_eq!(evt.participant.as_deref(), Some("signer@example.com"));
        assert_eq!(evt.event_date.as_deref(), Some("2024-05-01T10:00:00Z"));
    }

    #[test]
    fn test_from_flat_payload() {
        let payload = json!({
            "event": "AGREEMENT_REJECTED",
            "agreement": { "id": "A-1" },
            "participantUserEmail": "x@example.com"
        });
        let evt = WebhookEvent::from_payload(&payload);
        assert_eq!(evt.kind, EventKind::AgreementRejected);
        assert_eq!(evt.agreement_id.as_deref(), Some("A-1"));
        assert_eq!(evt.participant.as_deref(), Some("x@example.com"));
    }

    #[test]
    fn test_type_and_top_level_id() {
        let payload = json!({ "type": "PARTICIPANT_SIGNED", "agreementId": "A-2" });
        let evt = WebhookEvent::from_payload(&payload);
        assert_eq!(evt.kind, EventKind::ParticipantSigned);
        assert_eq!(evt.agreement_id.as_deref(), Some("A-2"));
    }

    #[test]
    fn test_empty_payload_is_unknown() {
        let evt = WebhookEvent::from_payload(&json!({}));
        assert_eq!(evt.kind, EventKind::Other("UNKNOWN_EVENT".into()));
        assert!(evt.agreement_id.is_none());
    }
}
