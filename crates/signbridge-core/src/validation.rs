//! Input validation for start-signature requests.

use signbridge_types::error::StartError;
use signbridge_types::request::StartSignatureRequest;

/// Task slot advanced right after agreement creation when the caller
/// does not name one.
pub const DEFAULT_ADVANCE_TASK_ID: &str = "2";

/// A loose address check: anything with an `@`.
pub fn is_valid_email(candidate: &str) -> bool {
    candidate.contains('@')
}

/// Collect recipients from both email fields.
///
/// Each field may hold several addresses separated by commas or semicolons.
/// Entries are trimmed and anything without an `@` is dropped. Order is kept.
pub fn parse_emails(first: Option<&str>, second: Option<&str>) -> Vec<String> {
    [first, second]
        .into_iter()
        .flatten()
        .flat_map(|field| field.split([',', ';']))
        .map(str::trim)
        .filter(|e| !e.is_empty() && is_valid_email(e))
        .map(str::to_string)
        .collect()
}

/// True when `raw` is a positive finite number.
pub fn is_valid_id(raw: &str) -> bool {
    raw.trim()
        .parse::<f64>()
        .map(|n| n.is_finite() && n > 0.0)
        .unwrap_or(false)
}

/// A validated start request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartSignature {
    pub node_id: String,
    pub attach_id: String,
    pub emails: Vec<String>,
    /// Caller-supplied document name, trimmed. `None` when blank.
    pub doc_name: Option<String>,
    pub workflow_id: Option<String>,
    pub subworkflow_id: Option<String>,
    pub task_id: String,
}

impl StartSignature {
    pub fn from_request(request: &StartSignatureRequest) -> Result<Self, StartError> {
        let emails = parse_emails(
            request.user_email1.as_deref(),
            request.user_email2.as_deref(),
        );
        let node_id = request
            .node_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty());

        let Some(node_id) = node_id.filter(|_| !emails.is_empty()) else {
            return Err(StartError::Validation(
                "Node ID and Email are mandatory.".to_string(),
            ));
        };

        let attach_id = match request.attach_id.as_deref().map(str::trim) {
            Some(id) if is_valid_id(id) => id.to_string(),
            _ => {
                return Err(StartError::Validation("attachId is mandatory.".to_string()));
            }
        };

        let trimmed = |v: &Option<String>| {
            v.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        Ok(Self {
            node_id: node_id.to_string(),
            attach_id,
            emails,
            doc_name: trimmed(&request.doc_name),
            workflow_id: trimmed(&request.workflow_id),
            subworkflow_id: trimmed(&request.subworkflow_id),
            task_id: trimmed(&request.task_id)
                .unwrap_or_else(|| DEFAULT_ADVANCE_TASK_ID.to_string()),
        })
    }

    /// Name given to the uploaded document.
    pub fn file_name(&self) -> String {
        self.doc_name
            .clone()
            .unwrap_or_else(|| format!("document_{}.pdf", self.node_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> StartSignatureRequest {
        StartSignatureRequest {
            node_id: Some("1001".into()),
            attach_id: Some("2002".into()),
            user_email1: Some("a@x.com".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_emails_splits_and_filters() {
        let emails = parse_emails(Some(" a@x.com; b@x.com ,,nope"), Some("c@x.com"));
        assert_eq!(emails, vec!["a@x.com", "b@x.com", "c@x.com"]);
        assert!(parse_emails(None, Some("  ")).is_empty());
    }

    #[test]
    fn test_is_valid_id() {
        assert!(is_valid_id("42"));
        assert!(is_valid_id("7.5"));
        assert!(!is_valid_id("0"));
        assert!(!is_valid_id("-3"));
        assert!(!is_valid_id("abc"));
        assert!(!is_valid_id("inf"));
        assert!(!is_valid_id("NaN"));
    }

    #[test]
    fn test_valid_request_defaults() {
        let start = StartSignature::from_request(&request()).unwrap();
        assert_eq!(start.task_id, "2");
        assert_eq!(start.file_name(), "document_1001.pdf");
        assert!(start.workflow_id.is_none());
    }

    #[test]
    fn test_doc_name_is_trimmed() {
        let mut req = request();
        req.doc_name = Some("  Contract.pdf ".into());
        let start = StartSignature::from_request(&req).unwrap();
        assert_eq!(start.file_name(), "Contract.pdf");
    }

    #[test]
    fn test_missing_node_or_email_rejected() {
        let mut req = request();
        req.user_email1 = Some("not-an-email".into());
        let err = StartSignature::from_request(&req).unwrap_err();
        assert_eq!(err.to_string(), "Node ID and Email are mandatory.");

        let mut req = request();
        req.node_id = None;
        assert!(matches!(
            StartSignature::from_request(&req),
            Err(StartError::Validation(_))
        ));
    }

    #[test]
    fn test_bad_attach_id_rejected() {
        let mut req = request();
        req.attach_id = Some("-1".into());
        let err = StartSignature::from_request(&req).unwrap_err();
        assert_eq!(err.to_string(), "attachId is mandatory.");
    }
}
