//! Agreement records tracked between a start request and its final webhook.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default trailing window for duplicate submissions (15 minutes).
pub const DEFAULT_DUPLICATE_WINDOW_SECS: i64 = 15 * 60;

/// A signature request in flight, keyed by the provider's agreement id.
///
/// Serialized with camelCase keys to match the `agreements.json` document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgreementRecord {
    pub node_id: String,
    pub attach_id: String,
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub workflow_id: String,
    #[serde(default)]
    pub subworkflow_id: String,
    #[serde(default)]
    pub emails: Vec<String>,
    #[serde(default)]
    pub sendon_done: bool,
    pub created_at: DateTime<Utc>,
}

impl AgreementRecord {
    pub fn state(&self) -> AgreementState {
        if self.sendon_done {
            AgreementState::Closed
        } else {
            AgreementState::Pending
        }
    }

    /// Recipient sets are compared without regard to order.
    pub fn same_recipients(&self, emails: &[String]) -> bool {
        self.emails.len() == emails.len() && recipient_key(&self.emails) == recipient_key(emails)
    }

    /// The subprocess id to address, falling back to the main workflow id.
    pub fn effective_subworkflow_id(&self) -> &str {
        if self.subworkflow_id.is_empty() {
            &self.workflow_id
        } else {
            &self.subworkflow_id
        }
    }

    /// File name used for the signed document, with a node-based fallback.
    pub fn document_name(&self) -> String {
        let trimmed = self.file_name.trim();
        if trimmed.is_empty() {
            format!("node_{}.pdf", self.node_id)
        } else {
            trimmed.to_string()
        }
    }
}

fn recipient_key(emails: &[String]) -> Vec<&str> {
    let mut key: Vec<&str> = emails.iter().map(String::as_str).collect();
    key.sort_unstable();
    key
}

/// Fields supplied when a start request is accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAgreement {
    pub node_id: String,
    pub attach_id: String,
    pub file_name: String,
    pub workflow_id: Option<String>,
    pub subworkflow_id: Option<String>,
    pub emails: Vec<String>,
}

impl NewAgreement {
    pub fn into_record(self, created_at: DateTime<Utc>) -> AgreementRecord {
        let workflow_id = self.workflow_id.unwrap_or_default();
        let subworkflow_id = self
            .subworkflow_id
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| workflow_id.clone());
        AgreementRecord {
            node_id: self.node_id,
            attach_id: self.attach_id,
            file_name: self.file_name,
            workflow_id,
            subworkflow_id,
            emails: self.emails,
            sendon_done: false,
            created_at,
        }
    }
}

/// Partial update merged into an existing record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgreementUpdate {
    pub file_name: Option<String>,
    pub workflow_id: Option<String>,
    pub subworkflow_id: Option<String>,
    pub sendon_done: Option<bool>,
}

impl AgreementUpdate {
    pub fn close() -> Self {
        Self {
            sendon_done: Some(true),
            ..Self::default()
        }
    }

    /// Merge into `record`. `sendon_done` never goes back to false.
    pub fn apply_to(self, record: &mut AgreementRecord) {
        if let Some(name) = self.file_name {
            record.file_name = name;
        }
        if let Some(id) = self.workflow_id {
            record.workflow_id = id;
        }
        if let Some(id) = self.subworkflow_id {
            record.subworkflow_id = id;
        }
        if let Some(done) = self.sendon_done {
            record.sendon_done = record.sendon_done || done;
        }
    }
}

/// Lifecycle of an agreement, derived from `sendon_done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgreementState {
    /// Waiting for a terminal event to be recorded in the workflow.
    Pending,
    /// Disposition delivered; no further workflow calls.
    Closed,
}

/// Terminal outcome recorded back into the originating workflow task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Signed,
    Rejected,
}

impl Disposition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Disposition::Signed => "Signed",
            Disposition::Rejected => "Rejected",
        }
    }
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
