//! Adobe Sign REST v6 wire types.
//!
//! These mirror the provider's JSON shapes only; the core works with the
//! port types in `signbridge-core::upstream::signature`.

use serde::{Deserialize, Serialize};

use signbridge_core::upstream::signature::AgreementRequest;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransientDocumentResponse {
    pub transient_document_id: String,
}

/// Body of `POST /api/rest/v6/agreements`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgreementCreationInfo {
    pub name: String,
    pub file_infos: Vec<FileInfo>,
    pub participant_sets_info: Vec<ParticipantSetInfo>,
    pub signature_type: &'static str,
    pub state: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileInfo {
    pub transient_document_id: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantSetInfo {
    pub role: &'static str,
    pub order: u32,
    pub member_infos: Vec<MemberInfo>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MemberInfo {
    pub email: String,
}

impl From<&AgreementRequest> for AgreementCreationInfo {
    /// One participant set per signer, all at order 1, so everyone signs in
    /// parallel.
    fn from(request: &AgreementRequest) -> Self {
        Self {
            name: request.name.clone(),
            file_infos: vec![FileInfo {
                transient_document_id: request.transient_document_id.clone(),
            }],
            participant_sets_info: request
                .signers
                .iter()
                .map(|email| ParticipantSetInfo {
                    role: "SIGNER",
                    order: 1,
                    member_infos: vec![MemberInfo {
                        email: email.clone(),
                    }],
                })
                .collect(),
            signature_type: "ESIGN",
            state: "IN_PROCESS",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AgreementCreationResponse {
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_agreement_body_shape() {
        let request = AgreementRequest {
            transient_document_id: "t-1".into(),
            name: "contract.pdf".into(),
            signers: vec!["a@x.com".into(), "b@x.com".into()],
        };
        let body = serde_json::to_value(AgreementCreationInfo::from(&request)).unwrap();
        assert_eq!(
            body,
            json!({
                "name": "contract.pdf",
                "fileInfos": [{ "transientDocumentId": "t-1" }],
                "participantSetsInfo": [
                    { "role": "SIGNER", "order": 1, "memberInfos": [{ "email": "a@x.com" }] },
                    { "role": "SIGNER", "order": 1, "memberInfos": [{ "email": "b@x.com" }] }
                ],
                "signatureType": "ESIGN",
                "state": "IN_PROCESS"
            })
        );
    }

    #[test]
    fn test_transient_response_parses() {
        let parsed: TransientDocumentResponse =
            serde_json::from_str(r#"{"transientDocumentId":"3AAABL"}"#).unwrap();
        assert_eq!(parsed.transient_document_id, "3AAABL");
    }
}
