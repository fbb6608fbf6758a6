//! Background-job payload contract
//!
//! The engine exposes no network protocol of its own; asynchronous callers
//! enqueue this payload and a worker routes it to the right evaluator.

use crate::error::{Error, Result};
use crate::types::{ClientCompanyId, DocumentId, TenantId};
use serde::{Deserialize, Serialize};

/// Payload of one evaluation request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationJob {
    /// Tenant scope for every lookup the evaluation performs
    pub tenant_id: TenantId,

    /// Target company, for company-scope evaluations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_company_id: Option<ClientCompanyId>,

    /// Target document, for document-scope evaluations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_id: Option<DocumentId>,
}

/// Resolved routing target of a job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobKind {
    /// Evaluate one document
    Document(DocumentId),
    /// Evaluate one client company
    Company(ClientCompanyId),
}

impl EvaluationJob {
    /// Request evaluation of one document
    pub fn document(tenant_id: TenantId, document_id: DocumentId) -> Self {
        Self {
            tenant_id,
            client_company_id: None,
            document_id: Some(document_id),
        }
    }

    /// Request evaluation of one client company
    pub fn company(tenant_id: TenantId, client_company_id: ClientCompanyId) -> Self {
        Self {
            tenant_id,
            client_company_id: Some(client_company_id),
            document_id: None,
        }
    }

    /// Resolve the routing target. A document id wins when both are present;
    /// a payload naming neither is malformed.
    pub fn kind(&self) -> Result<JobKind> {
        if let Some(document_id) = self.document_id {
            return Ok(JobKind::Document(document_id));
        }
        if let Some(client_company_id) = self.client_company_id {
            return Ok(JobKind::Company(client_company_id));
        }
        Err(Error::Validation(
            "evaluation job names neither a document nor a company".to_string(),
        ))
    }

    /// Serialize for the queue
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| Error::Validation(e.to_string()))
    }

    /// Deserialize from the queue
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(|e| Error::Validation(e.to_string()))
    }
}
