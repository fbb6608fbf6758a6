//! Background-job routing
//!
//! The engine owns no queue. A scheduler hands evaluation payloads to
//! [`JobRunner::run`]; timeout and retry policy stay with that caller, the
//! evaluation itself is an idempotent unit of work.

use crate::company::ClientCompanyRiskEvaluator;
use crate::document::DocumentRiskEvaluator;
use risk_core::{ClientCompanyRiskScore, DocumentRiskScore, EvaluationJob, JobKind, Result};
use std::sync::Arc;
use tracing::debug;

/// Result of one routed job
#[derive(Debug, Clone)]
pub enum JobOutcome {
    /// The job evaluated a document
    Document(DocumentRiskScore),
    /// The job evaluated a client company
    Company(ClientCompanyRiskScore),
}

/// Routes evaluation jobs to the right evaluator
pub struct JobRunner {
    documents: Arc<DocumentRiskEvaluator>,
    companies: Arc<ClientCompanyRiskEvaluator>,
}

impl JobRunner {
    pub fn new(
        documents: Arc<DocumentRiskEvaluator>,
        companies: Arc<ClientCompanyRiskEvaluator>,
    ) -> Self {
        Self {
            documents,
            companies,
        }
    }

    /// Run one job. A payload naming a document evaluates the document; one
    /// naming only a company evaluates the company; anything else is
    /// malformed.
    pub async fn run(&self, job: &EvaluationJob) -> Result<JobOutcome> {
        match job.kind()? {
            JobKind::Document(document_id) => {
                debug!(tenant_id = %job.tenant_id, %document_id, "running document evaluation job");
                self.documents
                    .evaluate(job.tenant_id, document_id, None)
                    .await
                    .map(JobOutcome::Document)
            }
            JobKind::Company(client_company_id) => {
                debug!(tenant_id = %job.tenant_id, %client_company_id, "running company evaluation job");
                self.companies
                    .evaluate(job.tenant_id, client_company_id)
                    .await
                    .map(JobOutcome::Company)
            }
        }
    }
}
