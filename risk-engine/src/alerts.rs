//! Alert dispatch boundary
//!
//! High-severity results produce an alert-creation request for the
//! notification collaborator. Dispatch failures are transient dependency
//! failures: logged and counted, never propagated to the evaluation caller.

use parking_lot::Mutex;
use risk_core::{ClientCompanyId, DocumentId, Result, Severity, TenantId};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Alert-creation request sent to the notification collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertRequest {
    /// Owning tenant
    pub tenant_id: TenantId,

    /// Company the alert concerns
    pub client_company_id: ClientCompanyId,

    /// Document the alert concerns, for document-scope alerts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_id: Option<DocumentId>,

    /// Machine-readable alert kind
    #[serde(rename = "type")]
    pub alert_type: String,

    /// Short human-readable title
    pub title: String,

    /// Longer human-readable message
    pub message: String,

    /// Severity of the producing evaluation
    pub severity: Severity,
}

/// Outbound alert boundary
pub trait AlertDispatcher: Send + Sync {
    /// Hand one alert request to the notification collaborator
    fn dispatch(&self, request: AlertRequest) -> Result<()>;
}

/// Dispatcher that only logs, for embedding callers without notifications
#[derive(Default)]
pub struct LogAlertDispatcher;

impl AlertDispatcher for LogAlertDispatcher {
    fn dispatch(&self, request: AlertRequest) -> Result<()> {
        info!(
            tenant_id = %request.tenant_id,
            client_company_id = %request.client_company_id,
            alert_type = %request.alert_type,
            severity = request.severity.as_str(),
            "risk alert: {}",
            request.title
        );
        Ok(())
    }
}

/// Dispatcher that records requests, for tests
#[derive(Default)]
pub struct RecordingAlertDispatcher {
    sent: Mutex<Vec<AlertRequest>>,
}

impl RecordingAlertDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// All requests dispatched so far
    pub fn sent(&self) -> Vec<AlertRequest> {
        self.sent.lock().clone()
    }

    pub fn count(&self) -> usize {
        self.sent.lock().len()
    }
}

impl AlertDispatcher for RecordingAlertDispatcher {
    fn dispatch(&self, request: AlertRequest) -> Result<()> {
        self.sent.lock().push(request);
        Ok(())
    }
}
