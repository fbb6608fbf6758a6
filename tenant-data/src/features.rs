use dashmap::DashMap;
use risk_core::{ClientCompanyId, DocumentId, DocumentRiskFeatures, Error, Result, TenantId};

/// Read side of the upstream feature extraction
pub trait FeatureStore: Send + Sync {
    /// The feature record of one document. Missing records fail closed: the
    /// same NotFound covers "no such document" and "owned by another tenant".
    fn document_features(
        &self,
        tenant_id: TenantId,
        document_id: DocumentId,
    ) -> Result<DocumentRiskFeatures>;

    /// All documents of one company known to the extraction step
    fn company_documents(
        &self,
        tenant_id: TenantId,
        client_company_id: ClientCompanyId,
    ) -> Result<Vec<DocumentId>>;
}

/// In-memory feature store keyed by (tenant, document)
#[derive(Default)]
pub struct InMemoryFeatureStore {
    features: DashMap<(TenantId, DocumentId), DocumentRiskFeatures>,
}

impl InMemoryFeatureStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the feature record of one document
    pub fn put(&self, tenant_id: TenantId, features: DocumentRiskFeatures) {
        self.features
            .insert((tenant_id, features.document_id), features);
    }
}

impl FeatureStore for InMemoryFeatureStore {
    fn document_features(
        &self,
        tenant_id: TenantId,
        document_id: DocumentId,
    ) -> Result<DocumentRiskFeatures> {
        self.features
            .get(&(tenant_id, document_id))
            .map(|entry| entry.value().clone())
            .ok_or(Error::NotFound)
    }

    fn company_documents(
        &self,
        tenant_id: TenantId,
        client_company_id: ClientCompanyId,
    ) -> Result<Vec<DocumentId>> {
        let mut documents: Vec<DocumentId> = self
            .features
            .iter()
            .filter(|entry| {
                entry.key().0 == tenant_id && entry.value().client_company_id == client_company_id
            })
            .map(|entry| entry.key().1)
            .collect();
        documents.sort();
        Ok(documents)
    }
}
