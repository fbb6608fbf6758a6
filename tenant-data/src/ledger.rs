use chrono::{DateTime, NaiveDate, Utc};
use dashmap::DashMap;
use risk_core::{ClientCompanyId, Invoice, Result, TenantId, Transaction};

/// Read side of the invoice and transaction ledger
pub trait LedgerStore: Send + Sync {
    /// Invoices of one company issued inside the date range, inclusive
    fn company_invoices(
        &self,
        tenant_id: TenantId,
        client_company_id: ClientCompanyId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Invoice>>;

    /// All invoices of the tenant issued inside the date range, inclusive.
    /// Duplicate matching scans tenant-wide, not per company.
    fn tenant_invoices(
        &self,
        tenant_id: TenantId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Invoice>>;

    /// Transactions of one company booked inside the time range
    fn company_transactions(
        &self,
        tenant_id: TenantId,
        client_company_id: ClientCompanyId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Transaction>>;
}

/// In-memory ledger keyed by tenant
#[derive(Default)]
pub struct InMemoryLedgerStore {
    invoices: DashMap<TenantId, Vec<Invoice>>,
    transactions: DashMap<TenantId, Vec<Transaction>>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one invoice
    pub fn add_invoice(&self, tenant_id: TenantId, invoice: Invoice) {
        self.invoices.entry(tenant_id).or_default().push(invoice);
    }

    /// Record one transaction
    pub fn add_transaction(&self, tenant_id: TenantId, transaction: Transaction) {
        self.transactions
            .entry(tenant_id)
            .or_default()
            .push(transaction);
    }
}

impl LedgerStore for InMemoryLedgerStore {
    fn company_invoices(
        &self,
        tenant_id: TenantId,
        client_company_id: ClientCompanyId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Invoice>> {
        let mut invoices: Vec<Invoice> = self
            .invoices
            .get(&tenant_id)
            .map(|entry| {
                entry
                    .value()
                    .iter()
                    .filter(|invoice| {
                        invoice.client_company_id == client_company_id
                            && invoice.issued_on >= from
                            && invoice.issued_on <= to
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        invoices.sort_by_key(|invoice| (invoice.issued_on, invoice.id));
        Ok(invoices)
    }

    fn tenant_invoices(
        &self,
        tenant_id: TenantId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Invoice>> {
        let mut invoices: Vec<Invoice> = self
            .invoices
            .get(&tenant_id)
            .map(|entry| {
                entry
                    .value()
                    .iter()
                    .filter(|invoice| invoice.issued_on >= from && invoice.issued_on <= to)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        invoices.sort_by_key(|invoice| (invoice.issued_on, invoice.id));
        Ok(invoices)
    }

    fn company_transactions(
        &self,
        tenant_id: TenantId,
        client_company_id: ClientCompanyId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Transaction>> {
        let mut transactions: Vec<Transaction> = self
            .transactions
            .get(&tenant_id)
            .map(|entry| {
                entry
                    .value()
                    .iter()
                    .filter(|tx| {
                        tx.client_company_id == client_company_id
                            && tx.booked_at >= from
                            && tx.booked_at <= to
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        transactions.sort_by_key(|tx| (tx.booked_at, tx.id));
        Ok(transactions)
    }
}
