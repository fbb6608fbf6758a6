//! Fraud-signal enrichment
//!
//! Every signal is computed independently: a failing fetch or detector
//! degrades that one signal to its neutral value and the rest of the
//! scoring pass continues. Nothing in this module errors outward.

use crate::config::EngineConfig;
use crate::context::{CompanyFraudSignals, DocumentFraudSignals};
use crate::metrics::Metrics;
use chrono::{DateTime, Duration, NaiveTime, Utc};
use fraud_patterns::{
    backdating, benford, circular, counterparty, duplicates, round_numbers, timing, vat,
    BenfordAnalysis, CounterpartyAnalysis, Signal,
};
use risk_core::{ClientCompanyId, DocumentId, Invoice, Result, TenantId, Transaction};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use tenant_data::LedgerStore;
use tracing::warn;

fn degrade<T>(name: &str, error: &risk_core::Error, neutral: T, metrics: &Metrics) -> Signal<T> {
    warn!(signal = name, error = %error, "fraud signal degraded to neutral");
    metrics.record_degraded_signals(1);
    Signal::degraded(neutral, error.to_string())
}

fn amounts(transactions: &[Transaction]) -> Vec<Decimal> {
    transactions.iter().map(|tx| tx.amount).collect()
}

/// Fraud signals for one document, computed over its company's history.
pub(crate) fn document_signals(
    ledger: &dyn LedgerStore,
    tenant_id: TenantId,
    client_company_id: ClientCompanyId,
    document_id: DocumentId,
    config: &EngineConfig,
    metrics: &Metrics,
    now: DateTime<Utc>,
) -> DocumentFraudSignals {
    let window_start = now - Duration::days(config.window.company_window_days as i64);
    let transactions =
        ledger.company_transactions(tenant_id, client_company_id, window_start, now);

    let benford = match &transactions {
        Ok(txs) => Signal::Computed(benford::analyze(&amounts(txs))),
        Err(e) => degrade("benford", e, BenfordAnalysis::neutral(), metrics),
    };
    let round_numbers = match &transactions {
        Ok(txs) => Signal::Computed(round_numbers::analyze(&amounts(txs))),
        Err(e) => degrade(
            "round_numbers",
            e,
            round_numbers::RoundNumberAnalysis::neutral(),
            metrics,
        ),
    };
    let timing = match &transactions {
        Ok(txs) => {
            let booked: Vec<DateTime<Utc>> = txs.iter().map(|tx| tx.booked_at).collect();
            Signal::Computed(timing::analyze(&booked))
        }
        Err(e) => degrade("timing", e, timing::TimingAnalysis::neutral(), metrics),
    };

    let invoices = ledger.company_invoices(
        tenant_id,
        client_company_id,
        window_start.date_naive(),
        now.date_naive(),
    );
    let (counterparty, duplicate_invoice) = match &invoices {
        Ok(list) => match list.iter().find(|inv| inv.document_id == Some(document_id)) {
            Some(invoice) => (
                counterparty_signal(ledger, tenant_id, client_company_id, invoice, config, metrics),
                duplicate_signal(ledger, tenant_id, invoice, metrics),
            ),
            // No invoice extracted for this document yet: nothing to judge
            None => (
                Signal::Computed(CounterpartyAnalysis::neutral()),
                Signal::Computed(false),
            ),
        },
        Err(e) => (
            degrade("counterparty", e, CounterpartyAnalysis::neutral(), metrics),
            degrade("duplicate_invoice", e, false, metrics),
        ),
    };

    DocumentFraudSignals {
        benford,
        round_numbers,
        timing,
        counterparty,
        duplicate_invoice,
    }
}

fn counterparty_signal(
    ledger: &dyn LedgerStore,
    tenant_id: TenantId,
    client_company_id: ClientCompanyId,
    invoice: &Invoice,
    config: &EngineConfig,
    metrics: &Metrics,
) -> Signal<CounterpartyAnalysis> {
    let name = match &invoice.counterparty {
        Some(name) => name,
        None => return Signal::Computed(CounterpartyAnalysis::neutral()),
    };

    let issued_at = invoice
        .issued_on
        .and_time(NaiveTime::MIN)
        .and_utc();
    let history_start =
        issued_at - Duration::days(config.detectors.counterparty_history_days as i64);

    match ledger.company_transactions(tenant_id, client_company_id, history_start, issued_at) {
        Ok(txs) => {
            let history: Vec<(DateTime<Utc>, Decimal)> = txs
                .iter()
                .filter(|tx| tx.counterparty.as_deref() == Some(name.as_str()))
                .map(|tx| (tx.booked_at, tx.amount))
                .collect();
            Signal::Computed(counterparty::classify(&history, invoice.amount, issued_at))
        }
        Err(e) => degrade("counterparty", &e, CounterpartyAnalysis::neutral(), metrics),
    }
}

fn duplicate_signal(
    ledger: &dyn LedgerStore,
    tenant_id: TenantId,
    invoice: &Invoice,
    metrics: &Metrics,
) -> Signal<bool> {
    let from = invoice.issued_on - Duration::days(duplicates::DUPLICATE_WINDOW_DAYS);
    let to = invoice.issued_on + Duration::days(duplicates::DUPLICATE_WINDOW_DAYS);

    match ledger.tenant_invoices(tenant_id, from, to) {
        Ok(list) => {
            let target = sample(invoice);
            let others: Vec<duplicates::InvoiceSample> = list
                .iter()
                .filter(|other| other.id != invoice.id)
                .map(sample)
                .collect();
            Signal::Computed(duplicates::has_duplicate(&target, &others))
        }
        Err(e) => degrade("duplicate_invoice", &e, false, metrics),
    }
}

fn sample(invoice: &Invoice) -> duplicates::InvoiceSample {
    duplicates::InvoiceSample {
        amount: invoice.amount,
        counterparty: invoice.counterparty.clone(),
        issued_on: invoice.issued_on,
    }
}

/// Company-wide fraud signals over one transaction fetch.
pub(crate) fn company_signals(
    transactions: &Result<Vec<Transaction>>,
    config: &EngineConfig,
    metrics: &Metrics,
) -> CompanyFraudSignals {
    let benford = match transactions {
        Ok(txs) => Signal::Computed(benford::analyze(&amounts(txs))),
        Err(e) => degrade("benford", e, BenfordAnalysis::neutral(), metrics),
    };

    let circular = match transactions {
        Ok(txs) => {
            let transfers: Vec<circular::TransferSample> = txs
                .iter()
                .map(|tx| circular::TransferSample {
                    counterparty: tx.counterparty.clone(),
                    amount: tx.amount,
                    booked_at: tx.booked_at,
                })
                .collect();
            Signal::Computed(circular::analyze(&transfers))
        }
        Err(e) => degrade("circular", e, circular::CircularAnalysis::neutral(), metrics),
    };

    let vat = match transactions {
        Ok(txs) => {
            let rates: Vec<Decimal> = txs.iter().filter_map(|tx| tx.vat_rate).collect();
            let standard: Vec<Decimal> = config
                .detectors
                .standard_vat_rates
                .iter()
                .filter_map(|rate| Decimal::from_f64(*rate))
                .collect();
            Signal::Computed(vat::analyze(&rates, &standard))
        }
        Err(e) => degrade("vat", e, vat::VatAnalysis::neutral(), metrics),
    };

    let backdating = match transactions {
        Ok(txs) => {
            let entries: Vec<(DateTime<Utc>, Option<DateTime<Utc>>)> =
                txs.iter().map(|tx| (tx.booked_at, tx.entered_at)).collect();
            Signal::Computed(backdating::analyze(&entries))
        }
        Err(e) => degrade(
            "backdating",
            e,
            backdating::BackdatingAnalysis::neutral(),
            metrics,
        ),
    };

    CompanyFraudSignals {
        benford,
        circular,
        vat,
        backdating,
    }
}
