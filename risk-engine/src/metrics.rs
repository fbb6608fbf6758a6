//! Metrics collection for observability
//!
//! # Metrics
//!
//! - `risk_document_evaluations_total` - Documents evaluated
//! - `risk_company_evaluations_total` - Companies evaluated
//! - `risk_degraded_signals_total` - Fraud signals that fell back to neutral
//! - `risk_alerts_dispatched_total` - High-severity alert requests sent
//! - `risk_evaluation_duration_seconds` - Histogram of evaluation latencies

use prometheus::{Histogram, HistogramOpts, IntCounter, Opts, Registry};
use std::sync::Arc;

/// Metrics collector
#[derive(Clone)]
pub struct Metrics {
    /// Documents evaluated
    pub document_evaluations: IntCounter,

    /// Companies evaluated
    pub company_evaluations: IntCounter,

    /// Fraud signals that degraded to their neutral value
    pub degraded_signals: IntCounter,

    /// Alert requests dispatched
    pub alerts_dispatched: IntCounter,

    /// Evaluation duration histogram
    pub evaluation_duration: Histogram,

    /// Prometheus registry
    pub registry: Arc<Registry>,
}

impl Metrics {
    /// Create new metrics collector with its own registry
    pub fn new() -> prometheus::Result<Self> {
        let registry = Arc::new(Registry::new());

        let document_evaluations = IntCounter::with_opts(Opts::new(
            "risk_document_evaluations_total",
            "Documents evaluated",
        ))?;
        registry.register(Box::new(document_evaluations.clone()))?;

        let company_evaluations = IntCounter::with_opts(Opts::new(
            "risk_company_evaluations_total",
            "Companies evaluated",
        ))?;
        registry.register(Box::new(company_evaluations.clone()))?;

        let degraded_signals = IntCounter::with_opts(Opts::new(
            "risk_degraded_signals_total",
            "Fraud signals that fell back to their neutral value",
        ))?;
        registry.register(Box::new(degraded_signals.clone()))?;

        let alerts_dispatched = IntCounter::with_opts(Opts::new(
            "risk_alerts_dispatched_total",
            "High-severity alert requests sent",
        ))?;
        registry.register(Box::new(alerts_dispatched.clone()))?;

        let evaluation_duration = Histogram::with_opts(
            HistogramOpts::new(
                "risk_evaluation_duration_seconds",
                "Histogram of evaluation latencies",
            )
            .buckets(vec![0.001, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.0]),
        )?;
        registry.register(Box::new(evaluation_duration.clone()))?;

        Ok(Self {
            document_evaluations,
            company_evaluations,
            degraded_signals,
            alerts_dispatched,
            evaluation_duration,
            registry,
        })
    }

    /// Record a completed document evaluation
    pub fn record_document_evaluation(&self) {
        self.document_evaluations.inc();
    }

    /// Record a completed company evaluation
    pub fn record_company_evaluation(&self) {
        self.company_evaluations.inc();
    }

    /// Record degraded fraud signals
    pub fn record_degraded_signals(&self, count: usize) {
        self.degraded_signals.inc_by(count as u64);
    }

    /// Record a dispatched alert
    pub fn record_alert(&self) {
        self.alerts_dispatched.inc();
    }

    /// Record evaluation duration
    pub fn record_evaluation_duration(&self, duration_seconds: f64) {
        self.evaluation_duration.observe(duration_seconds);
    }

    /// Get metrics registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new().expect("Failed to create metrics")
    }
}
