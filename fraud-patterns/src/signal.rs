//! Per-detector degradation wrapper
//!
//! A failing input fetch or detector must not abort an evaluation; it falls
//! back to the detector's neutral value. `Signal` keeps that fallback
//! explicit so engine output can distinguish "computed false" from
//! "defaulted due to failure".

use serde::Serialize;

/// Outcome of one fraud-signal computation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase", tag = "state", content = "detail")]
pub enum Signal<T> {
    /// The detector ran over real input
    Computed(T),
    /// The detector could not run; the neutral value stands in
    Degraded {
        /// Statistically neutral stand-in value
        fallback: T,
        /// Why the signal degraded, for logs and audits
        reason: String,
    },
}

impl<T> Signal<T> {
    /// Wrap a fallback with the failure that caused it
    pub fn degraded(fallback: T, reason: impl Into<String>) -> Self {
        Signal::Degraded {
            fallback,
            reason: reason.into(),
        }
    }

    /// The computed value, or the neutral fallback
    pub fn value(&self) -> &T {
        match self {
            Signal::Computed(value) => value,
            Signal::Degraded { fallback, .. } => fallback,
        }
    }

    /// Whether this signal defaulted due to a failure
    pub fn is_degraded(&self) -> bool {
        matches!(self, Signal::Degraded { .. })
    }

    /// The degradation reason, if any
    pub fn reason(&self) -> Option<&str> {
        match self {
            Signal::Computed(_) => None,
            Signal::Degraded { reason, .. } => Some(reason),
        }
    }
}
