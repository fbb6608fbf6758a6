//! Engine configuration

use risk_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Risk engine configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EngineConfig {
    /// Evaluation windows
    pub window: WindowConfig,

    /// Detector data-fetch tunables
    pub detectors: DetectorConfig,

    /// Alert emission
    pub alerting: AlertingConfig,
}

/// Evaluation windows
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Trailing window for company aggregates and document fraud signals
    pub company_window_days: u32,

    /// Period length for the derived trend view
    pub trend_period_days: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            company_window_days: 90,
            trend_period_days: 30,
        }
    }
}

/// Detector data-fetch tunables
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// How far back counterparty history is fetched; must exceed the
    /// dormancy window or reactivations are invisible
    pub counterparty_history_days: u32,

    /// VAT rates considered standard for the tenant's jurisdiction
    pub standard_vat_rates: Vec<f64>,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            counterparty_history_days: 730,
            standard_vat_rates: vec![0.0, 9.0, 21.0],
        }
    }
}

/// Alert emission
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertingConfig {
    /// Emit alert requests for high-severity results
    pub enabled: bool,
}

impl Default for AlertingConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl EngineConfig {
    /// Load from a TOML file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Validation(format!("failed to read config: {}", e)))?;
        toml::from_str(&content)
            .map_err(|e| Error::Validation(format!("failed to parse config: {}", e)))
    }

    /// Load defaults overridden by environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = EngineConfig::default();

        if let Ok(days) = std::env::var("RISK_ENGINE_WINDOW_DAYS") {
            config.window.company_window_days = days
                .parse()
                .map_err(|_| Error::Validation(format!("invalid RISK_ENGINE_WINDOW_DAYS: {}", days)))?;
        }

        if let Ok(days) = std::env::var("RISK_ENGINE_TREND_PERIOD_DAYS") {
            config.window.trend_period_days = days.parse().map_err(|_| {
                Error::Validation(format!("invalid RISK_ENGINE_TREND_PERIOD_DAYS: {}", days))
            })?;
        }

        if let Ok(enabled) = std::env::var("RISK_ENGINE_ALERTS_ENABLED") {
            config.alerting.enabled = enabled.parse().map_err(|_| {
                Error::Validation(format!("invalid RISK_ENGINE_ALERTS_ENABLED: {}", enabled))
            })?;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.window.company_window_days, 90);
        assert_eq!(config.detectors.counterparty_history_days, 730);
        assert!(config.alerting.enabled);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: EngineConfig = toml::from_str(
            r#"
            [window]
            company_window_days = 30
            "#,
        )
        .unwrap();
        assert_eq!(config.window.company_window_days, 30);
        assert_eq!(config.window.trend_period_days, 30);
        assert!(config.alerting.enabled);
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.toml");
        std::fs::write(&path, "[alerting]\nenabled = false\n").unwrap();

        let config = EngineConfig::from_file(&path).unwrap();
        assert!(!config.alerting.enabled);
    }

    #[test]
    fn test_missing_file_is_validation_error() {
        assert!(matches!(
            EngineConfig::from_file("/nonexistent/engine.toml"),
            Err(Error::Validation(_))
        ));
    }
}
