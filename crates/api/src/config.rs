//! Application configuration loaded from environment variables.

use std::path::PathBuf;
use std::time::Duration;

use common::Money;
use domain::PricingPolicy;
use wizard::WizardConfig;

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST`: bind address (default: `"0.0.0.0"`)
/// - `PORT`: listen port (default: `3000`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `LOOKUP_TIMEOUT_MS`: catalog, status and postal lookups (default: `5000`)
/// - `SUBMISSION_TIMEOUT_MS`: order creation (default: `15000`)
/// - `SERVICE_FEE_CENTS`: flat service fee (default: `5000`)
/// - `MINIMUM_ORDER_CENTS`: minimum pre-tax order value (default: `38880`)
/// - `CATALOG_PATH`: JSON catalog file (default: the bundled demo catalog)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub lookup_timeout_ms: u64,
    pub submission_timeout_ms: u64,
    pub service_fee_cents: i64,
    pub minimum_order_cents: i64,
    pub catalog_path: Option<PathBuf>,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("HOST").unwrap_or(defaults.host),
            port: parse_var("PORT").unwrap_or(defaults.port),
            log_level: std::env::var("RUST_LOG").unwrap_or(defaults.log_level),
            lookup_timeout_ms: parse_var("LOOKUP_TIMEOUT_MS").unwrap_or(defaults.lookup_timeout_ms),
            submission_timeout_ms: parse_var("SUBMISSION_TIMEOUT_MS")
                .unwrap_or(defaults.submission_timeout_ms),
            service_fee_cents: parse_var("SERVICE_FEE_CENTS").unwrap_or(defaults.service_fee_cents),
            minimum_order_cents: parse_var("MINIMUM_ORDER_CENTS")
                .unwrap_or(defaults.minimum_order_cents),
            catalog_path: std::env::var_os("CATALOG_PATH").map(PathBuf::from),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Wizard settings derived from this configuration.
    pub fn wizard_config(&self) -> WizardConfig {
        let policy = PricingPolicy::default()
            .with_service_fee(Money::from_cents(self.service_fee_cents))
            .with_minimum_order(Money::from_cents(self.minimum_order_cents));
        WizardConfig::default()
            .with_policy(policy)
            .with_lookup_timeout(Duration::from_millis(self.lookup_timeout_ms))
            .with_submission_timeout(Duration::from_millis(self.submission_timeout_ms))
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            lookup_timeout_ms: 5_000,
            submission_timeout_ms: 15_000,
            service_fee_cents: PricingPolicy::DEFAULT_SERVICE_FEE.cents(),
            minimum_order_cents: PricingPolicy::DEFAULT_MINIMUM_ORDER.cents(),
            catalog_path: None,
        }
    }
}
