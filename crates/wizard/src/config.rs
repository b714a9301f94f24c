//! Wizard configuration.

use std::time::Duration;

use domain::PricingPolicy;

/// Default timeout for catalog, status and postal lookups.
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

/// Default timeout for the order creation call.
pub const DEFAULT_SUBMISSION_TIMEOUT: Duration = Duration::from_secs(15);

/// Settings shared by every wizard session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardConfig {
    pub lookup_timeout: Duration,
    pub submission_timeout: Duration,
    pub policy: PricingPolicy,
}

impl WizardConfig {
    pub fn with_policy(mut self, policy: PricingPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_lookup_timeout(mut self, timeout: Duration) -> Self {
        self.lookup_timeout = timeout;
        self
    }

    pub fn with_submission_timeout(mut self, timeout: Duration) -> Self {
        self.submission_timeout = timeout;
        self
    }
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            lookup_timeout: DEFAULT_LOOKUP_TIMEOUT,
            submission_timeout: DEFAULT_SUBMISSION_TIMEOUT,
            policy: PricingPolicy::default(),
        }
    }
}
