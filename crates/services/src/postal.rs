//! Postal lookup service trait and in-memory implementation.

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use domain::validation::is_valid_postal_code;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ServiceError};

/// A postal code with the city and state it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locality {
    pub postal_code: String,
    pub city: String,
    #[serde(default)]
    pub state: String,
}

impl Locality {
    pub fn new(
        postal_code: impl Into<String>,
        city: impl Into<String>,
        state: impl Into<String>,
    ) -> Self {
        Self {
            postal_code: postal_code.into(),
            city: city.into(),
            state: state.into(),
        }
    }
}

/// Trait for postal code and city lookups. Only 5-digit codes are supported.
#[async_trait]
pub trait PostalLookupService: Send + Sync {
    /// Resolves a postal code; `None` when the code is unknown.
    async fn lookup_postal_code(&self, postal_code: &str) -> Result<Option<Locality>>;

    /// Localities whose city name starts with `city`, case-insensitively.
    async fn lookup_city(&self, city: &str) -> Result<Vec<Locality>>;
}

#[derive(Debug, Default)]
struct InMemoryPostalState {
    localities: Vec<Locality>,
    latency: Option<Duration>,
    fail: bool,
    calls: usize,
}

/// In-memory postal directory for tests and the demo server.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPostalLookupService {
    state: Arc<RwLock<InMemoryPostalState>>,
}

impl InMemoryPostalLookupService {
    pub fn new(localities: impl IntoIterator<Item = Locality>) -> Self {
        Self {
            state: Arc::new(RwLock::new(InMemoryPostalState {
                localities: localities.into_iter().collect(),
                ..Default::default()
            })),
        }
    }

    /// Delays every answer, for exercising timeouts and superseded lookups.
    pub fn set_latency(&self, latency: Option<Duration>) {
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .latency = latency;
    }

    /// Configures the service to fail every call.
    pub fn set_fail(&self, fail: bool) {
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .fail = fail;
    }

    pub fn call_count(&self) -> usize {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .calls
    }

    /// Records the call and returns the configured latency; the lock is
    /// released before any waiting happens.
    fn begin_call(&self) -> Result<Option<Duration>> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.calls += 1;
        if state.fail {
            return Err(ServiceError::unavailable("postal lookup", "directory is down"));
        }
        Ok(state.latency)
    }

    fn snapshot(&self) -> Vec<Locality> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .localities
            .clone()
    }
}

#[async_trait]
impl PostalLookupService for InMemoryPostalLookupService {
    #[tracing::instrument(skip(self))]
    async fn lookup_postal_code(&self, postal_code: &str) -> Result<Option<Locality>> {
        let postal_code = postal_code.trim();
        if !is_valid_postal_code(postal_code) {
            return Err(ServiceError::InvalidRequest(format!(
                "postal code {postal_code:?} is not 5 digits"
            )));
        }
        if let Some(latency) = self.begin_call()? {
            tokio::time::sleep(latency).await;
        }
        Ok(self
            .snapshot()
            .into_iter()
            .find(|locality| locality.postal_code == postal_code))
    }

    #[tracing::instrument(skip(self))]
    async fn lookup_city(&self, city: &str) -> Result<Vec<Locality>> {
        let needle = city.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }
        if let Some(latency) = self.begin_call()? {
            tokio::time::sleep(latency).await;
        }
        Ok(self
            .snapshot()
            .into_iter()
            .filter(|locality| locality.city.to_lowercase().starts_with(&needle))
            .collect())
    }
}
